//! Human-readable reservation codes.

use chrono::NaiveDate;
use rand::Rng;

const PREFIX: &str = "SL";
const SUFFIX_LEN: usize = 4;
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a code such as `SL191026A7B3`: prefix, booking date as
/// `ddmmyy`, then four random base-36 characters.
pub fn generate_code(date: NaiveDate) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{PREFIX}{}{suffix}", date.format("%d%m%y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_vary_within_a_day() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        let codes: std::collections::HashSet<String> =
            (0..50).map(|_| generate_code(date)).collect();
        assert!(codes.len() > 40);
    }

    #[test]
    fn test_code_shape() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        let code = generate_code(date);
        assert_eq!(code.len(), 12);
        assert!(code.starts_with("SL191026"));
        assert!(
            code[8..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }
}
