//! Typed path parameter helpers.

use std::str::FromStr;

use lanhub_core::error::AppError;

/// Parses a typed id from a path segment.
pub fn parse_id<T: FromStr>(s: &str) -> Result<T, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid id: {s}")))
}

#[cfg(test)]
mod tests {
    use lanhub_core::types::BoothId;

    use super::*;

    #[test]
    fn test_parse_id() {
        let id = BoothId::new();
        assert_eq!(parse_id::<BoothId>(&id.to_string()).unwrap(), id);
        assert!(parse_id::<BoothId>("booth-7").is_err());
    }
}
