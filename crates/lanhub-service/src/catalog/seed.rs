//! Reference sites created by the catalog seed.

use lanhub_entity::site::{Address, CreateSite, OpeningHours};

fn huancayo(street: &str, district: &str, reference: &str) -> Address {
    Address {
        street: street.to_string(),
        district: district.to_string(),
        city: "Huancayo".to_string(),
        region: "Junín".to_string(),
        reference: reference.to_string(),
    }
}

/// The three reference sites, each with its booth count.
pub fn reference_sites() -> Vec<CreateSite> {
    vec![
        CreateSite {
            slug: "silicom-lan-center".to_string(),
            name: "Silicom Lan Center".to_string(),
            description: "Gaming cybercafé with high-end PCs.".to_string(),
            address: huancayo("Av. Real 1234", "Huancayo", "Frente al parque central"),
            booth_count: 8,
            hours: OpeningHours::default(),
        },
        CreateSite {
            slug: "linux-cybercafe".to_string(),
            name: "Linux Cybercafé".to_string(),
            description: "Quiet space for work and study.".to_string(),
            address: huancayo("Jr. Tecnología 456", "El Tambo", "A una cuadra de la plaza"),
            booth_count: 6,
            hours: OpeningHours::default(),
        },
        CreateSite {
            slug: "shadowlan".to_string(),
            name: "ShadowLAN".to_string(),
            description: "Weekly tournaments and esports-grade setups.".to_string(),
            address: huancayo("Av. Gamer Pro 789", "Chilca", "Centro comercial Gamer Zone"),
            booth_count: 10,
            hours: OpeningHours::default(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sites() {
        let sites = reference_sites();
        let counts: Vec<(&str, i32)> = sites
            .iter()
            .map(|s| (s.slug.as_str(), s.booth_count))
            .collect();
        assert_eq!(
            counts,
            vec![("silicom-lan-center", 8), ("linux-cybercafe", 6), ("shadowlan", 10)]
        );
    }
}
