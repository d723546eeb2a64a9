//! Seed data loaders.
//!
//! # File format
//!
//! ```yaml
//! options:
//!   - type: box
//!     name: Velvet Black
//!     price: "4.50"
//!     colorCode: "#111111"
//! ```
//!
//! Rows are matched on `type` + `name`; existing rows get the new price,
//! colour and image.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use jewelbox_storefront::db::PackagingRepository;
use jewelbox_storefront::models::PackagingOptionInput;

use super::{ConnectError, connect};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Option #{0} has an empty name")]
    EmptyName(usize),

    #[error("Database error: {0}")]
    Repository(#[from] jewelbox_storefront::db::RepositoryError),
}

#[derive(Debug, Deserialize)]
struct PackagingSeed {
    options: Vec<PackagingOptionInput>,
}

/// Parse and normalise a packaging seed document.
fn parse_packaging(yaml: &str) -> Result<Vec<PackagingOptionInput>, SeedError> {
    let seed: PackagingSeed = serde_yaml::from_str(yaml)?;

    seed.options
        .into_iter()
        .enumerate()
        .map(|(index, mut option)| {
            option.name = option.name.trim().to_owned();
            if option.name.is_empty() {
                return Err(SeedError::EmptyName(index + 1));
            }
            option.color_code = option.color_code.filter(|c| !c.trim().is_empty());
            option.image_url = option.image_url.filter(|u| !u.trim().is_empty());
            Ok(option)
        })
        .collect()
}

/// Upsert every packaging option in `file_path`.
pub async fn packaging(file_path: &str) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    let yaml = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: file_path.to_owned(),
        source,
    })?;
    let options = parse_packaging(&yaml)?;

    info!(path = %file_path, count = options.len(), "Loaded packaging options");

    let pool = connect().await?;
    let repo = PackagingRepository::new(&pool);
    for option in &options {
        let saved = repo.upsert(option).await?;
        info!(id = %saved.id, kind = %saved.kind, name = %saved.name, "Upserted packaging option");
    }

    info!("Seeded {} packaging options", options.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jewelbox_core::{Money, PackagingKind};

    use super::*;

    #[test]
    fn test_parse_packaging_seed() {
        let yaml = r##"
options:
  - type: box
    name: "  Velvet Black "
    price: "4.50"
    colorCode: "#111111"
  - type: ribbon
    name: Gold
    imageUrl: ""
"##;
        let options = parse_packaging(yaml).unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options.first().unwrap().kind, PackagingKind::Box);
        assert_eq!(options.first().unwrap().name, "Velvet Black");
        assert_eq!(options.first().unwrap().price, Money::parse("4.50").unwrap());
        assert_eq!(options.last().unwrap().price, Money::default());
        assert_eq!(options.last().unwrap().image_url, None);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let yaml = "options:\n  - type: cushion\n    name: \"  \"\n";
        assert!(matches!(parse_packaging(yaml), Err(SeedError::EmptyName(1))));
    }

    #[test]
    fn test_sub_cent_price_is_rejected() {
        let yaml = "options:\n  - type: cloth\n    name: Kraft\n    price: \"1.239\"\n";
        assert!(matches!(parse_packaging(yaml), Err(SeedError::Parse(_))));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let yaml = "options:\n  - type: bag\n    name: Paper\n";
        assert!(matches!(parse_packaging(yaml), Err(SeedError::Parse(_))));
    }
}
