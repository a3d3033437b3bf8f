//! One-time import of a legacy `rules.json` file into an empty store.

use std::path::Path;

use frontdoor_core::legacy::{parse_legacy_rules, LegacyImportError};
use frontdoor_db::{RuleStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed file {path}: {source}")]
    Parse {
        path: String,
        source: LegacyImportError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Import the rules in `path` if the store is empty.
///
/// Returns the number of rules imported; zero when the store already had
/// rules. A seed file that cannot be read or parsed is an error even when
/// the store is not empty, so a broken deployment is noticed.
pub async fn import_seed_file(store: &RuleStore, path: &Path) -> Result<usize, SeedError> {
    let path_display = path.display().to_string();

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path_display.clone(),
            source,
        })?;

    let rules = parse_legacy_rules(&contents, chrono::Utc::now()).map_err(|source| {
        SeedError::Parse {
            path: path_display.clone(),
            source,
        }
    })?;

    let imported = store.import_if_empty(rules).await?;
    if imported > 0 {
        tracing::info!(path = %path_display, imported, "Imported legacy rules");
    } else {
        tracing::debug!(path = %path_display, "Store not empty, seed file ignored");
    }

    Ok(imported)
}
