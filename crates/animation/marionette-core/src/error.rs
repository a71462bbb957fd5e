//! Error types for asset loading.

/// Failure to read, parse or validate a character asset.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum AssetError {
    /// The asset source could not provide the file.
    #[error("failed to read asset '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for its schema.
    #[error("failed to parse asset '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The file parsed but violates a data invariant.
    #[error("invalid asset '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

impl AssetError {
    /// Path of the asset that failed.
    pub fn path(&self) -> &str {
        match self {
            AssetError::Read { path, .. }
            | AssetError::Parse { path, .. }
            | AssetError::Invalid { path, .. } => path,
        }
    }
}
