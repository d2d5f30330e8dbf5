//! Error types for the catalog provider

use core_library::LibraryError;
use thiserror::Error;

/// Catalog provider errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Server answered with a non-2xx status
    #[error("Catalog API error (status {status_code}): {message}")]
    Api { status_code: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to parse catalog response: {0}")]
    Parse(String),

    /// Endpoint URL could not be built from the base URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// Transport failure reported by the HTTP bridge
    #[error(transparent)]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<CatalogError> for LibraryError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::Api {
                status_code,
                message,
            } => LibraryError::CatalogStatus {
                status_code,
                message,
            },
            CatalogError::Parse(msg) => LibraryError::CatalogDecode(msg),
            CatalogError::InvalidUrl(msg) => LibraryError::Catalog(msg),
            CatalogError::Bridge(e) => LibraryError::Bridge(e),
        }
    }
}
