use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// A tagged event named no known transition. Callers treat this as a bug.
    #[error("unsupported event type: {0}")]
    UnknownEvent(String),

    #[error("Malformed {tag} payload: {message}")]
    MalformedEvent { tag: String, message: String },

    #[error("Catalog returned status {status_code}: {message}")]
    CatalogStatus { status_code: u16, message: String },

    #[error("Catalog response could not be decoded: {0}")]
    CatalogDecode(String),

    #[error("Catalog request failed: {0}")]
    Catalog(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl LibraryError {
    /// True for errors produced by a catalog round-trip rather than by a caller.
    pub fn is_catalog_failure(&self) -> bool {
        matches!(
            self,
            LibraryError::CatalogStatus { .. }
                | LibraryError::CatalogDecode(_)
                | LibraryError::Catalog(_)
                | LibraryError::Bridge(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
