//! Catalog API request and response bodies
//!
//! List and detail responses deserialize straight into the
//! `core_library` models; only the envelope types live here.

use serde::{Deserialize, Serialize};

/// `GET /videos/{id}/preview_relpath` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    #[serde(default)]
    pub id: Option<String>,

    pub relpath: String,
}

/// `PUT /videos/{id}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest<'a> {
    pub relpath: &'a str,
}

/// `PUT /videos/{id}` response; `relpath` is where the file ended up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub id: Option<String>,

    pub relpath: String,
}

/// `POST /videos` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest<'a> {
    pub url: &'a str,
    pub subdir: &'a str,
}
