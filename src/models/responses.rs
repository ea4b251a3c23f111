use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::domain::SearchResultEntry;

/// Response for the player search endpoints
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub players: Arc<Vec<SearchResultEntry>>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    /// Set when a newer search from the same user started first;
    /// `players` is then empty
    pub superseded: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<HashMap<String, Vec<String>>>,
}

/// Returned after register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Profile picture upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}
