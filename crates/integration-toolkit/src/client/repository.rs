//! Repository data types.
//!
//! These mirror the subset of the GitHub repository REST schema needed to
//! deserialize webhook payloads; concrete repository REST operations are out
//! of scope for this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub repository with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: RepositoryOwner,
    pub description: Option<String>,
    pub private: bool,
    pub default_branch: String,
    pub html_url: String,
    pub clone_url: String,
    pub ssh_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository owner (user or organization).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    #[serde(rename = "type")]
    pub owner_type: OwnerType,
}

/// Owner type classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OwnerType {
    User,
    Organization,
}
