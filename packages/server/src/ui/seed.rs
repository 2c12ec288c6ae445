//! User profile seed file loaded at startup.
//!
//! The file is a JSON array:
//! ```json
//! [{ "id": "alice", "name": "Alice", "avatar": "https://example.com/alice.png" }]
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{UserId, UserProfile, ValueObjectError};

#[derive(Debug, Error)]
pub enum ProfileSeedError {
    #[error("failed to read profile seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid profile seed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid profile entry: {0}")]
    InvalidEntry(#[from] ValueObjectError),
}

#[derive(Debug, Deserialize)]
struct ProfileSeed {
    id: String,
    name: String,
    #[serde(default)]
    avatar: Option<String>,
}

pub fn load_profiles(path: &Path) -> Result<Vec<UserProfile>, ProfileSeedError> {
    let text = std::fs::read_to_string(path)?;
    parse_profiles(&text)
}

pub fn parse_profiles(text: &str) -> Result<Vec<UserProfile>, ProfileSeedError> {
    let seeds: Vec<ProfileSeed> = serde_json::from_str(text)?;
    seeds
        .into_iter()
        .map(|seed| {
            let id = UserId::new(seed.id)?;
            Ok(UserProfile::new(id, seed.name, seed.avatar))
        })
        .collect()
}
