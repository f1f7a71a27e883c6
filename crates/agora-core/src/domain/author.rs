use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal profile projection joined onto a post for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}
