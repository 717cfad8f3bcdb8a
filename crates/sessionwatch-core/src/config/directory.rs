//! User directory configuration for the role report.

use serde::{Deserialize, Serialize};

/// Firestore-backed user directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Firestore REST base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Google Cloud project identifier.
    #[serde(default)]
    pub project_id: String,
    /// Firestore database name.
    #[serde(default = "default_database")]
    pub database: String,
    /// Collection holding user documents.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Roles reported, in order.
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    /// OAuth2 access token used as a bearer credential.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            project_id: String::new(),
            database: default_database(),
            collection: default_collection(),
            roles: default_roles(),
            access_token: None,
        }
    }
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_collection() -> String {
    "users".to_string()
}

fn default_roles() -> Vec<String> {
    ["admin", "support", "advisor", "user"]
        .iter()
        .map(|r| r.to_string())
        .collect()
}
