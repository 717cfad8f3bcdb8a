//! Read-only user directory backed by the Firestore REST API.
//!
//! Used by the role report: one `runQuery` per role against the users
//! collection. Roles are queried independently so one failing role does
//! not hide the others.

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use sessionwatch_core::config::directory::DirectoryConfig;
use sessionwatch_core::error::AppError;
use sessionwatch_core::result::AppResult;

/// One user document, reduced to the fields the report prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Document identifier (last path segment).
    pub id: String,
    /// Role field.
    pub role: String,
    /// Email address.
    pub email: Option<String>,
    /// Display name, or first and last name joined.
    pub display_name: Option<String>,
    /// Creation time as stored.
    pub created_at: Option<String>,
}

/// Source of user documents.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// All users whose `role` equals `role`.
    async fn users_with_role(&self, role: &str) -> AppResult<Vec<UserRecord>>;
}

/// Outcome of querying one role.
#[derive(Debug, Clone)]
pub struct RoleReport {
    /// The role queried.
    pub role: String,
    /// Matching users, or the error message if the query failed.
    pub users: Result<Vec<UserRecord>, String>,
}

/// Query each role in `roles`. Results keep the order of `roles`.
pub async fn role_report(directory: &dyn UserDirectory, roles: &[String]) -> Vec<RoleReport> {
    let queries = roles.iter().map(|role| async move {
        let users = directory.users_with_role(role).await.map_err(|e| {
            tracing::error!(role = %role, error = %e, "Role query failed");
            e.to_string()
        });
        RoleReport {
            role: role.clone(),
            users,
        }
    });
    join_all(queries).await
}

/// [`UserDirectory`] over Firestore's `documents:runQuery` endpoint.
#[derive(Debug, Clone)]
pub struct FirestoreDirectory {
    client: reqwest::Client,
    config: DirectoryConfig,
}

impl FirestoreDirectory {
    /// Create a directory client. Fails if no project is configured.
    pub fn new(config: DirectoryConfig) -> AppResult<Self> {
        if config.project_id.trim().is_empty() {
            return Err(AppError::configuration(
                "directory.project_id must be set for the role report",
            ));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn run_query_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents:runQuery",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id,
            self.config.database
        )
    }

    fn role_query(&self, role: &str) -> Value {
        json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.config.collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "role" },
                        "op": "EQUAL",
                        "value": { "stringValue": role }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl UserDirectory for FirestoreDirectory {
    async fn users_with_role(&self, role: &str) -> AppResult<Vec<UserRecord>> {
        let mut request = self
            .client
            .post(self.run_query_url())
            .json(&self.role_query(role));
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Firestore request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::external_service(format!("Failed to read Firestore response: {e}"))
        })?;

        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Firestore query for role '{role}' returned {status}: {body}"
            )));
        }

        parse_run_query(&body)
    }
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Decode a `runQuery` response into user records.
fn parse_run_query(body: &str) -> AppResult<Vec<UserRecord>> {
    let rows: Vec<QueryRow> = serde_json::from_str(body)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| row.document)
        .map(|doc| {
            let id = doc
                .name
                .rsplit('/')
                .next()
                .unwrap_or(doc.name.as_str())
                .to_string();
            let fields = &doc.fields;
            let display_name = field_str(fields, "displayName").or_else(|| {
                let parts: Vec<String> = ["firstName", "lastName"]
                    .iter()
                    .filter_map(|k| field_str(fields, k))
                    .collect();
                (!parts.is_empty()).then(|| parts.join(" "))
            });
            UserRecord {
                role: field_str(fields, "role").unwrap_or_default(),
                email: field_str(fields, "email"),
                display_name,
                created_at: field_str(fields, "createdAt"),
                id,
            }
        })
        .collect())
}

/// Read a Firestore typed value as text.
fn field_str(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let value = fields.get(key)?.as_object()?;
    ["stringValue", "timestampValue", "integerValue"]
        .iter()
        .find_map(|kind| value.get(*kind))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
