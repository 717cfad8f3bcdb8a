//! Per-role user report from the user directory.
//!
//! Read-only. Failures are printed and never change the exit status.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use sessionwatch_client::{FirestoreDirectory, RoleReport, UserRecord, role_report};
use sessionwatch_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the roles command
#[derive(Debug, Args)]
pub struct RolesArgs {
    /// Roles to report (defaults to the configured list)
    #[arg(short, long, value_delimiter = ',')]
    pub roles: Vec<String>,

    /// Override the configured project
    #[arg(short, long)]
    pub project: Option<String>,
}

/// Table row for a user
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

impl From<&UserRecord> for UserRow {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone().unwrap_or_else(|| "-".to_string()),
            name: user.display_name.clone().unwrap_or_else(|| "-".to_string()),
            created_at: user.created_at.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// JSON shape for one role
#[derive(Debug, Serialize)]
struct RoleSection<'a> {
    role: &'a str,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    users: Option<&'a [UserRecord]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Execute the roles command
pub async fn execute(
    args: &RolesArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    if let Err(e) = run(args, config_path, format).await {
        output::print_error(&format!("Role report failed: {}", e));
    }
    Ok(())
}

async fn run(args: &RolesArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let mut config = super::load_config(config_path).await?;
    if let Some(project) = &args.project {
        config.directory.project_id = project.clone();
    }
    let roles = if args.roles.is_empty() {
        config.directory.roles.clone()
    } else {
        args.roles.clone()
    };

    let directory = FirestoreDirectory::new(config.directory)?;
    let report = role_report(&directory, &roles).await;

    match format {
        OutputFormat::Table => print_tables(&report),
        OutputFormat::Json => {
            let sections: Vec<RoleSection<'_>> = report
                .iter()
                .map(|r| RoleSection {
                    role: &r.role,
                    count: r.users.as_ref().map(|u| u.len()).unwrap_or(0),
                    users: r.users.as_deref().ok(),
                    error: r.users.as_ref().err().map(|e| e.as_str()),
                })
                .collect();
            output::print_item(&sections, format);
        }
    }
    Ok(())
}

fn print_tables(report: &[RoleReport]) {
    for section in report {
        match &section.users {
            Ok(users) => {
                output::print_heading(&format!("{} ({})", section.role, users.len()));
                let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
                output::print_list(&rows, OutputFormat::Table);
            }
            Err(e) => {
                output::print_heading(&section.role);
                output::print_error(e);
            }
        }
    }
}
