use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::role::Role;

/// Account row as needed for login.
#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl TryFrom<UserRow> for User {
    type Error = strum::ParseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password,
            role: row.role.parse()?,
        })
    }
}

/// Public view of a `USER` account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 2,
    "name": "Budi Santoso",
    "email": "budi@company.com",
    "position": "Staff",
    "created_at": "2026-01-01T00:00:00Z"
}))]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct EmployeeChanges {
    pub name: String,
    pub email: String,
    pub position: Option<String>,
}

/// Emails are compared trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
