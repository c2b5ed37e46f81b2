use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

/// Authorization level attached to a user. Stored as VARCHAR, carried in
/// JWT claims, and exposed on the wire under the `ROLE_*` names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ROLE_USER" => Some(Role::User),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
}

// Manual FromRow: the role column is VARCHAR and an unknown value is a
// decode error, not a silent default.
impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role_str: String = row.try_get("role")?;
        let role = Role::parse(&role_str).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: format!("unknown role value: {}", role_str).into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password: row.try_get("password")?,
            role,
        })
    }
}

/// Insert payload for the users table. The password here is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
}
