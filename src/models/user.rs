// src/models/user.rs
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account record as returned by the backend. The password is write-only:
/// it never appears on reads and is omitted from updates unless changed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[serde(rename = "ADMINISTRATOR")]
    Administrator,
    #[default]
    #[serde(rename = "OPERATOR")]
    Operator,
}

impl Role {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMINISTRATOR" => Some(Role::Administrator),
            "OPERATOR" => Some(Role::Operator),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "ADMINISTRATOR",
            Role::Operator => "OPERATOR",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::Operator => "Operator",
        }
    }

    pub fn is_administrator(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 150, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required for a new user"))]
    pub password: String,
    pub role: Role,
    pub is_staff: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 150, message = "Username is required"))]
    pub username: String,
    /// None means "leave the password unchanged"; the field is dropped from
    /// the payload entirely so the backend never sees an empty string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    pub is_staff: bool,
}
