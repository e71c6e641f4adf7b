use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::ContentStatus;
use crate::error::{GroveError, Result};
use crate::query::Queryable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    #[default]
    Viewer,
}

impl Role {
    pub fn can_edit_content(&self) -> bool {
        matches!(self, Role::Admin | Role::Editor)
    }

    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Fail with `Forbidden` unless this role may edit content.
    pub fn require_editor(&self, action: &str) -> Result<()> {
        if self.can_edit_content() {
            Ok(())
        } else {
            Err(self.forbidden(action))
        }
    }

    /// Fail with `Forbidden` unless this role may manage users.
    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.can_manage_users() {
            Ok(())
        } else {
            Err(self.forbidden(action))
        }
    }

    fn forbidden(&self, action: &str) -> GroveError {
        GroveError::Forbidden {
            role: self.to_string(),
            action: action.to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Editor => write!(f, "editor"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" | "user" => Ok(Role::Viewer),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

impl User {
    pub fn new(name: String, email: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            role,
            created_at: chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GroveError::validation("name", "Name is required"));
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(GroveError::validation(
                "email",
                format!("'{}' is not an email address", self.email),
            )),
        }
    }
}

// The users table shares the list view, with role standing in for category.
impl Queryable for User {
    fn title(&self) -> &str {
        &self.name
    }

    fn byline(&self) -> Option<&str> {
        Some(&self.email)
    }

    fn category(&self) -> &str {
        match self.role {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    fn status(&self) -> Option<ContentStatus> {
        None
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}
