use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroveError {
    #[error("Not in a greengroves catalog. Run 'greengroves init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .greengroves/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Invalid content kind: {0}")]
    InvalidKind(String),

    #[error("Validation failed for field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Role '{role}' is not allowed to {action}")]
    Forbidden { role: String, action: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Loro error: {0}")]
    Loro(#[from] loro::LoroError),

    #[error("Loro encode error: {0}")]
    LoroEncode(#[from] loro::LoroEncodeError),
}

impl GroveError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        GroveError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// HTTP-like status for this error, used to pick the user-facing message.
    pub fn status_code(&self) -> u16 {
        match self {
            GroveError::ItemNotFound(_) => 404,
            GroveError::Forbidden { .. } => 403,
            GroveError::Validation { .. } | GroveError::InvalidKind(_) => 400,
            GroveError::AlreadyInitialized | GroveError::NotInitialized => 409,
            _ => 500,
        }
    }

    /// Message shown to the user, keyed by status class.
    pub fn user_message(&self) -> String {
        status_message(self.status_code(), &self.to_string())
    }
}

/// Render a message for a status class. Client errors keep their detail,
/// server errors are reported generically with the detail appended.
pub fn status_message(status: u16, detail: &str) -> String {
    match status {
        404 => format!("Not found: {}", detail),
        403 => format!("Permission denied: {}", detail),
        400..=499 => format!("Request rejected ({}): {}", status, detail),
        500..=599 => format!("Server-side failure ({}), nothing was changed: {}", status, detail),
        _ => detail.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, GroveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GroveError::ItemNotFound("x".into()).status_code(), 404);
        assert_eq!(GroveError::validation("title", "required").status_code(), 400);
        assert_eq!(
            GroveError::Forbidden {
                role: "viewer".into(),
                action: "delete content".into()
            }
            .status_code(),
            403
        );
        assert_eq!(GroveError::Storage("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_user_message_by_class() {
        let msg = GroveError::ItemNotFound("abc".into()).user_message();
        assert!(msg.starts_with("Not found"));
        assert!(msg.contains("abc"));

        let msg = GroveError::Storage("disk full".into()).user_message();
        assert!(msg.contains("nothing was changed"));
        assert!(msg.contains("disk full"));

        let msg = GroveError::validation("rating", "out of range").user_message();
        assert!(msg.contains("400"));
        assert!(msg.contains("rating"));
    }
}
