use thiserror::Error;

/// Service error codes treated as the permission-denied class.
pub const ACCESS_DENIED_CODES: &[&str] = &["AccessDenied", "UnauthorizedOperation"];

#[derive(Error, Debug)]
pub enum IamError {
    /// The remote call was denied. Actionable by the operator (missing
    /// IAM permissions), so logged distinctly from other failures.
    #[error("Access denied (iam:{operation})")]
    AccessDenied { operation: &'static str },

    /// Any other remote failure, with full diagnostic detail.
    #[error("iam:{operation} failed ({code}): {message}")]
    Api {
        operation: &'static str,
        code: String,
        message: String,
    },
}

impl IamError {
    /// Classify a remote failure by its service error code.
    pub fn from_remote(operation: &'static str, code: Option<String>, message: String) -> Self {
        match code {
            Some(code) if ACCESS_DENIED_CODES.contains(&code.as_str()) => {
                IamError::AccessDenied { operation }
            }
            Some(code) => IamError::Api {
                operation,
                code,
                message,
            },
            None => IamError::Api {
                operation,
                code: "Unknown".to_string(),
                message,
            },
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, IamError::AccessDenied { .. })
    }

    /// The API operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            IamError::AccessDenied { operation } | IamError::Api { operation, .. } => operation,
        }
    }
}
