//! Secret validation output model, shared with the CDN management surface.
//! It has no interaction with rooms.

use serde::{Deserialize, Serialize};

/// Validation status of a secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    AccessDenied,
    CertificateExpired,
    Other(String),
}

impl From<String> for ValidationStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "Valid" => ValidationStatus::Valid,
            "Invalid" => ValidationStatus::Invalid,
            "AccessDenied" => ValidationStatus::AccessDenied,
            "CertificateExpired" => ValidationStatus::CertificateExpired,
            _ => ValidationStatus::Other(status),
        }
    }
}

impl From<ValidationStatus> for String {
    fn from(status: ValidationStatus) -> Self {
        match status {
            ValidationStatus::Valid => "Valid".to_string(),
            ValidationStatus::Invalid => "Invalid".to_string(),
            ValidationStatus::AccessDenied => "AccessDenied".to_string(),
            ValidationStatus::CertificateExpired => "CertificateExpired".to_string(),
            ValidationStatus::Other(status) => status,
        }
    }
}

/// Output of the validated secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSecretResult {
    #[serde(default)]
    status: Option<ValidationStatus>,
    #[serde(default)]
    message: Option<String>,
}

impl ValidateSecretResult {
    pub fn status(&self) -> Option<&ValidationStatus> {
        self.status.as_ref()
    }

    /// Detailed error message
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_status_and_message() {
        let result: ValidateSecretResult =
            serde_json::from_str(r#"{"status":"AccessDenied","message":"Key vault denied access"}"#).unwrap();
        assert_eq!(result.status(), Some(&ValidationStatus::AccessDenied));
        assert_eq!(result.message(), Some("Key vault denied access"));
    }

    #[test]
    fn all_fields_are_optional() {
        let result: ValidateSecretResult = serde_json::from_str("{}").unwrap();
        assert_eq!(result, ValidateSecretResult::default());
        assert!(result.status().is_none());
    }

    #[test]
    fn unknown_status_is_kept() {
        let result: ValidateSecretResult = serde_json::from_str(r#"{"status":"Pending"}"#).unwrap();
        assert_eq!(result.status(), Some(&ValidationStatus::Other("Pending".to_string())));
    }
}
