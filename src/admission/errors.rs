// Copyright 2024 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Admission error types.
//!
//! Errors produced by plugins travel through the chain unchanged, so everything a
//! caller needs to build an API response (status code, reason, field detail) lives here.

use std::fmt;
use thiserror::Error;

/// Result type for admission operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// AdmissionError represents errors that can occur during admission.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// BadRequest indicates a malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Forbidden indicates the request is not allowed.
    #[error("{0}")]
    Forbidden(ForbiddenError),

    /// Aggregate represents multiple errors.
    #[error("{0}")]
    Aggregate(AggregateError),

    /// Internal represents an internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// NotFound indicates a resource was not found.
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },
}

impl AdmissionError {
    /// Create a new BadRequest error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AdmissionError::BadRequest(msg.into())
    }

    /// Create a new Forbidden error.
    pub fn forbidden(
        name: impl Into<String>,
        namespace: impl Into<String>,
        resource: impl Into<String>,
        field_error: FieldError,
    ) -> Self {
        AdmissionError::Forbidden(ForbiddenError {
            name: name.into(),
            namespace: namespace.into(),
            resource: resource.into(),
            field_error,
        })
    }

    /// Create an aggregate error from multiple errors.
    pub fn aggregate(errors: Vec<AdmissionError>) -> Self {
        AdmissionError::Aggregate(AggregateError { errors })
    }

    /// Create a NotFound error.
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        AdmissionError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an Internal error.
    pub fn internal_error(msg: impl Into<String>) -> Self {
        AdmissionError::Internal(msg.into())
    }

    /// The HTTP status code an API server would answer with.
    ///
    /// An aggregate reports the status of its first member, or 500 when empty.
    pub fn status_code(&self) -> u16 {
        match self {
            AdmissionError::BadRequest(_) => 400,
            AdmissionError::Forbidden(_) => 403,
            AdmissionError::NotFound { .. } => 404,
            AdmissionError::Internal(_) => 500,
            AdmissionError::Aggregate(agg) => match agg.errors.first() {
                Some(first) => first.status_code(),
                None => 500,
            },
        }
    }

    /// The machine-readable status reason.
    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::BadRequest(_) => "BadRequest",
            AdmissionError::Forbidden(_) => "Forbidden",
            AdmissionError::NotFound { .. } => "NotFound",
            AdmissionError::Internal(_) => "InternalError",
            AdmissionError::Aggregate(agg) => match agg.errors.first() {
                Some(first) => first.reason(),
                None => "InternalError",
            },
        }
    }
}

/// ForbiddenError represents a forbidden admission error with field details.
#[derive(Debug)]
pub struct ForbiddenError {
    pub name: String,
    pub namespace: String,
    pub resource: String,
    pub field_error: FieldError,
}

impl fmt::Display for ForbiddenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \"{}\" is forbidden: {}",
            self.resource, self.name, self.field_error
        )
    }
}

/// FieldError represents a field-level error.
#[derive(Debug)]
pub struct FieldError {
    pub field: String,
    pub error_type: FieldErrorType,
    pub value: String,
    pub supported_values: Vec<String>,
    pub detail: String,
}

impl FieldError {
    /// The value at `field` is not one of `supported`.
    pub fn not_supported(field: &str, value: &str, supported: &[&str]) -> Self {
        FieldError {
            field: field.to_string(),
            error_type: FieldErrorType::NotSupported,
            value: value.to_string(),
            supported_values: supported.iter().map(|s| s.to_string()).collect(),
            detail: String::new(),
        }
    }

    /// A required field was left empty.
    pub fn required(field: &str) -> Self {
        FieldError {
            field: field.to_string(),
            error_type: FieldErrorType::Required,
            value: String::new(),
            supported_values: vec![],
            detail: String::new(),
        }
    }

    pub fn invalid(field: &str, value: &str) -> Self {
        FieldError {
            field: field.to_string(),
            error_type: FieldErrorType::Invalid,
            value: value.to_string(),
            supported_values: vec![],
            detail: String::new(),
        }
    }

    /// A field error with no field path, carrying a free-form explanation.
    pub fn detail(detail: impl Into<String>) -> Self {
        FieldError {
            field: String::new(),
            error_type: FieldErrorType::Forbidden,
            value: String::new(),
            supported_values: vec![],
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_type {
            FieldErrorType::NotSupported => {
                let quoted: Vec<String> = self
                    .supported_values
                    .iter()
                    .map(|s| format!("\"{}\"", s))
                    .collect();
                write!(
                    f,
                    "{}: Unsupported value: \"{}\": supported values: {}",
                    self.field,
                    self.value,
                    quoted.join(", ")
                )
            }
            FieldErrorType::Required => {
                write!(f, "{}: Required value", self.field)
            }
            FieldErrorType::Invalid => {
                write!(f, "{}: Invalid value: \"{}\"", self.field, self.value)
            }
            FieldErrorType::Forbidden if self.field.is_empty() => f.write_str(&self.detail),
            FieldErrorType::Forbidden => {
                write!(f, "{}: Forbidden: {}", self.field, self.detail)
            }
        }
    }
}

/// FieldErrorType represents the type of field error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorType {
    /// NotSupported indicates the value is not in the list of supported values.
    NotSupported,
    /// Required indicates a required field is missing.
    Required,
    /// Invalid indicates an invalid value.
    Invalid,
    /// Forbidden indicates the field may not be set by this request.
    Forbidden,
}

/// AggregateError represents multiple errors.
#[derive(Debug)]
pub struct AggregateError {
    pub errors: Vec<AdmissionError>,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error_strings: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "[{}]", error_strings.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_error_display() {
        let err = AdmissionError::forbidden(
            "test-pod",
            "default",
            "pods",
            FieldError::not_supported(
                "spec.containers[0].imagePullPolicy",
                "Never",
                &["Always", "IfNotPresent"],
            ),
        );
        let msg = err.to_string();
        assert!(msg.contains("pods \"test-pod\" is forbidden"));
        assert!(msg.contains("imagePullPolicy"));
        assert!(msg.contains("Unsupported value: \"Never\""));
        assert!(msg.ends_with("supported values: \"Always\", \"IfNotPresent\""));
    }

    #[test]
    fn test_required_and_invalid_display() {
        let err = FieldError::required("metadata.name");
        assert_eq!(err.error_type, FieldErrorType::Required);
        assert_eq!(err.to_string(), "metadata.name: Required value");

        let err = FieldError::invalid("replicas", "-1");
        assert_eq!(err.error_type, FieldErrorType::Invalid);
        assert_eq!(err.to_string(), "replicas: Invalid value: \"-1\"");
    }

    #[test]
    fn test_forbidden_detail_display() {
        let err = AdmissionError::forbidden(
            "web",
            "default",
            "deployments",
            FieldError::detail("admission webhook denied the request"),
        );
        assert_eq!(
            err.to_string(),
            "deployments \"web\" is forbidden: admission webhook denied the request"
        );
    }

    #[test]
    fn test_aggregate_error_display() {
        let errors = vec![
            AdmissionError::bad_request("error 1"),
            AdmissionError::bad_request("error 2"),
        ];
        let err = AdmissionError::aggregate(errors);
        let msg = err.to_string();
        assert!(msg.starts_with('['));
        assert!(msg.ends_with(']'));
        assert!(msg.contains("error 1"));
        assert!(msg.contains("error 2"));
    }

    fn assert_status(err: AdmissionError, code: u16, reason: &str) {
        assert_eq!(err.status_code(), code, "status for {}", err);
        assert_eq!(err.reason(), reason, "reason for {}", err);
    }

    #[test]
    fn test_status_code_and_reason() {
        let forbidden = AdmissionError::forbidden("n", "ns", "pods", FieldError::detail("no"));
        assert_status(forbidden, 403, "Forbidden");
        assert_status(AdmissionError::bad_request("x"), 400, "BadRequest");
        assert_status(AdmissionError::not_found("pod", "x"), 404, "NotFound");
        assert_status(AdmissionError::internal_error("x"), 500, "InternalError");

        let first = AdmissionError::bad_request("first");
        assert_status(AdmissionError::aggregate(vec![first]), 400, "BadRequest");
        assert_status(AdmissionError::aggregate(vec![]), 500, "InternalError");
    }
}
