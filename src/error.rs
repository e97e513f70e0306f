//! Error types for certflow
//!
//! Every fallible operation in the crate returns [`CertError`]. Callers that
//! need to branch on the failure use [`CertError::kind`], which is stable
//! across releases; the `Display` text is meant for humans.

use thiserror::Error;

/// Result type alias for certflow operations
pub type CertResult<T> = Result<T, CertError>;

/// Message returned when an Ed25519 key is combined with authority-side generation.
///
/// Callers pattern-match on this text, so it must not change.
pub const ED25519_SERVICE_GENERATED_MESSAGE: &str =
    "ED25519 keys are not yet supported for Service Generated CSR";

/// Stable, machine-checkable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PolicyViolation,
    UnsupportedKeyConfiguration,
    MalformedCertificateData,
    InvalidIdentifier,
    InvalidRequest,
}

/// Top-level error type for all certflow operations
#[derive(Error, Debug)]
pub enum CertError {
    /// The request does not satisfy the zone policy.
    ///
    /// Only raised by explicit validation; defaulting never produces it.
    #[error("Policy violation: {0}")]
    PolicyViolation(#[from] PolicyViolation),

    /// The key algorithm, size, curve or CSR origin cannot be synthesized
    #[error("Unsupported key configuration: {reason}")]
    UnsupportedKeyConfiguration { reason: String },

    /// A PEM bundle, certificate or CSR could not be decoded
    #[error("Malformed certificate data: {reason}")]
    MalformedCertificateData { reason: String },

    /// An identifier that must be a UUID failed to parse
    #[error("Invalid identifier for {field}: {value:?}: {reason}")]
    InvalidIdentifier {
        field: String,
        value: String,
        reason: String,
    },

    /// Caller-supplied data is missing or unusable
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl CertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CertError::PolicyViolation(_) => ErrorKind::PolicyViolation,
            CertError::UnsupportedKeyConfiguration { .. } => ErrorKind::UnsupportedKeyConfiguration,
            CertError::MalformedCertificateData { .. } => ErrorKind::MalformedCertificateData,
            CertError::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            CertError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        CertError::UnsupportedKeyConfiguration {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CertError::MalformedCertificateData {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_request(reason: impl Into<String>) -> Self {
        CertError::InvalidRequest {
            reason: reason.into(),
        }
    }
}

/// Which part of a request fell outside the zone policy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("{attribute} value {value:?} does not match any allowed pattern")]
    SubjectNotAllowed { attribute: String, value: String },

    #[error("{san_type} SAN {value:?} does not match any allowed pattern")]
    SanNotAllowed { san_type: String, value: String },

    #[error("key configuration {key} is not allowed by the zone")]
    KeyNotAllowed { key: String },
}

/// Convert model errors to CertError
impl From<crate::model::KeyTypeError> for CertError {
    fn from(err: crate::model::KeyTypeError) -> Self {
        CertError::unsupported(err.to_string())
    }
}

impl From<crate::model::KeyMaterialError> for CertError {
    fn from(err: crate::model::KeyMaterialError) -> Self {
        CertError::UnsupportedKeyConfiguration {
            reason: err.to_string(),
        }
    }
}
