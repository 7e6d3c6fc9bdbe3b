//! Token engine error taxonomy.

use std::fmt;

use thiserror::Error;

/// Failure class reported by the engine and its providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Non-error sentinel, carried by successful verifications.
    Ok,
    InvalidFormat,
    InvalidBase64Url,
    InvalidJson,
    UnsupportedAlg,
    KeyNotFound,
    SignatureMismatch,
    Expired,
    NotYetValid,
    InvalidIssuer,
    InvalidAudience,
    PolicyViolation,
    CryptoError,
    JsonError,
    IOError,
    CertificateNotFound,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Ok => "Ok",
            ErrorCode::InvalidFormat => "InvalidFormat",
            ErrorCode::InvalidBase64Url => "InvalidBase64Url",
            ErrorCode::InvalidJson => "InvalidJson",
            ErrorCode::UnsupportedAlg => "UnsupportedAlg",
            ErrorCode::KeyNotFound => "KeyNotFound",
            ErrorCode::SignatureMismatch => "SignatureMismatch",
            ErrorCode::Expired => "Expired",
            ErrorCode::NotYetValid => "NotYetValid",
            ErrorCode::InvalidIssuer => "InvalidIssuer",
            ErrorCode::InvalidAudience => "InvalidAudience",
            ErrorCode::PolicyViolation => "PolicyViolation",
            ErrorCode::CryptoError => "CryptoError",
            ErrorCode::JsonError => "JsonError",
            ErrorCode::IOError => "IOError",
            ErrorCode::CertificateNotFound => "CertificateNotFound",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (code, message) pair. Provider errors travel through the engine unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct JwtError {
    pub code: ErrorCode,
    pub message: String,
}

impl JwtError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for token engine and provider operations.
pub type JwtResult<T> = Result<T, JwtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_message() {
        let err = JwtError::new(ErrorCode::Expired, "Token has expired");
        assert_eq!(err.to_string(), "Expired: Token has expired");
    }

    #[test]
    fn test_code_names_match_variants() {
        assert_eq!(ErrorCode::IOError.as_str(), "IOError");
        assert_eq!(ErrorCode::CertificateNotFound.to_string(), "CertificateNotFound");
        assert_eq!(ErrorCode::Ok.as_str(), "Ok");
    }
}
