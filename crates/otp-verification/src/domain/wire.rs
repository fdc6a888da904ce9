//! # Wire Types
//!
//! Request and response payloads exchanged with the front end.
//! Field names are camelCase on the wire.

use super::entities::IssueOutcome;
use super::errors::{OtpError, OtpErrorKind};
use super::value_objects::DestinationKind;
use serde::{Deserialize, Serialize};

/// Request to issue a code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub destination_kind: DestinationKind,
    pub destination: String,
}

/// Successful issuance response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub success: bool,
    pub message: String,
    /// Only present in development mode.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<String>,
}

impl From<IssueOutcome> for IssueResponse {
    fn from(outcome: IssueOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message(),
            code: outcome.code,
        }
    }
}

/// Request to verify a code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub destination_kind: DestinationKind,
    pub destination: String,
    pub code: String,
}

/// Successful verification response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub verified: bool,
}

/// Error payload: `{success: false, error: {kind, message}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

/// Machine-readable kind plus human-readable message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: OtpErrorKind,
    pub message: String,
}

impl From<&OtpError> for ErrorResponse {
    fn from(err: &OtpError) -> Self {
        // Store and channel internals stay out of the payload.
        let message = match err {
            OtpError::Storage(_) => "Temporary storage failure, please retry".to_string(),
            OtpError::Dispatch(_) => "Could not deliver the verification code".to_string(),
            other => other.to_string(),
        };
        Self {
            success: false,
            error: ErrorBody {
                kind: err.kind(),
                message,
            },
        }
    }
}

/// Either a success payload or an error payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Ok(T),
    Err(ErrorResponse),
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiResponse::Ok(_))
    }
}
