//! Wire types shared by the relay (`routes::contact`) and the contact form
//! client (`contact_form`).

use serde::Deserialize;
use serde::Serialize;

/// `POST /api/contact` body. Every field is optional on the wire so that a
/// missing field is reported the same way as an empty one.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ContactRequest {
    pub fn new(
        from_name: impl Into<String>,
        reply_to: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            from_name: Some(from_name.into()),
            reply_to: Some(reply_to.into()),
            message: Some(message.into()),
        }
    }
}

pub const SUCCESS_MESSAGE: &str = "Email sent successfully!";
pub const MISSING_FIELDS: &str = "All fields are required";
pub const DELIVERY_FAILED: &str = "Failed to send email";
pub const INVALID_BODY: &str = "Invalid request body";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const NOT_FOUND: &str = "Not found";
pub const PAYLOAD_TOO_LARGE: &str = "Request body too large";

/// HTTP 200 body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedBody {
    pub success: bool,
    pub message: String,
}

impl AcceptedBody {
    pub fn new() -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

impl Default for AcceptedBody {
    fn default() -> Self { Self::new() }
}

/// HTTP 4xx/5xx body. `details` is only present on delivery failures and
/// carries the mail provider's own description, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
        }
    }

    pub fn with_details(
        error: &str,
        details: String,
    ) -> Self {
        Self {
            error: error.to_string(),
            details: Some(details),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 400: a field was missing or empty, or the body was not JSON
    InvalidInput,
    /// 500 with `details`: the mail transport failed
    DeliveryFailure,
    /// anything else
    Internal,
}

/// What a submission amounted to, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Accepted {
        message: String,
    },
    Rejected {
        category: ErrorCategory,
        error: String,
        details: Option<String>,
    },
}

/// Any response body the relay produces, read permissively: only `success`
/// decides the outcome, like the browser frontend does.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
    pub details: Option<String>,
}

impl ContactResponse {
    pub fn into_result(
        self,
        status: u16,
    ) -> SubmissionResult {
        if self.success {
            return SubmissionResult::Accepted {
                message: self.message.unwrap_or_else(|| SUCCESS_MESSAGE.to_string()),
            };
        }
        let category = match (status, &self.details) {
            (400..=499, _) => ErrorCategory::InvalidInput,
            (_, Some(_)) => ErrorCategory::DeliveryFailure,
            _ => ErrorCategory::Internal,
        };
        SubmissionResult::Rejected {
            category,
            error: self
                .error
                .unwrap_or_else(|| "Failed to send message".to_string()),
            details: self.details,
        }
    }
}
