//! The `{status: "success" | "error"}` response envelope.

use serde::{Deserialize, Serialize};

/// Uniform response wrapper shared with the optimizer service.
///
/// ```rust
/// use rakeplan_core::upstream::Envelope;
///
/// let ok: Envelope<Vec<u32>> = serde_json::from_str(r#"{"status":"success","data":[1,2]}"#).unwrap();
/// assert_eq!(ok, Envelope::success(vec![1, 2]));
///
/// let err: Envelope<Vec<u32>> =
///     serde_json::from_str(r#"{"status":"error","message":"solver down"}"#).unwrap();
/// assert!(matches!(err, Envelope::Error { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success {
        data: T,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn error(message: impl Into<String>, details: Option<String>) -> Self {
        Self::Error {
            message: message.into(),
            details,
        }
    }
}

/// Outcome status of a dataset write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Success,
    Error,
}

/// Reply to a dataset write, relayed as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_omits_missing_details() {
        let envelope: Envelope<()> = Envelope::error("Malformed response", None);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            serde_json::json!({"status": "error", "message": "Malformed response"})
        );
    }

    #[test]
    fn test_success_without_data_is_rejected() {
        let parsed = serde_json::from_str::<Envelope<Vec<u32>>>(r#"{"status":"success"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let parsed = serde_json::from_str::<Envelope<u32>>(r#"{"status":"ok","data":1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_acknowledgement_keeps_message() {
        let ack: Acknowledgement =
            serde_json::from_str(r#"{"status":"success","message":"12 rows replaced"}"#).unwrap();
        assert_eq!(ack.status, AckStatus::Success);
        assert_eq!(ack.message.as_deref(), Some("12 rows replaced"));
    }
}
