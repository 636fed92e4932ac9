use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pending verification request: an unverified user asked one specific
/// verifier to vouch for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    pub code: String,
    pub requester_id: Uuid,
    pub verifier_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

/// A verifier's ruling on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationDecision {
    Approve,
    Reject,
}
