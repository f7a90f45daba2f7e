//! Biometric captures and their records.

use crate::{RecordId, RecordStatus, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricType {
    Selfie,
    LivenessVideo,
    Fingerprint,
    Voice,
}

impl BiometricType {
    pub const ALL: [Self; 4] = [Self::Selfie, Self::LivenessVideo, Self::Fingerprint, Self::Voice];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selfie => "selfie",
            Self::LivenessVideo => "liveness_video",
            Self::Fingerprint => "fingerprint",
            Self::Voice => "voice",
        }
    }
}

impl fmt::Display for BiometricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BiometricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("unknown biometric type: {s}"))
    }
}

/// A biometric record attached to a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiometricData {
    pub id: RecordId,
    pub user_id: UserId,
    pub biometric_type: BiometricType,
    pub payload_size: u64,
    pub status: RecordStatus,
    pub confidence: Option<f64>,
    /// Similarity against the photo on the identity document.
    pub match_score: Option<f64>,
    pub liveness_score: Option<f64>,
    pub rejection_reason: Option<String>,
    pub submitted_at: Timestamp,
    pub processed_at: Option<Timestamp>,
}

impl BiometricData {
    /// A fresh record in the `Processing` state.
    pub fn processing(
        user_id: UserId,
        biometric_type: BiometricType,
        payload_size: u64,
        now: Timestamp,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            user_id,
            biometric_type,
            payload_size,
            status: RecordStatus::Processing,
            confidence: None,
            match_score: None,
            liveness_score: None,
            rejection_reason: None,
            submitted_at: now,
            processed_at: None,
        }
    }
}
