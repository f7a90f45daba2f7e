//! Verification levels and the kinds of step a level can require.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How thorough an identity check is, from `None` to `Premium`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationLevel {
    None,
    Basic,
    Standard,
    Enhanced,
    Premium,
}

impl VerificationLevel {
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Basic,
        Self::Standard,
        Self::Enhanced,
        Self::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Enhanced => "enhanced",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "enhanced" => Ok(Self::Enhanced),
            "premium" => Ok(Self::Premium),
            other => Err(format!("unknown verification level: {other}")),
        }
    }
}

/// One discrete unit of the verification flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    EmailVerification,
    PhoneVerification,
    PersonalInformation,
    DocumentUpload,
    SelfieVerification,
    LivenessCheck,
    AddressVerification,
    SourceOfFunds,
    VideoCall,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verification",
            Self::PhoneVerification => "phone_verification",
            Self::PersonalInformation => "personal_information",
            Self::DocumentUpload => "document_upload",
            Self::SelfieVerification => "selfie_verification",
            Self::LivenessCheck => "liveness_check",
            Self::AddressVerification => "address_verification",
            Self::SourceOfFunds => "source_of_funds",
            Self::VideoCall => "video_call",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
