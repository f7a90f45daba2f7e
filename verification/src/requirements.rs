//! The static requirements table: which steps each level needs, and what
//! each document type may look like.
//!
//! Built once when the service is constructed and read-only afterwards.

use kyc_types::{DocumentType, StepType, VerificationLevel};
use serde::Serialize;
use std::collections::HashMap;

const MIB: u64 = 1024 * 1024;

const IMAGE_OR_PDF: &[&str] = &["image/jpeg", "image/png", "application/pdf"];
const PHOTO_ID: &[&str] = &["image/jpeg", "image/png", "image/heic", "application/pdf"];

/// Steps for one level, in the order they are generated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LevelRequirements {
    pub required: Vec<StepType>,
    pub optional: Vec<StepType>,
}

impl LevelRequirements {
    pub fn new(required: &[StepType], optional: &[StepType]) -> Self {
        Self {
            required: required.to_vec(),
            optional: optional.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }

    /// Required steps followed by optional ones, each tagged with its flag.
    pub fn ordered(&self) -> impl Iterator<Item = (StepType, bool)> + '_ {
        self.required
            .iter()
            .map(|&t| (t, true))
            .chain(self.optional.iter().map(|&t| (t, false)))
    }
}

/// Intake limits for one document type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentConstraints {
    /// Accepted MIME types, lowercase.
    pub accepted_formats: Vec<String>,
    pub max_size_bytes: u64,
}

impl DocumentConstraints {
    pub fn new(accepted_formats: &[&str], max_size_bytes: u64) -> Self {
        Self {
            accepted_formats: accepted_formats.iter().map(|f| f.to_lowercase()).collect(),
            max_size_bytes,
        }
    }

    pub fn accepts_format(&self, mime_type: &str) -> bool {
        let mime_type = mime_type.trim().to_lowercase();
        self.accepted_formats.iter().any(|f| *f == mime_type)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationConfig {
    levels: HashMap<VerificationLevel, LevelRequirements>,
    documents: HashMap<DocumentType, DocumentConstraints>,
}

impl VerificationConfig {
    /// An empty table; every level has no steps and no document is accepted.
    pub fn empty() -> Self {
        Self {
            levels: HashMap::new(),
            documents: HashMap::new(),
        }
    }

    /// The built-in table.
    pub fn standard() -> Self {
        use StepType::*;

        let basic = [EmailVerification, PhoneVerification];
        let standard = [
            EmailVerification,
            PhoneVerification,
            PersonalInformation,
            DocumentUpload,
        ];
        let enhanced = [
            EmailVerification,
            PhoneVerification,
            PersonalInformation,
            DocumentUpload,
            SelfieVerification,
            LivenessCheck,
        ];
        let premium = [
            EmailVerification,
            PhoneVerification,
            PersonalInformation,
            DocumentUpload,
            SelfieVerification,
            LivenessCheck,
            AddressVerification,
            SourceOfFunds,
        ];

        Self::empty()
            .with_level(VerificationLevel::None, LevelRequirements::default())
            .with_level(VerificationLevel::Basic, LevelRequirements::new(&basic, &[]))
            .with_level(
                VerificationLevel::Standard,
                LevelRequirements::new(&standard, &[AddressVerification]),
            )
            .with_level(
                VerificationLevel::Enhanced,
                LevelRequirements::new(&enhanced, &[AddressVerification]),
            )
            .with_level(
                VerificationLevel::Premium,
                LevelRequirements::new(&premium, &[VideoCall]),
            )
            .with_document(DocumentType::Passport, DocumentConstraints::new(IMAGE_OR_PDF, 10 * MIB))
            .with_document(DocumentType::DriversLicense, DocumentConstraints::new(PHOTO_ID, 10 * MIB))
            .with_document(DocumentType::NationalId, DocumentConstraints::new(PHOTO_ID, 10 * MIB))
            .with_document(DocumentType::UtilityBill, DocumentConstraints::new(IMAGE_OR_PDF, 5 * MIB))
            .with_document(DocumentType::BankStatement, DocumentConstraints::new(&["application/pdf"], 5 * MIB))
    }

    pub fn with_level(mut self, level: VerificationLevel, requirements: LevelRequirements) -> Self {
        self.levels.insert(level, requirements);
        self
    }

    pub fn with_document(mut self, document_type: DocumentType, constraints: DocumentConstraints) -> Self {
        self.documents.insert(document_type, constraints);
        self
    }

    /// Steps for a level. Unconfigured levels have none.
    pub fn level(&self, level: VerificationLevel) -> LevelRequirements {
        self.levels.get(&level).cloned().unwrap_or_default()
    }

    pub fn document(&self, document_type: DocumentType) -> Option<&DocumentConstraints> {
        self.documents.get(&document_type)
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self::standard()
    }
}
