//! Identity documents: the file descriptor handed in by the caller and the
//! record kept on the session.

use crate::{RecordId, RecordStatus, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    DriversLicense,
    NationalId,
    UtilityBill,
    BankStatement,
}

impl DocumentType {
    pub const ALL: [Self; 5] = [
        Self::Passport,
        Self::DriversLicense,
        Self::NationalId,
        Self::UtilityBill,
        Self::BankStatement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::DriversLicense => "drivers_license",
            Self::NationalId => "national_id",
            Self::UtilityBill => "utility_bill",
            Self::BankStatement => "bank_statement",
        }
    }

    /// Government-issued photo ID, as opposed to proof of address.
    pub fn is_identity_document(&self) -> bool {
        matches!(self, Self::Passport | Self::DriversLicense | Self::NationalId)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("unknown document type: {s}"))
    }
}

/// A file as submitted by the client: declared name, size and MIME type.
///
/// `size` is the declared size and is what intake validates; `content` is
/// optional and only forwarded to the document verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            content: Vec::new(),
        }
    }

    /// Attach the file body; the declared size is taken from it.
    pub fn with_content(mut self, content: Vec<u8>) -> Self {
        self.size = content.len() as u64;
        self.content = content;
        self
    }
}

/// A document record attached to a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub id: RecordId,
    pub user_id: UserId,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub status: RecordStatus,
    /// Verifier confidence in `[0.0, 1.0]`; `None` while processing.
    pub confidence: Option<f64>,
    /// Fields read off the document (name, number, dates, ...).
    pub extracted_fields: BTreeMap<String, String>,
    pub rejection_reason: Option<String>,
    pub uploaded_at: Timestamp,
    pub processed_at: Option<Timestamp>,
}

impl DocumentUpload {
    /// A fresh record in the `Processing` state.
    pub fn processing(
        user_id: UserId,
        document_type: DocumentType,
        file: &UploadedFile,
        now: Timestamp,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            user_id,
            document_type,
            file_name: file.name.clone(),
            file_size: file.size,
            mime_type: file.mime_type.clone(),
            status: RecordStatus::Processing,
            confidence: None,
            extracted_fields: BTreeMap::new(),
            rejection_reason: None,
            uploaded_at: now,
            processed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_content_overrides_declared_size() {
        let file = UploadedFile::new("id.png", 1, "image/png").with_content(vec![0u8; 42]);
        assert_eq!(file.size, 42);
    }

    #[test]
    fn processing_record_copies_file_descriptor() {
        let file = UploadedFile::new("passport.pdf", 2048, "application/pdf");
        let record = DocumentUpload::processing(
            UserId::new("alice"),
            DocumentType::Passport,
            &file,
            Timestamp::new(7),
        );
        assert_eq!(record.status, RecordStatus::Processing);
        assert_eq!(record.file_name, "passport.pdf");
        assert_eq!(record.file_size, 2048);
        assert!(record.confidence.is_none());
        assert!(record.processed_at.is_none());
    }

    #[test]
    fn document_type_round_trips_through_str() {
        for t in DocumentType::ALL {
            assert_eq!(t.as_str().parse::<DocumentType>().unwrap(), t);
        }
    }
}
