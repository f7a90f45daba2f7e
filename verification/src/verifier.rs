//! Pluggable document and biometric verifiers.
//!
//! The service only knows these traits. A production deployment plugs in a
//! client for an external verification provider; the simulated verifiers
//! below stand in for one with randomized scores, and deterministic doubles
//! live in `kyc-nullables`.

use crate::error::VerificationError;
use kyc_types::{BiometricType, DocumentType, UploadedFile};
use rand::Rng;
use std::collections::BTreeMap;
use std::ops::Range;

/// A provider's verdict on a document.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentAssessment {
    /// Confidence that the document is genuine and legible, in `[0.0, 1.0]`.
    pub confidence: f64,
    pub extracted_fields: BTreeMap<String, String>,
}

/// A provider's verdict on a biometric capture.
#[derive(Clone, Debug, PartialEq)]
pub struct BiometricAssessment {
    pub confidence: f64,
    pub match_score: f64,
    pub liveness_score: f64,
}

pub trait DocumentVerifier: Send + Sync {
    /// Human-readable name of this verifier.
    fn name(&self) -> &str;

    fn assess(
        &self,
        document_type: DocumentType,
        file: &UploadedFile,
    ) -> Result<DocumentAssessment, VerificationError>;
}

pub trait BiometricVerifier: Send + Sync {
    /// Human-readable name of this verifier.
    fn name(&self) -> &str;

    fn assess(
        &self,
        biometric_type: BiometricType,
        payload: &[u8],
    ) -> Result<BiometricAssessment, VerificationError>;
}

/// Randomized document scores with placeholder extracted fields.
#[derive(Clone, Debug)]
pub struct SimulatedDocumentVerifier {
    pub confidence: Range<f64>,
}

impl Default for SimulatedDocumentVerifier {
    fn default() -> Self {
        Self {
            confidence: 0.70..1.0,
        }
    }
}

impl DocumentVerifier for SimulatedDocumentVerifier {
    fn name(&self) -> &str {
        "simulated-document"
    }

    fn assess(
        &self,
        document_type: DocumentType,
        _file: &UploadedFile,
    ) -> Result<DocumentAssessment, VerificationError> {
        let mut rng = rand::thread_rng();
        let confidence = rng.gen_range(self.confidence.clone());
        let document_number = format!("{:09}", rng.gen_range(0..1_000_000_000u32));
        Ok(DocumentAssessment {
            confidence,
            extracted_fields: placeholder_fields(document_type, document_number),
        })
    }
}

fn placeholder_fields(document_type: DocumentType, number: String) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    fields.insert("full_name".to_string(), "Jane Doe".to_string());
    if document_type.is_identity_document() {
        fields.insert("document_number".to_string(), number);
        fields.insert("date_of_birth".to_string(), "1990-01-01".to_string());
        fields.insert("expiry_date".to_string(), "2030-12-31".to_string());
        fields.insert("nationality".to_string(), "US".to_string());
    } else {
        fields.insert("account_reference".to_string(), number);
        fields.insert("address".to_string(), "123 Main Street, Springfield".to_string());
        fields.insert("issue_date".to_string(), "2026-01-15".to_string());
    }
    fields
}

/// Randomized biometric scores.
#[derive(Clone, Debug)]
pub struct SimulatedBiometricVerifier {
    pub confidence: Range<f64>,
    pub match_score: Range<f64>,
    pub liveness_score: Range<f64>,
}

impl Default for SimulatedBiometricVerifier {
    fn default() -> Self {
        Self {
            confidence: 0.75..1.0,
            match_score: 0.80..1.0,
            liveness_score: 0.85..1.0,
        }
    }
}

impl BiometricVerifier for SimulatedBiometricVerifier {
    fn name(&self) -> &str {
        "simulated-biometric"
    }

    fn assess(
        &self,
        _biometric_type: BiometricType,
        _payload: &[u8],
    ) -> Result<BiometricAssessment, VerificationError> {
        let mut rng = rand::thread_rng();
        Ok(BiometricAssessment {
            confidence: rng.gen_range(self.confidence.clone()),
            match_score: rng.gen_range(self.match_score.clone()),
            liveness_score: rng.gen_range(self.liveness_score.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_document_scores_stay_in_range() {
        let verifier = SimulatedDocumentVerifier::default();
        let file = UploadedFile::new("p.png", 10, "image/png");
        for _ in 0..200 {
            let a = verifier.assess(DocumentType::Passport, &file).unwrap();
            assert!((0.70..1.0).contains(&a.confidence));
            assert!(a.extracted_fields.contains_key("document_number"));
        }
    }

    #[test]
    fn address_documents_get_address_fields() {
        let verifier = SimulatedDocumentVerifier::default();
        let file = UploadedFile::new("bill.pdf", 10, "application/pdf");
        let a = verifier.assess(DocumentType::UtilityBill, &file).unwrap();
        assert!(a.extracted_fields.contains_key("address"));
        assert!(!a.extracted_fields.contains_key("document_number"));
    }

    #[test]
    fn simulated_biometric_scores_stay_in_range() {
        let verifier = SimulatedBiometricVerifier::default();
        for _ in 0..200 {
            let a = verifier.assess(BiometricType::Selfie, b"face").unwrap();
            assert!((0.75..1.0).contains(&a.confidence));
            assert!((0.80..1.0).contains(&a.match_score));
            assert!((0.85..1.0).contains(&a.liveness_score));
        }
    }
}
