//! Nullable verifiers: fixed scores instead of a provider round-trip.

use kyc_types::{BiometricType, DocumentType, UploadedFile};
use kyc_verification::{
    BiometricAssessment, BiometricVerifier, DocumentAssessment, DocumentVerifier,
    VerificationError,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A document verifier that always reports the same confidence, or always
/// fails as if the provider were down.
#[derive(Debug)]
pub struct FixedDocumentVerifier {
    outcome: Result<f64, String>,
    calls: AtomicUsize,
}

impl FixedDocumentVerifier {
    pub fn scoring(confidence: f64) -> Self {
        Self {
            outcome: Ok(confidence),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of documents assessed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentVerifier for FixedDocumentVerifier {
    fn name(&self) -> &str {
        "fixed-document"
    }

    fn assess(
        &self,
        document_type: DocumentType,
        file: &UploadedFile,
    ) -> Result<DocumentAssessment, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let confidence = self.outcome.clone().map_err(VerificationError::Provider)?;
        let mut extracted_fields = BTreeMap::new();
        extracted_fields.insert("document_type".to_string(), document_type.to_string());
        extracted_fields.insert("file_name".to_string(), file.name.clone());
        Ok(DocumentAssessment {
            confidence,
            extracted_fields,
        })
    }
}

/// Biometric counterpart of [`FixedDocumentVerifier`]. Match and liveness
/// scores mirror the confidence.
#[derive(Debug)]
pub struct FixedBiometricVerifier {
    outcome: Result<f64, String>,
    calls: AtomicUsize,
}

impl FixedBiometricVerifier {
    pub fn scoring(confidence: f64) -> Self {
        Self {
            outcome: Ok(confidence),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BiometricVerifier for FixedBiometricVerifier {
    fn name(&self) -> &str {
        "fixed-biometric"
    }

    fn assess(
        &self,
        _biometric_type: BiometricType,
        _payload: &[u8],
    ) -> Result<BiometricAssessment, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let confidence = self.outcome.clone().map_err(VerificationError::Provider)?;
        Ok(BiometricAssessment {
            confidence,
            match_score: confidence,
            liveness_score: confidence,
        })
    }
}
