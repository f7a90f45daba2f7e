//! Document and biometric intake: validation before a record exists, and
//! folding a verifier's verdict into the record afterwards.

use crate::error::{DocumentRejection, VerificationError};
use crate::requirements::VerificationConfig;
use crate::verifier::{BiometricAssessment, DocumentAssessment};
use kyc_types::{
    BiometricData, BiometricType, DocumentType, DocumentUpload, RecordStatus, Timestamp,
    UploadedFile,
};

/// Check a file against the configured constraints for its document type.
pub fn validate_document(
    config: &VerificationConfig,
    document_type: DocumentType,
    file: &UploadedFile,
) -> Result<(), VerificationError> {
    let reject = |reason| VerificationError::Document {
        document_type,
        reason,
    };

    let constraints = config
        .document(document_type)
        .ok_or_else(|| reject(DocumentRejection::UnsupportedDocumentType))?;

    if !constraints.accepts_format(&file.mime_type) {
        return Err(reject(DocumentRejection::UnsupportedFormat {
            mime_type: file.mime_type.clone(),
            accepted: constraints.accepted_formats.clone(),
        }));
    }
    if file.size == 0 {
        return Err(reject(DocumentRejection::EmptyFile));
    }
    if file.size > constraints.max_size_bytes {
        return Err(reject(DocumentRejection::FileTooLarge {
            size: file.size,
            max: constraints.max_size_bytes,
        }));
    }
    Ok(())
}

pub fn validate_biometric(
    biometric_type: BiometricType,
    payload: &[u8],
    max_bytes: u64,
) -> Result<(), VerificationError> {
    let reason = if payload.is_empty() {
        "payload is empty".to_string()
    } else if payload.len() as u64 > max_bytes {
        format!(
            "payload of {} bytes exceeds maximum of {max_bytes} bytes",
            payload.len()
        )
    } else {
        return Ok(());
    };
    Err(VerificationError::Biometric {
        biometric_type,
        confidence: None,
        reason,
    })
}

/// Replace a processing record with the verifier's outcome.
///
/// A verifier error rejects the record with the error text as reason.
pub fn settle_document(
    record: &mut DocumentUpload,
    verdict: Result<DocumentAssessment, VerificationError>,
    threshold: f64,
    now: Timestamp,
) {
    record.processed_at = Some(now);
    match verdict {
        Ok(assessment) => {
            record.confidence = Some(assessment.confidence);
            record.extracted_fields = assessment.extracted_fields;
            if assessment.confidence > threshold {
                record.status = RecordStatus::Verified;
                record.rejection_reason = None;
            } else {
                record.status = RecordStatus::Rejected;
                record.rejection_reason = Some(below_threshold(assessment.confidence, threshold));
            }
        }
        Err(e) => {
            record.status = RecordStatus::Rejected;
            record.confidence = Some(0.0);
            record.rejection_reason = Some(e.to_string());
        }
    }
}

/// Biometric counterpart of [`settle_document`].
pub fn settle_biometric(
    record: &mut BiometricData,
    verdict: Result<BiometricAssessment, VerificationError>,
    threshold: f64,
    now: Timestamp,
) {
    record.processed_at = Some(now);
    match verdict {
        Ok(assessment) => {
            record.confidence = Some(assessment.confidence);
            record.match_score = Some(assessment.match_score);
            record.liveness_score = Some(assessment.liveness_score);
            if assessment.confidence > threshold {
                record.status = RecordStatus::Verified;
                record.rejection_reason = None;
            } else {
                record.status = RecordStatus::Rejected;
                record.rejection_reason = Some(below_threshold(assessment.confidence, threshold));
            }
        }
        Err(e) => {
            record.status = RecordStatus::Rejected;
            record.confidence = Some(0.0);
            record.rejection_reason = Some(e.to_string());
        }
    }
}

fn below_threshold(confidence: f64, threshold: f64) -> String {
    format!("confidence {confidence:.2} is not above threshold {threshold:.2}")
}
