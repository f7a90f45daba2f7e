//! The verification service: session lifecycle plus document/biometric intake.
//!
//! All collaborators are injected through [`ServiceBuilder`]; there is no
//! global state. Every mutation of a session goes through
//! [`Inner::update_session`], which holds that session's lock for the whole
//! load-modify-store cycle. Session creation holds a per-user lock so a user
//! never ends up with two open sessions.
//!
//! Document and biometric intake return a `processing` record immediately and
//! spawn a task that waits for the configured delay, asks the verifier, and
//! replaces the record with the outcome.
//!
//! Events queue up until [`VerificationService::drain_events`] is called.
//! Callers are expected to drain regularly; past `max_pending_events` the
//! oldest events are dropped and counted under `events_dropped`.

use crate::audit::{AuditAction, AuditEvent, AuditSink, TracingAuditSink};
use crate::auth::AuthProvider;
use crate::config::ServiceConfig;
use crate::error::VerificationError;
use crate::events::VerificationEvent;
use crate::intake;
use crate::locks::SessionLocks;
use crate::progression::{self, ReviewDecision, StepData, StepOutcome};
use crate::requirements::VerificationConfig;
use crate::verifier::{
    BiometricVerifier, DocumentVerifier, SimulatedBiometricVerifier, SimulatedDocumentVerifier,
};
use kyc_store::{MemorySessionStore, SessionStore, StoreError};
use kyc_types::{
    BiometricData, BiometricType, Clock, DocumentType, DocumentUpload, RecordId, RecordStatus,
    SessionId, StepId, SystemClock, Timestamp, UploadedFile, UserId, VerificationLevel,
    VerificationProgress, VerificationSession,
};
use kyc_utils::StatsCounter;
use serde_json::json;
use std::future::Future;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Counter names registered in [`VerificationService::stats`].
pub const STAT_NAMES: &[&str] = &[
    "sessions_started",
    "sessions_resumed",
    "steps_completed",
    "documents_uploaded",
    "documents_rejected_on_intake",
    "biometrics_submitted",
    "biometrics_rejected_on_intake",
    "records_verified",
    "records_rejected",
    "processing_in_flight",
    "sessions_reviewed",
    "sessions_expired",
    "events_dropped",
];

fn session_key(id: &SessionId) -> String {
    format!("session:{id}")
}

fn user_key(id: &UserId) -> String {
    format!("user:{id}")
}

/// Builds a [`VerificationService`].
///
/// Only the auth provider is mandatory; everything else defaults to the
/// production implementation (in-memory store, wall clock, tracing audit
/// sink, simulated verifiers, default tables and config).
pub struct ServiceBuilder {
    auth: Arc<dyn AuthProvider>,
    config: ServiceConfig,
    requirements: VerificationConfig,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditSink>,
    document_verifier: Arc<dyn DocumentVerifier>,
    biometric_verifier: Arc<dyn BiometricVerifier>,
}

impl ServiceBuilder {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            auth,
            config: ServiceConfig::default(),
            requirements: VerificationConfig::standard(),
            store: Arc::new(MemorySessionStore::new()),
            clock: Arc::new(SystemClock),
            audit: Arc::new(TracingAuditSink),
            document_verifier: Arc::new(SimulatedDocumentVerifier::default()),
            biometric_verifier: Arc::new(SimulatedBiometricVerifier::default()),
        }
    }

    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn requirements(mut self, requirements: VerificationConfig) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn document_verifier(mut self, verifier: Arc<dyn DocumentVerifier>) -> Self {
        self.document_verifier = verifier;
        self
    }

    pub fn biometric_verifier(mut self, verifier: Arc<dyn BiometricVerifier>) -> Self {
        self.biometric_verifier = verifier;
        self
    }

    pub fn build(self) -> VerificationService {
        let (in_flight, _) = watch::channel(0);
        VerificationService {
            inner: Arc::new(Inner {
                config: self.config,
                requirements: self.requirements,
                store: self.store,
                clock: self.clock,
                auth: self.auth,
                audit: self.audit,
                document_verifier: self.document_verifier,
                biometric_verifier: self.biometric_verifier,
                locks: SessionLocks::new(),
                events: Mutex::new(VecDeque::new()),
                in_flight,
                stats: StatsCounter::new(STAT_NAMES),
            }),
        }
    }
}

/// Orchestrates verification sessions. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct VerificationService {
    inner: Arc<Inner>,
}

struct Inner {
    config: ServiceConfig,
    requirements: VerificationConfig,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    auth: Arc<dyn AuthProvider>,
    audit: Arc<dyn AuditSink>,
    document_verifier: Arc<dyn DocumentVerifier>,
    biometric_verifier: Arc<dyn BiometricVerifier>,
    locks: SessionLocks,
    events: Mutex<VecDeque<VerificationEvent>>,
    /// Number of processing tasks that have not finished yet.
    in_flight: watch::Sender<usize>,
    stats: StatsCounter,
}

impl VerificationService {
    pub fn builder(auth: Arc<dyn AuthProvider>) -> ServiceBuilder {
        ServiceBuilder::new(auth)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn requirements(&self) -> &VerificationConfig {
        &self.inner.requirements
    }

    pub fn stats(&self) -> &StatsCounter {
        &self.inner.stats
    }

    // ── Session lifecycle ──────────────────────────────────────────────

    /// Start verification at `level`, or return the user's open session.
    pub async fn start_verification(
        &self,
        user_id: &UserId,
        level: VerificationLevel,
    ) -> Result<VerificationSession, VerificationError> {
        let inner = &self.inner;
        let user = inner
            .auth
            .current_user()
            .ok_or(VerificationError::NotAuthenticated)?;
        let method = inner.auth.current_method();

        let key = user_key(user_id);
        let guard = inner.locks.acquire(&key).await;
        let now = inner.clock.now();
        let opened = inner.open_or_create(user_id, level, now);
        drop(guard);
        inner.locks.release(&key).await;

        let session = match opened? {
            Opened::Existing(existing) => {
                debug!(session = %existing.id, user = %user_id, "resuming open session");
                inner.stats.increment("sessions_resumed");
                return Ok(existing);
            }
            Opened::Created(session) => session,
        };

        inner.stats.increment("sessions_started");
        inner.push_event(VerificationEvent::SessionStarted {
            session: session.id.clone(),
            user: user_id.clone(),
            level,
        });
        inner.record_audit(
            user_id,
            AuditAction::VerificationStarted,
            json!({
                "session_id": session.id,
                "level": level,
                "auth_method": method,
                "authenticated_as": user.id,
                "steps": session.steps.iter().map(|s| s.step_type).collect::<Vec<_>>(),
                "expires_at": session.expires_at.as_secs(),
            }),
            now,
        );
        info!(
            session = %session.id,
            user = %user_id,
            level = %level,
            steps = session.steps.len(),
            "verification session started"
        );
        Ok(session)
    }

    /// Approve a step, merge `data` into its metadata and advance the session.
    pub async fn complete_step(
        &self,
        session_id: &SessionId,
        step_id: &StepId,
        data: Option<StepData>,
    ) -> Result<VerificationSession, VerificationError> {
        let inner = &self.inner;
        let (outcome, session, now) = inner
            .update_session(session_id, |session, now| {
                let outcome = progression::complete_step(session, step_id, data, now)?;
                Ok((outcome, session.clone(), now))
            })
            .await?;

        let step_type = session
            .step(step_id)
            .map(|s| s.step_type)
            .ok_or_else(|| VerificationError::StepNotFound {
                session: session_id.clone(),
                step: step_id.clone(),
            })?;

        inner.stats.increment("steps_completed");
        inner.push_event(VerificationEvent::StepCompleted {
            session: session_id.clone(),
            step: step_id.clone(),
            step_type,
        });
        inner.record_audit(
            &session.user_id,
            AuditAction::StepCompleted,
            json!({
                "session_id": session_id,
                "step_id": step_id,
                "step_type": step_type,
            }),
            now,
        );

        match &outcome {
            StepOutcome::Advanced { next } => {
                debug!(session = %session_id, completed = %step_type, next = %next, "step completed");
            }
            StepOutcome::ReadyForReview => {
                inner.push_event(VerificationEvent::ReadyForReview {
                    session: session_id.clone(),
                });
                info!(session = %session_id, user = %session.user_id, "all required steps complete, pending review");
            }
            StepOutcome::Recorded => {
                debug!(session = %session_id, completed = %step_type, "step recorded");
            }
        }
        Ok(session)
    }

    /// Look up a session by id.
    pub fn get_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<VerificationSession>, VerificationError> {
        match self.inner.store.get_session(session_id) {
            Ok(session) => Ok(Some(session)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The user's open session, if any.
    pub fn get_active_session(
        &self,
        user_id: &UserId,
    ) -> Result<Option<VerificationSession>, VerificationError> {
        Ok(self.inner.store.open_session_for_user(user_id)?)
    }

    pub fn progress(&self, session_id: &SessionId) -> Result<VerificationProgress, VerificationError> {
        Ok(self.inner.load(session_id)?.progress())
    }

    /// Apply a reviewer's decision to a session awaiting review.
    pub async fn review_session(
        &self,
        session_id: &SessionId,
        decision: ReviewDecision,
    ) -> Result<VerificationSession, VerificationError> {
        let inner = &self.inner;
        let (session, now) = inner
            .update_session(session_id, |session, now| {
                progression::apply_review(session, &decision)?;
                Ok((session.clone(), now))
            })
            .await?;

        inner.stats.increment("sessions_reviewed");
        inner.push_event(VerificationEvent::SessionReviewed {
            session: session_id.clone(),
            status: session.status,
        });
        inner.record_audit(
            &session.user_id,
            AuditAction::SessionReviewed,
            json!({
                "session_id": session_id,
                "status": session.status,
                "decision": decision,
            }),
            now,
        );
        info!(session = %session_id, status = %session.status, "session reviewed");
        Ok(session)
    }

    /// Mark every open session whose deadline has passed as expired.
    ///
    /// Expiry is never enforced implicitly; this sweep is the only place
    /// sessions become `expired`.
    pub async fn expire_stale_sessions(&self) -> Result<Vec<SessionId>, VerificationError> {
        let inner = &self.inner;
        let now = inner.clock.now();
        let candidates: Vec<SessionId> = inner
            .store
            .iter_sessions()?
            .into_iter()
            .filter(|s| s.status.is_open() && s.is_expired_at(now))
            .map(|s| s.id)
            .collect();

        let mut expired = Vec::new();
        for id in candidates {
            let (changed, user_id, at) = inner
                .update_session(&id, |session, now| {
                    let changed = progression::expire_if_stale(session, now);
                    Ok((changed, session.user_id.clone(), now))
                })
                .await?;
            if !changed {
                continue;
            }
            inner.stats.increment("sessions_expired");
            inner.push_event(VerificationEvent::SessionExpired {
                session: id.clone(),
            });
            inner.record_audit(
                &user_id,
                AuditAction::SessionExpired,
                json!({ "session_id": id }),
                at,
            );
            expired.push(id);
        }

        if !expired.is_empty() {
            info!(count = expired.len(), "expired stale sessions");
        }
        // Entries left by callers that were cancelled while holding a lock.
        inner.locks.cleanup().await;
        Ok(expired)
    }

    /// Take all pending events.
    pub fn drain_events(&self) -> Vec<VerificationEvent> {
        self.inner
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    // ── Intake ─────────────────────────────────────────────────────────

    /// Validate and accept a document. The returned record is `processing`;
    /// its outcome is recorded on the session after the processing delay.
    pub async fn upload_document(
        &self,
        session_id: &SessionId,
        document_type: DocumentType,
        file: UploadedFile,
    ) -> Result<DocumentUpload, VerificationError> {
        let inner = &self.inner;
        if let Err(e) = intake::validate_document(&inner.requirements, document_type, &file) {
            inner.stats.increment("documents_rejected_on_intake");
            warn!(session = %session_id, document_type = %document_type, error = %e, "document rejected at intake");
            return Err(e);
        }

        let record = inner
            .update_session(session_id, |session, now| {
                ensure_accepts_intake(session)?;
                let record =
                    DocumentUpload::processing(session.user_id.clone(), document_type, &file, now);
                session.documents.push(record.clone());
                Ok(record)
            })
            .await?;

        inner.stats.increment("documents_uploaded");
        inner.record_audit(
            &record.user_id,
            AuditAction::DocumentUploaded,
            json!({
                "session_id": session_id,
                "record_id": record.id,
                "document_type": document_type,
                "file_name": record.file_name,
                "file_size": record.file_size,
            }),
            record.uploaded_at,
        );
        debug!(session = %session_id, record = %record.id, document_type = %document_type, "document accepted for processing");

        self.spawn_processing(process_document(
            Arc::clone(inner),
            session_id.clone(),
            record.id.clone(),
            document_type,
            file,
        ));
        Ok(record)
    }

    /// Validate and accept a biometric capture; same shape as
    /// [`Self::upload_document`].
    pub async fn submit_biometric(
        &self,
        session_id: &SessionId,
        biometric_type: BiometricType,
        payload: Vec<u8>,
    ) -> Result<BiometricData, VerificationError> {
        let inner = &self.inner;
        if let Err(e) =
            intake::validate_biometric(biometric_type, &payload, inner.config.max_biometric_bytes)
        {
            inner.stats.increment("biometrics_rejected_on_intake");
            warn!(session = %session_id, biometric_type = %biometric_type, error = %e, "biometric rejected at intake");
            return Err(e);
        }

        let record = inner
            .update_session(session_id, |session, now| {
                ensure_accepts_intake(session)?;
                let record = BiometricData::processing(
                    session.user_id.clone(),
                    biometric_type,
                    payload.len() as u64,
                    now,
                );
                session.biometrics.push(record.clone());
                Ok(record)
            })
            .await?;

        inner.stats.increment("biometrics_submitted");
        inner.record_audit(
            &record.user_id,
            AuditAction::BiometricSubmitted,
            json!({
                "session_id": session_id,
                "record_id": record.id,
                "biometric_type": biometric_type,
                "payload_size": record.payload_size,
            }),
            record.submitted_at,
        );
        debug!(session = %session_id, record = %record.id, biometric_type = %biometric_type, "biometric accepted for processing");

        self.spawn_processing(process_biometric(
            Arc::clone(inner),
            session_id.clone(),
            record.id.clone(),
            biometric_type,
            payload,
        ));
        Ok(record)
    }

    /// Wait until every in-flight processing task has finished.
    ///
    /// Does not block intake: uploads accepted while waiting are spawned
    /// normally and are waited for as well.
    pub async fn settle(&self) {
        let mut in_flight = self.inner.in_flight.subscribe();
        // The sender lives in `Inner`, so the channel stays open.
        let _ = in_flight.wait_for(|n| *n == 0).await;
    }

    fn spawn_processing<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let in_flight = InFlight::start(&self.inner);
        tokio::spawn(async move {
            let _in_flight = in_flight;
            task.await;
        });
    }
}

/// Counts one processing task as in flight until dropped, including when
/// the task panics.
struct InFlight(Arc<Inner>);

impl InFlight {
    fn start(inner: &Arc<Inner>) -> Self {
        inner.in_flight.send_modify(|n| *n += 1);
        inner.stats.increment("processing_in_flight");
        Self(Arc::clone(inner))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.send_modify(|n| *n = n.saturating_sub(1));
        self.0.stats.decrement("processing_in_flight");
    }
}

enum Opened {
    Existing(VerificationSession),
    Created(VerificationSession),
}

fn ensure_accepts_intake(session: &VerificationSession) -> Result<(), VerificationError> {
    if session.status.is_terminal() {
        return Err(VerificationError::SessionNotActive {
            session: session.id.clone(),
            status: session.status,
        });
    }
    Ok(())
}

impl Inner {
    fn load(&self, id: &SessionId) -> Result<VerificationSession, VerificationError> {
        self.store.get_session(id).map_err(|e| match e {
            StoreError::NotFound(_) => VerificationError::SessionNotFound(id.clone()),
            other => other.into(),
        })
    }

    /// The user's open session, or a freshly stored one. Call with the
    /// user's lock held.
    fn open_or_create(
        &self,
        user_id: &UserId,
        level: VerificationLevel,
        now: Timestamp,
    ) -> Result<Opened, VerificationError> {
        if let Some(existing) = self.store.open_session_for_user(user_id)? {
            return Ok(Opened::Existing(existing));
        }
        let session = progression::new_session(
            user_id.clone(),
            level,
            &self.requirements.level(level),
            now,
            self.config.session_expiry_secs,
        )?;
        self.store.insert_session(&session)?;
        Ok(Opened::Created(session))
    }

    /// Load, modify and store a session while holding its lock.
    ///
    /// Nothing is written back if `f` fails. The lock entry is released
    /// afterwards so finished sessions leave nothing behind.
    async fn update_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut VerificationSession, Timestamp) -> Result<T, VerificationError>,
    ) -> Result<T, VerificationError> {
        let key = session_key(id);
        let guard = self.locks.acquire(&key).await;
        let result = self.modify_session(id, f);
        drop(guard);
        self.locks.release(&key).await;
        result
    }

    fn modify_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut VerificationSession, Timestamp) -> Result<T, VerificationError>,
    ) -> Result<T, VerificationError> {
        let mut session = self.load(id)?;
        let out = f(&mut session, self.clock.now())?;
        self.store.put_session(&session)?;
        Ok(out)
    }

    fn push_event(&self, event: VerificationEvent) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let cap = self.config.max_pending_events.max(1);
        while events.len() >= cap {
            events.pop_front();
            self.stats.increment("events_dropped");
        }
        events.push_back(event);
    }

    fn record_audit(
        &self,
        user_id: &UserId,
        action: AuditAction,
        details: serde_json::Value,
        at: Timestamp,
    ) {
        let event = AuditEvent {
            user_id: user_id.clone(),
            action,
            details,
            at,
        };
        if let Err(e) = self.audit.record(&event) {
            warn!(user = %user_id, action = %action, error = %e, "audit sink failed");
        }
    }

    fn count_outcome(&self, status: RecordStatus) {
        match status {
            RecordStatus::Verified => self.stats.increment("records_verified"),
            RecordStatus::Rejected => self.stats.increment("records_rejected"),
            RecordStatus::Processing => {}
        }
    }
}

async fn process_document(
    inner: Arc<Inner>,
    session_id: SessionId,
    record_id: RecordId,
    document_type: DocumentType,
    file: UploadedFile,
) {
    tokio::time::sleep(inner.config.document_processing_delay()).await;

    let verdict = inner.document_verifier.assess(document_type, &file);
    if let Err(e) = &verdict {
        warn!(
            session = %session_id,
            record = %record_id,
            verifier = inner.document_verifier.name(),
            error = %e,
            "document verifier failed"
        );
    }

    let threshold = inner.config.document_confidence_threshold;
    let settled = inner
        .update_session(&session_id, |session, now| {
            let record = session.document_mut(&record_id).ok_or_else(|| {
                VerificationError::Other(format!("document record {record_id} vanished"))
            })?;
            intake::settle_document(record, verdict, threshold, now);
            Ok((record.status, record.confidence, record.user_id.clone(), now))
        })
        .await;

    match settled {
        Ok((status, confidence, user_id, at)) => {
            inner.count_outcome(status);
            inner.push_event(VerificationEvent::DocumentProcessed {
                session: session_id.clone(),
                record: record_id.clone(),
                status,
            });
            inner.record_audit(
                &user_id,
                AuditAction::DocumentProcessed,
                json!({
                    "session_id": session_id,
                    "record_id": record_id,
                    "status": status,
                    "confidence": confidence,
                }),
                at,
            );
            debug!(session = %session_id, record = %record_id, ?status, "document processed");
        }
        Err(e) => {
            warn!(session = %session_id, record = %record_id, error = %e, "failed to record document outcome");
        }
    }
}

async fn process_biometric(
    inner: Arc<Inner>,
    session_id: SessionId,
    record_id: RecordId,
    biometric_type: BiometricType,
    payload: Vec<u8>,
) {
    tokio::time::sleep(inner.config.biometric_processing_delay()).await;

    let verdict = inner.biometric_verifier.assess(biometric_type, &payload);
    if let Err(e) = &verdict {
        warn!(
            session = %session_id,
            record = %record_id,
            verifier = inner.biometric_verifier.name(),
            error = %e,
            "biometric verifier failed"
        );
    }

    let threshold = inner.config.biometric_confidence_threshold;
    let settled = inner
        .update_session(&session_id, |session, now| {
            let record = session.biometric_mut(&record_id).ok_or_else(|| {
                VerificationError::Other(format!("biometric record {record_id} vanished"))
            })?;
            intake::settle_biometric(record, verdict, threshold, now);
            Ok((record.status, record.confidence, record.user_id.clone(), now))
        })
        .await;

    match settled {
        Ok((status, confidence, user_id, at)) => {
            inner.count_outcome(status);
            inner.push_event(VerificationEvent::BiometricProcessed {
                session: session_id.clone(),
                record: record_id.clone(),
                status,
            });
            inner.record_audit(
                &user_id,
                AuditAction::BiometricProcessed,
                json!({
                    "session_id": session_id,
                    "record_id": record_id,
                    "status": status,
                    "confidence": confidence,
                }),
                at,
            );
            debug!(session = %session_id, record = %record_id, ?status, "biometric processed");
        }
        Err(e) => {
            warn!(session = %session_id, record = %record_id, error = %e, "failed to record biometric outcome");
        }
    }
}
