//! Signup flow controller.
//!
//! Drives one page view through its steps:
//!
//! ```text
//! Step(0) --submit ok--> Step(1) --submit ok--> ... --submit ok--> Completed
//!    |                      |
//!    +--submit failed-------+--> unchanged
//! ```
//!
//! `Completed` is terminal. Exactly one step submission may be outstanding
//! at a time, and [`SignupFlow::detach`] discards any result that arrives
//! after the page view has gone away.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::page::{CompletionView, ResolvedPageView};
use crate::signup::fields::FieldError;
use crate::signup::steps::{signup_steps, validate_step_sequence, StepDefinition};
use crate::types::FormValues;

// ---------------------------------------------------------------------------
// Submission seam
// ---------------------------------------------------------------------------

/// Body posted for each step: the accumulated values plus the page code.
///
/// Serializes flat, as `{ ...values, "code": code }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupPayload {
    #[serde(flatten)]
    values: FormValues,
    code: String,
}

impl SignupPayload {
    /// Build a payload. A form value named `code` is dropped in favour of
    /// the page code.
    pub fn new(mut values: FormValues, code: impl Into<String>) -> Self {
        values.remove("code");
        Self {
            values,
            code: code.into(),
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    fn into_values(self) -> FormValues {
        self.values
    }
}

/// Why a step submission did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The endpoint answered with a non-success status.
    #[error("Signup request rejected with HTTP {status}")]
    Rejected {
        status: u16,
        /// Error message from the response body, when there was one.
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("Signup request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Sends one step's payload to the signup endpoint.
#[async_trait]
pub trait StepSubmitter: Send + Sync {
    async fn submit(&self, payload: &SignupPayload) -> Result<(), SubmissionError>;
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Where the flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "step", rename_all = "snake_case")]
pub enum FlowPhase {
    /// The step at this zero-based index is showing.
    Step(usize),
    /// Every step was submitted; the share view is showing.
    Completed,
}

/// Point-in-time copy of the flow's runtime state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub phase: FlowPhase,
    pub has_reached_end: bool,
    pub is_modal_open: bool,
    pub is_submitting: bool,
    pub form_values: FormValues,
}

/// Errors from [`SignupFlow::submit_step`].
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Submitted values failed validation ({} field(s))", .0.len())]
    InvalidValues(Vec<FieldError>),

    #[error("A step submission is already in flight")]
    SubmissionInFlight,

    #[error("The signup flow is already complete")]
    AlreadyCompleted,

    #[error("The signup flow was detached")]
    Detached,

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

struct FlowState {
    phase: FlowPhase,
    values: FormValues,
    is_modal_open: bool,
}

/// Clears the in-flight flag when the submission ends, including when the
/// submitting future is dropped mid-request.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Controller for one signup page view.
///
/// Share it behind an `Arc` between the event handlers of a page view.
pub struct SignupFlow<S: StepSubmitter> {
    page: ResolvedPageView,
    steps: Vec<StepDefinition>,
    submitter: S,
    state: Mutex<FlowState>,
    in_flight: AtomicBool,
    lifetime: CancellationToken,
}

impl<S: StepSubmitter> std::fmt::Debug for SignupFlow<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupFlow")
            .field("code", &self.page.code)
            .field("steps", &self.steps.len())
            .field("is_submitting", &self.is_submitting())
            .field("detached", &self.lifetime.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<S: StepSubmitter> SignupFlow<S> {
    /// Create a flow over explicit steps.
    ///
    /// `is_fresh_page_view` opens the welcome modal; resolve it with
    /// [`crate::signup::session::SessionFlags::take_fresh_page_flag`].
    pub fn new(
        page: ResolvedPageView,
        steps: Vec<StepDefinition>,
        submitter: S,
        is_fresh_page_view: bool,
    ) -> Result<Self, CoreError> {
        validate_step_sequence(&steps)?;

        Ok(Self {
            page,
            steps,
            submitter,
            state: Mutex::new(FlowState {
                phase: FlowPhase::Step(0),
                values: FormValues::new(),
                is_modal_open: is_fresh_page_view,
            }),
            in_flight: AtomicBool::new(false),
            lifetime: CancellationToken::new(),
        })
    }

    /// Create a flow with the standard contact + identity steps.
    pub fn for_page(
        page: ResolvedPageView,
        submitter: S,
        is_fresh_page_view: bool,
    ) -> Result<Self, CoreError> {
        let steps = signup_steps(&page)?;
        Self::new(page, steps, submitter, is_fresh_page_view)
    }

    pub fn page(&self) -> &ResolvedPageView {
        &self.page
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// Submit the current step's values.
    ///
    /// Validates `values` against the current step (every field it owns and
    /// no other key), then sends the
    /// accumulated values plus `values` and the page code. On success the
    /// flow advances (or completes after the last step) and `values` are
    /// merged into the accumulated set. On any error the state is unchanged.
    pub async fn submit_step(&self, values: FormValues) -> Result<FlowPhase, FlowError> {
        if self.lifetime.is_cancelled() {
            return Err(FlowError::Detached);
        }

        let _in_flight =
            InFlightGuard::acquire(&self.in_flight).ok_or(FlowError::SubmissionInFlight)?;

        let (index, payload) = {
            let state = self.state.lock().await;
            let FlowPhase::Step(index) = state.phase else {
                return Err(FlowError::AlreadyCompleted);
            };
            let step = self.steps.get(index).ok_or(FlowError::AlreadyCompleted)?;
            step.validate_values(&values)
                .map_err(FlowError::InvalidValues)?;

            let mut merged = state.values.clone();
            merged.extend(values);
            (index, SignupPayload::new(merged, self.page.code.as_str()))
        };

        tracing::debug!(code = %self.page.code, step = index + 1, "Submitting signup step");

        let result = tokio::select! {
            biased;
            () = self.lifetime.cancelled() => {
                tracing::debug!(code = %self.page.code, step = index + 1, "Signup flow detached mid-submission");
                return Err(FlowError::Detached);
            }
            result = self.submitter.submit(&payload) => result,
        };

        let mut state = self.state.lock().await;
        if self.lifetime.is_cancelled() {
            return Err(FlowError::Detached);
        }

        match result {
            Ok(()) => {
                state.values = payload.into_values();
                state.phase = if index + 1 < self.steps.len() {
                    FlowPhase::Step(index + 1)
                } else {
                    FlowPhase::Completed
                };
                tracing::info!(code = %self.page.code, step = index + 1, phase = ?state.phase, "Signup step accepted");
                Ok(state.phase)
            }
            Err(e) => {
                tracing::warn!(code = %self.page.code, step = index + 1, error = %e, "Signup step failed");
                Err(FlowError::Submission(e))
            }
        }
    }

    /// Discard this page view. Any in-flight submission is abandoned and its
    /// result never reaches the flow state.
    pub fn detach(&self) {
        self.lifetime.cancel();
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn close_modal(&self) {
        self.state.lock().await.is_modal_open = false;
    }

    pub async fn phase(&self) -> FlowPhase {
        self.state.lock().await.phase
    }

    pub async fn snapshot(&self) -> FlowSnapshot {
        let state = self.state.lock().await;
        FlowSnapshot {
            phase: state.phase,
            has_reached_end: state.phase == FlowPhase::Completed,
            is_modal_open: state.is_modal_open,
            is_submitting: self.is_submitting(),
            form_values: state.values.clone(),
        }
    }

    /// The step to render, or `None` once the flow is complete.
    pub async fn current_step(&self) -> Option<&StepDefinition> {
        match self.phase().await {
            FlowPhase::Step(index) => self.steps.get(index),
            FlowPhase::Completed => None,
        }
    }

    /// The share view to render, available only once the flow is complete.
    pub async fn completion_view(
        &self,
        current_path: &str,
        subtitle_template: &str,
    ) -> Option<CompletionView> {
        match self.phase().await {
            FlowPhase::Completed => Some(CompletionView::for_page(
                &self.page,
                current_path,
                subtitle_template,
            )),
            FlowPhase::Step(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use tokio::sync::Notify;

    use super::*;
    use crate::signup::session::SessionFlags;

    fn page() -> ResolvedPageView {
        ResolvedPageView {
            code: "ed".into(),
            title: "Help Ed".into(),
            subtitle: "Join now".into(),
            background: "bg1".into(),
            created_by_first_name: "Ed".into(),
        }
    }

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn contact() -> FormValues {
        values(&[("email", "ed@edmarkey.com"), ("zip", "00000")])
    }

    fn identity() -> FormValues {
        values(&[("firstName", "Ed"), ("lastName", "Markey")])
    }

    /// Answers with queued results (default `Ok`) and records every payload.
    #[derive(Default)]
    struct ScriptedSubmitter {
        results: std::sync::Mutex<VecDeque<Result<(), SubmissionError>>>,
        payloads: std::sync::Mutex<Vec<SignupPayload>>,
    }

    impl ScriptedSubmitter {
        fn failing_once() -> Self {
            let s = Self::default();
            s.results.lock().unwrap().push_back(Err(SubmissionError::Rejected {
                status: 500,
                message: None,
            }));
            s
        }

        fn calls(&self) -> usize {
            self.payloads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl StepSubmitter for ScriptedSubmitter {
        async fn submit(&self, payload: &SignupPayload) -> Result<(), SubmissionError> {
            self.payloads.lock().unwrap().push(payload.clone());
            self.results.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }
    }

    #[async_trait]
    impl StepSubmitter for Arc<ScriptedSubmitter> {
        async fn submit(&self, payload: &SignupPayload) -> Result<(), SubmissionError> {
            self.as_ref().submit(payload).await
        }
    }

    /// Holds each request open until released.
    #[derive(Default)]
    struct GatedSubmitter {
        entered: Notify,
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StepSubmitter for Arc<GatedSubmitter> {
        async fn submit(&self, _payload: &SignupPayload) -> Result<(), SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn starts_on_first_step() {
        let flow = SignupFlow::for_page(page(), ScriptedSubmitter::default(), false).unwrap();
        let snap = flow.snapshot().await;

        assert_eq!(snap.phase, FlowPhase::Step(0));
        assert!(!snap.has_reached_end);
        assert!(!snap.is_modal_open);
        assert!(!snap.is_submitting);
        assert_eq!(flow.current_step().await, flow.steps().first());
    }

    #[tokio::test]
    async fn two_successful_steps_complete_the_flow() {
        let submitter = Arc::new(ScriptedSubmitter::default());
        let flow = SignupFlow::for_page(page(), Arc::clone(&submitter), false).unwrap();

        assert_eq!(flow.submit_step(contact()).await.unwrap(), FlowPhase::Step(1));
        assert_eq!(flow.submit_step(identity()).await.unwrap(), FlowPhase::Completed);

        let snap = flow.snapshot().await;
        assert!(snap.has_reached_end);
        assert_eq!(snap.form_values.len(), 4);
        assert!(flow.current_step().await.is_none());

        let payloads = submitter.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].code(), "ed");
        assert_eq!(payloads[0].values(), &contact());
        // The second request carries the values accumulated so far.
        assert_eq!(payloads[1].values().get("email").unwrap(), "ed@edmarkey.com");
        assert_eq!(payloads[1].values().get("firstName").unwrap(), "Ed");
    }

    #[tokio::test]
    async fn failed_submission_leaves_state_unchanged() {
        let submitter = Arc::new(ScriptedSubmitter::failing_once());
        let flow = SignupFlow::for_page(page(), Arc::clone(&submitter), false).unwrap();

        assert_matches!(
            flow.submit_step(contact()).await,
            Err(FlowError::Submission(SubmissionError::Rejected { status: 500, .. }))
        );
        let snap = flow.snapshot().await;
        assert_eq!(snap.phase, FlowPhase::Step(0));
        assert!(snap.form_values.is_empty());
        assert!(!snap.is_submitting);

        // Resubmitting the same values after a failure goes out again.
        assert_eq!(flow.submit_step(contact()).await.unwrap(), FlowPhase::Step(1));
        assert_eq!(submitter.calls(), 2);
    }

    #[tokio::test]
    async fn invalid_values_never_reach_the_network() {
        let submitter = Arc::new(ScriptedSubmitter::default());
        let flow = SignupFlow::for_page(page(), Arc::clone(&submitter), false).unwrap();

        let result = flow.submit_step(values(&[("email", "nope")])).await;

        assert_matches!(result, Err(FlowError::InvalidValues(errors)) if errors.len() == 2);
        assert_eq!(submitter.calls(), 0);
        assert_eq!(flow.phase().await, FlowPhase::Step(0));
    }

    #[tokio::test]
    async fn completed_flow_rejects_further_submissions() {
        let submitter = Arc::new(ScriptedSubmitter::default());
        let flow = SignupFlow::for_page(page(), Arc::clone(&submitter), false).unwrap();
        flow.submit_step(contact()).await.unwrap();
        flow.submit_step(identity()).await.unwrap();

        assert_matches!(flow.submit_step(identity()).await, Err(FlowError::AlreadyCompleted));
        assert_eq!(submitter.calls(), 2);
    }

    #[tokio::test]
    async fn second_submission_while_in_flight_is_refused() {
        let gate = Arc::new(GatedSubmitter::default());
        let flow = Arc::new(SignupFlow::for_page(page(), Arc::clone(&gate), false).unwrap());

        let first = tokio::spawn({
            let flow = Arc::clone(&flow);
            async move { flow.submit_step(contact()).await }
        });
        gate.entered.notified().await;

        assert!(flow.is_submitting());
        assert_matches!(flow.submit_step(contact()).await, Err(FlowError::SubmissionInFlight));

        gate.release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), FlowPhase::Step(1));
        assert_eq!(gate.calls.load(Ordering::SeqCst), 1);
        assert!(!flow.is_submitting());
    }

    #[tokio::test]
    async fn detach_discards_in_flight_result() {
        let gate = Arc::new(GatedSubmitter::default());
        let flow = Arc::new(SignupFlow::for_page(page(), Arc::clone(&gate), false).unwrap());

        let pending = tokio::spawn({
            let flow = Arc::clone(&flow);
            async move { flow.submit_step(contact()).await }
        });
        gate.entered.notified().await;

        flow.detach();
        gate.release.notify_one();

        assert_matches!(pending.await.unwrap(), Err(FlowError::Detached));
        let snap = flow.snapshot().await;
        assert_eq!(snap.phase, FlowPhase::Step(0));
        assert!(snap.form_values.is_empty());
        assert_matches!(flow.submit_step(contact()).await, Err(FlowError::Detached));
    }

    #[tokio::test]
    async fn later_step_cannot_overwrite_earlier_values() {
        let submitter = Arc::new(ScriptedSubmitter::default());
        let flow = SignupFlow::for_page(page(), Arc::clone(&submitter), false).unwrap();
        flow.submit_step(contact()).await.unwrap();

        let mut tampered = identity();
        tampered.insert("email".into(), "not-an-email".into());
        tampered.insert("zip".into(), String::new());

        assert_matches!(
            flow.submit_step(tampered).await,
            Err(FlowError::InvalidValues(errors))
                if errors == vec![
                    FieldError::UnexpectedField("email".into()),
                    FieldError::UnexpectedField("zip".into()),
                ]
        );
        assert_eq!(submitter.calls(), 1);

        let snap = flow.snapshot().await;
        assert_eq!(snap.phase, FlowPhase::Step(1));
        assert_eq!(snap.form_values, contact());
    }

    #[tokio::test]
    async fn stray_keys_are_rejected_before_sending() {
        let submitter = Arc::new(ScriptedSubmitter::default());
        let flow = SignupFlow::for_page(page(), Arc::clone(&submitter), false).unwrap();

        let mut stray = contact();
        stray.insert("utm_source".into(), "mail".into());

        assert_matches!(
            flow.submit_step(stray).await,
            Err(FlowError::InvalidValues(errors))
                if errors == vec![FieldError::UnexpectedField("utm_source".into())]
        );
        assert_eq!(submitter.calls(), 0);
    }

    /// Detaches the flow it is attached to as its request completes.
    #[derive(Default)]
    struct DetachingSubmitter {
        lifetime: std::sync::OnceLock<CancellationToken>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StepSubmitter for Arc<DetachingSubmitter> {
        async fn submit(&self, _payload: &SignupPayload) -> Result<(), SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(lifetime) = self.lifetime.get() {
                lifetime.cancel();
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn detach_after_response_still_discards_result() {
        let submitter = Arc::new(DetachingSubmitter::default());
        let flow = SignupFlow::for_page(page(), Arc::clone(&submitter), false).unwrap();
        submitter.lifetime.set(flow.lifetime.clone()).unwrap();

        assert_matches!(flow.submit_step(contact()).await, Err(FlowError::Detached));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

        let snap = flow.snapshot().await;
        assert_eq!(snap.phase, FlowPhase::Step(0));
        assert!(snap.form_values.is_empty());
        assert!(!snap.is_submitting);
    }

    #[tokio::test]
    async fn welcome_modal_opens_once_per_session() {
        let mut session = SessionFlags::new();
        session.mark_page_created("ed");

        let first_view = SignupFlow::for_page(
            page(),
            ScriptedSubmitter::default(),
            session.take_fresh_page_flag("ed"),
        )
        .unwrap();
        assert!(first_view.snapshot().await.is_modal_open);

        first_view.close_modal().await;
        assert!(!first_view.snapshot().await.is_modal_open);

        let second_view = SignupFlow::for_page(
            page(),
            ScriptedSubmitter::default(),
            session.take_fresh_page_flag("ed"),
        )
        .unwrap();
        assert!(!second_view.snapshot().await.is_modal_open);
    }

    #[tokio::test]
    async fn completion_view_only_after_last_step() {
        const TEMPLATE: &str = "{{FIRST_NAME}} will be in touch soon.";
        let flow = SignupFlow::for_page(page(), ScriptedSubmitter::default(), false).unwrap();
        assert!(flow.completion_view("/ed", TEMPLATE).await.is_none());

        flow.submit_step(contact()).await.unwrap();
        flow.submit_step(identity()).await.unwrap();

        let view = flow.completion_view("/es/ed", TEMPLATE).await.unwrap();
        assert_eq!(view.share_text, "Help Ed Join now");
        assert_eq!(view.subtitle, "Ed will be in touch soon.");
        assert_eq!(view.created_by_first_name, "Ed");
        assert_eq!(view.create_href, "/es/");
    }

    #[test]
    fn payload_serializes_flat_with_page_code() {
        let mut v = contact();
        v.insert("code".into(), "spoofed".into());
        let json = serde_json::to_value(SignupPayload::new(v, "ed")).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "email": "ed@edmarkey.com", "zip": "00000", "code": "ed" })
        );
    }

    #[test]
    fn empty_step_list_is_rejected() {
        assert_matches!(
            SignupFlow::new(page(), vec![], ScriptedSubmitter::default(), false),
            Err(CoreError::Validation(_))
        );
    }
}
