use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::Instrument;

use super::ContactClient;
use crate::configuration::ContactFormSettings;
use crate::contract::ContactRequest;
use crate::contract::SubmissionResult;

/// What the contact section currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    /// Submit control is disabled and replaced by a loading indicator
    Submitting,
    /// Confirmation notice; the fields have been cleared
    Success(String),
    /// Error notice; the fields are kept so the visitor can resubmit
    Failure(String),
}

impl FormState {
    pub fn submit_enabled(&self) -> bool { !matches!(self, Self::Submitting) }
}

/// The three inputs, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub from_name: String,
    pub reply_to: String,
    pub message: String,
}

impl FormFields {
    fn to_request(&self) -> ContactRequest {
        ContactRequest::new(&self.from_name, &self.reply_to, &self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission was already in flight; no request was sent
    Ignored,
    Succeeded,
    Failed,
}

/// Notice shown on failure. `error` is the relay's `error` field, or the
/// transport error if the relay could not be reached.
pub fn failure_message(error: &str) -> String {
    format!("Failed to send message: {error}. Please try again later.")
}

struct Inner {
    fields: FormFields,
    state: FormState,
    // bumped on every transition, so a pending auto-revert can tell whether
    // the notice it was scheduled for is still showing
    generation: u64,
}

/// One contact form instance.
///
/// Cloning shares the form, so a clone can be handed to a UI callback while
/// another observes the state.
#[derive(Clone)]
pub struct ContactForm {
    client: ContactClient,
    display_for: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl ContactForm {
    /// `display_for` is how long a success/failure notice stays before the
    /// form reverts to `Idle`.
    pub fn new(
        client: ContactClient,
        display_for: Duration,
    ) -> Self {
        Self {
            client,
            display_for,
            inner: Arc::new(Mutex::new(Inner {
                fields: FormFields::default(),
                state: FormState::Idle,
                generation: 0,
            })),
        }
    }

    pub fn from_settings(settings: &ContactFormSettings) -> Self {
        Self::new(
            ContactClient::new(&settings.base_url),
            settings.display_duration(),
        )
    }

    pub async fn state(&self) -> FormState { self.inner.lock().await.state.clone() }

    pub async fn fields(&self) -> FormFields { self.inner.lock().await.fields.clone() }

    pub async fn set_fields(
        &self,
        fields: FormFields,
    ) {
        self.inner.lock().await.fields = fields;
    }

    /// The submit action.
    ///
    /// Inert while a previous submission is in flight. Otherwise clears any
    /// notice, sends one request, and moves to `Success` or `Failure`; either
    /// reverts to `Idle` after `display_for`. The request and the transition
    /// run on their own task: dropping the returned future (or the form) does
    /// not cancel them.
    #[tracing::instrument(name = "Contact form submit", skip(self))]
    pub async fn submit(&self) -> SubmitOutcome {
        let request = {
            let mut inner = self.inner.lock().await;
            if inner.state == FormState::Submitting {
                tracing::debug!("submission already in flight");
                return SubmitOutcome::Ignored;
            }
            inner.state = FormState::Submitting;
            inner.generation += 1;
            inner.fields.to_request()
        };

        let form = self.clone();
        let task = tokio::spawn(
            async move { form.complete(request).await }.instrument(tracing::Span::current()),
        );
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error.message = %e, "contact form submission task failed");
                SubmitOutcome::Failed
            }
        }
    }

    /// Sends `request` and applies the outcome. The lock is not held across
    /// the request.
    async fn complete(
        &self,
        request: ContactRequest,
    ) -> SubmitOutcome {
        let result = self.client.submit(&request).await;

        let mut inner = self.inner.lock().await;
        let outcome = match result {
            Ok(SubmissionResult::Accepted { message }) => {
                inner.fields = FormFields::default();
                inner.state = FormState::Success(message);
                SubmitOutcome::Succeeded
            }
            Ok(SubmissionResult::Rejected { error, details, .. }) => {
                tracing::warn!(%error, ?details, "contact form rejected");
                inner.state = FormState::Failure(failure_message(&error));
                SubmitOutcome::Failed
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "could not reach contact relay"
                );
                inner.state = FormState::Failure(failure_message(&e.to_string()));
                SubmitOutcome::Failed
            }
        };
        inner.generation += 1;
        self.schedule_revert(inner.generation);
        outcome
    }

    fn schedule_revert(
        &self,
        generation: u64,
    ) {
        let inner = Arc::clone(&self.inner);
        let delay = self.display_for;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = inner.lock().await;
            if inner.generation == generation {
                inner.state = FormState::Idle;
                inner.generation += 1;
            }
        });
    }
}
