use std::any::Any;
use std::fmt::Debug;
use std::panic::AssertUnwindSafe;

use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use futures::FutureExt;

use crate::contract::AcceptedBody;
use crate::contract::ContactRequest;
use crate::contract::ErrorBody;
use crate::contract::DELIVERY_FAILED;
use crate::contract::INTERNAL_ERROR;
use crate::contract::MISSING_FIELDS;
use crate::domain::ContactSubmission;
use crate::domain::RequiredField;
use crate::domain::SiteOwner;
use crate::email_client::MailTransport;
use crate::email_client::TransportError;
use crate::utils::error_chain_fmt;

impl TryFrom<ContactRequest> for ContactSubmission {
    type Error = String;
    fn try_from(value: ContactRequest) -> Result<Self, Self::Error> {
        let sender_name = RequiredField::parse("from_name", value.from_name)?;
        let sender_email = RequiredField::parse("reply_to", value.reply_to)?;
        let message_body = RequiredField::parse("message", value.message)?;
        Ok(Self {
            sender_name,
            sender_email,
            message_body,
        })
    }
}

/// Which of the two messages failed. Only used for logging; the client sees
/// the same error either way.
#[derive(Debug, Clone, Copy)]
pub enum Dispatch {
    Notification,
    Confirmation,
}

#[derive(thiserror::Error)]
pub enum ContactError {
    // this string is sent to the client as `error`
    #[error("All fields are required")]
    InvalidInput(String),
    #[error("Failed to send email")]
    DeliveryFailure {
        dispatch: Dispatch,
        #[source]
        source: TransportError,
    },
    /// The relay panicked; the payload is logged but never sent to the client
    #[error("Internal server error")]
    Internal(String),
}

impl Debug for ContactError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::DeliveryFailure { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            Self::InvalidInput(_) => {
                HttpResponse::build(self.status_code()).json(ErrorBody::new(MISSING_FIELDS))
            }
            // the provider's message is passed through verbatim
            Self::DeliveryFailure { source, .. } => HttpResponse::build(self.status_code())
                .json(ErrorBody::with_details(DELIVERY_FAILED, source.to_string())),
            Self::Internal(_) => {
                HttpResponse::build(self.status_code()).json(ErrorBody::new(INTERNAL_ERROR))
            }
        }
    }
}

fn delivery_failure(
    dispatch: Dispatch,
    source: TransportError,
) -> ContactError {
    let e = ContactError::DeliveryFailure { dispatch, source };
    tracing::error!(
        error.cause_chain = ?e,
        error.message = %e,
        ?dispatch,
        "error sending email"
    );
    e
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

#[tracing::instrument(
    name = "Sending notification to site owner",
    skip(transport, submission, owner)
)]
async fn send_notification(
    transport: &dyn MailTransport,
    submission: &ContactSubmission,
    owner: &SiteOwner,
) -> Result<(), ContactError> {
    transport
        .send(&submission.notification(owner))
        .await
        .map_err(|source| delivery_failure(Dispatch::Notification, source))
}

#[tracing::instrument(
    name = "Sending confirmation to visitor",
    skip(transport, submission, owner)
)]
async fn send_confirmation(
    transport: &dyn MailTransport,
    submission: &ContactSubmission,
    owner: &SiteOwner,
) -> Result<(), ContactError> {
    transport
        .send(&submission.confirmation(owner))
        .await
        .map_err(|source| delivery_failure(Dispatch::Confirmation, source))
}

/// `POST /api/contact`
///
/// Success requires:
///     1. all three fields present and non-empty
///     2. notification delivered to the site owner
///     3. confirmation delivered to the visitor
///
/// Each step only runs if the previous one succeeded. If 3 fails, the owner
/// has still been notified; nothing is rolled back and nothing is retried, so
/// a resubmission sends both messages again.
///
/// # Request example
///
/// ```sh
///     curl -v -H 'Content-Type: application/json' \
///         --data '{"from_name":"Jane","reply_to":"jane@example.com","message":"Hi"}' \
///         http://127.0.0.1:5000/api/contact
/// ```
#[tracing::instrument(
    name = "Relaying contact form submission",
    skip(body, transport, owner),
    fields(
        sender_name = tracing::field::Empty,
        sender_email = tracing::field::Empty,
    )
)]
pub async fn submit_contact(
    body: web::Json<ContactRequest>,
    // injected at startup; see `startup::run`
    transport: web::Data<dyn MailTransport>,
    owner: web::Data<SiteOwner>,
) -> Result<HttpResponse, ContactError> {
    // a panic in the relay (or a transport) is answered with a 500 instead of
    // dropping the connection
    AssertUnwindSafe(relay(body.into_inner(), transport.get_ref(), &owner))
        .catch_unwind()
        .await
        .map_err(|payload| {
            let panic = panic_message(&*payload);
            tracing::error!(error.panic = %panic, "contact relay panicked");
            ContactError::Internal(panic)
        })?
}

async fn relay(
    request: ContactRequest,
    transport: &dyn MailTransport,
    owner: &SiteOwner,
) -> Result<HttpResponse, ContactError> {
    let submission: ContactSubmission = request.try_into().map_err(|e: String| {
        tracing::warn!("rejecting submission: {e}");
        ContactError::InvalidInput(e)
    })?;

    tracing::Span::current()
        .record("sender_name", tracing::field::display(submission.sender_name.as_ref()))
        .record("sender_email", tracing::field::display(submission.sender_email.as_ref()));

    send_notification(transport, &submission, owner).await?;
    send_confirmation(transport, &submission, owner).await?;

    Ok(HttpResponse::Ok().json(AcceptedBody::new()))
}
