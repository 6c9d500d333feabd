use super::RequiredField;
use super::SiteOwner;
use crate::email_client::OutgoingEmail;

/// One visitor's message, parsed from the request body. Never stored.
///
/// `sender_email` is only checked for presence. It ends up in the
/// notification's `Reply-To` and as the confirmation's recipient, so a
/// malformed address surfaces later as a delivery failure.
#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub sender_name: RequiredField,
    pub sender_email: RequiredField,
    pub message_body: RequiredField,
}

impl ContactSubmission {
    /// The message as HTML: values are interpolated literally, only `\n`
    /// becomes `<br>`.
    pub fn message_html(&self) -> String { self.message_body.as_ref().replace('\n', "<br>") }

    /// Email to the site owner, replying to the visitor.
    pub fn notification(
        &self,
        owner: &SiteOwner,
    ) -> OutgoingEmail {
        let name = self.sender_name.as_ref();
        let email = self.sender_email.as_ref();
        OutgoingEmail {
            to: owner.address.as_ref().to_string(),
            reply_to: Some(email.to_string()),
            subject: format!("New Contact Form Submission from {name}"),
            html_body: format!(
                "<h2>New Contact Form Submission</h2>\n\
                 <p><strong>Name:</strong> {name}</p>\n\
                 <p><strong>Email:</strong> {email}</p>\n\
                 <p><strong>Message:</strong></p>\n\
                 <p>{}</p>\n",
                self.message_html()
            ),
        }
    }

    /// Acknowledgement back to the visitor. The body is fixed apart from the
    /// greeting and signature.
    pub fn confirmation(
        &self,
        owner: &SiteOwner,
    ) -> OutgoingEmail {
        OutgoingEmail {
            to: self.sender_email.as_ref().to_string(),
            reply_to: None,
            subject: "We received your message".to_string(),
            html_body: format!(
                "<h2>Thank you for reaching out!</h2>\n\
                 <p>Hi {},</p>\n\
                 <p>We have received your message and will get back to you as soon as possible.</p>\n\
                 <p>Best regards,<br>{}</p>\n",
                self.sender_name.as_ref(),
                owner.name,
            ),
        }
    }
}
