use validator::ValidateEmail;

/// The site owner's mailbox. Parsed once at startup, since it is used as the
/// sender of every message and as the recipient of notifications.
///
/// Visitor addresses are deliberately -not- parsed with this; see
/// `ContactSubmission`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerAddress(String);

impl OwnerAddress {
    pub fn parse(email: String) -> Result<Self, String> {
        ValidateEmail::validate_email(&email)
            .then_some(Self(email.clone()))
            .ok_or(format!("Invalid email: {email:?}"))
    }
}

impl AsRef<str> for OwnerAddress {
    fn as_ref(&self) -> &str { &self.0 }
}
