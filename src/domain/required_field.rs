/// A contact form field that must be present and non-empty.
///
/// Must be instantiated with `RequiredField::parse`; the field is left private
/// so that the check cannot be bypassed.
///
/// Only presence is checked. Whitespace counts as content (nothing is
/// trimmed), so `" "` is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredField(String);

impl RequiredField {
    /// `name` only shows up in the error message.
    pub fn parse(
        name: &str,
        value: Option<String>,
    ) -> Result<Self, String> {
        match value {
            Some(v) if !v.is_empty() => Ok(Self(v)),
            Some(_) => Err(format!("{name} is empty")),
            None => Err(format!("{name} is missing")),
        }
    }
}

impl AsRef<str> for RequiredField {
    fn as_ref(&self) -> &str { &self.0 }
}
