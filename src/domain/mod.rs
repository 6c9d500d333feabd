mod contact_submission;
mod owner_address;
mod required_field;
mod site_owner;
// allow external `use` statements to skip `contact_submission` etc
pub use contact_submission::ContactSubmission;
pub use owner_address::OwnerAddress;
pub use required_field::RequiredField;
pub use site_owner::SiteOwner;
