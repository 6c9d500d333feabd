use super::OwnerAddress;

/// Whoever runs the portfolio: receives notifications, signs confirmations.
#[derive(Debug, Clone)]
pub struct SiteOwner {
    pub address: OwnerAddress,
    pub name: String,
}
