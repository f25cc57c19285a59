//! Status enums for listings and offers.
//!
//! Stored documents use lowercase snake-case names (`offer_accepted`), which
//! is also what `Display` and `FromStr` produce and accept.

use serde::{Deserialize, Serialize};

/// Moderation and sale lifecycle of a listing.
///
/// ```text
/// pending --approve--> approved
/// pending --reject---> rejected
/// approved --offer accepted--> offer_accepted
/// offer_accepted --reservation lapsed--> approved
/// ```
///
/// Sale is tracked separately by the listing's `is_sold` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Awaiting admin review.
    #[default]
    Pending,
    /// Visible in the marketplace.
    Approved,
    /// Refused by an admin, with a reason.
    Rejected,
    /// An offer was accepted; the listing is reserved for the bidder.
    OfferAccepted,
}

impl ListingStatus {
    /// Whether listings in this status belong in the public marketplace.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Approved | Self::OfferAccepted)
    }

    /// Stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::OfferAccepted => "offer_accepted",
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "offer_accepted" => Ok(Self::OfferAccepted),
            _ => Err(format!("invalid listing status: {s}")),
        }
    }
}

/// Status of a single offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// Waiting for the seller.
    #[default]
    Pending,
    /// Accepted; the listing is reserved for the bidder.
    Accepted,
    /// Declined by the seller.
    Rejected,
    /// Was accepted, but the bidder did not buy before the hold lapsed.
    Expired,
}

impl OfferStatus {
    /// Stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seller decision on a pending offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferAction {
    Accept,
    Reject,
}

impl OfferAction {
    /// Offer status this action resolves to.
    #[must_use]
    pub const fn resulting_status(self) -> OfferStatus {
        match self {
            Self::Accept => OfferStatus::Accepted,
            Self::Reject => OfferStatus::Rejected,
        }
    }
}

impl std::str::FromStr for OfferAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            _ => Err(format!("invalid offer action: {s} (expected accept or reject)")),
        }
    }
}
