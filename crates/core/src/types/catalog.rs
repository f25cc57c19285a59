//! Catalog enumerations: listing category and item condition.
//!
//! Both serialize with their human-facing labels ("Home Appliances",
//! "Like New") because those are what sellers see and what the image
//! analysis service answers with.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A label that is not part of a fixed enumeration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {label}")]
pub struct UnknownLabel {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub label: String,
}

/// Listing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Electronics,
    Furniture,
    #[serde(rename = "Home Appliances")]
    HomeAppliances,
    Fashion,
    Watches,
    Toys,
    Accessories,
    #[default]
    Others,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 8] = [
        Self::Electronics,
        Self::Furniture,
        Self::HomeAppliances,
        Self::Fashion,
        Self::Watches,
        Self::Toys,
        Self::Accessories,
        Self::Others,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Furniture => "Furniture",
            Self::HomeAppliances => "Home Appliances",
            Self::Fashion => "Fashion",
            Self::Watches => "Watches",
            Self::Toys => "Toys",
            Self::Accessories => "Accessories",
            Self::Others => "Others",
        }
    }

    /// Map free text onto a category, falling back to [`Category::Others`].
    ///
    /// Matching ignores case and surrounding whitespace.
    #[must_use]
    pub fn from_label_or_default(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }

    /// Bulky goods ship by truck and carry the higher delivery surcharge.
    #[must_use]
    pub const fn is_bulky(self) -> bool {
        matches!(self, Self::Furniture | Self::HomeAppliances)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownLabel {
                kind: "category",
                label: s.to_owned(),
            })
    }
}

/// Physical condition of a listed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Condition {
    New,
    #[serde(rename = "Like New")]
    LikeNew,
    #[default]
    Good,
    Fair,
}

impl Condition {
    /// Every condition, best first.
    pub const ALL: [Self; 4] = [Self::New, Self::LikeNew, Self::Good, Self::Fair];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::LikeNew => "Like New",
            Self::Good => "Good",
            Self::Fair => "Fair",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownLabel {
                kind: "condition",
                label: s.to_owned(),
            })
    }
}
