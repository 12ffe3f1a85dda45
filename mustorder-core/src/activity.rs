//! Activity signals recorded against dishes and restaurants.
//!
//! These are the raw inputs of the scoring pipeline. Timestamps are
//! [`SystemTime`] values; persistence layers decide their own encoding.

use std::{convert::Infallible, fmt, str::FromStr, time::SystemTime};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DishId, RestaurantId};

/// An up-vote. A user votes for a dish at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vote {
    pub user_id: u64,
    pub dish_id: DishId,
    pub created_at: SystemTime,
}

/// A rated review of a dish.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Review {
    pub dish_id: DishId,
    /// Star rating in `1..=5`.
    pub rating: u8,
    pub text: String,
    pub created_at: SystemTime,
}

/// A visit to a restaurant, optionally naming the dish eaten.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Checkin {
    pub restaurant_id: RestaurantId,
    pub dish_id: Option<DishId>,
    pub created_at: SystemTime,
}

/// A photo uploaded for a dish.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Photo {
    pub dish_id: DishId,
    pub created_at: SystemTime,
}

/// Provenance of a restaurant listing.
///
/// Kinds are compared case-insensitively, so `"DDD"` and `"ddd"` both parse
/// to [`VenueSourceKind::Ddd`].
///
/// # Examples
/// ```
/// use mustorder_core::VenueSourceKind;
///
/// let kind: VenueSourceKind = "DDD".parse().unwrap_or_else(|never| match never {});
/// assert_eq!(kind, VenueSourceKind::Ddd);
/// assert_eq!(kind.to_string(), "ddd");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", from = "String"))]
pub enum VenueSourceKind {
    /// Imported from the televised diners hitlist; earns a provenance bonus.
    Ddd,
    /// Any other provenance, stored lowercased.
    Other(String),
}

impl VenueSourceKind {
    /// Canonical lowercase label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ddd => "ddd",
            Self::Other(kind) => kind,
        }
    }
}

impl FromStr for VenueSourceKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if lowered == "ddd" {
            Ok(Self::Ddd)
        } else {
            Ok(Self::Other(lowered))
        }
    }
}

impl From<String> for VenueSourceKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<VenueSourceKind> for String {
    fn from(value: VenueSourceKind) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for VenueSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Links a restaurant to where its listing came from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VenueSource {
    pub restaurant_id: RestaurantId,
    pub kind: VenueSourceKind,
}
