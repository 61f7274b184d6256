use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::serde_compat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parking {
    Included,
    AdditionalFee,
    None,
}

impl Parking {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Included => "included",
            Self::AdditionalFee => "additional-fee",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Parking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParking(pub String);

impl fmt::Display for UnknownParking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown parking option `{}` (expected included, additional-fee or none)",
            self.0
        )
    }
}

impl std::error::Error for UnknownParking {}

impl FromStr for Parking {
    type Err = UnknownParking;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "included" | "yes" | "true" => Ok(Self::Included),
            // The listing form historically posted the misspelled value.
            "additional-fee" | "addtional-fee" | "fee" => Ok(Self::AdditionalFee),
            "none" | "no" | "false" => Ok(Self::None),
            _ => Err(UnknownParking(raw.to_owned())),
        }
    }
}

impl Serialize for Parking {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default, deserialize_with = "serde_compat::optional_id_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "serde_compat::optional_amount")]
    pub price: Option<f64>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default, deserialize_with = "serde_compat::optional_date")]
    pub available_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "serde_compat::optional_date")]
    pub available_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "serde_compat::optional_keyword")]
    pub parking: Option<Parking>,
    #[serde(default)]
    pub furnished: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(
        default,
        deserialize_with = "serde_compat::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields of a listing being created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub title: String,
    pub price: f64,
    pub address: String,
    pub contact_name: String,
    pub contact_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<Parking>,
    pub furnished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub images: Vec<String>,
}

/// Partial update; only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<Parking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furnished: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Search criteria. Every absent field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilter {
    pub title: Option<String>,
    pub max_price: Option<f64>,
    pub furnished: Option<bool>,
    pub parking: Option<Parking>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        self.matches_title(listing)
            && self.matches_price(listing)
            && self
                .furnished
                .map_or(true, |wanted| listing.furnished == Some(wanted))
            && self
                .parking
                .map_or(true, |wanted| listing.parking == Some(wanted))
            && self.matches_availability(listing)
    }

    fn matches_title(&self, listing: &Listing) -> bool {
        match self.title.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => listing
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }

    fn matches_price(&self, listing: &Listing) -> bool {
        match self.max_price {
            None => true,
            Some(max_price) => listing.price.is_some_and(|price| price <= max_price),
        }
    }

    /// Listing availability must overlap the requested window; missing bounds
    /// on either side are open-ended.
    fn matches_availability(&self, listing: &Listing) -> bool {
        let starts_in_time = match (listing.available_from, self.end_date) {
            (Some(from), Some(end)) => from <= end,
            _ => true,
        };
        let lasts_long_enough = match (listing.available_to, self.start_date) {
            (Some(to), Some(start)) => to >= start,
            _ => true,
        };

        starts_in_time && lasts_long_enough
    }
}
