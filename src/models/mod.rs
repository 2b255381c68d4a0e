use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Document ids arrive as `_id`, `id`, or both; `_id` wins when both are set.
/// Always written back as `id`.
mod document_id {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    struct Keys {
        #[serde(rename = "_id", default)]
        mongo: Option<String>,
        #[serde(default)]
        id: Option<String>,
    }

    #[derive(Serialize)]
    struct Written<'a> {
        id: &'a str,
    }

    pub fn serialize<S: Serializer>(id: &str, serializer: S) -> Result<S::Ok, S::Error> {
        Written { id }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let keys = Keys::deserialize(deserializer)?;
        keys.mongo.or(keys.id).ok_or_else(|| D::Error::missing_field("_id"))
    }
}

/// Account role as issued by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Client,
    Agent,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Agent => "AGENT",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CLIENT" => Ok(Role::Client),
            "AGENT" => Ok(Role::Agent),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Authenticated user profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(flatten, with = "document_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Agent account as seen from the admin console
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentAccount {
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(default)]
    pub listing_count: u32,
}

impl AgentAccount {
    /// Accounts without an explicit flag are treated as active
    pub fn is_active(&self) -> bool {
        self.profile.is_active.unwrap_or(true)
    }
}

/// Token pair returned by sign-in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Location information for a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
    House,
    Apartment,
    Condo,
    Land,
    Commercial,
    Villa,
    Townhouse,
    #[serde(untagged)]
    Other(String),
}

impl PropertyType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "HOUSE" => PropertyType::House,
            "APARTMENT" => PropertyType::Apartment,
            "CONDO" => PropertyType::Condo,
            "LAND" => PropertyType::Land,
            "COMMERCIAL" => PropertyType::Commercial,
            "VILLA" => PropertyType::Villa,
            "TOWNHOUSE" => PropertyType::Townhouse,
            other => PropertyType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PropertyType::House => "HOUSE",
            PropertyType::Apartment => "APARTMENT",
            PropertyType::Condo => "CONDO",
            PropertyType::Land => "LAND",
            PropertyType::Commercial => "COMMERCIAL",
            PropertyType::Villa => "VILLA",
            PropertyType::Townhouse => "TOWNHOUSE",
            PropertyType::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListingType {
    Sale,
    Rent,
}

impl ListingType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingType::Sale => "SALE",
            ListingType::Rent => "RENT",
        }
    }
}

impl std::str::FromStr for ListingType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SALE" => Ok(ListingType::Sale),
            "RENT" => Ok(ListingType::Rent),
            other => Err(format!("unknown listing type '{other}'")),
        }
    }
}

/// Approval state of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Either a bare id or an embedded profile, depending on whether the backend populated it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UserRef {
    Embedded(Box<Profile>),
    Id(String),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Embedded(profile) => &profile.id,
            UserRef::Id(id) => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            UserRef::Embedded(profile) => &profile.name,
            UserRef::Id(id) => id,
        }
    }
}

/// Core listing data model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(flatten, with = "document_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub location: Location,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub size: f64,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<UserRef>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Either a bare listing id or the populated listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListingRef {
    Embedded(Box<Listing>),
    Id(String),
}

impl ListingRef {
    pub fn id(&self) -> &str {
        match self {
            ListingRef::Embedded(listing) => &listing.id,
            ListingRef::Id(id) => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ListingRef::Embedded(listing) => &listing.title,
            ListingRef::Id(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum InquiryStatus {
    #[default]
    Pending,
    Responded,
    Closed,
}

/// Client to agent message thread attached to a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    #[serde(flatten, with = "document_id")]
    pub id: String,
    #[serde(alias = "property")]
    pub listing: ListingRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<UserRef>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default)]
    pub status: InquiryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A listing bookmarked by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedProperty {
    #[serde(flatten, with = "document_id")]
    pub id: String,
    #[serde(alias = "property")]
    pub listing: ListingRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Result of a save toggle or saved check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SavedFlag {
    #[serde(alias = "saved")]
    pub is_saved: bool,
}

/// Aggregate market figures shown on the admin console
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalytics {
    #[serde(default)]
    pub total_listings: u64,
    #[serde(default)]
    pub approved_listings: u64,
    #[serde(default)]
    pub pending_listings: u64,
    #[serde(default)]
    pub rejected_listings: u64,
    #[serde(default)]
    pub average_price: f64,
    #[serde(default)]
    pub by_property_type: Vec<Bucket>,
    #[serde(default)]
    pub by_city: Vec<Bucket>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    #[serde(alias = "_id")]
    pub label: String,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_price: Option<f64>,
}

/// Generated pros and cons for two listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PropertyComparison {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub first: ComparisonSide,
    #[serde(default)]
    pub second: ComparisonSide,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSide {
    #[serde(default)]
    pub listing_id: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

/// Payment state of a listing fee
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    #[serde(alias = "propertyId")]
    pub listing_id: String,
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}
