//! Form-level checks run before a request leaves the client.
//!
//! These mirror what the backend enforces; they exist so obvious mistakes are
//! reported without a round trip. Role checks here are a courtesy, the server
//! remains the authority.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::models::{ListingType, Profile, PropertyType, Role};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Collects missing fields so the user sees them all at once
#[derive(Default)]
struct Checklist {
    missing: Vec<&'static str>,
}

impl Checklist {
    fn require(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.missing.push(field);
        }
        self
    }

    fn require_some<T>(&mut self, field: &'static str, value: &Option<T>) -> &mut Self {
        if value.is_none() {
            self.missing.push(field);
        }
        self
    }

    fn finish(&mut self) -> Result<(), ValidationError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(std::mem::take(&mut self.missing)))
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checklist::default()
            .require("name", &self.name)
            .require("email", &self.email)
            .require("password", &self.password)
            .finish()?;

        if !self.email.contains('@') {
            return Err(ValidationError::InvalidField {
                field: "email",
                reason: "must be an email address".into(),
            });
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::InvalidField {
                field: "password",
                reason: format!("must be at least {MIN_PASSWORD_LEN} characters"),
            });
        }
        if self.role == Role::Admin {
            return Err(ValidationError::InvalidField {
                field: "role",
                reason: "admin accounts cannot be self-registered".into(),
            });
        }
        Ok(())
    }
}

/// Listing form as submitted by an agent; images are local file paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub address: String,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub size: Option<f64>,
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
    pub images: Vec<PathBuf>,
}

impl ListingDraft {
    /// Checks a draft for creation, where at least one image is required
    pub fn validate_for_create(&self) -> Result<(), ValidationError> {
        self.validate()?;
        if self.images.is_empty() {
            return Err(ValidationError::MissingFields(vec!["images"]));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        Checklist::default()
            .require("title", &self.title)
            .require("description", &self.description)
            .require("address", &self.address)
            .require_some("price", &self.price)
            .require_some("propertyType", &self.property_type)
            .require_some("listingType", &self.listing_type)
            .finish()?;

        if let Some(price) = self.price {
            if !(price.is_finite() && price > 0.0) {
                return Err(ValidationError::InvalidField {
                    field: "price",
                    reason: "must be greater than zero".into(),
                });
            }
        }
        check_range("latitude", self.latitude, 90.0)?;
        check_range("longitude", self.longitude, 180.0)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: Option<f64>, bound: f64) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(-bound..=bound).contains(&v) => Err(ValidationError::InvalidField {
            field,
            reason: format!("must be between -{bound} and {bound}"),
        }),
        _ => Ok(()),
    }
}

/// Partial listing update; only set fields are sent
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
}

impl ListingUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self == &ListingUpdate::default() {
            return Err(ValidationError::InvalidField {
                field: "update",
                reason: "nothing to change".into(),
            });
        }
        if let Some(title) = &self.title {
            Checklist::default().require("title", title).finish()?;
        }
        if let Some(price) = self.price {
            if !(price.is_finite() && price > 0.0) {
                return Err(ValidationError::InvalidField {
                    field: "price",
                    reason: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InquiryDraft {
    #[serde(rename = "propertyId")]
    pub listing_id: String,
    pub message: String,
}

impl InquiryDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checklist::default()
            .require("propertyId", &self.listing_id)
            .require("message", &self.message)
            .finish()
    }
}

/// Returns `Err(reason)` when the profile's role is not among `allowed`.
pub fn ensure_role(profile: &Profile, allowed: &[Role], reason: &str) -> Result<(), String> {
    if allowed.contains(&profile.role) {
        Ok(())
    } else {
        Err(reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete_draft() -> ListingDraft {
        ListingDraft {
            title: "Garden flat".into(),
            description: "Quiet street".into(),
            price: Some(250_000.0),
            address: "12 Elm Road".into(),
            latitude: Some(52.2),
            longitude: Some(0.12),
            property_type: Some(PropertyType::Apartment),
            listing_type: Some(ListingType::Sale),
            images: vec![PathBuf::from("front.jpg")],
            ..ListingDraft::default()
        }
    }

    #[test]
    fn listing_draft_reports_every_missing_field() {
        let error = ListingDraft::default().validate().expect_err("empty draft");
        assert_eq!(
            error,
            ValidationError::MissingFields(vec![
                "title",
                "description",
                "address",
                "price",
                "propertyType",
                "listingType",
            ])
        );
    }

    #[test]
    fn listing_draft_checks_price_and_coordinates() {
        let mut draft = complete_draft();
        draft.price = Some(0.0);
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::InvalidField { field: "price", .. })
        ));

        let mut draft = complete_draft();
        draft.latitude = Some(91.0);
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::InvalidField { field: "latitude", .. })
        ));

        complete_draft().validate_for_create().expect("complete draft");
    }

    #[test]
    fn create_requires_an_image() {
        let mut draft = complete_draft();
        draft.images.clear();
        assert_eq!(
            draft.validate_for_create(),
            Err(ValidationError::MissingFields(vec!["images"]))
        );
    }

    #[test]
    fn sign_up_rules() {
        let form = SignUpForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "hunter22".into(),
            role: Role::Client,
            phone: None,
        };
        form.validate().expect("valid");

        let short = SignUpForm {
            password: "abc".into(),
            ..form.clone()
        };
        assert!(matches!(
            short.validate(),
            Err(ValidationError::InvalidField { field: "password", .. })
        ));

        let admin = SignUpForm {
            role: Role::Admin,
            ..form.clone()
        };
        assert!(matches!(
            admin.validate(),
            Err(ValidationError::InvalidField { field: "role", .. })
        ));

        let bad_email = SignUpForm {
            email: "ada".into(),
            ..form
        };
        assert!(matches!(
            bad_email.validate(),
            Err(ValidationError::InvalidField { field: "email", .. })
        ));
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(ListingUpdate::default().validate().is_err());
        ListingUpdate {
            price: Some(10.0),
            ..ListingUpdate::default()
        }
        .validate()
        .expect("price only");
    }

    #[test]
    fn inquiry_needs_message() {
        let draft = InquiryDraft {
            listing_id: "l-1".into(),
            message: "  ".into(),
        };
        assert_eq!(draft.validate(), Err(ValidationError::MissingFields(vec!["message"])));
    }

    #[test]
    fn role_gate() {
        let profile = Profile {
            id: "u-1".into(),
            name: "Cal".into(),
            email: "cal@example.com".into(),
            role: Role::Agent,
            phone: None,
            is_active: None,
            created_at: None,
        };
        assert!(ensure_role(&profile, &[Role::Agent, Role::Admin], "agents only").is_ok());
        assert_eq!(
            ensure_role(&profile, &[Role::Client], "Only clients can save properties"),
            Err("Only clients can save properties".to_string())
        );
    }
}
