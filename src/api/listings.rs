use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::client::ApiClient;
use super::error::ApiError;
use super::request::{ApiRequest, FilePart, MultipartForm};
use crate::models::{Listing, ListingType, PropertyType};
use crate::validation::{ListingDraft, ListingUpdate};

/// Search filter for approved listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingFilter {
    /// City to search in
    pub city: Option<String>,
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Minimum number of bedrooms
    pub min_bedrooms: Option<u32>,
}

impl ListingFilter {
    /// Query pairs for the set fields, camelCased for the backend
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(city) = self.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            pairs.push(("city".to_string(), city.to_string()));
        }
        if let Some(kind) = &self.property_type {
            pairs.push(("propertyType".to_string(), kind.as_str().to_string()));
        }
        if let Some(kind) = self.listing_type {
            pairs.push(("listingType".to_string(), kind.as_str().to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice".to_string(), max.to_string()));
        }
        if let Some(beds) = self.min_bedrooms {
            pairs.push(("bedrooms".to_string(), beds.to_string()));
        }
        pairs
    }
}

fn mime_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Builds the multipart body for a listing; image files are read from disk.
pub async fn listing_form(draft: &ListingDraft) -> Result<MultipartForm, ApiError> {
    let mut form = MultipartForm::default()
        .text("title", draft.title.trim())
        .text("description", draft.description.trim())
        .text("address", draft.address.trim());

    if let Some(price) = draft.price {
        form = form.text("price", price.to_string());
    }
    if let Some(city) = &draft.city {
        form = form.text("city", city.trim());
    }
    if let Some(lat) = draft.latitude {
        form = form.text("latitude", lat.to_string());
    }
    if let Some(lng) = draft.longitude {
        form = form.text("longitude", lng.to_string());
    }
    if let Some(beds) = draft.bedrooms {
        form = form.text("bedrooms", beds.to_string());
    }
    if let Some(baths) = draft.bathrooms {
        form = form.text("bathrooms", baths.to_string());
    }
    if let Some(size) = draft.size {
        form = form.text("size", size.to_string());
    }
    if let Some(kind) = &draft.property_type {
        form = form.text("propertyType", kind.as_str());
    }
    if let Some(kind) = draft.listing_type {
        form = form.text("listingType", kind.as_str());
    }

    for path in &draft.images {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ApiError::Validation(crate::validation::ValidationError::InvalidField {
                field: "images",
                reason: format!("cannot read {}: {e}", path.display()),
            })
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        form = form.file(FilePart {
            field: "images".to_string(),
            file_name,
            mime: mime_for(path).to_string(),
            bytes,
        });
    }
    Ok(form)
}

impl ApiClient {
    pub async fn create_listing(&self, draft: &ListingDraft) -> Result<Listing, ApiError> {
        draft.validate_for_create()?;
        let form = listing_form(draft).await?;
        info!(title = %draft.title, images = draft.images.len(), "Creating listing");
        self.call(ApiRequest::post("/listings").multipart(form)).await
    }

    /// Every listing regardless of status (admin)
    pub async fn all_listings(&self) -> Result<Vec<Listing>, ApiError> {
        self.call(ApiRequest::get("/listings")).await
    }

    /// Listings owned by the signed-in agent
    pub async fn agent_listings(&self) -> Result<Vec<Listing>, ApiError> {
        self.call(ApiRequest::get("/listings/agent")).await
    }

    pub async fn approved_listings(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<Listing>, ApiError> {
        self.call(ApiRequest::get("/listings/approved").query(filter.to_query()))
            .await
    }

    pub async fn pending_listings(&self) -> Result<Vec<Listing>, ApiError> {
        self.call(ApiRequest::get("/listings/pending")).await
    }

    pub async fn listing(&self, id: &str) -> Result<Listing, ApiError> {
        self.call(ApiRequest::get(format!("/listings/{id}"))).await
    }

    pub async fn update_listing(
        &self,
        id: &str,
        update: &ListingUpdate,
    ) -> Result<Listing, ApiError> {
        update.validate()?;
        info!(listing_id = id, "Updating listing");
        self.call(ApiRequest::put(format!("/listings/{id}")).json(update)?)
            .await
    }

    pub async fn delete_listing(&self, id: &str) -> Result<(), ApiError> {
        info!(listing_id = id, "Deleting listing");
        self.call::<IgnoredAny>(ApiRequest::delete(format!("/listings/{id}")))
            .await
            .map(|_| ())
    }

    pub async fn approve_listing(&self, id: &str) -> Result<Listing, ApiError> {
        info!(listing_id = id, "Approving listing");
        self.call(ApiRequest::patch(format!("/listings/{id}/approve"))).await
    }

    pub async fn reject_listing(&self, id: &str) -> Result<Listing, ApiError> {
        info!(listing_id = id, "Rejecting listing");
        self.call(ApiRequest::patch(format!("/listings/{id}/reject"))).await
    }
}
