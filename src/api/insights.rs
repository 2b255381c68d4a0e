//! Analytics, comparison and payment endpoints.

use serde::Serialize;
use tracing::info;

use super::client::ApiClient;
use super::error::ApiError;
use super::request::ApiRequest;
use crate::models::{MarketAnalytics, PaymentStatus, PropertyComparison};
use crate::validation::ValidationError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareRequest<'a> {
    property_id1: &'a str,
    property_id2: &'a str,
}

impl ApiClient {
    pub async fn market_analytics(&self) -> Result<MarketAnalytics, ApiError> {
        self.call(ApiRequest::get("/analytics/market")).await
    }

    pub async fn compare_listings(
        &self,
        first: &str,
        second: &str,
    ) -> Result<PropertyComparison, ApiError> {
        if first.trim().is_empty() || second.trim().is_empty() {
            return Err(ValidationError::MissingFields(vec!["propertyId1", "propertyId2"]).into());
        }
        if first == second {
            return Err(ValidationError::InvalidField {
                field: "propertyId2",
                reason: "pick two different listings".into(),
            }
            .into());
        }
        info!(first, second, "Comparing listings");
        self.call(ApiRequest::post("/compare").json(&CompareRequest {
            property_id1: first,
            property_id2: second,
        })?)
        .await
    }

    pub async fn payment_status(&self, listing_id: &str) -> Result<PaymentStatus, ApiError> {
        self.call(ApiRequest::get(format!("/payments/{listing_id}/status"))).await
    }

    pub async fn mark_paid(&self, listing_id: &str) -> Result<PaymentStatus, ApiError> {
        info!(listing_id, "Marking listing fee as paid");
        self.call(ApiRequest::patch(format!("/payments/{listing_id}/mark-paid")))
            .await
    }
}
