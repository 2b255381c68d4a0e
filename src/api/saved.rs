use serde::de::IgnoredAny;
use tracing::info;

use super::client::ApiClient;
use super::error::ApiError;
use super::request::ApiRequest;
use crate::models::{SavedFlag, SavedProperty};

impl ApiClient {
    pub async fn saved_properties(&self) -> Result<Vec<SavedProperty>, ApiError> {
        self.call(ApiRequest::get("/saved")).await
    }

    pub async fn save_property(&self, listing_id: &str) -> Result<SavedProperty, ApiError> {
        info!(listing_id, "Saving property");
        self.call(ApiRequest::post(format!("/saved/{listing_id}"))).await
    }

    pub async fn unsave_property(&self, listing_id: &str) -> Result<(), ApiError> {
        info!(listing_id, "Removing saved property");
        self.call::<IgnoredAny>(ApiRequest::delete(format!("/saved/{listing_id}")))
            .await
            .map(|_| ())
    }

    /// Flips the saved state and returns the new one
    pub async fn toggle_saved(&self, listing_id: &str) -> Result<bool, ApiError> {
        let flag: SavedFlag = self
            .call(ApiRequest::post(format!("/saved/{listing_id}/toggle")))
            .await?;
        Ok(flag.is_saved)
    }

    pub async fn is_saved(&self, listing_id: &str) -> Result<bool, ApiError> {
        let flag: SavedFlag = self
            .call(ApiRequest::get(format!("/saved/{listing_id}/check")))
            .await?;
        Ok(flag.is_saved)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::testing::{RecordingNavigator, ScriptedTransport};
    use crate::store::MemoryTokenStore;
    use serde_json::json;

    #[tokio::test]
    async fn toggle_and_check_read_either_flag_name() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("POST", "/saved/l-1/toggle", 200, json!({ "data": { "saved": true } }));
        transport.respond("GET", "/saved/l-1/check", 200, json!({ "isSaved": false }));
        let client = ApiClient::new(
            transport,
            Arc::new(MemoryTokenStore::with_tokens(Some("T"), None)),
            Arc::new(RecordingNavigator::default()),
        );

        assert!(client.toggle_saved("l-1").await.expect("toggle"));
        assert!(!client.is_saved("l-1").await.expect("check"));
    }
}
