use serde::Serialize;
use tracing::info;

use super::client::ApiClient;
use super::error::ApiError;
use super::request::ApiRequest;
use crate::models::Inquiry;
use crate::validation::{InquiryDraft, ValidationError};

#[derive(Debug, Serialize)]
struct Reply<'a> {
    response: &'a str,
}

impl ApiClient {
    pub async fn create_inquiry(&self, draft: &InquiryDraft) -> Result<Inquiry, ApiError> {
        draft.validate()?;
        info!(listing_id = %draft.listing_id, "Sending inquiry");
        self.call(ApiRequest::post("/inquiries").json(draft)?).await
    }

    /// Inquiries the signed-in client has sent
    pub async fn client_inquiries(&self) -> Result<Vec<Inquiry>, ApiError> {
        self.call(ApiRequest::get("/inquiries/client")).await
    }

    /// Inquiries addressed to the signed-in agent
    pub async fn agent_inquiries(&self) -> Result<Vec<Inquiry>, ApiError> {
        self.call(ApiRequest::get("/inquiries/agent")).await
    }

    pub async fn respond_inquiry(&self, id: &str, response: &str) -> Result<Inquiry, ApiError> {
        if response.trim().is_empty() {
            return Err(ValidationError::MissingFields(vec!["response"]).into());
        }
        info!(inquiry_id = id, "Responding to inquiry");
        self.call(ApiRequest::patch(format!("/inquiries/{id}/respond")).json(&Reply {
            response: response.trim(),
        })?)
        .await
    }

    pub async fn close_inquiry(&self, id: &str) -> Result<Inquiry, ApiError> {
        info!(inquiry_id = id, "Closing inquiry");
        self.call(ApiRequest::patch(format!("/inquiries/{id}/close"))).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::testing::{RecordingNavigator, ScriptedTransport};
    use crate::models::InquiryStatus;
    use crate::store::MemoryTokenStore;
    use serde_json::json;

    #[tokio::test]
    async fn respond_trims_and_rejects_blank_replies() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "PATCH",
            "/inquiries/q-1/respond",
            200,
            json!({
                "id": "q-1",
                "listing": "l-1",
                "message": "Pets?",
                "response": "Yes",
                "status": "RESPONDED",
            }),
        );
        let client = ApiClient::new(
            transport.clone(),
            Arc::new(MemoryTokenStore::with_tokens(Some("T"), None)),
            Arc::new(RecordingNavigator::default()),
        );

        assert!(client.respond_inquiry("q-1", "   ").await.is_err());
        let inquiry = client.respond_inquiry("q-1", " Yes ").await.expect("responded");

        assert_eq!(inquiry.status, InquiryStatus::Responded);
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body, Some(json!({ "response": "Yes" })));
    }
}
