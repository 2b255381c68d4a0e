use std::fmt;

use serde::Serialize;

use crate::api::{ApiClient, ApiError};
use crate::models::{Inquiry, Listing};
use crate::store::AppStore;

use super::{confirm, write_heading, write_listing, write_panel, Panel};

/// An agent's own listings and the inquiries sent about them
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentBoard {
    pub listings: Panel<Vec<Listing>>,
    pub inquiries: Panel<Vec<Inquiry>>,
}

impl AgentBoard {
    pub async fn load(api: &ApiClient) -> Self {
        let (listings, inquiries) = tokio::join!(api.agent_listings(), api.agent_inquiries());
        Self {
            listings: Panel::from_result(listings),
            inquiries: Panel::from_result(inquiries),
        }
    }

    pub fn failed_panels(&self) -> usize {
        usize::from(self.listings.is_failed()) + usize::from(self.inquiries.is_failed())
    }

    pub async fn respond(
        &mut self,
        api: &ApiClient,
        store: &AppStore,
        inquiry_id: &str,
        response: &str,
    ) -> Result<Inquiry, ApiError> {
        let updated = confirm(
            store,
            "Response sent",
            "Could not send response",
            api.respond_inquiry(inquiry_id, response),
        )
        .await?;
        self.inquiries.replace(|q| q.id == inquiry_id, updated.clone());
        Ok(updated)
    }

    pub async fn close(
        &mut self,
        api: &ApiClient,
        store: &AppStore,
        inquiry_id: &str,
    ) -> Result<Inquiry, ApiError> {
        let updated = confirm(
            store,
            "Inquiry closed",
            "Could not close inquiry",
            api.close_inquiry(inquiry_id),
        )
        .await?;
        self.inquiries.replace(|q| q.id == inquiry_id, updated.clone());
        Ok(updated)
    }

    pub async fn delete_listing(
        &mut self,
        api: &ApiClient,
        store: &AppStore,
        listing_id: &str,
    ) -> Result<(), ApiError> {
        confirm(
            store,
            "Listing deleted",
            "Could not delete listing",
            api.delete_listing(listing_id),
        )
        .await?;
        self.listings.remove(|l| l.id == listing_id);
        Ok(())
    }
}

impl fmt::Display for AgentBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_heading(f, "Agent dashboard")?;
        write_panel(f, "My listings", &self.listings, write_listing)?;
        write_panel(f, "Inquiries", &self.inquiries, |f, i, inquiry| {
            let from = inquiry
                .client
                .as_ref()
                .map(|c| c.display_name())
                .unwrap_or("client");
            writeln!(
                f,
                "{}. {} from {} [{:?}]  ID: {}",
                i,
                inquiry.listing.title(),
                from,
                inquiry.status,
                inquiry.id
            )?;
            writeln!(f, "   {}", inquiry.message)?;
            if let Some(response) = &inquiry.response {
                writeln!(f, "   Replied: {response}")?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::testing::{RecordingNavigator, ScriptedTransport};
    use crate::dashboard::fixtures;
    use crate::models::InquiryStatus;
    use crate::store::MemoryTokenStore;
    use serde_json::json;

    fn api(transport: Arc<ScriptedTransport>) -> ApiClient {
        ApiClient::new(
            transport,
            Arc::new(MemoryTokenStore::with_tokens(Some("T1"), Some("R1"))),
            Arc::new(RecordingNavigator::default()),
        )
    }

    async fn loaded(transport: &Arc<ScriptedTransport>) -> AgentBoard {
        transport.respond(
            "GET",
            "/listings/agent",
            200,
            json!([
                fixtures::listing("l-1", "Barn", "APPROVED"),
                fixtures::listing("l-2", "Mill", "PENDING"),
            ]),
        );
        transport.respond(
            "GET",
            "/inquiries/agent",
            200,
            json!([fixtures::inquiry("q-1", "l-1", "PENDING")]),
        );
        AgentBoard::load(&api(transport.clone())).await
    }

    #[tokio::test]
    async fn close_replaces_the_local_inquiry() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut board = loaded(&transport).await;
        transport.respond(
            "PATCH",
            "/inquiries/q-1/close",
            200,
            fixtures::inquiry("q-1", "l-1", "CLOSED"),
        );

        board.close(&api(transport), &AppStore::new(), "q-1").await.expect("closed");

        assert_eq!(board.inquiries.items()[0].status, InquiryStatus::Closed);
    }

    #[tokio::test]
    async fn delete_removes_only_on_success() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut board = loaded(&transport).await;
        transport.respond("DELETE", "/listings/l-2", 500, json!({ "message": "db down" }));
        transport.respond("DELETE", "/listings/l-2", 200, json!({ "success": true }));
        let client = api(transport);
        let store = AppStore::new();

        assert!(board.delete_listing(&client, &store, "l-2").await.is_err());
        assert_eq!(board.listings.items().len(), 2);

        board.delete_listing(&client, &store, "l-2").await.expect("deleted");
        assert_eq!(board.listings.items().len(), 1);
        assert_eq!(board.listings.items()[0].id, "l-1");
    }
}
