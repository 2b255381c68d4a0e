use std::fmt;

use serde::Serialize;

use crate::api::{ApiClient, ApiError, ListingFilter};
use crate::models::{Inquiry, Listing, ListingRef, SavedProperty};
use crate::store::AppStore;
use crate::validation::InquiryDraft;

use super::{confirm, write_heading, write_listing, write_panel, Panel};

/// Browse, bookmark and ask about approved listings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBoard {
    pub featured: Panel<Vec<Listing>>,
    pub saved: Panel<Vec<SavedProperty>>,
    pub inquiries: Panel<Vec<Inquiry>>,
}

impl ClientBoard {
    pub async fn load(api: &ApiClient) -> Self {
        let filter = ListingFilter::default();
        let (featured, saved, inquiries) = tokio::join!(
            api.approved_listings(&filter),
            api.saved_properties(),
            api.client_inquiries(),
        );
        Self {
            featured: Panel::from_result(featured),
            saved: Panel::from_result(saved),
            inquiries: Panel::from_result(inquiries),
        }
    }

    pub fn failed_panels(&self) -> usize {
        [self.featured.is_failed(), self.saved.is_failed(), self.inquiries.is_failed()]
            .into_iter()
            .filter(|failed| *failed)
            .count()
    }

    pub fn is_saved(&self, listing_id: &str) -> bool {
        self.saved.items().iter().any(|s| s.listing.id() == listing_id)
    }

    /// Flips the bookmark on the server, then mirrors the new state locally
    pub async fn toggle_saved(
        &mut self,
        api: &ApiClient,
        store: &AppStore,
        listing_id: &str,
    ) -> Result<bool, ApiError> {
        let saved = confirm(
            store,
            "Saved properties updated",
            "Could not update saved properties",
            api.toggle_saved(listing_id),
        )
        .await?;

        if saved {
            let listing = self
                .featured
                .items()
                .iter()
                .find(|l| l.id == listing_id)
                .cloned()
                .map(|l| ListingRef::Embedded(Box::new(l)))
                .unwrap_or_else(|| ListingRef::Id(listing_id.to_string()));
            self.saved.upsert(
                |s| s.listing.id() == listing_id,
                SavedProperty {
                    // the saved record's own id is only known after a reload
                    id: String::new(),
                    listing,
                    saved_at: Some(chrono::Utc::now()),
                },
            );
        } else {
            self.saved.remove(|s| s.listing.id() == listing_id);
        }
        Ok(saved)
    }

    pub async fn send_inquiry(
        &mut self,
        api: &ApiClient,
        store: &AppStore,
        draft: &InquiryDraft,
    ) -> Result<Inquiry, ApiError> {
        let inquiry = confirm(
            store,
            "Inquiry sent to the agent",
            "Could not send inquiry",
            api.create_inquiry(draft),
        )
        .await?;
        self.inquiries.push(inquiry.clone());
        Ok(inquiry)
    }
}

impl fmt::Display for ClientBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_heading(f, "Client dashboard")?;
        write_panel(f, "Available properties", &self.featured, write_listing)?;
        write_panel(f, "Saved properties", &self.saved, |f, i, saved| {
            writeln!(f, "{}. {} (listing {})", i, saved.listing.title(), saved.listing.id())
        })?;
        write_panel(f, "My inquiries", &self.inquiries, |f, i, inquiry| {
            writeln!(f, "{}. {} [{:?}]", i, inquiry.listing.title(), inquiry.status)?;
            writeln!(f, "   You: {}", inquiry.message)?;
            if let Some(response) = &inquiry.response {
                writeln!(f, "   Agent: {response}")?;
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
    use crate::store::{MemoryTokenStore, NoticeLevel};
    use serde_json::json;

    fn api(transport: Arc<ScriptedTransport>) -> ApiClient {
        ApiClient::new(
            transport,
            Arc::new(MemoryTokenStore::with_tokens(Some("T1"), Some("R1"))),
            Arc::new(RecordingNavigator::default()),
        )
    }

    async fn loaded(transport: &Arc<ScriptedTransport>) -> ClientBoard {
        transport.respond(
            "GET",
            "/listings/approved",
            200,
            json!([fixtures::listing("l-1", "Barn", "APPROVED")]),
        );
        transport.respond("GET", "/saved", 200, json!([]));
        transport.respond("GET", "/inquiries/client", 200, json!([]));
        ClientBoard::load(&api(transport.clone())).await
    }

    #[tokio::test]
    async fn toggle_saved_patches_after_confirmation() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut board = loaded(&transport).await;
        let store = AppStore::new();
        transport.respond("POST", "/saved/l-1/toggle", 200, json!({ "isSaved": true }));
        transport.respond("POST", "/saved/l-1/toggle", 200, json!({ "isSaved": false }));

        let client = api(transport.clone());
        assert!(board.toggle_saved(&client, &store, "l-1").await.expect("save"));
        assert!(board.is_saved("l-1"));
        assert_eq!(board.saved.items()[0].listing.title(), "Barn");
        assert!(board.saved.items()[0].id.is_empty());

        assert!(!board.toggle_saved(&client, &store, "l-1").await.expect("unsave"));
        assert!(!board.is_saved("l-1"));
    }

    #[tokio::test]
    async fn failed_toggle_leaves_local_state_and_posts_error() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut board = loaded(&transport).await;
        let store = AppStore::new();
        transport.respond(
            "POST",
            "/saved/l-1/toggle",
            403,
            json!({ "message": "Only clients can save properties" }),
        );

        let result = board.toggle_saved(&api(transport), &store, "l-1").await;

        assert!(result.is_err());
        assert!(!board.is_saved("l-1"));
        let notices = store.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn sent_inquiry_is_appended() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut board = loaded(&transport).await;
        transport.respond("POST", "/inquiries", 201, fixtures::inquiry("q-1", "l-1", "PENDING"));

        let draft = InquiryDraft {
            listing_id: "l-1".into(),
            message: "Still available?".into(),
        };
        board
            .send_inquiry(&api(transport), &AppStore::new(), &draft)
            .await
            .expect("sent");

        assert_eq!(board.inquiries.items().len(), 1);
        assert_eq!(board.inquiries.items()[0].id, "q-1");
    }
}
