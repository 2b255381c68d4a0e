use std::fmt;

use serde::Serialize;

use crate::api::{ApiClient, ApiError};
use crate::models::{AgentAccount, Listing, MarketAnalytics, Profile};
use crate::store::AppStore;

use super::{confirm, write_heading, write_listing, write_panel, Panel};

/// Moderation queue, agent management and market overview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBoard {
    pub pending: Panel<Vec<Listing>>,
    pub listings: Panel<Vec<Listing>>,
    pub agents: Panel<Vec<AgentAccount>>,
    pub recent_users: Panel<Vec<Profile>>,
    pub analytics: Panel<MarketAnalytics>,
}

impl AdminBoard {
    pub async fn load(api: &ApiClient) -> Self {
        let (pending, listings, agents, recent_users, analytics) = tokio::join!(
            api.pending_listings(),
            api.all_listings(),
            api.agents(),
            api.recent_users(),
            api.market_analytics(),
        );
        Self {
            pending: Panel::from_result(pending),
            listings: Panel::from_result(listings),
            agents: Panel::from_result(agents),
            recent_users: Panel::from_result(recent_users),
            analytics: Panel::from_result(analytics),
        }
    }

    pub fn failed_panels(&self) -> usize {
        [
            self.pending.is_failed(),
            self.listings.is_failed(),
            self.agents.is_failed(),
            self.recent_users.is_failed(),
            self.analytics.is_failed(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }

    pub async fn approve(
        &mut self,
        api: &ApiClient,
        store: &AppStore,
        listing_id: &str,
    ) -> Result<Listing, ApiError> {
        let updated = confirm(
            store,
            "Listing approved",
            "Could not approve listing",
            api.approve_listing(listing_id),
        )
        .await?;
        self.settle(updated.clone());
        Ok(updated)
    }

    pub async fn reject(
        &mut self,
        api: &ApiClient,
        store: &AppStore,
        listing_id: &str,
    ) -> Result<Listing, ApiError> {
        let updated = confirm(
            store,
            "Listing rejected",
            "Could not reject listing",
            api.reject_listing(listing_id),
        )
        .await?;
        self.settle(updated.clone());
        Ok(updated)
    }

    /// A moderated listing leaves the queue and is refreshed in the full list
    fn settle(&mut self, listing: Listing) {
        self.pending.remove(|l| l.id == listing.id);
        let id = listing.id.clone();
        self.listings.upsert(|l| l.id == id, listing);
    }

    pub async fn toggle_agent(
        &mut self,
        api: &ApiClient,
        store: &AppStore,
        agent_id: &str,
    ) -> Result<AgentAccount, ApiError> {
        let updated = confirm(
            store,
            "Agent status updated",
            "Could not update agent",
            api.toggle_agent_active(agent_id),
        )
        .await?;
        self.agents.replace(|a| a.profile.id == agent_id, updated.clone());
        Ok(updated)
    }
}

impl fmt::Display for AdminBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_heading(f, "Admin dashboard")?;

        writeln!(f)?;
        match &self.analytics {
            Panel::Ready(stats) => {
                writeln!(f, "Market overview")?;
                writeln!(
                    f,
                    "   {} listings ({} approved, {} pending, {} rejected)",
                    stats.total_listings,
                    stats.approved_listings,
                    stats.pending_listings,
                    stats.rejected_listings
                )?;
                writeln!(f, "   Average price: {:.0}", stats.average_price)?;
                for bucket in &stats.by_property_type {
                    writeln!(f, "   {}: {}", bucket.label, bucket.count)?;
                }
            }
            Panel::Failed(error) => writeln!(f, "Market overview: failed to load ({error})")?,
        }

        write_panel(f, "Pending approval", &self.pending, write_listing)?;
        write_panel(f, "All listings", &self.listings, |f, i, listing| {
            writeln!(f, "{}. {} [{:?}]  ID: {}", i, listing.title, listing.status, listing.id)
        })?;
        write_panel(f, "Agents", &self.agents, |f, i, agent| {
            let state = if agent.is_active() { "active" } else { "inactive" };
            writeln!(
                f,
                "{}. {} <{}> {} listings, {}  ID: {}",
                i,
                agent.profile.name,
                agent.profile.email,
                agent.listing_count,
                state,
                agent.profile.id
            )
        })?;
        write_panel(f, "Recent users", &self.recent_users, |f, i, user| {
            writeln!(f, "{}. {} <{}> {}", i, user.name, user.email, user.role)
        })
    }
}
