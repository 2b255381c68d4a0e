//! Role-specific dashboards.
//!
//! Each role gets its own board type; [`Board::load`] picks one with an
//! exhaustive match on [`Role`]. Panels on a board are fetched concurrently
//! and independently, so one failing endpoint leaves the others populated.
//! Mutations patch local panels only after the server confirms.

pub mod admin;
pub mod agent;
pub mod client;
pub mod panel;

use std::fmt;
use std::future::Future;

use serde::Serialize;
use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::models::{Listing, Profile, Role};
use crate::store::{AppStore, Notice};

pub use admin::AdminBoard;
pub use agent::AgentBoard;
pub use client::ClientBoard;
pub use panel::Panel;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", content = "panels", rename_all = "UPPERCASE")]
pub enum Board {
    Client(ClientBoard),
    Agent(AgentBoard),
    Admin(AdminBoard),
}

impl Board {
    pub async fn load(api: &ApiClient, profile: &Profile) -> Board {
        info!(role = %profile.role, user_id = %profile.id, "Loading dashboard");
        let board = match profile.role {
            Role::Client => Board::Client(ClientBoard::load(api).await),
            Role::Agent => Board::Agent(AgentBoard::load(api).await),
            Role::Admin => Board::Admin(AdminBoard::load(api).await),
        };
        let failed = board.failed_panels();
        if failed > 0 {
            tracing::warn!(failed, "Some dashboard panels failed to load");
        }
        board
    }

    pub fn role(&self) -> Role {
        match self {
            Board::Client(_) => Role::Client,
            Board::Agent(_) => Role::Agent,
            Board::Admin(_) => Role::Admin,
        }
    }

    pub fn failed_panels(&self) -> usize {
        match self {
            Board::Client(board) => board.failed_panels(),
            Board::Agent(board) => board.failed_panels(),
            Board::Admin(board) => board.failed_panels(),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Board::Client(board) => fmt::Display::fmt(board, f),
            Board::Agent(board) => fmt::Display::fmt(board, f),
            Board::Admin(board) => fmt::Display::fmt(board, f),
        }
    }
}

/// Awaits a server mutation and posts a toast for the outcome
pub async fn confirm<T>(
    store: &AppStore,
    success: impl Into<String>,
    failure: &str,
    mutation: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    match mutation.await {
        Ok(value) => {
            store.notify(Notice::success(success));
            Ok(value)
        }
        Err(error) => {
            store.notify(Notice::error(format!("{failure}: {error}")));
            Err(error)
        }
    }
}

pub(crate) fn write_heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "== {title} ==")
}

pub(crate) fn write_panel<T>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    panel: &Panel<Vec<T>>,
    mut line: impl FnMut(&mut fmt::Formatter<'_>, usize, &T) -> fmt::Result,
) -> fmt::Result {
    writeln!(f)?;
    match panel {
        Panel::Ready(items) => {
            writeln!(f, "{title} ({})", items.len())?;
            if items.is_empty() {
                writeln!(f, "   nothing here yet")?;
            }
            for (i, item) in items.iter().enumerate() {
                line(f, i + 1, item)?;
            }
        }
        Panel::Failed(error) => writeln!(f, "{title}: failed to load ({error})")?,
    }
    Ok(())
}

pub fn write_listing(f: &mut fmt::Formatter<'_>, index: usize, listing: &Listing) -> fmt::Result {
    writeln!(
        f,
        "{}. {} ({:.0}, {})",
        index,
        listing.title,
        listing.price,
        listing.listing_type.as_str()
    )?;
    writeln!(
        f,
        "   {} bd, {} ba, {} sqft, {}",
        listing.bedrooms,
        listing.bathrooms,
        listing.size,
        listing.property_type.as_str()
    )?;
    match &listing.location.city {
        Some(city) => writeln!(f, "   {}, {}", listing.location.address, city)?,
        None => writeln!(f, "   {}", listing.location.address)?,
    }
    writeln!(
        f,
        "   Map: {:.5}, {:.5}",
        listing.location.latitude, listing.location.longitude
    )?;
    writeln!(f, "   Status: {:?}  ID: {}", listing.status, listing.id)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub fn listing(id: &str, title: &str, status: &str) -> Value {
        json!({
            "_id": id,
            "title": title,
            "price": 150000,
            "location": {
                "address": "1 Main St",
                "city": "York",
                "latitude": 53.96,
                "longitude": -1.08
            },
            "bedrooms": 2,
            "propertyType": "HOUSE",
            "listingType": "SALE",
            "status": status
        })
    }

    pub fn inquiry(id: &str, listing_id: &str, status: &str) -> Value {
        json!({
            "_id": id,
            "property": listing_id,
            "message": "Still available?",
            "status": status,
        })
    }

    pub fn profile(id: &str, role: &str) -> Value {
        json!({
            "_id": id,
            "name": format!("user {id}"),
            "email": format!("{id}@example.com"),
            "role": role,
        })
    }
}
