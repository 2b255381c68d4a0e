//! Client for the estate marketplace REST backend.
//!
//! [`api::ApiClient`] attaches the stored bearer token to every non-public
//! request and, on a 401, refreshes the access token once and replays the
//! call. [`session::SessionContext`] tracks who is signed in,
//! [`store::AppStore`] holds modal/route/notice state, and [`dashboard`]
//! builds a role-specific view for the signed-in user.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod session;
pub mod store;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use config::EstateConfig;
pub use session::SessionContext;
