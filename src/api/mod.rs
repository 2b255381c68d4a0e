pub mod admin;
pub mod auth;
pub mod client;
pub mod error;
pub mod inquiries;
pub mod insights;
pub mod listings;
pub mod request;
pub mod saved;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::SignUpReceipt;
pub use client::{ApiClient, Navigator, REFRESH_PATH};
pub use error::{ApiError, TransportError};
pub use listings::ListingFilter;
pub use request::{ApiRequest, ApiResponse, RequestId};
pub use transport::{HttpTransport, ReqwestTransport};
