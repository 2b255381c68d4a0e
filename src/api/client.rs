use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::request::{ApiRequest, ApiResponse, RequestId};
use super::transport::HttpTransport;
use crate::store::TokenStore;

pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Replays allowed per logical request after a refresh
const MAX_REPLAYS: u32 = 1;

/// Where the client sends the user when credentials cannot be renewed
pub trait Navigator: Send + Sync {
    fn redirect_to_sign_in(&self);
}

/// Side table of replay counts, keyed by request identity
#[derive(Debug, Default)]
struct RetryLedger {
    replays: Mutex<HashMap<RequestId, u32>>,
}

impl RetryLedger {
    fn replays(&self, id: RequestId) -> u32 {
        let map = self.replays.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.get(&id).copied().unwrap_or(0)
    }

    fn record(&self, id: RequestId) {
        let mut map = self.replays.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *map.entry(id).or_insert(0) += 1;
    }

    fn forget(&self, id: RequestId) {
        let mut map = self.replays.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.remove(&id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.replays.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }
}

/// Drops the ledger entry however the call ends
struct LedgerGuard<'a> {
    ledger: &'a RetryLedger,
    id: RequestId,
}

impl Drop for LedgerGuard<'_> {
    fn drop(&mut self) {
        self.ledger.forget(self.id);
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// HTTP client that attaches the stored bearer token and renews it once on 401.
///
/// Concurrent 401s each run their own refresh; nothing is queued or shared
/// between in-flight requests.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    ledger: Arc<RetryLedger>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            tokens,
            navigator,
            ledger: Arc::new(RetryLedger::default()),
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Sends the request and decodes a successful body into `T`.
    pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.decode()
    }

    /// Sends the request through the refresh interceptor and returns the raw response.
    ///
    /// Non-2xx responses other than a recoverable 401 are returned as-is; callers
    /// usually go through [`ApiClient::call`] which maps them to errors.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let _guard = LedgerGuard {
            ledger: &self.ledger,
            id: request.id(),
        };

        loop {
            let response = self.dispatch(&request).await?;
            if !response.is_unauthorized() || request.is_public() {
                return Ok(response);
            }

            if self.ledger.replays(request.id()) >= MAX_REPLAYS {
                warn!(
                    request_id = %request.id(),
                    path = request.path(),
                    "Unauthorized after refresh, giving up"
                );
                return Ok(response);
            }

            self.ledger.record(request.id());
            self.refresh_access_token().await?;
            debug!(
                request_id = %request.id(),
                path = request.path(),
                "Replaying request with renewed token"
            );
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let bearer = if request.is_public() {
            None
        } else {
            self.tokens.access_token()?
        };
        let response = self.transport.execute(request, bearer.as_deref()).await?;
        debug!(
            request_id = %request.id(),
            method = %request.method(),
            path = request.path(),
            status = response.status,
            "Request completed"
        );
        Ok(response)
    }

    async fn refresh_access_token(&self) -> Result<(), ApiError> {
        let Some(refresh_token) = self.tokens.refresh_token()? else {
            warn!("Access token rejected and no refresh token is stored");
            return Err(ApiError::MissingRefreshToken);
        };

        info!("Access token rejected, requesting a new one");
        let request = ApiRequest::post(REFRESH_PATH).json(&RefreshRequest {
            refresh_token: &refresh_token,
        })?;

        let renewed = match self.transport.execute(&request, None).await {
            Ok(response) => response.decode::<RefreshResponse>(),
            Err(error) => Err(ApiError::from(error)),
        };

        match renewed {
            Ok(renewed) => {
                match renewed.refresh_token.as_deref() {
                    Some(rotated) => self.tokens.set_pair(&renewed.access_token, rotated)?,
                    None => self.tokens.set_access_token(&renewed.access_token)?,
                }
                info!("Access token renewed");
                Ok(())
            }
            Err(error) => {
                warn!(%error, "Token refresh failed, clearing stored credentials");
                if let Err(clear_error) = self.tokens.clear() {
                    warn!(%clear_error, "Failed to clear stored credentials");
                }
                self.navigator.redirect_to_sign_in();
                Err(ApiError::SessionExpired)
            }
        }
    }
}
