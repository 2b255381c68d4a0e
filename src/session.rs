//! Who is signed in.
//!
//! [`SessionContext`] owns the in-memory token and the profile fetched for it.
//! Every token change bumps a generation counter; a profile fetch only lands
//! if the generation it started under is still current, so a logout during a
//! fetch leaves the session empty.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, SignUpReceipt};
use crate::models::Profile;
use crate::validation::SignUpForm;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    profile: Option<Profile>,
    pub token: Option<String>,
    pub loading: bool,
}

impl SessionState {
    /// The signed-in profile; `None` while a fetch is still in flight
    pub fn user(&self) -> Option<&Profile> {
        if self.loading {
            None
        } else {
            self.profile.as_ref()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

pub struct SessionContext {
    api: ApiClient,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
}

impl SessionContext {
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            api,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Loads the persisted token and, if there is one, the matching profile.
    pub async fn init(&self) -> Result<Option<Profile>, ApiError> {
        let token = self.api.tokens().access_token()?;
        debug!(has_token = token.is_some(), "Initializing session");
        self.set_token(token);
        self.reload_profile().await
    }

    /// Persists the pair, then fetches the profile for the new access token.
    pub async fn login(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Option<Profile>, ApiError> {
        self.api.tokens().set_pair(access_token, refresh_token)?;
        self.set_token(Some(access_token.to_string()));
        let profile = self.reload_profile().await?;
        if let Some(profile) = &profile {
            info!(user_id = %profile.id, role = %profile.role, "Signed in");
        }
        Ok(profile)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Option<Profile>, ApiError> {
        let tokens = self.api.sign_in(email, password).await?;
        self.login(&tokens.access_token, &tokens.refresh_token).await
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpReceipt, ApiError> {
        self.api.sign_up(form).await
    }

    /// Clears persisted and in-memory credentials.
    pub fn logout(&self) -> Result<(), ApiError> {
        let cleared = self.api.tokens().clear();
        self.expire();
        info!("Signed out");
        cleared.map_err(ApiError::from)
    }

    /// Drops in-memory session state without touching storage.
    ///
    /// Used after the client has already cleared storage on a failed refresh.
    pub fn expire(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(SessionState::default());
    }

    pub fn set_user(&self, profile: Profile) {
        self.state.send_modify(|state| state.profile = Some(profile));
    }

    fn set_token(&self, token: Option<String>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|state| {
            state.token = token;
            state.profile = None;
            state.loading = false;
        });
    }

    /// Fetches the profile for the current token; stale results are discarded.
    async fn reload_profile(&self) -> Result<Option<Profile>, ApiError> {
        let generation = self.generation.load(Ordering::SeqCst);
        if self.state.borrow().token.is_none() {
            return Ok(None);
        }

        self.state.send_modify(|state| state.loading = true);
        let fetched = self.api.current_user().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Session changed during profile fetch, discarding result");
            return Ok(None);
        }

        match fetched {
            Ok(profile) => {
                self.state.send_modify(|state| {
                    state.profile = Some(profile.clone());
                    state.loading = false;
                });
                Ok(Some(profile))
            }
            Err(error) => {
                warn!(%error, "Failed to load profile");
                if error.is_session_expired() {
                    self.expire();
                } else {
                    self.state.send_modify(|state| {
                        state.profile = None;
                        state.loading = false;
                    });
                }
                Err(error)
            }
        }
    }
}
