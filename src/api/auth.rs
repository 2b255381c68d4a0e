use serde::{Deserialize, Serialize};
use tracing::info;

use super::client::ApiClient;
use super::error::ApiError;
use super::request::ApiRequest;
use crate::models::{AuthTokens, Profile};
use crate::validation::SignUpForm;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Reply to a successful registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignUpReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Profile>,
}

impl ApiClient {
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpReceipt, ApiError> {
        form.validate()?;
        info!(email = %form.email, role = %form.role, "Registering account");
        self.call(ApiRequest::post("/auth/signup").json(form)?).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthTokens, ApiError> {
        let email = email.trim().to_lowercase();
        info!(%email, "Signing in");
        self.call(ApiRequest::post("/auth/signin").json(&Credentials {
            email: &email,
            password,
        })?)
        .await
    }

    pub async fn current_user(&self) -> Result<Profile, ApiError> {
        self.call(ApiRequest::get("/auth/me")).await
    }
}
