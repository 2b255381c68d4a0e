use tracing::info;

use super::client::ApiClient;
use super::error::ApiError;
use super::request::ApiRequest;
use crate::models::{AgentAccount, Profile};

impl ApiClient {
    pub async fn agents(&self) -> Result<Vec<AgentAccount>, ApiError> {
        self.call(ApiRequest::get("/admin/agents")).await
    }

    /// Activates or deactivates an agent; returns the updated account
    pub async fn toggle_agent_active(&self, agent_id: &str) -> Result<AgentAccount, ApiError> {
        info!(agent_id, "Toggling agent active state");
        self.call(ApiRequest::patch(format!("/admin/agents/{agent_id}/toggle-active")))
            .await
    }

    pub async fn recent_users(&self) -> Result<Vec<Profile>, ApiError> {
        self.call(ApiRequest::get("/admin/users/recent")).await
    }
}
