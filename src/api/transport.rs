use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use super::error::TransportError;
use super::request::{ApiRequest, ApiResponse, MultipartForm, RequestBody};

/// Executes one request against the backend.
///
/// Implementations do no auth handling of their own: the bearer token, if any,
/// is decided by the caller and passed in.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError>;

    /// Base URL requests are resolved against, for logging
    fn base_url(&self) -> &str;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn build_form(form: &MultipartForm) -> Result<Form, TransportError> {
    let mut multipart = Form::new();
    for (name, value) in &form.fields {
        multipart = multipart.text(name.clone(), value.clone());
    }
    for file in &form.files {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(|e| TransportError::Form(e.to_string()))?;
        multipart = multipart.part(file.field.clone(), part);
    }
    Ok(multipart)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.url(request.path());
        debug!(request_id = %request.id(), method = %request.method(), %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method().clone(), url.as_str())
            .header("x-request-id", request.id().to_string());

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(build_form(form)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        debug!(request_id = %request.id(), status, bytes = body.len(), "Received response");
        Ok(ApiResponse { status, body })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::FilePart;

    #[test]
    fn url_joins_paths_with_single_slash() {
        let transport =
            ReqwestTransport::new("http://localhost:5000/api/", Duration::from_secs(5), "test")
                .expect("transport");
        assert_eq!(transport.base_url(), "http://localhost:5000/api");
        assert_eq!(transport.url("/listings"), "http://localhost:5000/api/listings");
        assert_eq!(transport.url("listings/7"), "http://localhost:5000/api/listings/7");
    }

    #[test]
    fn invalid_mime_is_a_form_error() {
        let form = MultipartForm::default().file(FilePart {
            field: "images".into(),
            file_name: "front.jpg".into(),
            mime: "not a mime".into(),
            bytes: vec![1, 2, 3],
        });
        assert!(matches!(build_form(&form), Err(TransportError::Form(_))));
    }
}
