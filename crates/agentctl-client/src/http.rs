//! HTTP client abstraction
//!
//! `RestJsonClient` talks to the service through the `HttpClient` trait so
//! tests can script responses; `ReqwestHttpClient` is the real transport and
//! optionally signs every request with AWS SigV4.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::{Duration, SystemTime};
use tracing::debug;

use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;

const USER_AGENT: &str = concat!("agentctl/", env!("CARGO_PKG_VERSION"));

/// HTTP response from the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers (name, value pairs)
    pub headers: Vec<(String, String)>,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Get the response body as a UTF-8 string
    pub fn body_string(&self) -> Result<String> {
        String::from_utf8(self.body.clone())
            .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in response body: {}", e))
    }

    /// Parse the response body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON response: {}", e))
    }

    /// Get a header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Minimal HTTP interface used by the wire client
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request
    ///
    /// # Parameters
    /// - `method`: HTTP method (GET, POST, PUT, DELETE, etc.)
    /// - `url`: Full URL to request
    /// - `headers`: Request headers as (name, value) pairs
    /// - `body`: Optional request body bytes
    async fn request(
        &self,
        method: &str,
        url: &str,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse>;
}

/// Signs requests with AWS SigV4 for one region and service
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: SharedCredentialsProvider,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(
        credentials: SharedCredentialsProvider,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Append the signature headers for this request to `headers`.
    async fn sign(
        &self,
        method: &str,
        url: &str,
        headers: &mut Vec<(String, String)>,
        body: &[u8],
    ) -> Result<()> {
        let credentials = self
            .credentials
            .provide_credentials()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get AWS credentials: {}", e))?;

        let signable_headers: Vec<(&str, &str)> = headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        let signable_request = SignableRequest::new(
            method,
            url,
            signable_headers.into_iter(),
            SignableBody::Bytes(body),
        )
        .map_err(|e| anyhow::anyhow!("Failed to create signable request: {}", e))?;

        let identity = credentials.into();
        let signing_params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(&self.service)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build signing params: {}", e))?
            .into();

        let (signing_instructions, _signature) = sign(signable_request, &signing_params)
            .map_err(|e| anyhow::anyhow!("Failed to sign request: {}", e))?
            .into_parts();

        for (name, value) in signing_instructions.headers() {
            headers.push((name.to_string(), value.to_string()));
        }
        Ok(())
    }
}

/// HTTP client using reqwest, signing requests when a signer is configured
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    signer: Option<SigV4Signer>,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration, signer: Option<SigV4Signer>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create reqwest client: {}", e))?;

        Ok(Self { client, signer })
    }

    pub fn is_signing(&self) -> bool {
        self.signer.is_some()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn request(
        &self,
        method: &str,
        url: &str,
        mut headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse> {
        // Add User-Agent if not present
        if !headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("user-agent"))
        {
            headers.push(("User-Agent".to_string(), USER_AGENT.to_string()));
        }

        if let Some(signer) = &self.signer {
            signer
                .sign(method, url, &mut headers, body.as_deref().unwrap_or_default())
                .await?;
        }

        let mut request_builder = self
            .client
            .request(method.parse().context("Invalid HTTP method")?, url);

        // Add headers (including signed headers if applicable)
        for (name, value) in &headers {
            request_builder = request_builder.header(name, value);
        }

        if let Some(body_bytes) = body {
            request_builder = request_builder.body(body_bytes);
        }

        let response = request_builder
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status().as_u16();
        let response_headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?
            .to_vec();
        debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}
