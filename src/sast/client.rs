//! REST client for the SAST server
//!
//! Three calls are needed: logon for a bearer credential, the engine server
//! list, and the scan queue. Anything other than 200/201/202 is an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::sast::error::{SastError, SastResult};
use crate::sast::types::{decode_records, EngineDescriptor, EngineRecord, ScanRecord, ScanSnapshot};

const LOGON_PATH: &str = "cxrestapi/auth/identity/connect/token";
const ENGINES_PATH: &str = "cxrestapi/sast/engineServers";
const SCANS_QUEUE_PATH: &str = "cxrestapi/sast/scansQueue";

// Public resource-owner client registered by every SAST installation
const CLIENT_ID: &str = "resource_owner_client";
const CLIENT_SECRET: &str = "014DF517-39D1-4453-B7B3-9930C563627C";
const SCOPE: &str = "sast_rest_api";

/// Operations the collector needs from the SAST server
#[async_trait]
pub trait SastApi: Send + Sync {
    /// Obtain a credential in `Authorization` header form (`Bearer xyz`)
    async fn logon(&self) -> SastResult<String>;

    async fn list_engines(&self, token: &str) -> SastResult<Vec<EngineDescriptor>>;

    async fn list_scans_queue(&self, token: &str) -> SastResult<Vec<ScanSnapshot>>;
}

/// Connection settings for [`SastClient`]
#[derive(Clone)]
pub struct SastSettings {
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub request_timeout: Duration,
    pub accept_invalid_certs: bool,
}

/// reqwest-backed [`SastApi`] implementation
#[derive(Clone)]
pub struct SastClient {
    http: reqwest::Client,
    hostname: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    access_token: String,
}

impl SastClient {
    pub fn new(settings: &SastSettings) -> SastResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| SastError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            hostname: settings.hostname.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        token: &str,
    ) -> SastResult<T> {
        let url = api_url(&self.hostname, path);
        log::debug!("{} at {}", operation, url);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::AUTHORIZATION, token)
            .send()
            .await
            .map_err(|e| SastError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        decode_response(operation, response).await
    }
}

#[async_trait]
impl SastApi for SastClient {
    async fn logon(&self) -> SastResult<String> {
        let url = api_url(&self.hostname, LOGON_PATH);
        log::debug!("Logon at {}", url);

        let form = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("grant_type", "password"),
            ("scope", SCOPE),
            ("client_id", CLIENT_ID),
            ("client_secret", CLIENT_SECRET),
        ];
        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| SastError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let token: TokenResponse = decode_response("logon", response).await?;
        let credential = format_credential(&token.token_type, &token.access_token)
            .ok_or(SastError::Unauthenticated)?;
        log::debug!("Logon: credential retrieved successfully");
        Ok(credential)
    }

    async fn list_engines(&self, token: &str) -> SastResult<Vec<EngineDescriptor>> {
        let values: Vec<serde_json::Value> =
            self.get_json("Get engines", ENGINES_PATH, token).await?;
        let engines: Vec<EngineDescriptor> = decode_records::<EngineRecord, _>("engine", values);
        if engines.is_empty() {
            log::debug!("Get engines: no engines found");
        } else {
            log::debug!("Get engines: retrieved {} engine(s)", engines.len());
        }
        Ok(engines)
    }

    async fn list_scans_queue(&self, token: &str) -> SastResult<Vec<ScanSnapshot>> {
        let values: Vec<serde_json::Value> = self
            .get_json("Get scan queue", SCANS_QUEUE_PATH, token)
            .await?;
        let scans: Vec<ScanSnapshot> = decode_records::<ScanRecord, _>("scan", values);
        if scans.is_empty() {
            log::debug!("Get scan queue: no scans found in queue");
        } else {
            log::debug!("Get scan queue: retrieved {} scan(s) in queue", scans.len());
        }
        Ok(scans)
    }
}

async fn decode_response<T: DeserializeOwned>(
    operation: &str,
    response: reqwest::Response,
) -> SastResult<T> {
    let status = response.status().as_u16();
    if !is_accepted_status(status) {
        let body = response.text().await.unwrap_or_default();
        return Err(SastError::Status {
            operation: operation.to_string(),
            status,
            body,
        });
    }
    response.json::<T>().await.map_err(|e| SastError::Decode {
        operation: operation.to_string(),
        message: e.to_string(),
    })
}

/// Build a REST URL from a configured host
///
/// The host is lower-cased, `http://` is assumed when no scheme is given, and
/// exactly one `/` separates host and path.
pub fn api_url(hostname: &str, path: &str) -> String {
    let mut base = hostname.trim().to_lowercase();
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{}", base);
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    format!("{}{}", base, path.trim_start_matches('/'))
}

/// Combine a token type and value; `None` when no token was issued
pub fn format_credential(token_type: &str, access_token: &str) -> Option<String> {
    if access_token.is_empty() {
        return None;
    }
    let kind = if token_type.is_empty() { "Bearer" } else { token_type };
    Some(format!("{} {}", kind, access_token))
}

pub fn is_accepted_status(status: u16) -> bool {
    matches!(status, 200..=202)
}
