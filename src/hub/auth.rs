/// Login against the management backend
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::client::status_error;
use super::models::{DataResponse, LoginData};
use crate::config::ClientConfig;

/// Username/password login, returning the issued token
pub async fn login(config: &ClientConfig, username: &str, password: &str) -> Result<String> {
    if username.is_empty() {
        anyhow::bail!("username cannot be empty");
    }

    let url = login_url(&config.base_url()?, username, password)?;
    // Query carries the password; log the path only.
    debug!("POST {}", url.path());

    let client = Client::builder()
        .timeout(Duration::from_secs(config.system.timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .post(url)
        .send()
        .await
        .context("Failed to send login request")?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .context("Failed to read login response")?;

    if !status.is_success() {
        return Err(status_error(status.as_u16(), &body)).context("Login failed");
    }

    let token = parse_token(&body)?;
    info!("Logged in as {}", username);
    Ok(token)
}

/// `login/db?username=..&password=..`
fn login_url(base: &Url, username: &str, password: &str) -> Result<Url> {
    let mut url = base.join("login/db")?;
    url.query_pairs_mut()
        .append_pair("username", username)
        .append_pair("password", password);
    Ok(url)
}

fn parse_token(body: &[u8]) -> Result<String> {
    let response: DataResponse<LoginData> =
        serde_json::from_slice(body).context("Failed to parse login response")?;
    if response.data.token.is_empty() {
        anyhow::bail!("Backend returned an empty token");
    }
    Ok(response.data.token)
}
