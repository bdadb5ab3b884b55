/// Management backend API client
use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::error::HubError;
use super::models::*;
use super::HubBackend;
use crate::config::ClientConfig;
use crate::describe::ResourceKind;

/// Read-only client for the multi-cluster management backend
#[derive(Clone)]
pub struct HubClient {
    client: Client,
    base_url: Url,
}

impl HubClient {
    /// Create a new client from the loaded configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if !config.system.token.is_empty() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", config.system.token))
                    .context("Invalid auth token format")?,
            );
        }
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.system.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url()?,
        })
    }

    /// Make a GET request and return the raw body of a 2xx response
    async fn get_raw(&self, url: Url) -> Result<Vec<u8>, HubError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(status_error(status.as_u16(), &body))
        }
    }

    /// Make a GET request and decode the `data` envelope
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, HubError> {
        let body = self.get_raw(url).await?;
        let response: DataResponse<T> = serde_json::from_slice(&body)?;
        Ok(response.data)
    }
}

/// Build the error for a non-2xx response, preferring the backend's own message
pub(crate) fn status_error(status: u16, body: &[u8]) -> HubError {
    let message = match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(error) if !error.msg.is_empty() => {
            if error.code != 0 && error.code != i64::from(status) {
                format!("{} (code {})", error.msg, error.code)
            } else {
                error.msg
            }
        }
        _ => String::from_utf8_lossy(body).trim().to_string(),
    };
    HubError::Status { status, message }
}

/// `api/v1/currentuser`
pub(crate) fn current_user_url(base: &Url) -> Result<Url, HubError> {
    Ok(base.join("api/v1/currentuser")?)
}

/// `api/v1/kubernetes/apps/{revision}/{plural}/{name}/namespaces/{ns}/clusters/{cluster}`
pub(crate) fn resource_url(
    base: &Url,
    kind: ResourceKind,
    revision: i64,
    namespace: &str,
    cluster: &str,
    name: &str,
) -> Result<Url, HubError> {
    let mut url = base.join(&format!("api/v1/kubernetes/apps/{}/", revision))?;
    segments(&mut url, &[kind.plural(), name, "namespaces", namespace, "clusters", cluster])?;
    Ok(url)
}

/// `api/v1/kubernetes/apps/{revision}/pods/namespaces/{ns}/clusters/{cluster}?{kind}={owner}`
pub(crate) fn pod_list_url(
    base: &Url,
    revision: i64,
    namespace: &str,
    cluster: &str,
    selector: &PodSelector,
) -> Result<Url, HubError> {
    let mut url = base.join(&format!("api/v1/kubernetes/apps/{}/", revision))?;
    segments(&mut url, &["pods", "namespaces", namespace, "clusters", cluster])?;
    url.query_pairs_mut()
        .append_pair(selector.kind.as_str(), &selector.owner);
    Ok(url)
}

/// Append percent-encoded path segments to a base ending in '/'
fn segments(url: &mut Url, parts: &[&str]) -> Result<(), HubError> {
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(parts);
    Ok(())
}

/// Owner lookup for the pods of a workload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodSelector {
    pub kind: ResourceKind,
    pub owner: String,
}

impl PodSelector {
    pub fn new(kind: ResourceKind, owner: impl Into<String>) -> Self {
        Self {
            kind,
            owner: owner.into(),
        }
    }
}

impl HubBackend for HubClient {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, HubError> {
        let user: CurrentUser = self.get(current_user_url(&self.base_url)?).await?;
        Ok(user.namespaces)
    }

    async fn get_resource(
        &self,
        kind: ResourceKind,
        revision: i64,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> Result<Vec<u8>, HubError> {
        let url = resource_url(&self.base_url, kind, revision, namespace, cluster, name)?;
        self.get_raw(url).await
    }

    async fn list_pods(
        &self,
        revision: i64,
        namespace: &str,
        cluster: &str,
        selector: &PodSelector,
    ) -> Result<Vec<PodSummary>, HubError> {
        let url = pod_list_url(&self.base_url, revision, namespace, cluster, selector)?;
        let pods: Option<Vec<PodSummary>> = self.get(url).await?;
        Ok(pods.unwrap_or_default())
    }

    async fn get_pod(
        &self,
        revision: i64,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> Result<Vec<u8>, HubError> {
        let url = resource_url(
            &self.base_url,
            ResourceKind::Pod,
            revision,
            namespace,
            cluster,
            name,
        )?;
        self.get_raw(url).await
    }
}
