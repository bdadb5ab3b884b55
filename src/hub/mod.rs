/// Management backend client implementation
pub mod auth;
pub mod client;
pub mod error;
#[cfg(test)]
pub mod fake;
pub mod models;

pub use client::{HubClient, PodSelector};
pub use error::HubError;

use crate::describe::ResourceKind;
use models::{Namespace, PodSummary};

/// Read-only query interface of the management backend.
///
/// Resource and pod fetches hand back the raw response body so that callers
/// can pass it through unchanged or decode it into a kind-specific shape.
#[allow(async_fn_in_trait)]
pub trait HubBackend {
    /// All namespaces visible to the current user
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, HubError>;

    /// Raw body of one named resource in one cluster
    async fn get_resource(
        &self,
        kind: ResourceKind,
        revision: i64,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> Result<Vec<u8>, HubError>;

    /// Pods owned by the workload named in `selector`
    async fn list_pods(
        &self,
        revision: i64,
        namespace: &str,
        cluster: &str,
        selector: &PodSelector,
    ) -> Result<Vec<PodSummary>, HubError>;

    /// Raw body of one pod summary
    async fn get_pod(
        &self,
        revision: i64,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> Result<Vec<u8>, HubError>;
}
