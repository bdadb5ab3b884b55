/// Namespace and cluster resolution
use tracing::{debug, warn};

use super::error::{PairError, Target};
use crate::hub::models::{Namespace, NamespaceMetadata};
use crate::hub::{HubBackend, HubError};

/// A managed namespace with its decoded cluster list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNamespace {
    /// Managed namespace name, as matched by the namespace filter
    pub name: String,
    /// Kubernetes namespace the resources live in
    pub kube_namespace: String,
    pub clusters: Vec<String>,
}

impl ResolvedNamespace {
    /// Decode a namespace's metadata blob
    pub fn decode(namespace: &Namespace) -> Result<Self, serde_json::Error> {
        let metadata: NamespaceMetadata = serde_json::from_str(&namespace.metadata)?;
        let kube_namespace = if metadata.namespace.is_empty() {
            namespace.name.clone()
        } else {
            metadata.namespace
        };

        Ok(Self {
            name: namespace.name.clone(),
            kube_namespace,
            clusters: metadata.clusters,
        })
    }
}

/// Result of namespace resolution; undecodable namespaces are skipped, not fatal
#[derive(Debug, Default)]
pub struct Resolution {
    pub namespaces: Vec<ResolvedNamespace>,
    pub skipped: Vec<PairError>,
}

/// List namespaces once and keep those matching `filter` (all when `None`)
pub async fn resolve_namespaces<B: HubBackend>(
    backend: &B,
    filter: Option<&str>,
) -> Result<Resolution, HubError> {
    let listed = backend.list_namespaces().await?;
    debug!("Backend returned {} namespaces", listed.len());

    let mut resolution = Resolution::default();
    for namespace in listed
        .iter()
        .filter(|ns| filter.map_or(true, |f| ns.name == f))
    {
        match ResolvedNamespace::decode(namespace) {
            Ok(resolved) => resolution.namespaces.push(resolved),
            Err(e) => {
                warn!(
                    namespace = %namespace.name,
                    error = %e,
                    "Skipping namespace with unreadable metadata"
                );
                resolution.skipped.push(PairError::decode(
                    Target::namespace(&namespace.name),
                    "namespace metadata",
                    e,
                ));
            }
        }
    }

    Ok(resolution)
}

/// Clusters to query: all of them when `filter` is `None`, otherwise the matching ones in order
pub fn filter_clusters<'a>(filter: Option<&str>, clusters: &'a [String]) -> Vec<&'a str> {
    clusters
        .iter()
        .map(String::as_str)
        .filter(|cluster| filter.map_or(true, |f| *cluster == f))
        .collect()
}
