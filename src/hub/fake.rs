/// In-memory backend for tests
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

use super::models::{Namespace, PodSummary};
use super::{HubBackend, HubError, PodSelector};
use crate::describe::ResourceKind;

type ResourceKey = (ResourceKind, String, String, String);

#[derive(Default)]
pub struct FakeHub {
    namespaces: Vec<Namespace>,
    fail_namespaces: bool,
    fail_pods: bool,
    resources: HashMap<ResourceKey, Vec<u8>>,
    pods: HashMap<(String, String), Vec<PodSummary>>,
    calls: Mutex<Vec<&'static str>>,
    last_selector: Mutex<Option<PodSelector>>,
}

impl FakeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace whose metadata lists `clusters`
    pub fn with_namespace(self, name: &str, clusters: &[&str]) -> Self {
        let metadata = json!({ "namespace": name, "clusters": clusters }).to_string();
        self.with_raw_namespace(name, &metadata)
    }

    /// Namespace with a verbatim metadata blob
    pub fn with_raw_namespace(mut self, name: &str, metadata: &str) -> Self {
        self.namespaces.push(Namespace {
            name: name.to_string(),
            metadata: metadata.to_string(),
        });
        self
    }

    pub fn failing_namespaces(mut self) -> Self {
        self.fail_namespaces = true;
        self
    }

    pub fn failing_pods(mut self) -> Self {
        self.fail_pods = true;
        self
    }

    /// Resource served wrapped in the `data` envelope
    pub fn with_resource(
        self,
        kind: ResourceKind,
        namespace: &str,
        cluster: &str,
        name: &str,
        data: serde_json::Value,
    ) -> Self {
        let body = serde_json::to_vec(&json!({ "data": data })).unwrap();
        self.with_raw_resource(kind, namespace, cluster, name, body)
    }

    pub fn with_raw_resource(
        mut self,
        kind: ResourceKind,
        namespace: &str,
        cluster: &str,
        name: &str,
        body: Vec<u8>,
    ) -> Self {
        self.resources.insert(
            (kind, namespace.to_string(), cluster.to_string(), name.to_string()),
            body,
        );
        self
    }

    /// Pod summary served by the direct pod lookup
    pub fn with_pod_body(
        self,
        namespace: &str,
        cluster: &str,
        name: &str,
        data: serde_json::Value,
    ) -> Self {
        self.with_resource(ResourceKind::Pod, namespace, cluster, name, data)
    }

    /// Pods returned by the owner lookup in one namespace/cluster
    pub fn with_pods(mut self, namespace: &str, cluster: &str, names: &[&str]) -> Self {
        let pods = names
            .iter()
            .map(|name| PodSummary {
                name: name.to_string(),
                namespace: namespace.to_string(),
                ..Default::default()
            })
            .collect();
        self.pods
            .insert((namespace.to_string(), cluster.to_string()), pods);
        self
    }

    /// How many times `method` was called
    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|m| **m == method)
            .count()
    }

    pub fn last_selector(&self) -> Option<PodSelector> {
        self.last_selector.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().unwrap().push(method);
    }

    fn lookup(
        &self,
        kind: ResourceKind,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> Result<Vec<u8>, HubError> {
        let key = (kind, namespace.to_string(), cluster.to_string(), name.to_string());
        self.resources
            .get(&key)
            .cloned()
            .ok_or_else(|| HubError::Status {
                status: 404,
                message: format!("{} {} not found", kind, name),
            })
    }
}

impl HubBackend for FakeHub {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, HubError> {
        self.record("list_namespaces");
        if self.fail_namespaces {
            return Err(HubError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self.namespaces.clone())
    }

    async fn get_resource(
        &self,
        kind: ResourceKind,
        _revision: i64,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> Result<Vec<u8>, HubError> {
        self.record("get_resource");
        self.lookup(kind, namespace, cluster, name)
    }

    async fn list_pods(
        &self,
        _revision: i64,
        namespace: &str,
        cluster: &str,
        selector: &PodSelector,
    ) -> Result<Vec<PodSummary>, HubError> {
        self.record("list_pods");
        *self.last_selector.lock().unwrap() = Some(selector.clone());
        if self.fail_pods {
            return Err(HubError::Status {
                status: 500,
                message: "pod listing failed".to_string(),
            });
        }
        Ok(self
            .pods
            .get(&(namespace.to_string(), cluster.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_pod(
        &self,
        _revision: i64,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> Result<Vec<u8>, HubError> {
        self.record("get_pod");
        self.lookup(ResourceKind::Pod, namespace, cluster, name)
    }
}
