/// Management backend data models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Generic `{"data": ...}` envelope used by every backend endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default, alias = "message")]
    pub msg: String,
}

/// Current user, with the namespaces they can see
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespaces: Vec<Namespace>,
}

/// Managed namespace as listed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    /// JSON-encoded [`NamespaceMetadata`]
    #[serde(default)]
    pub metadata: String,
}

/// Decoded namespace metadata blob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceMetadata {
    /// Kubernetes namespace backing the managed namespace
    #[serde(default)]
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clusters: Vec<String>,
}

/// Login response payload
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
}

/// Pod as summarized by the backend's pod endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSummary {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub pod_ip: String,
    #[serde(default)]
    pub node_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub container_status: Vec<ContainerRestarts>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

/// Restart counter for one container of a pod
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRestarts {
    pub name: String,
    #[serde(default)]
    pub restart_count: i32,
}

/// Object metadata shared by every resource body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
}

/// Deployment, DaemonSet or StatefulSet body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workload {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: WorkloadSpec,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: WorkloadStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkloadSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub template: PodTemplate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodTemplate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: PodSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// Workload status; DaemonSets report scheduling counters instead of replicas
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStatus {
    #[serde(default)]
    pub replicas: Option<i32>,
    #[serde(default)]
    pub available_replicas: Option<i32>,
    #[serde(default)]
    pub desired_number_scheduled: Option<i32>,
    #[serde(default)]
    pub number_available: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditions: Vec<WorkloadCondition>,
}

impl WorkloadStatus {
    pub fn desired(&self) -> i32 {
        self.replicas
            .or(self.desired_number_scheduled)
            .unwrap_or_default()
    }

    pub fn available(&self) -> i32 {
        self.available_replicas
            .or(self.number_available)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadCondition {
    #[serde(default)]
    pub last_update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_transition_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: String,
}

impl WorkloadCondition {
    /// Most recent timestamp the condition carries
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_update_time.or(self.last_transition_time)
    }
}

/// Service body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: ServiceSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(default, rename = "type")]
    pub service_type: String,
    #[serde(default, rename = "clusterIP")]
    pub cluster_ip: String,
    #[serde(default, rename = "externalIPs", deserialize_with = "null_as_default")]
    pub external_ips: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: Vec<ServicePort>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub selector: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    #[serde(default)]
    pub port: i32,
    #[serde(default)]
    pub target_port: Option<IntOrString>,
    #[serde(default)]
    pub protocol: String,
}

/// Port reference that is either a number or a named container port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i32),
    String(String),
}

impl std::fmt::Display for IntOrString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntOrString::Int(port) => write!(f, "{}", port),
            IntOrString::String(name) => write!(f, "{}", name),
        }
    }
}

/// Ingress body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ingress {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: IngressSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngressSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<IngressRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngressRule {
    #[serde(default)]
    pub host: String,
}

/// ConfigMap body; only metadata is displayed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigMap {
    #[serde(default)]
    pub metadata: ObjectMeta,
}
