/// Describe request construction and validation
use clap::{Args, ValueEnum};
use std::fmt;

use super::error::RequestError;

/// Supported resource kinds
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Deployment,
    DaemonSet,
    StatefulSet,
    Pod,
    Service,
    Ingress,
    ConfigMap,
}

impl ResourceKind {
    /// Backend resource type name, also used as the pod owner query key
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "deployment",
            ResourceKind::DaemonSet => "daemonset",
            ResourceKind::StatefulSet => "statefulset",
            ResourceKind::Pod => "pod",
            ResourceKind::Service => "service",
            ResourceKind::Ingress => "ingress",
            ResourceKind::ConfigMap => "configmap",
        }
    }

    /// Path segment of the backend collection
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "deployments",
            ResourceKind::DaemonSet => "daemonsets",
            ResourceKind::StatefulSet => "statefulsets",
            ResourceKind::Pod => "pods",
            ResourceKind::Service => "services",
            ResourceKind::Ingress => "ingresses",
            ResourceKind::ConfigMap => "configmaps",
        }
    }

    /// Kinds that own pods and get a Pods column
    pub fn is_workload(&self) -> bool {
        matches!(
            self,
            ResourceKind::Deployment | ResourceKind::DaemonSet | ResourceKind::StatefulSet
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output encoding
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bordered table, one row per namespace/cluster pair
    #[default]
    Pretty,
    /// Raw resource bodies converted to YAML
    Yaml,
    /// Raw resource bodies as returned by the backend
    Json,
}

/// A validated describe query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeRequest {
    pub kind: ResourceKind,
    pub name: String,
    /// Managed namespace name; `None` queries every namespace
    pub namespace: Option<String>,
    /// Cluster name; `None` queries every cluster of each namespace
    pub cluster: Option<String>,
    pub output: OutputFormat,
}

impl DescribeRequest {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Result<Self, RequestError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RequestError::EmptyName(kind));
        }
        Ok(Self {
            kind,
            name,
            namespace: None,
            cluster: None,
            output: OutputFormat::Pretty,
        })
    }

    pub fn namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    pub fn cluster(mut self, cluster: Option<String>) -> Self {
        self.cluster = cluster.filter(|c| !c.is_empty());
        self
    }

    pub fn output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }
}

/// Arguments of the `describe` command
#[derive(Args, Debug, Clone, Default)]
pub struct DescribeArgs {
    /// Deployment name
    #[arg(long, group = "resource")]
    pub deployment: Option<String>,

    /// DaemonSet name
    #[arg(long, group = "resource")]
    pub daemonset: Option<String>,

    /// StatefulSet name
    #[arg(long, group = "resource")]
    pub statefulset: Option<String>,

    /// Pod name
    #[arg(long, group = "resource")]
    pub pod: Option<String>,

    /// Service name
    #[arg(long, group = "resource")]
    pub service: Option<String>,

    /// Ingress name
    #[arg(long, group = "resource")]
    pub ingress: Option<String>,

    /// ConfigMap name
    #[arg(long, group = "resource")]
    pub configmap: Option<String>,

    /// Managed namespace (default: all)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Cluster (default: all clusters of each namespace)
    #[arg(short, long)]
    pub cluster: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Exit non-zero when any namespace/cluster pair fails
    #[arg(long)]
    pub strict: bool,

    /// Number of namespace/cluster pairs fetched at once
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,
}

impl DescribeArgs {
    /// Resolve the kind flags into exactly one request
    pub fn to_request(&self) -> Result<DescribeRequest, RequestError> {
        let candidates = [
            (ResourceKind::Deployment, &self.deployment),
            (ResourceKind::DaemonSet, &self.daemonset),
            (ResourceKind::StatefulSet, &self.statefulset),
            (ResourceKind::Pod, &self.pod),
            (ResourceKind::Service, &self.service),
            (ResourceKind::Ingress, &self.ingress),
            (ResourceKind::ConfigMap, &self.configmap),
        ];

        let selected: Vec<(ResourceKind, &String)> = candidates
            .into_iter()
            .filter_map(|(kind, name)| name.as_ref().map(|name| (kind, name)))
            .collect();

        match selected.as_slice() {
            [] => Err(RequestError::MissingKind),
            [(kind, name)] => Ok(DescribeRequest::new(*kind, name.as_str())?
                .namespace(self.namespace.clone())
                .cluster(self.cluster.clone())
                .output(self.output)),
            many => Err(RequestError::MultipleKinds(
                many.iter()
                    .map(|(kind, _)| kind.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }
}
