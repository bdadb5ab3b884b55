/// Typed errors of the describe pipeline
use std::fmt;
use thiserror::Error;

use super::request::ResourceKind;
use crate::hub::HubError;

/// Rejected describe arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("one of --deployment, --daemonset, --statefulset, --pod, --service, --ingress or --configmap is required")]
    MissingKind,

    #[error("only one resource flag may be given, got: {0}")]
    MultipleKinds(String),

    #[error("{0} name cannot be empty")]
    EmptyName(ResourceKind),
}

/// The namespace/cluster a failure belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub namespace: String,
    /// `None` when the failure happened before any cluster was known
    pub cluster: Option<String>,
}

impl Target {
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            cluster: None,
        }
    }

    pub fn pair(namespace: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            cluster: Some(cluster.into()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cluster {
            Some(cluster) => write!(f, "{}/{}", self.namespace, cluster),
            None => f.write_str(&self.namespace),
        }
    }
}

/// Failure scoped to one namespace or namespace/cluster pair.
///
/// These never abort sibling pairs; they are collected in the report.
#[derive(Debug, Error)]
pub enum PairError {
    #[error("{target}: {source}")]
    Network {
        target: Target,
        #[source]
        source: HubError,
    },

    #[error("{target}: cannot decode {what}: {message}")]
    Decode {
        target: Target,
        what: String,
        message: String,
    },

    #[error("{target}: cannot convert output: {source}")]
    Conversion {
        target: Target,
        #[source]
        source: ConversionError,
    },
}

impl PairError {
    /// Classify a backend failure for a pair
    pub fn from_hub(target: Target, what: &str, error: HubError) -> Self {
        match error {
            HubError::Decode(e) => PairError::Decode {
                target,
                what: what.to_string(),
                message: e.to_string(),
            },
            other => PairError::Network {
                target,
                source: other,
            },
        }
    }

    pub fn decode(target: Target, what: &str, error: serde_json::Error) -> Self {
        PairError::Decode {
            target,
            what: what.to_string(),
            message: error.to_string(),
        }
    }

    pub fn target(&self) -> &Target {
        match self {
            PairError::Network { target, .. }
            | PairError::Decode { target, .. }
            | PairError::Conversion { target, .. } => target,
        }
    }
}

/// Failure translating a raw body into another encoding
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot encode YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
