/// Projection of resource bodies into table rows
use chrono::{DateTime, Local, Utc};
use std::collections::BTreeMap;

use super::request::ResourceKind;
use crate::hub::models::{ConfigMap, DataResponse, Ingress, PodSummary, Service, Workload};

/// One table row, aligned with the header of its kind
pub type Row = Vec<String>;

pub const WORKLOAD_HEADER: &[&str] = &[
    "Name",
    "Namespace",
    "Cluster",
    "Labels",
    "Containers",
    "Replicas",
    "Message",
    "Pods",
];
pub const SERVICE_HEADER: &[&str] = &[
    "Name",
    "Namespace",
    "Cluster",
    "Labels",
    "Type",
    "ClusterIP",
    "External-IP",
    "Ports",
    "Selector",
];
pub const INGRESS_HEADER: &[&str] = &["Name", "Namespace", "Cluster", "Labels", "Hosts"];
pub const CONFIGMAP_HEADER: &[&str] = &["Name", "Namespace", "Cluster", "Labels"];
pub const POD_HEADER: &[&str] = &[
    "Name",
    "Namespace",
    "Cluster",
    "PodIP",
    "Node",
    "Restart Time",
    "Start Time",
];

/// Column titles for a kind
pub fn header(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::Deployment | ResourceKind::DaemonSet | ResourceKind::StatefulSet => {
            WORKLOAD_HEADER
        }
        ResourceKind::Service => SERVICE_HEADER,
        ResourceKind::Ingress => INGRESS_HEADER,
        ResourceKind::ConfigMap => CONFIGMAP_HEADER,
        ResourceKind::Pod => POD_HEADER,
    }
}

/// Resource body decoded into the shape of its kind
#[derive(Debug, Clone)]
pub enum Body {
    Workload(Workload),
    Service(Service),
    Ingress(Ingress),
    ConfigMap(ConfigMap),
    Pod(PodSummary),
}

impl Body {
    /// Decode a raw `{"data": ...}` response as `kind`
    pub fn decode(kind: ResourceKind, raw: &[u8]) -> Result<Self, serde_json::Error> {
        let body = match kind {
            ResourceKind::Deployment | ResourceKind::DaemonSet | ResourceKind::StatefulSet => {
                Body::Workload(decode(raw)?)
            }
            ResourceKind::Service => Body::Service(decode(raw)?),
            ResourceKind::Ingress => Body::Ingress(decode(raw)?),
            ResourceKind::ConfigMap => Body::ConfigMap(decode(raw)?),
            ResourceKind::Pod => Body::Pod(decode(raw)?),
        };
        Ok(body)
    }

    /// Project into a row; `pods` only feeds the Pods column of workloads
    pub fn row(&self, cluster: &str, pods: &[PodSummary]) -> Row {
        match self {
            Body::Workload(workload) => workload_row(workload, cluster, pods),
            Body::Service(service) => service_row(service, cluster),
            Body::Ingress(ingress) => ingress_row(ingress, cluster),
            Body::ConfigMap(configmap) => configmap_row(configmap, cluster),
            Body::Pod(pod) => pod_row(pod, cluster),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(raw: &[u8]) -> Result<T, serde_json::Error> {
    let response: DataResponse<T> = serde_json::from_slice(raw)?;
    Ok(response.data)
}

pub fn workload_row(workload: &Workload, cluster: &str, pods: &[PodSummary]) -> Row {
    let containers = workload
        .spec
        .template
        .spec
        .containers
        .iter()
        .map(|c| format!("{}={}", c.name, c.image))
        .collect::<Vec<_>>()
        .join(",");

    let status = &workload.status;
    let replicas = format!("{}/{}", status.available(), status.desired());

    let mut conditions: Vec<_> = status.conditions.iter().collect();
    conditions.sort_by_key(|c| c.timestamp());
    let messages = conditions
        .iter()
        .map(|c| match c.timestamp() {
            Some(ts) => format!("{}: {}", format_timestamp(&ts), c.message),
            None => c.message.clone(),
        })
        .collect::<Vec<_>>()
        .join(",");

    let pod_names = pods
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    vec![
        workload.metadata.name.clone(),
        workload.metadata.namespace.clone(),
        cluster.to_string(),
        join_pairs(&workload.metadata.labels),
        containers,
        replicas,
        messages,
        pod_names,
    ]
}

pub fn service_row(service: &Service, cluster: &str) -> Row {
    let spec = &service.spec;
    let ports = spec
        .ports
        .iter()
        .map(|p| {
            let target = p
                .target_port
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| p.port.to_string());
            format!("{}:{}/{}", p.port, target, p.protocol)
        })
        .collect::<Vec<_>>()
        .join(",");

    vec![
        service.metadata.name.clone(),
        service.metadata.namespace.clone(),
        cluster.to_string(),
        join_pairs(&service.metadata.labels),
        spec.service_type.clone(),
        spec.cluster_ip.clone(),
        spec.external_ips.join(","),
        ports,
        join_pairs(&spec.selector),
    ]
}

pub fn ingress_row(ingress: &Ingress, cluster: &str) -> Row {
    let hosts = ingress
        .spec
        .rules
        .iter()
        .map(|r| r.host.as_str())
        .collect::<Vec<_>>()
        .join(",");

    vec![
        ingress.metadata.name.clone(),
        ingress.metadata.namespace.clone(),
        cluster.to_string(),
        join_pairs(&ingress.metadata.labels),
        hosts,
    ]
}

pub fn configmap_row(configmap: &ConfigMap, cluster: &str) -> Row {
    vec![
        configmap.metadata.name.clone(),
        configmap.metadata.namespace.clone(),
        cluster.to_string(),
        join_pairs(&configmap.metadata.labels),
    ]
}

pub fn pod_row(pod: &PodSummary, cluster: &str) -> Row {
    let restarts = pod
        .container_status
        .iter()
        .map(|s| format!("{}:{}", s.name, s.restart_count))
        .collect::<Vec<_>>()
        .join(",");

    vec![
        pod.name.clone(),
        pod.namespace.clone(),
        cluster.to_string(),
        pod.pod_ip.clone(),
        pod.node_name.clone(),
        restarts,
        pod.start_time
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_default(),
    ]
}

/// `k=v` pairs in key order, comma separated
pub fn join_pairs(map: &BTreeMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Timestamp in the operator's local time zone
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S %z")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(data: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({ "data": data })).unwrap()
    }

    fn pod(name: &str) -> PodSummary {
        PodSummary {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_every_header_matches_row_width() {
        let workload = body(json!({"metadata": {"name": "w"}}));
        let pod_body = body(json!({"name": "p"}));
        for kind in [
            ResourceKind::Deployment,
            ResourceKind::DaemonSet,
            ResourceKind::StatefulSet,
            ResourceKind::Service,
            ResourceKind::Ingress,
            ResourceKind::ConfigMap,
            ResourceKind::Pod,
        ] {
            let raw = if kind == ResourceKind::Pod { &pod_body } else { &workload };
            let row = Body::decode(kind, raw).unwrap().row("c1", &[]);
            assert_eq!(row.len(), header(kind).len(), "{kind}");
            assert_eq!(row[2], "c1");
        }
    }

    #[test]
    fn test_deployment_row() {
        let raw = body(json!({
            "metadata": {"name": "web", "namespace": "demo", "labels": {"tier": "front", "app": "web"}},
            "spec": {"template": {"spec": {"containers": [
                {"name": "app", "image": "nginx:1.25"},
                {"name": "sidecar", "image": "envoy:1.30"}
            ]}}},
            "status": {
                "replicas": 3,
                "availableReplicas": 2,
                "conditions": [
                    {"type": "Progressing", "lastUpdateTime": "2024-03-01T10:05:00Z", "message": "progressing"},
                    {"type": "Available", "lastUpdateTime": "2024-03-01T10:00:00Z", "message": "available"}
                ]
            }
        }));

        let row = Body::decode(ResourceKind::Deployment, &raw)
            .unwrap()
            .row("c1", &[pod("web-a"), pod("web-b")]);
        assert_eq!(row[0], "web");
        assert_eq!(row[1], "demo");
        assert_eq!(row[3], "app=web,tier=front");
        assert_eq!(row[4], "app=nginx:1.25,sidecar=envoy:1.30");
        assert_eq!(row[5], "2/3");

        let first: DateTime<Utc> = "2024-03-01T10:00:00Z".parse().unwrap();
        let second: DateTime<Utc> = "2024-03-01T10:05:00Z".parse().unwrap();
        assert_eq!(
            row[6],
            format!(
                "{}: available,{}: progressing",
                format_timestamp(&first),
                format_timestamp(&second)
            )
        );
        assert_eq!(row[7], "web-a,web-b");
    }

    #[test]
    fn test_daemonset_replicas() {
        let raw = body(json!({
            "metadata": {"name": "agent"},
            "status": {"desiredNumberScheduled": 5, "numberAvailable": 4}
        }));
        let row = Body::decode(ResourceKind::DaemonSet, &raw).unwrap().row("c1", &[]);
        assert_eq!(row[5], "4/5");
        assert_eq!(row[7], "");
    }

    #[test]
    fn test_service_row() {
        let raw = body(json!({
            "metadata": {"name": "api", "namespace": "demo"},
            "spec": {
                "type": "LoadBalancer",
                "clusterIP": "10.96.0.10",
                "externalIPs": ["1.2.3.4", "5.6.7.8"],
                "ports": [
                    {"port": 80, "targetPort": 8080, "protocol": "TCP"},
                    {"port": 53, "targetPort": "dns", "protocol": "UDP"},
                    {"port": 9000, "protocol": "TCP"}
                ],
                "selector": {"app": "api"}
            }
        }));

        let row = Body::decode(ResourceKind::Service, &raw).unwrap().row("c2", &[]);
        assert_eq!(
            row,
            vec![
                "api",
                "demo",
                "c2",
                "",
                "LoadBalancer",
                "10.96.0.10",
                "1.2.3.4,5.6.7.8",
                "80:8080/TCP,53:dns/UDP,9000:9000/TCP",
                "app=api",
            ]
        );
    }

    #[test]
    fn test_ingress_row() {
        let raw = body(json!({
            "metadata": {"name": "edge", "namespace": "demo", "labels": {"team": "web"}},
            "spec": {"rules": [{"host": "a.example.com"}, {"host": "b.example.com"}]}
        }));
        let row = Body::decode(ResourceKind::Ingress, &raw).unwrap().row("c1", &[]);
        assert_eq!(row, vec!["edge", "demo", "c1", "team=web", "a.example.com,b.example.com"]);
    }

    #[test]
    fn test_configmap_row() {
        let raw = body(json!({
            "metadata": {"name": "cfg", "namespace": "demo", "labels": {"b": "2", "a": "1"}},
            "data": {"key": "value"}
        }));
        let row = Body::decode(ResourceKind::ConfigMap, &raw).unwrap().row("c1", &[]);
        assert_eq!(row, vec!["cfg", "demo", "c1", "a=1,b=2"]);
    }

    #[test]
    fn test_pod_row() {
        let raw = body(json!({
            "name": "web-a",
            "namespace": "demo",
            "podIp": "10.1.0.7",
            "nodeName": "node-1",
            "containerStatus": [{"name": "app", "restartCount": 3}, {"name": "sidecar", "restartCount": 0}],
            "startTime": "2024-03-01T09:00:00Z"
        }));
        let row = Body::decode(ResourceKind::Pod, &raw).unwrap().row("c1", &[]);
        let started: DateTime<Utc> = "2024-03-01T09:00:00Z".parse().unwrap();
        assert_eq!(
            row,
            vec![
                "web-a".to_string(),
                "demo".to_string(),
                "c1".to_string(),
                "10.1.0.7".to_string(),
                "node-1".to_string(),
                "app:3,sidecar:0".to_string(),
                format_timestamp(&started),
            ]
        );
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        assert!(Body::decode(ResourceKind::Service, b"<html>").is_err());
        assert!(Body::decode(ResourceKind::Pod, br#"{"data": {"podIp": 5}}"#).is_err());
    }
}
