/// Multi-cluster resource describe pipeline
pub mod error;
pub mod render;
pub mod request;
pub mod resolve;
pub mod rows;

pub use error::{PairError, Target};
pub use request::{DescribeArgs, DescribeRequest, OutputFormat, ResourceKind};

use futures::stream::{self, StreamExt};
use std::io::Write;
use tracing::{debug, info, warn};

use crate::hub::models::PodSummary;
use crate::hub::{HubBackend, HubError, PodSelector};
use resolve::{filter_clusters, resolve_namespaces};
use rows::{Body, Row};

/// Revision passed to every backend call
const REVISION: i64 = 0;

/// One namespace/cluster combination selected for querying
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    /// Managed namespace name
    pub namespace: String,
    /// Kubernetes namespace used for the fetch
    pub kube_namespace: String,
    pub cluster: String,
}

impl Pair {
    fn target(&self) -> Target {
        Target::pair(&self.namespace, &self.cluster)
    }
}

/// What one successful pair contributes to the output
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutput {
    Row(Row),
    Yaml(String),
    Raw(Vec<u8>),
}

/// Accumulated result of one describe invocation
#[derive(Debug)]
pub struct DescribeReport {
    pub kind: ResourceKind,
    pub output: OutputFormat,
    /// Pairs that were queried, in query order
    pub pairs: Vec<Pair>,
    /// Successful outputs, in query order
    pub outputs: Vec<PairOutput>,
    /// Namespaces and pairs that produced no output
    pub failures: Vec<PairError>,
}

impl DescribeReport {
    fn new(kind: ResourceKind, output: OutputFormat) -> Self {
        Self {
            kind,
            output,
            pairs: Vec::new(),
            outputs: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        rows::header(self.kind)
    }

    pub fn rows(&self) -> Vec<&Row> {
        self.outputs
            .iter()
            .filter_map(|o| match o {
                PairOutput::Row(row) => Some(row),
                _ => None,
            })
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Apply the exit policy: failures are logged, and only fatal with `strict`
    pub fn ensure_complete(&self, strict: bool) -> anyhow::Result<()> {
        if !self.has_failures() {
            return Ok(());
        }

        warn!(
            "{} failure(s) across {} namespace/cluster pair(s)",
            self.failures.len(),
            self.pairs.len()
        );
        if strict {
            anyhow::bail!(
                "{} namespace/cluster pair(s) could not be described",
                self.failures.len()
            );
        }
        Ok(())
    }

    /// Render the accumulated outputs in the requested format
    pub fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        match self.output {
            OutputFormat::Pretty => {
                let rows: Vec<Row> = self.rows().into_iter().cloned().collect();
                render::write_table(out, self.header(), &rows)?;
            }
            OutputFormat::Yaml | OutputFormat::Json => {
                for output in &self.outputs {
                    match output {
                        PairOutput::Yaml(yaml) => render::write_yaml_document(out, yaml)?,
                        PairOutput::Raw(raw) => render::write_raw(out, raw)?,
                        PairOutput::Row(_) => {}
                    }
                }
            }
        }
        out.flush()
    }
}

/// Drives namespace resolution, per-pair fetches and normalization
pub struct Describer<'a, B> {
    backend: &'a B,
    concurrency: usize,
}

impl<'a, B: HubBackend> Describer<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            concurrency: 1,
        }
    }

    /// Number of pairs in flight at once; output order is unaffected
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run one describe request.
    ///
    /// Only a failure to list namespaces is returned as an error; everything
    /// scoped to a single namespace or pair lands in the report.
    pub async fn describe(&self, request: &DescribeRequest) -> Result<DescribeReport, HubError> {
        let mut report = DescribeReport::new(request.kind, request.output);

        let resolution = resolve_namespaces(self.backend, request.namespace.as_deref()).await?;
        report.failures.extend(resolution.skipped);

        for namespace in &resolution.namespaces {
            for cluster in filter_clusters(request.cluster.as_deref(), &namespace.clusters) {
                report.pairs.push(Pair {
                    namespace: namespace.name.clone(),
                    kube_namespace: namespace.kube_namespace.clone(),
                    cluster: cluster.to_string(),
                });
            }
        }

        info!(
            kind = %request.kind,
            name = %request.name,
            pairs = report.pairs.len(),
            "Describing resource"
        );

        let outcomes: Vec<Result<PairOutput, PairError>> = stream::iter(report.pairs.iter())
            .map(|pair| self.describe_pair(request, pair))
            .buffered(self.concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Ok(output) => report.outputs.push(output),
                Err(e) => {
                    warn!(error = %e, "Skipping pair");
                    report.failures.push(e);
                }
            }
        }

        Ok(report)
    }

    async fn describe_pair(
        &self,
        request: &DescribeRequest,
        pair: &Pair,
    ) -> Result<PairOutput, PairError> {
        debug!(namespace = %pair.namespace, cluster = %pair.cluster, "Fetching {}", request.kind);

        let raw = match request.kind {
            ResourceKind::Pod => {
                self.backend
                    .get_pod(REVISION, &pair.kube_namespace, &pair.cluster, &request.name)
                    .await
            }
            kind => {
                self.backend
                    .get_resource(
                        kind,
                        REVISION,
                        &pair.kube_namespace,
                        &pair.cluster,
                        &request.name,
                    )
                    .await
            }
        }
        .map_err(|e| PairError::from_hub(pair.target(), request.kind.as_str(), e))?;

        match request.output {
            OutputFormat::Json => Ok(PairOutput::Raw(raw)),
            OutputFormat::Yaml => render::json_to_yaml(&raw)
                .map(PairOutput::Yaml)
                .map_err(|source| PairError::Conversion {
                    target: pair.target(),
                    source,
                }),
            OutputFormat::Pretty => {
                let body = Body::decode(request.kind, &raw)
                    .map_err(|e| PairError::decode(pair.target(), request.kind.as_str(), e))?;
                let pods = if request.kind.is_workload() {
                    self.owned_pods(request, pair).await
                } else {
                    Vec::new()
                };
                Ok(PairOutput::Row(body.row(&pair.cluster, &pods)))
            }
        }
    }

    /// Pods column lookup; a failure leaves the column empty
    async fn owned_pods(&self, request: &DescribeRequest, pair: &Pair) -> Vec<PodSummary> {
        let selector = PodSelector::new(request.kind, request.name.clone());
        match self
            .backend
            .list_pods(REVISION, &pair.kube_namespace, &pair.cluster, &selector)
            .await
        {
            Ok(pods) => pods,
            Err(e) => {
                warn!(
                    namespace = %pair.namespace,
                    cluster = %pair.cluster,
                    error = %e,
                    "Pod lookup failed, leaving Pods column empty"
                );
                Vec::new()
            }
        }
    }
}
