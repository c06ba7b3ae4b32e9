//! Simulation dispatcher
//!
//! [`Simulator::simulate`] is the single entry point every adapter (HTTP
//! handlers, CLI commands, test harnesses) funnels through. It sleeps to
//! emulate network latency unless fast mode is on, routes the request by
//! operation and wraps the outcome in a [`SimulationResult`].

use crate::bucket::{BucketStore, Persisted};
use crate::error::{Result, SimError};
use crate::generator::SyntheticGenerator;
use crate::model::{ProviderValidationResult, SimulationRequest, SimulationResult};
use crate::params::{Parameters, Params};
use crate::rng::SimRng;
use chrono::Utc;
use cubesim_config::SimConfig;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_BUCKET_REGION: &str = "us-west-2";
const GENERATED_BUCKET_PREFIX: &str = "sim-bucket-";

/// Operations understood by the simulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateBucket,
    DeleteBucket,
    ListBuckets,
    SetBucketPolicy,
    SetBucketVersioning,
    SetBucketLifecycle,
    CreateCluster,
    DeleteCluster,
    ListClusters,
    GetCluster,
    RunTest,
    Unsupported(String),
}

impl Operation {
    /// Total: unknown names map to [`Operation::Unsupported`]
    pub fn parse(name: &str) -> Self {
        match name {
            "create_bucket" => Operation::CreateBucket,
            "delete_bucket" => Operation::DeleteBucket,
            "list_buckets" => Operation::ListBuckets,
            "set_bucket_policy" => Operation::SetBucketPolicy,
            "set_bucket_versioning" => Operation::SetBucketVersioning,
            "set_bucket_lifecycle" => Operation::SetBucketLifecycle,
            "create_cluster" => Operation::CreateCluster,
            "delete_cluster" => Operation::DeleteCluster,
            "list_clusters" => Operation::ListClusters,
            "get_cluster" => Operation::GetCluster,
            "run_test" => Operation::RunTest,
            other => Operation::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operation::CreateBucket => "create_bucket",
            Operation::DeleteBucket => "delete_bucket",
            Operation::ListBuckets => "list_buckets",
            Operation::SetBucketPolicy => "set_bucket_policy",
            Operation::SetBucketVersioning => "set_bucket_versioning",
            Operation::SetBucketLifecycle => "set_bucket_lifecycle",
            Operation::CreateCluster => "create_cluster",
            Operation::DeleteCluster => "delete_cluster",
            Operation::ListClusters => "list_clusters",
            Operation::GetCluster => "get_cluster",
            Operation::RunTest => "run_test",
            Operation::Unsupported(name) => name,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Injected latency bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub min_ms: u64,
    pub jitter_ms: u64,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            min_ms: 500,
            jitter_ms: 3000,
        }
    }
}

/// Engine switches taken from [`SimConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    pub fast_simulate: bool,
    pub debug: bool,
    pub latency: LatencyProfile,
}

impl From<&SimConfig> for EngineOptions {
    fn from(config: &SimConfig) -> Self {
        Self {
            fast_simulate: config.fast_simulate,
            debug: config.debug,
            latency: LatencyProfile {
                min_ms: config.latency_min_ms,
                jitter_ms: config.latency_jitter_ms,
            },
        }
    }
}

type Outcome = Result<Map<String, Value>>;

#[derive(Debug)]
pub struct Simulator {
    store: BucketStore,
    generator: SyntheticGenerator,
    rng: Arc<SimRng>,
    options: EngineOptions,
}

impl Simulator {
    /// Build a simulator from resolved configuration.
    ///
    /// The bucket file is loaded eagerly; a load failure is logged and the
    /// store starts empty.
    pub fn new(config: &SimConfig) -> Self {
        let (store, loaded) = BucketStore::open(&config.persist_path);
        match loaded {
            Ok(count) => tracing::debug!("Bucket store ready with {} buckets", count),
            Err(e) => tracing::warn!(
                "Failed to load bucket file {}, starting empty: {}",
                config.persist_path.display(),
                e
            ),
        }
        let rng = Arc::new(SimRng::from_seed_opt(config.seed));
        Self::with_parts(store, rng, EngineOptions::from(config))
    }

    /// Assemble from injected parts
    pub fn with_parts(store: BucketStore, rng: Arc<SimRng>, options: EngineOptions) -> Self {
        Self {
            store,
            generator: SyntheticGenerator::new(Arc::clone(&rng)),
            rng,
            options,
        }
    }

    pub fn bucket_store(&self) -> &BucketStore {
        &self.store
    }

    pub fn generator(&self) -> &SyntheticGenerator {
        &self.generator
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Validate a provider against the static capability table
    pub fn validate_provider(
        &self,
        provider: &str,
        credentials: Option<&Parameters>,
    ) -> ProviderValidationResult {
        self.generator.validate_provider(provider, credentials)
    }

    fn latency_delay(&self) -> Duration {
        let latency = self.options.latency;
        let jitter = self.rng.below(latency.jitter_ms);
        Duration::from_millis(latency.min_ms.saturating_add(jitter))
    }

    fn inject_latency(&self) {
        if self.options.fast_simulate {
            return;
        }
        let delay = self.latency_delay();
        tracing::trace!("Injecting {:?} latency", delay);
        std::thread::sleep(delay);
    }

    /// Run one simulated operation. Blocks for the injected latency.
    pub fn simulate(&self, request: &SimulationRequest) -> SimulationResult {
        let start = Instant::now();
        let timestamp = Utc::now();
        let operation = Operation::parse(&request.operation);

        if self.options.debug {
            tracing::info!(
                provider = %request.provider,
                operation = %operation,
                parameters = ?request.parameters,
                "simulate"
            );
        }

        self.inject_latency();

        let outcome = self.dispatch(&operation, &request.provider, &request.parameters);
        let (success, result, error) = match outcome {
            Ok(result) => (true, Some(result), None),
            Err(e) => {
                if self.options.debug {
                    tracing::info!(operation = %operation, "simulation failed: {}", e);
                }
                (false, None, Some(e.to_string()))
            }
        };

        SimulationResult {
            provider: request.provider.clone(),
            operation: request.operation.clone(),
            success,
            result,
            error,
            timestamp,
            duration: start.elapsed(),
        }
    }

    fn dispatch(&self, operation: &Operation, provider: &str, parameters: &Parameters) -> Outcome {
        let params = Params::new(parameters);
        match operation {
            Operation::CreateBucket => self.create_bucket(provider, params),
            Operation::DeleteBucket => self.delete_bucket(provider, params),
            Operation::ListBuckets => {
                let buckets = self.store.list(provider);
                let mut result = Map::new();
                result.insert("total".to_string(), json!(buckets.len()));
                result.insert("buckets".to_string(), serde_json::to_value(buckets)?);
                Ok(result)
            }
            Operation::SetBucketPolicy => {
                Ok(echo(params, "bucket", &[("policy", "policy")], "policy_set"))
            }
            Operation::SetBucketVersioning => Ok(echo(
                params,
                "bucket",
                &[("versioning", "enabled")],
                "versioning_set",
            )),
            Operation::SetBucketLifecycle => Ok(echo(
                params,
                "bucket",
                &[("lifecycle", "lifecycle")],
                "lifecycle_set",
            )),
            Operation::CreateCluster => {
                to_map(&self.generator.create_cluster(provider, parameters))
            }
            Operation::DeleteCluster => Ok(self.generator.delete_cluster(parameters)),
            Operation::ListClusters => {
                let clusters = self.generator.list_clusters(provider);
                let mut result = Map::new();
                result.insert("total".to_string(), json!(clusters.len()));
                result.insert("clusters".to_string(), serde_json::to_value(clusters)?);
                Ok(result)
            }
            Operation::GetCluster => to_map(&self.generator.get_cluster(provider, parameters)),
            Operation::RunTest => to_map(&self.generator.run_test(parameters)),
            Operation::Unsupported(name) => Err(SimError::UnsupportedOperation(name.clone())),
        }
    }

    fn create_bucket(&self, provider: &str, params: Params<'_>) -> Outcome {
        let name = match params.non_empty_str("name") {
            Some(name) => name.to_string(),
            None => format!("{}{}", GENERATED_BUCKET_PREFIX, self.rng.short_id()),
        };
        let region = params.str_or("region", DEFAULT_BUCKET_REGION);

        let persisted = self.store.create(provider, &name, &region)?;
        self.persisted_to_map(persisted)
    }

    fn delete_bucket(&self, provider: &str, params: Params<'_>) -> Outcome {
        let name = params.str_or("bucket", "");
        let persisted = self.store.delete(provider, &name)?;
        let save_error = persisted.save_error;

        let mut result = Map::new();
        result.insert("bucket".to_string(), json!(persisted.value.bucket));
        result.insert("status".to_string(), json!("deleted"));
        Ok(self.mark_degraded(result, save_error))
    }

    fn persisted_to_map<T: Serialize>(&self, persisted: Persisted<T>) -> Outcome {
        let result = to_map(&persisted.value)?;
        Ok(self.mark_degraded(result, persisted.save_error))
    }

    /// Keep the request successful but flag that the change is not on disk
    fn mark_degraded(
        &self,
        mut result: Map<String, Value>,
        save_error: Option<SimError>,
    ) -> Map<String, Value> {
        if let Some(e) = save_error {
            tracing::warn!(
                "Bucket change not persisted to {}: {}",
                self.store.persist_path().display(),
                e
            );
            result.insert("storage_degraded".to_string(), json!(true));
        }
        result
    }

    /// Run [`simulate`](Self::simulate) on the blocking pool.
    ///
    /// With a `timeout`, an elapsed deadline yields [`SimError::Timeout`];
    /// the abandoned call keeps running to completion in the background.
    pub async fn simulate_async(
        self: Arc<Self>,
        request: SimulationRequest,
        timeout: Option<Duration>,
    ) -> Result<SimulationResult> {
        let operation = request.operation.clone();
        let task = tokio::task::spawn_blocking(move || self.simulate(&request));

        let joined = match timeout {
            Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
                SimError::Timeout(format!("{} did not finish within {:?}", operation, limit))
            })?,
            None => task.await,
        };
        joined.map_err(|e| SimError::TaskFailed(e.to_string()))
    }
}

/// Acknowledge a bucket setting by echoing the submitted values
fn echo(
    params: Params<'_>,
    bucket_key: &str,
    fields: &[(&str, &str)],
    status: &str,
) -> Map<String, Value> {
    let mut result = Map::new();
    result.insert("bucket".to_string(), params.raw(bucket_key));
    for (out_key, param_key) in fields {
        result.insert(out_key.to_string(), params.raw(param_key));
    }
    result.insert("status".to_string(), json!(status));
    result
}

fn to_map<T: Serialize>(value: &T) -> Outcome {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            Ok(map)
        }
    }
}
