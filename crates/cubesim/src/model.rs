//! Request, result and synthetic record types

use crate::params::Parameters;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

pub const BUCKET_STATUS_CREATED: &str = "created";

/// A simulated object-storage bucket, the only entity with persisted identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRecord {
    pub bucket: String,
    pub provider: String,
    pub region: String,
    pub status: String,
}

impl BucketRecord {
    pub fn created(
        provider: impl Into<String>,
        name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            bucket: name.into(),
            provider: provider.into(),
            region: region.into(),
            status: BUCKET_STATUS_CREATED.to_string(),
        }
    }
}

/// Input to [`Simulator::simulate`](crate::Simulator::simulate)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub provider: String,
    pub operation: String,
    #[serde(default)]
    pub parameters: Parameters,
}

impl SimulationRequest {
    pub fn new(provider: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            operation: operation.into(),
            parameters: Parameters::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Uniform result envelope
///
/// `result` is set when `success` is true, `error` when it is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub provider: String,
    pub operation: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Wall-clock time including injected latency
    pub duration: Duration,
}

impl SimulationResult {
    /// Field of the result payload, `Null` when absent
    pub fn field(&self, key: &str) -> &Value {
        self.result
            .as_ref()
            .and_then(|r| r.get(key))
            .unwrap_or(&Value::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

/// Outcome of a provider validation, derived from the capability table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderValidationResult {
    pub provider: String,
    pub status: ValidationStatus,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub services: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStatus {
    Creating,
    Running,
    Stopping,
    Stopped,
    Deleting,
    Failed,
}

impl std::fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterStatus::Creating => write!(f, "creating"),
            ClusterStatus::Running => write!(f, "running"),
            ClusterStatus::Stopping => write!(f, "stopping"),
            ClusterStatus::Stopped => write!(f, "stopped"),
            ClusterStatus::Deleting => write!(f, "deleting"),
            ClusterStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Provider-specific placement fields of a synthetic cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClusterPlacement {
    Azure {
        resource_group: String,
        location: String,
        vm_size: String,
    },
    Aws {
        region: String,
        instance_type: String,
        vpc_id: String,
    },
    Gcp {
        project_id: String,
        region: String,
        machine_type: String,
    },
}

/// Result payload of `create_cluster` and entries of `list_clusters`
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub cluster_id: String,
    pub name: Value,
    pub provider: String,
    pub status: ClusterStatus,
    pub node_count: u64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub placement: Option<ClusterPlacement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterEndpoints {
    pub api_server: String,
    pub dashboard: String,
}

/// Result payload of `get_cluster`
#[derive(Debug, Clone, Serialize)]
pub struct ClusterDetail {
    pub cluster_id: String,
    pub name: String,
    pub provider: String,
    pub status: ClusterStatus,
    pub node_count: u64,
    pub kubernetes_version: String,
    pub created_at: DateTime<Utc>,
    pub endpoints: ClusterEndpoints,
}

/// Full cluster model with merged configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub status: ClusterStatus,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub provider_config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Pending,
    Running,
    Passed,
    Failed,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStatus::Pending => write!(f, "pending"),
            TestStatus::Running => write!(f, "running"),
            TestStatus::Passed => write!(f, "passed"),
            TestStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Test categories with dedicated metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    Connectivity,
    Performance,
    Security,
    Compliance,
}

impl TestType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "connectivity" => Some(TestType::Connectivity),
            "performance" => Some(TestType::Performance),
            "security" => Some(TestType::Security),
            "compliance" => Some(TestType::Compliance),
            _ => None,
        }
    }
}

/// Metrics attached to a test run according to its type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestMetrics {
    Connectivity {
        endpoints_tested: u64,
        successful_connections: u64,
        avg_response_time_ms: u64,
    },
    Performance {
        cpu_usage_percent: u64,
        memory_usage_percent: u64,
        requests_per_second: u64,
        p95_latency_ms: u64,
    },
    Security {
        vulnerabilities_found: u64,
        security_score: u64,
        compliant_policies: u64,
    },
    Compliance {
        policies_checked: u64,
        compliant_policies: u64,
        compliance_score: u64,
    },
}

/// Result payload of `run_test`
#[derive(Debug, Clone, Serialize)]
pub struct TestRun {
    pub test_id: String,
    pub cluster_id: Value,
    pub test_type: String,
    pub status: TestStatus,
    pub started_at: DateTime<Utc>,
    /// Rendered as `<seconds>s`
    pub duration: String,
    #[serde(flatten)]
    pub metrics: Option<TestMetrics>,
}

/// Full test result model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub cluster_id: String,
    pub test_type: String,
    pub status: TestStatus,
    pub duration_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<TestMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}
