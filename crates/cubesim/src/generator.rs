//! Synthetic entity generation
//!
//! Fabricates provider-shaped clusters, test runs and validation results.
//! Nothing produced here is stored; two identical requests yield different
//! identifiers.

use crate::catalog::ProviderKind;
use crate::model::{
    Cluster, ClusterDetail, ClusterEndpoints, ClusterPlacement, ClusterStatus, ClusterSummary,
    ProviderValidationResult, TestMetrics, TestResult, TestRun, TestStatus, TestType,
    ValidationStatus,
};
use crate::params::{Parameters, Params};
use crate::rng::SimRng;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub const DEFAULT_NODE_COUNT: u64 = 3;
pub const DEFAULT_KUBERNETES_VERSION: &str = "1.28.0";
pub const DEFAULT_TEST_TYPE: &str = "connectivity";
/// Probability that a simulated test fails
pub const TEST_FAILURE_RATE: f64 = 0.1;

const LIST_STATUSES: [ClusterStatus; 3] = [
    ClusterStatus::Running,
    ClusterStatus::Creating,
    ClusterStatus::Stopped,
];
const MAX_AGE_HOURS: u64 = 168;

#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    rng: Arc<SimRng>,
}

impl SyntheticGenerator {
    pub fn new(rng: Arc<SimRng>) -> Self {
        Self { rng }
    }

    fn cluster_id(&self, provider: &str) -> String {
        format!("sim-{}-{}", provider, self.rng.below(10_000))
    }

    fn hours_ago(&self, max_hours: u64) -> chrono::DateTime<Utc> {
        Utc::now() - ChronoDuration::hours(self.rng.below(max_hours) as i64)
    }

    fn placement(
        &self,
        provider: &str,
        cluster_id: &str,
        params: Params<'_>,
    ) -> Option<ClusterPlacement> {
        let kind = ProviderKind::parse(provider)?;
        let caps = kind.capabilities();
        match kind {
            ProviderKind::Azure => Some(ClusterPlacement::Azure {
                resource_group: params
                    .str_or_else("resource_group", || format!("rg-{}", cluster_id)),
                location: params.str_or("location", caps.default_region),
                vm_size: params.str_or("vm_size", caps.default_machine_type),
            }),
            ProviderKind::Aws => Some(ClusterPlacement::Aws {
                region: params.str_or("region", caps.default_region),
                instance_type: params.str_or("instance_type", caps.default_machine_type),
                vpc_id: format!("vpc-{}", self.rng.short_id()),
            }),
            ProviderKind::Gcp => Some(ClusterPlacement::Gcp {
                project_id: params
                    .str_or_else("project_id", || format!("project-{}", self.rng.short_id())),
                region: params.str_or("region", caps.default_region),
                machine_type: params.str_or("machine_type", caps.default_machine_type),
            }),
            ProviderKind::Hetzner | ProviderKind::Ionos | ProviderKind::Stackit => None,
        }
    }

    /// Payload of `create_cluster`
    pub fn create_cluster(&self, provider: &str, params: &Parameters) -> ClusterSummary {
        let params = Params::new(params);
        let cluster_id = self.cluster_id(provider);
        let placement = self.placement(provider, &cluster_id, params);

        ClusterSummary {
            name: params.raw("name"),
            provider: provider.to_string(),
            status: ClusterStatus::Creating,
            node_count: params.u64_or("node_count", DEFAULT_NODE_COUNT),
            created_at: Utc::now(),
            placement,
            cluster_id,
        }
    }

    /// Payload of `delete_cluster`; always reports deletion in progress
    pub fn delete_cluster(&self, params: &Parameters) -> Map<String, Value> {
        let params = Params::new(params);
        let mut result = Map::new();
        result.insert("cluster_id".to_string(), params.raw("cluster_id"));
        result.insert(
            "status".to_string(),
            json!(ClusterStatus::Deleting.to_string()),
        );
        result.insert("message".to_string(), json!("Cluster deletion initiated"));
        result
    }

    /// Between two and four unrelated clusters
    pub fn list_clusters(&self, provider: &str) -> Vec<ClusterSummary> {
        let count = self.rng.range(2, 5);
        (1..=count)
            .map(|i| ClusterSummary {
                cluster_id: self.cluster_id(provider),
                name: json!(format!("{}-cluster-{}", provider, i)),
                provider: provider.to_string(),
                status: *self.rng.pick(&LIST_STATUSES).unwrap_or(&ClusterStatus::Running),
                node_count: self.rng.range(1, 6),
                created_at: self.hours_ago(MAX_AGE_HOURS),
                placement: None,
            })
            .collect()
    }

    /// Payload of `get_cluster`
    pub fn get_cluster(&self, provider: &str, params: &Parameters) -> ClusterDetail {
        let params = Params::new(params);
        let cluster_id = params.str_or_else("cluster_id", || format!("sim-{}-1234", provider));

        ClusterDetail {
            name: "sample-cluster".to_string(),
            provider: provider.to_string(),
            status: ClusterStatus::Running,
            node_count: DEFAULT_NODE_COUNT,
            kubernetes_version: DEFAULT_KUBERNETES_VERSION.to_string(),
            created_at: self.hours_ago(MAX_AGE_HOURS),
            endpoints: ClusterEndpoints {
                api_server: format!("https://api-{}.example.com", cluster_id),
                dashboard: format!("https://dashboard-{}.example.com", cluster_id),
            },
            cluster_id,
        }
    }

    fn test_metrics(&self, test_type: TestType) -> TestMetrics {
        let rng = &self.rng;
        match test_type {
            TestType::Connectivity => TestMetrics::Connectivity {
                endpoints_tested: rng.range(5, 15),
                successful_connections: rng.range(10, 25),
                avg_response_time_ms: rng.range(20, 120),
            },
            TestType::Performance => TestMetrics::Performance {
                cpu_usage_percent: rng.range(30, 70),
                memory_usage_percent: rng.range(25, 75),
                requests_per_second: rng.range(500, 1500),
                p95_latency_ms: rng.range(50, 250),
            },
            TestType::Security => TestMetrics::Security {
                vulnerabilities_found: rng.below(3),
                security_score: rng.range(70, 100),
                compliant_policies: rng.range(15, 35),
            },
            TestType::Compliance => TestMetrics::Compliance {
                policies_checked: rng.range(25, 75),
                compliant_policies: rng.range(20, 65),
                compliance_score: rng.range(75, 100),
            },
        }
    }

    fn test_status(&self) -> TestStatus {
        if self.rng.chance(TEST_FAILURE_RATE) {
            TestStatus::Failed
        } else {
            TestStatus::Passed
        }
    }

    fn test_duration_secs(&self) -> u64 {
        self.rng.range(30, 330)
    }

    /// Payload of `run_test`
    pub fn run_test(&self, params: &Parameters) -> TestRun {
        let params = Params::new(params);
        let test_type = params.str_or("test_type", DEFAULT_TEST_TYPE);

        TestRun {
            test_id: format!("test-{}", self.rng.below(10_000)),
            cluster_id: params.raw("cluster_id"),
            status: self.test_status(),
            started_at: Utc::now(),
            duration: format!("{}s", self.test_duration_secs()),
            metrics: TestType::parse(&test_type).map(|t| self.test_metrics(t)),
            test_type,
        }
    }

    /// Full cluster model: caller config merged over defaults plus provider fields
    pub fn generate_cluster(&self, provider: &str, name: &str, config: &Parameters) -> Cluster {
        let now = Utc::now();
        let params = Params::new(config);

        let mut merged = Map::new();
        merged.insert(
            "kubernetes_version".to_string(),
            json!(DEFAULT_KUBERNETES_VERSION),
        );
        merged.insert("node_count".to_string(), json!(DEFAULT_NODE_COUNT));
        merged.insert("auto_scaling".to_string(), json!(true));
        merged.extend(config.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut cluster = Cluster {
            id: self.cluster_id(provider),
            name: name.to_string(),
            provider: provider.to_string(),
            status: ClusterStatus::Running,
            config: merged,
            provider_config: Map::new(),
            project_id: None,
            resource_group: None,
            location: None,
            region: None,
            created_at: self.hours_ago(24),
            updated_at: now,
        };

        let Some(kind) = ProviderKind::parse(provider) else {
            return cluster;
        };
        let caps = kind.capabilities();
        let provider_config = match kind {
            ProviderKind::Azure => {
                cluster.resource_group =
                    Some(params.str_or_else("resource_group", || format!("rg-{}", name)));
                cluster.location = Some(params.str_or("location", caps.default_region));
                json!({
                    "sku": caps.default_machine_type,
                    "network_plugin": "azure",
                    "enable_rbac": true,
                    "enable_monitoring": true,
                })
            }
            ProviderKind::Aws => {
                cluster.region = Some(params.str_or("region", caps.default_region));
                json!({
                    "instance_type": caps.default_machine_type,
                    "vpc_id": format!("vpc-{}", self.rng.short_id()),
                    "subnet_ids": [
                        format!("subnet-{}", self.rng.short_id()),
                        format!("subnet-{}", self.rng.short_id()),
                    ],
                    "endpoint_private": false,
                })
            }
            ProviderKind::Gcp => {
                cluster.project_id = Some(
                    params.str_or_else("project_id", || format!("project-{}", self.rng.short_id())),
                );
                cluster.region = Some(params.str_or("region", caps.default_region));
                json!({
                    "machine_type": caps.default_machine_type,
                    "disk_size_gb": 100,
                    "network": "default",
                    "enable_autopilot": false,
                })
            }
            ProviderKind::Hetzner | ProviderKind::Ionos | ProviderKind::Stackit => {
                cluster.region = Some(params.str_or("region", caps.default_region));
                json!({ "machine_type": caps.default_machine_type })
            }
        };
        if let Value::Object(map) = provider_config {
            cluster.provider_config = map;
        }
        cluster
    }

    /// Full test result model for a cluster
    pub fn generate_test_result(&self, cluster_id: &str, test_type: &str) -> TestResult {
        let now = Utc::now();
        let status = self.test_status();
        let duration_secs = self.test_duration_secs();

        TestResult {
            id: format!("test-{}", self.rng.below(10_000)),
            cluster_id: cluster_id.to_string(),
            test_type: test_type.to_string(),
            status,
            duration_secs,
            details: TestType::parse(test_type).map(|t| self.test_metrics(t)),
            error_message: (status == TestStatus::Failed)
                .then(|| "Simulated test failure".to_string()),
            started_at: now - ChronoDuration::seconds(duration_secs as i64),
            completed_at: Some(now),
        }
    }

    /// Validate a provider against the capability table.
    ///
    /// `credentials` are accepted for interface parity and never inspected.
    pub fn validate_provider(
        &self,
        provider: &str,
        _credentials: Option<&Parameters>,
    ) -> ProviderValidationResult {
        let timestamp = Utc::now();
        match ProviderKind::parse(provider) {
            Some(kind) => {
                let caps = kind.capabilities();
                ProviderValidationResult {
                    provider: provider.to_string(),
                    status: ValidationStatus::Valid,
                    valid: true,
                    regions: caps.region_list(),
                    services: caps.services_map(),
                    timestamp,
                    error: None,
                }
            }
            None => ProviderValidationResult {
                provider: provider.to_string(),
                status: ValidationStatus::Invalid,
                valid: false,
                regions: Vec::new(),
                services: Map::new(),
                timestamp,
                error: Some(format!("unsupported provider: {}", provider)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> SyntheticGenerator {
        SyntheticGenerator::new(Arc::new(SimRng::seeded(42)))
    }

    fn bag(value: Value) -> Parameters {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_cluster_aws_shape() {
        let cluster = generator().create_cluster("aws", &bag(json!({"name": "c1"})));
        let value = serde_json::to_value(&cluster).unwrap();

        assert!(cluster.cluster_id.starts_with("sim-aws-"));
        assert_eq!(value["name"], json!("c1"));
        assert_eq!(value["node_count"], json!(3));
        assert_eq!(value["status"], json!("creating"));
        assert_eq!(value["region"], json!("us-west-2"));
        assert_eq!(value["instance_type"], json!("t3.medium"));
        assert!(value["vpc_id"].as_str().unwrap().starts_with("vpc-"));
        assert!(value.get("resource_group").is_none());
    }

    #[test]
    fn test_create_cluster_azure_overrides() {
        let params = bag(json!({"location": "westeurope", "node_count": 5}));
        let cluster = generator().create_cluster("azure", &params);
        let value = serde_json::to_value(&cluster).unwrap();

        assert_eq!(value["location"], json!("westeurope"));
        assert_eq!(value["vm_size"], json!("Standard_D2s_v3"));
        assert_eq!(value["node_count"], json!(5));
        assert_eq!(
            value["resource_group"],
            json!(format!("rg-{}", cluster.cluster_id))
        );
        assert_eq!(value["name"], Value::Null);
    }

    #[test]
    fn test_create_cluster_gcp_and_generic() {
        let generator = generator();
        let gcp =
            serde_json::to_value(generator.create_cluster("gcp", &Parameters::new())).unwrap();
        assert!(gcp["project_id"].as_str().unwrap().starts_with("project-"));
        assert_eq!(gcp["machine_type"], json!("e2-medium"));

        let other =
            serde_json::to_value(generator.create_cluster("hetzner", &Parameters::new())).unwrap();
        let object = other.as_object().unwrap();
        assert!(!object.contains_key("region"));
        assert!(!object.contains_key("project_id"));
        assert_eq!(object["provider"], json!("hetzner"));
    }

    #[test]
    fn test_repeated_creates_differ() {
        let generator = generator();
        let ids: std::collections::HashSet<_> = (0..20)
            .map(|_| generator.create_cluster("aws", &Parameters::new()).cluster_id)
            .collect();
        assert!(ids.len() > 1);
    }

    #[test]
    fn test_list_clusters_bounds() {
        let generator = generator();
        for _ in 0..50 {
            let clusters = generator.list_clusters("gcp");
            assert!((2..=4).contains(&clusters.len()));
            for (i, c) in clusters.iter().enumerate() {
                assert_eq!(c.name, json!(format!("gcp-cluster-{}", i + 1)));
                assert!((1..=5).contains(&c.node_count));
                assert!(LIST_STATUSES.contains(&c.status));
            }
        }
    }

    #[test]
    fn test_get_cluster_endpoints() {
        let detail = generator().get_cluster("aws", &bag(json!({"cluster_id": "abc"})));
        assert_eq!(detail.endpoints.api_server, "https://api-abc.example.com");
        assert_eq!(detail.kubernetes_version, "1.28.0");

        let fallback = generator().get_cluster("azure", &Parameters::new());
        assert_eq!(fallback.cluster_id, "sim-azure-1234");
    }

    #[test]
    fn test_run_test_metrics_by_type() {
        let generator = generator();
        let perf = serde_json::to_value(
            generator.run_test(&bag(json!({"test_type": "performance", "cluster_id": "c"}))),
        )
        .unwrap();
        assert!(perf.get("requests_per_second").is_some());
        assert!(perf.get("endpoints_tested").is_none());
        assert_eq!(perf["cluster_id"], json!("c"));

        let default = generator.run_test(&Parameters::new());
        assert_eq!(default.test_type, "connectivity");
        assert!(matches!(default.metrics, Some(TestMetrics::Connectivity { .. })));

        let unknown = generator.run_test(&bag(json!({"test_type": "chaos"})));
        assert!(unknown.metrics.is_none());
        assert!(unknown.duration.ends_with('s'));
    }

    #[test]
    fn test_failure_rate_roughly_ten_percent() {
        let generator = generator();
        let failures = (0..2000)
            .filter(|_| generator.run_test(&Parameters::new()).status == TestStatus::Failed)
            .count();
        assert!((100..320).contains(&failures), "failures = {}", failures);
    }

    #[test]
    fn test_security_metric_ranges() {
        let generator = generator();
        for _ in 0..200 {
            match generator.test_metrics(TestType::Security) {
                TestMetrics::Security {
                    vulnerabilities_found,
                    security_score,
                    ..
                } => {
                    assert!(vulnerabilities_found < 3);
                    assert!((70..100).contains(&security_score));
                }
                other => panic!("unexpected metrics: {:?}", other),
            }
        }
    }

    #[test]
    fn test_generate_cluster_merges_config() {
        let config = bag(json!({"node_count": 7, "region": "eu-west-1"}));
        let cluster = generator().generate_cluster("aws", "prod", &config);

        assert_eq!(cluster.config["node_count"], json!(7));
        assert_eq!(cluster.config["kubernetes_version"], json!("1.28.0"));
        assert_eq!(cluster.config["auto_scaling"], json!(true));
        assert_eq!(cluster.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cluster.provider_config["subnet_ids"].as_array().unwrap().len(), 2);
        assert_eq!(cluster.status, ClusterStatus::Running);
    }

    #[test]
    fn test_generate_cluster_azure_resource_group() {
        let cluster = generator().generate_cluster("azure", "web", &Parameters::new());
        assert_eq!(cluster.resource_group.as_deref(), Some("rg-web"));
        assert_eq!(cluster.location.as_deref(), Some("eastus"));
        assert_eq!(cluster.provider_config["sku"], json!("Standard_D2s_v3"));
    }

    #[test]
    fn test_generate_test_result() {
        let generator = generator();
        for _ in 0..100 {
            let result = generator.generate_test_result("sim-aws-1", "compliance");
            assert!((30..330).contains(&result.duration_secs));
            assert_eq!(
                result.error_message.is_some(),
                result.status == TestStatus::Failed
            );
            assert!(result.completed_at.unwrap() >= result.started_at);
            assert!(matches!(result.details, Some(TestMetrics::Compliance { .. })));
        }
    }

    #[test]
    fn test_validate_all_supported_providers() {
        let generator = generator();
        for kind in ProviderKind::ALL {
            let result = generator.validate_provider(kind.as_str(), None);
            assert!(result.valid);
            assert_eq!(result.status, ValidationStatus::Valid);
            assert!(!result.regions.is_empty());
            assert!(!result.services.is_empty());
            assert!(result.error.is_none());
        }
    }

    #[test]
    fn test_validate_unknown_provider() {
        let credentials = bag(json!({"token": "ignored"}));
        let result = generator().validate_provider("unknown-cloud", Some(&credentials));
        assert!(!result.valid);
        assert_eq!(result.status, ValidationStatus::Invalid);
        assert!(result.error.unwrap().contains("unknown-cloud"));
        assert!(result.regions.is_empty());
    }
}
