//! Static provider capability table
//!
//! Regions, managed-Kubernetes version catalogs and machine-type lists for
//! every provider the simulator recognises. Read-only; nothing here is
//! persisted or mutated at runtime.

use serde_json::{Map, Value, json};
use std::str::FromStr;

/// Providers with a capability entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Azure,
    Aws,
    Gcp,
    Hetzner,
    Ionos,
    Stackit,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::Azure,
        ProviderKind::Aws,
        ProviderKind::Gcp,
        ProviderKind::Hetzner,
        ProviderKind::Ionos,
        ProviderKind::Stackit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Azure => "azure",
            ProviderKind::Aws => "aws",
            ProviderKind::Gcp => "gcp",
            ProviderKind::Hetzner => "hetzner",
            ProviderKind::Ionos => "ionos",
            ProviderKind::Stackit => "stackit",
        }
    }

    /// Case-sensitive lookup; `None` for unrecognised providers
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    pub fn capabilities(&self) -> &'static ProviderCapabilities {
        match self {
            ProviderKind::Azure => &AZURE,
            ProviderKind::Aws => &AWS,
            ProviderKind::Gcp => &GCP,
            ProviderKind::Hetzner => &HETZNER,
            ProviderKind::Ionos => &IONOS,
            ProviderKind::Stackit => &STACKIT,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unsupported provider: {}", s))
    }
}

/// Everything the simulator knows about one provider
#[derive(Debug)]
pub struct ProviderCapabilities {
    pub regions: &'static [&'static str],
    pub services: &'static [ServiceCatalog],
    pub default_region: &'static str,
    pub default_machine_type: &'static str,
}

impl ProviderCapabilities {
    pub fn region_list(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.to_string()).collect()
    }

    /// Services rendered as the `services` map of a validation result
    pub fn services_map(&self) -> Map<String, Value> {
        self.services
            .iter()
            .map(|s| (s.name.to_string(), s.to_json()))
            .collect()
    }
}

/// A managed service offered by a provider
#[derive(Debug)]
pub struct ServiceCatalog {
    pub name: &'static str,
    pub kubernetes_versions: &'static [&'static str],
    /// Key under which `machine_types` is reported (`vm_sizes`, `instance_types`, ...)
    pub machine_types_key: Option<&'static str>,
    pub machine_types: &'static [&'static str],
    /// Boolean capabilities reported as `true`
    pub features: &'static [&'static str],
}

impl ServiceCatalog {
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("available".to_string(), Value::Bool(true));
        if !self.kubernetes_versions.is_empty() {
            map.insert(
                "kubernetes_versions".to_string(),
                json!(self.kubernetes_versions),
            );
        }
        if let Some(key) = self.machine_types_key {
            map.insert(key.to_string(), json!(self.machine_types));
        }
        for feature in self.features {
            map.insert(feature.to_string(), Value::Bool(true));
        }
        Value::Object(map)
    }
}

const K8S_GENERIC: &[&str] = &["1.28.0", "1.27.3", "1.26.6"];

static AZURE: ProviderCapabilities = ProviderCapabilities {
    regions: &["eastus", "westus2", "centralus", "westeurope", "northeurope"],
    services: &[
        ServiceCatalog {
            name: "aks",
            kubernetes_versions: K8S_GENERIC,
            machine_types_key: Some("vm_sizes"),
            machine_types: &["Standard_D2s_v3", "Standard_D4s_v3", "Standard_B2s"],
            features: &[],
        },
        ServiceCatalog {
            name: "monitoring",
            kubernetes_versions: &[],
            machine_types_key: None,
            machine_types: &[],
            features: &["log_analytics", "application_insights"],
        },
    ],
    default_region: "eastus",
    default_machine_type: "Standard_D2s_v3",
};

static AWS: ProviderCapabilities = ProviderCapabilities {
    regions: &[
        "us-east-1",
        "us-west-2",
        "eu-west-1",
        "eu-central-1",
        "ap-southeast-1",
    ],
    services: &[
        ServiceCatalog {
            name: "eks",
            kubernetes_versions: &["1.28", "1.27", "1.26"],
            machine_types_key: Some("instance_types"),
            machine_types: &["t3.medium", "t3.large", "m5.large", "m5.xlarge"],
            features: &[],
        },
        ServiceCatalog {
            name: "cloudwatch",
            kubernetes_versions: &[],
            machine_types_key: None,
            machine_types: &[],
            features: &["logs", "metrics"],
        },
    ],
    default_region: "us-west-2",
    default_machine_type: "t3.medium",
};

static GCP: ProviderCapabilities = ProviderCapabilities {
    regions: &["us-central1", "us-west1", "europe-west1", "asia-southeast1"],
    services: &[
        ServiceCatalog {
            name: "gke",
            kubernetes_versions: &["1.28.3-gke.1286000", "1.27.7-gke.1056000"],
            machine_types_key: Some("machine_types"),
            machine_types: &["e2-medium", "e2-standard-4", "n1-standard-2"],
            features: &[],
        },
        ServiceCatalog {
            name: "stackdriver",
            kubernetes_versions: &[],
            machine_types_key: None,
            machine_types: &[],
            features: &["logging", "monitoring"],
        },
    ],
    default_region: "us-central1",
    default_machine_type: "e2-medium",
};

static HETZNER: ProviderCapabilities = ProviderCapabilities {
    regions: &["nbg1", "fsn1", "hel1", "ash"],
    services: &[ServiceCatalog {
        name: "kubernetes",
        kubernetes_versions: K8S_GENERIC,
        machine_types_key: Some("server_types"),
        machine_types: &["cx11", "cx21", "cx31", "cx41"],
        features: &[],
    }],
    default_region: "nbg1",
    default_machine_type: "cx21",
};

static IONOS: ProviderCapabilities = ProviderCapabilities {
    regions: &["de/fra", "de/txl", "us/las", "gb/lhr"],
    services: &[ServiceCatalog {
        name: "kubernetes",
        kubernetes_versions: K8S_GENERIC,
        machine_types_key: Some("cpu_families"),
        machine_types: &["AMD_OPTERON", "INTEL_XEON", "INTEL_SKYLAKE"],
        features: &[],
    }],
    default_region: "de/fra",
    default_machine_type: "INTEL_XEON",
};

static STACKIT: ProviderCapabilities = ProviderCapabilities {
    regions: &["eu-central-1", "eu-west-1"],
    services: &[ServiceCatalog {
        name: "ske",
        kubernetes_versions: K8S_GENERIC,
        machine_types_key: Some("machine_types"),
        machine_types: &["c1.2", "c1.3", "c1.4", "c1.5"],
        features: &[],
    }],
    default_region: "eu-central-1",
    default_machine_type: "c1.2",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::parse(kind.as_str()), Some(kind));
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert_eq!(ProviderKind::parse("AWS"), None);
        assert!("unknown-cloud".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_every_provider_has_regions_and_services() {
        for kind in ProviderKind::ALL {
            let caps = kind.capabilities();
            assert!(!caps.regions.is_empty(), "{} has no regions", kind);
            assert!(!caps.services.is_empty(), "{} has no services", kind);
            assert!(caps.regions.contains(&caps.default_region));
        }
    }

    #[test]
    fn test_service_json_shape() {
        let services = ProviderKind::Azure.capabilities().services_map();
        let aks = &services["aks"];
        assert_eq!(aks["available"], json!(true));
        assert_eq!(aks["vm_sizes"][0], json!("Standard_D2s_v3"));
        assert_eq!(aks["kubernetes_versions"].as_array().unwrap().len(), 3);

        let monitoring = &services["monitoring"];
        assert_eq!(monitoring["log_analytics"], json!(true));
        assert!(monitoring.get("kubernetes_versions").is_none());
    }
}
