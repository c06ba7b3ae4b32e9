//! cubesim - multi-cloud operation simulator
//!
//! Stands in for real provider APIs (managed clusters, object-storage
//! buckets, test runs) during integration testing and CLI demos. A caller
//! submits a provider name, an operation and a parameter bag, and receives a
//! synthetic but internally consistent result. No network call is made.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │      HTTP handlers / CLI / test harnesses        │
//! └─────────────────┬───────────────────────────────┘
//!                   │ SimulationRequest
//! ┌─────────────────▼───────────────────────────────┐
//! │               Simulator (engine)                 │
//! │  latency injection · Operation dispatch          │
//! └───────┬─────────────────────────┬───────────────┘
//!         │                         │
//! ┌───────▼───────┐  ┌──────────────▼──────────────┐
//! │  BucketStore  │  │     SyntheticGenerator      │
//! │ (JSON file)   │  │ catalog + SimRng            │
//! └───────────────┘  └─────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cubesim::{SimConfig, SimulationRequest, Simulator};
//!
//! let sim = Simulator::new(&SimConfig::fast("testdata/buckets.json"));
//! let result = sim.simulate(
//!     &SimulationRequest::new("aws", "create_bucket").with_param("name", "demo"),
//! );
//! assert!(result.success);
//! ```

pub mod bucket;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod generator;
pub mod logging;
pub mod model;
pub mod params;
pub mod rng;

// Re-exports
pub use bucket::{BucketStore, Persisted};
pub use catalog::{ProviderCapabilities, ProviderKind, ServiceCatalog};
pub use cubesim_config::SimConfig;
pub use engine::{EngineOptions, LatencyProfile, Operation, Simulator};
pub use error::{Result, SimError};
pub use generator::SyntheticGenerator;
pub use model::{
    BucketRecord, Cluster, ClusterStatus, ProviderValidationResult, SimulationRequest,
    SimulationResult, TestMetrics, TestResult, TestStatus, ValidationStatus,
};
pub use params::{Parameters, Params};
pub use rng::SimRng;
