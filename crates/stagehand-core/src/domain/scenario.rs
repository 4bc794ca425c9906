//! Scenario - experiment が要求する app の順序付きリスト
//!
//! app のパラメータは `serde_json::Value` のまま持つ（形を知っているのは app だけ）

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    apps: Vec<ScenarioApp>,
}

impl Scenario {
    pub fn new(apps: Vec<ScenarioApp>) -> Self {
        Self { apps }
    }

    /// Declared apps, in declaration order.
    pub fn apps(&self) -> &[ScenarioApp] {
        &self.apps
    }

    pub fn app(&self, name: &str) -> Option<&ScenarioApp> {
        self.apps.iter().find(|app| app.name == name)
    }
}

/// One app declaration inside a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioApp {
    name: String,

    /// App-wide parameters.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    metadata: serde_json::Value,

    /// Per-host parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    hosts: Vec<HostMetadata>,
}

impl ScenarioApp {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: serde_json::Value::Null,
            hosts: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_host(mut self, hostname: impl Into<String>, metadata: serde_json::Value) -> Self {
        self.hosts.push(HostMetadata {
            hostname: hostname.into(),
            metadata,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn hosts(&self) -> &[HostMetadata] {
        &self.hosts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMetadata {
    pub hostname: String,

    #[serde(default)]
    pub metadata: serde_json::Value,
}
