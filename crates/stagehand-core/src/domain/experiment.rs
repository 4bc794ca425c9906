//! Experiment モデル（metadata / spec / topology）
//!
//! エンジンと app が必要とする部分だけをモデル化する。
//! 省略可能なフィールドは `Option` にして、`ExperimentSpec::set_defaults` が
//! 「未指定」と「指定済み」を区別できるようにする。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::scenario::Scenario;

pub const DEFAULT_VM_TYPE: &str = "kvm";
pub const DEFAULT_VCPUS: u32 = 1;
pub const DEFAULT_MEMORY_MB: u32 = 1024;
pub const DEFAULT_OS_TYPE: &str = "linux";
pub const DEFAULT_INTERFACE_PROTO: &str = "static";

/// The unit apps are applied to. Apps mutate it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub metadata: ExperimentMetadata,

    #[serde(default)]
    pub spec: ExperimentSpec,
}

impl Experiment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ExperimentMetadata {
                name: name.into(),
                annotations: BTreeMap::new(),
            },
            spec: ExperimentSpec::default(),
        }
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.spec.scenario = Some(scenario);
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.spec.topology.nodes.push(node);
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSpec {
    #[serde(default)]
    pub topology: Topology,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
}

impl ExperimentSpec {
    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    /// Fill every unset field in the topology with its default.
    ///
    /// Idempotent. Explicitly set values are never overwritten.
    pub fn set_defaults(&mut self) {
        for node in &mut self.topology.nodes {
            node.set_defaults();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Topology {
    pub fn node(&self, hostname: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.hostname == hostname)
    }

    pub fn node_mut(&mut self, hostname: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.hostname == hostname)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub hostname: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_type: Option<String>,

    #[serde(default)]
    pub hardware: Hardware,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Node {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }

    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interfaces.push(interface);
        self
    }

    fn set_defaults(&mut self) {
        self.vm_type.get_or_insert_with(|| DEFAULT_VM_TYPE.to_string());
        self.hardware.vcpus.get_or_insert(DEFAULT_VCPUS);
        self.hardware.memory_mb.get_or_insert(DEFAULT_MEMORY_MB);
        self.hardware
            .os_type
            .get_or_insert_with(|| DEFAULT_OS_TYPE.to_string());
        for iface in &mut self.interfaces {
            iface
                .proto
                .get_or_insert_with(|| DEFAULT_INTERFACE_PROTO.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hardware {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<String>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::ScenarioApp;

    #[test]
    fn set_defaults_fills_missing_fields() {
        let mut exp = Experiment::new("lab").with_node(Node::new("host-1").with_interface(Interface::new("eth0")));

        exp.spec.set_defaults();

        let node = exp.spec.topology.node("host-1").unwrap();
        assert_eq!(node.vm_type.as_deref(), Some(DEFAULT_VM_TYPE));
        assert_eq!(node.hardware.vcpus, Some(DEFAULT_VCPUS));
        assert_eq!(node.hardware.memory_mb, Some(DEFAULT_MEMORY_MB));
        assert_eq!(node.hardware.os_type.as_deref(), Some(DEFAULT_OS_TYPE));
        assert_eq!(node.interfaces[0].proto.as_deref(), Some(DEFAULT_INTERFACE_PROTO));
    }

    #[test]
    fn set_defaults_keeps_explicit_values_and_is_idempotent() {
        let mut node = Node::new("win");
        node.hardware.os_type = Some("windows".to_string());
        node.hardware.vcpus = Some(4);
        let mut exp = Experiment::new("lab").with_node(node);

        exp.spec.set_defaults();
        let once = exp.clone();
        exp.spec.set_defaults();

        assert_eq!(exp, once);
        let node = exp.spec.topology.node("win").unwrap();
        assert_eq!(node.hardware.os_type.as_deref(), Some("windows"));
        assert_eq!(node.hardware.vcpus, Some(4));
    }

    #[test]
    fn experiment_without_scenario_then_scenario_is_none() {
        let json = r#"
        {
          "metadata": { "name": "lab" },
          "spec": { "topology": { "nodes": [ { "hostname": "a" } ] } }
        }"#;
        let exp: Experiment = serde_json::from_str(json).expect("deserialize");
        assert!(exp.spec.scenario().is_none());
        assert_eq!(exp.spec.topology.nodes.len(), 1);
    }

    #[test]
    fn experiment_roundtrip_json() {
        let exp = Experiment::new("lab")
            .with_node(Node::new("a"))
            .with_scenario(Scenario::new(vec![ScenarioApp::new("tap")]));

        let s = serde_json::to_string(&exp).expect("serialize");
        let back: Experiment = serde_json::from_str(&s).expect("deserialize");
        assert_eq!(back, exp);
        assert_eq!(back.spec.scenario().unwrap().apps()[0].name(), "tap");
    }
}
