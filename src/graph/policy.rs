//! Per-kind graph policy supplied by the graph owner

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_allow_self_loops() -> bool {
    true
}

/// Self-loop rules, keyed by edge kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPolicy {
    /// Applies to every kind without an explicit override
    #[serde(default = "default_allow_self_loops")]
    pub allow_self_loops: bool,
    /// Per-kind overrides (kind -> permitted)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub self_loops: BTreeMap<String, bool>,
}

impl Default for GraphPolicy {
    fn default() -> Self {
        Self {
            allow_self_loops: true,
            self_loops: BTreeMap::new(),
        }
    }
}

impl GraphPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid self-loops for one edge kind
    pub fn forbid_self_loops(mut self, kind: impl Into<String>) -> Self {
        self.self_loops.insert(kind.into(), false);
        self
    }

    /// Permit self-loops for one edge kind, overriding the default
    pub fn permit_self_loops(mut self, kind: impl Into<String>) -> Self {
        self.self_loops.insert(kind.into(), true);
        self
    }

    /// Change the default for kinds without an override
    pub fn with_default_self_loops(mut self, allow: bool) -> Self {
        self.allow_self_loops = allow;
        self
    }

    pub fn permits_self_loop(&self, kind: &str) -> bool {
        self.self_loops
            .get(kind)
            .copied()
            .unwrap_or(self.allow_self_loops)
    }
}
