//! Fan-in / fan-out dependency metrics per function.
//!
//! Fan-in counts distinct callers and fan-out counts distinct resolved
//! callees. Raw call-site counts are reported alongside so repeated calls
//! between the same pair are still visible.

use super::scc::SccResult;
use super::CallGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyMetric {
    pub function_id: String,
    pub fan_in: usize,
    pub fan_out: usize,
    pub call_sites_in: usize,
    pub call_sites_out: usize,
    pub external_calls: usize,
    pub is_entry_point: bool,
    pub is_cyclic: bool,
}

/// Dependency metrics for every function in a graph, in graph node order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyMetrics {
    metrics: Vec<DependencyMetric>,
}

/// Computes [`DependencyMetrics`] from a call graph.
///
/// Entry points and cyclic functions may be supplied up front. When the
/// entry point set is empty, entry points are inferred as uncalled functions
/// that either call something or are named `main`.
#[derive(Debug, Default)]
pub struct DependencyCalculator<'a> {
    entry_points: Option<&'a HashSet<String>>,
    cyclic_functions: Option<&'a HashSet<String>>,
}

impl<'a> DependencyCalculator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry_points(mut self, entry_points: &'a HashSet<String>) -> Self {
        self.entry_points = Some(entry_points);
        self
    }

    pub fn with_cyclic_functions(mut self, cyclic_functions: &'a HashSet<String>) -> Self {
        self.cyclic_functions = Some(cyclic_functions);
        self
    }

    pub fn calculate(&self, graph: &CallGraph) -> DependencyMetrics {
        let known_entry_points = self.entry_points.filter(|set| !set.is_empty());

        let metrics = (0..graph.node_count())
            .map(|node| {
                let id = graph.id(node);
                let fan_in = graph.callers(node).len();
                let fan_out = graph.callees(node).len();
                let is_entry_point = match known_entry_points {
                    Some(set) => set.contains(id),
                    None => is_inferred_entry_point(fan_in, fan_out, graph.name(node)),
                };
                let is_cyclic = self
                    .cyclic_functions
                    .map(|set| set.contains(id))
                    .unwrap_or(false);

                DependencyMetric {
                    function_id: id.to_string(),
                    fan_in,
                    fan_out,
                    call_sites_in: graph.call_sites_in(node),
                    call_sites_out: graph.call_sites_out(node),
                    external_calls: graph.external_calls(node),
                    is_entry_point,
                    is_cyclic,
                }
            })
            .collect();

        DependencyMetrics { metrics }
    }
}

fn is_inferred_entry_point(fan_in: usize, fan_out: usize, name: &str) -> bool {
    fan_in == 0 && (fan_out > 0 || name == "main")
}

impl DependencyMetrics {
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyMetric> {
        self.metrics.iter()
    }

    pub fn get(&self, function_id: &str) -> Option<&DependencyMetric> {
        self.metrics.iter().find(|m| m.function_id == function_id)
    }

    /// Flag members of non-trivial or self-recursive components as cyclic
    pub fn mark_cyclic(&mut self, scc: &SccResult) {
        for metric in &mut self.metrics {
            if scc.is_cyclic(&metric.function_id) {
                metric.is_cyclic = true;
            }
        }
    }

    pub fn total_fan_in(&self) -> usize {
        self.metrics.iter().map(|m| m.fan_in).sum()
    }

    pub fn total_fan_out(&self) -> usize {
        self.metrics.iter().map(|m| m.fan_out).sum()
    }

    pub fn max_fan_in(&self) -> usize {
        self.metrics.iter().map(|m| m.fan_in).max().unwrap_or(0)
    }

    pub fn max_fan_out(&self) -> usize {
        self.metrics.iter().map(|m| m.fan_out).max().unwrap_or(0)
    }

    pub fn average_fan_in(&self) -> f64 {
        average(self.total_fan_in(), self.metrics.len())
    }

    pub fn average_fan_out(&self) -> f64 {
        average(self.total_fan_out(), self.metrics.len())
    }

    pub fn fan_in_values(&self) -> Vec<usize> {
        self.metrics.iter().map(|m| m.fan_in).collect()
    }

    pub fn entry_point_count(&self) -> usize {
        self.metrics.iter().filter(|m| m.is_entry_point).count()
    }

    /// Functions whose fan-in is strictly above `threshold`, highest first
    pub fn hubs(&self, threshold: usize) -> Vec<&DependencyMetric> {
        let mut hubs: Vec<_> = self.metrics.iter().filter(|m| m.fan_in > threshold).collect();
        hubs.sort_by(|a, b| {
            b.fan_in
                .cmp(&a.fan_in)
                .then_with(|| a.function_id.cmp(&b.function_id))
        });
        hubs
    }

    pub fn top_by_fan_in(&self, n: usize) -> Vec<&DependencyMetric> {
        self.top_by(n, |m| m.fan_in)
    }

    pub fn top_by_fan_out(&self, n: usize) -> Vec<&DependencyMetric> {
        self.top_by(n, |m| m.fan_out)
    }

    fn top_by(&self, n: usize, key: impl Fn(&DependencyMetric) -> usize) -> Vec<&DependencyMetric> {
        let mut ranked: Vec<&DependencyMetric> =
            self.metrics.iter().filter(|&m| key(m) > 0).collect();
        ranked.sort_by(|&a, &b| {
            key(b)
                .cmp(&key(a))
                .then_with(|| a.function_id.cmp(&b.function_id))
        });
        ranked.truncate(n);
        ranked
    }
}

fn average(total: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}
