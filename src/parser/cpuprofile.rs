//! V8 CPU profile (`.cpuprofile`) importer.
//!
//! Recorded by the DevTools JavaScript profiler. The profile is a node table
//! plus a list of sampled leaf nodes and the time between samples; this module
//! replays the samples in time order into a [`CallTreeBuilder`] so that
//! consecutive samples sharing a stack prefix extend the same call instance.

use super::call_tree::{CallTreeBuilder, ROOT_LABEL};
use super::schema::{CallNode, Profile, ProfileGroup};
use crate::utils::error::ImportError;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;

/// Leaf frame that means "nothing was running"
const IDLE_LABEL: &str = "(idle)";

/// Runtime leaves with no JavaScript parent; they interrupt whatever the
/// previous sample was running, so they stack on top of it
const INTERRUPT_LABELS: &[&str] = &["(garbage collector)", "(program)"];

/// V8 CPU profile node.
///
/// Standalone profiles list `children`; profile chunks embedded in timeline
/// captures list `parent` instead.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CpuProfileNode {
    pub id: u64,
    #[serde(rename = "callFrame")]
    pub call_frame: CallFrame,
    #[serde(default)]
    pub children: Vec<u64>,
    #[serde(default)]
    pub parent: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CallFrame {
    #[serde(default, rename = "functionName")]
    pub function_name: String,
}

impl CallFrame {
    fn label(&self) -> &str {
        if self.function_name.is_empty() {
            "(anonymous)"
        } else {
            &self.function_name
        }
    }
}

/// V8 CPU profile top-level structure (.cpuprofile files).
#[derive(Debug, Deserialize)]
struct CpuProfile {
    nodes: Vec<CpuProfileNode>,
    #[serde(rename = "startTime")]
    start_time: f64,
    #[serde(rename = "endTime")]
    end_time: f64,
    #[serde(default)]
    samples: Vec<u64>,
    #[serde(default, rename = "timeDeltas")]
    time_deltas: Vec<f64>,
}

/// Sample stream for one recorded thread, in absolute microseconds
#[derive(Debug, Default)]
pub(crate) struct SampleStream {
    pub nodes: Vec<CpuProfileNode>,
    pub samples: Vec<u64>,
    pub time_deltas: Vec<f64>,
    pub start_time: f64,
    /// Defaults to the last sample timestamp when absent
    pub end_time: Option<f64>,
}

/// Parse a V8 CPU profile into a single-profile group
///
/// **Public** - called by the importer for `.cpuprofile` files
///
/// # Errors
/// * `ImportError::Json` - content is not a CPU profile
/// * `ImportError::InvalidFormat` - the node table is empty
pub fn parse_cpuprofile(file_name: &str, data: &[u8]) -> Result<ProfileGroup, ImportError> {
    let cpu_profile: CpuProfile = serde_json::from_slice(data)?;

    if cpu_profile.nodes.is_empty() {
        return Err(ImportError::InvalidFormat(
            "missing or empty nodes".to_string(),
        ));
    }

    debug!(
        "CPU profile {}: {} nodes, {} samples",
        file_name,
        cpu_profile.nodes.len(),
        cpu_profile.samples.len()
    );

    let stream = SampleStream {
        nodes: cpu_profile.nodes,
        samples: cpu_profile.samples,
        time_deltas: cpu_profile.time_deltas,
        start_time: cpu_profile.start_time,
        end_time: Some(cpu_profile.end_time),
    };

    Ok(ProfileGroup {
        name: file_name.to_string(),
        profiles: vec![Profile::new(file_name, build_from_samples(&stream))],
    })
}

/// Replay a sample stream into a time-ordered call tree
///
/// Sample `i` lasts until sample `i + 1`; the last one lasts until the end
/// time. Time zero is the stream start time.
pub(crate) fn build_from_samples(stream: &SampleStream) -> CallNode {
    let node_map: HashMap<u64, &CpuProfileNode> =
        stream.nodes.iter().map(|n| (n.id, n)).collect();

    let mut parent_map: HashMap<u64, u64> = HashMap::new();
    for node in &stream.nodes {
        for &child_id in &node.children {
            parent_map.insert(child_id, node.id);
        }
        if let Some(parent_id) = node.parent {
            parent_map.insert(node.id, parent_id);
        }
    }

    // Absolute timestamps, then stable-sorted: deltas may be negative.
    let mut timeline: Vec<(f64, u64)> = Vec::with_capacity(stream.samples.len());
    let mut t = stream.start_time;
    for (&sample, &delta) in stream.samples.iter().zip(&stream.time_deltas) {
        t += delta;
        timeline.push((t, sample));
    }
    timeline.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let end_time = stream
        .end_time
        .or_else(|| timeline.last().map(|(ts, _)| *ts))
        .unwrap_or(stream.start_time);

    let mut builder = CallTreeBuilder::new();
    let mut open: Vec<u64> = Vec::new();
    // Stack of the last sample that was neither idle nor an interrupt
    let mut base: Vec<u64> = Vec::new();

    for (ts, sample) in &timeline {
        let at = relative_us(*ts, stream.start_time);
        let leaf_label = node_map
            .get(sample)
            .map_or("", |n| n.call_frame.function_name.as_str());

        let stack = if leaf_label == IDLE_LABEL {
            base.clear();
            Vec::new()
        } else if INTERRUPT_LABELS.contains(&leaf_label) {
            let mut stack = base.clone();
            stack.push(*sample);
            stack
        } else {
            base = sample_stack(*sample, &node_map, &parent_map);
            base.clone()
        };

        let common = open
            .iter()
            .zip(&stack)
            .take_while(|(a, b)| a == b)
            .count();

        for _ in common..open.len() {
            builder.leave_frame(at);
        }
        open.truncate(common);

        for &id in &stack[common..] {
            let label = node_map
                .get(&id)
                .map(|n| n.call_frame.label())
                .unwrap_or("(unknown)");
            builder.enter_frame(label, at);
            open.push(id);
        }
    }

    builder.finish(relative_us(end_time, stream.start_time))
}

/// Stack of node ids from the outermost frame down to the sampled leaf
///
/// The `(root)` node is dropped.
fn sample_stack(
    leaf: u64,
    node_map: &HashMap<u64, &CpuProfileNode>,
    parent_map: &HashMap<u64, u64>,
) -> Vec<u64> {
    let mut stack = Vec::new();
    let mut current = Some(leaf);
    // Bounded by the node count so a malformed parent cycle cannot spin.
    while let Some(id) = current {
        if stack.len() > node_map.len() {
            break;
        }
        let is_root = node_map
            .get(&id)
            .is_some_and(|n| n.call_frame.function_name == ROOT_LABEL);
        if !is_root {
            stack.push(id);
        }
        current = parent_map.get(&id).copied();
    }
    stack.reverse();
    stack
}

fn relative_us(ts: f64, origin: f64) -> u64 {
    let offset = (ts - origin).round();
    if offset > 0.0 {
        offset as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_samples() {
        let json = r#"{
            "nodes": [
                {"id":1,"callFrame":{"functionName":"(root)"},"children":[2,4]},
                {"id":2,"callFrame":{"functionName":"main"},"children":[3]},
                {"id":3,"callFrame":{"functionName":"work"},"children":[]},
                {"id":4,"callFrame":{"functionName":"(idle)"},"children":[]}
            ],
            "startTime": 1000,
            "endTime": 1400,
            "samples": [3, 3, 2, 4],
            "timeDeltas": [0, 100, 100, 100]
        }"#;

        let group = parse_cpuprofile("a.cpuprofile", json.as_bytes()).unwrap();
        assert_eq!(group.profiles.len(), 1);

        let profile = &group.profiles[0];
        assert_eq!(profile.total_duration, 400);

        let top = profile.top_level_calls();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].label, "main");
        assert_eq!(top[0].start, 0);
        assert_eq!(top[0].duration, 300);
        assert_eq!(top[0].children[0].label, "work");
        assert_eq!(top[0].children[0].duration, 200);
    }

    #[test]
    fn repeated_calls_become_separate_instances() {
        let json = r#"{
            "nodes": [
                {"id":1,"callFrame":{"functionName":"(root)"},"children":[2,3]},
                {"id":2,"callFrame":{"functionName":"tick"},"children":[]},
                {"id":3,"callFrame":{"functionName":"(idle)"},"children":[]}
            ],
            "startTime": 0,
            "endTime": 40,
            "samples": [2, 3, 2, 3],
            "timeDeltas": [0, 10, 10, 10]
        }"#;

        let group = parse_cpuprofile("b.cpuprofile", json.as_bytes()).unwrap();
        let top = group.profiles[0].top_level_calls();
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].start, top[0].duration), (0, 10));
        assert_eq!((top[1].start, top[1].duration), (20, 10));
    }

    #[test]
    fn garbage_collection_stays_inside_the_interrupted_call() {
        let json = r#"{
            "nodes": [
                {"id":1,"callFrame":{"functionName":"(root)"},"children":[2,4,5]},
                {"id":2,"callFrame":{"functionName":"_Browser_mainLoop_runner"},"children":[3]},
                {"id":3,"callFrame":{"functionName":"work"},"children":[]},
                {"id":4,"callFrame":{"functionName":"(garbage collector)"},"children":[]},
                {"id":5,"callFrame":{"functionName":"(program)"},"children":[]}
            ],
            "startTime": 0,
            "endTime": 50000,
            "samples": [3, 4, 3, 5, 3],
            "timeDeltas": [0, 10000, 10000, 10000, 10000]
        }"#;

        let group = parse_cpuprofile("gc.cpuprofile", json.as_bytes()).unwrap();
        let top = group.profiles[0].top_level_calls();
        assert_eq!(top.len(), 1);
        assert_eq!((top[0].start, top[0].duration), (0, 50000));

        let runner = &top[0];
        assert_eq!(runner.children.len(), 1);

        let work = &runner.children[0];
        assert_eq!((work.start, work.duration), (0, 50000));
        let interrupts: Vec<(&str, u64, u64)> = work
            .children
            .iter()
            .map(|c| (c.label.as_str(), c.start, c.duration))
            .collect();
        assert_eq!(
            interrupts,
            vec![("(garbage collector)", 10000, 10000), ("(program)", 30000, 10000)]
        );
    }

    #[test]
    fn interrupt_after_idle_is_top_level() {
        let json = r#"{
            "nodes": [
                {"id":1,"callFrame":{"functionName":"(root)"},"children":[2,3,4]},
                {"id":2,"callFrame":{"functionName":"tick"},"children":[]},
                {"id":3,"callFrame":{"functionName":"(idle)"},"children":[]},
                {"id":4,"callFrame":{"functionName":"(garbage collector)"},"children":[]}
            ],
            "startTime": 0,
            "endTime": 30,
            "samples": [2, 3, 4],
            "timeDeltas": [0, 10, 10]
        }"#;

        let group = parse_cpuprofile("idle.cpuprofile", json.as_bytes()).unwrap();
        let top = group.profiles[0].top_level_calls();
        let labels: Vec<&str> = top.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["tick", "(garbage collector)"]);
    }

    #[test]
    fn empty_nodes_errors() {
        let json = r#"{"nodes":[],"startTime":0,"endTime":0,"samples":[],"timeDeltas":[]}"#;
        assert!(parse_cpuprofile("c.cpuprofile", json.as_bytes()).is_err());
    }

    #[test]
    fn anonymous_functions_are_labelled() {
        let frame = CallFrame {
            function_name: String::new(),
        };
        assert_eq!(frame.label(), "(anonymous)");
    }
}
