//! Chrome DevTools performance timeline (`.json`) importer.
//!
//! A timeline capture records every thread of every process. Two event
//! families carry call information:
//! - `Profile` / `ProfileChunk`: the sampled JavaScript profiler, chunked per
//!   thread. Preferred when present, and replayed like a `.cpuprofile`.
//! - `X` (complete) and `B` / `E` (begin / end) duration events, nested per
//!   thread into a call tree.
//!
//! Each thread becomes one [`Profile`] named after its `thread_name`
//! metadata, so callers can pick e.g. the renderer main thread by name.

use super::call_tree::CallTreeBuilder;
use super::cpuprofile::{build_from_samples, CpuProfileNode, SampleStream};
use super::schema::{CallNode, Profile, ProfileGroup};
use crate::utils::error::ImportError;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Raw Chrome trace event as found in DevTools JSON exports.
#[derive(Debug, Clone, Deserialize)]
struct TraceEvent {
    #[serde(default)]
    name: String,
    #[serde(default)]
    ph: String,
    #[serde(default)]
    ts: f64,
    #[serde(default)]
    dur: Option<f64>,
    #[serde(default)]
    pid: u64,
    #[serde(default)]
    tid: u64,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    args: Option<serde_json::Value>,
}

/// Top-level Chrome trace JSON: either an array or an object with `traceEvents`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TraceFile {
    Object {
        #[serde(rename = "traceEvents")]
        trace_events: Vec<TraceEvent>,
    },
    Array(Vec<TraceEvent>),
}

/// (pid, tid)
type ThreadKey = (u64, u64);

/// Sampled profile reassembled from its chunks
#[derive(Debug, Default)]
struct ChunkedProfile {
    thread: ThreadKey,
    stream: SampleStream,
}

/// A duration span on one thread, in absolute microseconds
#[derive(Debug, Clone)]
struct Span {
    name: String,
    start: f64,
    end: f64,
}

/// Parse a DevTools timeline capture into one profile per recorded thread
///
/// **Public** - called by the importer for `.json` files
///
/// # Errors
/// * `ImportError::Json` - content is not a trace event file
/// * `ImportError::InvalidFormat` - no thread carries call information
pub fn parse_timeline(file_name: &str, data: &[u8]) -> Result<ProfileGroup, ImportError> {
    let trace_file: TraceFile = serde_json::from_slice(data)?;
    let events = match trace_file {
        TraceFile::Object { trace_events } => trace_events,
        TraceFile::Array(events) => events,
    };

    debug!("Timeline {}: {} trace events", file_name, events.len());

    let thread_names = collect_thread_names(&events);

    let chunked = collect_profile_chunks(&events);
    let profiles = if chunked.is_empty() {
        profiles_from_duration_events(&events, &thread_names)
    } else {
        debug!("Using {} sampled profile(s) from ProfileChunk events", chunked.len());
        chunked
            .into_values()
            .map(|chunked| {
                let root = build_from_samples(&chunked.stream);
                Profile::new(thread_label(chunked.thread, &thread_names), root)
            })
            .collect()
    };

    if profiles.is_empty() {
        return Err(ImportError::InvalidFormat(
            "timeline contains no profile or duration events".to_string(),
        ));
    }

    Ok(ProfileGroup {
        name: file_name.to_string(),
        profiles,
    })
}

fn collect_thread_names(events: &[TraceEvent]) -> HashMap<ThreadKey, String> {
    events
        .iter()
        .filter(|e| e.ph == "M" && e.name == "thread_name")
        .filter_map(|e| {
            let name = e.args.as_ref()?.get("name")?.as_str()?;
            Some(((e.pid, e.tid), name.to_string()))
        })
        .collect()
}

fn thread_label(key: ThreadKey, thread_names: &HashMap<ThreadKey, String>) -> String {
    let (pid, tid) = key;
    match thread_names.get(&key) {
        Some(name) => format!("{} (pid {}, tid {})", name, pid, tid),
        None => format!("Thread (pid {}, tid {})", pid, tid),
    }
}

/// Profile ids are hex strings in current Chrome builds and numbers in old ones
fn event_id(event: &TraceEvent) -> String {
    match &event.id {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn collect_profile_chunks(events: &[TraceEvent]) -> BTreeMap<(u64, String), ChunkedProfile> {
    let mut profiles: BTreeMap<(u64, String), ChunkedProfile> = BTreeMap::new();

    for event in events {
        let key = (event.pid, event_id(event));
        let data = event.args.as_ref().and_then(|a| a.get("data"));

        match event.name.as_str() {
            "Profile" => {
                let profile = profiles.entry(key).or_default();
                profile.thread = (event.pid, event.tid);
                profile.stream.start_time = data
                    .and_then(|d| d.get("startTime"))
                    .and_then(|v| v.as_f64())
                    .unwrap_or(event.ts);
            }
            "ProfileChunk" => {
                let Some(data) = data else {
                    continue;
                };
                let profile = profiles.entry(key).or_default();
                if profile.thread == (0, 0) {
                    profile.thread = (event.pid, event.tid);
                }
                append_chunk(&mut profile.stream, data);
            }
            _ => {}
        }
    }

    profiles.retain(|_, p| !p.stream.samples.is_empty());
    profiles
}

fn append_chunk(stream: &mut SampleStream, data: &serde_json::Value) {
    let cpu_profile = data.get("cpuProfile");

    if let Some(nodes) = cpu_profile.and_then(|c| c.get("nodes")).and_then(|n| n.as_array()) {
        for node in nodes {
            match serde_json::from_value::<CpuProfileNode>(node.clone()) {
                Ok(node) => stream.nodes.push(node),
                Err(e) => warn!("Skipping malformed profile node: {}", e),
            }
        }
    }

    if let Some(samples) = cpu_profile
        .and_then(|c| c.get("samples"))
        .and_then(|s| s.as_array())
    {
        stream.samples.extend(samples.iter().filter_map(|s| s.as_u64()));
    }

    let deltas = data
        .get("timeDeltas")
        .or_else(|| cpu_profile.and_then(|c| c.get("timeDeltas")))
        .and_then(|d| d.as_array());
    if let Some(deltas) = deltas {
        stream.time_deltas.extend(deltas.iter().filter_map(|d| d.as_f64()));
    }
}

fn profiles_from_duration_events(
    events: &[TraceEvent],
    thread_names: &HashMap<ThreadKey, String>,
) -> Vec<Profile> {
    let mut spans: BTreeMap<ThreadKey, Vec<Span>> = BTreeMap::new();
    let mut open: HashMap<ThreadKey, Vec<(String, f64)>> = HashMap::new();

    let mut ordered: Vec<&TraceEvent> = events
        .iter()
        .filter(|e| matches!(e.ph.as_str(), "X" | "B" | "E"))
        .collect();
    ordered.sort_by(|a, b| a.ts.partial_cmp(&b.ts).unwrap_or(std::cmp::Ordering::Equal));

    for event in ordered {
        let key = (event.pid, event.tid);
        match event.ph.as_str() {
            "X" => {
                let dur = event.dur.unwrap_or(0.0).max(0.0);
                spans.entry(key).or_default().push(Span {
                    name: event.name.clone(),
                    start: event.ts,
                    end: event.ts + dur,
                });
            }
            "B" => open
                .entry(key)
                .or_default()
                .push((event.name.clone(), event.ts)),
            "E" => match open.get_mut(&key).and_then(|stack| stack.pop()) {
                Some((name, start)) => spans.entry(key).or_default().push(Span {
                    name,
                    start,
                    end: event.ts,
                }),
                None => warn!("Unmatched end event '{}' on tid {}", event.name, event.tid),
            },
            _ => {}
        }
    }

    spans
        .into_iter()
        .filter(|(_, spans)| !spans.is_empty())
        .map(|(key, spans)| Profile::new(thread_label(key, thread_names), nest_spans(spans)))
        .collect()
}

/// Nest one thread's spans into a call tree
///
/// Spans are ordered by start, longest first, so a parent is always entered
/// before the spans it contains. A child overhanging its parent is cut at
/// the parent's end.
fn nest_spans(mut spans: Vec<Span>) -> CallNode {
    spans.sort_by(|a, b| {
        a.start
            .partial_cmp(&b.start)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.end.partial_cmp(&a.end).unwrap_or(std::cmp::Ordering::Equal))
    });

    let origin = spans.first().map(|s| s.start).unwrap_or(0.0);
    let to_us = |ts: f64| -> u64 {
        let offset = (ts - origin).round();
        if offset > 0.0 {
            offset as u64
        } else {
            0
        }
    };

    let mut builder = CallTreeBuilder::new();
    let mut open_ends: Vec<u64> = Vec::new();
    let mut last_end = 0;

    for span in spans {
        let start = to_us(span.start);
        while let Some(&end) = open_ends.last() {
            if end > start {
                break;
            }
            builder.leave_frame(end);
            open_ends.pop();
        }

        let mut end = to_us(span.end).max(start);
        if let Some(&parent_end) = open_ends.last() {
            end = end.min(parent_end);
        }
        last_end = last_end.max(end);

        builder.enter_frame(span.name, start);
        open_ends.push(end);
    }

    while let Some(end) = open_ends.pop() {
        builder.leave_frame(end);
    }

    builder.finish(last_end)
}
