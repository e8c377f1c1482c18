//! Inclusive-time aggregation for named update functions.
//!
//! The update pattern targets a family of per-tick entry points
//! (`CommonUpdate<Update>`, `CommonUpdate<LateUpdate>`, ...). Once one is
//! found, everything nested under it is already part of its inclusive time,
//! so the walk does not descend further into it.

use crate::parser::schema::CallNode;
use log::trace;
use std::collections::BTreeMap;

/// Sum inclusive durations of matching calls, keyed by exact label
///
/// **Public** - builds the per-frame metric map
///
/// # Arguments
/// * `root` - subtree to search (one top-level call)
/// * `pattern` - substring identifying the functions of interest
///
/// # Returns
/// Label -> summed inclusive microseconds. Empty if nothing matches.
///
/// A matching call stops the descent into its own subtree; non-matching
/// calls are searched to arbitrary depth.
pub fn aggregate_by_name(root: &CallNode, pattern: &str) -> BTreeMap<String, u64> {
    let mut weights: BTreeMap<String, u64> = BTreeMap::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.label.contains(pattern) {
            *weights.entry(node.label.clone()).or_insert(0) += node.duration;
            continue;
        }
        stack.extend(node.children.iter().rev());
    }

    trace!("Aggregated {} update function(s) under '{}'", weights.len(), root.label);

    weights
}
