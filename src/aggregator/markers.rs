//! Marker detection over call subtrees.
//!
//! Mangled symbols embed the names we look for inside longer instantiated
//! names, so matching is a case-sensitive substring test, not equality.

use crate::parser::schema::CallNode;

/// Check whether any call in the subtree (root included) contains `marker`
///
/// **Public** - used for harness detection and per-frame engine detection
///
/// Depth-first pre-order with an explicit stack; stops at the first match.
pub fn contains_marker(root: &CallNode, marker: &str) -> bool {
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.label.contains(marker) {
            return true;
        }
        stack.extend(node.children.iter().rev());
    }

    false
}
