//! Incremental construction of time-ordered call trees.
//!
//! Both capture formats reduce to a stream of "frame entered at t" and
//! "frame left at t" events. Every open frame is the last child of the open
//! frame above it, so the open path is always the chain of last children
//! starting at the root and no parent pointers are needed.

use super::schema::CallNode;
use log::warn;

/// Label of the synthetic root owned by every profile
pub const ROOT_LABEL: &str = "(root)";

/// Builds a [`CallNode`] tree from enter/leave events
///
/// **Public** - used by the cpuprofile and timeline importers
#[derive(Debug)]
pub struct CallTreeBuilder {
    root: CallNode,
    open_depth: usize,
    last_value: u64,
}

impl Default for CallTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CallTreeBuilder {
    pub fn new() -> Self {
        Self {
            root: CallNode::new(ROOT_LABEL, 0, 0),
            open_depth: 0,
            last_value: 0,
        }
    }

    /// Number of frames currently open
    pub fn depth(&self) -> usize {
        self.open_depth
    }

    /// Open a new call under the innermost open frame
    ///
    /// Values earlier than the last seen event are clamped forward so that
    /// siblings never overlap.
    pub fn enter_frame(&mut self, label: impl Into<String>, at: u64) {
        let at = at.max(self.last_value);
        self.last_value = at;

        let parent = self.innermost_open();
        parent.children.push(CallNode::new(label, at, 0));
        self.open_depth += 1;
    }

    /// Close the innermost open frame
    ///
    /// Returns false (and changes nothing) when no frame is open.
    pub fn leave_frame(&mut self, at: u64) -> bool {
        if self.open_depth == 0 {
            warn!("Ignoring frame exit at {}us with no open frame", at);
            return false;
        }

        let at = at.max(self.last_value);
        self.last_value = at;

        let node = self.innermost_open();
        node.duration = at.saturating_sub(node.start);
        self.open_depth -= 1;
        true
    }

    /// Close every open frame at `end` and return the finished root
    ///
    /// The root spans `[0, end]`, or up to the last event if that is later.
    pub fn finish(mut self, end: u64) -> CallNode {
        while self.open_depth > 0 {
            self.leave_frame(end);
        }

        let mut root = std::mem::replace(&mut self.root, CallNode::new(ROOT_LABEL, 0, 0));
        root.duration = end.max(self.last_value);
        root
    }

    fn innermost_open(&mut self) -> &mut CallNode {
        let mut node = &mut self.root;
        for _ in 0..self.open_depth {
            let len = node.children.len();
            if len == 0 {
                break;
            }
            node = &mut node.children[len - 1];
        }
        node
    }
}
