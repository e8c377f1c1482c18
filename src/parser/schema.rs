//! In-memory call tree model shared by the importers and the analysis.
//!
//! Importers build one [`Profile`] per recorded thread. Each profile owns a
//! synthetic root whose children are the top-level calls in time order; every
//! node owns its children. The tree is read-only once import finishes.

/// One call instance in a time-ordered call tree
#[derive(Debug, PartialEq, Eq)]
pub struct CallNode {
    /// Function label, possibly a mangled/templated symbol
    pub label: String,

    /// Start offset from the profile start (microseconds)
    pub start: u64,

    /// Inclusive duration including all descendants (microseconds)
    pub duration: u64,

    /// Callees in time order
    pub children: Vec<CallNode>,
}

impl CallNode {
    pub fn new(label: impl Into<String>, start: u64, duration: u64) -> Self {
        Self {
            label: label.into(),
            start,
            duration,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<CallNode>) -> Self {
        self.children = children;
        self
    }

    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.duration)
    }
}

// Call depth in field captures can be very large; tear trees down without
// recursing once per level.
impl Drop for CallNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// A single thread's reconstructed call tree
#[derive(Debug)]
pub struct Profile {
    /// Display name, e.g. `CrRendererMain (pid 12, tid 7)`
    pub name: String,

    /// Session length (microseconds)
    pub total_duration: u64,

    /// Synthetic root; its children are the top-level calls
    pub root: CallNode,
}

impl Profile {
    pub fn new(name: impl Into<String>, root: CallNode) -> Self {
        Self {
            name: name.into(),
            total_duration: root.duration,
            root,
        }
    }

    pub fn total_weight(&self) -> u64 {
        self.total_duration
    }

    pub fn top_level_calls(&self) -> &[CallNode] {
        &self.root.children
    }

    /// Visit every call in time order
    ///
    /// A call's `Open` event fires when it starts and its `Close` event when it
    /// ends, so callees open and close strictly inside their caller. The
    /// synthetic root is not reported.
    pub fn for_each_call<'a>(&'a self, mut visit: impl FnMut(CallEvent<'a>)) {
        enum Step<'n> {
            Enter(&'n CallNode),
            Exit(&'n CallNode),
        }

        let mut stack: Vec<Step<'a>> = self.root.children.iter().rev().map(Step::Enter).collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(node) => {
                    visit(CallEvent::Open {
                        node,
                        at: node.start,
                    });
                    stack.push(Step::Exit(node));
                    stack.extend(node.children.iter().rev().map(Step::Enter));
                }
                Step::Exit(node) => visit(CallEvent::Close {
                    node,
                    at: node.end(),
                }),
            }
        }
    }

    /// Human-readable rendering of a microsecond value
    pub fn format_value(&self, value_us: u64) -> String {
        if value_us >= 1_000_000 {
            format!("{:.2}s", value_us as f64 / 1e6)
        } else if value_us >= 1_000 {
            format!("{:.2}ms", value_us as f64 / 1e3)
        } else {
            format!("{}µs", value_us)
        }
    }
}

/// Event reported by [`Profile::for_each_call`]
#[derive(Debug, Clone, Copy)]
pub enum CallEvent<'a> {
    Open { node: &'a CallNode, at: u64 },
    Close { node: &'a CallNode, at: u64 },
}

/// All profiles imported from one capture file
#[derive(Debug)]
pub struct ProfileGroup {
    /// Source file name
    pub name: String,

    pub profiles: Vec<Profile>,
}
