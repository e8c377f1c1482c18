//! Flame-chart layering of a profile.
//!
//! Layer `d` holds every call at stack depth `d` as a time interval. Calls
//! close in time order, so each layer comes out sorted and non-overlapping
//! without any extra pass. Layer 0 is the session's top-level timeline.
//! Calls with zero duration are left out of every layer.

use crate::parser::schema::{CallEvent, CallNode, Profile};
use log::debug;

/// One call rendered at its depth
#[derive(Debug, Clone, Copy)]
pub struct ChartInterval<'a> {
    /// Start time (microseconds from profile start)
    pub start: u64,

    /// End time (microseconds from profile start)
    pub end: u64,

    /// Call this interval represents
    pub node: &'a CallNode,
}

impl ChartInterval<'_> {
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// All layers of one profile
///
/// **Public** - borrows the profile it was built from
#[derive(Debug)]
pub struct FlameChart<'a> {
    layers: Vec<Vec<ChartInterval<'a>>>,
    total_weight: u64,
}

impl<'a> FlameChart<'a> {
    /// Build the layers of `profile`
    pub fn from_profile(profile: &'a Profile) -> Self {
        let mut layers: Vec<Vec<ChartInterval<'a>>> = Vec::new();
        let mut open: Vec<(&'a CallNode, u64)> = Vec::new();

        profile.for_each_call(|event| match event {
            CallEvent::Open { node, at } => open.push((node, at)),
            CallEvent::Close { at, .. } => {
                let depth = open.len().saturating_sub(1);
                // zero-width calls (instant events) take no room on a layer
                if let Some((node, start)) = open.pop().filter(|&(_, start)| at > start) {
                    if layers.len() <= depth {
                        layers.resize_with(depth + 1, Vec::new);
                    }
                    layers[depth].push(ChartInterval {
                        start,
                        end: at,
                        node,
                    });
                }
            }
        });

        debug!(
            "Flame chart for '{}': {} layers, {} top-level intervals",
            profile.name,
            layers.len(),
            layers.first().map_or(0, Vec::len)
        );

        Self {
            layers,
            total_weight: profile.total_weight(),
        }
    }

    pub fn layers(&self) -> &[Vec<ChartInterval<'a>>] {
        &self.layers
    }

    /// Layer 0; empty when the profile recorded no calls
    pub fn top_level(&self) -> &[ChartInterval<'a>] {
        self.layers.first().map_or(&[], Vec::as_slice)
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_by_depth() {
        let root = CallNode::new("(root)", 0, 100).with_children(vec![
            CallNode::new("a", 0, 40).with_children(vec![
                CallNode::new("b", 5, 10),
                CallNode::new("c", 20, 15),
            ]),
            CallNode::new("d", 60, 30).with_children(vec![CallNode::new("e", 60, 5)
                .with_children(vec![CallNode::new("f", 61, 2)])]),
        ]);
        let profile = Profile::new("p", root);
        let chart = FlameChart::from_profile(&profile);

        assert_eq!(chart.total_weight(), 100);
        assert_eq!(chart.layers().len(), 3);

        let top: Vec<_> = chart
            .top_level()
            .iter()
            .map(|i| (i.node.label.as_str(), i.start, i.end))
            .collect();
        assert_eq!(top, vec![("a", 0, 40), ("d", 60, 90)]);

        let second: Vec<_> = chart.layers()[1].iter().map(|i| i.node.label.as_str()).collect();
        assert_eq!(second, vec!["b", "c", "e"]);
        assert_eq!(chart.layers()[2][0].duration(), 2);
    }

    #[test]
    fn test_zero_width_calls_are_skipped() {
        let root = CallNode::new("(root)", 0, 300).with_children(vec![
            CallNode::new("a", 0, 100),
            CallNode::new("instant", 150, 0)
                .with_children(vec![CallNode::new("nested", 150, 0)]),
            CallNode::new("b", 200, 100).with_children(vec![CallNode::new("mark", 250, 0)]),
        ]);
        let profile = Profile::new("p", root);
        let chart = FlameChart::from_profile(&profile);

        let top: Vec<_> = chart
            .top_level()
            .iter()
            .map(|i| (i.node.label.as_str(), i.start, i.end))
            .collect();
        assert_eq!(top, vec![("a", 0, 100), ("b", 200, 300)]);
        assert_eq!(chart.layers().len(), 1);
    }

    #[test]
    fn test_empty_profile_has_no_top_level() {
        let profile = Profile::new("empty", CallNode::new("(root)", 0, 10));
        let chart = FlameChart::from_profile(&profile);
        assert!(chart.top_level().is_empty());
        assert_eq!(chart.total_weight(), 10);
    }
}
