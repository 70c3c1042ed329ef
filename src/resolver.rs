//! Loop boundary resolution.

use std::collections::HashMap;

use tracing::trace;

use crate::source::Op;

/// How the partner of a `[` is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Scan to the end of the stream; the last close seen at depth zero wins.
    #[default]
    Greedy,
    /// Stop at the first close seen at depth zero.
    Nearest,
}

/// Find the close matching the open at `start`, scanning to stream end.
///
/// Opens after `start` raise the nesting depth and closes at positive depth
/// lower it. Every close met at depth zero replaces the current candidate,
/// so with trailing stray closes the last one is returned. Returns 0 when
/// no candidate is found.
pub fn find_match(stream: &[Op], start: usize) -> usize {
    let mut end = 0;
    let mut depth = 0usize;

    for (i, op) in stream.iter().enumerate().skip(start + 1) {
        match op {
            Op::LoopOpen => depth += 1,
            Op::LoopClose if depth == 0 => end = i,
            Op::LoopClose => depth -= 1,
            _ => {}
        }
    }

    end
}

/// Like [`find_match`] but stops at the first depth-zero close.
pub fn find_match_balanced(stream: &[Op], start: usize) -> usize {
    let mut depth = 0usize;

    for (i, op) in stream.iter().enumerate().skip(start + 1) {
        match op {
            Op::LoopOpen => depth += 1,
            Op::LoopClose if depth == 0 => return i,
            Op::LoopClose => depth -= 1,
            _ => {}
        }
    }

    0
}

/// Memoizing front for the resolvers. Results depend only on the stream and
/// the start index, so each open is scanned at most once per run.
#[derive(Debug, Default)]
pub struct LoopResolver {
    policy: MatchPolicy,
    cache: HashMap<usize, usize>,
}

impl LoopResolver {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy, cache: HashMap::new() }
    }

    /// Matching close for the open at `start`, or `None` if there is none.
    pub fn resolve(&mut self, stream: &[Op], start: usize) -> Option<usize> {
        let policy = self.policy;
        let end = *self.cache.entry(start).or_insert_with(|| {
            let end = match policy {
                MatchPolicy::Greedy => find_match(stream, start),
                MatchPolicy::Nearest => find_match_balanced(stream, start),
            };
            trace!(start, end, ?policy, "resolved loop boundary");
            end
        });

        (end > start).then_some(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DEFAULT_COMMENT, Program};

    fn ops(code: &str) -> Vec<Op> {
        Program::parse(code, DEFAULT_COMMENT).unwrap().ops().to_vec()
    }

    #[test]
    fn simple_loop() {
        assert_eq!(find_match(&ops("+++[-]"), 3), 5);
    }

    #[test]
    fn nested_loop_from_outer_open() {
        let stream = ops("[[-]-]");
        assert_eq!(find_match(&stream, 0), 5);
        assert_eq!(find_match_balanced(&stream, 0), 5);
    }

    #[test]
    fn sibling_depth_zero_closes_pick_the_last() {
        // Two closes at depth zero after a single open.
        let stream = ops("[-]]");
        assert_eq!(find_match(&stream, 0), 3);
        assert_eq!(find_match_balanced(&stream, 0), 2);
    }

    #[test]
    fn inner_open_runs_on_to_enclosing_close() {
        let stream = ops("[[-]-]");
        assert_eq!(find_match(&stream, 1), 5);
        assert_eq!(find_match_balanced(&stream, 1), 3);
    }

    #[test]
    fn sequential_loops_resolve_independently() {
        let stream = ops("[-][-]");
        assert_eq!(find_match(&stream, 0), 2);
        assert_eq!(find_match(&stream, 3), 5);
    }

    #[test]
    fn missing_close_yields_zero() {
        assert_eq!(find_match(&ops("[+"), 0), 0);
        assert_eq!(find_match(&ops("["), 0), 0);
        assert_eq!(find_match_balanced(&ops("[[]"), 0), 0);
    }

    #[test]
    fn resolver_is_memoized_and_stable() {
        let stream = ops("+[>+<-]");
        let mut resolver = LoopResolver::new(MatchPolicy::Greedy);
        assert_eq!(resolver.resolve(&stream, 1), Some(6));
        assert_eq!(resolver.resolve(&stream, 1), Some(6));
        assert_eq!(resolver.cache.len(), 1);
    }

    #[test]
    fn resolver_maps_zero_to_none() {
        let stream = ops("[");
        let mut resolver = LoopResolver::new(MatchPolicy::Nearest);
        assert_eq!(resolver.resolve(&stream, 0), None);
    }
}
