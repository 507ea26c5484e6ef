use std::cell::RefCell;
use std::collections::HashMap;

use crate::ipa::{PhoneticElement, Transcription};
use crate::types::{Match, Value};

use super::parser::Node;

/// Memo key: node address, repeat count (`None` for alternation) and position.
type StateKey = (usize, Option<usize>, usize);

/// Backtracking evaluation over the non-transparent elements of a
/// transcription. Each step yields candidate end positions in priority
/// order (greedy first). Composite nodes are memoized per position, so a
/// search costs polynomial time in the number of elements.
struct Evaluator<'a> {
    elements: Vec<&'a PhoneticElement>,
    memo: RefCell<HashMap<StateKey, Vec<usize>>>,
}

fn push_unique(out: &mut Vec<usize>, pos: usize) {
    if !out.contains(&pos) {
        out.push(pos);
    }
}

fn key(node: &Node, count: Option<usize>, pos: usize) -> StateKey {
    (node as *const Node as usize, count, pos)
}

impl<'a> Evaluator<'a> {
    fn new(elements: Vec<&'a PhoneticElement>) -> Self {
        Self {
            elements,
            memo: RefCell::new(HashMap::new()),
        }
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn cached(&self, key: StateKey, compute: impl FnOnce() -> Vec<usize>) -> Vec<usize> {
        if let Some(ends) = self.memo.borrow().get(&key) {
            return ends.clone();
        }
        let ends = compute();
        self.memo.borrow_mut().insert(key, ends.clone());
        ends
    }

    fn sequence(&self, nodes: &[Node], pos: usize) -> Vec<usize> {
        let Some((first, rest)) = nodes.split_first() else {
            return vec![pos];
        };
        let mut out = Vec::new();
        for mid in self.node(first, pos) {
            for end in self.sequence(rest, mid) {
                push_unique(&mut out, end);
            }
        }
        out
    }

    fn node(&self, node: &Node, pos: usize) -> Vec<usize> {
        match node {
            Node::Element(matcher) => self
                .elements
                .get(pos)
                .filter(|el| matcher.matches(el))
                .map(|_| vec![pos + 1])
                .unwrap_or_default(),
            Node::Start => if pos == 0 { vec![pos] } else { Vec::new() },
            Node::End => if pos == self.len() { vec![pos] } else { Vec::new() },
            Node::Alt(branches) => self.cached(key(node, None, pos), || {
                let mut out = Vec::new();
                for branch in branches {
                    for end in self.sequence(branch, pos) {
                        push_unique(&mut out, end);
                    }
                }
                out
            }),
            Node::Repeat { node, min, max } => self.repeat(node, *min, *max, 0, pos),
        }
    }

    fn repeat(&self, node: &Node, min: usize, max: Option<usize>, count: usize, pos: usize) -> Vec<usize> {
        // Past the minimum, an unbounded repeat behaves the same for every count.
        let state = if max.is_none() { count.min(min) } else { count };
        self.cached(key(node, Some(state), pos), || {
            let mut out = Vec::new();
            let ends = if max.map_or(true, |m| count < m) {
                self.node(node, pos)
            } else {
                Vec::new()
            };
            for &end in ends.iter().filter(|e| **e != pos) {
                for next in self.repeat(node, min, max, count + 1, end) {
                    push_unique(&mut out, next);
                }
            }
            if count >= min || ends.contains(&pos) {
                push_unique(&mut out, pos);
            }
            out
        })
    }
}

fn view(t: &Transcription) -> (Vec<usize>, Evaluator<'_>) {
    let indices: Vec<usize> = t
        .elements()
        .iter()
        .enumerate()
        .filter(|(_, el)| !el.is_transparent())
        .map(|(i, _)| i)
        .collect();
    let elements = indices.iter().map(|i| &t.elements()[*i]).collect();
    (indices, Evaluator::new(elements))
}

/// Leftmost, non-overlapping, non-empty matches in element coordinates.
pub(super) fn find(root: &Node, t: &Transcription) -> Vec<Match> {
    let (indices, eval) = view(t);
    let mut out = Vec::new();
    let mut start = 0;
    while start < eval.len() {
        let end = eval
            .node(root, start)
            .into_iter()
            .find(|end| *end > start);
        match end {
            Some(end) => {
                let first = indices[start];
                let last = indices[end - 1] + 1;
                out.push(Match {
                    start: first,
                    end: last,
                    value: Value::Transcription(t.subsection(first..last)),
                });
                start = end;
            }
            None => start += 1,
        }
    }
    out
}

pub(super) fn full_match(root: &Node, t: &Transcription) -> bool {
    let (_, eval) = view(t);
    eval.node(root, 0).contains(&eval.len())
}
