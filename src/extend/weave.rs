//! Weaving: interleaving complex selectors while preserving combinator
//! semantics.
//!
//! `subweave` merges two selector prefixes into every valid ordering, or
//! reports that the two cannot be merged; `weave` folds it across a path of
//! selectors. A failed merge is normal control flow: the caller just gets
//! fewer permutations.

use std::collections::VecDeque;

use log::trace;

use crate::selector::{parent_superselector, Combinator, ComplexSelector};

use super::lcs::lcs;
use super::node::{complex_to_node, node_eq, node_seq_eq, nodes_to_complex, Node};
use super::seq::{flatten_deep, group_selectors, paths, take_final_ops, take_initial_ops};

/// Takes initial subsequences of both sequences, cut where `stop` first
/// holds, and returns all orderings of the two chunks.
pub(crate) fn chunks<F>(
    seq1: &mut VecDeque<Node>,
    seq2: &mut VecDeque<Node>,
    stop: F,
) -> Vec<Node>
where
    F: Fn(&VecDeque<Node>) -> bool,
{
    let mut chunk1 = Vec::new();
    while !seq1.is_empty() && !stop(seq1) {
        chunk1.push(seq1.pop_front().unwrap());
    }
    let mut chunk2 = Vec::new();
    while !seq2.is_empty() && !stop(seq2) {
        chunk2.push(seq2.pop_front().unwrap());
    }

    match (chunk1.is_empty(), chunk2.is_empty()) {
        (true, true) => Vec::new(),
        (true, false) => vec![Node::Collection(chunk2)],
        (false, true) => vec![Node::Collection(chunk1)],
        (false, false) => {
            let mut first = chunk1.clone();
            first.extend(chunk2.iter().cloned());
            let mut second = chunk2;
            second.extend(chunk1);
            vec![Node::Collection(first), Node::Collection(second)]
        }
    }
}

fn ops_eq(a: &Node, b: &Node) -> Option<Node> {
    node_eq(a, b, true).then(|| a.clone())
}

/// Merges the leading combinators of both sequences. One side's prefix must
/// be a subsequence of the other's; the longer prefix wins.
fn merge_initial_ops(seq1: &mut VecDeque<Node>, seq2: &mut VecDeque<Node>) -> Option<Vec<Node>> {
    let ops1 = take_initial_ops(seq1);
    let ops2 = take_initial_ops(seq2);

    let common = lcs(&ops1, &ops2, &ops_eq);
    if !(node_seq_eq(&common, &ops1, true) || node_seq_eq(&common, &ops2, true)) {
        return None;
    }

    Some(if ops1.len() > ops2.len() { ops1 } else { ops2 })
}

fn unify_wrappers(lhs: &ComplexSelector, rhs: &ComplexSelector) -> Option<Node> {
    let unified = lhs.innermost_head()?.unify_with(rhs.innermost_head()?)?;
    Some(Node::selector(lhs.with_innermost_head(unified)))
}

/// Merges the trailing combinators of both sequences into `res`, handling
/// every pairwise combinator interaction. `None` means the sequences cannot
/// be merged.
fn merge_final_ops(
    seq1: &mut VecDeque<Node>,
    seq2: &mut VecDeque<Node>,
    res: &mut VecDeque<Node>,
) -> Option<()> {
    let ops1 = take_final_ops(seq1);
    let ops2 = take_final_ops(seq2);

    if ops1.is_empty() && ops2.is_empty() {
        return Some(());
    }

    if ops1.len() > 1 || ops2.len() > 1 {
        // multiple trailing combinators only merge when one run is a
        // subsequence of the other
        let common = lcs(&ops1, &ops2, &ops_eq);
        if !(node_seq_eq(&common, &ops1, true) || node_seq_eq(&common, &ops2, true)) {
            return None;
        }
        let longer = if ops1.len() > ops2.len() { ops1 } else { ops2 };
        for op in longer {
            res.push_front(op);
        }
        return Some(());
    }

    use Combinator::{AdjacentSibling, Child, GeneralSibling};

    match (ops1.first(), ops2.first()) {
        (Some(op1), Some(op2)) => {
            let (Node::Combinator(c1), Node::Combinator(c2)) = (op1, op2) else {
                return None;
            };
            let (c1, c2) = (*c1, *c2);
            let sel1 = seq1.pop_back()?;
            let sel2 = seq2.pop_back()?;

            match (c1, c2) {
                (GeneralSibling, GeneralSibling) => {
                    let lhs = sel1.as_selector()?;
                    let rhs = sel2.as_selector()?;
                    if lhs.is_superselector_of(rhs) {
                        res.push_front(Node::Combinator(GeneralSibling));
                        res.push_front(sel2);
                    } else if rhs.is_superselector_of(lhs) {
                        res.push_front(Node::Combinator(GeneralSibling));
                        res.push_front(sel1);
                    } else {
                        let merged = unify_wrappers(lhs, rhs);
                        let mut alternatives = vec![
                            Node::Collection(vec![
                                sel1.clone(),
                                Node::Combinator(GeneralSibling),
                                sel2.clone(),
                                Node::Combinator(GeneralSibling),
                            ]),
                            Node::Collection(vec![
                                sel2,
                                Node::Combinator(GeneralSibling),
                                sel1,
                                Node::Combinator(GeneralSibling),
                            ]),
                        ];
                        if let Some(merged) = merged {
                            alternatives.push(Node::Collection(vec![
                                merged,
                                Node::Combinator(GeneralSibling),
                            ]));
                        }
                        res.push_front(Node::Collection(alternatives));
                    }
                }
                (GeneralSibling, AdjacentSibling) | (AdjacentSibling, GeneralSibling) => {
                    let (tilde_sel, plus_sel) = if c1 == GeneralSibling {
                        (sel1, sel2)
                    } else {
                        (sel2, sel1)
                    };
                    let tilde = tilde_sel.as_selector()?.clone();
                    let plus = plus_sel.as_selector()?.clone();
                    if tilde.is_superselector_of(&plus) {
                        res.push_front(Node::Combinator(AdjacentSibling));
                        res.push_front(plus_sel);
                    } else {
                        let merged = unify_wrappers(&plus, &tilde);
                        let mut alternatives = vec![Node::Collection(vec![
                            tilde_sel,
                            Node::Combinator(GeneralSibling),
                            plus_sel,
                            Node::Combinator(AdjacentSibling),
                        ])];
                        if let Some(merged) = merged {
                            alternatives.push(Node::Collection(vec![
                                merged,
                                Node::Combinator(AdjacentSibling),
                            ]));
                        }
                        res.push_front(Node::Collection(alternatives));
                    }
                }
                (Child, GeneralSibling | AdjacentSibling) => {
                    // the sibling side settles first; the `>` side goes back
                    // for another round
                    res.push_front(Node::Combinator(c2));
                    res.push_front(sel2);
                    seq1.push_back(sel1);
                    seq1.push_back(Node::Combinator(c1));
                }
                (GeneralSibling | AdjacentSibling, Child) => {
                    res.push_front(Node::Combinator(c1));
                    res.push_front(sel1);
                    seq2.push_back(sel2);
                    seq2.push_back(Node::Combinator(c2));
                }
                _ if c1 == c2 => {
                    let merged = unify_wrappers(sel1.as_selector()?, sel2.as_selector()?)?;
                    res.push_front(Node::Combinator(c1));
                    res.push_front(merged);
                }
                _ => return None,
            }
            merge_final_ops(seq1, seq2, res)
        }
        (Some(op1), None) => {
            if matches!(op1, Node::Combinator(Child)) {
                let absorbed = match (
                    seq1.back().and_then(Node::as_selector),
                    seq2.back().and_then(Node::as_selector),
                ) {
                    (Some(last1), Some(last2)) => last2.is_superselector_of(last1),
                    _ => false,
                };
                if absorbed {
                    seq2.pop_back();
                }
            }
            let sel = seq1.pop_back()?;
            res.push_front(op1.clone());
            res.push_front(sel);
            merge_final_ops(seq1, seq2, res)
        }
        (None, Some(op2)) => {
            if matches!(op2, Node::Combinator(Child)) {
                let absorbed = match (
                    seq1.back().and_then(Node::as_selector),
                    seq2.back().and_then(Node::as_selector),
                ) {
                    (Some(last1), Some(last2)) => last1.is_superselector_of(last2),
                    _ => false,
                };
                if absorbed {
                    seq1.pop_back();
                }
            }
            let sel = seq2.pop_back()?;
            res.push_front(op2.clone());
            res.push_front(sel);
            merge_final_ops(seq1, seq2, res)
        }
        (None, None) => Some(()),
    }
}

fn group_complex(group: &Node) -> ComplexSelector {
    nodes_to_complex(group.children())
}

fn lcs_merge(a: &ComplexSelector, b: &ComplexSelector) -> Option<ComplexSelector> {
    if a.structurally_equal(b, true) {
        return Some(a.clone());
    }
    if a.leading_combinator() != Combinator::Descendant
        || b.leading_combinator() != Combinator::Descendant
    {
        return None;
    }
    if parent_superselector(a, b) {
        return Some(b.clone());
    }
    if parent_superselector(b, a) {
        return Some(a.clone());
    }
    None
}

/// Merges two selector sequences into every ordering compatible with both
/// sides' combinators, or `None` when no ordering is.
pub(crate) fn subweave(one: &[Node], two: &[Node]) -> Option<Vec<Vec<Node>>> {
    if one.is_empty() {
        return Some(vec![two.to_vec()]);
    }
    if two.is_empty() {
        return Some(vec![one.to_vec()]);
    }

    let mut seq1: VecDeque<Node> = one.iter().cloned().collect();
    let mut seq2: VecDeque<Node> = two.iter().cloned().collect();

    let init = merge_initial_ops(&mut seq1, &mut seq2)?;

    let mut res = VecDeque::new();
    merge_final_ops(&mut seq1, &mut seq2, &mut res)?;
    let fin: Vec<Node> = res
        .into_iter()
        .map(|node| if node.is_collection() { node } else { Node::Collection(vec![node]) })
        .collect();

    let grouped1 = group_selectors(seq1.make_contiguous());
    let grouped2 = group_selectors(seq2.make_contiguous());

    let conv1: Vec<ComplexSelector> = grouped1.iter().map(group_complex).collect();
    let conv2: Vec<ComplexSelector> = grouped2.iter().map(group_complex).collect();
    let mut seq_lcs: VecDeque<ComplexSelector> = lcs(&conv2, &conv1, &lcs_merge).into();

    let mut group1: VecDeque<Node> = grouped1.into();
    let mut group2: VecDeque<Node> = grouped2.into();

    let mut diff: Vec<Node> = vec![Node::Collection(vec![Node::Collection(init)])];

    while !seq_lcs.is_empty() {
        let front = seq_lcs.front().unwrap().clone();
        let chunked = chunks(&mut group1, &mut group2, |seq| {
            seq.front()
                .is_some_and(|group| parent_superselector(&group_complex(group), &front))
        });
        diff.push(Node::Collection(chunked));
        diff.push(Node::Collection(vec![complex_to_node(&seq_lcs.pop_front().unwrap())]));
        group1.pop_front();
        group2.pop_front();
    }

    let chunked = chunks(&mut group1, &mut group2, VecDeque::is_empty);
    diff.push(Node::Collection(chunked));

    diff.extend(fin);
    diff.retain(|entry| !entry.children().is_empty());

    let choice_lists: Vec<Vec<Node>> = diff.into_iter().map(Node::into_children).collect();
    let woven: Vec<Vec<Node>> = paths(&choice_lists).into_iter().map(flatten_deep).collect();
    trace!("subweave produced {} ordering(s)", woven.len());
    Some(woven)
}

/// Folds `subweave` across a path of selectors, keeping each selector's
/// final element pinned at the end of every prefix built so far. A prefix
/// whose subweave fails is discarded.
pub(crate) fn weave(path: &[Node]) -> Vec<Vec<Node>> {
    let mut befores: Vec<Vec<Node>> = vec![Vec::new()];

    for current_node in path {
        let mut current: Vec<Node> = current_node.children().to_vec();
        if current.is_empty() {
            continue;
        }
        let last = current.pop().unwrap();

        let mut next = Vec::new();
        for before in &befores {
            let Some(orderings) = subweave(before, &current) else {
                continue;
            };
            for mut ordering in orderings {
                ordering.push(last.clone());
                next.push(ordering);
            }
        }
        befores = next;
    }

    befores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extend::node::complex_to_nodes;

    fn nodes(input: &str) -> Vec<Node> {
        complex_to_nodes(&ComplexSelector::parse(input).unwrap())
    }

    fn rendered(result: Option<Vec<Vec<Node>>>) -> Vec<String> {
        result
            .unwrap()
            .iter()
            .map(|seq| nodes_to_complex(seq).to_string())
            .collect()
    }

    #[test]
    fn subweave_with_an_empty_side_returns_the_other() {
        assert_eq!(rendered(subweave(&[], &nodes(".a .b"))), vec![".a .b"]);
        assert_eq!(rendered(subweave(&nodes(".a .b"), &[])), vec![".a .b"]);
    }

    #[test]
    fn subweave_interleaves_unrelated_prefixes() {
        assert_eq!(
            rendered(subweave(&nodes(".a"), &nodes(".b"))),
            vec![".a .b", ".b .a"]
        );
    }

    #[test]
    fn subweave_merges_a_shared_prefix() {
        assert_eq!(rendered(subweave(&nodes(".a"), &nodes(".a"))), vec![".a"]);
        assert_eq!(
            rendered(subweave(&nodes(".x .a"), &nodes(".a"))),
            vec![".x .a"]
        );
    }

    #[test]
    fn subweave_is_symmetric_as_a_set() {
        for (a, b) in [
            (".a", ".b"),
            (".a .b", ".c"),
            (".x .a", ".y .a"),
            (".a > .b", ".c .b"),
        ] {
            let mut forward = rendered(subweave(&nodes(a), &nodes(b)));
            let mut backward = rendered(subweave(&nodes(b), &nodes(a)));
            forward.sort();
            backward.sort();
            assert_eq!(forward, backward, "{a} / {b}");
        }
    }

    #[test]
    fn subweave_fails_on_incompatible_leading_ops() {
        let lhs = vec![Node::Combinator(Combinator::Child), nodes(".a").remove(0)];
        let rhs = vec![
            Node::Combinator(Combinator::GeneralSibling),
            nodes(".a").remove(0),
        ];
        assert!(subweave(&lhs, &rhs).is_none());
    }

    #[test]
    fn subweave_unifies_equal_final_child_ops() {
        // the prefixes weave hands in end with their combinator: `.a >` / `.c >`
        let lhs = vec![nodes(".a").remove(0), Node::Combinator(Combinator::Child)];
        let rhs = vec![nodes(".c").remove(0), Node::Combinator(Combinator::Child)];
        assert_eq!(rendered(subweave(&lhs, &rhs)), vec![".a.c >"]);
    }

    #[test]
    fn subweave_emits_alternatives_for_trailing_tildes() {
        let lhs = vec![nodes(".a").remove(0), Node::Combinator(Combinator::GeneralSibling)];
        let rhs = vec![nodes(".b").remove(0), Node::Combinator(Combinator::GeneralSibling)];
        assert_eq!(
            rendered(subweave(&lhs, &rhs)),
            vec![".a ~ .b ~", ".b ~ .a ~", ".a.b ~"]
        );
    }

    #[test]
    fn subweave_tilde_absorbs_plus() {
        let lhs = vec![nodes(".a").remove(0), Node::Combinator(Combinator::GeneralSibling)];
        let rhs = vec![nodes(".a.b").remove(0), Node::Combinator(Combinator::AdjacentSibling)];
        // `.a ~` covers `.a.b +`, so only the subordinate survives
        assert_eq!(rendered(subweave(&lhs, &rhs)), vec![".a.b +"]);
    }

    #[test]
    fn subweave_absorbs_a_child_prefix_into_a_descendant() {
        let merged = rendered(subweave(&nodes(".c .a > .b"), &nodes(".c .b")));
        assert_eq!(merged, vec![".c .a > .b"]);
    }

    #[test]
    fn weave_of_a_single_selector_is_identity() {
        let path = vec![Node::Collection(nodes(".a .b"))];
        let woven = weave(&path);
        assert_eq!(woven.len(), 1);
        assert_eq!(nodes_to_complex(&woven[0]).to_string(), ".a .b");
    }

    #[test]
    fn weave_pins_the_last_element() {
        let path = vec![
            Node::Collection(nodes(".a")),
            Node::Collection(nodes(".b .c")),
        ];
        let woven: Vec<String> = weave(&path)
            .iter()
            .map(|seq| nodes_to_complex(seq).to_string())
            .collect();
        // `.c` stays last; `.a` and `.b` interleave
        assert_eq!(woven, vec![".a .b .c", ".b .a .c"]);
    }
}
