//! Sequence utilities shared by the weave passes.

use std::collections::VecDeque;

use super::node::Node;

/// Partitions a flat node sequence into groups of `[combinator*, selector]`
/// (or trailing `[combinator+]`): a group keeps growing while either its last
/// element or the next element is a combinator.
pub(crate) fn group_selectors(seq: &[Node]) -> Vec<Node> {
    let mut tail: VecDeque<Node> = seq.iter().cloned().collect();
    let mut groups = Vec::new();
    while let Some(first) = tail.pop_front() {
        let mut head = vec![first];
        while !tail.is_empty()
            && (head.last().is_some_and(Node::is_combinator)
                || tail.front().is_some_and(Node::is_combinator))
        {
            head.push(tail.pop_front().unwrap());
        }
        groups.push(Node::Collection(head));
    }
    groups
}

/// Splits the leading combinators off the front of `seq`.
pub(crate) fn take_initial_ops(seq: &mut VecDeque<Node>) -> Vec<Node> {
    let mut ops = Vec::new();
    while seq.front().is_some_and(Node::is_combinator) {
        ops.push(seq.pop_front().unwrap());
    }
    ops
}

/// Splits the trailing combinators off the back of `seq`, innermost first.
pub(crate) fn take_final_ops(seq: &mut VecDeque<Node>) -> Vec<Node> {
    let mut ops = Vec::new();
    while seq.back().is_some_and(Node::is_combinator) {
        ops.push(seq.pop_back().unwrap());
    }
    ops
}

/// Cartesian product preserving order: one pick from each choice list.
pub(crate) fn paths<T: Clone>(choices: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut acc: Vec<Vec<T>> = vec![Vec::new()];
    for options in choices {
        let mut next = Vec::with_capacity(acc.len() * options.len());
        for path in &acc {
            for option in options {
                let mut extended = path.clone();
                extended.push(option.clone());
                next.push(extended);
            }
        }
        acc = next;
    }
    acc
}

/// Splices nested collections all the way down.
pub(crate) fn flatten_deep(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            Node::Collection(children) => out.extend(flatten_deep(children)),
            other => out.push(other),
        }
    }
    out
}

/// Splices one level of nested collections.
pub(crate) fn flatten_one(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            Node::Collection(children) => out.extend(children),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extend::node::complex_to_nodes;
    use crate::selector::{Combinator, ComplexSelector};

    fn nodes(input: &str) -> Vec<Node> {
        complex_to_nodes(&ComplexSelector::parse(input).unwrap())
    }

    #[test]
    fn groups_break_only_between_adjacent_selectors() {
        // combinators glue their neighbors into one group: [.a > .b], [.c]
        let groups = group_selectors(&nodes(".a > .b .c"));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].children().len(), 3);
        assert!(groups[0].children()[1].is_combinator());
        assert_eq!(groups[1].children().len(), 1);

        let groups = group_selectors(&nodes(".a .b"));
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn takes_leading_and_trailing_ops() {
        let mut seq: VecDeque<Node> = vec![
            Node::Combinator(Combinator::Child),
            nodes(".a").remove(0),
            Node::Combinator(Combinator::GeneralSibling),
            Node::Combinator(Combinator::Child),
        ]
        .into();
        let initial = take_initial_ops(&mut seq);
        assert_eq!(initial.len(), 1);
        let fin = take_final_ops(&mut seq);
        // innermost first
        assert_eq!(fin.len(), 2);
        assert!(matches!(fin[0], Node::Combinator(Combinator::Child)));
        assert!(matches!(fin[1], Node::Combinator(Combinator::GeneralSibling)));
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn paths_is_the_cartesian_product() {
        let product = paths(&[vec![1, 2], vec![3], vec![4, 5]]);
        assert_eq!(product, vec![
            vec![1, 3, 4],
            vec![1, 3, 5],
            vec![2, 3, 4],
            vec![2, 3, 5],
        ]);
        assert_eq!(paths::<u32>(&[]), vec![Vec::<u32>::new()]);
    }

    #[test]
    fn flatten_depths() {
        let nested = vec![Node::Collection(vec![
            Node::Collection(nodes(".a")),
            Node::Combinator(Combinator::Child),
        ])];
        let one = flatten_one(nested.clone());
        assert_eq!(one.len(), 2);
        assert!(one[0].is_collection());
        let deep = flatten_deep(nested);
        assert_eq!(deep.len(), 2);
        assert!(deep[0].as_selector().is_some());
    }
}
