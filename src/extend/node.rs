//! The uniform node representation the weave passes operate on.
//!
//! Complex selectors are flattened into ragged sequences of selector and
//! combinator nodes so the LCS, chunking, path, and flatten machinery can
//! treat everything alike. Selector nodes wrap a complex selector (usually a
//! single compound) so merge steps can keep using the selector algebra.

use crate::selector::{Combinator, ComplexSelector, SelectorPart, Span};

#[derive(Clone, Debug)]
pub(crate) enum Node {
    Collection(Vec<Node>),
    Selector(Box<ComplexSelector>),
    Combinator(Combinator),
}

impl Node {
    pub fn selector(complex: ComplexSelector) -> Node {
        Node::Selector(Box::new(complex))
    }

    pub fn is_combinator(&self) -> bool {
        matches!(self, Node::Combinator(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Node::Collection(_))
    }

    pub fn as_selector(&self) -> Option<&ComplexSelector> {
        match self {
            Node::Selector(complex) => Some(complex),
            _ => None,
        }
    }

    /// The children of a collection node; leaf nodes have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Collection(children) => children,
            _ => &[],
        }
    }

    pub fn into_children(self) -> Vec<Node> {
        match self {
            Node::Collection(children) => children,
            other => vec![other],
        }
    }
}

pub(crate) fn node_eq(a: &Node, b: &Node, simple_order_dependent: bool) -> bool {
    match (a, b) {
        (Node::Collection(x), Node::Collection(y)) => node_seq_eq(x, y, simple_order_dependent),
        (Node::Selector(x), Node::Selector(y)) => x.structurally_equal(y, simple_order_dependent),
        (Node::Combinator(x), Node::Combinator(y)) => x == y,
        _ => false,
    }
}

pub(crate) fn node_seq_eq(a: &[Node], b: &[Node], simple_order_dependent: bool) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| node_eq(x, y, simple_order_dependent))
}

/// Flattens a complex selector into its node sequence: explicit combinators
/// become combinator nodes, each compound becomes a single-compound selector
/// node.
pub(crate) fn complex_to_nodes(complex: &ComplexSelector) -> Vec<Node> {
    let mut out = Vec::new();
    for part in &complex.parts {
        if part.combinator != Combinator::Descendant {
            out.push(Node::Combinator(part.combinator));
        }
        if let Some(compound) = &part.compound {
            out.push(Node::selector(ComplexSelector::from_compound(compound.clone())));
        }
    }
    out
}

pub(crate) fn complex_to_node(complex: &ComplexSelector) -> Node {
    Node::Collection(complex_to_nodes(complex))
}

/// Rebuilds a complex selector from a node sequence. Nested collections are
/// spliced in place; a trailing combinator becomes a head-less part.
pub(crate) fn nodes_to_complex(seq: &[Node]) -> ComplexSelector {
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending = Combinator::Descendant;
    let mut span: Option<Span> = None;
    push_nodes(seq, &mut parts, &mut pending, &mut span);
    if pending != Combinator::Descendant {
        parts.push(SelectorPart::new(pending, None));
    }
    let mut complex = ComplexSelector::new(parts);
    if let Some(span) = span {
        complex.span = span;
    }
    complex
}

fn push_nodes(
    seq: &[Node],
    parts: &mut Vec<SelectorPart>,
    pending: &mut Combinator,
    span: &mut Option<Span>,
) {
    for node in seq {
        match node {
            Node::Combinator(combinator) => {
                if *pending != Combinator::Descendant {
                    parts.push(SelectorPart::new(*pending, None));
                }
                *pending = *combinator;
            }
            Node::Selector(complex) => {
                if span.is_none() {
                    *span = Some(complex.span);
                }
                for (i, part) in complex.parts.iter().enumerate() {
                    let combinator = if i == 0 && part.combinator == Combinator::Descendant {
                        *pending
                    } else {
                        part.combinator
                    };
                    parts.push(SelectorPart::new(combinator, part.compound.clone()));
                }
                *pending = Combinator::Descendant;
            }
            Node::Collection(children) => push_nodes(children, parts, pending, span),
        }
    }
}
