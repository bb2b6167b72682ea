//! Extension of compound and complex selectors.

use log::trace;

use crate::selector::{ComplexSelector, CompoundSelector};
use crate::subset_map::{Extension, SubsetMap};

use super::node::{complex_to_node, complex_to_nodes, node_seq_eq, nodes_to_complex, Node};
use super::seq::{flatten_one, paths};
use super::trim::trim;
use super::weave::weave;

/// Extends one compound selector: every extension whose target is a subset
/// of `compound` contributes the extender with its innermost head unified
/// against what remains of `compound`, recursively re-extended.
///
/// Returns the extended selectors as node sequences; the unextended original
/// is the caller's business.
pub(crate) fn extend_compound(
    compound: &CompoundSelector,
    map: &SubsetMap,
    seen: &[CompoundSelector],
    is_replace: bool,
) -> Vec<Vec<Node>> {
    let entries = map.get(compound);
    if !entries.is_empty() {
        trace!("extending {compound} against {} extension(s)", entries.len());
    }

    // group the hits by extender so several @extends from one selector are
    // consumed in a single step
    let mut groups: Vec<(&ComplexSelector, Vec<&Extension>)> = Vec::new();
    for entry in entries {
        let position = groups
            .iter()
            .position(|(key, _)| key.structurally_equal(&entry.extender, true));
        match position {
            Some(index) => groups[index].1.push(entry),
            None => groups.push((&entry.extender, vec![entry])),
        }
    }

    let mut holder: Vec<(CompoundSelector, ComplexSelector)> = Vec::new();
    for (extender, group) in &groups {
        let extender: &ComplexSelector = extender;
        // the union of everything this extender's targets strip from the
        // compound
        let mut stripped = CompoundSelector::new(Vec::new());
        stripped.span = compound.span;
        for entry in group {
            stripped.simples.extend(entry.target.simples.iter().cloned());
            entry.mark_extended();
        }

        let remainder = compound.minus(&stripped);
        let innermost = extender.innermost_head().cloned().unwrap_or_default();
        let Some(unified) = innermost.unify_with(&remainder) else { continue };
        if unified.is_empty() {
            continue;
        }

        let mut new_selector = extender.with_innermost_head(unified);
        debug_assert!(
            new_selector.sources().is_empty(),
            "extension results must start without sources"
        );

        let mut new_sources = compound.sources.clone();
        if !new_sources.iter().any(|s| s.structurally_equal(extender, true)) {
            new_sources.push((*extender).clone_without_sources());
        }
        new_selector.add_sources(&new_sources);

        holder.push((stripped, new_selector));
    }

    let mut extended: Vec<Vec<Node>> = Vec::new();
    for (stripped, new_selector) in holder {
        if seen.contains(&stripped) {
            continue;
        }
        let mut recurse_seen = seen.to_vec();
        recurse_seen.push(stripped);

        for seq in extend_complex(&new_selector, map, &recurse_seen, is_replace, false) {
            if !extended.iter().any(|existing| node_seq_eq(existing, &seq, false)) {
                extended.push(seq);
            }
        }
    }

    extended
}

/// Extends a complex selector: each compound along the spine becomes a set
/// of choices (the original plus its extensions), and every path through the
/// choices is woven, trimmed, and flattened.
pub(crate) fn extend_complex(
    complex: &ComplexSelector,
    map: &SubsetMap,
    seen: &[CompoundSelector],
    is_replace: bool,
    is_original: bool,
) -> Vec<Vec<Node>> {
    let mut choices_per_position: Vec<Vec<Node>> = Vec::new();

    for node in complex_to_nodes(complex) {
        let Node::Selector(single) = node else {
            // a combinator is its own only choice
            choices_per_position.push(vec![Node::Collection(vec![node])]);
            continue;
        };
        let mut single = *single;
        let head = single.innermost_head().cloned().unwrap_or_default();

        let extended = extend_compound(&head, map, seen, is_replace);

        if is_original && !complex.has_placeholder() {
            single.add_sources(&[complex.clone_without_sources()]);
        }

        // keep the original lineage unless an extension already covers it
        let superseded = extended
            .iter()
            .any(|seq| nodes_to_complex(seq).is_superselector_of(&single));
        let mut choices: Vec<Node> = extended.into_iter().map(Node::Collection).collect();
        if !superseded {
            choices.insert(0, complex_to_node(&single));
        }
        choices_per_position.push(choices);
    }

    let mut weaves: Vec<Node> = Vec::new();
    for path in paths(&choices_per_position) {
        let woven = weave(&path);
        weaves.push(Node::Collection(woven.into_iter().map(Node::Collection).collect()));
    }

    let trimmed = trim(weaves, is_replace);

    flatten_one(trimmed).into_iter().map(Node::into_children).collect()
}
