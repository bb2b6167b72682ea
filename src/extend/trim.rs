//! The Second Law of Extend: a generated selector's specificity must never
//! drop below that of the extender that produced it.
//!
//! `trim` removes candidates that some other group covers with equal or
//! greater specificity. Comparisons run against the progressively trimmed
//! result so two identical selectors in different groups cannot eliminate
//! each other.

use log::trace;

use super::node::{nodes_to_complex, Node};

/// Cap past which trimming is skipped outright; the pass is quadratic in the
/// number of groups.
const TRIM_GROUP_LIMIT: usize = 100;

pub(crate) fn trim(groups: Vec<Node>, is_replace: bool) -> Vec<Node> {
    if groups.len() > TRIM_GROUP_LIMIT {
        return groups;
    }

    let mut result: Vec<Vec<Node>> = groups.iter().map(|group| group.children().to_vec()).collect();

    for (index, group) in groups.iter().enumerate() {
        let mut kept = Vec::new();
        for seq in group.children() {
            let candidate = nodes_to_complex(seq.children());

            let mut max_specificity = if is_replace { candidate.specificity() } else { 0 };
            for source in candidate.sources() {
                max_specificity = max_specificity.max(source.specificity());
            }

            let dominated = result.iter().enumerate().any(|(other_index, other_group)| {
                other_index != index
                    && other_group.iter().any(|other_seq| {
                        let other = nodes_to_complex(other_seq.children());
                        other.specificity() >= max_specificity
                            && other.is_superselector_of(&candidate)
                    })
            });

            if dominated {
                trace!("trimmed {candidate}");
            } else {
                kept.push(seq.clone());
            }
        }
        result[index] = kept;
    }

    result.into_iter().map(Node::Collection).collect()
}
