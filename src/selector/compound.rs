use std::fmt;

use super::{ComplexSelector, Selector, Span, Specificity};

/// An ordered, non-empty run of simple selectors applying to one element.
///
/// Equality looks only at the simple selectors; span, the line-feed flag, the
/// media scope, and the sources set are all carried data that never affects
/// identity. The media scope is the stringified query of the enclosing
/// `@media` block and is only ever compared for string equality.
#[derive(Clone, Debug, Default)]
pub struct CompoundSelector {
    pub simples: Vec<Selector>,
    pub span: Span,
    pub has_line_feed: bool,
    pub media_scope: Option<String>,
    pub sources: Vec<ComplexSelector>,
}

impl PartialEq for CompoundSelector {
    fn eq(&self, other: &Self) -> bool {
        self.simples == other.simples
    }
}

impl Eq for CompoundSelector {}

impl CompoundSelector {
    pub fn new(simples: Vec<Selector>) -> Self {
        Self { simples, ..Default::default() }
    }

    pub fn len(&self) -> usize {
        self.simples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simples.is_empty()
    }

    pub fn specificity(&self) -> Specificity {
        self.simples.iter().map(Selector::specificity).sum()
    }

    /// The simple selectors rendered to strings, in order. This is the form
    /// the extension table keys on.
    pub fn key_strings(&self) -> Vec<String> {
        self.simples.iter().map(ToString::to_string).collect()
    }

    /// Multiset equality: compound-internal order is ignored.
    pub fn eq_unordered(&self, other: &CompoundSelector) -> bool {
        if self.simples.len() != other.simples.len() {
            return false;
        }
        let mut lhs = self.key_strings();
        let mut rhs = other.key_strings();
        lhs.sort();
        rhs.sort();
        lhs == rhs
    }

    pub fn has_placeholder(&self) -> bool {
        self.simples.iter().any(Selector::is_placeholder)
    }

    /// Records the given selectors as extension sources, skipping ones
    /// already present. Stored sources are themselves stripped of sources so
    /// the sets stay flat.
    pub fn add_sources(&mut self, sources: &[ComplexSelector]) {
        for source in sources {
            if !self.sources.iter().any(|s| s.structurally_equal(source, true)) {
                self.sources.push(source.clone_without_sources());
            }
        }
    }

    /// True when every element matched by `other` is also matched by `self`.
    pub fn is_superselector_of(&self, other: &CompoundSelector) -> bool {
        // a::after never matches what a matches and vice versa
        let mut own_elements: Vec<String> = self
            .simples
            .iter()
            .filter(|s| s.is_pseudo_element())
            .map(ToString::to_string)
            .collect();
        let mut their_elements: Vec<String> = other
            .simples
            .iter()
            .filter(|s| s.is_pseudo_element())
            .map(ToString::to_string)
            .collect();
        own_elements.sort();
        their_elements.sort();
        if own_elements != their_elements {
            return false;
        }

        self.simples.iter().all(|simple| match simple {
            Selector::Type(name) if name == "*" => true,
            Selector::Wrapped { name, inner } => other.simples.iter().any(|theirs| match theirs {
                Selector::Wrapped { name: their_name, inner: their_inner } => {
                    name == their_name
                        && (inner == their_inner || inner.is_superselector_of(their_inner))
                }
                _ => false,
            }),
            _ => other.simples.contains(simple),
        })
    }

    /// Builds a compound matching every element matched by both `self` and
    /// `other`, or `None` when the two can never match the same element.
    ///
    /// The result keeps `self`'s simples first and folds `other`'s in after
    /// them: duplicates are dropped, a type selector stays first, and
    /// pseudo-elements sink to the end. Sources and scope start fresh.
    pub fn unify_with(&self, other: &CompoundSelector) -> Option<CompoundSelector> {
        let mut merged = self.simples.clone();
        for simple in &other.simples {
            merged = unify_simple(simple, merged)?;
        }
        Some(CompoundSelector { simples: merged, span: self.span, ..Default::default() })
    }

    /// Set difference on simple selectors: `self` with every selector that
    /// also appears in `other` removed.
    pub fn minus(&self, other: &CompoundSelector) -> CompoundSelector {
        CompoundSelector {
            simples: self
                .simples
                .iter()
                .filter(|simple| !other.simples.contains(simple))
                .cloned()
                .collect(),
            span: self.span,
            media_scope: self.media_scope.clone(),
            ..Default::default()
        }
    }
}

fn unify_simple(simple: &Selector, mut into: Vec<Selector>) -> Option<Vec<Selector>> {
    if into.contains(simple) {
        return Some(into);
    }
    match simple {
        Selector::Type(name) => {
            if let Some(pos) = into.iter().position(|s| matches!(s, Selector::Type(_))) {
                let Selector::Type(existing) = &into[pos] else { unreachable!() };
                if name == "*" {
                    return Some(into);
                }
                if existing == "*" {
                    into[pos] = simple.clone();
                    return Some(into);
                }
                // two distinct type selectors never match one element
                return None;
            }
            into.insert(0, simple.clone());
            Some(into)
        }
        Selector::Id(_) => {
            if into.iter().any(|s| matches!(s, Selector::Id(_))) {
                return None;
            }
            insert_before_pseudo_elements(&mut into, simple);
            Some(into)
        }
        _ if simple.is_pseudo_element() => {
            if into.iter().any(Selector::is_pseudo_element) {
                return None;
            }
            into.push(simple.clone());
            Some(into)
        }
        _ => {
            insert_before_pseudo_elements(&mut into, simple);
            Some(into)
        }
    }
}

fn insert_before_pseudo_elements(into: &mut Vec<Selector>, simple: &Selector) {
    let pos = into
        .iter()
        .position(Selector::is_pseudo_element)
        .unwrap_or(into.len());
    into.insert(pos, simple.clone());
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for simple in &self.simples {
            write!(f, "{simple}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::CompoundSelector;

    fn compound(input: &str) -> CompoundSelector {
        CompoundSelector::parse(input).unwrap()
    }

    #[test]
    fn superselector_is_subset_of_simples() {
        assert!(compound(".a").is_superselector_of(&compound(".a.b")));
        assert!(!compound(".a.b").is_superselector_of(&compound(".a")));
        assert!(compound(".a").is_superselector_of(&compound(".a")));
        assert!(compound("a.x").is_superselector_of(&compound("a.x.y")));
        assert!(!compound("a").is_superselector_of(&compound("b")));
    }

    #[test]
    fn superselector_requires_matching_pseudo_elements() {
        assert!(!compound("a").is_superselector_of(&compound("a::after")));
        assert!(!compound("a::after").is_superselector_of(&compound("a")));
        assert!(compound("a::after").is_superselector_of(&compound("a.x::after")));
    }

    #[test]
    fn unify_merges_and_dedupes() {
        assert_eq!(compound(".a").unify_with(&compound(".b")).unwrap().to_string(), ".a.b");
        assert_eq!(compound(".a").unify_with(&compound(".a")).unwrap().to_string(), ".a");
        assert_eq!(
            compound(".seriousError").unify_with(&compound(".intro")).unwrap().to_string(),
            ".seriousError.intro"
        );
    }

    #[test]
    fn unify_keeps_type_first_and_pseudo_elements_last() {
        assert_eq!(compound(".x").unify_with(&compound("a")).unwrap().to_string(), "a.x");
        assert_eq!(
            compound("a::before").unify_with(&compound(".x")).unwrap().to_string(),
            "a.x::before"
        );
    }

    #[test]
    fn unify_rejects_conflicts() {
        assert!(compound("a").unify_with(&compound("b")).is_none());
        assert!(compound("#a").unify_with(&compound("#b")).is_none());
        assert!(compound("a::before").unify_with(&compound("a::after")).is_none());
        assert!(compound("*").unify_with(&compound("a")).unwrap().to_string() == "a");
    }

    #[test]
    fn minus_removes_shared_simples() {
        assert_eq!(compound(".a.b.c").minus(&compound(".b")).to_string(), ".a.c");
        assert_eq!(compound(".a").minus(&compound(".a")).to_string(), "");
    }

    #[test]
    fn unordered_equality() {
        assert!(compound(".a.b").eq_unordered(&compound(".b.a")));
        assert!(!compound(".a.b").eq_unordered(&compound(".a.c")));
        assert_ne!(compound(".a.b"), compound(".b.a"));
    }
}
