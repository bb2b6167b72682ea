//! The extension table.
//!
//! Built by the pass that collects `@extend` directives (a collaborator of
//! this crate) and read-only during extension, except for the monotonic
//! `extended` mark that feeds the end-of-document diagnostics.

use std::cell::Cell;
use std::collections::HashMap;

use crate::selector::{ComplexSelector, CompoundSelector, Span};

/// One `@extend` directive: `extender { @extend target }`.
///
/// `media_query` is the stringified query of the `@media` block the directive
/// was written in, if any; scope checks compare these strings for equality.
#[derive(Clone, Debug)]
pub struct Extension {
    pub extender: ComplexSelector,
    pub target: CompoundSelector,
    pub is_optional: bool,
    pub media_query: Option<String>,
    pub span: Span,
    extended: Cell<bool>,
}

impl Extension {
    pub fn new(extender: ComplexSelector, target: CompoundSelector) -> Self {
        Self {
            extender,
            target,
            is_optional: false,
            media_query: None,
            span: Span::default(),
            extended: Cell::new(false),
        }
    }

    /// Marks this extension as `!optional`.
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// Records the media query of the block the directive appears in.
    pub fn in_media(mut self, query: &str) -> Self {
        self.media_query = Some(query.to_string());
        self
    }

    /// Records the directive's source position.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Whether any selector has consumed this extension.
    pub fn was_extended(&self) -> bool {
        self.extended.get()
    }

    pub(crate) fn mark_extended(&self) {
        self.extended.set(true);
    }
}

/// Maps extend-target compounds to their extensions, with subset lookup:
/// `get` returns every extension whose target's simples are all present in
/// the queried compound.
#[derive(Debug, Default)]
pub struct SubsetMap {
    entries: Vec<Extension>,
    index: HashMap<String, Vec<usize>>,
}

impl SubsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, extension: Extension) {
        let idx = self.entries.len();
        for key in extension.target.key_strings() {
            self.index.entry(key).or_default().push(idx);
        }
        self.entries.push(extension);
    }

    /// Every extension whose target is a subset of `compound`, in insertion
    /// order.
    pub fn get(&self, compound: &CompoundSelector) -> Vec<&Extension> {
        let keys = compound.key_strings();
        let mut candidates: Vec<usize> = keys
            .iter()
            .filter_map(|key| self.index.get(key))
            .flatten()
            .copied()
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        candidates
            .into_iter()
            .map(|idx| &self.entries[idx])
            .filter(|extension| {
                extension.target.len() <= compound.len()
                    && extension.target.key_strings().iter().all(|key| keys.contains(key))
            })
            .collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &Extension> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extension(extender: &str, target: &str) -> Extension {
        Extension::new(
            ComplexSelector::parse(extender).unwrap(),
            CompoundSelector::parse(target).unwrap(),
        )
    }

    #[test]
    fn lookup_is_subset_based() {
        let mut map = SubsetMap::new();
        map.insert(extension(".x", ".a"));
        map.insert(extension(".y", ".a.b"));

        let hit = map.get(&CompoundSelector::parse(".a.b.c").unwrap());
        assert_eq!(hit.len(), 2);

        let hit = map.get(&CompoundSelector::parse(".a").unwrap());
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].extender.to_string(), ".x");

        assert!(map.get(&CompoundSelector::parse(".c").unwrap()).is_empty());
    }

    #[test]
    fn lookup_preserves_insertion_order() {
        let mut map = SubsetMap::new();
        map.insert(extension(".x", ".a"));
        map.insert(extension(".y", ".a"));
        let hit = map.get(&CompoundSelector::parse(".a").unwrap());
        assert_eq!(hit[0].extender.to_string(), ".x");
        assert_eq!(hit[1].extender.to_string(), ".y");
    }

    #[test]
    fn extended_mark_is_monotonic() {
        let ext = extension(".x", ".a");
        assert!(!ext.was_extended());
        ext.mark_extended();
        ext.mark_extended();
        assert!(ext.was_extended());
    }
}
