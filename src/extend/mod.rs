//! The selector extension engine.
//!
//! Given a rule tree and an [`Extension table`](crate::subset_map::SubsetMap)
//! built by the directive-collection pass, rewrites every ruleset's selector
//! list so that selectors matching an extended target also match their
//! extenders, preserving CSS semantics:
//!
//! - **First Law**: the result of extending a selector contains the original
//!   selector (unless it carries a placeholder).
//! - **Second Law**: a generated selector is never less specific than the
//!   extender that produced it (enforced by the trim pass).
//!
//! [`extend_selector_list`] is the per-list entry point; [`Extender`] walks a
//! whole [`Block`], replaces selectors in place, and reports `@extend`s that
//! never found their target.

mod compound;
mod lcs;
mod node;
mod seq;
mod trim;
mod weave;

use log::debug;

use crate::ast::{Block, Stmt};
use crate::error::ExtendError;
use crate::selector::{ComplexSelector, CompoundSelector, Selector, SelectorList};
use crate::subset_map::SubsetMap;

use self::compound::extend_complex;
use self::node::nodes_to_complex;

/// Walks a rule tree, extending every ruleset's selector list in place.
pub struct Extender<'a> {
    map: &'a SubsetMap,
}

impl<'a> Extender<'a> {
    pub fn new(map: &'a SubsetMap) -> Self {
        Self { map }
    }

    /// Extends the whole document. After the walk, any non-optional
    /// extension that never found its target is an error.
    pub fn run(&self, root: &mut Block) -> Result<(), ExtendError> {
        self.visit_block(root, None)?;

        for extension in self.map.values() {
            if extension.was_extended() || extension.is_optional {
                continue;
            }
            return Err(ExtendError::UnappliedExtend {
                extender: extension.extender.to_string(),
                target: extension.target.to_string(),
                span: extension.span,
            });
        }
        Ok(())
    }

    fn visit_block(&self, block: &mut Block, media: Option<&str>) -> Result<(), ExtendError> {
        for stmt in &mut block.stmts {
            match stmt {
                Stmt::Rule(rule) => {
                    if let Some(query) = media {
                        rule.selectors.set_media_scope(query);
                    }
                    if should_extend_block(&rule.block) {
                        let (new_list, extended) =
                            extend_selector_list(&rule.selectors, self.map, false)?;
                        if extended {
                            debug!("replacing `{}` with `{}`", rule.selectors, new_list);
                            rule.selectors = new_list;
                        }
                    }
                    self.visit_block(&mut rule.block, media)?;
                }
                Stmt::Media(media_rule) => {
                    let query = media_rule.query.clone();
                    self.visit_block(&mut media_rule.block, Some(&query))?;
                }
                Stmt::Supports(supports) => self.visit_block(&mut supports.block, media)?,
                Stmt::Declaration(_) => {}
            }
        }
        Ok(())
    }
}

/// A ruleset whose block holds nothing but nested rulesets produces no CSS
/// of its own, so extending its selector would be wasted work. The test is
/// structural on statement kinds, not on emitted output.
pub fn should_extend_block(block: &Block) -> bool {
    block.stmts.iter().any(|stmt| !matches!(stmt, Stmt::Rule(_)))
}

/// Extends one selector list against the extension table.
///
/// Returns the new list and whether anything was extended. With `is_replace`
/// the original selector is dropped from the result whenever a replacement
/// exists (the behavior selector functions want).
pub fn extend_selector_list(
    list: &SelectorList,
    map: &SubsetMap,
    is_replace: bool,
) -> Result<(SelectorList, bool), ExtendError> {
    extend_selector_list_with_seen(list, map, is_replace, &[])
}

fn extend_selector_list_with_seen(
    list: &SelectorList,
    map: &SubsetMap,
    is_replace: bool,
    seen: &[CompoundSelector],
) -> Result<(SelectorList, bool), ExtendError> {
    let mut new_selectors: Vec<ComplexSelector> = Vec::new();
    let mut extended_something = false;

    for complex in &list.selectors {
        // fast reject before the data-model transformation below
        if !has_extension(complex, map, seen)? {
            new_selectors.push(complex.clone());
            continue;
        }
        extended_something = true;

        let mut results: Vec<ComplexSelector> = extend_complex(complex, map, seen, is_replace, true)
            .iter()
            .map(|seq| nodes_to_complex(seq))
            .collect();

        if !complex.has_placeholder()
            && !results.iter().any(|result| result.structurally_equal(complex, true))
        {
            results.insert(0, complex.clone());
        }

        let skip_first = is_replace && results.len() > 1;
        for (index, result) in results.into_iter().enumerate() {
            if skip_first && index == 0 {
                continue;
            }
            new_selectors.push(result);
        }
    }

    // selectors still carrying a placeholder never reach the output
    new_selectors.retain(|complex| !complex.has_placeholder());

    for complex in &mut new_selectors {
        unwrap_wrapped(complex, map, seen)?;
    }

    Ok((SelectorList::new(new_selectors), extended_something))
}

/// Fast check whether anything along the spine (or inside a wrapped
/// selector) has an entry in the table. Doubles as the enforcement point for
/// directive scoping: an extension recorded inside `@media` may only reach
/// selectors in a block with the same query.
fn has_extension(
    complex: &ComplexSelector,
    map: &SubsetMap,
    seen: &[CompoundSelector],
) -> Result<bool, ExtendError> {
    let mut found = false;
    for part in &complex.parts {
        let Some(head) = &part.compound else { continue };

        if !seen.contains(head) {
            'wrapped: for simple in &head.simples {
                let Selector::Wrapped { inner, .. } = simple else { continue };
                for inner_complex in &inner.selectors {
                    if has_extension(inner_complex, map, seen)? {
                        found = true;
                        break 'wrapped;
                    }
                }
            }
        }

        let entries = map.get(head);
        for entry in &entries {
            let Some(entry_query) = &entry.media_query else { continue };
            if head.media_scope.as_deref() == Some(entry_query.as_str()) {
                continue;
            }
            return Err(ExtendError::CrossDirectiveExtend {
                target: entry.target.to_string(),
                span: entry.span,
            });
        }
        if !entries.is_empty() {
            found = true;
        }
        if found {
            break;
        }
    }
    Ok(found)
}

/// Recursively extends the selector lists inside wrapped pseudo-classes, so
/// `:not(.a)` picks up extensions of `.a`. The current head joins `seen` to
/// keep self-referential selectors from looping.
fn unwrap_wrapped(
    complex: &mut ComplexSelector,
    map: &SubsetMap,
    seen: &[CompoundSelector],
) -> Result<(), ExtendError> {
    for part in &mut complex.parts {
        let Some(head) = part.compound.as_mut() else { continue };
        if seen.contains(head) {
            continue;
        }
        let mut recurse_seen = seen.to_vec();
        recurse_seen.push(head.clone());

        let mut new_simples: Vec<Selector> = Vec::with_capacity(head.simples.len());
        for simple in &head.simples {
            let Selector::Wrapped { name, inner } = simple else {
                new_simples.push(simple.clone());
                continue;
            };
            if inner.selectors.is_empty() {
                // `:name()` is how an emptied wrapped selector reads after
                // cleanup passes; reduce it to a bare type
                new_simples.push(Selector::Type(name.clone()));
                continue;
            }
            let (extended_inner, _) =
                extend_selector_list_with_seen(inner, map, false, &recurse_seen)?;
            let kept: Vec<ComplexSelector> = extended_inner
                .selectors
                .into_iter()
                .filter(|inner_complex| !inner_complex.has_wrapped())
                .collect();
            if !kept.is_empty() {
                new_simples.push(Selector::Wrapped {
                    name: name.clone(),
                    inner: SelectorList::new(kept),
                });
            }
        }
        head.simples = new_simples;
    }
    Ok(())
}
