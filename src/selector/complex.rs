use std::fmt;

use super::{CompoundSelector, Selector, Span, Specificity};

/// Connects a compound selector to whatever precedes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace; also the implicit leading combinator.
    Descendant,
    /// `>`
    Child,
    /// `+`
    AdjacentSibling,
    /// `~`
    GeneralSibling,
    /// `/`
    Reference,
}

impl Combinator {
    pub fn symbol(&self) -> Option<char> {
        match self {
            Combinator::Descendant => None,
            Combinator::Child => Some('>'),
            Combinator::AdjacentSibling => Some('+'),
            Combinator::GeneralSibling => Some('~'),
            Combinator::Reference => Some('/'),
        }
    }
}

/// One step of a complex selector: the combinator joining it to the previous
/// step, then the compound. The first part's combinator is `Descendant`; a
/// trailing part with no compound is legal mid-merge but never in output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorPart {
    pub combinator: Combinator,
    pub compound: Option<CompoundSelector>,
}

impl SelectorPart {
    pub fn new(combinator: Combinator, compound: Option<CompoundSelector>) -> Self {
        Self { combinator, compound }
    }
}

/// Compound selectors joined by combinators; one element of a selector list.
#[derive(Clone, Debug)]
pub struct ComplexSelector {
    pub parts: Vec<SelectorPart>,
    pub span: Span,
}

impl PartialEq for ComplexSelector {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for ComplexSelector {}

impl ComplexSelector {
    pub fn new(parts: Vec<SelectorPart>) -> Self {
        Self { parts, span: Span::default() }
    }

    pub fn from_compound(compound: CompoundSelector) -> Self {
        let span = compound.span;
        Self { parts: vec![SelectorPart::new(Combinator::Descendant, Some(compound))], span }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn leading_combinator(&self) -> Combinator {
        self.parts.first().map_or(Combinator::Descendant, |part| part.combinator)
    }

    /// The head of the innermost (last) part, if it has one.
    pub fn innermost_head(&self) -> Option<&CompoundSelector> {
        self.parts.last()?.compound.as_ref()
    }

    /// A copy with the innermost head replaced, keeping its combinator.
    pub fn with_innermost_head(&self, head: CompoundSelector) -> ComplexSelector {
        let mut out = self.clone();
        match out.parts.last_mut() {
            Some(last) => last.compound = Some(head),
            None => out.parts.push(SelectorPart::new(Combinator::Descendant, Some(head))),
        }
        out
    }

    pub fn specificity(&self) -> Specificity {
        self.parts
            .iter()
            .filter_map(|part| part.compound.as_ref())
            .map(CompoundSelector::specificity)
            .sum()
    }

    pub fn has_placeholder(&self) -> bool {
        self.parts
            .iter()
            .filter_map(|part| part.compound.as_ref())
            .any(CompoundSelector::has_placeholder)
    }

    pub fn has_wrapped(&self) -> bool {
        self.parts
            .iter()
            .filter_map(|part| part.compound.as_ref())
            .any(|compound| compound.simples.iter().any(|s| matches!(s, Selector::Wrapped { .. })))
    }

    /// The union of the sources recorded on this selector's compounds.
    pub fn sources(&self) -> Vec<ComplexSelector> {
        let mut out: Vec<ComplexSelector> = Vec::new();
        for part in &self.parts {
            let Some(compound) = &part.compound else { continue };
            for source in &compound.sources {
                if !out.iter().any(|s| s.structurally_equal(source, true)) {
                    out.push(source.clone());
                }
            }
        }
        out
    }

    /// Adds the given sources to every compound along the spine.
    pub fn add_sources(&mut self, sources: &[ComplexSelector]) {
        for part in &mut self.parts {
            if let Some(compound) = part.compound.as_mut() {
                compound.add_sources(sources);
            }
        }
    }

    pub fn clone_without_sources(&self) -> ComplexSelector {
        let mut out = self.clone();
        for part in &mut out.parts {
            if let Some(compound) = part.compound.as_mut() {
                compound.sources.clear();
            }
        }
        out
    }

    /// Structural equality. With `simple_order_dependent` false the internal
    /// order of each compound's simples is ignored.
    pub fn structurally_equal(&self, other: &ComplexSelector, simple_order_dependent: bool) -> bool {
        if simple_order_dependent {
            return self.parts == other.parts;
        }
        self.parts.len() == other.parts.len()
            && self.parts.iter().zip(&other.parts).all(|(lhs, rhs)| {
                lhs.combinator == rhs.combinator
                    && match (&lhs.compound, &rhs.compound) {
                        (None, None) => true,
                        (Some(a), Some(b)) => a.eq_unordered(b),
                        _ => false,
                    }
            })
    }

    /// True when every element matched by `other` is also matched by `self`.
    pub fn is_superselector_of(&self, other: &ComplexSelector) -> bool {
        superselector_seq(&interleaved(&self.parts), &interleaved(&other.parts))
    }
}

/// The flat compound/combinator view of a complex selector. Descendant
/// combinators are implicit in adjacency, matching how the weave reasons
/// about sequences.
#[derive(Clone, Copy)]
enum Elem<'a> {
    Compound(&'a CompoundSelector),
    Op(Combinator),
}

fn interleaved(parts: &[SelectorPart]) -> Vec<Elem<'_>> {
    let mut out = Vec::new();
    for part in parts {
        if part.combinator != Combinator::Descendant {
            out.push(Elem::Op(part.combinator));
        }
        if let Some(compound) = &part.compound {
            out.push(Elem::Compound(compound));
        }
    }
    out
}

fn superselector_seq(seq1: &[Elem], seq2: &[Elem]) -> bool {
    if seq1.is_empty() || seq2.is_empty() {
        return false;
    }
    // selectors with leading or trailing combinators are neither super- nor
    // sub-selectors of anything
    if matches!(seq1.first(), Some(Elem::Op(_)))
        || matches!(seq2.first(), Some(Elem::Op(_)))
        || matches!(seq1.last(), Some(Elem::Op(_)))
        || matches!(seq2.last(), Some(Elem::Op(_)))
    {
        return false;
    }
    if seq1.len() > seq2.len() {
        return false;
    }
    let Elem::Compound(lead) = seq1[0] else { return false };
    if seq1.len() == 1 {
        let Elem::Compound(last) = seq2[seq2.len() - 1] else { return false };
        return lead.is_superselector_of(last);
    }

    let mut found = None;
    for (i, elem) in seq2.iter().enumerate() {
        if i == seq2.len() - 1 {
            return false;
        }
        if let Elem::Compound(candidate) = *elem {
            if lead.is_superselector_of(candidate) {
                found = Some(i);
                break;
            }
        }
    }
    let Some(si) = found else { return false };

    match seq1[1] {
        Elem::Op(op1) => {
            let Elem::Op(op2) = seq2[si + 1] else { return false };
            // `.a ~ .b` covers `.a + .b`, but nothing covers across `>`
            let compatible = if op1 == Combinator::GeneralSibling {
                op2 != Combinator::Child
            } else {
                op1 == op2
            };
            if !compatible {
                return false;
            }
            // `.a > .c` must not absorb `.a > .b .c` even though `.c`
            // superselects `.b .c`
            if seq1.len() == 3 && seq2.len() > 3 {
                return false;
            }
            superselector_seq(&seq1[2..], &seq2[si + 2..])
        }
        Elem::Compound(_) => {
            if let Elem::Op(op2) = seq2[si + 1] {
                if op2 != Combinator::Child {
                    return false;
                }
                superselector_seq(&seq1[1..], &seq2[si + 2..])
            } else {
                superselector_seq(&seq1[1..], &seq2[si + 1..])
            }
        }
    }
}

/// Superselector test under an arbitrary shared suffix: used by the weave to
/// ask whether one prefix could absorb another no matter what follows both.
pub(crate) fn parent_superselector(one: &ComplexSelector, two: &ComplexSelector) -> bool {
    let fake = CompoundSelector::new(vec![Selector::Type("temp".to_string())]);
    let mut lhs = one.clone();
    lhs.parts.push(SelectorPart::new(Combinator::Descendant, Some(fake.clone())));
    let mut rhs = two.clone();
    rhs.parts.push(SelectorPart::new(Combinator::Descendant, Some(fake)));
    lhs.is_superselector_of(&rhs)
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if let Some(symbol) = part.combinator.symbol() {
                write!(f, "{symbol}")?;
                if part.compound.is_some() {
                    write!(f, " ")?;
                }
            }
            if let Some(compound) = &part.compound {
                write!(f, "{compound}")?;
            }
        }
        Ok(())
    }
}

/// The top-level comma-separated selector list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn new(selectors: Vec<ComplexSelector>) -> Self {
        Self { selectors }
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// A list covers another when each of the other's selectors is covered
    /// by at least one of its own.
    pub fn is_superselector_of(&self, other: &SelectorList) -> bool {
        other
            .selectors
            .iter()
            .all(|theirs| self.selectors.iter().any(|ours| ours.is_superselector_of(theirs)))
    }

    pub fn has_placeholder(&self) -> bool {
        self.selectors.iter().any(ComplexSelector::has_placeholder)
    }

    /// Stamps the enclosing media query onto every compound in the list.
    pub fn set_media_scope(&mut self, query: &str) {
        for complex in &mut self.selectors {
            for part in &mut complex.parts {
                if let Some(compound) = part.compound.as_mut() {
                    compound.media_scope = Some(query.to_string());
                }
            }
        }
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, complex) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{complex}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complex(input: &str) -> ComplexSelector {
        ComplexSelector::parse(input).unwrap()
    }

    #[test]
    fn superselector_descendant_absorbs_prefixes() {
        assert!(complex("a b").is_superselector_of(&complex("a b")));
        assert!(complex("a b").is_superselector_of(&complex("a c b")));
        assert!(complex("a b").is_superselector_of(&complex("x a y b")));
        assert!(!complex("a c b").is_superselector_of(&complex("a b")));
        assert!(!complex("a b").is_superselector_of(&complex("b a")));
    }

    #[test]
    fn superselector_child_requires_alignment() {
        assert!(complex(".a > .b").is_superselector_of(&complex(".a > .c.b")));
        assert!(!complex(".a > .b").is_superselector_of(&complex(".a .b")));
        assert!(!complex(".a > .b").is_superselector_of(&complex(".a > .x .b")));
        assert!(complex(".a .b").is_superselector_of(&complex(".a > .b")));
    }

    #[test]
    fn superselector_sibling_combinators() {
        assert!(complex(".a ~ .b").is_superselector_of(&complex(".a + .b")));
        assert!(!complex(".a + .b").is_superselector_of(&complex(".a ~ .b")));
    }

    #[test]
    fn longer_selectors_are_never_superselectors() {
        assert!(!complex("a b c").is_superselector_of(&complex("b c")));
    }

    #[test]
    fn parent_superselector_shares_a_suffix() {
        assert!(parent_superselector(&complex(".a"), &complex(".a")));
        assert!(parent_superselector(&complex(".a"), &complex(".a.b")));
        assert!(!parent_superselector(&complex(".a"), &complex(".b")));
    }

    #[test]
    fn structural_equality_flags_simple_order() {
        assert!(complex(".a.b").structurally_equal(&complex(".b.a"), false));
        assert!(!complex(".a.b").structurally_equal(&complex(".b.a"), true));
        assert!(!complex(".a .b").structurally_equal(&complex(".a > .b"), false));
    }

    #[test]
    fn display_renders_combinators() {
        assert_eq!(complex(".a > .b").to_string(), ".a > .b");
        assert_eq!(complex(".a   .b").to_string(), ".a .b");
        assert_eq!(complex(".a ~ .b + .c").to_string(), ".a ~ .b + .c");
    }

    #[test]
    fn specificity_sums_heads() {
        assert_eq!(complex("#main a").specificity(), 65536 + 1);
        assert_eq!(complex(".a.b > .c").specificity(), 3 * 256);
    }
}
