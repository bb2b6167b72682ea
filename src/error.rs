//! Error types for the extension engine.

use thiserror::Error;

use crate::selector::Span;

/// Errors surfaced while extending selectors.
///
/// A failed subweave merge is not an error: incompatible combinator
/// sequences simply contribute no permutations to the result.
#[derive(Error, Debug)]
pub enum ExtendError {
    /// A selector string could not be parsed.
    #[error("selector syntax error: {0}")]
    InvalidSelector(String),

    /// An `@extend` written inside a `@media` block tried to reach a
    /// selector in a different directive scope.
    #[error(
        "You may not @extend an outer selector from within @media.\n\
         You may only @extend selectors within the same directive.\n\
         From \"@extend {target}\" at {span}"
    )]
    CrossDirectiveExtend { target: String, span: Span },

    /// A non-optional `@extend` never found its target anywhere in the
    /// document.
    #[error(
        "\"{extender}\" failed to @extend \"{target}\".\n\
         The selector \"{target}\" was not found.\n\
         Use \"@extend {target} !optional\" if the extend should be able to fail."
    )]
    UnappliedExtend { extender: String, target: String, span: Span },
}
