//! The slice of the rule tree the extension driver walks.
//!
//! The surrounding compiler owns the full AST (expressions, values,
//! directives); extension only needs to see rulesets, the media/supports
//! blocks that scope them, and enough of everything else to tell a ruleset
//! with content from one that only nests further rulesets.

use crate::selector::SelectorList;

/// An ordered sequence of statements.
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Rule(Ruleset),
    Media(MediaRule),
    Supports(SupportsRule),
    Declaration(Declaration),
}

/// A selector list and its block.
#[derive(Clone, Debug)]
pub struct Ruleset {
    pub selectors: SelectorList,
    pub block: Block,
}

impl Ruleset {
    pub fn new(selectors: SelectorList, block: Block) -> Self {
        Self { selectors, block }
    }
}

/// `@media <query> { ... }`. The query is kept as written; scope checks
/// compare the strings.
#[derive(Clone, Debug)]
pub struct MediaRule {
    pub query: String,
    pub block: Block,
}

impl MediaRule {
    pub fn new(query: &str, block: Block) -> Self {
        Self { query: query.to_string(), block }
    }
}

/// `@supports <condition> { ... }`.
#[derive(Clone, Debug)]
pub struct SupportsRule {
    pub condition: String,
    pub block: Block,
}

impl SupportsRule {
    pub fn new(condition: &str, block: Block) -> Self {
        Self { condition: condition.to_string(), block }
    }
}

/// A property declaration. Values are opaque to extension.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: &str, value: &str) -> Self {
        Self { property: property.to_string(), value: value.to_string() }
    }
}
