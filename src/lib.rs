//! # ncss selector extension engine
//!
//! The core of the ncss stylesheet preprocessor: given a tree of style rules
//! and a table of `@extend` directives, rewrites each rule's selector list so
//! that every selector matching an extended target also matches the extending
//! selectors, preserving CSS semantics (specificity, combinator interaction,
//! superselector relations).
//!
//! Parsing of full stylesheets, value evaluation, and CSS serialization live
//! in the surrounding compiler; this crate owns the selector data model, the
//! selector algebra, and the extension algorithm itself.
//!
//! ## Quick start
//!
//! ```rust
//! use ncss::extend::extend_selector_list;
//! use ncss::selector::{ComplexSelector, CompoundSelector, SelectorList};
//! use ncss::{Extension, SubsetMap};
//!
//! // .seriousError { @extend .error; }
//! let mut map = SubsetMap::new();
//! map.insert(Extension::new(
//!     ComplexSelector::parse(".seriousError").unwrap(),
//!     CompoundSelector::parse(".error").unwrap(),
//! ));
//!
//! let list = SelectorList::parse(".error").unwrap();
//! let (extended, changed) = extend_selector_list(&list, &map, false).unwrap();
//! assert!(changed);
//! assert_eq!(extended.to_string(), ".error, .seriousError");
//! ```
//!
//! ## Modules
//!
//! - [`selector`]: the selector data model and algebra
//! - [`extend`]: the extension engine and rule-tree driver
//! - [`subset_map`]: the extension table
//! - [`ast`]: the slice of the rule tree the driver walks
//! - [`error`]: error types

pub mod ast;
pub mod error;
pub mod extend;
pub mod selector;
pub mod subset_map;

pub use error::ExtendError;
pub use extend::{extend_selector_list, Extender};
pub use subset_map::{Extension, SubsetMap};
