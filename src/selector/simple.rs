use std::fmt;

use super::{SelectorList, Specificity, SPECIFICITY_CLASS, SPECIFICITY_ID, SPECIFICITY_TYPE};

/// A single simple selector.
///
/// `Wrapped` covers the pseudo-classes that take a selector list as their
/// argument (`:not(...)`, `:is(...)`, `:matches(...)`, `:has(...)`); plain
/// pseudo-classes and pseudo-elements are `Pseudo`. The `element` flag on
/// `Pseudo` records whether it was written with a double colon; the legacy
/// single-colon elements (`:before` et al.) are classified by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Type(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
    Pseudo { name: String, arg: Option<String>, element: bool },
    Wrapped { name: String, inner: SelectorList },
    Placeholder(String),
    Parent,
}

impl Selector {
    pub fn specificity(&self) -> Specificity {
        match self {
            Selector::Id(_) | Selector::Placeholder(_) => SPECIFICITY_ID,
            Selector::Class(_) | Selector::Attribute { .. } => SPECIFICITY_CLASS,
            Selector::Pseudo { .. } if self.is_pseudo_element() => SPECIFICITY_TYPE,
            Selector::Pseudo { .. } => SPECIFICITY_CLASS,
            Selector::Type(name) if name == "*" => 0,
            Selector::Type(_) => SPECIFICITY_TYPE,
            Selector::Wrapped { inner, .. } => inner
                .selectors
                .iter()
                .map(|complex| complex.specificity())
                .max()
                .unwrap_or(0),
            Selector::Parent => 0,
        }
    }

    pub fn is_pseudo_element(&self) -> bool {
        match self {
            Selector::Pseudo { element: true, .. } => true,
            Selector::Pseudo { name, .. } => {
                matches!(name.as_str(), "before" | "after" | "first-line" | "first-letter")
            }
            _ => false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Selector::Placeholder(_))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Type(name) => write!(f, "{name}"),
            Selector::Id(name) => write!(f, "#{name}"),
            Selector::Class(name) => write!(f, ".{name}"),
            Selector::Attribute { name, value: Some(value) } => write!(f, "[{name}={value}]"),
            Selector::Attribute { name, value: None } => write!(f, "[{name}]"),
            Selector::Pseudo { name, arg, element } => {
                write!(f, "{}{}", if *element { "::" } else { ":" }, name)?;
                if let Some(arg) = arg {
                    write!(f, "({arg})")?;
                }
                Ok(())
            }
            Selector::Wrapped { name, inner } => write!(f, ":{name}({inner})"),
            Selector::Placeholder(name) => write!(f, "%{name}"),
            Selector::Parent => write!(f, "&"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specificity_weights() {
        assert_eq!(Selector::Id("a".into()).specificity(), 65536);
        assert_eq!(Selector::Placeholder("a".into()).specificity(), 65536);
        assert_eq!(Selector::Class("a".into()).specificity(), 256);
        assert_eq!(
            Selector::Attribute { name: "href".into(), value: None }.specificity(),
            256
        );
        assert_eq!(Selector::Type("a".into()).specificity(), 1);
        assert_eq!(Selector::Type("*".into()).specificity(), 0);
    }

    #[test]
    fn pseudo_element_classification() {
        let hover = Selector::Pseudo { name: "hover".into(), arg: None, element: false };
        assert!(!hover.is_pseudo_element());
        assert_eq!(hover.specificity(), 256);

        let before = Selector::Pseudo { name: "before".into(), arg: None, element: false };
        assert!(before.is_pseudo_element());
        assert_eq!(before.specificity(), 1);

        let marker = Selector::Pseudo { name: "marker".into(), arg: None, element: true };
        assert!(marker.is_pseudo_element());
        assert_eq!(marker.specificity(), 1);
    }

    #[test]
    fn display_round_trip() {
        assert_eq!(Selector::Class("error".into()).to_string(), ".error");
        assert_eq!(Selector::Placeholder("toolbelt".into()).to_string(), "%toolbelt");
        assert_eq!(
            Selector::Pseudo { name: "nth-child".into(), arg: Some("2n".into()), element: false }
                .to_string(),
            ":nth-child(2n)"
        );
    }
}
