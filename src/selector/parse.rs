//! Selector parsing.
//!
//! Parses the selector syntax the extension engine operates on: type, class,
//! id, attribute, pseudo, placeholder (`%name`), and parent (`&`) selectors,
//! the wrapped pseudo-classes (`:not(...)`, `:is(...)`, `:matches(...)`,
//! `:has(...)`), the combinators ` `, `>`, `+`, `~`, `/`, and comma-separated
//! lists. Stylesheet-level parsing (rules, declarations, at-rules) belongs to
//! the surrounding compiler, not this crate.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{take_until, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, opt},
    multi::many0,
    sequence::{delimited, preceded, terminated, tuple},
};

use super::{Combinator, ComplexSelector, CompoundSelector, Selector, SelectorList, SelectorPart};
use crate::error::ExtendError;

pub fn parse_ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

/// Parses a simple selector: type, `.class`, `#id`, `%placeholder`, `&`,
/// `*`, `[attr]`, or a pseudo.
pub fn parse_simple_selector(input: &str) -> IResult<&str, Selector> {
    alt((
        map(preceded(char('#'), parse_ident), |s| Selector::Id(s.to_string())),
        map(preceded(char('.'), parse_ident), |s| Selector::Class(s.to_string())),
        map(preceded(char('%'), parse_ident), |s| Selector::Placeholder(s.to_string())),
        parse_pseudo_selector,
        map(char('&'), |_| Selector::Parent),
        map(char('*'), |_| Selector::Type("*".to_string())),
        parse_attribute_selector,
        map(parse_ident, |s| Selector::Type(s.to_string())),
    ))(input)
}

/// Parses a compound selector (e.g. `button.primary#submit`).
pub fn parse_compound_selector(input: &str) -> IResult<&str, CompoundSelector> {
    let (input, first) = parse_simple_selector(input)?;
    let (input, rest) = many0(parse_simple_selector)(input)?;

    let mut simples = vec![first];
    simples.extend(rest);
    Ok((input, CompoundSelector::new(simples)))
}

/// Parses a complex selector with combinators (e.g. `nav > ul li`).
pub fn parse_complex_selector(input: &str) -> IResult<&str, ComplexSelector> {
    let (mut input, first) = parse_compound_selector(input)?;
    let mut parts = vec![SelectorPart::new(Combinator::Descendant, Some(first))];

    loop {
        let (rem, ws) = multispace0(input)?;

        let combinator_match: IResult<&str, Combinator> = alt((
            map(char('>'), |_| Combinator::Child),
            map(char('+'), |_| Combinator::AdjacentSibling),
            map(char('~'), |_| Combinator::GeneralSibling),
            map(char('/'), |_| Combinator::Reference),
        ))(rem);

        if let Ok((after_op, combinator)) = combinator_match {
            let (after_ws, _) = multispace0(after_op)?;
            match parse_compound_selector(after_ws) {
                Ok((next_input, compound)) => {
                    parts.push(SelectorPart::new(combinator, Some(compound)));
                    input = next_input;
                    continue;
                }
                Err(_) => break,
            }
        }

        if !ws.is_empty() {
            match parse_compound_selector(rem) {
                Ok((next_input, compound)) => {
                    parts.push(SelectorPart::new(Combinator::Descendant, Some(compound)));
                    input = next_input;
                    continue;
                }
                Err(_) => break,
            }
        }

        break;
    }

    Ok((input, ComplexSelector::new(parts)))
}

/// Parses a comma-separated list of complex selectors.
pub fn parse_selector_list(input: &str) -> IResult<&str, SelectorList> {
    let (input, _) = multispace0(input)?;
    let (input, first) = parse_complex_selector(input)?;
    let (input, rest) = many0(preceded(
        tuple((multispace0, char(','), multispace0)),
        parse_complex_selector,
    ))(input)?;

    let mut selectors = vec![first];
    selectors.extend(rest);
    Ok((input, SelectorList::new(selectors)))
}

fn parse_pseudo_selector(input: &str) -> IResult<&str, Selector> {
    let (input, _) = char(':')(input)?;
    let (input, second) = opt(char(':'))(input)?;
    let (input, name) = parse_ident(input)?;
    let element = second.is_some();

    // pseudo-classes whose argument is itself a selector list
    if !element && matches!(name, "not" | "matches" | "is" | "has") && input.starts_with('(') {
        let (input, inner) = delimited(
            char('('),
            terminated(parse_selector_list, multispace0),
            char(')'),
        )(input)?;
        return Ok((input, Selector::Wrapped { name: name.to_string(), inner }));
    }

    let (input, arg) = opt(delimited(char('('), take_until(")"), char(')')))(input)?;
    Ok((
        input,
        Selector::Pseudo { name: name.to_string(), arg: arg.map(ToString::to_string), element },
    ))
}

fn parse_attribute_selector(input: &str) -> IResult<&str, Selector> {
    let (input, content) = delimited(char('['), take_until("]"), char(']'))(input)?;

    if let Some(idx) = content.find('=') {
        let name = content[..idx].trim().to_string();
        let value = content[idx + 1..].trim().to_string();
        Ok((input, Selector::Attribute { name, value: Some(value) }))
    } else {
        Ok((input, Selector::Attribute { name: content.trim().to_string(), value: None }))
    }
}

impl SelectorList {
    /// Parses a full selector list, requiring all input to be consumed.
    pub fn parse(input: &str) -> Result<SelectorList, ExtendError> {
        let (remaining, list) =
            parse_selector_list(input).map_err(|e| ExtendError::InvalidSelector(e.to_string()))?;
        if !remaining.trim().is_empty() {
            return Err(ExtendError::InvalidSelector(format!(
                "unexpected tokens after selector: {}",
                remaining.trim()
            )));
        }
        Ok(list)
    }
}

impl ComplexSelector {
    /// Parses a single complex selector, requiring all input to be consumed.
    pub fn parse(input: &str) -> Result<ComplexSelector, ExtendError> {
        let list = SelectorList::parse(input)?;
        let mut selectors = list.selectors;
        if selectors.len() != 1 {
            return Err(ExtendError::InvalidSelector(format!(
                "expected a single selector, found a list: {input}"
            )));
        }
        Ok(selectors.remove(0))
    }
}

impl CompoundSelector {
    /// Parses a single compound selector, requiring all input to be consumed.
    pub fn parse(input: &str) -> Result<CompoundSelector, ExtendError> {
        let input = input.trim();
        let (remaining, compound) = parse_compound_selector(input)
            .map_err(|e| ExtendError::InvalidSelector(e.to_string()))?;
        if !remaining.is_empty() {
            return Err(ExtendError::InvalidSelector(format!(
                "unexpected tokens after compound selector: {remaining}"
            )));
        }
        Ok(compound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_kinds() {
        let list = SelectorList::parse("a.b#c%d[e=f]:hover::after").unwrap();
        let compound = list.selectors[0].parts[0].compound.as_ref().unwrap();
        assert_eq!(compound.simples.len(), 7);
        assert_eq!(compound.simples[0], Selector::Type("a".into()));
        assert_eq!(compound.simples[2], Selector::Id("c".into()));
        assert_eq!(compound.simples[3], Selector::Placeholder("d".into()));
    }

    #[test]
    fn parses_combinators() {
        let complex = ComplexSelector::parse("a > b + c ~ d e").unwrap();
        let combinators: Vec<Combinator> =
            complex.parts.iter().map(|p| p.combinator).collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::AdjacentSibling,
                Combinator::GeneralSibling,
                Combinator::Descendant,
            ]
        );
    }

    #[test]
    fn parses_wrapped_pseudo() {
        let compound = CompoundSelector::parse(":not(.a, .b)").unwrap();
        let Selector::Wrapped { name, inner } = &compound.simples[0] else {
            panic!("expected a wrapped selector");
        };
        assert_eq!(name, "not");
        assert_eq!(inner.selectors.len(), 2);
        assert_eq!(compound.to_string(), ":not(.a, .b)");
    }

    #[test]
    fn parses_lists_with_whitespace() {
        let list = SelectorList::parse(" .a ,\n .b > .c ").unwrap();
        assert_eq!(list.selectors.len(), 2);
        assert_eq!(list.to_string(), ".a, .b > .c");
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(SelectorList::parse(".a {").is_err());
        assert!(CompoundSelector::parse(".a .b").is_err());
    }
}
