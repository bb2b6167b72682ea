use ncss::extend::extend_selector_list;
use ncss::selector::{ComplexSelector, CompoundSelector, SelectorList};
use ncss::{Extension, SubsetMap};

fn build_map(entries: &[(&str, &str)]) -> SubsetMap {
    let mut map = SubsetMap::new();
    for (extender, target) in entries {
        map.insert(Extension::new(
            ComplexSelector::parse(extender).unwrap(),
            CompoundSelector::parse(target).unwrap(),
        ));
    }
    map
}

fn extend(list: &str, entries: &[(&str, &str)]) -> String {
    let map = build_map(entries);
    let list = SelectorList::parse(list).unwrap();
    let (extended, _) = extend_selector_list(&list, &map, false).unwrap();
    extended.to_string()
}

#[test]
fn not_picks_up_extensions_of_its_inner_selector() {
    assert_eq!(extend(":not(.a)", &[(".b", ".a")]), ":not(.a, .b)");
}

#[test]
fn wrapped_recursion_reaches_nested_positions() {
    assert_eq!(
        extend(".x :not(.a)", &[(".b", ".a")]),
        ".x :not(.a, .b)"
    );
}

#[test]
fn placeholders_inside_wrapped_selectors_are_stripped() {
    assert_eq!(extend(":not(%p)", &[(".x", "%p")]), ":not(.x)");
}

#[test]
fn wrapped_selectors_without_extensions_pass_through() {
    assert_eq!(extend(":not(.a)", &[(".x", ".c")]), ":not(.a)");
    assert_eq!(extend(":is(.a, .b)", &[(".x", ".c")]), ":is(.a, .b)");
}

#[test]
fn compound_around_the_wrapped_selector_survives() {
    assert_eq!(
        extend("div:not(.a).keep", &[(".b", ".a")]),
        "div:not(.a, .b).keep"
    );
}
