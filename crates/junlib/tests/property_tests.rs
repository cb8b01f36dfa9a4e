//! Property-based tests for the tree conversions
//!
//! 1. JSON-variant round trip: trees with unique sibling names survive
//!    element -> json -> element unchanged
//! 2. List promotion keeps the count and order of repeated children

use proptest::prelude::*;
use junlib::{element_to_json, element_to_structured, json_to_element, Element, StructuredValue};

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

fn arb_text() -> impl Strategy<Value = String> {
    // trimmed, non-empty text survives the trip unchanged
    "[a-zA-Z0-9]([a-zA-Z0-9 ]{0,8}[a-zA-Z0-9])?"
}

fn arb_attributes() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map("[a-m][a-z]{0,4}", "[ -~]{0,8}", 0..3)
        .prop_map(|attrs| attrs.into_iter().collect())
}

/// Leaf element: attributes and optional text
fn arb_leaf() -> impl Strategy<Value = (Vec<(String, String)>, Option<String>)> {
    (arb_attributes(), prop::option::of(arb_text()))
}

fn build(name: &str, attrs: &[(String, String)], text: Option<&str>) -> Element {
    let mut element = Element::new(name);
    for (key, value) in attrs {
        element = element.with_attribute(key.clone(), value.clone());
    }
    if let Some(text) = text {
        element = element.with_text(text);
    }
    element
}

/// Trees whose child names start with n-z so they never clash with attributes
fn arb_tree() -> impl Strategy<Value = Element> {
    let leaf = arb_leaf().prop_map(|(attrs, text)| build("leaf", &attrs, text.as_deref()));
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            arb_leaf(),
            prop::collection::btree_map("[n-z][a-z0-9]{0,4}", inner, 0..4),
        )
            .prop_map(|((attrs, text), children)| {
                let mut element = build("node", &attrs, text.as_deref());
                for (name, mut child) in children {
                    child.name = name;
                    element = element.with_child(child);
                }
                element
            })
    })
}

proptest! {
    #[test]
    fn json_round_trip(tree in arb_tree(), root in arb_name()) {
        let mut tree = tree;
        tree.name = root;
        let value = element_to_json(&tree).unwrap();
        let rebuilt = json_to_element(&value, &tree.name).unwrap();
        prop_assert_eq!(rebuilt, tree);
    }

    #[test]
    fn promotion_keeps_order(texts in prop::collection::vec(arb_text(), 2..12)) {
        let mut parent = Element::new("list").with_child(Element::new("other"));
        for text in &texts {
            parent = parent.with_child(Element::new("item").with_text(text.clone()));
        }
        let structured = element_to_structured(&parent);
        let items: Vec<String> = structured
            .as_branch()
            .and_then(|fields| fields.get("item"))
            .map(|field| {
                field
                    .items()
                    .iter()
                    .filter_map(StructuredValue::as_leaf)
                    .flatten()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        prop_assert_eq!(items, texts);
    }
}
