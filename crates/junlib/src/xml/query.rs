//! Tree queries and in-place edits
//!
//! All walks are depth-first in document order.

use indexmap::IndexMap;

use crate::xml::model::{Content, Element};

/// A search hit: the element's tag and its full attribute map
pub type AttributeMatch = (String, IndexMap<String, String>);

impl Element {
    /// Every element in the tree (root included) named `tag` whose attribute
    /// `attr` equals `value` exactly. No match yields an empty list.
    pub fn search_by_attribute(&self, tag: &str, attr: &str, value: &str) -> Vec<AttributeMatch> {
        self.iter()
            .filter(|element| element.name == tag)
            .filter(|element| element.attributes.get(attr).is_some_and(|v| v == value))
            .map(|element| (element.name.clone(), element.attributes.clone()))
            .collect()
    }

    /// First descendant named `tag`; the element itself is not considered
    pub fn find(&self, tag: &str) -> Option<&Self> {
        self.iter().skip(1).find(|element| element.name == tag)
    }

    /// All descendants named `tag`
    pub fn find_all(&self, tag: &str) -> Vec<&Self> {
        self.iter()
            .skip(1)
            .filter(|element| element.name == tag)
            .collect()
    }

    /// Own text of the first descendant named `tag`
    pub fn tag_content(&self, tag: &str) -> Option<String> {
        self.find(tag).and_then(Self::text)
    }

    /// Own texts of all descendants named `tag`, skipping those without text
    pub fn tag_contents(&self, tag: &str) -> Vec<String> {
        self.find_all(tag)
            .into_iter()
            .filter_map(Self::text)
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Replace the own text of every descendant named `tag`.
    /// Returns how many elements changed.
    pub fn replace_tag_content(&mut self, tag: &str, text: &str) -> usize {
        let mut count = 0;
        for child in self.child_elements_mut() {
            if child.name == tag {
                child.set_text(text);
                count += 1;
            }
            count += child.replace_tag_content(tag, text);
        }
        count
    }

    /// Append a child element, with text when `text` is non-empty, and
    /// return it for further edits
    pub fn add_sub_element(&mut self, name: &str, text: &str) -> Option<&mut Self> {
        let mut child = Self::new(name);
        if !text.is_empty() {
            child.children.push(Content::Text(text.to_string()));
        }
        self.children.push(Content::Element(child));
        self.child_elements_mut().last()
    }

    /// For this element and every descendant, remove its first direct child
    /// named `tag`. Returns how many elements were removed.
    pub fn remove_tag(&mut self, tag: &str) -> usize {
        let mut count = 0;
        let position = self
            .children
            .iter()
            .position(|content| matches!(content, Content::Element(child) if child.name == tag));
        if let Some(index) = position {
            self.children.remove(index);
            count += 1;
        }
        for child in self.child_elements_mut() {
            count += child.remove_tag(tag);
        }
        count
    }

    /// Remove descendants with no text, no attributes and no children,
    /// bottom-up, so parents emptied by the pass go too. The element itself
    /// is never removed. Returns how many elements were removed.
    pub fn remove_empty_tags(&mut self) -> usize {
        let mut count = 0;
        for child in self.child_elements_mut() {
            count += child.remove_empty_tags();
        }
        let before = self.children.len();
        self.children.retain(|content| match content {
            Content::Element(child) => !child.is_empty_tag(),
            Content::Text(_) => true,
        });
        count + (before - self.children.len())
    }

    fn is_empty_tag(&self) -> bool {
        self.children.is_empty() && self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::Parser;

    fn parse(input: &str) -> Element {
        Parser::new(input.as_bytes())
            .parse()
            .map(|doc| doc.root)
            .unwrap_or_default()
    }

    const PEOPLE: &str = "<root>\
        <person id=\"1\"><name>Hong</name><age>30</age></person>\
        <person id=\"2\"><name>Kim</name><age>25</age></person>\
        </root>";

    #[test]
    fn test_search_by_attribute_returns_full_attributes_in_order() {
        let root = parse(
            "<log>\
             <emotion worker=\"003\" id=\"a\"/>\
             <group><emotion worker=\"004\" id=\"b\"/><emotion worker=\"003\" id=\"c\"/></group>\
             </log>",
        );

        let hits = root.search_by_attribute("emotion", "worker", "003");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, "emotion");
        assert_eq!(hits[0].1.get("id").map(String::as_str), Some("a"));
        assert_eq!(hits[1].1.get("id").map(String::as_str), Some("c"));

        assert!(root.search_by_attribute("emotion", "worker", "999").is_empty());
        assert!(root.search_by_attribute("emotion", "worker", " 003").is_empty());
    }

    #[test]
    fn test_search_includes_root() {
        let root = parse("<job priority=\"high\"><job priority=\"high\"/></job>");
        assert_eq!(root.search_by_attribute("job", "priority", "high").len(), 2);
    }

    #[test]
    fn test_find_and_contents() {
        let root = parse(PEOPLE);
        assert_eq!(root.tag_content("name"), Some("Hong".to_string()));
        assert_eq!(root.tag_contents("name"), vec!["Hong", "Kim"]);
        assert_eq!(root.find_all("person").len(), 2);
        assert!(root.find("root").is_none());
        assert_eq!(root.tag_content("missing"), None);
    }

    #[test]
    fn test_replace_tag_content() {
        let mut root = parse(PEOPLE);
        assert_eq!(root.replace_tag_content("age", "40"), 2);
        assert_eq!(root.tag_contents("age"), vec!["40", "40"]);
    }

    #[test]
    fn test_add_sub_element() {
        let mut root = parse("<root/>");
        let note = root.add_sub_element("note", "hello");
        assert!(note
            .and_then(|note| note.add_sub_element("empty", ""))
            .is_some());
        let note = root.find("note").cloned().unwrap_or_default();
        assert_eq!(note.text(), Some("hello".to_string()));
        assert!(note.find("empty").is_some_and(|e| e.children.is_empty()));
    }

    #[test]
    fn test_remove_tag_removes_first_direct_child_per_element() {
        let mut root = parse("<r><x/><x/><a><x/></a></r>");
        assert_eq!(root.remove_tag("x"), 2);
        assert_eq!(root.find_all("x").len(), 1);
    }

    #[test]
    fn test_remove_empty_tags_cascades() {
        let mut root = parse("<r><a><b/></a><c k=\"v\"/><d>text</d><e/></r>");
        assert_eq!(root.remove_empty_tags(), 3);
        let names: Vec<_> = root.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "d"]);
    }
}
