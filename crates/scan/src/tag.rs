//! Tag values produced by the navigator.

use std::cell::Cell;
use std::rc::Rc;

/// One opened element: name, classes, ordered attributes, nesting depth,
/// and an open/closed flag.
///
/// Invariants:
/// - `depth` is 1 for a top-level tag, else `parent.depth + 1`.
/// - `closed` flips false -> true at most once; only the navigator that
///   produced the tag performs the flip. Self-closing tags are born closed.
/// - `parent` is a lookup-only back-reference. The navigator owns the live
///   path from the root to the innermost open tag; a tag never owns its
///   children. Links are created in scan order only, so the chain is acyclic.
#[derive(Debug)]
pub struct Tag {
    name: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    parent: Option<Rc<Tag>>,
    depth: u32,
    self_closing: bool,
    closed: Cell<bool>,
}

impl Tag {
    pub(crate) fn new(
        name: String,
        classes: Vec<String>,
        attributes: Vec<(String, String)>,
        parent: Option<Rc<Tag>>,
        self_closing: bool,
    ) -> Self {
        let depth = parent.as_ref().map_or(1, |enclosing| enclosing.depth + 1);
        Tag {
            name,
            classes,
            attributes,
            parent,
            depth,
            self_closing,
            closed: Cell::new(self_closing),
        }
    }

    /// Tag name, ASCII-lowercased at scan time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Tokens of the `class` attribute, in document order, empty tokens
    /// discarded.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }

    /// Attributes in document order. `class` is diverted to [`classes`] and
    /// never appears here.
    ///
    /// [`classes`]: Tag::classes
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Value of the named attribute, if present (case-insensitive lookup).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The enclosing tag that was open when this one was created.
    pub fn parent(&self) -> Option<&Rc<Tag>> {
        self.parent.as_ref()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// True for explicit `/>` tags, void tags, and declaration-like tags.
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub(crate) fn mark_closed(&self) {
        self.closed.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, parent: Option<Rc<Tag>>) -> Tag {
        Tag::new(name.to_string(), Vec::new(), Vec::new(), parent, false)
    }

    #[test]
    fn depth_follows_the_parent_chain() {
        let outer = Rc::new(leaf("div", None));
        let middle = Rc::new(leaf("ul", Some(Rc::clone(&outer))));
        let inner = leaf("li", Some(Rc::clone(&middle)));

        assert_eq!(outer.depth(), 1);
        assert_eq!(middle.depth(), outer.depth() + 1);
        assert_eq!(inner.depth(), middle.depth() + 1);
        assert_eq!(inner.parent().map(|p| p.name()), Some("ul"));
    }

    #[test]
    fn self_closing_tags_are_born_closed() {
        let tag = Tag::new("br".to_string(), Vec::new(), Vec::new(), None, true);
        assert!(tag.is_closed());
        assert!(tag.is_self_closing());
    }

    #[test]
    fn name_matching_ignores_ascii_case() {
        let tag = leaf("div", None);
        assert!(tag.is_named("DIV"));
        assert!(tag.is_named("div"));
        assert!(!tag.is_named("span"));
    }

    #[test]
    fn attribute_lookup_is_case_insensitive_and_ordered() {
        let tag = Tag::new(
            "a".to_string(),
            Vec::new(),
            vec![
                ("href".to_string(), "x".to_string()),
                ("title".to_string(), "t".to_string()),
            ],
            None,
            false,
        );
        assert_eq!(tag.attribute("HREF"), Some("x"));
        assert_eq!(tag.attribute("missing"), None);
        let keys: Vec<&str> = tag.attributes().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["href", "title"]);
    }

    #[test]
    fn class_membership_is_exact() {
        let tag = Tag::new(
            "p".to_string(),
            vec!["lead".to_string(), "wide".to_string()],
            Vec::new(),
            None,
            false,
        );
        assert!(tag.has_class("lead"));
        assert!(!tag.has_class("LEAD"));
        assert!(!tag.has_class("narrow"));
    }
}
