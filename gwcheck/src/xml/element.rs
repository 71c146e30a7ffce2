//! Element helpers used by resource edits.

use xmltree::{Element, XMLNode};

/// Creates `<name>text</name>`.
pub fn text_element(name: &str, text: impl Into<String>) -> Element {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(text.into()));
    element
}

/// Convenience accessors and edits on [`Element`].
pub trait ElementExt {
    /// Trimmed text content, if the element has any.
    fn text(&self) -> Option<String>;

    /// Replaces all text content.
    fn set_text(&mut self, text: impl Into<String>);

    /// Iterates over element children, skipping text and comments.
    fn child_elements(&self) -> Box<dyn Iterator<Item = &Element> + '_>;

    /// First child element with the given name.
    fn child(&self, name: &str) -> Option<&Element>;

    /// Mutable first child element with the given name.
    fn child_mut(&mut self, name: &str) -> Option<&mut Element>;

    /// Text of the first child element with the given name.
    fn child_text(&self, name: &str) -> Option<String>;

    /// Returns the named child, appending an empty one if absent.
    fn ensure_child(&mut self, name: &str) -> &mut Element;

    /// Sets the text of the named child, appending the child if absent.
    fn set_child_text(&mut self, name: &str, text: impl Into<String>);

    /// Appends a child element.
    fn push_child(&mut self, child: Element);

    /// Removes child elements matching the predicate and returns how many
    /// were removed.
    fn remove_children_where<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(&Element) -> bool;

    /// Removes the attribute from this element and every descendant.
    fn strip_attribute_recursive(&mut self, attribute: &str) -> usize;
}

impl ElementExt for Element {
    fn text(&self) -> Option<String> {
        self.get_text().map(|t| t.trim().to_string())
    }

    fn set_text(&mut self, text: impl Into<String>) {
        self.children
            .retain(|n| !matches!(n, XMLNode::Text(_) | XMLNode::CData(_)));
        self.children.push(XMLNode::Text(text.into()));
    }

    fn child_elements(&self) -> Box<dyn Iterator<Item = &Element> + '_> {
        Box::new(self.children.iter().filter_map(XMLNode::as_element))
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .filter_map(XMLNode::as_element)
            .find(|e| e.name == name)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(XMLNode::as_mut_element)
            .find(|e| e.name == name)
    }

    fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(ElementExt::text)
    }

    fn ensure_child(&mut self, name: &str) -> &mut Element {
        let index = self
            .children
            .iter()
            .position(|n| matches!(n, XMLNode::Element(e) if e.name == name));

        let index = match index {
            Some(i) => i,
            None => {
                self.children.push(XMLNode::Element(Element::new(name)));
                self.children.len() - 1
            }
        };

        match &mut self.children[index] {
            XMLNode::Element(e) => e,
            _ => unreachable!("index points at an element"),
        }
    }

    fn set_child_text(&mut self, name: &str, text: impl Into<String>) {
        self.ensure_child(name).set_text(text);
    }

    fn push_child(&mut self, child: Element) {
        self.children.push(XMLNode::Element(child));
    }

    fn remove_children_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Element) -> bool,
    {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, XMLNode::Element(e) if predicate(e)));
        before - self.children.len()
    }

    fn strip_attribute_recursive(&mut self, attribute: &str) -> usize {
        let mut removed = 0;
        if self.attributes.contains_key(attribute) {
            self.attributes.retain(|name, _| name != attribute);
            removed += 1;
        }
        for child in self.children.iter_mut().filter_map(XMLNode::as_mut_element) {
            removed += child.strip_attribute_recursive(attribute);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> Element {
        let mut root = Element::new("GeoServerLayer");
        let mut subsets = Element::new("gridSubsets");
        let mut subset = Element::new("gridSubset");
        subset.push_child(text_element("gridSetName", "EPSG:4326"));
        subsets.push_child(subset);
        root.push_child(subsets);
        root
    }

    #[test]
    fn test_text_is_trimmed() {
        let element = text_element("name", "  EPSG:4326\n");
        assert_eq!(element.text().as_deref(), Some("EPSG:4326"));
    }

    #[test]
    fn test_set_text_replaces_existing_text() {
        let mut element = text_element("tileHeight", "200");
        element.set_text("256");
        assert_eq!(element.text().as_deref(), Some("256"));
        assert_eq!(element.children.len(), 1);
    }

    #[test]
    fn test_ensure_child_reuses_existing() {
        let mut root = layer();
        root.ensure_child("gridSubsets");
        assert_eq!(root.child_elements().count(), 1);

        root.ensure_child("blobStoreId");
        assert_eq!(root.child_elements().count(), 2);
    }

    #[test]
    fn test_set_child_text_creates_child() {
        let mut root = layer();
        root.set_child_text("blobStoreId", "testBlobStore");
        assert_eq!(
            root.child_text("blobStoreId").as_deref(),
            Some("testBlobStore")
        );
    }

    #[test]
    fn test_remove_children_where() {
        let mut root = layer();
        let subsets = root.child_mut("gridSubsets").unwrap();
        let removed = subsets
            .remove_children_where(|e| e.child_text("gridSetName").as_deref() == Some("EPSG:4326"));
        assert_eq!(removed, 1);
        assert_eq!(subsets.child_elements().count(), 0);
    }

    #[test]
    fn test_strip_attribute_recursive() {
        let mut root = layer();
        root.attributes.insert("class".to_string(), "x".to_string());
        root.child_mut("gridSubsets")
            .unwrap()
            .attributes
            .insert("class".to_string(), "y".to_string());
        root.attributes.insert("default".to_string(), "false".to_string());

        assert_eq!(root.strip_attribute_recursive("class"), 2);
        assert!(!root.attributes.contains_key("class"));
        assert!(root.attributes.contains_key("default"));
    }
}
