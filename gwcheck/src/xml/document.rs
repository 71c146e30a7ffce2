//! XML document wrapper.

use std::fmt;

use xmltree::{Element, EmitterConfig, XMLNode};

use super::element::ElementExt;
use super::XmlError;

/// Attribute some server-side serializers use for type hints.
const CLASS_ATTRIBUTE: &str = "class";

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Wraps an element as the document root.
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parses a document from raw bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        Element::parse(bytes)
            .map(Self::new)
            .map_err(|e| XmlError::Parse(e.to_string()))
    }

    /// Parses a document from text.
    pub fn parse_str(text: &str) -> Result<Self, XmlError> {
        Self::parse(text.as_bytes())
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serializes the document, including the XML declaration.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut buffer = Vec::new();
        let config = EmitterConfig::new()
            .perform_indent(false)
            .write_document_declaration(true);
        self.root
            .write_with_config(&mut buffer, config)
            .map_err(|e| XmlError::Write(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| XmlError::Write(e.to_string()))
    }

    /// All elements reached by the path.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let Some(segments) = self.resolve_segments(path) else {
            return Vec::new();
        };

        let mut current = vec![&self.root];
        for segment in segments {
            current = current
                .into_iter()
                .flat_map(|e| e.child_elements().filter(move |c| c.name == segment))
                .collect();
        }
        current
    }

    /// First element reached by the path.
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }

    /// First element reached by the path, mutably.
    pub fn find_mut(&mut self, path: &str) -> Option<&mut Element> {
        let segments = self.resolve_segments(path)?;
        let mut current = &mut self.root;
        for segment in segments {
            current = current.child_mut(segment)?;
        }
        Some(current)
    }

    /// Like [`find_mut`](Self::find_mut) but reports a missing element as an
    /// error, for use inside mutations.
    pub fn require_mut(&mut self, path: &str) -> Result<&mut Element, XmlError> {
        let root = self.root.name.clone();
        self.find_mut(path).ok_or_else(|| XmlError::MissingElement {
            root,
            path: path.to_string(),
        })
    }

    /// Text of the first element reached by the path.
    pub fn text_at(&self, path: &str) -> Option<String> {
        self.find(path).and_then(ElementExt::text)
    }

    /// Whether any element reached by the path has exactly this text.
    pub fn has_text_at(&self, path: &str, text: &str) -> bool {
        self.find_all(path)
            .into_iter()
            .any(|e| e.text().as_deref() == Some(text))
    }

    /// First element anywhere in the tree with the given name.
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        find_descendant(&self.root, name)
    }

    /// First element anywhere in the tree with the given name, mutably.
    pub fn descendant_mut(&mut self, name: &str) -> Option<&mut Element> {
        find_descendant_mut(&mut self.root, name)
    }

    /// Removes every `class` attribute in the tree.
    pub fn strip_class_attributes(&mut self) -> usize {
        self.root.strip_attribute_recursive(CLASS_ATTRIBUTE)
    }

    /// Compares two documents element by element.
    ///
    /// Element names, attributes, trimmed text and child order must match.
    /// Elements whose name is listed in `ignored` are skipped on both sides,
    /// together with their subtrees.
    pub fn structurally_eq_ignoring(&self, other: &Document, ignored: &[&str]) -> bool {
        elements_eq(&self.root, &other.root, ignored)
    }

    fn resolve_segments<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let anchored = path.starts_with('/');
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if anchored {
            if segments.first() != Some(&self.root.name.as_str()) {
                return None;
            }
            segments.remove(0);
        }
        Some(segments)
    }
}

impl From<Element> for Document {
    fn from(root: Element) -> Self {
        Self::new(root)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_xml() {
            Ok(xml) => f.write_str(&xml),
            Err(_) => write!(f, "<{}/>", self.root.name),
        }
    }
}

fn find_descendant<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    element.child_elements().find_map(|child| {
        if child.name == name {
            Some(child)
        } else {
            find_descendant(child, name)
        }
    })
}

fn find_descendant_mut<'a>(element: &'a mut Element, name: &str) -> Option<&'a mut Element> {
    for child in element.children.iter_mut().filter_map(XMLNode::as_mut_element) {
        if child.name == name {
            return Some(child);
        }
        if let Some(found) = find_descendant_mut(child, name) {
            return Some(found);
        }
    }
    None
}

fn elements_eq(a: &Element, b: &Element, ignored: &[&str]) -> bool {
    if a.name != b.name || a.attributes != b.attributes || a.text() != b.text() {
        return false;
    }

    let kept = |e: &&Element| !ignored.contains(&e.name.as_str());
    let mut left = a.child_elements().filter(kept);
    let mut right = b.child_elements().filter(kept);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if elements_eq(x, y, ignored) => continue,
            _ => return false,
        }
    }
}
