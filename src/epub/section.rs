use crate::epub::path::{self, Resolved};
use crate::epub::xml::{self, Element, Node, Style, XmlDocument};
use crate::error::Result;

const SKELETON: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
  <head>
    <meta http-equiv="Content-Type" content="text/html; charset=utf-8"/>
  </head>
  <body></body>
</html>"#;

/// Element/attribute pairs that address another document.
const REFERENCE_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("img", "src"),
    ("image", "href"),
    ("image", "xlink:href"),
    ("link", "href"),
];

/// Words kept when a paragraph stands in for a missing heading.
const TITLE_WORDS: usize = 5;

/// An outbound reference found in a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub element: String,
    pub attribute: String,
    pub value: String,
}

/// An XHTML content document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    path: String,
    dom: XmlDocument,
    linear: Option<bool>,
}

impl Section {
    /// Empty XHTML 1.1 document with a head and a body.
    pub fn create_default(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let dom = XmlDocument::parse_html(SKELETON, &path)?;
        Ok(Self {
            path,
            dom,
            linear: None,
        })
    }

    pub fn parse(path: impl Into<String>, content: &str) -> Result<Self> {
        let path = path.into();
        let dom = XmlDocument::parse_html(content.trim_start_matches('\u{feff}'), &path)?;
        Ok(Self {
            path,
            dom,
            linear: None,
        })
    }

    /// Replace the whole document with `content`.
    pub fn load_xml(&mut self, content: &str) -> Result<()> {
        self.dom = XmlDocument::parse_html(content.trim_start_matches('\u{feff}'), &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn file_name(&self) -> &str {
        path::file_name(&self.path)
    }

    /// The spine `linear` flag this section was registered with.
    pub fn linear(&self) -> Option<bool> {
        self.linear
    }

    pub fn set_linear(&mut self, linear: Option<bool>) {
        self.linear = linear;
    }

    pub fn dom(&self) -> &XmlDocument {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut XmlDocument {
        &mut self.dom
    }

    pub fn head(&self) -> Option<&Element> {
        self.dom.root.child("head")
    }

    pub fn body(&self) -> Option<&Element> {
        self.dom.root.child("body")
    }

    fn body_mut(&mut self) -> &mut Element {
        self.dom.root.child_or_insert("body", || Element::new("body"))
    }

    fn head_mut(&mut self) -> &mut Element {
        let root = &mut self.dom.root;
        if root.child("head").is_none() {
            root.children.insert(0, Node::Element(Element::new("head")));
        }
        root.child_or_insert("head", || Element::new("head"))
    }

    /// Text of `<head><title>`.
    pub fn title_text(&self) -> Option<String> {
        self.head()?.child("title").map(|t| t.text())
    }

    pub fn set_title_text(&mut self, text: &str) {
        let head = self.head_mut();
        match head.child_mut("title") {
            Some(title) => title.set_text(text),
            None => head.push(Element::new("title").with_text(text)),
        }
    }

    /// Inner markup of the body with blank top-level text dropped.
    pub fn body_content(&self) -> String {
        let Some(body) = self.body() else {
            return String::new();
        };
        let mut trimmed = body.clone();
        trimmed
            .children
            .retain(|n| !matches!(n, Node::Text(t) if t.trim().is_empty()));
        trimmed.inner_xml()
    }

    /// Replace the body content with an XHTML fragment.
    pub fn set_body_xhtml(&mut self, markup: &str) -> Result<()> {
        let nodes = xml::parse_fragment(markup, &self.path)?;
        self.body_mut().children = nodes;
        Ok(())
    }

    pub fn append_body_xhtml(&mut self, markup: &str) -> Result<()> {
        let nodes = xml::parse_fragment(markup, &self.path)?;
        self.body_mut().children.extend(nodes);
        Ok(())
    }

    pub fn prepend_body_xhtml(&mut self, markup: &str) -> Result<()> {
        let mut nodes = xml::parse_fragment(markup, &self.path)?;
        let body = self.body_mut();
        nodes.append(&mut body.children);
        body.children = nodes;
        Ok(())
    }

    pub fn clear_body(&mut self) {
        self.body_mut().children.clear();
    }

    pub fn body_id(&self) -> Option<&str> {
        self.body()?.id()
    }

    pub fn set_body_id(&mut self, id: &str) {
        self.body_mut().set_attr("id", id);
    }

    fn heading(&self) -> Option<&Element> {
        self.body()?.descendants().find(|el| {
            matches!(el.local_name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
                && !el.text().trim().is_empty()
        })
    }

    /// Title derived from content: the first non-empty heading, otherwise
    /// the opening words of the first paragraph.
    pub fn heading_title(&self) -> Option<String> {
        if let Some(heading) = self.heading() {
            return Some(collapse_whitespace(&heading.text()));
        }
        let paragraph = self
            .body()?
            .descendants()
            .find(|el| el.is("p") && !el.text().trim().is_empty())?;
        let text = paragraph.text();
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() > TITLE_WORDS {
            Some(format!("{}...", words[..TITLE_WORDS].join(" ")))
        } else {
            Some(words.join(" "))
        }
    }

    /// The id of the heading that [`Section::heading_title`] picked.
    pub fn title_id(&self) -> Option<&str> {
        self.heading()?.id()
    }

    /// Every `id` attribute value in document order.
    pub fn element_ids(&self) -> Vec<&str> {
        std::iter::once(&self.dom.root)
            .chain(self.dom.root.descendants())
            .filter_map(|el| el.id())
            .collect()
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.element_ids().contains(&id)
    }

    /// Set `id` to `new_id` on every element carrying `old_id`.
    pub fn rewrite_id(&mut self, old_id: &str, new_id: &str) -> usize {
        let mut count = 0;
        self.dom.root.walk_mut(&mut |el| {
            if el.id() == Some(old_id) {
                el.set_attr("id", new_id);
                count += 1;
            }
        });
        count
    }

    /// Outbound references (`a@href`, `img@src`, SVG `image` links,
    /// stylesheet links) in document order.
    pub fn references(&self) -> Vec<Reference> {
        let mut refs = Vec::new();
        for el in std::iter::once(&self.dom.root).chain(self.dom.root.descendants()) {
            for (element, attribute) in REFERENCE_ATTRIBUTES {
                if el.is(element)
                    && let Some(value) = el.attr(attribute)
                {
                    refs.push(Reference {
                        element: el.local_name().to_string(),
                        attribute: attribute.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }
        refs
    }

    /// References resolved against this section's own path. External and
    /// empty references are skipped.
    pub fn resolved_references(&self) -> Vec<(Reference, Resolved)> {
        self.references()
            .into_iter()
            .filter(|r| !r.value.is_empty() && !path::is_external(&r.value))
            .map(|r| {
                let resolved = path::resolve(&r.value, &self.path);
                (r, resolved)
            })
            .collect()
    }

    /// Offer every reference to `rewrite`; a returned value replaces the
    /// attribute. Returns the number of attributes changed.
    pub fn rewrite_references<F>(&mut self, mut rewrite: F) -> usize
    where
        F: FnMut(&Reference) -> Option<String>,
    {
        let mut count = 0;
        self.dom.root.walk_mut(&mut |el| {
            for (element, attribute) in REFERENCE_ATTRIBUTES {
                if !el.is(element) {
                    continue;
                }
                let Some(value) = el.attr(attribute) else {
                    continue;
                };
                let reference = Reference {
                    element: el.local_name().to_string(),
                    attribute: attribute.to_string(),
                    value: value.to_string(),
                };
                if let Some(new_value) = rewrite(&reference)
                    && new_value != reference.value
                {
                    el.set_attr(*attribute, new_value);
                    count += 1;
                }
            }
        });
        count
    }

    pub fn to_xml(&self) -> String {
        self.dom.to_xml(Style::Preserve)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
