//! Minimal mutable XML tree on top of `quick-xml` events.
//!
//! Package, navigation and section documents are edited in place by the
//! integrity passes, so they are held as a tree rather than re-parsed per
//! operation. Qualified names are stored verbatim (`dc:title`), lookups
//! match on the local part only.

use crate::error::{EpubError, Result};
use quick_xml::Reader;
use quick_xml::escape::{escape, partial_escape, unescape_with};
use quick_xml::events::{BytesStart, Event};

/// HTML elements that never have content. Section markup often omits the
/// closing slash on these.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl Node {
    fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".into(),
            encoding: Some("utf-8".into()),
            standalone: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub declaration: Option<Declaration>,
    pub doctype: Option<String>,
    /// Comments and processing instructions ahead of the root element.
    /// They are written after the DOCTYPE.
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Comments and processing instructions after the root element.
    pub epilog: Vec<Node>,
}

/// How a tree is written back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Whitespace exactly as held in the tree.
    Preserve,
    /// Two-space indentation for element-only content; mixed content is
    /// written inline.
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Strict,
    Html,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn local_name(&self) -> &str {
        self.name.rsplit_once(':').map_or(&self.name, |(_, local)| local)
    }

    /// Namespace-agnostic name test.
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(idx).1)
    }

    /// Element children in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|el| el.is(local))
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|el| el.is(local))
    }

    /// First child with the given local name, appending one built by
    /// `make` when there is none.
    pub fn child_or_insert(&mut self, local: &str, make: impl FnOnce() -> Element) -> &mut Element {
        let idx = match self
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(el) if el.is(local)))
        {
            Some(idx) => idx,
            None => {
                self.children.push(Node::Element(make()));
                self.children.len() - 1
            }
        };
        match &mut self.children[idx] {
            Node::Element(el) => el,
            _ => unreachable!("position matched an element node"),
        }
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |el| el.is(local))
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Element> = self.elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// First descendant with the given local name.
    pub fn find(&self, local: &str) -> Option<&Element> {
        self.descendants().find(|el| el.is(local))
    }

    pub fn find_mut(&mut self, local: &str) -> Option<&mut Element> {
        for el in self.elements_mut() {
            if el.is(local) {
                return Some(el);
            }
            if let Some(found) = el.find_mut(local) {
                return Some(found);
            }
        }
        None
    }

    /// Visit `self` and every descendant element, pre-order.
    pub fn walk_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        f(self);
        for child in self.elements_mut() {
            child.walk_mut(f);
        }
    }

    /// Drop child elements for which `keep` returns false, recursively.
    pub fn retain_descendants<F: FnMut(&Element) -> bool>(&mut self, keep: &mut F) {
        self.children.retain(|node| match node {
            Node::Element(el) => keep(el),
            _ => true,
        });
        for child in self.elements_mut() {
            child.retain_descendants(keep);
        }
    }

    /// Concatenated text of all descendant text and CDATA nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                Node::Element(el) => el.collect_text(out),
                _ => {}
            }
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Serialized children, whitespace preserved.
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            write_node(&mut out, node, Style::Preserve, 0);
        }
        out
    }

    pub fn to_xml(&self, style: Style) -> String {
        let mut out = String::new();
        write_element(&mut out, self, style, 0);
        out
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        let next = self.stack.pop()?;
        let mut children: Vec<&Element> = next.elements().collect();
        children.reverse();
        self.stack.extend(children);
        Some(next)
    }
}

impl XmlDocument {
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Some(Declaration::default()),
            doctype: None,
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Parse a well-formed XML document. `origin` names the source in errors.
    pub fn parse(input: &str, origin: &str) -> Result<Self> {
        parse(input, origin, Mode::Strict)
    }

    /// Parse XHTML, closing void elements that lack a slash and decoding
    /// HTML named entities.
    pub fn parse_html(input: &str, origin: &str) -> Result<Self> {
        parse(input, origin, Mode::Html)
    }

    pub fn to_xml(&self, style: Style) -> String {
        let mut out = String::new();
        if let Some(decl) = &self.declaration {
            out.push_str(&format!("<?xml version=\"{}\"", decl.version));
            if let Some(encoding) = &decl.encoding {
                out.push_str(&format!(" encoding=\"{encoding}\""));
            }
            if let Some(standalone) = &decl.standalone {
                out.push_str(&format!(" standalone=\"{standalone}\""));
            }
            out.push_str("?>\n");
        }
        if let Some(doctype) = &self.doctype {
            out.push_str(&format!("<!DOCTYPE {doctype}>\n"));
        }
        for node in &self.prolog {
            write_node(&mut out, node, style, 0);
            out.push('\n');
        }
        write_element(&mut out, &self.root, style, 0);
        out.push('\n');
        for node in &self.epilog {
            write_node(&mut out, node, style, 0);
            out.push('\n');
        }
        out
    }
}

/// Parse an XHTML fragment (element and text siblings without a common
/// parent) into nodes.
pub fn parse_fragment(markup: &str, origin: &str) -> Result<Vec<Node>> {
    let wrapped = format!("<fragment>{markup}</fragment>");
    let doc = parse(&wrapped, origin, Mode::Html)?;
    Ok(doc.root.children)
}

fn parse(input: &str, origin: &str, mode: Mode) -> Result<XmlDocument> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().check_end_names = mode == Mode::Strict;

    let malformed = |detail: String| EpubError::Malformed {
        path: origin.to_string(),
        detail,
    };

    let mut declaration = None;
    let mut doctype = None;
    let mut root: Option<Element> = None;
    let mut stack: Vec<Element> = Vec::new();
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Decl(decl)) => {
                let version = decl
                    .version()
                    .map(|v| String::from_utf8_lossy(&v).into_owned())
                    .unwrap_or_else(|_| "1.0".into());
                let encoding = decl
                    .encoding()
                    .and_then(|e| e.ok())
                    .map(|e| String::from_utf8_lossy(&e).into_owned());
                let standalone = decl
                    .standalone()
                    .and_then(|s| s.ok())
                    .map(|s| String::from_utf8_lossy(&s).into_owned());
                declaration = Some(Declaration {
                    version,
                    encoding,
                    standalone,
                });
            }
            Ok(Event::DocType(text)) => {
                doctype = Some(String::from_utf8_lossy(&text).trim().to_string());
            }
            Ok(Event::Start(start)) => {
                let el = element_from(&start, mode);
                if mode == Mode::Html && is_void(el.local_name()) {
                    attach(&mut stack, &mut root, Node::Element(el));
                } else {
                    stack.push(el);
                }
            }
            Ok(Event::Empty(start)) => {
                let el = element_from(&start, mode);
                attach(&mut stack, &mut root, Node::Element(el));
            }
            Ok(Event::End(end)) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                if mode == Mode::Html {
                    let local = name.rsplit_once(':').map_or(name.as_str(), |(_, l)| l);
                    if is_void(local) || !stack.iter().any(|el| el.name == name) {
                        continue;
                    }
                    while let Some(el) = stack.pop() {
                        let done = el.name == name;
                        attach(&mut stack, &mut root, Node::Element(closed(el)));
                        if done {
                            break;
                        }
                    }
                } else {
                    let el = stack
                        .pop()
                        .ok_or_else(|| malformed(format!("unexpected </{name}>")))?;
                    attach(&mut stack, &mut root, Node::Element(closed(el)));
                }
            }
            Ok(Event::Text(text)) => {
                if !stack.is_empty() {
                    let raw = String::from_utf8_lossy(&text);
                    attach(&mut stack, &mut root, Node::Text(unescape(&raw)));
                }
            }
            Ok(Event::CData(data)) => {
                if !stack.is_empty() {
                    let raw = String::from_utf8_lossy(&data).into_owned();
                    attach(&mut stack, &mut root, Node::CData(raw));
                }
            }
            Ok(Event::Comment(text)) => {
                let node = Node::Comment(String::from_utf8_lossy(&text).into_owned());
                attach_or_keep(&mut stack, &mut root, &mut prolog, &mut epilog, node);
            }
            Ok(Event::PI(pi)) => {
                let node = Node::ProcessingInstruction(String::from_utf8_lossy(&pi).into_owned());
                attach_or_keep(&mut stack, &mut root, &mut prolog, &mut epilog, node);
            }
            Ok(Event::Eof) => break,
            Err(source) => {
                return Err(EpubError::Xml {
                    path: origin.to_string(),
                    position: reader.error_position(),
                    source,
                });
            }
        }
    }

    if !stack.is_empty() {
        if mode == Mode::Strict {
            let open = stack.last().map(|el| el.name.clone()).unwrap_or_default();
            return Err(malformed(format!("unclosed <{open}>")));
        }
        while let Some(el) = stack.pop() {
            attach(&mut stack, &mut root, Node::Element(closed(el)));
        }
    }

    let root = root.ok_or_else(|| malformed("no root element".into()))?;
    Ok(XmlDocument {
        declaration,
        doctype,
        prolog,
        root,
        epilog,
    })
}

/// Attach `node` inside the open element, or keep it beside the root when
/// no element is open.
fn attach_or_keep(
    stack: &mut [Element],
    root: &mut Option<Element>,
    prolog: &mut Vec<Node>,
    epilog: &mut Vec<Node>,
    node: Node,
) {
    if !stack.is_empty() {
        attach(stack, root, node);
    } else if root.is_none() {
        prolog.push(node);
    } else {
        epilog.push(node);
    }
}

/// An element written as `<a></a>` keeps an explicit end tag on output.
fn closed(mut el: Element) -> Element {
    if el.children.is_empty() {
        el.children.push(Node::Text(String::new()));
    }
    el
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if let Node::Element(el) = node
        && root.is_none()
    {
        *root = Some(el);
    }
}

fn element_from(start: &BytesStart<'_>, mode: Mode) -> Element {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let attrs = match mode {
        Mode::Strict => start.attributes(),
        Mode::Html => start.html_attributes(),
    };
    let attributes = attrs
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            (key, unescape(&raw))
        })
        .collect();
    Element {
        name,
        attributes,
        children: Vec::new(),
    }
}

fn is_void(local: &str) -> bool {
    VOID_ELEMENTS.contains(&local.to_ascii_lowercase().as_str())
}

fn unescape(raw: &str) -> String {
    match unescape_with(raw, resolve_entity) {
        Ok(text) => text.into_owned(),
        Err(_) => raw.to_string(),
    }
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        "nbsp" => "\u{a0}",
        "shy" => "\u{ad}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "bdquo" => "\u{201e}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "middot" => "\u{b7}",
        "bull" => "\u{2022}",
        "deg" => "\u{b0}",
        "times" => "\u{d7}",
        "sect" => "\u{a7}",
        _ => return None,
    };
    Some(value)
}

fn write_node(out: &mut String, node: &Node, style: Style, depth: usize) {
    match node {
        Node::Element(el) => write_element(out, el, style, depth),
        Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
        Node::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::ProcessingInstruction(text) => {
            out.push_str("<?");
            out.push_str(text);
            out.push_str("?>");
        }
    }
}

fn write_element(out: &mut String, el: &Element, style: Style, depth: usize) {
    out.push('<');
    out.push_str(&el.name);
    for (key, value) in &el.attributes {
        out.push_str(&format!(" {key}=\"{}\"", escape(value.as_str())));
    }
    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let element_only = el.children.iter().all(|n| {
        matches!(n, Node::Element(_) | Node::Comment(_)) || n.is_blank_text()
    }) && el.children.iter().any(|n| matches!(n, Node::Element(_)));

    if style == Style::Pretty && element_only {
        let indent = "  ".repeat(depth + 1);
        for child in el.children.iter().filter(|n| !n.is_blank_text()) {
            out.push('\n');
            out.push_str(&indent);
            write_node(out, child, style, depth + 1);
        }
        out.push('\n');
        out.push_str(&"  ".repeat(depth));
    } else {
        for child in &el.children {
            write_node(out, child, Style::Preserve, depth + 1);
        }
    }

    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}
