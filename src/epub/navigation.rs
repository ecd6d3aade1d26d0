use crate::epub::NavPoint;
use crate::epub::path;
use crate::epub::xml::{Element, Style, XmlDocument};
use crate::error::{EpubError, Result};

const SKELETON: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx version="2005-1" xmlns="http://www.daisy.org/z3986/2005/ncx/">
  <head/>
  <docTitle>
    <text/>
  </docTitle>
  <navMap/>
</ncx>"#;

/// The NCX table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationDocument {
    path: String,
    dom: XmlDocument,
}

impl NavigationDocument {
    /// NCX root with an empty head, doc title and navMap.
    pub fn create_default(path: impl Into<String>) -> Result<Self> {
        Self::parse(path, SKELETON)
    }

    pub fn parse(path: impl Into<String>, xml: &str) -> Result<Self> {
        let path = path.into();
        let dom = XmlDocument::parse(xml.trim_start_matches('\u{feff}').trim(), &path)?;
        if !dom.root.is("ncx") {
            return Err(EpubError::InvalidEpub(format!(
                "{path}: root element is <{}>, expected <ncx>",
                dom.root.name
            )));
        }
        Ok(Self { path, dom })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    fn nav_map(&self) -> Option<&Element> {
        self.dom.root.child("navMap")
    }

    fn nav_map_mut(&mut self) -> &mut Element {
        self.dom
            .root
            .child_or_insert("navMap", || Element::new("navMap"))
    }

    pub fn doc_title(&self) -> Option<String> {
        let title = self.dom.root.child("docTitle")?.child("text")?.text();
        Some(title.trim().to_string())
    }

    pub fn set_doc_title(&mut self, title: &str) {
        let doc_title = self
            .dom
            .root
            .child_or_insert("docTitle", || Element::new("docTitle"));
        doc_title
            .child_or_insert("text", || Element::new("text"))
            .set_text(title);
    }

    /// The navMap as a tree.
    pub fn nav_points(&self) -> Vec<NavPoint> {
        self.nav_map()
            .map(|map| map.children_named("navPoint").map(nav_point_from).collect())
            .unwrap_or_default()
    }

    /// Append a navPoint under `parent_id`, or at the top level of the
    /// navMap when no parent is given.
    pub fn append_nav_point(
        &mut self,
        label: &str,
        src: &str,
        id: &str,
        play_order: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<()> {
        let mut nav_point = Element::new("navPoint").with_attr("id", id);
        if let Some(order) = play_order {
            nav_point.set_attr("playOrder", order);
        }
        let nav_point = nav_point
            .with_child(Element::new("navLabel").with_child(Element::new("text").with_text(label)))
            .with_child(Element::new("content").with_attr("src", src));

        let map = self.nav_map_mut();
        let parent = match parent_id {
            None => map,
            Some(parent_id) => find_nav_point_mut(map, parent_id).ok_or_else(|| {
                EpubError::InvalidEpub(format!("navPoint {parent_id} not found"))
            })?,
        };
        parent.push(nav_point);
        Ok(())
    }

    /// Remove the navPoint with `id` together with its children.
    pub fn remove_nav_point(&mut self, id: &str) -> bool {
        let before = count_nav_points(self.nav_map_mut());
        self.nav_map_mut()
            .retain_descendants(&mut |el| !(el.is("navPoint") && el.id() == Some(id)));
        count_nav_points(self.nav_map_mut()) != before
    }

    /// Remove every navPoint whose `content@src` fails `keep`. Returns the
    /// removed srcs.
    pub fn retain_nav_points<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut removed = Vec::new();
        self.nav_map_mut().retain_descendants(&mut |el| {
            if !el.is("navPoint") {
                return true;
            }
            let src = content_src(el).unwrap_or_default();
            if keep(src) {
                true
            } else {
                removed.push(src.to_string());
                false
            }
        });
        removed
    }

    /// Every `content@src` in document order.
    pub fn srcs(&self) -> Vec<String> {
        self.nav_map()
            .into_iter()
            .flat_map(|map| map.descendants())
            .filter(|el| el.is("content"))
            .filter_map(|el| el.attr("src").map(|s| s.to_string()))
            .collect()
    }

    /// Offer every `content@src` to `rewrite`; a returned value replaces it.
    pub fn rewrite_srcs<F>(&mut self, mut rewrite: F) -> usize
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut count = 0;
        self.nav_map_mut().walk_mut(&mut |el| {
            if !el.is("content") {
                return;
            }
            if let Some(src) = el.attr("src")
                && let Some(new_src) = rewrite(src)
                && new_src != src
            {
                el.set_attr("src", new_src);
                count += 1;
            }
        });
        count
    }

    /// Archive path a navPoint src addresses.
    pub fn resolve_src(&self, src: &str) -> String {
        path::resolve(src, &self.path).path
    }

    /// Label of the first navPoint whose src resolves to `target`.
    pub fn title_for_path(&self, target: &str) -> Option<String> {
        flatten(&self.nav_points())
            .into_iter()
            .find(|p| self.resolve_src(&p.src) == target)
            .map(|p| p.label.clone())
    }

    /// Resolved target path of the navPoint with `id`.
    pub fn target_of(&self, id: &str) -> Option<String> {
        flatten(&self.nav_points())
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| self.resolve_src(&p.src))
    }

    pub fn to_xml(&self) -> String {
        self.dom.to_xml(Style::Pretty)
    }
}

/// Depth-first listing of a navPoint tree.
pub fn flatten(points: &[NavPoint]) -> Vec<&NavPoint> {
    let mut out = Vec::new();
    for point in points {
        out.push(point);
        out.extend(flatten(&point.children));
    }
    out
}

fn nav_point_from(el: &Element) -> NavPoint {
    let label = el
        .child("navLabel")
        .and_then(|l| l.child("text"))
        .map(|t| t.text().trim().to_string())
        .unwrap_or_default();
    NavPoint {
        id: el.id().unwrap_or_default().to_string(),
        label,
        src: content_src(el).unwrap_or_default().to_string(),
        play_order: el.attr("playOrder").map(|p| p.to_string()),
        children: el.children_named("navPoint").map(nav_point_from).collect(),
    }
}

fn content_src(nav_point: &Element) -> Option<&str> {
    nav_point.child("content")?.attr("src")
}

fn find_nav_point_mut<'a>(el: &'a mut Element, id: &str) -> Option<&'a mut Element> {
    for child in el.elements_mut() {
        if !child.is("navPoint") {
            continue;
        }
        if child.id() == Some(id) {
            return Some(child);
        }
        if let Some(found) = find_nav_point_mut(child, id) {
            return Some(found);
        }
    }
    None
}

fn count_nav_points(el: &Element) -> usize {
    el.descendants().filter(|e| e.is("navPoint")).count()
}
