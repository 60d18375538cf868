// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout files and the fallback search.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builtin;
use crate::element::LayoutElement;
use crate::error::LayoutError;
use crate::node::Node;
use crate::subst::{ScreenInfo, Substitutions, parse_int};
use crate::view::LayoutView;

/// The only layout format version understood.
pub const LAYOUT_VERSION: i64 = 2;

/// Parsed elements and views of one layout source.
#[derive(Clone, Debug)]
pub struct LayoutFile {
    elements: Vec<Arc<LayoutElement>>,
    views: Vec<LayoutView>,
}

impl LayoutFile {
    /// Parses a `mamelayout` tree.
    pub fn parse(root: &Node, subst: &Substitutions) -> Result<Self, LayoutError> {
        if root.name != "mamelayout" {
            return Err(LayoutError::BadRoot(root.name.clone()));
        }
        let version = root.attr("version").unwrap_or_default();
        if parse_int(&version) != Some(LAYOUT_VERSION) {
            return Err(LayoutError::Version(version));
        }

        let mut elements = Vec::new();
        let mut views = Vec::new();
        for child in &root.children {
            match child.name.as_str() {
                "element" => elements.push(Arc::new(LayoutElement::parse(child, subst)?)),
                "view" => views.push(LayoutView::parse(child, &elements, subst)?),
                other => {
                    return Err(LayoutError::UnknownNode {
                        parent: root.name.clone(),
                        node: other.to_owned(),
                    });
                }
            }
        }
        if views.is_empty() {
            return Err(LayoutError::NoViews);
        }
        Ok(Self { elements, views })
    }

    /// Parses the JSON form of a layout tree.
    pub fn from_json(text: &str, subst: &Substitutions) -> Result<Self, LayoutError> {
        Self::parse(&Node::from_json(text)?, subst)
    }

    /// Reads and parses a layout file.
    pub fn load(path: &Path, subst: &Substitutions) -> Result<Self, LayoutError> {
        let text = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text, subst)
    }

    /// Elements in document order.
    #[must_use]
    pub fn elements(&self) -> &[Arc<LayoutElement>] {
        &self.elements
    }

    /// Looks up an element by name.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&Arc<LayoutElement>> {
        self.elements.iter().find(|e| e.name() == name)
    }

    /// Views in document order.
    #[must_use]
    pub fn views(&self) -> &[LayoutView] {
        &self.views
    }

    /// Views, for recomputation.
    pub fn views_mut(&mut self) -> &mut [LayoutView] {
        &mut self.views
    }
}

/// Where to look for a layout.
#[derive(Clone, Debug, Default)]
pub struct LayoutRequest {
    /// A file named explicitly by the user; tried first.
    pub explicit: Option<PathBuf>,
    /// Directory holding `<machine>.json` and `default.json`.
    pub directory: Option<PathBuf>,
    /// Machine short name.
    pub machine: Option<String>,
}

impl LayoutRequest {
    /// Candidate files in search order.
    #[must_use]
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        if let Some(explicit) = &self.explicit {
            out.push(explicit.clone());
        }
        if let Some(dir) = &self.directory {
            if let Some(machine) = &self.machine {
                out.push(dir.join(format!("{machine}.json")));
            }
            out.push(dir.join("default.json"));
        }
        out
    }
}

/// Loads the first usable layout in search order, falling back to the
/// built-in layout for the number of screens.
///
/// Files that fail to load are skipped with a warning.
///
/// # Panics
///
/// Panics if the built-in single-screen layout itself fails to parse.
#[must_use]
pub fn load_layout(request: &LayoutRequest, screens: &[ScreenInfo]) -> LayoutFile {
    let subst = Substitutions::for_screens(screens);
    for path in request.candidates() {
        match LayoutFile::load(&path, &subst) {
            Ok(file) => {
                log::debug!("loaded layout `{}`", path.display());
                return file;
            }
            Err(LayoutError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound
                    && request.explicit.as_deref() != Some(path.as_path()) =>
            {
                log::debug!("no layout at `{}`", path.display());
            }
            Err(err) => log::warn!("skipping layout `{}`: {err}", path.display()),
        }
    }
    builtin::for_screens(screens.len(), &subst)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "name": "mamelayout",
        "attrs": { "version": "2" },
        "children": [
            { "name": "element", "attrs": { "name": "frame" },
              "children": [ { "name": "rect" } ] },
            { "name": "view", "attrs": { "name": "Main" },
              "children": [
                { "name": "bezel", "attrs": { "element": "frame" } },
                { "name": "screen", "attrs": { "index": 0 } }
              ] }
        ]
    }"#;

    #[test]
    fn parses_minimal_layout() {
        let file = LayoutFile::from_json(MINIMAL, &Substitutions::new()).unwrap();
        assert_eq!(file.views().len(), 1);
        assert_eq!(file.views()[0].name(), "Main");
        assert!(file.element("frame").is_some());
    }

    #[test]
    fn rejects_wrong_root_and_version() {
        let s = Substitutions::new();
        let root = Node::new("layout").with_attr("version", 2_i64);
        assert!(matches!(LayoutFile::parse(&root, &s), Err(LayoutError::BadRoot(_))));
        let old = Node::new("mamelayout").with_attr("version", 1_i64);
        assert!(matches!(LayoutFile::parse(&old, &s), Err(LayoutError::Version(_))));
        let empty = Node::new("mamelayout").with_attr("version", 2_i64);
        assert!(matches!(LayoutFile::parse(&empty, &s), Err(LayoutError::NoViews)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            LayoutFile::from_json("{", &Substitutions::new()),
            Err(LayoutError::Json(_))
        ));
    }

    #[test]
    fn candidates_follow_search_order() {
        let request = LayoutRequest {
            explicit: Some("custom.json".into()),
            directory: Some("art".into()),
            machine: Some("pacman".into()),
        };
        let paths = request.candidates();
        assert_eq!(
            paths,
            [
                PathBuf::from("custom.json"),
                Path::new("art").join("pacman.json"),
                Path::new("art").join("default.json"),
            ]
        );
    }

    #[test]
    fn falls_back_to_builtin_when_nothing_loads() {
        let request = LayoutRequest {
            explicit: Some("/nonexistent/bezel/layout.json".into()),
            directory: Some("/nonexistent/bezel".into()),
            machine: Some("pacman".into()),
        };
        let file = load_layout(&request, &[ScreenInfo::new(224, 288)]);
        assert!(!file.views().is_empty());
        assert!(file.views()[0].has_screen(0));
    }
}
