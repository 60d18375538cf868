// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout loading errors.

use std::path::PathBuf;

use thiserror::Error;

/// Why a layout file could not be used.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The file could not be read.
    #[error("failed to read layout `{}`: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid serialized node tree.
    #[error("malformed layout tree: {0}")]
    Json(#[from] serde_json::Error),
    /// The root node is not `mamelayout`.
    #[error("root node must be `mamelayout`, found `{0}`")]
    BadRoot(String),
    /// The root node's version is not supported.
    #[error("unsupported layout version `{0}`")]
    Version(String),
    /// A required attribute is absent.
    #[error("`{node}` is missing required attribute `{attr}`")]
    MissingAttribute {
        /// Node name.
        node: String,
        /// Attribute name.
        attr: &'static str,
    },
    /// A node appears where it is not allowed.
    #[error("unknown node `{node}` inside `{parent}`")]
    UnknownNode {
        /// Enclosing node name.
        parent: String,
        /// Offending node name.
        node: String,
    },
    /// An attribute could not be parsed as a number.
    #[error("invalid number `{value}` for attribute `{attr}`")]
    BadNumber {
        /// Attribute name.
        attr: String,
        /// Attribute text after substitution.
        value: String,
    },
    /// Bounds with inverted corners.
    #[error("illegal bounds ({x0}, {y0})-({x1}, {y1})")]
    Bounds {
        /// Left edge.
        x0: f64,
        /// Top edge.
        y0: f64,
        /// Right edge.
        x1: f64,
        /// Bottom edge.
        y1: f64,
    },
    /// A color channel outside `0.0..=1.0`.
    #[error("color channel `{channel}` out of range: {value}")]
    Color {
        /// Channel name.
        channel: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A rotation other than 0, 90, 180 or 270 degrees.
    #[error("invalid rotation {0}")]
    Rotation(i64),
    /// A view item names an element that does not exist.
    #[error("view `{view}` references unknown element `{element}`")]
    UnknownElement {
        /// View name.
        view: String,
        /// Missing element name.
        element: String,
    },
    /// A screen item without a valid screen index.
    #[error("view `{view}` has a screen item with invalid index {index}")]
    ScreenIndex {
        /// View name.
        view: String,
        /// Index as authored.
        index: i64,
    },
    /// The file defines no views.
    #[error("layout defines no views")]
    NoViews,
}
