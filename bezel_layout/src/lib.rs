// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data-driven artwork layouts.
//!
//! A layout describes decorative artwork (backdrops, overlays, bezels) placed
//! around one or more live screens. Layouts are parsed once from a node tree
//! and are immutable afterwards, except for per-view geometry that is
//! recomputed when the set of visible layers changes.
//!
//! # Architecture
//!
//! ```text
//!   JSON ──► Node ──► LayoutFile { elements, views }
//!                         │             │
//!                         ▼             ▼
//!                  LayoutElement    LayoutView ── recompute(LayerConfig)
//!                         │
//!                         ▼
//!                  ElementScaler (draws a state into a bitmap)
//! ```
//!
//! **[`node`]**: The generic tree a layout file deserializes into.
//!
//! **[`subst`]**: `~token~` substitution and numeric literal parsing.
//!
//! **[`element`]**: Elements and their components.
//!
//! **[`draw`]**: Component rasterization and the asset seams.
//!
//! **[`view`]**: Views, layers and bounds normalization.
//!
//! **[`file`]**: Whole layout files and the fallback search.
//!
//! **[`builtin`]**: Layouts used when no file loads.
//!
//! **[`error`]**: [`LayoutError`](error::LayoutError).

pub mod builtin;
pub mod draw;
pub mod element;
pub mod error;
pub mod file;
pub mod node;
pub mod subst;
pub mod view;
