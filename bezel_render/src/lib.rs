// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render targets for emulated screens framed by layout artwork.
//!
//! A [`Compositor`](compositor::Compositor) holds the state shared by every
//! output: screens and their containers, bitmaps, textures, the UI container
//! and the element state values. Each [`Target`](target::Target) selects a
//! view of its layout and turns it into a flat, clipped, back-to-front
//! [`PrimitiveList`](primitive::PrimitiveList) for a backend to draw.
//!
//! # Architecture
//!
//! ```text
//!   Compositor ── containers, bitmaps, textures, outputs
//!        │
//!        ▼
//!   Target::get_primitives
//!        │  layers in heuristic order
//!        ├──► screen items ──► container items ──┐
//!        ├──► element items ──► state textures ──┤
//!        ├──► debug containers, UI container ────┤
//!        │                                       ▼
//!        │                                 clip (clip_line / clip_quad)
//!        ▼                                       │
//!   optimize ◄───────────────────────────────────┘
//!        │
//!        ▼
//!   Arc<Mutex<PrimitiveList>>  (one of three per target)
//! ```
//!
//! **[`compositor`]**: Shared registries, screens and the UI target.
//!
//! **[`target`]**: Views, device geometry, the frame walk and hit testing.
//!
//! **[`primitive`]**: Primitives, texture coordinates and lists.
//!
//! **[`clip`]**: Line and quad clipping.
//!
//! **[`optimize`]**: Redraw-region optimization replacing the full clear.
//!
//! **[`config`]**: Persisted per-target and per-screen settings.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): forwards to `bezel_core/trace`, so
//!   [`Target::get_primitives_traced`](target::Target::get_primitives_traced)
//!   reports frame, layer and optimizer events.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod clip;
pub mod compositor;
pub mod config;
pub mod optimize;
pub mod primitive;
pub mod target;
