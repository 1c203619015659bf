// Copyright 2026 Drawbridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Drawbridge — latest New York lottery draw results from two unreliable
//! upstreams, reconciled into one answer.
//!
//! The static results site is fast but occasionally reshuffles its markup;
//! the official site is authoritative but renders everything client-side.
//! Neither can be trusted alone, so both are adapted behind [`reconcile`],
//! validated through [`validate`], and served out of a short-lived
//! single-slot [`cache`].

pub mod cache;
pub mod config;
pub mod model;
pub mod reconcile;
pub mod renderer;
pub mod rest;
pub mod service;
pub mod sources;
pub mod validate;
