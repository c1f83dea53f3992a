//! Native search engine for reload routing models.
//!
//! This crate provides [`NativeEngine`], an in-process implementation of
//! [`RoutingEngine`](reload_core::RoutingEngine) backed by `vrp-core`.
//! Mandatory nodes are searched as `vrp-core` jobs; reload stops are spliced
//! into every candidate route where its load, travel budget and time windows
//! need them, so the search prices and checks routes as they will be driven.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod engine;
mod realise;
mod schedule;
mod vrp;

pub use engine::{NativeEngine, NativeEngineConfig};
