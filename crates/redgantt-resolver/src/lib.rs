//! # redgantt-resolver
//!
//! Turns the flat result of a filter query into a laid-out row sequence.
//!
//! Two stages:
//! 1. [`resolve`] finds, for every targeted issue, the root the report
//!    should start from (optionally climbing to the topmost ancestor) and,
//!    under the eager strategy, pre-materializes the whole ancestor forest.
//! 2. [`layout_rows`] walks each root in deterministic preorder and assigns
//!    every issue exactly one row and an indentation depth.
//!
//! All run-scoped state (cache, target set, registered set) lives in
//! [`RunContext`], passed explicitly through every call.

mod context;
mod layout;
mod resolve;

pub use context::{RegisteredSet, RunContext, TargetSet};
pub use layout::{layout_rows, LayoutConfig};
pub use redgantt_core::RowPlacement;
pub use resolve::{
    has_targeted_descendant, resolve, topmost, ResolveStrategy, ResolvedForest, ResolverConfig,
};
