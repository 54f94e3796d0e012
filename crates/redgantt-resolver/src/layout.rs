//! Row layout
//!
//! Deterministic preorder walk over the resolved forest. Every issue gets
//! exactly one row: the registered set guards re-entry when multiple
//! targets share an ancestor root. Row numbers start at the data-start
//! offset and increase by one per emitted issue, never reassigned.

use std::collections::HashMap;

use redgantt_core::{Issue, IssueId, IssueRepository, ResolveError, RowPlacement};
use tracing::debug;

use crate::context::RunContext;
use crate::resolve::{has_targeted_descendant, ResolvedForest};

/// Layout parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutConfig {
    /// First data row; rows above it hold the two-level header.
    pub data_start_row: u32,
    /// Indent units added per nesting level.
    pub indent_step: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            data_start_row: 3,
            indent_step: 1,
        }
    }
}

/// Walk the forest and assign rows.
///
/// Roots are visited in resolution order; children in repository
/// enumeration order. Lazy forests prune branches without a targeted
/// descendant; eager forests recurse their materialized links
/// unconditionally.
pub fn layout_rows<R: IssueRepository>(
    cx: &mut RunContext<R>,
    forest: &ResolvedForest,
    config: &LayoutConfig,
) -> Result<Vec<RowPlacement>, ResolveError> {
    let mut rows = Vec::new();
    let mut next_row = config.data_start_row;

    match forest {
        ResolvedForest::Lazy { roots } => {
            for &root in roots {
                walk_lazy(cx, root, 0, config, &mut next_row, &mut rows)?;
            }
        }
        ResolvedForest::Eager { roots, issues } => {
            for &root in roots {
                walk_eager(cx, issues, root, 0, config, &mut next_row, &mut rows);
            }
        }
    }

    debug!(rows = rows.len(), "layout complete");
    Ok(rows)
}

fn walk_lazy<R: IssueRepository>(
    cx: &mut RunContext<R>,
    id: IssueId,
    depth: u16,
    config: &LayoutConfig,
    next_row: &mut u32,
    rows: &mut Vec<RowPlacement>,
) -> Result<(), ResolveError> {
    if !cx.registered.register(id) {
        return Ok(());
    }
    let issue = cx.repo.get(id)?;
    emit(cx, issue, depth, config, next_row, rows);

    let children = cx.repo.children(id)?;
    for child in children {
        if has_targeted_descendant(cx, child.id)? {
            walk_lazy(cx, child.id, depth + 1, config, next_row, rows)?;
        }
    }
    Ok(())
}

fn walk_eager<R: IssueRepository>(
    cx: &mut RunContext<R>,
    issues: &HashMap<IssueId, Issue>,
    id: IssueId,
    depth: u16,
    config: &LayoutConfig,
    next_row: &mut u32,
    rows: &mut Vec<RowPlacement>,
) {
    if !cx.registered.register(id) {
        return;
    }
    let Some(issue) = issues.get(&id) else {
        // The forest is materialized before layout; an unknown id here
        // means the target was pruned upstream and owns no row.
        return;
    };
    let children = issue.children_ids.clone();
    emit(cx, issue.clone(), depth, config, next_row, rows);

    for child in children {
        walk_eager(cx, issues, child, depth + 1, config, next_row, rows);
    }
}

fn emit<R>(
    cx: &RunContext<R>,
    issue: Issue,
    depth: u16,
    config: &LayoutConfig,
    next_row: &mut u32,
    rows: &mut Vec<RowPlacement>,
) {
    rows.push(RowPlacement {
        row: *next_row,
        indent: depth * config.indent_step,
        is_target: cx.targets.contains(issue.id),
        issue,
    });
    *next_row += 1;
}
