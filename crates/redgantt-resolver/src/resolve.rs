//! Hierarchy resolution
//!
//! Given the target set, compute the forest of roots the layout walk starts
//! from. Two strategies exist behind the same entry point:
//!
//! - **Lazy** (default): climb each target to its topmost ancestor through
//!   the cache and decide per branch, during layout, whether a subtree
//!   contains a target at all. Subtrees that cannot contribute a row are
//!   never fetched.
//! - **Eager**: fetch every ancestor chain upfront and link child ids into
//!   the materialized parents, producing a self-contained forest the layout
//!   walk recurses over without further fetches.
//!
//! Both strategies must produce row sequences satisfying the same
//! invariants (one row per issue, contiguous rows, parent indent + step).

use std::collections::{HashMap, HashSet};

use redgantt_core::{Issue, IssueId, IssueRepository, ResolveError};
use tracing::debug;

use crate::context::RunContext;

/// Which resolution strategy to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Climb ancestors on demand, prune untargeted branches during layout.
    #[default]
    Lazy,
    /// Pre-materialize the full ancestor forest before layout begins.
    Eager,
}

/// Resolution policy for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Climb to the topmost ancestor and include non-target ancestors.
    /// When false an issue is its own root; ancestors are neither fetched
    /// nor shaded.
    pub include_parents: bool,
    pub strategy: ResolveStrategy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            include_parents: true,
            strategy: ResolveStrategy::Lazy,
        }
    }
}

/// The resolved forest the layout engine walks.
#[derive(Clone, Debug)]
pub enum ResolvedForest {
    /// Roots only; children are enumerated through the repository during
    /// layout, pruned by [`has_targeted_descendant`].
    Lazy { roots: Vec<IssueId> },
    /// Fully materialized forest; layout recurses over `children_ids`
    /// unconditionally.
    Eager {
        roots: Vec<IssueId>,
        issues: HashMap<IssueId, Issue>,
    },
}

impl ResolvedForest {
    /// Root ids in visit order.
    pub fn roots(&self) -> &[IssueId] {
        match self {
            Self::Lazy { roots } | Self::Eager { roots, .. } => roots,
        }
    }
}

/// Follow `parent_id` links until an issue with no parent is reached.
///
/// The tracker is assumed acyclic, but a corrupted chain must not loop
/// forever: revisiting an id fails with [`ResolveError::CyclicHierarchy`]
/// carrying the climb trail.
pub fn topmost<R: IssueRepository>(
    cx: &mut RunContext<R>,
    id: IssueId,
) -> Result<IssueId, ResolveError> {
    let mut trail = vec![id];
    let mut seen: HashSet<IssueId> = trail.iter().copied().collect();
    let mut current = id;
    loop {
        let issue = cx.repo.get(current)?;
        match issue.parent_id {
            None => return Ok(current),
            Some(parent_id) => {
                if !seen.insert(parent_id) {
                    trail.push(parent_id);
                    return Err(ResolveError::CyclicHierarchy(trail));
                }
                trail.push(parent_id);
                current = parent_id;
            }
        }
    }
}

/// Does this subtree contain any targeted issue?
///
/// True when the issue itself is a target, when any direct child is a
/// target, or when any child subtree answers true. Enumeration stops at the
/// first hit, so untargeted branches are fetched no deeper than necessary.
pub fn has_targeted_descendant<R: IssueRepository>(
    cx: &mut RunContext<R>,
    id: IssueId,
) -> Result<bool, ResolveError> {
    if cx.targets.contains(id) {
        return Ok(true);
    }
    let children = cx.repo.children(id)?;
    if children.iter().any(|c| cx.targets.contains(c.id)) {
        return Ok(true);
    }
    for child in children {
        if has_targeted_descendant(cx, child.id)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Resolve the forest for the current target set.
pub fn resolve<R: IssueRepository>(
    cx: &mut RunContext<R>,
    config: &ResolverConfig,
) -> Result<ResolvedForest, ResolveError> {
    let forest = match config.strategy {
        ResolveStrategy::Lazy => resolve_lazy(cx, config)?,
        ResolveStrategy::Eager => resolve_eager(cx, config)?,
    };
    debug!(
        roots = forest.roots().len(),
        targets = cx.targets.len(),
        "hierarchy resolved"
    );
    Ok(forest)
}

fn resolve_lazy<R: IssueRepository>(
    cx: &mut RunContext<R>,
    config: &ResolverConfig,
) -> Result<ResolvedForest, ResolveError> {
    let mut roots = Vec::new();
    let mut seen = HashSet::new();
    for id in cx.targets.iter().collect::<Vec<_>>() {
        let root = if config.include_parents {
            topmost(cx, id)?
        } else {
            id
        };
        if seen.insert(root) {
            roots.push(root);
        }
    }
    Ok(ResolvedForest::Lazy { roots })
}

/// Materialize targets plus their full ancestor chains, linking each child
/// into its parent so layout can recurse without touching the repository.
fn resolve_eager<R: IssueRepository>(
    cx: &mut RunContext<R>,
    config: &ResolverConfig,
) -> Result<ResolvedForest, ResolveError> {
    let target_ids: Vec<IssueId> = cx.targets.iter().collect();

    let mut issues: HashMap<IssueId, Issue> = HashMap::new();
    for &id in &target_ids {
        let issue = cx.repo.get(id)?;
        issues.insert(id, issue);
    }

    if config.include_parents {
        for &id in &target_ids {
            climb_and_link(cx, &mut issues, id)?;
        }
    } else {
        // No climbing: only link targets to parents that are targets too.
        for &id in &target_ids {
            let parent_id = issues.get(&id).and_then(|i| i.parent_id);
            if let Some(pid) = parent_id {
                if let Some(parent) = issues.get_mut(&pid) {
                    if !parent.children_ids.contains(&id) {
                        parent.children_ids.push(id);
                    }
                }
            }
        }
    }

    // Roots in first-encounter order of the originating targets. The forest
    // map is complete, so the climb here is pure pointer chasing.
    let mut roots = Vec::new();
    let mut seen = HashSet::new();
    for &id in &target_ids {
        let root = if config.include_parents {
            forest_topmost(&issues, id)?
        } else {
            id
        };
        if seen.insert(root) {
            roots.push(root);
        }
    }

    Ok(ResolvedForest::Eager { roots, issues })
}

/// Climb from one target, fetching unseen ancestors and linking each child
/// into its parent's `children_ids`. Stops early when it reaches a parent
/// that already knows this child: the chain above was linked by an earlier
/// target.
fn climb_and_link<R: IssueRepository>(
    cx: &mut RunContext<R>,
    issues: &mut HashMap<IssueId, Issue>,
    start: IssueId,
) -> Result<(), ResolveError> {
    let mut trail = vec![start];
    let mut seen: HashSet<IssueId> = trail.iter().copied().collect();
    let mut child_id = start;
    loop {
        let parent_id = match issues.get(&child_id).and_then(|i| i.parent_id) {
            None => return Ok(()),
            Some(pid) => pid,
        };
        if !seen.insert(parent_id) {
            trail.push(parent_id);
            return Err(ResolveError::CyclicHierarchy(trail));
        }
        trail.push(parent_id);

        if !issues.contains_key(&parent_id) {
            let parent = cx.repo.get(parent_id)?;
            issues.insert(parent_id, parent);
        }
        let parent = issues
            .get_mut(&parent_id)
            .ok_or(ResolveError::Tracker(redgantt_core::TrackerError::NotFound(
                parent_id,
            )))?;
        if parent.children_ids.contains(&child_id) {
            return Ok(());
        }
        parent.children_ids.push(child_id);
        child_id = parent_id;
    }
}

/// Topmost ancestor within an already-materialized forest.
fn forest_topmost(
    issues: &HashMap<IssueId, Issue>,
    id: IssueId,
) -> Result<IssueId, ResolveError> {
    let mut trail = vec![id];
    let mut seen: HashSet<IssueId> = trail.iter().copied().collect();
    let mut current = id;
    while let Some(parent_id) = issues.get(&current).and_then(|i| i.parent_id) {
        if !issues.contains_key(&parent_id) {
            // Linking stopped early at an already-linked parent; the chain
            // above it is reachable through the map.
            break;
        }
        if !seen.insert(parent_id) {
            trail.push(parent_id);
            return Err(ResolveError::CyclicHierarchy(trail));
        }
        trail.push(parent_id);
        current = parent_id;
    }
    Ok(current)
}
