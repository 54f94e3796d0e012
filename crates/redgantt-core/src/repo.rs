//! Repository trait and caching decorator
//!
//! The resolver revisits the same ancestors many times while climbing and
//! pruning; [`CachedRepository`] guarantees at most one upstream fetch per
//! issue id (and one child enumeration per id) for the whole run. The cache
//! is run-scoped and never invalidated.

use std::collections::HashMap;

use crate::error::TrackerError;
use crate::issue::{Issue, IssueId};

/// Filter criteria for the initial issue query.
///
/// Only populated fields are sent to the tracker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub project_id: Option<String>,
    pub sort: Option<String>,
    /// Comma-separated issue id list
    pub issue_id: Option<String>,
    /// Saved query id
    pub query_id: Option<u64>,
    pub parent_id: Option<IssueId>,
    pub tracker_id: Option<u64>,
    /// Status id; the tracker also accepts symbolic values such as `*`
    pub status_id: Option<String>,
    pub author_id: Option<u64>,
    /// Assignee id; the tracker also accepts `me`
    pub assigned_to_id: Option<String>,
    pub fixed_version_id: Option<u64>,
}

impl FilterCriteria {
    /// Flatten into query parameters, skipping unset criteria.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = &self.project_id {
            pairs.push(("project_id", v.clone()));
        }
        if let Some(v) = &self.sort {
            pairs.push(("sort", v.clone()));
        }
        if let Some(v) = &self.issue_id {
            pairs.push(("issue_id", v.clone()));
        }
        if let Some(v) = self.query_id {
            pairs.push(("query_id", v.to_string()));
        }
        if let Some(v) = self.parent_id {
            pairs.push(("parent_id", v.to_string()));
        }
        if let Some(v) = self.tracker_id {
            pairs.push(("tracker_id", v.to_string()));
        }
        if let Some(v) = &self.status_id {
            pairs.push(("status_id", v.clone()));
        }
        if let Some(v) = self.author_id {
            pairs.push(("author_id", v.to_string()));
        }
        if let Some(v) = &self.assigned_to_id {
            pairs.push(("assigned_to_id", v.clone()));
        }
        if let Some(v) = self.fixed_version_id {
            pairs.push(("fixed_version_id", v.to_string()));
        }
        pairs
    }
}

/// Read access to the issue tracker.
///
/// All calls are blocking; the pipeline is synchronous end to end. Any
/// error aborts the run rather than producing a partial report.
pub trait IssueRepository {
    /// Fetch a single issue by id. Fails with [`TrackerError::NotFound`]
    /// when the id does not exist upstream.
    fn get(&mut self, id: IssueId) -> Result<Issue, TrackerError>;

    /// Fetch all issues matching the filter, in tracker order.
    fn filter(&mut self, criteria: &FilterCriteria) -> Result<Vec<Issue>, TrackerError>;

    /// Enumerate direct children of an issue, in tracker order.
    fn children(&mut self, id: IssueId) -> Result<Vec<Issue>, TrackerError>;
}

/// Caching decorator: at most one upstream call per issue id per run.
pub struct CachedRepository<R> {
    inner: R,
    issues: HashMap<IssueId, Issue>,
    children: HashMap<IssueId, Vec<IssueId>>,
}

impl<R: IssueRepository> CachedRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            issues: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// Insert an already-fetched issue, e.g. a filter result. Keeps the
    /// first version seen for an id.
    pub fn seed(&mut self, issue: Issue) {
        self.issues.entry(issue.id).or_insert(issue);
    }

    /// Check whether an issue is already cached, without fetching.
    pub fn is_cached(&self, id: IssueId) -> bool {
        self.issues.contains_key(&id)
    }
}

impl<R: IssueRepository> IssueRepository for CachedRepository<R> {
    fn get(&mut self, id: IssueId) -> Result<Issue, TrackerError> {
        if let Some(issue) = self.issues.get(&id) {
            return Ok(issue.clone());
        }
        let issue = self.inner.get(id)?;
        self.issues.insert(id, issue.clone());
        Ok(issue)
    }

    fn filter(&mut self, criteria: &FilterCriteria) -> Result<Vec<Issue>, TrackerError> {
        let issues = self.inner.filter(criteria)?;
        for issue in &issues {
            self.seed(issue.clone());
        }
        Ok(issues)
    }

    fn children(&mut self, id: IssueId) -> Result<Vec<Issue>, TrackerError> {
        if let Some(ids) = self.children.get(&id) {
            let ids = ids.clone();
            return ids.into_iter().map(|cid| self.get(cid)).collect();
        }
        let kids = self.inner.children(id)?;
        self.children.insert(id, kids.iter().map(|c| c.id).collect());
        for child in &kids {
            self.seed(child.clone());
        }
        Ok(kids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// In-memory repository that counts upstream calls.
    #[derive(Default)]
    struct CountingRepo {
        issues: HashMap<IssueId, Issue>,
        get_calls: usize,
        children_calls: usize,
    }

    impl CountingRepo {
        fn with(issues: Vec<Issue>) -> Self {
            Self {
                issues: issues.into_iter().map(|i| (i.id, i)).collect(),
                ..Self::default()
            }
        }
    }

    impl IssueRepository for CountingRepo {
        fn get(&mut self, id: IssueId) -> Result<Issue, TrackerError> {
            self.get_calls += 1;
            self.issues
                .get(&id)
                .cloned()
                .ok_or(TrackerError::NotFound(id))
        }

        fn filter(&mut self, _criteria: &FilterCriteria) -> Result<Vec<Issue>, TrackerError> {
            Ok(Vec::new())
        }

        fn children(&mut self, id: IssueId) -> Result<Vec<Issue>, TrackerError> {
            self.children_calls += 1;
            let mut kids: Vec<Issue> = self
                .issues
                .values()
                .filter(|i| i.parent_id == Some(id))
                .cloned()
                .collect();
            kids.sort_by_key(|i| i.id);
            Ok(kids)
        }
    }

    #[test]
    fn repeated_get_hits_upstream_once() {
        let repo = CountingRepo::with(vec![Issue::new(1, "root")]);
        let mut cached = CachedRepository::new(repo);

        for _ in 0..5 {
            let issue = cached.get(1).unwrap();
            assert_eq!(issue.subject, "root");
        }
        assert_eq!(cached.inner.get_calls, 1);
    }

    #[test]
    fn get_missing_id_fails() {
        let mut cached = CachedRepository::new(CountingRepo::default());
        let err = cached.get(99).unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(99)));
    }

    #[test]
    fn seeded_issue_skips_upstream() {
        let mut cached = CachedRepository::new(CountingRepo::default());
        cached.seed(Issue::new(7, "seeded"));

        assert!(cached.is_cached(7));
        let issue = cached.get(7).unwrap();
        assert_eq!(issue.subject, "seeded");
        assert_eq!(cached.inner.get_calls, 0);
    }

    #[test]
    fn children_enumerated_once_and_seed_cache() {
        let repo = CountingRepo::with(vec![
            Issue::new(1, "root"),
            Issue::new(2, "a").parent(1),
            Issue::new(3, "b").parent(1),
        ]);
        let mut cached = CachedRepository::new(repo);

        let first = cached.children(1).unwrap();
        let second = cached.children(1).unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.inner.children_calls, 1);

        // Children landed in the issue cache too
        cached.get(2).unwrap();
        cached.get(3).unwrap();
        assert_eq!(cached.inner.get_calls, 0);
    }

    #[test]
    fn filter_results_seed_the_cache() {
        struct FilterRepo;
        impl IssueRepository for FilterRepo {
            fn get(&mut self, id: IssueId) -> Result<Issue, TrackerError> {
                Err(TrackerError::NotFound(id))
            }
            fn filter(&mut self, _c: &FilterCriteria) -> Result<Vec<Issue>, TrackerError> {
                Ok(vec![Issue::new(10, "hit"), Issue::new(11, "hit2")])
            }
            fn children(&mut self, _id: IssueId) -> Result<Vec<Issue>, TrackerError> {
                Ok(Vec::new())
            }
        }

        let mut cached = CachedRepository::new(FilterRepo);
        let hits = cached.filter(&FilterCriteria::default()).unwrap();
        assert_eq!(hits.len(), 2);
        // get() would fail upstream; it must come from the cache now
        assert_eq!(cached.get(10).unwrap().subject, "hit");
    }

    #[test]
    fn query_pairs_skip_unset_criteria() {
        let criteria = FilterCriteria {
            project_id: Some("gantt-demo".into()),
            status_id: Some("*".into()),
            tracker_id: Some(2),
            ..FilterCriteria::default()
        };
        let pairs = criteria.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("project_id", "gantt-demo".to_string()),
                ("tracker_id", "2".to_string()),
                ("status_id", "*".to_string()),
            ]
        );
    }

    #[test]
    fn empty_criteria_produce_no_pairs() {
        assert!(FilterCriteria::default().query_pairs().is_empty());
    }
}
