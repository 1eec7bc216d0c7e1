//! Dependency resolution.
//!
//! Walks the transitive runtime-dependency graph of a set of root packages
//! and produces a flat, deduplicated [`ResolutionPlan`]. The walk is an
//! explicit work stack rather than recursion; the "already planned" check
//! doubles as the cycle guard and runs before children are enqueued.
//!
//! Metadata comes through [`Registry::fetch_metadata`], so repeated visits
//! across roots hit the client's session memo instead of the network. A
//! package with no metadata (or no stable version) fails the whole
//! resolution: installing a partial plan could strand a dependent without
//! its dependency.

use crate::api::Registry;
use crate::error::{BrError, Result};
use std::collections::HashSet;
use tracing::debug;

/// `requested_by` value for user-named roots.
pub const USER_REQUEST: &str = "User Request";

/// One planned package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub name: String,
    /// Upstream stable version at resolution time.
    pub version: String,
    /// `"User Request"` or the first parent that pulled this package in.
    pub requested_by: String,
    pub dependencies: Vec<String>,
}

/// Flat, deduplicated resolution result in first-visit order.
#[derive(Debug, Default)]
pub struct ResolutionPlan {
    entries: Vec<PlanEntry>,
}

impl ResolutionPlan {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve `roots` and every transitive runtime dependency.
pub async fn resolve<R: Registry>(registry: &R, roots: &[String]) -> Result<ResolutionPlan> {
    let mut plan = ResolutionPlan::default();
    let mut planned: HashSet<String> = HashSet::new();

    // Depth-first: children are pushed in reverse so they pop in declared
    // order, matching what a recursive walk would visit.
    let mut stack: Vec<(String, String)> = roots
        .iter()
        .rev()
        .map(|r| (r.clone(), USER_REQUEST.to_string()))
        .collect();

    while let Some((name, requested_by)) = stack.pop() {
        if planned.contains(&name) {
            continue;
        }

        let formula = registry
            .fetch_metadata(&name, false)
            .await?
            .ok_or_else(|| BrError::ResolutionMissingMetadata(name.clone()))?;

        let version = formula
            .versions
            .stable
            .clone()
            .ok_or_else(|| BrError::ResolutionMissingMetadata(name.clone()))?;

        debug!("planned {} {} (via {})", name, version, requested_by);

        planned.insert(name.clone());
        for dep in formula.dependencies.iter().rev() {
            if !planned.contains(dep) {
                stack.push((dep.clone(), name.clone()));
            }
        }

        plan.entries.push(PlanEntry {
            name,
            version,
            requested_by,
            dependencies: formula.dependencies,
        });
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Formula;
    use crate::progress::{ProgressSink, TaskId};
    use std::collections::HashMap;
    use std::path::Path;

    /// Registry stub serving formulae from a map; no bottles.
    struct StubRegistry {
        formulae: HashMap<String, Formula>,
    }

    impl StubRegistry {
        fn new(specs: &[(&str, &[&str])]) -> Self {
            let formulae = specs
                .iter()
                .map(|(name, deps)| {
                    let formula: Formula = serde_json::from_value(serde_json::json!({
                        "name": name,
                        "versions": { "stable": "1.0" },
                        "dependencies": deps,
                    }))
                    .unwrap();
                    (name.to_string(), formula)
                })
                .collect();
            Self { formulae }
        }
    }

    impl Registry for StubRegistry {
        async fn fetch_metadata(
            &self,
            name: &str,
            _force_refresh: bool,
        ) -> crate::error::Result<Option<Formula>> {
            Ok(self.formulae.get(name).cloned())
        }

        async fn fetch_token(&self, _name: &str) -> crate::error::Result<String> {
            Ok("test-token".to_string())
        }

        async fn download_bottle(
            &self,
            _url: &str,
            _token: &str,
            _dest: &Path,
            _sink: &dyn ProgressSink,
            _task: TaskId,
        ) -> crate::error::Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn chain_is_planned_once_each() {
        let registry = StubRegistry::new(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);
        let plan = resolve(&registry, &["a".to_string()]).await.unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.get("a").unwrap().requested_by, USER_REQUEST);
        assert_eq!(plan.get("b").unwrap().requested_by, "a");
        assert_eq!(plan.get("c").unwrap().requested_by, "b");
    }

    #[tokio::test]
    async fn shared_dependency_keeps_first_parent() {
        // Both roots depend on shared; the first visit wins.
        let registry = StubRegistry::new(&[
            ("x", &["shared"]),
            ("y", &["shared"]),
            ("shared", &[]),
        ]);
        let plan = resolve(&registry, &["x".to_string(), "y".to_string()])
            .await
            .unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.get("shared").unwrap().requested_by, "x");
    }

    #[tokio::test]
    async fn cycle_terminates() {
        let registry = StubRegistry::new(&[("a", &["b"]), ("b", &["a"])]);
        let plan = resolve(&registry, &["a".to_string()]).await.unwrap();

        assert_eq!(plan.len(), 2);
        assert!(plan.contains("a"));
        assert!(plan.contains("b"));
    }

    #[tokio::test]
    async fn missing_metadata_fails_resolution() {
        let registry = StubRegistry::new(&[("a", &["ghost"])]);
        let err = resolve(&registry, &["a".to_string()]).await.unwrap_err();

        match err {
            BrError::ResolutionMissingMetadata(name) => assert_eq!(name, "ghost"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_stable_version_fails_resolution() {
        let mut registry = StubRegistry::new(&[]);
        let formula: Formula =
            serde_json::from_value(serde_json::json!({ "name": "headless" })).unwrap();
        registry.formulae.insert("headless".to_string(), formula);

        let err = resolve(&registry, &["headless".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, BrError::ResolutionMissingMetadata(_)));
    }
}
