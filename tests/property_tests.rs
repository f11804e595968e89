//! Property-based tests for retry timing, envelope decoding, and the
//! known-project table.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::time::Duration;

use proptest::prelude::*;
use serde_json::json;

use argus::api::{parse_response, Project, RetryPolicy, TransportError};
use argus::core::config::Config;
use argus::setup::handlers::default_project_name;

/// Strategy for retry policies with realistic base delays.
fn policy() -> impl Strategy<Value = RetryPolicy> {
    (1u64..2_000, 1u32..10).prop_map(|(base_ms, max_retries)| RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(base_ms),
        timeout: Duration::from_secs(30),
    })
}

/// Strategy for identifier-like strings.
fn ident() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,16}"
}

/// Strategy for slash-separated repo subdirectories (possibly the root).
fn repo_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9-]{1,8}", 0..4).prop_map(|parts| parts.join("/"))
}

proptest! {
    /// Every delay lies within `[base * 2^n, 1.5 * base * 2^n]`.
    #[test]
    fn backoff_within_jitter_bounds(policy in policy(), attempt in 0u32..8, jitter in 0.0f64..=1.0) {
        let floor = policy.base_delay * 2u32.pow(attempt);
        let delay = policy.backoff_with_jitter(attempt, jitter);

        prop_assert!(delay >= floor);
        prop_assert!(delay <= floor + floor / 2);
    }

    /// Randomised delays obey the same bounds.
    #[test]
    fn random_backoff_within_bounds(policy in policy(), attempt in 0u32..8) {
        let floor = policy.base_backoff(attempt);
        let delay = policy.backoff(attempt);

        prop_assert!(delay >= floor);
        prop_assert!(delay <= floor + floor / 2);
    }

    /// The minimum delay never shrinks as attempts increase, even when saturating.
    #[test]
    fn base_backoff_is_monotonic(policy in policy(), attempt in 0u32..80) {
        prop_assert!(policy.base_backoff(attempt + 1) >= policy.base_backoff(attempt));
    }

    /// Any payload under `data` decodes back to itself.
    #[test]
    fn envelope_yields_data(id in ident(), name in ".{0,32}", org_id in ident()) {
        let project = Project {
            id: id.clone(),
            name: name.clone(),
            slug: id,
            org_id,
        };
        let body = serde_json::to_vec(&json!({ "data": project, "message": "ok" })).unwrap();

        let decoded: Project = parse_response(&body).unwrap();
        prop_assert_eq!(decoded, project);
    }

    /// Objects without a `data` key always report the missing-data sentinel.
    #[test]
    fn envelope_without_data_is_sentinel(keys in prop::collection::vec("[a-z]{1,8}", 0..5)) {
        let mut object = serde_json::Map::new();
        for key in keys.into_iter().filter(|k| k != "data") {
            object.insert(key, json!(1));
        }
        let body = serde_json::to_vec(&object).unwrap();

        let err = parse_response::<Project>(&body).unwrap_err();
        prop_assert!(matches!(err, TransportError::MissingData));
    }

    /// Adding a link twice keeps one entry per `(url, path)` pair.
    #[test]
    fn known_projects_stay_unique(
        url in "git@example\\.com:[a-z]{1,6}/[a-z]{1,6}\\.git",
        path in repo_path(),
        first in ident(),
        second in ident(),
    ) {
        let mut config = Config::default();
        config.add_known_project(&first, "one", "o1", &url, &path);
        config.add_known_project(&second, "two", "o1", &url, &path);

        prop_assert_eq!(config.known_projects.len(), 1);
        let known = config.find_known_project(&url, &path).unwrap();
        prop_assert_eq!(&known.project_id, &second);
    }

    /// Known-project matching is exact on the path: subdirectories don't match.
    #[test]
    fn known_project_match_is_exact(path in repo_path(), child in "[a-z]{1,8}") {
        let mut config = Config::default();
        config.add_known_project("p1", "api", "o1", "url", &path);

        let nested = if path.is_empty() { child } else { format!("{}/{}", path, child) };
        prop_assert!(config.find_known_project("url", &path).is_some());
        prop_assert!(config.find_known_project("url", &nested).is_none());
    }

    /// A default project name is never empty for a real remote.
    #[test]
    fn default_project_name_is_nonempty(
        owner in "[a-z]{1,8}",
        repo in "[a-z]{1,8}",
        path in repo_path(),
    ) {
        let url = format!("git@example.com:{}/{}.git", owner, repo);
        let name = default_project_name(&url, &path);

        prop_assert!(!name.is_empty());
        prop_assert!(!name.contains('/'));
        if path.is_empty() {
            prop_assert_eq!(name, repo);
        }
    }
}
