//! Cohort feature gate tests
//!
//! Covers the unrestricted default, any-of membership, mutation
//! idempotency, and the fail-open/fail-closed upstream error policy.

mod common;

use common::{TN, test_env, test_env_with};
use edukit_core::app::AppOpts;
use edukit_core::cohort;
use edukit_core::registry::FeatureRegistry;
use edukit_types::prelude::*;

#[tokio::test]
async fn test_unrestricted_feature_allows_everyone() {
	let env = test_env();

	// No restriction rows at all for "valuemap"
	assert!(cohort::allowed(&env.app, TN, "valuemap", UserId(1)).await);
	assert!(cohort::allowed(&env.app, TN, "valuemap", UserId(999)).await);
}

#[tokio::test]
async fn test_restricted_feature_requires_cohort_membership() {
	let env = test_env();
	env.directory.add_cohort(CohortId(10), "Sales EMEA", &[UserId(1)]);
	env.directory.add_cohort(CohortId(20), "Sales US", &[UserId(2)]);
	env.directory.add_cohort(CohortId(30), "Support", &[UserId(3)]);

	cohort::add_restriction(&env.app, TN, "sales", CohortId(10)).await.unwrap();
	cohort::add_restriction(&env.app, TN, "sales", CohortId(20)).await.unwrap();

	// Any-of membership: cohort 20 suffices
	assert!(cohort::allowed(&env.app, TN, "sales", UserId(2)).await);
	// Cohort 30 is not configured for the feature
	assert!(!cohort::allowed(&env.app, TN, "sales", UserId(3)).await);
	// No cohorts at all
	assert!(!cohort::allowed(&env.app, TN, "sales", UserId(4)).await);
	// Other features stay unrestricted
	assert!(cohort::allowed(&env.app, TN, "valuemap", UserId(3)).await);
}

#[tokio::test]
async fn test_add_restriction_idempotent() {
	let env = test_env();

	assert!(cohort::add_restriction(&env.app, TN, "sales", CohortId(10)).await.unwrap());
	// Second add reports failure-to-add, not an error
	assert!(!cohort::add_restriction(&env.app, TN, "sales", CohortId(10)).await.unwrap());

	let stats = cohort::statistics(&env.app, TN, "sales").await;
	assert_eq!(stats.restricted_cohort_count, 1);
}

#[tokio::test]
async fn test_remove_restriction_trivially_succeeds() {
	let env = test_env();

	// Removing a pair that was never added is fine
	cohort::remove_restriction(&env.app, TN, "sales", CohortId(10)).await.unwrap();

	cohort::add_restriction(&env.app, TN, "sales", CohortId(10)).await.unwrap();
	cohort::remove_restriction(&env.app, TN, "sales", CohortId(10)).await.unwrap();
	assert!(cohort::statistics(&env.app, TN, "sales").await.unrestricted);
}

#[tokio::test]
async fn test_clear_restrictions_returns_feature_to_open_policy() {
	let env = test_env();
	env.directory.add_cohort(CohortId(10), "Sales", &[UserId(1)]);

	cohort::add_restriction(&env.app, TN, "sales", CohortId(10)).await.unwrap();
	cohort::add_restriction(&env.app, TN, "sales", CohortId(20)).await.unwrap();
	assert!(!cohort::allowed(&env.app, TN, "sales", UserId(5)).await);

	cohort::clear_restrictions(&env.app, TN, "sales").await.unwrap();
	assert!(cohort::allowed(&env.app, TN, "sales", UserId(5)).await);
}

#[tokio::test]
async fn test_empty_feature_name_rejected() {
	let env = test_env();

	let err = cohort::add_restriction(&env.app, TN, "", CohortId(1)).await.unwrap_err();
	assert!(matches!(err, Error::ValidationError(_)));
}

#[tokio::test]
async fn test_upstream_error_fails_open_by_default() {
	let env = test_env();
	env.store.set_unavailable(true);

	// Restriction store down: default policy admits the user
	assert!(cohort::allowed(&env.app, TN, "sales", UserId(1)).await);
}

#[tokio::test]
async fn test_upstream_error_fails_closed_when_configured() {
	let opts = AppOpts { gate_fail_policy: FailPolicy::Closed, ..AppOpts::default() };
	let env = test_env_with(opts, FeatureRegistry::new(vec![]));
	env.store.set_unavailable(true);

	assert!(!cohort::allowed(&env.app, TN, "sales", UserId(1)).await);
}

#[tokio::test]
async fn test_missing_restriction_store_is_unrestricted_even_fail_closed() {
	// Configuration absence is not an upstream failure: stays open even
	// under the closed policy
	let opts = AppOpts { gate_fail_policy: FailPolicy::Closed, ..AppOpts::default() };
	let env = test_env_with(opts, FeatureRegistry::new(vec![]));
	env.store.set_missing(true);

	assert!(cohort::allowed(&env.app, TN, "sales", UserId(1)).await);
}

#[tokio::test]
async fn test_cohort_lookup_error_applies_fail_policy() {
	let env = test_env();
	env.store
		.restrictions
		.lock()
		.entry("sales".into())
		.or_default()
		.insert(CohortId(10));
	env.directory.fail_all.store(true, std::sync::atomic::Ordering::Relaxed);

	assert!(cohort::allowed(&env.app, TN, "sales", UserId(1)).await);
}

#[tokio::test]
async fn test_statistics() {
	let env = test_env();
	env.directory.add_cohort(CohortId(10), "Sales EMEA", &[UserId(1), UserId(2)]);
	env.directory.add_cohort(CohortId(20), "Sales US", &[UserId(2), UserId(3)]);

	let stats = cohort::statistics(&env.app, TN, "sales").await;
	assert!(stats.unrestricted);
	assert_eq!(stats.restricted_cohort_count, 0);

	cohort::add_restriction(&env.app, TN, "sales", CohortId(10)).await.unwrap();
	cohort::add_restriction(&env.app, TN, "sales", CohortId(20)).await.unwrap();

	let stats = cohort::statistics(&env.app, TN, "sales").await;
	assert!(!stats.unrestricted);
	assert_eq!(stats.restricted_cohort_count, 2);
	// User 2 is in both cohorts, counted once
	assert_eq!(stats.users_with_access_count, 3);
}

#[tokio::test]
async fn test_statistics_fail_open_on_error() {
	let env = test_env();
	env.store.set_unavailable(true);

	let stats = cohort::statistics(&env.app, TN, "sales").await;
	assert!(stats.unrestricted);
	assert_eq!(stats.users_with_access_count, 0);
}

#[tokio::test]
async fn test_feature_cohorts_joined_with_names() {
	let env = test_env();
	env.directory.add_cohort(CohortId(10), "Sales EMEA", &[]);
	env.directory.add_cohort(CohortId(20), "Sales US", &[]);
	env.directory.add_cohort(CohortId(30), "Support", &[]);

	cohort::add_restriction(&env.app, TN, "sales", CohortId(20)).await.unwrap();
	cohort::add_restriction(&env.app, TN, "sales", CohortId(30)).await.unwrap();

	let cohorts = cohort::feature_cohorts(&env.app, TN, "sales").await.unwrap();
	let names: Vec<&str> = cohorts.iter().map(|c| c.name.as_ref()).collect();
	assert_eq!(names, ["Sales US", "Support"]);
}

// vim: ts=4
