//! Cohort-based feature gate
//!
//! Decides whether a user may use a named feature area at all, based on
//! cohort membership. A feature with no restriction rows is unrestricted;
//! a non-empty restriction set requires membership in any one of the
//! configured cohorts. Lookup failures resolve to the configured fail
//! policy instead of surfacing an error to the caller.

use serde::{Deserialize, Serialize};

use crate::prelude::*;
use edukit_types::directory_adapter::Cohort;

/// Access statistics for a feature's restriction configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessStats {
	pub restricted_cohort_count: u32,
	pub users_with_access_count: u32,
	pub unrestricted: bool,
}

impl AccessStats {
	fn unrestricted() -> Self {
		Self { restricted_cohort_count: 0, users_with_access_count: 0, unrestricted: true }
	}
}

/// Check whether `user` may use the feature area at all.
///
/// Pure function of the restriction set and the user's cohorts; no side
/// effects. Never returns an error: an absent restriction store means
/// unrestricted, and any other upstream failure resolves to
/// `opts.gate_fail_policy` (open by default).
pub async fn allowed(app: &App, tn_id: TnId, feature: &str, user: UserId) -> bool {
	let restricted = match app.store_adapter.list_restrictions(tn_id, feature).await {
		Ok(cohorts) => cohorts,
		// Restriction store not configured: open policy
		Err(Error::NotFound) => return true,
		Err(err) => {
			warn!(%tn_id, feature, %user, "Restriction lookup failed ({}), applying fail policy", err);
			return app.opts.gate_fail_policy.allows();
		}
	};

	// No restriction rows for this feature: everyone passes
	if restricted.is_empty() {
		return true;
	}

	let user_cohorts = match app.directory_adapter.cohorts_of(tn_id, user).await {
		Ok(cohorts) => cohorts,
		Err(err) => {
			warn!(%tn_id, feature, %user, "Cohort lookup failed ({}), applying fail policy", err);
			return app.opts.gate_fail_policy.allows();
		}
	};

	restricted.iter().any(|cohort| user_cohorts.contains(cohort))
}

/// Restriction statistics for the admin dashboard.
///
/// Observability data, not an access decision: failures resolve to the
/// zeroed, unrestricted stats regardless of the gate fail policy.
pub async fn statistics(app: &App, tn_id: TnId, feature: &str) -> AccessStats {
	let restricted = match app.store_adapter.list_restrictions(tn_id, feature).await {
		Ok(cohorts) => cohorts,
		Err(Error::NotFound) => return AccessStats::unrestricted(),
		Err(err) => {
			warn!(%tn_id, feature, "Restriction statistics lookup failed: {}", err);
			return AccessStats::unrestricted();
		}
	};

	if restricted.is_empty() {
		return AccessStats::unrestricted();
	}

	let users = match app.directory_adapter.cohort_user_count(tn_id, &restricted).await {
		Ok(count) => count,
		Err(err) => {
			warn!(%tn_id, feature, "Cohort user count failed: {}", err);
			0
		}
	};

	AccessStats {
		restricted_cohort_count: restricted.len() as u32,
		users_with_access_count: users,
		unrestricted: false,
	}
}

/// Cohorts configured for a feature, joined with their display names.
pub async fn feature_cohorts(app: &App, tn_id: TnId, feature: &str) -> EkResult<Vec<Cohort>> {
	let restricted = match app.store_adapter.list_restrictions(tn_id, feature).await {
		Ok(cohorts) => cohorts,
		Err(Error::NotFound) => return Ok(vec![]),
		Err(err) => return Err(err),
	};

	let mut cohorts = app.directory_adapter.list_cohorts(tn_id).await?;
	cohorts.retain(|c| restricted.contains(&c.cohort_id));
	Ok(cohorts)
}

/// Add a cohort restriction for a feature.
///
/// Idempotent: adding an existing pair returns `Ok(false)` (failure to
/// add), not an error. Invalidates the feature registry cache.
pub async fn add_restriction(
	app: &App,
	tn_id: TnId,
	feature: &str,
	cohort: CohortId,
) -> EkResult<bool> {
	validate_feature(feature)?;

	let added = app.store_adapter.add_restriction(tn_id, feature, cohort).await?;
	if added {
		debug!(%tn_id, feature, %cohort, "Cohort restriction added");
		app.registry.invalidate();
	}
	Ok(added)
}

/// Remove a cohort restriction. Removing a non-existent pair succeeds.
pub async fn remove_restriction(
	app: &App,
	tn_id: TnId,
	feature: &str,
	cohort: CohortId,
) -> EkResult<()> {
	validate_feature(feature)?;

	app.store_adapter.remove_restriction(tn_id, feature, cohort).await?;
	debug!(%tn_id, feature, %cohort, "Cohort restriction removed");
	app.registry.invalidate();
	Ok(())
}

/// Remove every restriction of a feature, returning it to the open policy.
pub async fn clear_restrictions(app: &App, tn_id: TnId, feature: &str) -> EkResult<()> {
	validate_feature(feature)?;

	app.store_adapter.clear_restrictions(tn_id, feature).await?;
	debug!(%tn_id, feature, "Cohort restrictions cleared");
	app.registry.invalidate();
	Ok(())
}

fn validate_feature(feature: &str) -> EkResult<()> {
	if feature.is_empty() {
		return Err(Error::ValidationError("feature name must not be empty".into()));
	}
	Ok(())
}

// vim: ts=4
