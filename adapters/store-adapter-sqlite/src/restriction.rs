//! Cohort restriction storage
//!
//! One row per (feature, cohort) pair. Adding an existing pair is reported
//! as failure-to-add via the affected row count, matching the idempotency
//! contract of the trait.

use sqlx::{Row, SqlitePool};

use crate::inspect;
use edukit::prelude::*;

pub(crate) async fn list(db: &SqlitePool, tn_id: TnId, feature: &str) -> EkResult<Vec<CohortId>> {
	let rows = sqlx::query(
		"SELECT cohort_id FROM feature_cohorts WHERE tn_id = ? AND feature = ? ORDER BY cohort_id",
	)
	.bind(tn_id.0)
	.bind(feature)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(rows.iter().map(|row| CohortId(row.get("cohort_id"))).collect())
}

pub(crate) async fn add(
	db: &SqlitePool,
	tn_id: TnId,
	feature: &str,
	cohort: CohortId,
) -> EkResult<bool> {
	let res = sqlx::query(
		"INSERT OR IGNORE INTO feature_cohorts (tn_id, feature, cohort_id) VALUES (?, ?, ?)",
	)
	.bind(tn_id.0)
	.bind(feature)
	.bind(cohort.0)
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(res.rows_affected() > 0)
}

pub(crate) async fn remove(
	db: &SqlitePool,
	tn_id: TnId,
	feature: &str,
	cohort: CohortId,
) -> EkResult<()> {
	sqlx::query("DELETE FROM feature_cohorts WHERE tn_id = ? AND feature = ? AND cohort_id = ?")
		.bind(tn_id.0)
		.bind(feature)
		.bind(cohort.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn clear(db: &SqlitePool, tn_id: TnId, feature: &str) -> EkResult<()> {
	sqlx::query("DELETE FROM feature_cohorts WHERE tn_id = ? AND feature = ?")
		.bind(tn_id.0)
		.bind(feature)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn count(db: &SqlitePool, tn_id: TnId, feature: &str) -> EkResult<u32> {
	let row = sqlx::query("SELECT COUNT(*) AS cnt FROM feature_cohorts WHERE tn_id = ? AND feature = ?")
		.bind(tn_id.0)
		.bind(feature)
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	let cnt: i64 = row.get("cnt");
	Ok(cnt as u32)
}
