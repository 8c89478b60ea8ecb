//! Cohort membership queries

use sqlx::{QueryBuilder, Row, SqlitePool};
use std::collections::HashSet;

use crate::inspect;
use edukit::directory_adapter::Cohort;
use edukit::prelude::*;

pub(crate) async fn of_user(
	db: &SqlitePool,
	tn_id: TnId,
	user: UserId,
) -> EkResult<HashSet<CohortId>> {
	let rows = sqlx::query("SELECT cohort_id FROM cohort_members WHERE tn_id = ? AND user_id = ?")
		.bind(tn_id.0)
		.bind(user.0)
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(rows.iter().map(|row| CohortId(row.get("cohort_id"))).collect())
}

pub(crate) async fn list(db: &SqlitePool, tn_id: TnId) -> EkResult<Vec<Cohort>> {
	let rows = sqlx::query("SELECT cohort_id, name FROM cohorts WHERE tn_id = ? ORDER BY name")
		.bind(tn_id.0)
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(rows
		.iter()
		.map(|row| Cohort {
			cohort_id: CohortId(row.get("cohort_id")),
			name: row.get::<String, _>("name").into(),
		})
		.collect())
}

pub(crate) async fn user_count(
	db: &SqlitePool,
	tn_id: TnId,
	cohorts: &[CohortId],
) -> EkResult<u32> {
	if cohorts.is_empty() {
		return Ok(0);
	}

	let mut query = QueryBuilder::new(
		"SELECT COUNT(DISTINCT user_id) AS cnt FROM cohort_members WHERE tn_id = ",
	);
	query.push_bind(tn_id.0);
	query.push(" AND cohort_id IN (");
	{
		let mut sep = query.separated(", ");
		for cohort in cohorts {
			sep.push_bind(cohort.0);
		}
	}
	query.push(")");

	let row = query
		.build()
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	let cnt: i64 = row.get("cnt");
	Ok(cnt as u32)
}

pub(crate) async fn seed(
	db: &SqlitePool,
	tn_id: TnId,
	cohort: CohortId,
	name: &str,
) -> EkResult<()> {
	sqlx::query("INSERT OR REPLACE INTO cohorts (tn_id, cohort_id, name) VALUES (?, ?, ?)")
		.bind(tn_id.0)
		.bind(cohort.0)
		.bind(name)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn seed_member(
	db: &SqlitePool,
	tn_id: TnId,
	cohort: CohortId,
	user: UserId,
) -> EkResult<()> {
	sqlx::query("INSERT OR IGNORE INTO cohort_members (tn_id, cohort_id, user_id) VALUES (?, ?, ?)")
		.bind(tn_id.0)
		.bind(cohort.0)
		.bind(user.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}
