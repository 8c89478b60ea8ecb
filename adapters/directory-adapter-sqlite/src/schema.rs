//! Database schema initialization
//!
//! Mirrors the deployment's identity and course structure. This adapter is
//! read-only from the engine's point of view; the write helpers exist for
//! directory synchronization and test seeding.

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Cohorts
	//*********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS cohorts (
		tn_id integer NOT NULL,
		cohort_id integer NOT NULL,
		name text NOT NULL,
		PRIMARY KEY(tn_id, cohort_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS cohort_members (
		tn_id integer NOT NULL,
		cohort_id integer NOT NULL,
		user_id integer NOT NULL,
		PRIMARY KEY(tn_id, cohort_id, user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_cohort_members_user ON cohort_members(tn_id, user_id)",
	)
	.execute(&mut *tx)
	.await?;

	// Courses and enrollment
	//************************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS courses (
		tn_id integer NOT NULL,
		course_id integer NOT NULL,
		name text NOT NULL,
		PRIMARY KEY(tn_id, course_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS enrolments (
		tn_id integer NOT NULL,
		course_id integer NOT NULL,
		user_id integer NOT NULL,
		PRIMARY KEY(tn_id, course_id, user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Groups
	//********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS course_groups (
		tn_id integer NOT NULL,
		group_id integer NOT NULL,
		course_id integer NOT NULL,
		name text NOT NULL,
		PRIMARY KEY(tn_id, group_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS group_members (
		tn_id integer NOT NULL,
		group_id integer NOT NULL,
		user_id integer NOT NULL,
		PRIMARY KEY(tn_id, group_id, user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_group_members_user ON group_members(tn_id, user_id)",
	)
	.execute(&mut *tx)
	.await?;

	// Capabilities
	//**************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS capability_grants (
		tn_id integer NOT NULL,
		user_id integer NOT NULL,
		capability text NOT NULL,
		scope_type char(1) NOT NULL,
		scope_id integer NOT NULL,
		PRIMARY KEY(tn_id, user_id, capability, scope_type, scope_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Activities
	//************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS activities (
		tn_id integer NOT NULL,
		activity_id integer NOT NULL,
		course_id integer NOT NULL,
		feature text NOT NULL,
		name text NOT NULL,
		group_mode integer NOT NULL DEFAULT 0,
		PRIMARY KEY(tn_id, activity_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_activities_feature ON activities(tn_id, feature)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;
	Ok(())
}
