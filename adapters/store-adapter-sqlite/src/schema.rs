//! Database schema initialization
//!
//! Creates the engine-owned tables and indexes. Restriction and grant
//! writes are single-row operations against these tables.

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Cohort restrictions
	//*********************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS feature_cohorts (
		tn_id integer NOT NULL,
		feature text NOT NULL,
		cohort_id integer NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(tn_id, feature, cohort_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Entries
	//*********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS entries (
		entry_id integer PRIMARY KEY AUTOINCREMENT,
		tn_id integer NOT NULL,
		activity_id integer NOT NULL,
		owner_id integer NOT NULL,
		group_id integer,
		title text NOT NULL,
		content text NOT NULL,
		status char(1) NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		modified_at datetime DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_entries_tnid_activity ON entries(tn_id, activity_id)",
	)
	.execute(&mut *tx)
	.await?;

	// Shared access
	//***************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS shared_access (
		tn_id integer NOT NULL,
		entry_id integer NOT NULL,
		user_id integer NOT NULL,
		access_level text NOT NULL,
		expires_at integer,
		granted_by integer NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(tn_id, entry_id, user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;
	Ok(())
}
