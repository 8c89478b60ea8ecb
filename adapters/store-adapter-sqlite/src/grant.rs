//! Shared-access grant storage
//!
//! One row per (entry, user). Upsert replaces the level and expiry in
//! place; expiry filtering is the caller's concern (lazy expiry at read
//! time), so rows are returned as stored. A malformed stored level is a
//! data error, never coerced.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::inspect;
use edukit::prelude::*;
use edukit::store_adapter::{GrantData, SharedAccessGrant};

fn map_grant(row: &SqliteRow) -> EkResult<SharedAccessGrant> {
	let level: &str = row.get("access_level");
	let level = AccessLevel::parse(level).ok_or_else(|| {
		warn!("Malformed access level in shared_access row: {:?}", level);
		Error::DbError
	})?;

	Ok(SharedAccessGrant {
		user_id: UserId(row.get("user_id")),
		level,
		expires_at: row.get::<Option<i64>, _>("expires_at").map(Timestamp),
		granted_by: UserId(row.get("granted_by")),
		created_at: Timestamp(row.get("created_at")),
	})
}

pub(crate) async fn read(
	db: &SqlitePool,
	tn_id: TnId,
	entry: EntryId,
	user: UserId,
) -> EkResult<Option<SharedAccessGrant>> {
	let row = sqlx::query(
		"SELECT user_id, access_level, expires_at, granted_by, created_at \
		 FROM shared_access WHERE tn_id = ? AND entry_id = ? AND user_id = ?",
	)
	.bind(tn_id.0)
	.bind(entry.0)
	.bind(user.0)
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	row.as_ref().map(map_grant).transpose()
}

pub(crate) async fn upsert(
	db: &SqlitePool,
	tn_id: TnId,
	entry: EntryId,
	data: &GrantData,
) -> EkResult<()> {
	sqlx::query(
		"INSERT INTO shared_access (tn_id, entry_id, user_id, access_level, expires_at, granted_by) \
		 VALUES (?, ?, ?, ?, ?, ?) \
		 ON CONFLICT(tn_id, entry_id, user_id) DO UPDATE SET \
		 access_level = excluded.access_level, \
		 expires_at = excluded.expires_at, \
		 granted_by = excluded.granted_by",
	)
	.bind(tn_id.0)
	.bind(entry.0)
	.bind(data.grantee.0)
	.bind(data.level.as_str())
	.bind(data.expires_at.map(|t| t.0))
	.bind(data.granted_by.0)
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn delete(
	db: &SqlitePool,
	tn_id: TnId,
	entry: EntryId,
	user: UserId,
) -> EkResult<()> {
	sqlx::query("DELETE FROM shared_access WHERE tn_id = ? AND entry_id = ? AND user_id = ?")
		.bind(tn_id.0)
		.bind(entry.0)
		.bind(user.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn list(
	db: &SqlitePool,
	tn_id: TnId,
	entry: EntryId,
) -> EkResult<Vec<SharedAccessGrant>> {
	let rows = sqlx::query(
		"SELECT user_id, access_level, expires_at, granted_by, created_at \
		 FROM shared_access WHERE tn_id = ? AND entry_id = ? ORDER BY user_id",
	)
	.bind(tn_id.0)
	.bind(entry.0)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	rows.iter().map(map_grant).collect()
}
