//! Entry storage
//!
//! Entries are fetched in one batched query over the caller's activity
//! set; the aggregator never loops a query per activity.

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};

use crate::{inspect, status_from_char, status_to_char};
use edukit::prelude::*;
use edukit::store_adapter::{CreateEntryData, Entry};

fn map_entry(row: &SqliteRow) -> EkResult<Entry> {
	Ok(Entry {
		entry_id: EntryId(row.get("entry_id")),
		activity_id: ActivityId(row.get("activity_id")),
		owner: UserId(row.get("owner_id")),
		group_id: row.get::<Option<i64>, _>("group_id").map(GroupId),
		title: row.get::<String, _>("title").into(),
		content: row.get::<String, _>("content").into(),
		status: status_from_char(row.get("status"))?,
		created_at: Timestamp(row.get("created_at")),
		modified_at: Timestamp(row.get("modified_at")),
	})
}

pub(crate) async fn list(
	db: &SqlitePool,
	tn_id: TnId,
	activities: &[ActivityId],
) -> EkResult<Vec<Entry>> {
	if activities.is_empty() {
		return Ok(vec![]);
	}

	let mut query = QueryBuilder::new(
		"SELECT entry_id, activity_id, owner_id, group_id, title, content, status, created_at, modified_at \
		 FROM entries WHERE tn_id = ",
	);
	query.push_bind(tn_id.0);
	query.push(" AND activity_id IN (");
	{
		let mut sep = query.separated(", ");
		for activity in activities {
			sep.push_bind(activity.0);
		}
	}
	query.push(")");

	let rows = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	rows.iter().map(map_entry).collect()
}

pub(crate) async fn read(db: &SqlitePool, tn_id: TnId, entry: EntryId) -> EkResult<Entry> {
	let row = sqlx::query(
		"SELECT entry_id, activity_id, owner_id, group_id, title, content, status, created_at, modified_at \
		 FROM entries WHERE tn_id = ? AND entry_id = ?",
	)
	.bind(tn_id.0)
	.bind(entry.0)
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	match row {
		Some(row) => map_entry(&row),
		None => Err(Error::NotFound),
	}
}

pub(crate) async fn create(
	db: &SqlitePool,
	tn_id: TnId,
	data: &CreateEntryData<'_>,
) -> EkResult<EntryId> {
	let res = sqlx::query(
		"INSERT INTO entries (tn_id, activity_id, owner_id, group_id, title, content, status) \
		 VALUES (?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(tn_id.0)
	.bind(data.activity_id.0)
	.bind(data.owner.0)
	.bind(data.group_id.map(|g| g.0))
	.bind(data.title)
	.bind(data.content)
	.bind(status_to_char(data.status))
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(EntryId(res.last_insert_rowid()))
}

pub(crate) async fn delete(db: &SqlitePool, tn_id: TnId, entry: EntryId) -> EkResult<()> {
	// Grants of a deleted entry are left orphaned; readers ignore them
	let res = sqlx::query("DELETE FROM entries WHERE tn_id = ? AND entry_id = ?")
		.bind(tn_id.0)
		.bind(entry.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}
