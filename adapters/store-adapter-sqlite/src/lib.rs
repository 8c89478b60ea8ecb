//! SQLite-backed store adapter for Edukit.
//!
//! Stores the data the engine owns: cohort restrictions per feature,
//! entries, and shared-access grants. The schema is created on first open;
//! the restriction table therefore always exists here, so this adapter
//! never reports the configuration-absent case itself.

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use edukit::prelude::*;
use edukit::store_adapter::{
	self, CreateEntryData, Entry, GrantData, SharedAccessGrant, StoreAdapter,
};

mod entry;
mod grant;
mod restriction;
mod schema;

pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

#[derive(Debug)]
pub struct StoreAdapterSqlite {
	db: SqlitePool,
}

impl StoreAdapterSqlite {
	pub async fn new(path: impl AsRef<Path>) -> EkResult<Self> {
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

		schema::init_db(&db).await.inspect_err(|err| inspect(err)).map_err(|_| Error::DbError)?;

		Ok(Self { db })
	}
}

#[async_trait]
impl StoreAdapter for StoreAdapterSqlite {
	// Cohort restrictions
	//*********************
	async fn list_restrictions(&self, tn_id: TnId, feature: &str) -> EkResult<Vec<CohortId>> {
		restriction::list(&self.db, tn_id, feature).await
	}

	async fn add_restriction(
		&self,
		tn_id: TnId,
		feature: &str,
		cohort: CohortId,
	) -> EkResult<bool> {
		restriction::add(&self.db, tn_id, feature, cohort).await
	}

	async fn remove_restriction(
		&self,
		tn_id: TnId,
		feature: &str,
		cohort: CohortId,
	) -> EkResult<()> {
		restriction::remove(&self.db, tn_id, feature, cohort).await
	}

	async fn clear_restrictions(&self, tn_id: TnId, feature: &str) -> EkResult<()> {
		restriction::clear(&self.db, tn_id, feature).await
	}

	async fn count_restrictions(&self, tn_id: TnId, feature: &str) -> EkResult<u32> {
		restriction::count(&self.db, tn_id, feature).await
	}

	// Entries
	//*********
	async fn list_entries(&self, tn_id: TnId, activities: &[ActivityId]) -> EkResult<Vec<Entry>> {
		entry::list(&self.db, tn_id, activities).await
	}

	async fn read_entry(&self, tn_id: TnId, entry: EntryId) -> EkResult<Entry> {
		entry::read(&self.db, tn_id, entry).await
	}

	async fn create_entry(&self, tn_id: TnId, data: &CreateEntryData<'_>) -> EkResult<EntryId> {
		entry::create(&self.db, tn_id, data).await
	}

	async fn delete_entry(&self, tn_id: TnId, entry: EntryId) -> EkResult<()> {
		entry::delete(&self.db, tn_id, entry).await
	}

	// Shared access
	//***************
	async fn read_grant(
		&self,
		tn_id: TnId,
		entry: EntryId,
		user: UserId,
	) -> EkResult<Option<SharedAccessGrant>> {
		grant::read(&self.db, tn_id, entry, user).await
	}

	async fn upsert_grant(&self, tn_id: TnId, entry: EntryId, data: &GrantData) -> EkResult<()> {
		grant::upsert(&self.db, tn_id, entry, data).await
	}

	async fn delete_grant(&self, tn_id: TnId, entry: EntryId, user: UserId) -> EkResult<()> {
		grant::delete(&self.db, tn_id, entry, user).await
	}

	async fn list_grants(&self, tn_id: TnId, entry: EntryId) -> EkResult<Vec<SharedAccessGrant>> {
		grant::list(&self.db, tn_id, entry).await
	}
}

pub(crate) fn status_to_char(status: store_adapter::EntryStatus) -> &'static str {
	match status {
		store_adapter::EntryStatus::Draft => "D",
		store_adapter::EntryStatus::Published => "P",
		store_adapter::EntryStatus::Archived => "A",
	}
}

pub(crate) fn status_from_char(s: &str) -> EkResult<store_adapter::EntryStatus> {
	match s {
		"D" => Ok(store_adapter::EntryStatus::Draft),
		"P" => Ok(store_adapter::EntryStatus::Published),
		"A" => Ok(store_adapter::EntryStatus::Archived),
		_ => Err(Error::DbError),
	}
}

// vim: ts=4
