//! Adapter that stores the engine-owned data: entries, cohort restrictions,
//! and shared-access grants.
//!
//! Restriction and grant writes are single atomic row operations; no
//! multi-step transactions are required anywhere in this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::prelude::*;

/// Lifecycle state of an entry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
	Draft,
	#[default]
	Published,
	Archived,
}

impl EntryStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			EntryStatus::Draft => "draft",
			EntryStatus::Published => "published",
			EntryStatus::Archived => "archived",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"draft" => Some(EntryStatus::Draft),
			"published" => Some(EntryStatus::Published),
			"archived" => Some(EntryStatus::Archived),
			_ => None,
		}
	}
}

/// A content entry. Belongs to exactly one activity and is never reassigned.
///
/// `group_id` of `None` means the entry predates or bypasses grouping; such
/// entries are visible regardless of the activity's group mode.
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
	pub entry_id: EntryId,
	pub activity_id: ActivityId,
	pub owner: UserId,
	pub group_id: Option<GroupId>,
	pub title: Box<str>,
	pub content: Box<str>,
	pub status: EntryStatus,
	pub created_at: Timestamp,
	pub modified_at: Timestamp,
}

/// Data needed to create a new entry
#[derive(Debug)]
pub struct CreateEntryData<'a> {
	pub activity_id: ActivityId,
	pub owner: UserId,
	pub group_id: Option<GroupId>,
	pub title: &'a str,
	pub content: &'a str,
	pub status: EntryStatus,
}

/// A shared-access grant row for an entry.
///
/// A grant whose `expires_at` lies in the past is treated as absent; expiry
/// is enforced lazily at read time, there is no background sweep.
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedAccessGrant {
	pub user_id: UserId,
	pub level: AccessLevel,
	pub expires_at: Option<Timestamp>,
	pub granted_by: UserId,
	pub created_at: Timestamp,
}

impl SharedAccessGrant {
	pub fn is_expired(&self, now: Timestamp) -> bool {
		self.expires_at.is_some_and(|exp| exp <= now)
	}
}

/// Data needed to create or replace a grant
#[derive(Debug)]
pub struct GrantData {
	pub grantee: UserId,
	pub level: AccessLevel,
	pub expires_at: Option<Timestamp>,
	pub granted_by: UserId,
}

/// An Edukit store adapter
///
/// Every `StoreAdapter` implementation is required to implement this trait.
/// A `StoreAdapter` is responsible for storing the data the engine itself
/// owns: feature cohort restrictions, entries, and shared-access grants.
#[async_trait]
pub trait StoreAdapter: Debug + Send + Sync {
	/// # Cohort restrictions
	/// Cohorts a feature is restricted to. An empty list means the feature
	/// is unrestricted. `Err(NotFound)` means the restriction store itself
	/// is absent, which callers also treat as unrestricted.
	async fn list_restrictions(&self, tn_id: TnId, feature: &str) -> EkResult<Vec<CohortId>>;

	/// Adds a restriction pair. Returns false when the pair already exists.
	async fn add_restriction(&self, tn_id: TnId, feature: &str, cohort: CohortId)
		-> EkResult<bool>;

	/// Removes a restriction pair. Removing a non-existent pair succeeds.
	async fn remove_restriction(
		&self,
		tn_id: TnId,
		feature: &str,
		cohort: CohortId,
	) -> EkResult<()>;

	/// Removes every restriction of a feature.
	async fn clear_restrictions(&self, tn_id: TnId, feature: &str) -> EkResult<()>;

	async fn count_restrictions(&self, tn_id: TnId, feature: &str) -> EkResult<u32>;

	/// # Entries
	/// One batched fetch of the entries under the given activities.
	async fn list_entries(&self, tn_id: TnId, activities: &[ActivityId]) -> EkResult<Vec<Entry>>;

	async fn read_entry(&self, tn_id: TnId, entry: EntryId) -> EkResult<Entry>;

	async fn create_entry(&self, tn_id: TnId, data: &CreateEntryData<'_>) -> EkResult<EntryId>;

	/// Deletes an entry. Its grants become orphaned and are ignored at read
	/// time rather than cascaded.
	async fn delete_entry(&self, tn_id: TnId, entry: EntryId) -> EkResult<()>;

	/// # Shared-access grants
	async fn read_grant(
		&self,
		tn_id: TnId,
		entry: EntryId,
		user: UserId,
	) -> EkResult<Option<SharedAccessGrant>>;

	/// Creates or replaces the grant for `(entry, data.grantee)`.
	async fn upsert_grant(&self, tn_id: TnId, entry: EntryId, data: &GrantData) -> EkResult<()>;

	/// Deletes a grant. Deleting a non-existent grant succeeds.
	async fn delete_grant(&self, tn_id: TnId, entry: EntryId, user: UserId) -> EkResult<()>;

	async fn list_grants(&self, tn_id: TnId, entry: EntryId) -> EkResult<Vec<SharedAccessGrant>>;
}


// vim: ts=4
