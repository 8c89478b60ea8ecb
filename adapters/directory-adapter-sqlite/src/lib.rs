//! SQLite-backed directory adapter for Edukit.
//!
//! Serves the engine's read-only view of the deployment's identity and
//! course structure: cohort membership, enrollment, course groups,
//! capability assignments, and activities. The inherent `seed_*` methods
//! are the write surface used by directory synchronization and tests;
//! they are not part of the `DirectoryAdapter` contract.

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::collections::HashSet;
use std::path::Path;

use edukit::directory_adapter::{
	ActivityView, Capability, CapabilityScope, Cohort, DirectoryAdapter,
};
use edukit::prelude::*;

mod activity;
mod cohort;
mod course;
mod schema;

pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Storage encoding of a capability scope: type tag plus scoped id.
pub(crate) fn scope_parts(scope: CapabilityScope) -> (&'static str, i64) {
	match scope {
		CapabilityScope::System => ("S", 0),
		CapabilityScope::Course(course) => ("C", course.0),
		CapabilityScope::Activity(activity) => ("A", activity.0),
	}
}

#[derive(Debug)]
pub struct DirectoryAdapterSqlite {
	db: SqlitePool,
}

impl DirectoryAdapterSqlite {
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

	// Seed surface (directory sync / tests)
	//***************************************
	pub async fn seed_cohort(&self, tn_id: TnId, cohort: CohortId, name: &str) -> EkResult<()> {
		cohort::seed(&self.db, tn_id, cohort, name).await
	}

	pub async fn seed_cohort_member(
		&self,
		tn_id: TnId,
		cohort: CohortId,
		user: UserId,
	) -> EkResult<()> {
		cohort::seed_member(&self.db, tn_id, cohort, user).await
	}

	pub async fn seed_course(&self, tn_id: TnId, course: CourseId, name: &str) -> EkResult<()> {
		course::seed(&self.db, tn_id, course, name).await
	}

	pub async fn seed_enrolment(
		&self,
		tn_id: TnId,
		course: CourseId,
		user: UserId,
	) -> EkResult<()> {
		course::seed_enrolment(&self.db, tn_id, course, user).await
	}

	pub async fn seed_group(
		&self,
		tn_id: TnId,
		group: GroupId,
		course: CourseId,
		name: &str,
	) -> EkResult<()> {
		course::seed_group(&self.db, tn_id, group, course, name).await
	}

	pub async fn seed_group_member(
		&self,
		tn_id: TnId,
		group: GroupId,
		user: UserId,
	) -> EkResult<()> {
		course::seed_group_member(&self.db, tn_id, group, user).await
	}

	pub async fn seed_capability(
		&self,
		tn_id: TnId,
		user: UserId,
		capability: Capability,
		scope: CapabilityScope,
	) -> EkResult<()> {
		course::seed_capability(&self.db, tn_id, user, capability, scope).await
	}

	pub async fn seed_activity(
		&self,
		tn_id: TnId,
		activity: ActivityId,
		course: CourseId,
		feature: &str,
		name: &str,
		group_mode: GroupMode,
	) -> EkResult<()> {
		activity::seed(&self.db, tn_id, activity, course, feature, name, group_mode).await
	}
}

#[async_trait]
impl DirectoryAdapter for DirectoryAdapterSqlite {
	// Cohorts
	//*********
	async fn cohorts_of(&self, tn_id: TnId, user: UserId) -> EkResult<HashSet<CohortId>> {
		cohort::of_user(&self.db, tn_id, user).await
	}

	async fn list_cohorts(&self, tn_id: TnId) -> EkResult<Vec<Cohort>> {
		cohort::list(&self.db, tn_id).await
	}

	async fn cohort_user_count(&self, tn_id: TnId, cohorts: &[CohortId]) -> EkResult<u32> {
		cohort::user_count(&self.db, tn_id, cohorts).await
	}

	// Enrollment and groups
	//***********************
	async fn is_enrolled(&self, tn_id: TnId, user: UserId, course: CourseId) -> EkResult<bool> {
		course::is_enrolled(&self.db, tn_id, user, course).await
	}

	async fn enrolled_users(&self, tn_id: TnId, course: CourseId) -> EkResult<HashSet<UserId>> {
		course::enrolled_users(&self.db, tn_id, course).await
	}

	async fn groups_of(
		&self,
		tn_id: TnId,
		user: UserId,
		course: CourseId,
	) -> EkResult<HashSet<GroupId>> {
		course::groups_of(&self.db, tn_id, user, course).await
	}

	async fn group_members(&self, tn_id: TnId, group: GroupId) -> EkResult<HashSet<UserId>> {
		course::group_members(&self.db, tn_id, group).await
	}

	// Capabilities
	//**************
	async fn has_capability(
		&self,
		tn_id: TnId,
		user: UserId,
		capability: Capability,
		scope: CapabilityScope,
	) -> EkResult<bool> {
		course::has_capability(&self.db, tn_id, user, capability, scope).await
	}

	// Activities
	//************
	async fn activities_of(&self, tn_id: TnId, feature: &str) -> EkResult<Vec<ActivityView>> {
		activity::of_feature(&self.db, tn_id, feature).await
	}

	async fn read_activity(&self, tn_id: TnId, activity: ActivityId) -> EkResult<ActivityView> {
		activity::read(&self.db, tn_id, activity).await
	}
}

// vim: ts=4
