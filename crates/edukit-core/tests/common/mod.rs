//! In-memory mock adapters for engine tests
//!
//! Both mocks hold their state behind mutexes so the trait's `&self`
//! methods can mutate them, and expose failure toggles for exercising the
//! documented fallback behavior of each gate.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use edukit_core::app::{AppOpts, AppState};
use edukit_core::prelude::*;
use edukit_core::registry::{
	DashboardBlock, FeaturePlugin, FeatureRegistry, PluginMetadata, ToolSpec,
};
use edukit_types::directory_adapter::{
	ActivityView, Capability, CapabilityScope, Cohort, DirectoryAdapter,
};
use edukit_types::store_adapter::{
	CreateEntryData, Entry, EntryStatus, GrantData, SharedAccessGrant, StoreAdapter,
};

pub const TN: TnId = TnId(1);

#[derive(Debug, Default)]
pub struct MockDirectory {
	pub cohorts: Mutex<HashMap<UserId, HashSet<CohortId>>>,
	pub cohort_list: Mutex<Vec<Cohort>>,
	pub enrolments: Mutex<HashMap<CourseId, HashSet<UserId>>>,
	pub groups: Mutex<HashMap<GroupId, (CourseId, HashSet<UserId>)>>,
	pub capabilities: Mutex<HashSet<(UserId, Capability, CapabilityScope)>>,
	pub activities: Mutex<Vec<ActivityView>>,

	/// Makes every method fail (upstream outage simulation)
	pub fail_all: AtomicBool,
	/// Makes capability checks fail for one course only
	pub fail_capability_for: Mutex<Option<CourseId>>,
	/// Makes enrolled-user listing fail for one course only
	pub fail_enrolled_for: Mutex<Option<CourseId>>,
}

impl MockDirectory {
	pub fn add_cohort(&self, cohort: CohortId, name: &str, members: &[UserId]) {
		self.cohort_list
			.lock()
			.push(Cohort { cohort_id: cohort, name: name.into() });
		let mut cohorts = self.cohorts.lock();
		for user in members {
			cohorts.entry(*user).or_default().insert(cohort);
		}
	}

	pub fn enrol(&self, course: CourseId, users: &[UserId]) {
		self.enrolments.lock().entry(course).or_default().extend(users.iter().copied());
	}

	pub fn add_group(&self, group: GroupId, course: CourseId, members: &[UserId]) {
		self.groups.lock().insert(group, (course, members.iter().copied().collect()));
	}

	pub fn grant_capability(&self, user: UserId, capability: Capability, scope: CapabilityScope) {
		self.capabilities.lock().insert((user, capability, scope));
	}

	/// Enrols users and hands each the base entries-view capability.
	pub fn enrol_with_view(&self, course: CourseId, users: &[UserId]) {
		self.enrol(course, users);
		for user in users {
			self.grant_capability(*user, Capability::ViewEntries, CapabilityScope::Course(course));
		}
	}

	pub fn add_activity(&self, activity: ActivityView) {
		self.activities.lock().push(activity);
	}

	fn check_fail(&self) -> EkResult<()> {
		if self.fail_all.load(Ordering::Relaxed) {
			return Err(Error::ServiceUnavailable);
		}
		Ok(())
	}
}

#[async_trait]
impl DirectoryAdapter for MockDirectory {
	async fn cohorts_of(&self, _tn_id: TnId, user: UserId) -> EkResult<HashSet<CohortId>> {
		self.check_fail()?;
		Ok(self.cohorts.lock().get(&user).cloned().unwrap_or_default())
	}

	async fn list_cohorts(&self, _tn_id: TnId) -> EkResult<Vec<Cohort>> {
		self.check_fail()?;
		let mut cohorts = self.cohort_list.lock().clone();
		cohorts.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(cohorts)
	}

	async fn cohort_user_count(&self, _tn_id: TnId, wanted: &[CohortId]) -> EkResult<u32> {
		self.check_fail()?;
		let cohorts = self.cohorts.lock();
		let count = cohorts
			.iter()
			.filter(|(_, memberships)| wanted.iter().any(|c| memberships.contains(c)))
			.count();
		Ok(count as u32)
	}

	async fn is_enrolled(&self, _tn_id: TnId, user: UserId, course: CourseId) -> EkResult<bool> {
		self.check_fail()?;
		Ok(self.enrolments.lock().get(&course).is_some_and(|users| users.contains(&user)))
	}

	async fn enrolled_users(&self, _tn_id: TnId, course: CourseId) -> EkResult<HashSet<UserId>> {
		self.check_fail()?;
		if *self.fail_enrolled_for.lock() == Some(course) {
			return Err(Error::DbError);
		}
		Ok(self.enrolments.lock().get(&course).cloned().unwrap_or_default())
	}

	async fn groups_of(
		&self,
		_tn_id: TnId,
		user: UserId,
		course: CourseId,
	) -> EkResult<HashSet<GroupId>> {
		self.check_fail()?;
		Ok(self
			.groups
			.lock()
			.iter()
			.filter(|(_, (group_course, members))| {
				*group_course == course && members.contains(&user)
			})
			.map(|(group, _)| *group)
			.collect())
	}

	async fn group_members(&self, _tn_id: TnId, group: GroupId) -> EkResult<HashSet<UserId>> {
		self.check_fail()?;
		Ok(self.groups.lock().get(&group).map(|(_, members)| members.clone()).unwrap_or_default())
	}

	async fn has_capability(
		&self,
		_tn_id: TnId,
		user: UserId,
		capability: Capability,
		scope: CapabilityScope,
	) -> EkResult<bool> {
		self.check_fail()?;
		if let CapabilityScope::Course(course) = scope {
			if *self.fail_capability_for.lock() == Some(course) {
				return Err(Error::DbError);
			}
		}
		Ok(self.capabilities.lock().contains(&(user, capability, scope)))
	}

	async fn activities_of(&self, _tn_id: TnId, feature: &str) -> EkResult<Vec<ActivityView>> {
		self.check_fail()?;
		Ok(self
			.activities
			.lock()
			.iter()
			.filter(|a| a.feature.as_ref() == feature)
			.cloned()
			.collect())
	}

	async fn read_activity(&self, _tn_id: TnId, activity: ActivityId) -> EkResult<ActivityView> {
		self.check_fail()?;
		self.activities
			.lock()
			.iter()
			.find(|a| a.activity_id == activity)
			.cloned()
			.ok_or(Error::NotFound)
	}
}

#[derive(Debug, Default)]
pub struct MockStore {
	pub restrictions: Mutex<HashMap<Box<str>, HashSet<CohortId>>>,
	pub entries: Mutex<HashMap<EntryId, Entry>>,
	pub grants: Mutex<HashMap<(EntryId, UserId), SharedAccessGrant>>,
	next_entry: AtomicI64,

	/// Restriction reads report an upstream outage
	pub restrictions_unavailable: AtomicBool,
	/// Restriction reads report the store as absent
	pub restrictions_missing: AtomicBool,
}

impl MockStore {
	pub fn set_unavailable(&self, value: bool) {
		self.restrictions_unavailable.store(value, Ordering::Relaxed);
	}

	pub fn set_missing(&self, value: bool) {
		self.restrictions_missing.store(value, Ordering::Relaxed);
	}

	pub fn put_entry(&self, activity: ActivityId, owner: UserId, group: Option<GroupId>) -> EntryId {
		self.put_entry_at(activity, owner, group, Timestamp::now())
	}

	pub fn put_entry_at(
		&self,
		activity: ActivityId,
		owner: UserId,
		group: Option<GroupId>,
		modified_at: Timestamp,
	) -> EntryId {
		let entry_id = EntryId(self.next_entry.fetch_add(1, Ordering::Relaxed) + 1);
		self.entries.lock().insert(
			entry_id,
			Entry {
				entry_id,
				activity_id: activity,
				owner,
				group_id: group,
				title: format!("entry {}", entry_id).into(),
				content: "".into(),
				status: EntryStatus::Published,
				created_at: modified_at,
				modified_at,
			},
		);
		entry_id
	}

	/// Test-side convenience for fetching a seeded entry.
	pub fn read_entry_sync(&self, entry: EntryId) -> Entry {
		self.entries.lock().get(&entry).cloned().expect("seeded entry")
	}

	fn restrictions_result(&self) -> EkResult<()> {
		if self.restrictions_missing.load(Ordering::Relaxed) {
			return Err(Error::NotFound);
		}
		if self.restrictions_unavailable.load(Ordering::Relaxed) {
			return Err(Error::ServiceUnavailable);
		}
		Ok(())
	}
}

#[async_trait]
impl StoreAdapter for MockStore {
	async fn list_restrictions(&self, _tn_id: TnId, feature: &str) -> EkResult<Vec<CohortId>> {
		self.restrictions_result()?;
		let mut cohorts: Vec<CohortId> =
			self.restrictions.lock().get(feature).map(|s| s.iter().copied().collect()).unwrap_or_default();
		cohorts.sort();
		Ok(cohorts)
	}

	async fn add_restriction(
		&self,
		_tn_id: TnId,
		feature: &str,
		cohort: CohortId,
	) -> EkResult<bool> {
		self.restrictions_result()?;
		Ok(self.restrictions.lock().entry(feature.into()).or_default().insert(cohort))
	}

	async fn remove_restriction(
		&self,
		_tn_id: TnId,
		feature: &str,
		cohort: CohortId,
	) -> EkResult<()> {
		self.restrictions_result()?;
		if let Some(set) = self.restrictions.lock().get_mut(feature) {
			set.remove(&cohort);
		}
		Ok(())
	}

	async fn clear_restrictions(&self, _tn_id: TnId, feature: &str) -> EkResult<()> {
		self.restrictions_result()?;
		self.restrictions.lock().remove(feature);
		Ok(())
	}

	async fn count_restrictions(&self, _tn_id: TnId, feature: &str) -> EkResult<u32> {
		self.restrictions_result()?;
		Ok(self.restrictions.lock().get(feature).map_or(0, |s| s.len() as u32))
	}

	async fn list_entries(&self, _tn_id: TnId, activities: &[ActivityId]) -> EkResult<Vec<Entry>> {
		let entries = self.entries.lock();
		Ok(entries
			.values()
			.filter(|e| activities.contains(&e.activity_id))
			.cloned()
			.collect())
	}

	async fn read_entry(&self, _tn_id: TnId, entry: EntryId) -> EkResult<Entry> {
		self.entries.lock().get(&entry).cloned().ok_or(Error::NotFound)
	}

	async fn create_entry(&self, _tn_id: TnId, data: &CreateEntryData<'_>) -> EkResult<EntryId> {
		let entry_id = EntryId(self.next_entry.fetch_add(1, Ordering::Relaxed) + 1);
		let now = Timestamp::now();
		self.entries.lock().insert(
			entry_id,
			Entry {
				entry_id,
				activity_id: data.activity_id,
				owner: data.owner,
				group_id: data.group_id,
				title: data.title.into(),
				content: data.content.into(),
				status: data.status,
				created_at: now,
				modified_at: now,
			},
		);
		Ok(entry_id)
	}

	async fn delete_entry(&self, _tn_id: TnId, entry: EntryId) -> EkResult<()> {
		// Grants are left behind on purpose: readers must ignore orphans
		self.entries.lock().remove(&entry).map(|_| ()).ok_or(Error::NotFound)
	}

	async fn read_grant(
		&self,
		_tn_id: TnId,
		entry: EntryId,
		user: UserId,
	) -> EkResult<Option<SharedAccessGrant>> {
		Ok(self.grants.lock().get(&(entry, user)).cloned())
	}

	async fn upsert_grant(&self, _tn_id: TnId, entry: EntryId, data: &GrantData) -> EkResult<()> {
		self.grants.lock().insert(
			(entry, data.grantee),
			SharedAccessGrant {
				user_id: data.grantee,
				level: data.level,
				expires_at: data.expires_at,
				granted_by: data.granted_by,
				created_at: Timestamp::now(),
			},
		);
		Ok(())
	}

	async fn delete_grant(&self, _tn_id: TnId, entry: EntryId, user: UserId) -> EkResult<()> {
		self.grants.lock().remove(&(entry, user));
		Ok(())
	}

	async fn list_grants(&self, _tn_id: TnId, entry: EntryId) -> EkResult<Vec<SharedAccessGrant>> {
		let mut grants: Vec<SharedAccessGrant> = self
			.grants
			.lock()
			.iter()
			.filter(|((grant_entry, _), _)| *grant_entry == entry)
			.map(|(_, grant)| grant.clone())
			.collect();
		grants.sort_by_key(|g| g.user_id);
		Ok(grants)
	}
}

/// Bare-bones plugin for registry-driven aggregation tests.
pub struct SimplePlugin(pub &'static str);

#[async_trait]
impl FeaturePlugin for SimplePlugin {
	fn key(&self) -> &'static str {
		self.0
	}

	fn metadata(&self) -> PluginMetadata {
		PluginMetadata {
			key: self.0.into(),
			name: self.0.into(),
			description: "".into(),
			version: "0.0.0".into(),
		}
	}

	fn tools(&self) -> Vec<ToolSpec> {
		vec![]
	}

	async fn dashboard_blocks(
		&self,
		_app: &App,
		_tn_id: TnId,
		_user: UserId,
	) -> EkResult<Vec<DashboardBlock>> {
		Ok(vec![])
	}
}

pub struct TestEnv {
	pub app: App,
	pub directory: Arc<MockDirectory>,
	pub store: Arc<MockStore>,
}

pub fn test_env() -> TestEnv {
	test_env_with(AppOpts::default(), FeatureRegistry::new(vec![]))
}

pub fn test_env_with(opts: AppOpts, registry: FeatureRegistry) -> TestEnv {
	let directory = Arc::new(MockDirectory::default());
	let store = Arc::new(MockStore::default());
	let app = AppState::new(opts, directory.clone(), store.clone(), registry);
	TestEnv { app, directory, store }
}

/// Activity builder with the defaults most tests want.
pub fn activity(
	id: i64,
	course: i64,
	course_name: &str,
	name: &str,
	group_mode: GroupMode,
) -> ActivityView {
	ActivityView {
		activity_id: ActivityId(id),
		course_id: CourseId(course),
		feature: "valuemap".into(),
		name: name.into(),
		course_name: course_name.into(),
		group_mode,
	}
}

// vim: ts=4
