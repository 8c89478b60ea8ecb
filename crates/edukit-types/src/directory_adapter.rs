//! Adapter over the external identity and course directory.
//!
//! The directory owns users, cohorts, course enrollment, course groups,
//! capability assignments, and the activity structure. The engine only ever
//! reads from it; user and course lifecycle is managed elsewhere.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;

use crate::prelude::*;

/// A named group of users used purely for feature gating.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
	pub cohort_id: CohortId,
	pub name: Box<str>,
}

/// Denormalized activity read model.
///
/// Course and activity display names ride along so the aggregator can order
/// results without extra lookups.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
	pub activity_id: ActivityId,
	pub course_id: CourseId,
	/// Feature area this activity belongs to (e.g. "valuemap").
	pub feature: Box<str>,
	pub name: Box<str>,
	pub course_name: Box<str>,
	pub group_mode: GroupMode,
}

/// Capabilities the engine consults on the directory.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Capability {
	/// Base capability to view a feature's entries in a course.
	ViewEntries,
	/// Manage entries of a feature in a course.
	ManageEntries,
	/// View a course without being enrolled (staff access).
	ViewCourse,
	/// Override for separate group mode: see all groups' entries.
	AccessAllGroups,
}

impl Capability {
	pub fn as_str(self) -> &'static str {
		match self {
			Capability::ViewEntries => "entries:view",
			Capability::ManageEntries => "entries:manage",
			Capability::ViewCourse => "course:view",
			Capability::AccessAllGroups => "groups:accessall",
		}
	}
}

/// Scope a capability is checked against.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CapabilityScope {
	System,
	Course(CourseId),
	Activity(ActivityId),
}

/// An Edukit directory adapter
///
/// Every `DirectoryAdapter` implementation is required to implement this
/// trait. It is a thin, read-only view of the deployment's identity and
/// course structure; all methods are side-effect free.
#[async_trait]
pub trait DirectoryAdapter: Debug + Send + Sync {
	/// # Cohorts
	/// Cohort memberships of a user.
	async fn cohorts_of(&self, tn_id: TnId, user: UserId) -> EkResult<HashSet<CohortId>>;

	/// All cohorts of the tenant, ordered by name (admin selection lists).
	async fn list_cohorts(&self, tn_id: TnId) -> EkResult<Vec<Cohort>>;

	/// Distinct users across the given cohorts.
	async fn cohort_user_count(&self, tn_id: TnId, cohorts: &[CohortId]) -> EkResult<u32>;

	/// # Enrollment and groups
	async fn is_enrolled(&self, tn_id: TnId, user: UserId, course: CourseId) -> EkResult<bool>;

	/// All users enrolled in a course.
	async fn enrolled_users(&self, tn_id: TnId, course: CourseId) -> EkResult<HashSet<UserId>>;

	/// Groups the user belongs to within a course.
	async fn groups_of(&self, tn_id: TnId, user: UserId, course: CourseId)
		-> EkResult<HashSet<GroupId>>;

	/// Members of a group.
	async fn group_members(&self, tn_id: TnId, group: GroupId) -> EkResult<HashSet<UserId>>;

	/// # Capabilities
	async fn has_capability(
		&self,
		tn_id: TnId,
		user: UserId,
		capability: Capability,
		scope: CapabilityScope,
	) -> EkResult<bool>;

	/// # Activities
	/// Activities belonging to a feature area, across all courses.
	async fn activities_of(&self, tn_id: TnId, feature: &str) -> EkResult<Vec<ActivityView>>;

	async fn read_activity(&self, tn_id: TnId, activity: ActivityId) -> EkResult<ActivityView>;
}

// vim: ts=4
