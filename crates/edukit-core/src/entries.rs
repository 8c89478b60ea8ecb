//! Entry aggregation
//!
//! Combines the cohort gate and the visibility resolver across the
//! activities of one or all feature areas to produce the ordered,
//! paginated set of entries a user may see. A single broken activity is
//! skipped; it never aborts evaluation of the rest.

use itertools::Itertools;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::prelude::*;
use crate::{cohort, visibility};
use edukit_types::directory_adapter::{ActivityView, Capability, CapabilityScope};
use edukit_types::store_adapter::{Entry, EntryStatus};

const WEEK_SECS: i64 = 7 * 24 * 60 * 60;

/// Filters applied as a conjunction over the visible set.
///
/// `feature` narrows the evaluation to one feature area; without it, every
/// registered feature passing the cohort gate contributes.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
	pub feature: Option<Box<str>>,
	pub course: Option<CourseId>,
	pub activity: Option<ActivityId>,
	pub status: Option<EntryStatus>,
	/// Case-insensitive substring match over title and content.
	pub q: Option<Box<str>>,
}

impl EntryFilter {
	pub fn feature(feature: &str) -> Self {
		Self { feature: Some(feature.into()), ..Self::default() }
	}
}

/// Pagination window. `limit` is clamped to `[1, opts.max_page_size]`.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
	pub limit: u32,
	pub offset: u32,
}

impl Default for Pagination {
	fn default() -> Self {
		Self { limit: 50, offset: 0 }
	}
}

/// An entry together with its display context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleEntry {
	#[serde(flatten)]
	pub entry: Entry,
	pub course_id: CourseId,
	pub course_name: Box<str>,
	pub activity_name: Box<str>,
}

/// One page of aggregation output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPage {
	pub items: Vec<VisibleEntry>,
	pub total_count: u32,
	pub has_more: bool,
}

/// Display row produced by the boundary post-processing pass.
#[derive(Debug, Clone)]
pub enum EntryRow {
	/// Marks a (course, activity) change relative to the previous row.
	Boundary { course_name: Box<str>, activity_name: Box<str> },
	Entry(VisibleEntry),
}

/// Per-user aggregate counts for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStats {
	pub total: u32,
	pub this_week: u32,
	pub courses: u32,
	pub activities: u32,
}

/// Resolve the ordered, paginated set of entries visible to `user` within
/// a feature area.
///
/// Ordering is the stable three-key sort (course name, activity name,
/// modification time descending), ties broken by entry id ascending, so
/// re-querying with identical inputs and unchanged data returns an
/// identical order.
pub async fn visible_entries(
	app: &App,
	tn_id: TnId,
	user: UserId,
	filter: &EntryFilter,
	page: &Pagination,
) -> EkResult<EntryPage> {
	let mut items = collect_visible(app, tn_id, user, filter).await?;

	items.sort_by(|a, b| {
		a.course_name
			.cmp(&b.course_name)
			.then_with(|| a.activity_name.cmp(&b.activity_name))
			.then_with(|| b.entry.modified_at.cmp(&a.entry.modified_at))
			.then_with(|| a.entry.entry_id.cmp(&b.entry.entry_id))
	});

	let total_count = items.len() as u32;
	let limit = page.limit.clamp(1, app.opts.max_page_size.max(1)) as usize;
	let offset = page.offset as usize;

	let items: Vec<VisibleEntry> =
		items.into_iter().skip(offset).take(limit).collect();
	let has_more = offset + items.len() < total_count as usize;

	Ok(EntryPage { items, total_count, has_more })
}

/// Insert display boundaries wherever the (course, activity) key differs
/// from the previous row. Pure post-processing; never reorders.
pub fn with_boundaries(items: &[VisibleEntry]) -> Vec<EntryRow> {
	let mut rows = Vec::with_capacity(items.len());
	let mut last_key: Option<(&str, &str)> = None;

	for item in items {
		let key = (item.course_name.as_ref(), item.activity_name.as_ref());
		if last_key != Some(key) {
			rows.push(EntryRow::Boundary {
				course_name: item.course_name.clone(),
				activity_name: item.activity_name.clone(),
			});
			last_key = Some(key);
		}
		rows.push(EntryRow::Entry(item.clone()));
	}

	rows
}

/// Aggregate counts over everything the user can see in a feature area.
pub async fn user_statistics(
	app: &App,
	tn_id: TnId,
	user: UserId,
	feature: &str,
) -> EkResult<EntryStats> {
	let items = collect_visible(app, tn_id, user, &EntryFilter::feature(feature)).await?;
	let week_ago = Timestamp::now().add_seconds(-WEEK_SECS);

	Ok(EntryStats {
		total: items.len() as u32,
		this_week: items.iter().filter(|i| i.entry.modified_at >= week_ago).count() as u32,
		courses: items.iter().map(|i| i.course_id).unique().count() as u32,
		activities: items.iter().map(|i| i.entry.activity_id).unique().count() as u32,
	})
}

/// Gather the unsorted visible set: gates, eligible activities, one
/// batched entry fetch, per-activity owner-set filtering, filter
/// conjunction.
async fn collect_visible(
	app: &App,
	tn_id: TnId,
	user: UserId,
	filter: &EntryFilter,
) -> EkResult<Vec<VisibleEntry>> {
	// An explicit feature filter narrows the evaluation; otherwise every
	// registered feature is a candidate
	let features: Vec<Box<str>> = match &filter.feature {
		Some(feature) => vec![feature.clone()],
		None => app.registry.plugins().iter().map(|p| p.key().into()).collect(),
	};

	let mut eligible: Vec<ActivityView> = Vec::new();
	for feature in &features {
		if !cohort::allowed(app, tn_id, feature, user).await {
			continue;
		}

		let activities = app.directory_adapter.activities_of(tn_id, feature).await?;
		for activity in activities {
			match activity_accessible(app, tn_id, user, &activity).await {
				Ok(true) => eligible.push(activity),
				Ok(false) => {}
				Err(err) => {
					// A broken activity contributes nothing; keep evaluating
					warn!(%tn_id, activity = %activity.activity_id, "Skipping activity: {}", err);
				}
			}
		}
	}
	if eligible.is_empty() {
		return Ok(vec![]);
	}

	// Owner sets are resolved per activity but memoized per (course, mode):
	// activities sharing both resolve to the same set
	let mut owner_cache: HashMap<(CourseId, GroupMode), HashSet<UserId>> = HashMap::new();
	let mut visible_activities: HashMap<ActivityId, ActivityView> = HashMap::new();
	for activity in eligible {
		let key = (activity.course_id, activity.group_mode);
		if !owner_cache.contains_key(&key) {
			match visibility::visible_entry_owners(app, tn_id, &activity, user).await {
				Ok(owners) => {
					owner_cache.insert(key, owners);
				}
				Err(err) => {
					warn!(%tn_id, activity = %activity.activity_id, "Skipping activity: {}", err);
					continue;
				}
			}
		}
		visible_activities.insert(activity.activity_id, activity);
	}

	let activity_ids: Vec<ActivityId> = visible_activities.keys().copied().collect();
	let entries = app.store_adapter.list_entries(tn_id, &activity_ids).await?;

	let mut items = Vec::with_capacity(entries.len());
	for entry in entries {
		let Some(activity) = visible_activities.get(&entry.activity_id) else { continue };
		let Some(owners) = owner_cache.get(&(activity.course_id, activity.group_mode)) else {
			continue;
		};

		if !visibility::entry_visible(&entry, owners) {
			continue;
		}
		if !matches_filter(&entry, activity, filter) {
			continue;
		}

		items.push(VisibleEntry {
			course_id: activity.course_id,
			course_name: activity.course_name.clone(),
			activity_name: activity.name.clone(),
			entry,
		});
	}

	Ok(items)
}

/// Base access to an activity: enrollment (or staff course view) plus the
/// feature's view capability.
async fn activity_accessible(
	app: &App,
	tn_id: TnId,
	user: UserId,
	activity: &ActivityView,
) -> EkResult<bool> {
	let dir = &app.directory_adapter;
	let course_scope = CapabilityScope::Course(activity.course_id);

	let enrolled = dir.is_enrolled(tn_id, user, activity.course_id).await?;
	if !enrolled && !dir.has_capability(tn_id, user, Capability::ViewCourse, course_scope).await? {
		return Ok(false);
	}

	dir.has_capability(tn_id, user, Capability::ViewEntries, course_scope).await
}

fn matches_filter(entry: &Entry, activity: &ActivityView, filter: &EntryFilter) -> bool {
	if filter.course.is_some_and(|c| c != activity.course_id) {
		return false;
	}
	if filter.activity.is_some_and(|a| a != entry.activity_id) {
		return false;
	}
	if filter.status.is_some_and(|s| s != entry.status) {
		return false;
	}
	if let Some(q) = &filter.q {
		let q = q.to_lowercase();
		if !entry.title.to_lowercase().contains(&q) && !entry.content.to_lowercase().contains(&q)
		{
			return false;
		}
	}
	true
}


// vim: ts=4
