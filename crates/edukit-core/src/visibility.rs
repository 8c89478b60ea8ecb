//! Group-mode visibility resolution
//!
//! Determines, per activity, whose entries a user may see. In `NoGroups`
//! and `Visible` modes every enrolled user is visible; in `Separate` mode
//! visibility is limited to the user's own groups unless they hold the
//! all-groups override. Entries with no group assignment bypass grouping
//! entirely.

use std::collections::HashSet;

use crate::prelude::*;
use edukit_types::directory_adapter::{ActivityView, Capability, CapabilityScope};
use edukit_types::store_adapter::Entry;

/// Resolve the set of users whose entries under `activity` are visible to
/// `user`. The aggregator filters raw entries by `entry.owner` membership.
///
/// Errors propagate to the caller; the aggregator treats a failed activity
/// as contributing no entries rather than aborting the whole evaluation.
pub async fn visible_entry_owners(
	app: &App,
	tn_id: TnId,
	activity: &ActivityView,
	user: UserId,
) -> EkResult<HashSet<UserId>> {
	match activity.group_mode {
		// Ungrouped or visible groups: everyone enrolled in the course
		GroupMode::NoGroups | GroupMode::Visible => {
			app.directory_adapter.enrolled_users(tn_id, activity.course_id).await
		}
		GroupMode::Separate => {
			let override_all = app
				.directory_adapter
				.has_capability(
					tn_id,
					user,
					Capability::AccessAllGroups,
					CapabilityScope::Course(activity.course_id),
				)
				.await?;
			if override_all {
				return app.directory_adapter.enrolled_users(tn_id, activity.course_id).await;
			}

			let groups = app.directory_adapter.groups_of(tn_id, user, activity.course_id).await?;
			if groups.is_empty() {
				// Ungrouped user: self-visibility fallback, never empty,
				// so a user's own ungrouped entries stay reachable
				return Ok(HashSet::from([user]));
			}

			let mut owners = HashSet::new();
			for group in groups {
				owners.extend(app.directory_adapter.group_members(tn_id, group).await?);
			}
			Ok(owners)
		}
	}
}

/// Whether a single entry passes the owner-set filter.
///
/// An entry with no group assignment predates or bypasses grouping and is
/// visible regardless of group mode.
pub fn entry_visible(entry: &Entry, visible_owners: &HashSet<UserId>) -> bool {
	entry.group_id.is_none() || visible_owners.contains(&entry.owner)
}


// vim: ts=4
