//! Shared-access resolution
//!
//! Per-entry ownership and sharing gate. Ownership always implies the
//! maximum level; otherwise the grant row decides, with lazy expiry
//! enforced against the evaluation-time clock. Grant writes are validated
//! at the boundary and never silently coerced.

use crate::prelude::*;
use edukit_types::store_adapter::{Entry, GrantData};

/// Effective access level of `user` on an already-loaded entry.
///
/// Returns `None` when the user has no access. Lookup failures resolve to
/// `None` (fail closed) and are logged, never surfaced.
pub async fn effective_level(
	app: &App,
	tn_id: TnId,
	entry: &Entry,
	user: UserId,
) -> Option<AccessLevel> {
	// Owner always has manage access, grant rows for the owner are ignored
	if entry.owner == user {
		return Some(AccessLevel::Manage);
	}

	match app.store_adapter.read_grant(tn_id, entry.entry_id, user).await {
		Ok(Some(grant)) => {
			if grant.is_expired(Timestamp::now()) {
				None
			} else {
				Some(grant.level)
			}
		}
		Ok(None) => None,
		Err(err) => {
			warn!(%tn_id, entry = %entry.entry_id, %user, "Grant lookup failed: {}", err);
			None
		}
	}
}

/// Effective access level by entry id.
///
/// A missing entry yields `None`: grants whose entry has been deleted are
/// orphaned and must be ignored, not resolved.
pub async fn effective_level_for(
	app: &App,
	tn_id: TnId,
	entry_id: EntryId,
	user: UserId,
) -> Option<AccessLevel> {
	match app.store_adapter.read_entry(tn_id, entry_id).await {
		Ok(entry) => effective_level(app, tn_id, &entry, user).await,
		Err(Error::NotFound) => None,
		Err(err) => {
			warn!(%tn_id, entry = %entry_id, %user, "Entry lookup failed: {}", err);
			None
		}
	}
}

/// Whether `user` holds at least `required` on the entry.
pub async fn can_access(
	app: &App,
	tn_id: TnId,
	entry: &Entry,
	user: UserId,
	required: AccessLevel,
) -> bool {
	effective_level(app, tn_id, entry, user).await.is_some_and(|level| level >= required)
}

/// Create or replace a grant for `grantee` on an entry.
///
/// Write boundary checks: the entry must exist, `granter` must be the
/// owner or hold `Manage`, the grantee must not be the owner, and an
/// expiry, when given, must lie in the future.
pub async fn grant(
	app: &App,
	tn_id: TnId,
	entry_id: EntryId,
	granter: UserId,
	grantee: UserId,
	level: AccessLevel,
	expires_at: Option<Timestamp>,
) -> EkResult<()> {
	let entry = app.store_adapter.read_entry(tn_id, entry_id).await?;

	authorize_granter(app, tn_id, &entry, granter).await?;

	if grantee == entry.owner {
		return Err(Error::ValidationError("cannot grant access to the entry owner".into()));
	}
	if let Some(exp) = expires_at {
		if exp <= Timestamp::now() {
			return Err(Error::ValidationError("expiry must lie in the future".into()));
		}
	}

	let data = GrantData { grantee, level, expires_at, granted_by: granter };
	app.store_adapter.upsert_grant(tn_id, entry_id, &data).await?;
	debug!(%tn_id, entry = %entry_id, %grantee, level = %level, "Access granted");
	Ok(())
}

/// Revoke a grant. Revoking a non-existent grant succeeds trivially.
pub async fn revoke(
	app: &App,
	tn_id: TnId,
	entry_id: EntryId,
	granter: UserId,
	grantee: UserId,
) -> EkResult<()> {
	let entry = app.store_adapter.read_entry(tn_id, entry_id).await?;

	authorize_granter(app, tn_id, &entry, granter).await?;

	app.store_adapter.delete_grant(tn_id, entry_id, grantee).await?;
	debug!(%tn_id, entry = %entry_id, %grantee, "Access revoked");
	Ok(())
}

/// List grants on an entry. Restricted to the owner and manage-level users.
pub async fn grants_for(
	app: &App,
	tn_id: TnId,
	entry_id: EntryId,
	requester: UserId,
) -> EkResult<Vec<edukit_types::store_adapter::SharedAccessGrant>> {
	let entry = app.store_adapter.read_entry(tn_id, entry_id).await?;

	authorize_granter(app, tn_id, &entry, requester).await?;

	app.store_adapter.list_grants(tn_id, entry_id).await
}

async fn authorize_granter(app: &App, tn_id: TnId, entry: &Entry, user: UserId) -> EkResult<()> {
	if entry.owner == user {
		return Ok(());
	}
	match app.store_adapter.read_grant(tn_id, entry.entry_id, user).await? {
		Some(grant)
			if grant.level == AccessLevel::Manage && !grant.is_expired(Timestamp::now()) =>
		{
			Ok(())
		}
		_ => {
			warn!(%tn_id, entry = %entry.entry_id, %user, "Grant management denied");
			Err(Error::PermissionDenied)
		}
	}
}

// vim: ts=4
