//! Enrollment, group, and capability queries

use sqlx::{Row, SqlitePool};
use std::collections::HashSet;

use crate::{inspect, scope_parts};
use edukit::directory_adapter::{Capability, CapabilityScope};
use edukit::prelude::*;

pub(crate) async fn is_enrolled(
	db: &SqlitePool,
	tn_id: TnId,
	user: UserId,
	course: CourseId,
) -> EkResult<bool> {
	let row = sqlx::query(
		"SELECT 1 FROM enrolments WHERE tn_id = ? AND course_id = ? AND user_id = ?",
	)
	.bind(tn_id.0)
	.bind(course.0)
	.bind(user.0)
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(row.is_some())
}

pub(crate) async fn enrolled_users(
	db: &SqlitePool,
	tn_id: TnId,
	course: CourseId,
) -> EkResult<HashSet<UserId>> {
	let rows = sqlx::query("SELECT user_id FROM enrolments WHERE tn_id = ? AND course_id = ?")
		.bind(tn_id.0)
		.bind(course.0)
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(rows.iter().map(|row| UserId(row.get("user_id"))).collect())
}

pub(crate) async fn groups_of(
	db: &SqlitePool,
	tn_id: TnId,
	user: UserId,
	course: CourseId,
) -> EkResult<HashSet<GroupId>> {
	let rows = sqlx::query(
		"SELECT gm.group_id FROM group_members gm \
		 JOIN course_groups g ON g.tn_id = gm.tn_id AND g.group_id = gm.group_id \
		 WHERE gm.tn_id = ? AND gm.user_id = ? AND g.course_id = ?",
	)
	.bind(tn_id.0)
	.bind(user.0)
	.bind(course.0)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(rows.iter().map(|row| GroupId(row.get("group_id"))).collect())
}

pub(crate) async fn group_members(
	db: &SqlitePool,
	tn_id: TnId,
	group: GroupId,
) -> EkResult<HashSet<UserId>> {
	let rows = sqlx::query("SELECT user_id FROM group_members WHERE tn_id = ? AND group_id = ?")
		.bind(tn_id.0)
		.bind(group.0)
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(rows.iter().map(|row| UserId(row.get("user_id"))).collect())
}

pub(crate) async fn has_capability(
	db: &SqlitePool,
	tn_id: TnId,
	user: UserId,
	capability: Capability,
	scope: CapabilityScope,
) -> EkResult<bool> {
	let (scope_type, scope_id) = scope_parts(scope);
	let row = sqlx::query(
		"SELECT 1 FROM capability_grants \
		 WHERE tn_id = ? AND user_id = ? AND capability = ? AND scope_type = ? AND scope_id = ?",
	)
	.bind(tn_id.0)
	.bind(user.0)
	.bind(capability.as_str())
	.bind(scope_type)
	.bind(scope_id)
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(row.is_some())
}

// Seed helpers
//**************
pub(crate) async fn seed(
	db: &SqlitePool,
	tn_id: TnId,
	course: CourseId,
	name: &str,
) -> EkResult<()> {
	sqlx::query("INSERT OR REPLACE INTO courses (tn_id, course_id, name) VALUES (?, ?, ?)")
		.bind(tn_id.0)
		.bind(course.0)
		.bind(name)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn seed_enrolment(
	db: &SqlitePool,
	tn_id: TnId,
	course: CourseId,
	user: UserId,
) -> EkResult<()> {
	sqlx::query("INSERT OR IGNORE INTO enrolments (tn_id, course_id, user_id) VALUES (?, ?, ?)")
		.bind(tn_id.0)
		.bind(course.0)
		.bind(user.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn seed_group(
	db: &SqlitePool,
	tn_id: TnId,
	group: GroupId,
	course: CourseId,
	name: &str,
) -> EkResult<()> {
	sqlx::query(
		"INSERT OR REPLACE INTO course_groups (tn_id, group_id, course_id, name) VALUES (?, ?, ?, ?)",
	)
	.bind(tn_id.0)
	.bind(group.0)
	.bind(course.0)
	.bind(name)
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn seed_group_member(
	db: &SqlitePool,
	tn_id: TnId,
	group: GroupId,
	user: UserId,
) -> EkResult<()> {
	sqlx::query("INSERT OR IGNORE INTO group_members (tn_id, group_id, user_id) VALUES (?, ?, ?)")
		.bind(tn_id.0)
		.bind(group.0)
		.bind(user.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn seed_capability(
	db: &SqlitePool,
	tn_id: TnId,
	user: UserId,
	capability: Capability,
	scope: CapabilityScope,
) -> EkResult<()> {
	let (scope_type, scope_id) = scope_parts(scope);
	sqlx::query(
		"INSERT OR IGNORE INTO capability_grants (tn_id, user_id, capability, scope_type, scope_id) \
		 VALUES (?, ?, ?, ?, ?)",
	)
	.bind(tn_id.0)
	.bind(user.0)
	.bind(capability.as_str())
	.bind(scope_type)
	.bind(scope_id)
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}
