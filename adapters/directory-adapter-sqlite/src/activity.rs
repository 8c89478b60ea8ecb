//! Activity queries
//!
//! Activities join their course row so the view carries the display names
//! the aggregator orders by.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::inspect;
use edukit::directory_adapter::ActivityView;
use edukit::prelude::*;

fn map_activity(row: &SqliteRow) -> EkResult<ActivityView> {
	Ok(ActivityView {
		activity_id: ActivityId(row.get("activity_id")),
		course_id: CourseId(row.get("course_id")),
		feature: row.get::<String, _>("feature").into(),
		name: row.get::<String, _>("name").into(),
		course_name: row.get::<String, _>("course_name").into(),
		group_mode: GroupMode::from_i64(row.get("group_mode")).ok_or(Error::DbError)?,
	})
}

pub(crate) async fn of_feature(
	db: &SqlitePool,
	tn_id: TnId,
	feature: &str,
) -> EkResult<Vec<ActivityView>> {
	let rows = sqlx::query(
		"SELECT a.activity_id, a.course_id, a.feature, a.name, c.name AS course_name, a.group_mode \
		 FROM activities a \
		 JOIN courses c ON c.tn_id = a.tn_id AND c.course_id = a.course_id \
		 WHERE a.tn_id = ? AND a.feature = ? \
		 ORDER BY c.name, a.name",
	)
	.bind(tn_id.0)
	.bind(feature)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	rows.iter().map(map_activity).collect()
}

pub(crate) async fn read(
	db: &SqlitePool,
	tn_id: TnId,
	activity: ActivityId,
) -> EkResult<ActivityView> {
	let row = sqlx::query(
		"SELECT a.activity_id, a.course_id, a.feature, a.name, c.name AS course_name, a.group_mode \
		 FROM activities a \
		 JOIN courses c ON c.tn_id = a.tn_id AND c.course_id = a.course_id \
		 WHERE a.tn_id = ? AND a.activity_id = ?",
	)
	.bind(tn_id.0)
	.bind(activity.0)
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	match row {
		Some(row) => map_activity(&row),
		None => Err(Error::NotFound),
	}
}

pub(crate) async fn seed(
	db: &SqlitePool,
	tn_id: TnId,
	activity: ActivityId,
	course: CourseId,
	feature: &str,
	name: &str,
	group_mode: GroupMode,
) -> EkResult<()> {
	sqlx::query(
		"INSERT OR REPLACE INTO activities (tn_id, activity_id, course_id, feature, name, group_mode) \
		 VALUES (?, ?, ?, ?, ?, ?)",
	)
	.bind(tn_id.0)
	.bind(activity.0)
	.bind(course.0)
	.bind(feature)
	.bind(name)
	.bind(group_mode.as_i64())
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}
