//! Common types used throughout the Edukit platform.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

// TnId //
//******//
/// Tenant identifier. Every adapter call is scoped to a tenant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TnId(pub u32);

impl std::fmt::Display for TnId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for TnId {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_u32(self.0)
	}
}

impl<'de> Deserialize<'de> for TnId {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(TnId(u32::deserialize(deserializer)?))
	}
}

// Timestamp //
//***********//
/// Unix timestamp in seconds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Self {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_secs() as i64)
	}

	pub fn add_seconds(self, secs: i64) -> Self {
		Timestamp(self.0 + secs)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

// Entity identifiers //
//********************//
macro_rules! id_type {
	($(#[$doc:meta])* $name:ident) => {
		$(#[$doc])*
		#[derive(
			Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
			Serialize, Deserialize,
		)]
		#[serde(transparent)]
		pub struct $name(pub i64);

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(f, "{}", self.0)
			}
		}
	};
}

id_type!(
	/// User identifier, owned by the external identity system.
	UserId
);
id_type!(
	/// Cohort identifier. Cohorts gate feature areas, independent of course groups.
	CohortId
);
id_type!(CourseId);
id_type!(
	/// Course-scoped group identifier.
	GroupId
);
id_type!(
	/// A course-scoped unit that owns entries and carries a group mode.
	ActivityId
);
id_type!(EntryId);

// AccessLevel //
//*************//
/// Shared-access permission tier, strictly ordered `View < Edit < Manage`.
///
/// Granted via sharing, independent of ownership; an entry's owner always
/// holds `Manage` regardless of grant rows.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
	View,
	Edit,
	Manage,
}

impl AccessLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			AccessLevel::View => "view",
			AccessLevel::Edit => "edit",
			AccessLevel::Manage => "manage",
		}
	}

	/// Parse a stored level. Unknown input is rejected, never coerced.
	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"view" => Some(AccessLevel::View),
			"edit" => Some(AccessLevel::Edit),
			"manage" => Some(AccessLevel::Manage),
			_ => None,
		}
	}
}

impl std::fmt::Display for AccessLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

// GroupMode //
//***********//
/// Group visibility mode of an activity.
///
/// `NoGroups`: no grouping. `Visible`: grouped but all can see all.
/// `Separate`: grouped and isolated unless overridden.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
	#[default]
	NoGroups,
	Visible,
	Separate,
}

impl GroupMode {
	pub fn as_i64(self) -> i64 {
		match self {
			GroupMode::NoGroups => 0,
			GroupMode::Visible => 1,
			GroupMode::Separate => 2,
		}
	}

	pub fn from_i64(v: i64) -> Option<Self> {
		match v {
			0 => Some(GroupMode::NoGroups),
			1 => Some(GroupMode::Visible),
			2 => Some(GroupMode::Separate),
			_ => None,
		}
	}
}

// FailPolicy //
//************//
/// What a gate resolves to when its backing store is unreachable.
///
/// The cohort gate historically fails open (availability over least
/// privilege); deployments wanting stricter behavior select `Closed`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FailPolicy {
	#[default]
	Open,
	Closed,
}

impl FailPolicy {
	/// The gate decision this policy yields on upstream failure.
	pub fn allows(self) -> bool {
		matches!(self, FailPolicy::Open)
	}
}


// vim: ts=4
