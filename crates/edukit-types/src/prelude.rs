pub use crate::error::{EkResult, Error};
pub use crate::types::{
	AccessLevel, ActivityId, CohortId, CourseId, EntryId, FailPolicy, GroupId, GroupMode,
	Timestamp, TnId, UserId,
};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
