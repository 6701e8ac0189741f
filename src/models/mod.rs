pub mod task;
pub mod user;

use chrono::{DateTime, SubsecRound, Utc};

pub use task::{
    CreateTaskRequest, Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus, UpdateTaskRequest,
};
pub use user::{User, UserProfile};

/// Current time at the precision Postgres stores (microseconds), so a value
/// read back from either store backend compares equal to the one written.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
