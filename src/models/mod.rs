pub mod task;
pub mod user;

pub use task::{Task, TaskCreate, TaskQuery, TaskUpdate};
pub use user::{TokenResponse, User, UserCreate, UserLogin, UserResponse};

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision `TIMESTAMPTZ` stores (microseconds), so a
/// freshly built row serializes the same as it does after a round trip.
pub(crate) fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
