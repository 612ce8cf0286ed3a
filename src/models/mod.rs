//! Wire types shared with the Gather platform API.

pub mod enrollment;
pub mod event;
pub mod user;

pub use enrollment::{Enrollment, EnrollmentStatus};
pub use event::{Event, EventDraft, EventFilter};
pub use user::{Role, UserProfile};
