pub mod delta;
pub mod session_manager;

pub use delta::{compute_deltas, needs_submission_write};
pub use session_manager::{ArtworkView, FlushReport, SessionError, VoteSessionManager};
