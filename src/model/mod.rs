pub mod artwork;
pub mod common;
pub mod session;
pub mod submission;
pub mod visitor;

pub use artwork::*;
pub use common::*;
pub use session::*;
pub use submission::*;
pub use visitor::*;
