pub mod error;
pub mod handlers;
pub mod routes;
pub mod visitor_extractor;

pub use error::*;
pub use handlers::*;
pub use routes::*;
pub use visitor_extractor::*;
