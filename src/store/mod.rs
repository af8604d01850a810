pub mod http;
pub mod memory;
pub mod postgres;
pub mod session_cache;
pub mod traits;

pub use http::*;
pub use memory::*;
pub use postgres::*;
pub use session_cache::*;
pub use traits::*;
