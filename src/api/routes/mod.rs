//! Route handlers for the REST API
//!
//! - [`harvest`]: run a batch for one page
//! - [`system`]: health and OpenAPI

mod harvest;
mod system;

pub use harvest::*;
pub use system::*;
