//! The `services` module is the query and projection layer over the snippet
//! store. Handlers call into it with the caller's user id; every snippet
//! query it issues is scoped to that owner.
//!
//! Functions that take a generic `C: ConnectionTrait` can run either on the
//! pool or inside a transaction opened by the caller.

pub mod admin_service;
pub mod snippet_service;
pub mod tag_service;
pub mod user_service;

pub use admin_service::*;
pub use snippet_service::*;
pub use tag_service::*;
pub use user_service::*;
