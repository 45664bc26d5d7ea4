//! SeaORM entities mapping the snippet store tables.
//!
//! `snippet_tag` is the join table behind the many-to-many relation between
//! snippets and tags; both sides cascade on delete.

pub mod snippet;
pub mod snippet_tag;
pub mod tag;
pub mod user;
