pub mod admin_routes;
pub mod snippet_routes;
pub mod tag_routes;
