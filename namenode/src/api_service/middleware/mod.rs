pub mod auth;
pub mod namespace_path;
