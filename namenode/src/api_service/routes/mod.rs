pub mod auth;
pub mod datanode;
pub mod monitoring;
pub mod namespace;
