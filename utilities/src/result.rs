use std::error::Error;

/// Workspace wide result type, errors are boxed so they can cross task boundaries
pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;
