use rocket::http::uri::{Segments, fmt::Path};
use rocket::request::FromSegments;

use crate::namenode_state::path::normalize;

/// Trailing route segments joined back into a normalized namespace path
#[derive(Debug, Clone, PartialEq)]
pub struct NamespacePath(pub String);

impl<'r> FromSegments<'r> for NamespacePath {
    type Error = std::convert::Infallible;

    fn from_segments(segments: Segments<'r, Path>) -> Result<Self, Self::Error> {
        let joined = segments.collect::<Vec<&str>>().join("/");
        Ok(NamespacePath(normalize(&joined)))
    }
}
