use std::{error::Error, fmt::Display};

const MAX_BLOCK_ID_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq)]
pub struct InvalidBlockId(pub String);

impl Display for InvalidBlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid block id : {}", self.0)
    }
}
impl Error for InvalidBlockId {}

/// Block ids are used as file names, so only a portable subset is accepted.
/// Anything that could escape the storage root (separators, `..`, hidden names) is rejected.
pub fn validate_block_id(block_id: &str) -> Result<&str, InvalidBlockId> {
    if block_id.is_empty() || block_id.len() > MAX_BLOCK_ID_LEN {
        return Err(InvalidBlockId(format!(
            "length must be between 1 and {MAX_BLOCK_ID_LEN}"
        )));
    }
    if block_id.starts_with('.') {
        return Err(InvalidBlockId(format!("{block_id} starts with '.'")));
    }
    if let Some(c) = block_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(InvalidBlockId(format!("{block_id} contains {c:?}")));
    }
    Ok(block_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_client_generated_ids() {
        assert!(validate_block_id("docs_a.txt__0__9f1c2b7e").is_ok());
        assert!(validate_block_id("block-1.bin").is_ok());
    }

    #[test]
    fn rejects_traversal_and_separators() {
        for id in ["", "..", "../etc/passwd", "a/b", "a\\b", ".hidden", "a b", "staged/x"] {
            assert!(validate_block_id(id).is_err(), "{id} should be rejected");
        }
        assert!(validate_block_id(&"x".repeat(256)).is_err());
    }
}
