use utilities::result::Result;

use crate::namenode::{
    models::{Listing, ListingEntry},
    service::NamenodeService,
};

pub fn render_listing(listing: &Listing, long: bool) -> String {
    if listing.items.is_empty() {
        return format!("{} is empty", listing.path);
    }
    listing
        .items
        .iter()
        .map(|item| match (item, long) {
            (ListingEntry::Directory { name, .. }, false) => format!("{name}/"),
            (ListingEntry::File { name, .. }, false) => name.clone(),
            (ListingEntry::Directory { name, created_at }, true) => {
                format!("d {:>12} {:>6} {created_at} {name}/", "-", "-")
            }
            (
                ListingEntry::File {
                    name,
                    size,
                    blocks,
                    created_at,
                    ..
                },
                true,
            ) => format!("f {size:>12} {blocks:>6} {created_at} {name}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct NamespaceHandler {
    namenode: NamenodeService,
}
impl NamespaceHandler {
    pub fn new(namenode: NamenodeService) -> Self {
        Self { namenode }
    }
    pub async fn list(&mut self, path: &str, long: bool) -> Result<String> {
        let listing = self.namenode.list(path).await?;
        Ok(render_listing(&listing, long))
    }
    pub async fn mkdir(&mut self, path: &str) -> Result<String> {
        let created = self.namenode.mkdir(path).await?;
        Ok(format!("Created directory {}", created.path))
    }
    pub async fn rmdir(&mut self, path: &str) -> Result<String> {
        let removed = self.namenode.rmdir(path).await?;
        Ok(format!("Removed directory {}", removed.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        serde_json::from_str(
            r#"{"path":"/docs","items":[
                {"type":"directory","name":"old","created_at":"2026-01-01T00:00:00Z"},
                {"type":"file","name":"a.txt","size":10,"blocks":3,"block_size":4,"created_at":"2026-01-02T00:00:00Z"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn short_listing_marks_directories() {
        assert_eq!(render_listing(&listing(), false), "old/\na.txt");
    }

    #[test]
    fn long_listing_shows_size_and_blocks() {
        let rendered = render_listing(&listing(), true);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].starts_with("d "));
        assert!(lines[1].starts_with("f "));
        assert!(lines[1].contains(" 10 "));
        assert!(lines[1].ends_with("a.txt"));
    }
}
