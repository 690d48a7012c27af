use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;

use crate::{
    error::NamenodeError,
    namenode_state::{
        file_details::{DirectoryEntry, FileEntry, FileRegistration, ListingEntry},
        path::{self, child_name, descendant_prefix, is_root, normalize},
    },
};

#[derive(Default, Debug)]
struct OwnerNamespace {
    directories: BTreeMap<String, DirectoryEntry>,
    files: BTreeMap<String, FileEntry>,
}

impl OwnerNamespace {
    fn contains(&self, path: &str) -> bool {
        self.directories.contains_key(path) || self.files.contains_key(path)
    }
    fn has_descendants(&self, dir: &str) -> bool {
        let prefix = descendant_prefix(dir);
        let starts_with_prefix =
            |map_key: Option<&String>| map_key.is_some_and(|k| k.starts_with(&prefix));
        starts_with_prefix(self.directories.range(prefix.clone()..).next().map(|(k, _)| k))
            || starts_with_prefix(self.files.range(prefix.clone()..).next().map(|(k, _)| k))
    }
}

/// Files and directories of every owner. Holds metadata only, bytes live on the datanodes.
#[derive(Default, Debug)]
pub struct Namespace {
    owners: HashMap<String, OwnerNamespace>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamespaceStats {
    pub files: usize,
    pub directories: usize,
    pub blocks: usize,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }
    fn owner_mut(&mut self, owner: &str) -> &mut OwnerNamespace {
        self.owners.entry(owner.to_owned()).or_default()
    }

    pub fn mkdir(&mut self, owner: &str, path: &str) -> Result<DirectoryEntry, NamenodeError> {
        let path = normalize(path);
        let namespace = self.owner_mut(owner);
        if is_root(&path) || namespace.contains(&path) {
            return Err(NamenodeError::AlreadyExists(path));
        }
        let entry = DirectoryEntry {
            path: path.clone(),
            owner: owner.to_owned(),
            created_at: Utc::now(),
        };
        namespace.directories.insert(path, entry.clone());
        Ok(entry)
    }

    pub fn rmdir(&mut self, owner: &str, path: &str) -> Result<(), NamenodeError> {
        let path = normalize(path);
        let namespace = self
            .owners
            .get_mut(owner)
            .filter(|namespace| namespace.directories.contains_key(&path))
            .ok_or_else(|| NamenodeError::NotFound(path.clone()))?;
        if namespace.has_descendants(&path) {
            return Err(NamenodeError::NotEmpty(path));
        }
        namespace.directories.remove(&path);
        Ok(())
    }

    /// `active_datanodes` is the live set every block must be placed on.
    /// Nothing is mutated unless every check passes.
    pub fn register_file(
        &mut self,
        owner: &str,
        registration: FileRegistration,
        active_datanodes: &HashSet<String>,
    ) -> Result<FileEntry, NamenodeError> {
        let path = normalize(&registration.filename);
        if is_root(&path) {
            return Err(NamenodeError::InvalidRequest(
                "root can't be registered as a file".to_string(),
            ));
        }
        let namespace = self.owner_mut(owner);
        if namespace.contains(&path) {
            return Err(NamenodeError::AlreadyExists(path));
        }
        let ancestors = path::ancestors(&path);
        if let Some(file_ancestor) = ancestors.iter().find(|a| namespace.files.contains_key(*a)) {
            return Err(NamenodeError::InvalidRequest(format!(
                "{file_ancestor} is a file and can't contain {path}"
            )));
        }
        if registration.block_size == 0 && !registration.blocks.is_empty() {
            return Err(NamenodeError::InvalidRequest(
                "block_size must be positive".to_string(),
            ));
        }
        let mut blocks = registration.blocks;
        blocks.sort_by_key(|block| block.index);
        if let Some((position, block)) = blocks
            .iter()
            .enumerate()
            .find(|(position, block)| block.index != *position as u64)
        {
            return Err(NamenodeError::InvalidRequest(format!(
                "block indices must be contiguous from 0, expected {position} found {} ({})",
                block.index, block.block_id
            )));
        }
        let misplaced: Vec<String> = blocks
            .iter()
            .filter(|block| !active_datanodes.contains(&block.datanode))
            .map(|block| block.block_id.clone())
            .collect();
        if !misplaced.is_empty() {
            return Err(NamenodeError::InvalidPlacement(misplaced));
        }

        let created_at = Utc::now();
        for ancestor in ancestors {
            namespace
                .directories
                .entry(ancestor.clone())
                .or_insert_with(|| DirectoryEntry {
                    path: ancestor,
                    owner: owner.to_owned(),
                    created_at,
                });
        }
        let entry = FileEntry {
            path: path.clone(),
            owner: owner.to_owned(),
            size: registration.size,
            block_size: registration.block_size,
            blocks,
            created_at,
        };
        namespace.files.insert(path, entry.clone());
        Ok(entry)
    }

    pub fn get_file(&self, owner: &str, path: &str) -> Result<FileEntry, NamenodeError> {
        let path = normalize(path);
        self.owners
            .get(owner)
            .and_then(|namespace| namespace.files.get(&path))
            .cloned()
            .ok_or(NamenodeError::NotFound(path))
    }

    /// Returns how many blocks the removed file leaves orphaned on the datanodes.
    pub fn remove_file(&mut self, owner: &str, path: &str) -> Result<usize, NamenodeError> {
        let path = normalize(path);
        self.owners
            .get_mut(owner)
            .and_then(|namespace| namespace.files.remove(&path))
            .map(|entry| entry.blocks.len())
            .ok_or(NamenodeError::NotFound(path))
    }

    /// Immediate children of `path`, directories first, each group ordered by name.
    pub fn list(&self, owner: &str, path: &str) -> Result<Vec<ListingEntry>, NamenodeError> {
        let path = normalize(path);
        let namespace = self.owners.get(owner);
        let known_directory =
            namespace.is_some_and(|namespace| namespace.directories.contains_key(&path));
        if !is_root(&path) && !known_directory {
            return Err(NamenodeError::NotFound(path));
        }
        let Some(namespace) = namespace else {
            return Ok(vec![]);
        };
        let prefix = descendant_prefix(&path);
        let directories = namespace
            .directories
            .range(prefix.clone()..)
            .take_while(|(candidate, _)| candidate.starts_with(&prefix))
            .filter_map(|(candidate, entry)| {
                child_name(&path, candidate).map(|name| ListingEntry::Directory {
                    name: name.to_string(),
                    created_at: entry.created_at,
                })
            });
        let files = namespace
            .files
            .range(prefix.clone()..)
            .take_while(|(candidate, _)| candidate.starts_with(&prefix))
            .filter_map(|(candidate, entry)| {
                child_name(&path, candidate).map(|name| ListingEntry::File {
                    name: name.to_string(),
                    size: entry.size,
                    blocks: entry.blocks.len(),
                    block_size: entry.block_size,
                    created_at: entry.created_at,
                })
            });
        Ok(directories.chain(files).collect())
    }

    pub fn owner_stats(&self, owner: &str) -> NamespaceStats {
        self.owners
            .get(owner)
            .map(|namespace| NamespaceStats {
                files: namespace.files.len(),
                directories: namespace.directories.len(),
                blocks: namespace.files.values().map(|f| f.blocks.len()).sum(),
            })
            .unwrap_or_default()
    }

    pub fn total_stats(&self) -> NamespaceStats {
        self.owners
            .keys()
            .map(|owner| self.owner_stats(owner))
            .fold(NamespaceStats::default(), |total, stats| NamespaceStats {
                files: total.files + stats.files,
                directories: total.directories + stats.directories,
                blocks: total.blocks + stats.blocks,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namenode_state::file_details::BlockDescriptor;

    fn active(urls: &[&str]) -> HashSet<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    fn registration(filename: &str, placements: &[&str]) -> FileRegistration {
        FileRegistration {
            filename: filename.to_string(),
            size: placements.len() as u64 * 4,
            block_size: 4,
            blocks: placements
                .iter()
                .enumerate()
                .map(|(index, datanode)| BlockDescriptor {
                    index: index as u64,
                    block_id: format!("{}__{index}", filename.replace('/', "_")),
                    datanode: datanode.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn mkdir_rejects_existing_paths_of_either_kind() {
        let mut ns = Namespace::new();
        ns.mkdir("alice", "/docs").unwrap();
        assert_eq!(
            ns.mkdir("alice", "docs/"),
            Err(NamenodeError::AlreadyExists("/docs".to_string()))
        );
        ns.register_file("alice", registration("/notes.txt", &["n1"]), &active(&["n1"]))
            .unwrap();
        assert!(matches!(
            ns.mkdir("alice", "/notes.txt"),
            Err(NamenodeError::AlreadyExists(_))
        ));
        assert!(matches!(ns.mkdir("alice", "/"), Err(NamenodeError::AlreadyExists(_))));
        // same path for another owner is a different entry
        assert!(ns.mkdir("bob", "/docs").is_ok());
    }

    #[test]
    fn mkdir_does_not_create_parents() {
        let mut ns = Namespace::new();
        ns.mkdir("alice", "/a/b/c").unwrap();
        assert_eq!(ns.owner_stats("alice").directories, 1);
        assert!(matches!(ns.list("alice", "/a"), Err(NamenodeError::NotFound(_))));
    }

    #[test]
    fn register_file_materializes_ancestors_and_sorts_blocks() {
        let mut ns = Namespace::new();
        let mut reg = registration("x/y/z.bin", &["n1", "n2", "n1"]);
        reg.blocks.reverse();
        let entry = ns.register_file("alice", reg, &active(&["n1", "n2"])).unwrap();
        assert_eq!(entry.path, "/x/y/z.bin");
        let indices: Vec<u64> = entry.blocks.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(ns.owner_stats("alice").directories, 2);
        let listing = ns.list("alice", "/x").unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name(), "y");
        assert!(matches!(listing[0], ListingEntry::Directory { .. }));
    }

    #[test]
    fn register_file_rejects_duplicates_and_directories() {
        let mut ns = Namespace::new();
        let nodes = active(&["n1"]);
        ns.register_file("alice", registration("/a.txt", &["n1"]), &nodes).unwrap();
        assert_eq!(
            ns.register_file("alice", registration("a.txt/", &["n1"]), &nodes),
            Err(NamenodeError::AlreadyExists("/a.txt".to_string()))
        );
        ns.mkdir("alice", "/dir").unwrap();
        assert!(matches!(
            ns.register_file("alice", registration("/dir", &["n1"]), &nodes),
            Err(NamenodeError::AlreadyExists(_))
        ));
        assert!(matches!(
            ns.register_file("alice", registration("/a.txt/inner", &["n1"]), &nodes),
            Err(NamenodeError::InvalidRequest(_))
        ));
    }

    #[test]
    fn stale_placements_are_rejected_without_side_effects() {
        let mut ns = Namespace::new();
        let result = ns.register_file(
            "alice",
            registration("/deep/file.bin", &["n1", "ghost", "n1", "ghost"]),
            &active(&["n1"]),
        );
        assert_eq!(
            result,
            Err(NamenodeError::InvalidPlacement(vec![
                "_deep_file.bin__1".to_string(),
                "_deep_file.bin__3".to_string()
            ]))
        );
        assert_eq!(ns.owner_stats("alice"), NamespaceStats::default());
    }

    #[test]
    fn non_contiguous_indices_are_rejected() {
        let mut ns = Namespace::new();
        let mut reg = registration("/gap.bin", &["n1", "n1"]);
        reg.blocks[1].index = 5;
        assert!(matches!(
            ns.register_file("alice", reg, &active(&["n1"])),
            Err(NamenodeError::InvalidRequest(_))
        ));
    }

    #[test]
    fn rmdir_guards_non_empty_directories() {
        let mut ns = Namespace::new();
        ns.mkdir("alice", "/docs").unwrap();
        ns.mkdir("alice", "/docsx").unwrap();
        ns.mkdir("alice", "/docs/sub").unwrap();
        assert_eq!(
            ns.rmdir("alice", "/docs"),
            Err(NamenodeError::NotEmpty("/docs".to_string()))
        );
        // a sibling sharing the name prefix is not a descendant
        ns.rmdir("alice", "/docs/sub").unwrap();
        ns.rmdir("alice", "/docs/").unwrap();
        assert_eq!(
            ns.rmdir("alice", "/docs"),
            Err(NamenodeError::NotFound("/docs".to_string()))
        );
        assert!(matches!(ns.rmdir("alice", "/docsx/file"), Err(NamenodeError::NotFound(_))));
        assert!(matches!(ns.rmdir("bob", "/docsx"), Err(NamenodeError::NotFound(_))));
    }

    #[test]
    fn rmdir_sees_files_below_directory() {
        let mut ns = Namespace::new();
        ns.register_file("alice", registration("/a/b/c.txt", &["n1"]), &active(&["n1"]))
            .unwrap();
        assert!(matches!(ns.rmdir("alice", "/a"), Err(NamenodeError::NotEmpty(_))));
        assert!(matches!(ns.rmdir("alice", "/a/b"), Err(NamenodeError::NotEmpty(_))));
        assert_eq!(ns.remove_file("alice", "a//b/c.txt"), Ok(1));
        ns.rmdir("alice", "/a/b").unwrap();
        ns.rmdir("alice", "/a").unwrap();
    }

    #[test]
    fn get_and_remove_report_not_found() {
        let mut ns = Namespace::new();
        assert!(matches!(ns.get_file("alice", "/nope"), Err(NamenodeError::NotFound(_))));
        assert!(matches!(ns.remove_file("alice", "/nope"), Err(NamenodeError::NotFound(_))));
        ns.mkdir("alice", "/dir").unwrap();
        assert!(matches!(ns.get_file("alice", "/dir"), Err(NamenodeError::NotFound(_))));
    }

    #[test]
    fn list_returns_immediate_children_only() {
        let mut ns = Namespace::new();
        let nodes = active(&["n1"]);
        ns.register_file("alice", registration("/top.txt", &["n1"]), &nodes).unwrap();
        ns.register_file("alice", registration("/docs/a.txt", &["n1", "n1"]), &nodes)
            .unwrap();
        ns.register_file("alice", registration("/docs/deep/b.txt", &["n1"]), &nodes)
            .unwrap();
        ns.register_file("bob", registration("/bob.txt", &["n1"]), &nodes).unwrap();

        let root: Vec<String> = ns
            .list("alice", "/")
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(root, vec!["docs", "top.txt"]);

        let docs = ns.list("alice", "docs").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name(), "deep");
        match &docs[1] {
            ListingEntry::File { name, blocks, .. } => {
                assert_eq!(name, "a.txt");
                assert_eq!(*blocks, 2);
            }
            other => panic!("expected file entry, got {other:?}"),
        }
        assert!(matches!(ns.list("alice", "/top.txt"), Err(NamenodeError::NotFound(_))));
        assert!(ns.list("carol", "/").unwrap().is_empty());
    }

    #[test]
    fn paths_are_never_both_file_and_directory() {
        let mut ns = Namespace::new();
        let nodes = active(&["n1"]);
        let _ = ns.mkdir("alice", "/p");
        let _ = ns.register_file("alice", registration("/p", &["n1"]), &nodes);
        let _ = ns.register_file("alice", registration("/q", &["n1"]), &nodes);
        let _ = ns.mkdir("alice", "/q");
        let _ = ns.register_file("alice", registration("/p/r", &["n1"]), &nodes);
        let owner = ns.owners.get("alice").unwrap();
        for path in owner.files.keys() {
            assert!(!owner.directories.contains_key(path), "{path} is both");
        }
        assert_eq!(ns.total_stats().files, 2);
    }
}
