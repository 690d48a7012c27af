//! Canonical form of namespace paths: a leading `/`, no empty segments and no trailing `/`.
//! Root is the only path equal to `/`.

pub const ROOT: &str = "/";

pub fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

pub fn is_root(path: &str) -> bool {
    path == ROOT
}

/// Strict ancestors of a normalized path, outermost first, root excluded.
pub fn ancestors(path: &str) -> Vec<String> {
    let mut ancestors = vec![];
    let mut end = 0;
    while let Some(offset) = path[end + 1..].find('/') {
        end += 1 + offset;
        ancestors.push(path[..end].to_string());
    }
    ancestors
}

/// Prefix every strict descendant of a normalized directory path starts with.
pub fn descendant_prefix(dir: &str) -> String {
    if is_root(dir) {
        ROOT.to_string()
    } else {
        format!("{dir}/")
    }
}

/// Name of `candidate` when it is an immediate child of `dir`.
pub fn child_name<'a>(dir: &str, candidate: &'a str) -> Option<&'a str> {
    let rest = candidate.strip_prefix(&descendant_prefix(dir))?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(rest)
}

pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalent_spellings_normalize_identically() {
        let canonical = normalize("/a/b");
        assert_eq!(canonical, "/a/b");
        for p in ["a/b", "/a/b/", "/a//b", "//a///b//"] {
            assert_eq!(normalize(p), canonical);
        }
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("///"), "/");
    }

    #[test]
    fn normalize_is_idempotent() {
        for p in ["", "/", "a", "/a/b/", "x//y/z", "/docs/a.txt"] {
            let once = normalize(p);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn ancestors_exclude_root_and_self() {
        assert_eq!(ancestors("/a/b/c.txt"), vec!["/a", "/a/b"]);
        assert!(ancestors("/top.txt").is_empty());
        assert!(ancestors("/").is_empty());
    }

    #[test]
    fn child_name_only_matches_one_segment_down() {
        assert_eq!(child_name("/docs", "/docs/a.txt"), Some("a.txt"));
        assert_eq!(child_name("/docs", "/docs/sub/a.txt"), None);
        assert_eq!(child_name("/docs", "/docsx/a.txt"), None);
        assert_eq!(child_name("/", "/docs"), Some("docs"));
        assert_eq!(child_name("/", "/docs/a"), None);
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name("/docs/a.txt"), "a.txt");
        assert_eq!(file_name("/a"), "a");
    }
}
