//! Include/exclude rules and the path collector.

use crate::config::ExportConfig;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct FilterRules {
    pub include_dirs: Vec<PathBuf>,
    pub include_exts: HashSet<String>,
    pub exclude_dirs: HashSet<String>,
    pub exclude_files: HashSet<String>,
}

impl FilterRules {
    pub fn from_config(root: &Path, config: &ExportConfig) -> Self {
        Self {
            include_dirs: config.include.dirs.iter().map(|d| root.join(d)).collect(),
            include_exts: config.include.extensions.iter().cloned().collect(),
            exclude_dirs: config.exclude.dirs.iter().cloned().collect(),
            exclude_files: config.exclude.files.iter().cloned().collect(),
        }
    }

    /// Name or any root-relative segment hits an exclude rule.
    pub fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let name_excluded = path
            .file_name()
            .is_some_and(|name| self.exclude_files.contains(name.to_string_lossy().as_ref()));
        if name_excluded {
            return true;
        }
        relative_components(root, path)
            .iter()
            .any(|part| self.exclude_dirs.contains(part))
    }

    pub fn has_included_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .is_some_and(|suffix| self.include_exts.contains(&suffix))
    }

    pub fn accepts(&self, root: &Path, path: &Path) -> bool {
        self.has_included_extension(path) && !self.is_excluded(root, path)
    }
}

/// Root-relative path segments. Paths outside `root` keep their own normal
/// segments.
pub fn relative_components(root: &Path, path: &Path) -> Vec<String> {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Root-relative path joined with `/` on every platform.
pub fn relative_path(root: &Path, path: &Path) -> String {
    relative_components(root, path).join("/")
}

/// Walk every include root and return the eligible files, ordered
/// case-insensitively by their root-relative path.
pub fn collect_paths(root: &Path, rules: &FilterRules) -> Vec<PathBuf> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut paths: Vec<PathBuf> = Vec::new();

    for include in &rules.include_dirs {
        if !include.is_dir() {
            log::debug!("Include root {} not found, skipping", include.display());
            continue;
        }

        let walker = WalkDir::new(include)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !rules
                        .exclude_dirs
                        .contains(entry.file_name().to_string_lossy().as_ref())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            // Follows symlinks, so links to regular files are kept.
            if !entry.path().is_file() || !rules.accepts(root, entry.path()) {
                continue;
            }
            if seen.insert(entry.path().to_path_buf()) {
                paths.push(entry.into_path());
            }
        }
    }

    paths.sort_by_cached_key(|path| {
        let rel = relative_path(root, path);
        (rel.to_lowercase(), rel)
    });
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn rules(dirs: &[&str], exts: &[&str], ex_dirs: &[&str], ex_files: &[&str]) -> FilterRules {
        FilterRules {
            include_dirs: dirs.iter().map(PathBuf::from).collect(),
            include_exts: exts.iter().map(|s| s.to_string()).collect(),
            exclude_dirs: ex_dirs.iter().map(|s| s.to_string()).collect(),
            exclude_files: ex_files.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn rels(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| relative_path(root, p)).collect()
    }

    #[test]
    fn excluded_dir_matches_any_segment() {
        let r = rules(&[], &[".js"], &["node_modules"], &[]);
        let root = Path::new("/repo");
        assert!(r.is_excluded(root, Path::new("/repo/node_modules/a.js")));
        assert!(r.is_excluded(root, Path::new("/repo/web/app/node_modules/lib/a.js")));
        assert!(!r.is_excluded(root, Path::new("/repo/web/app/a.js")));
    }

    #[test]
    fn exclusion_ignores_segments_above_root() {
        let r = rules(&[], &[".py"], &["build"], &[]);
        assert!(!r.is_excluded(Path::new("/home/build/repo"), Path::new("/home/build/repo/a.py")));
    }

    #[test]
    fn extension_match_uses_last_suffix() {
        let r = rules(&[], &[".gz", ".py"], &[], &[]);
        assert!(r.has_included_extension(Path::new("a.tar.gz")));
        assert!(r.has_included_extension(Path::new("pkg/mod.py")));
        assert!(!r.has_included_extension(Path::new("mod.PY")));
        assert!(!r.has_included_extension(Path::new(".py")));
        assert!(!r.has_included_extension(Path::new("Makefile")));
    }

    #[test]
    fn collects_sorted_case_insensitively() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        for rel in ["b.py", "A.py", "sub/c.py", "Sub2/d.py", "notes.md"] {
            touch(root, rel);
        }
        let mut r = rules(&[], &[".py"], &[], &[]);
        r.include_dirs = vec![root.to_path_buf()];

        let paths = collect_paths(root, &r);
        assert_eq!(rels(root, &paths), vec!["A.py", "b.py", "sub/c.py", "Sub2/d.py"]);
    }

    #[test]
    fn skips_missing_roots_and_dedups_overlaps() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(root, "src/lib.py");
        touch(root, "src/node_modules/dep.py");
        touch(root, "src/skip_me.py");
        let r = FilterRules {
            include_dirs: vec![root.join("src"), root.join("."), root.join("missing")],
            include_exts: [".py".to_string()].into_iter().collect(),
            exclude_dirs: ["node_modules".to_string()].into_iter().collect(),
            exclude_files: ["skip_me.py".to_string()].into_iter().collect(),
        };

        let paths = collect_paths(root, &r);
        assert_eq!(rels(root, &paths), vec!["src/lib.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn file_symlinks_are_kept_and_dir_symlinks_not_followed() {
        use std::os::unix::fs::symlink;

        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(root, "real/a.py");
        symlink(root.join("real/a.py"), root.join("link.py")).unwrap();
        symlink(root.join("real"), root.join("alias")).unwrap();
        let mut r = rules(&[], &[".py"], &[], &[]);
        r.include_dirs = vec![root.to_path_buf()];

        let paths = collect_paths(root, &r);
        assert_eq!(rels(root, &paths), vec!["link.py", "real/a.py"]);
    }

    #[test]
    fn excluded_include_root_itself_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(root, "vendor/x.py");
        let r = FilterRules {
            include_dirs: vec![root.join("vendor")],
            include_exts: [".py".to_string()].into_iter().collect(),
            exclude_dirs: ["vendor".to_string()].into_iter().collect(),
            exclude_files: HashSet::new(),
        };
        assert!(collect_paths(root, &r).is_empty());
    }
}
