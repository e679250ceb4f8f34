//! Descriptive reporters built from the collected path list (`summary.txt`,
//! `tree.txt`). They never look at the packer's output.

use crate::error::{ExportError, Result};
use crate::filters::{relative_components, relative_path};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE_NAME: &str = "summary.txt";
pub const TREE_FILE_NAME: &str = "tree.txt";
pub const DEFAULT_TOP_MODULES: usize = 5;
pub const DEFAULT_TREE_DEPTH: usize = 4;

const ENTRY_POINT_NAMES: &[&str] = &["main.py", "app.py", "main.rs"];
const ENTRY_POINT_SUFFIX: &str = "_cli.py";

fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

fn is_entry_point(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .is_some_and(|name| {
            name.ends_with(ENTRY_POINT_SUFFIX) || ENTRY_POINT_NAMES.contains(&name.as_str())
        })
}

/// Extension counts, most common first; ties keep first-seen order.
fn extension_counts(paths: &[PathBuf]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for path in paths {
        let Some(ext) = path.extension() else {
            continue;
        };
        let suffix = format!(".{}", ext.to_string_lossy().to_lowercase());
        match slots.get(&suffix) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(suffix.clone(), counts.len());
                counts.push((suffix, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn render_summary(root: &Path, paths: &[PathBuf], top_n: usize) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("Project".to_string());
    lines.push(format!("- Name: {}", root_name(root)));
    lines.push(String::new());

    lines.push("Languages".to_string());
    for (ext, count) in extension_counts(paths) {
        lines.push(format!("- {ext}: {count} files"));
    }
    lines.push(String::new());

    lines.push("Entry Points".to_string());
    let entry_points: Vec<&PathBuf> = paths.iter().filter(|p| is_entry_point(p)).collect();
    if entry_points.is_empty() {
        lines.push("- (none detected)".to_string());
    } else {
        for path in entry_points {
            lines.push(format!("- {}", relative_path(root, path)));
        }
    }
    lines.push(String::new());

    let mut sized: Vec<(&PathBuf, u64)> = paths
        .iter()
        .map(|p| (p, std::fs::metadata(p).map(|m| m.len()).unwrap_or(0)))
        .collect();
    sized.sort_by(|a, b| b.1.cmp(&a.1));

    lines.push("Key Modules (by file size)".to_string());
    for (path, size) in sized.into_iter().take(top_n) {
        lines.push(format!("- {} ({size} bytes)", relative_path(root, path)));
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Directory node; a `None` child is a file. Directory keys end with `/`.
#[derive(Default)]
struct TreeDir {
    children: BTreeMap<String, Option<TreeDir>>,
}

impl TreeDir {
    fn insert(&mut self, parts: &[String]) {
        let Some((file, dirs)) = parts.split_last() else {
            return;
        };
        let mut cur = self;
        for dir in dirs {
            cur = cur
                .children
                .entry(format!("{dir}/"))
                .or_insert_with(|| Some(TreeDir::default()))
                .get_or_insert_with(TreeDir::default);
        }
        cur.children.entry(file.clone()).or_insert(None);
    }

    fn render(&self, prefix: &str, depth: usize, max_depth: usize, lines: &mut Vec<String>) {
        if depth > max_depth {
            return;
        }
        let total = self.children.len();
        for (i, (name, child)) in self.children.iter().enumerate() {
            let last = i + 1 == total;
            let branch = if last { "└─ " } else { "├─ " };
            lines.push(format!("{prefix}{branch}{name}"));
            if let Some(dir) = child {
                let ext = if last { "   " } else { "│  " };
                dir.render(&format!("{prefix}{ext}"), depth + 1, max_depth, lines);
            }
        }
    }
}

pub fn render_tree(root: &Path, paths: &[PathBuf], max_depth: usize) -> String {
    let mut tree = TreeDir::default();
    for path in paths {
        tree.insert(&relative_components(root, path));
    }

    let mut lines = vec![format!("{}/", root_name(root))];
    tree.render("", 0, max_depth, &mut lines);
    lines.join("\n")
}

fn write_report(out_dir: &Path, name: &str, text: &str) -> Result<PathBuf> {
    let path = out_dir.join(name);
    std::fs::write(&path, text).map_err(|err| ExportError::write(&path, err))?;
    Ok(path)
}

pub fn write_summary(root: &Path, paths: &[PathBuf], out_dir: &Path) -> Result<PathBuf> {
    write_report(
        out_dir,
        SUMMARY_FILE_NAME,
        &render_summary(root, paths, DEFAULT_TOP_MODULES),
    )
}

pub fn write_tree(root: &Path, paths: &[PathBuf], out_dir: &Path) -> Result<PathBuf> {
    write_report(
        out_dir,
        TREE_FILE_NAME,
        &render_tree(root, paths, DEFAULT_TREE_DEPTH),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn tree_sorts_siblings_and_marks_directories() {
        let root = Path::new("/work/demo");
        let paths: Vec<PathBuf> = ["b.py", "a/x.py", "a/y.py", "c/d/e.py"]
            .iter()
            .map(|rel| root.join(rel))
            .collect();

        let expected = "\
demo/
├─ a/
│  ├─ x.py
│  └─ y.py
├─ b.py
└─ c/
   └─ d/
      └─ e.py";
        assert_eq!(render_tree(root, &paths, DEFAULT_TREE_DEPTH), expected);
    }

    #[test]
    fn tree_stops_below_max_depth() {
        let root = Path::new("/r");
        let paths = vec![root.join("a/b/c/d.py")];
        let expected = "r/\n└─ a/\n   └─ b/";
        assert_eq!(render_tree(root, &paths, 1), expected);
    }

    #[test]
    fn summary_lists_languages_entry_points_and_largest_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("proj");
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::write(root.join("main.py"), "print(1)\n").unwrap();
        fs::write(root.join("pkg/tool_cli.py"), "x".repeat(40)).unwrap();
        fs::write(root.join("pkg/README.md"), "x".repeat(5)).unwrap();
        let paths = vec![
            root.join("main.py"),
            root.join("pkg/README.md"),
            root.join("pkg/tool_cli.py"),
        ];

        let summary = render_summary(&root, &paths, 2);
        let expected = "\
Project
- Name: proj

Languages
- .py: 2 files
- .md: 1 files

Entry Points
- main.py
- pkg/tool_cli.py

Key Modules (by file size)
- pkg/tool_cli.py (40 bytes)
- main.py (9 bytes)
";
        assert_eq!(summary, expected);
    }

    #[test]
    fn summary_without_entry_points() {
        let summary = render_summary(Path::new("/r"), &[], DEFAULT_TOP_MODULES);
        assert!(summary.contains("Entry Points\n- (none detected)\n"));
    }
}
