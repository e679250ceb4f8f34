use crate::error::{GovernanceError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Template subtrees copied into a project by [`init_project`].
pub const SCAFFOLD_DIRS: &[&str] = &[".project", "docs/adr", "docs/spec"];

#[derive(Debug, Default)]
pub struct ScaffoldReport {
    pub written: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
}

/// Copy `src` into `dst`, keeping files that already exist unless `force`.
pub fn copy_tree(src: &Path, dst: &Path, force: bool, report: &mut ScaffoldReport) -> Result<()> {
    fs::create_dir_all(dst).map_err(|err| GovernanceError::io(dst, err))?;

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(src).to_path_buf();
            GovernanceError::io(path, err.into())
        })?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let out = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&out).map_err(|err| GovernanceError::io(&out, err))?;
            continue;
        }

        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|err| GovernanceError::io(parent, err))?;
        }
        if out.exists() && !force {
            report.kept.push(out);
            continue;
        }
        fs::copy(entry.path(), &out).map_err(|err| GovernanceError::io(&out, err))?;
        report.written.push(out);
    }
    Ok(())
}

/// Seed a project with the governance templates found under `template_root`.
pub fn init_project(
    template_root: &Path,
    project_root: &Path,
    force: bool,
) -> Result<ScaffoldReport> {
    if !template_root.is_dir() {
        return Err(GovernanceError::MissingTemplate(template_root.to_path_buf()));
    }

    let mut report = ScaffoldReport::default();
    for dir in SCAFFOLD_DIRS {
        let src = template_root.join(dir);
        if !src.is_dir() {
            log::warn!("Template {} has no {dir}/, skipping", template_root.display());
            continue;
        }
        copy_tree(&src, &project_root.join(dir), force, &mut report)?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn templates() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), ".project/ledger.json", "template ledger");
        write(tmp.path(), "docs/adr/ADR-000-template.md", "# ADR");
        write(tmp.path(), "docs/spec/overview.md", "# spec");
        tmp
    }

    #[test]
    fn keeps_existing_files_without_force() {
        let tpl = templates();
        let project = tempfile::tempdir().unwrap();
        write(project.path(), ".project/ledger.json", "mine");

        let report = init_project(tpl.path(), project.path(), false).unwrap();

        assert_eq!(report.kept, vec![project.path().join(".project/ledger.json")]);
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            fs::read_to_string(project.path().join(".project/ledger.json")).unwrap(),
            "mine"
        );
        assert!(project.path().join("docs/spec/overview.md").is_file());
    }

    #[test]
    fn force_overwrites() {
        let tpl = templates();
        let project = tempfile::tempdir().unwrap();
        write(project.path(), ".project/ledger.json", "mine");

        let report = init_project(tpl.path(), project.path(), true).unwrap();

        assert!(report.kept.is_empty());
        assert_eq!(
            fs::read_to_string(project.path().join(".project/ledger.json")).unwrap(),
            "template ledger"
        );
    }

    #[test]
    fn missing_template_root_is_an_error() {
        let project = tempfile::tempdir().unwrap();
        let err = init_project(&project.path().join("nope"), project.path(), false).unwrap_err();
        assert!(matches!(err, GovernanceError::MissingTemplate(_)));
    }
}
