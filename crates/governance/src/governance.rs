//! Copies the project's governance ledger (`.project/`) and accepted ADRs
//! into a context pack.

use crate::error::{GovernanceError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_DIR_NAME: &str = ".project";
pub const DECISIONS_FILE_NAME: &str = "decisions.json";
pub const ACCEPTED_STATUS: &str = "accepted";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Decisions {
    #[serde(default)]
    pub adrs: Vec<AdrEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdrEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl AdrEntry {
    pub fn is_accepted(&self) -> bool {
        self.status.as_deref() == Some(ACCEPTED_STATUS)
    }
}

/// Destination paths written by [`copy_governance`].
#[derive(Debug, Default)]
pub struct GovernanceCopy {
    pub project_files: Vec<PathBuf>,
    pub adrs: Vec<PathBuf>,
}

pub fn read_decisions(path: &Path) -> Result<Decisions> {
    let bytes = fs::read(path).map_err(|err| GovernanceError::io(path, err))?;
    serde_json::from_slice(&bytes).map_err(|source| GovernanceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(|err| GovernanceError::io(dst, err))?;
    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|err| GovernanceError::io(path, err))
}

pub fn copy_governance(
    project_root: &Path,
    out_dir: &Path,
    include_adrs: bool,
) -> Result<GovernanceCopy> {
    let mut copied = GovernanceCopy::default();
    let src_project = project_root.join(PROJECT_DIR_NAME);

    if src_project.is_dir() {
        let dst = out_dir.join(PROJECT_DIR_NAME);
        create_dir(&dst)?;

        let entries =
            fs::read_dir(&src_project).map_err(|err| GovernanceError::io(&src_project, err))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for src in files {
            let Some(name) = src.file_name() else {
                continue;
            };
            let target = dst.join(name);
            copy_file(&src, &target)?;
            copied.project_files.push(target);
        }
    } else {
        log::debug!("No {} in {}", PROJECT_DIR_NAME, project_root.display());
    }

    if !include_adrs {
        return Ok(copied);
    }

    let decisions_path = src_project.join(DECISIONS_FILE_NAME);
    if !decisions_path.is_file() {
        return Ok(copied);
    }

    let decisions = read_decisions(&decisions_path)?;
    let accepted: Vec<&AdrEntry> = decisions.adrs.iter().filter(|a| a.is_accepted()).collect();
    if accepted.is_empty() {
        return Ok(copied);
    }

    let dst_adr = out_dir.join("docs").join("adr");
    create_dir(&dst_adr)?;
    for adr in accepted {
        let rel = adr.path.as_deref().unwrap_or_default();
        let src = project_root.join(rel);
        let Some(name) = src.file_name().filter(|_| !rel.is_empty() && src.is_file()) else {
            log::warn!(
                "Accepted ADR {} points at missing file {rel:?}",
                adr.id.as_deref().unwrap_or("?")
            );
            continue;
        };
        let target = dst_adr.join(name);
        copy_file(&src, &target)?;
        copied.adrs.push(target);
    }

    Ok(copied)
}
