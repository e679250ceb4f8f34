use crate::config::ExportConfig;
use crate::encoding::TextEncoding;
use crate::error::{ExportError, Result};
use crate::record::{FileRecord, FileStatus};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const INDEX_TEXT_FILE_NAME: &str = "index.txt";
pub const INDEX_JSON_FILE_NAME: &str = "index.json";

/// Aggregate view of one export run, written as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub root: String,
    pub file_count: usize,
    pub ok_count: usize,
    pub skipped_large_count: usize,
    pub read_error_count: usize,
    pub skipped_large: Vec<String>,
    pub read_errors: Vec<String>,
    pub config: ExportConfig,
}

impl Manifest {
    pub fn from_records(root: &Path, config: &ExportConfig, records: &[FileRecord]) -> Self {
        let rels_with = |status: FileStatus| -> Vec<String> {
            records
                .iter()
                .filter(|r| r.status == status)
                .map(|r| r.rel.clone())
                .collect()
        };
        let skipped_large = rels_with(FileStatus::SkippedLarge);
        let read_errors = rels_with(FileStatus::ReadError);

        Self {
            root: root.display().to_string(),
            file_count: records.len(),
            ok_count: records.iter().filter(|r| r.status == FileStatus::Ok).count(),
            skipped_large_count: skipped_large.len(),
            read_error_count: read_errors.len(),
            skipped_large,
            read_errors,
            config: config.clone(),
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    std::fs::write(&tmp, bytes).map_err(|err| ExportError::write(&tmp, err))?;
    std::fs::rename(&tmp, path).map_err(|err| ExportError::write(path, err))?;
    Ok(())
}

pub fn render_index_text(records: &[FileRecord]) -> String {
    records
        .iter()
        .map(FileRecord::index_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn write_index_text(
    out_dir: &Path,
    records: &[FileRecord],
    encoding: TextEncoding,
) -> Result<PathBuf> {
    let path = out_dir.join(INDEX_TEXT_FILE_NAME);
    let text = render_index_text(records);
    write_atomic(&path, &encoding.encode(&text))?;
    Ok(path)
}

pub fn write_index_json(out_dir: &Path, records: &[FileRecord]) -> Result<PathBuf> {
    let path = out_dir.join(INDEX_JSON_FILE_NAME);
    let bytes = serde_json::to_vec_pretty(records)?;
    write_atomic(&path, &bytes)?;
    Ok(path)
}

pub fn write_manifest(out_dir: &Path, manifest: &Manifest) -> Result<PathBuf> {
    let path = out_dir.join(MANIFEST_FILE_NAME);
    let bytes = serde_json::to_vec_pretty(manifest)?;
    write_atomic(&path, &bytes)?;
    Ok(path)
}

/// Write `index.txt`, `index.json` and `manifest.json` from the final records.
pub fn write_outputs(
    out_dir: &Path,
    root: &Path,
    config: &ExportConfig,
    records: &[FileRecord],
) -> Result<Manifest> {
    write_index_text(out_dir, records, config.bundle.encoding)?;
    write_index_json(out_dir, records)?;

    let manifest = Manifest::from_records(root, config, records);
    write_manifest(out_dir, &manifest)?;
    Ok(manifest)
}
