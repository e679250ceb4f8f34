use crate::config::ExportConfig;
use crate::error::{ConfigError, ExportError, Result};
use crate::filters::{collect_paths, FilterRules};
use crate::packer::{pack_files, BundleSummary, PackerOptions};
use crate::record::{BundleId, FileRecord, FileStatus};
use crate::report::{write_summary, write_tree, SUMMARY_FILE_NAME, TREE_FILE_NAME};
use crate::writer::{
    write_outputs, Manifest, INDEX_JSON_FILE_NAME, INDEX_TEXT_FILE_NAME, MANIFEST_FILE_NAME,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything one export run produced.
#[derive(Debug)]
pub struct ExportReport {
    pub root: PathBuf,
    pub out_dir: PathBuf,
    pub manifest: Manifest,
    pub records: Vec<FileRecord>,
    pub bundles: Vec<BundleSummary>,
    pub summary_path: Option<PathBuf>,
    pub tree_path: Option<PathBuf>,
}

impl ExportReport {
    pub fn count(&self, status: FileStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }
}

/// Load `config_path` and export. Relative `root`/`output_dir` resolve
/// against the config file's directory.
pub fn run_export(config_path: &Path) -> Result<ExportReport> {
    let config_path = std::fs::canonicalize(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config = ExportConfig::load(&config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    export_with_config(&config, base_dir)
}

/// True for files this run writes into `out_dir` itself.
fn is_own_artifact(out_dir: &Path, path: &Path) -> bool {
    if path.parent() != Some(out_dir) {
        return false;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    BundleId::from_file_name(name).is_some()
        || [
            INDEX_TEXT_FILE_NAME,
            INDEX_JSON_FILE_NAME,
            MANIFEST_FILE_NAME,
            SUMMARY_FILE_NAME,
            TREE_FILE_NAME,
        ]
        .contains(&name)
}

pub fn export_with_config(config: &ExportConfig, base_dir: &Path) -> Result<ExportReport> {
    let started = Instant::now();

    let root_arg = base_dir.join(&config.root);
    let root = std::fs::canonicalize(&root_arg).map_err(|_| {
        ExportError::InvalidPath(format!("Path does not exist: {}", root_arg.display()))
    })?;
    if !root.is_dir() {
        return Err(ExportError::InvalidPath(format!(
            "Root is not a directory: {}",
            root.display()
        )));
    }

    let out_dir = base_dir.join(&config.output_dir);
    std::fs::create_dir_all(&out_dir).map_err(|err| ExportError::write(&out_dir, err))?;
    let out_dir = std::fs::canonicalize(&out_dir)?;

    log::info!(
        "Exporting {} into {}",
        root.display(),
        out_dir.display()
    );

    let rules = FilterRules::from_config(&root, config);
    let mut paths = collect_paths(&root, &rules);
    // Never feed our own artifacts back into the pack. A nested output
    // directory is dropped whole; one at or above the root only loses the
    // files this run writes.
    if out_dir != root && out_dir.starts_with(&root) {
        paths.retain(|p| !p.starts_with(&out_dir));
    } else {
        paths.retain(|p| !is_own_artifact(&out_dir, p));
    }
    log::info!("Collected {} file(s)", paths.len());

    let options = PackerOptions {
        max_bytes: config.bundle.max_bytes,
        max_file_bytes: config.limits.max_file_bytes,
        encoding: config.bundle.encoding,
    };
    let outcome = pack_files(&root, &out_dir, &paths, options)?;
    let manifest = write_outputs(&out_dir, &root, config, &outcome.records)?;

    let summary_path = if config.output.emit_summary {
        Some(write_summary(&root, &paths, &out_dir)?)
    } else {
        None
    };
    let tree_path = if config.output.emit_tree {
        Some(write_tree(&root, &paths, &out_dir)?)
    } else {
        None
    };

    log::info!(
        "Export finished in {} ms: {} file(s), {} ok, {} skipped_large, {} read_error, {} bundle(s)",
        started.elapsed().as_millis(),
        manifest.file_count,
        manifest.ok_count,
        manifest.skipped_large_count,
        manifest.read_error_count,
        outcome.bundles.len()
    );

    Ok(ExportReport {
        root,
        out_dir,
        manifest,
        records: outcome.records,
        bundles: outcome.bundles,
        summary_path,
        tree_path,
    })
}
