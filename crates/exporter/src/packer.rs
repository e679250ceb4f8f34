//! Size-bounded bundle packing.
//!
//! Files are appended to `bundle_NNNN.txt` as blocks (header + text). A
//! bundle rolls over once the next block would push it past `max_bytes`, but
//! the first block of a bundle is always admitted so an oversized file can
//! never stall the run.

use crate::encoding::TextEncoding;
use crate::error::{ExportError, Result};
use crate::filters::relative_path;
use crate::record::{BundleId, FileRecord, FileStatus};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const FINGERPRINT_HEX_LEN: usize = 12;

pub fn block_header(rel: &str) -> String {
    format!("\n\n===== FILE: {rel} =====\n")
}

pub fn read_failure_body(error: &str) -> String {
    format!("<<FAILED TO READ FILE: {error}>>")
}

/// First 12 hex chars of the SHA-256 of the file bytes.
pub fn fingerprint_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;

    let mut hex = String::with_capacity(64);
    for byte in hasher.finalize() {
        let _ = write!(hex, "{byte:02x}");
    }
    hex.truncate(FINGERPRINT_HEX_LEN);
    Ok(hex)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackerOptions {
    pub max_bytes: u64,
    /// 0 disables the per-file limit.
    pub max_file_bytes: u64,
    pub encoding: TextEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleSummary {
    pub name: String,
    pub bytes: u64,
    pub blocks: usize,
}

#[derive(Debug)]
pub struct PackOutcome {
    pub records: Vec<FileRecord>,
    pub bundles: Vec<BundleSummary>,
}

struct OpenBundle {
    id: BundleId,
    path: PathBuf,
    writer: BufWriter<File>,
    bytes: u64,
    blocks: usize,
}

impl OpenBundle {
    fn create(out_dir: &Path, id: BundleId) -> Result<Self> {
        let path = out_dir.join(id.file_name());
        let file = File::create(&path).map_err(|err| ExportError::write(&path, err))?;
        Ok(Self {
            id,
            path,
            writer: BufWriter::new(file),
            bytes: 0,
            blocks: 0,
        })
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|err| ExportError::write(&self.path, err))?;
        self.bytes = self.bytes.saturating_add(bytes.len() as u64);
        self.blocks += 1;
        Ok(())
    }

    /// Flush buffered bytes; the handle itself closes when dropped.
    fn finish(&mut self) -> Result<BundleSummary> {
        self.writer
            .flush()
            .map_err(|err| ExportError::write(&self.path, err))?;
        Ok(BundleSummary {
            name: self.id.file_name(),
            bytes: self.bytes,
            blocks: self.blocks,
        })
    }
}

/// Owns the single open bundle handle for the duration of a run.
pub struct BundlePacker {
    out_dir: PathBuf,
    options: PackerOptions,
    current: OpenBundle,
    finished: Vec<BundleSummary>,
}

impl BundlePacker {
    /// Opens `bundle_0001.txt` immediately, so a run always produces at least
    /// one bundle.
    pub fn create(out_dir: impl Into<PathBuf>, options: PackerOptions) -> Result<Self> {
        let out_dir = out_dir.into();
        let current = OpenBundle::create(&out_dir, BundleId::FIRST)?;
        Ok(Self {
            out_dir,
            options,
            current,
            finished: Vec::new(),
        })
    }

    pub fn current_bundle(&self) -> BundleId {
        self.current.id
    }

    /// Encode and append one block, rolling over first if it does not fit.
    /// Returns the file name of the bundle that received the block.
    pub fn push_block(&mut self, block: &str) -> Result<String> {
        let bytes = self.options.encoding.encode(block);
        let block_size = bytes.len() as u64;

        if self.current.blocks > 0
            && self.current.bytes.saturating_add(block_size) > self.options.max_bytes
        {
            self.roll_over()?;
        }

        self.current.append(&bytes)?;
        Ok(self.current.id.file_name())
    }

    fn roll_over(&mut self) -> Result<()> {
        let summary = self.current.finish()?;
        log::debug!(
            "Closed {} ({} bytes, {} blocks)",
            summary.name,
            summary.bytes,
            summary.blocks
        );
        self.finished.push(summary);
        // Assigning drops (and closes) the previous handle.
        self.current = OpenBundle::create(&self.out_dir, self.current.id.next())?;
        Ok(())
    }

    pub fn finalize(mut self) -> Result<Vec<BundleSummary>> {
        let summary = self.current.finish()?;
        self.finished.push(summary);
        Ok(self.finished)
    }
}

/// Delete `bundle_NNNN.txt` files left behind by an earlier run.
pub fn remove_stale_bundles(out_dir: &Path) -> Result<usize> {
    let mut removed = 0usize;
    let entries = fs::read_dir(out_dir).map_err(|err| ExportError::write(out_dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| ExportError::write(out_dir, err))?;
        let path = entry.path();
        let is_bundle = entry
            .file_name()
            .to_str()
            .and_then(BundleId::from_file_name)
            .is_some();
        let is_file = entry
            .file_type()
            .map_err(|err| ExportError::write(&path, err))?
            .is_file();
        if is_bundle && is_file {
            fs::remove_file(&path).map_err(|err| ExportError::write(&path, err))?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn read_text(path: &Path, encoding: TextEncoding) -> std::result::Result<String, String> {
    let bytes = fs::read(path).map_err(|err| err.to_string())?;
    encoding.decode(&bytes).map_err(|err| err.to_string())
}

fn pack_file(
    root: &Path,
    path: &Path,
    options: &PackerOptions,
    packer: &mut BundlePacker,
) -> Result<FileRecord> {
    let rel = relative_path(root, path);

    let (size_bytes, stat_error) = match fs::metadata(path) {
        Ok(meta) => (meta.len(), None),
        Err(err) => (0, Some(err.to_string())),
    };
    let (sha12, hash_error) = match fingerprint_file(path) {
        Ok(sha12) => (sha12, None),
        Err(err) => (String::new(), Some(err.to_string())),
    };

    if stat_error.is_none() && options.max_file_bytes > 0 && size_bytes > options.max_file_bytes
    {
        log::warn!(
            "Skipping {rel}: {size_bytes} bytes exceeds limit of {}",
            options.max_file_bytes
        );
        if let Some(err) = &hash_error {
            log::warn!("Could not fingerprint {rel}: {err}");
        }
        return Ok(FileRecord {
            rel,
            size_bytes,
            sha12,
            bundle: None,
            status: FileStatus::SkippedLarge,
            error: hash_error,
        });
    }

    let content = match stat_error.or(hash_error) {
        Some(err) => Err(err),
        None => read_text(path, options.encoding),
    };
    let (status, error, body) = match content {
        Ok(text) => (FileStatus::Ok, None, text),
        Err(err) => {
            log::warn!("Failed to read {rel}: {err}");
            let body = read_failure_body(&err);
            (FileStatus::ReadError, Some(err), body)
        }
    };

    let mut block = block_header(&rel);
    block.push_str(&body);
    let bundle = packer.push_block(&block)?;

    Ok(FileRecord {
        rel,
        size_bytes,
        sha12,
        bundle: Some(bundle),
        status,
        error,
    })
}

/// Pack `paths` (already in collector order) into bundles under `out_dir`.
pub fn pack_files(
    root: &Path,
    out_dir: &Path,
    paths: &[PathBuf],
    options: PackerOptions,
) -> Result<PackOutcome> {
    let removed = remove_stale_bundles(out_dir)?;
    if removed > 0 {
        log::debug!("Removed {removed} stale bundle(s) from {}", out_dir.display());
    }

    let mut packer = BundlePacker::create(out_dir, options)?;
    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        records.push(pack_file(root, path, &options, &mut packer)?);
    }
    let bundles = packer.finalize()?;

    Ok(PackOutcome { records, bundles })
}
