//! # Context Pack Exporter
//!
//! Turns a project tree into a reproducible context pack for language models.
//!
//! ## Pipeline
//!
//! ```text
//! export_config.json
//!     │
//!     ├──> Path Collector (include roots, extension + exclude rules)
//!     │      └─> Ordered file list
//!     │
//!     ├──> Bundle Packer (size-bounded, first block always admitted)
//!     │      └─> bundle_0001.txt, bundle_0002.txt, ... + FileRecords
//!     │
//!     ├──> Manifest/Index Writer
//!     │      └─> index.txt, index.json, manifest.json
//!     │
//!     └──> Reporters (optional)
//!            └─> summary.txt, tree.txt
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! fn main() -> context_pack_exporter::Result<()> {
//!     let report = context_pack_exporter::run_export(Path::new("export_config.json"))?;
//!
//!     println!(
//!         "Packed {} files into {} bundles",
//!         report.manifest.file_count,
//!         report.bundles.len()
//!     );
//!     Ok(())
//! }
//! ```

mod config;
mod encoding;
mod error;
mod export;
mod filters;
mod packer;
mod record;
mod report;
mod writer;

pub use config::{
    BundleConfig, ExcludeConfig, ExportConfig, IncludeConfig, LimitsConfig, OutputConfig,
};
pub use encoding::{DecodeError, TextEncoding};
pub use error::{ConfigError, ExportError, Result};
pub use export::{export_with_config, run_export, ExportReport};
pub use filters::{collect_paths, relative_path, FilterRules};
pub use packer::{
    block_header, fingerprint_file, pack_files, read_failure_body, remove_stale_bundles,
    BundlePacker, BundleSummary, PackOutcome, PackerOptions,
};
pub use record::{BundleId, FileRecord, FileStatus, NO_BUNDLE};
pub use report::{
    render_summary, render_tree, write_summary, write_tree, SUMMARY_FILE_NAME, TREE_FILE_NAME,
};
pub use writer::{
    render_index_text, write_index_json, write_index_text, write_manifest, write_outputs,
    Manifest, INDEX_JSON_FILE_NAME, INDEX_TEXT_FILE_NAME, MANIFEST_FILE_NAME,
};
