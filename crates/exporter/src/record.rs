use serde::{Deserialize, Serialize};
use std::fmt;

pub const BUNDLE_FILE_PREFIX: &str = "bundle_";
pub const BUNDLE_FILE_SUFFIX: &str = ".txt";
/// Placeholder written to `index.txt` for records that own no bundle.
pub const NO_BUNDLE: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Ok,
    ReadError,
    SkippedLarge,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ReadError => "read_error",
            Self::SkippedLarge => "skipped_large",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-file outcome of an export run. Field names are part of the
/// `index.json` contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub rel: String,
    pub size_bytes: u64,
    pub sha12: String,
    pub bundle: Option<String>,
    pub status: FileStatus,
    pub error: Option<String>,
}

impl FileRecord {
    /// Tab-separated `index.txt` line.
    pub fn index_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.rel,
            self.size_bytes,
            self.sha12,
            self.bundle.as_deref().unwrap_or(NO_BUNDLE),
            self.status
        )
    }
}

/// 1-based bundle sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BundleId(u32);

impl BundleId {
    pub const FIRST: BundleId = BundleId(1);

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn file_name(self) -> String {
        format!("{BUNDLE_FILE_PREFIX}{:04}{BUNDLE_FILE_SUFFIX}", self.0)
    }

    /// Inverse of [`BundleId::file_name`]; `None` for anything else.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let digits = name
            .strip_prefix(BUNDLE_FILE_PREFIX)?
            .strip_suffix(BUNDLE_FILE_SUFFIX)?;
        if digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().filter(|&n| n > 0).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bundle_names_are_zero_padded() {
        assert_eq!(BundleId::FIRST.file_name(), "bundle_0001.txt");
        assert_eq!(BundleId(42).file_name(), "bundle_0042.txt");
        assert_eq!(BundleId(12345).file_name(), "bundle_12345.txt");
    }

    #[test]
    fn parses_only_bundle_file_names() {
        assert_eq!(BundleId::from_file_name("bundle_0007.txt"), Some(BundleId(7)));
        assert_eq!(BundleId::from_file_name("bundle_12345.txt"), Some(BundleId(12345)));
        assert_eq!(BundleId::from_file_name("bundle_7.txt"), None);
        assert_eq!(BundleId::from_file_name("bundle_0000.txt"), None);
        assert_eq!(BundleId::from_file_name("bundle_00a1.txt"), None);
        assert_eq!(BundleId::from_file_name("index.txt"), None);
    }

    #[test]
    fn index_line_uses_placeholder_for_missing_bundle() {
        let record = FileRecord {
            rel: "src/big.bin.py".into(),
            size_bytes: 9000,
            sha12: "0123456789ab".into(),
            bundle: None,
            status: FileStatus::SkippedLarge,
            error: None,
        };
        assert_eq!(
            record.index_line(),
            "src/big.bin.py\t9000\t0123456789ab\t-\tskipped_large"
        );
    }

    #[test]
    fn record_serializes_with_null_fields() {
        let record = FileRecord {
            rel: "a.py".into(),
            size_bytes: 3,
            sha12: "abcdefabcdef".into(),
            bundle: Some("bundle_0001.txt".into()),
            status: FileStatus::Ok,
            error: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "rel": "a.py",
                "size_bytes": 3,
                "sha12": "abcdefabcdef",
                "bundle": "bundle_0001.txt",
                "status": "ok",
                "error": null
            })
        );
    }
}
