use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use crate::error::Result;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

// ---------------------------------------------------------------------------
// Filename stem keys
// ---------------------------------------------------------------------------

/// Structured key parsed from an attachment filename stem. Full-date stems
/// (`2024-03-05`, `5 Mar 2024`) are unambiguous; year-less legacy stems
/// (`5 Mar`) key by month and day only and lose to an exact-date entry
/// when both match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StemKey {
    Dated(NaiveDate),
    MonthDay { month: u32, day: u32 },
}

impl StemKey {
    fn display(&self) -> String {
        match self {
            StemKey::Dated(d) => crate::fmt::display_date(*d),
            StemKey::MonthDay { month, day } => {
                format!("{day} {}", month_abbrev(*month))
            }
        }
    }
}

fn month_abbrev(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "???",
    }
}

fn month_from_abbrev(raw: &str) -> Option<u32> {
    match raw.to_ascii_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

fn parse_stem(stem: &str) -> Option<StemKey> {
    let stem = stem.trim();
    if let Ok(d) = NaiveDate::parse_from_str(stem, "%Y-%m-%d") {
        return Some(StemKey::Dated(d));
    }
    if let Ok(d) = NaiveDate::parse_from_str(stem, "%d %b %Y") {
        return Some(StemKey::Dated(d));
    }

    // Year-less legacy stem: "5 Mar"
    let mut parts = stem.split_whitespace();
    let day: u32 = parts.next()?.parse().ok()?;
    let month = month_from_abbrev(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    // Validate against a leap year so 29 Feb stays representable.
    NaiveDate::from_ymd_opt(2024, month, day)?;
    Some(StemKey::MonthDay { month, day })
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum IndexWarning {
    /// Two files mapped to the same key; the first in sorted order is kept.
    KeyCollision {
        key: String,
        kept: String,
        ignored: String,
    },
    /// A .pdf whose stem is not a recognizable date key.
    UnrecognizedStem { file_name: String },
}

impl fmt::Display for IndexWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexWarning::KeyCollision { key, kept, ignored } => write!(
                f,
                "Both {kept} and {ignored} match {key}; using {kept}"
            ),
            IndexWarning::UnrecognizedStem { file_name } => {
                write!(f, "{file_name} has no recognizable date key; skipped")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found { file_name: String },
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }
}

/// Terminal resolution states for one day's attachment. `NotFound` is a
/// normal outcome, not an error; `ReadFailed` degrades only that day.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentState {
    Loaded(Attachment),
    ReadFailed { file_name: String, detail: String },
    NotFound,
}

fn insert_or_warn<K: Ord>(
    map: &mut BTreeMap<K, String>,
    key: K,
    key_display: String,
    file_name: String,
    warnings: &mut Vec<IndexWarning>,
) {
    match map.entry(key) {
        std::collections::btree_map::Entry::Vacant(e) => {
            e.insert(file_name);
        }
        std::collections::btree_map::Entry::Occupied(e) => {
            let kept = e.get().clone();
            log::warn!("attachment key collision on {key_display}: {kept} vs {file_name}");
            warnings.push(IndexWarning::KeyCollision {
                key: key_display,
                kept,
                ignored: file_name,
            });
        }
    }
}

/// Date-keyed map over one directory's .pdf files, built once per process
/// from a sorted listing. Key collisions keep the first file and surface a
/// warning; nothing is silently shadowed.
pub struct AttachmentIndex {
    dir: PathBuf,
    dated: BTreeMap<NaiveDate, String>,
    month_day: BTreeMap<(u32, u32), String>,
    warnings: Vec<IndexWarning>,
}

impl AttachmentIndex {
    pub fn build(dir: &Path) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let is_pdf = Path::new(&name)
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
            if is_pdf {
                names.push(name);
            }
        }
        names.sort();

        let mut index = Self {
            dir: dir.to_path_buf(),
            dated: BTreeMap::new(),
            month_day: BTreeMap::new(),
            warnings: Vec::new(),
        };

        for name in names {
            let stem = Path::new(&name)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let Some(key) = parse_stem(&stem) else {
                log::warn!("attachment {name} has no recognizable date key");
                index
                    .warnings
                    .push(IndexWarning::UnrecognizedStem { file_name: name });
                continue;
            };
            match key {
                StemKey::Dated(d) => {
                    insert_or_warn(&mut index.dated, d, key.display(), name, &mut index.warnings)
                }
                StemKey::MonthDay { month, day } => insert_or_warn(
                    &mut index.month_day,
                    (month, day),
                    key.display(),
                    name,
                    &mut index.warnings,
                ),
            }
        }

        log::debug!(
            "indexed {} attachments from {} ({} warnings)",
            index.len(),
            dir.display(),
            index.warnings.len()
        );
        Ok(index)
    }

    pub fn warnings(&self) -> &[IndexWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.dated.len() + self.month_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (display key, filename) pairs for listing, exact-date entries first.
    pub fn entries(&self) -> Vec<(String, String)> {
        let dated = self
            .dated
            .iter()
            .map(|(d, name)| (StemKey::Dated(*d).display(), name.clone()));
        let legacy = self.month_day.iter().map(|((month, day), name)| {
            (
                StemKey::MonthDay {
                    month: *month,
                    day: *day,
                }
                .display(),
                name.clone(),
            )
        });
        dated.chain(legacy).collect()
    }

    /// Resolve a date against the scan-time listing. Pure: same date and
    /// same directory contents give the same answer. An exact-date entry
    /// wins over a year-less legacy entry.
    pub fn resolve(&self, date: NaiveDate) -> Resolution {
        let exact = self.dated.get(&date);
        let legacy = self.month_day.get(&(date.month(), date.day()));
        match exact.or(legacy) {
            Some(file_name) => Resolution::Found {
                file_name: file_name.clone(),
            },
            None => Resolution::NotFound,
        }
    }

    /// Resolve and perform the single scoped read. One attempt, no retries.
    pub fn load(&self, date: NaiveDate) -> AttachmentState {
        let file_name = match self.resolve(date) {
            Resolution::Found { file_name } => file_name,
            Resolution::NotFound => return AttachmentState::NotFound,
        };
        match std::fs::read(self.dir.join(&file_name)) {
            Ok(bytes) => AttachmentState::Loaded(Attachment { file_name, bytes }),
            Err(e) => AttachmentState::ReadFailed {
                file_name,
                detail: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_stem_full_dates() {
        assert_eq!(
            parse_stem("2024-03-05"),
            Some(StemKey::Dated(date(2024, 3, 5)))
        );
        assert_eq!(
            parse_stem("5 Mar 2024"),
            Some(StemKey::Dated(date(2024, 3, 5)))
        );
        assert_eq!(
            parse_stem("05 Mar 2024"),
            Some(StemKey::Dated(date(2024, 3, 5)))
        );
    }

    #[test]
    fn test_parse_stem_legacy_month_day() {
        assert_eq!(parse_stem("5 Mar"), Some(StemKey::MonthDay { month: 3, day: 5 }));
        assert_eq!(parse_stem("29 Feb"), Some(StemKey::MonthDay { month: 2, day: 29 }));
    }

    #[test]
    fn test_parse_stem_rejects_junk() {
        assert_eq!(parse_stem("notes"), None);
        assert_eq!(parse_stem("Mar 5"), None);
        assert_eq!(parse_stem("32 Mar"), None);
        assert_eq!(parse_stem("30 Feb"), None);
        assert_eq!(parse_stem("5 Mar 2024 copy"), None);
    }

    fn dir_with(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for f in files {
            std::fs::write(dir.path().join(f), format!("%PDF {f}")).unwrap();
        }
        dir
    }

    #[test]
    fn test_build_indexes_pdfs_only() {
        let dir = dir_with(&["5 Mar.pdf", "2024-03-06.pdf", "notes.txt"]);
        let index = AttachmentIndex::build(dir.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.warnings().is_empty());
    }

    #[test]
    fn test_build_flags_unrecognized_stems() {
        let dir = dir_with(&["scan-final.pdf"]);
        let index = AttachmentIndex::build(dir.path()).unwrap();
        assert!(index.is_empty());
        assert_eq!(
            index.warnings(),
            &[IndexWarning::UnrecognizedStem {
                file_name: "scan-final.pdf".to_string()
            }]
        );
    }

    #[test]
    fn test_build_flags_key_collisions_keeping_first() {
        let dir = dir_with(&["2024-03-05.pdf", "5 Mar 2024.pdf"]);
        let index = AttachmentIndex::build(dir.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.warnings(),
            &[IndexWarning::KeyCollision {
                key: "5 Mar 2024".to_string(),
                kept: "2024-03-05.pdf".to_string(),
                ignored: "5 Mar 2024.pdf".to_string(),
            }]
        );
        assert_eq!(
            index.resolve(date(2024, 3, 5)),
            Resolution::Found {
                file_name: "2024-03-05.pdf".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_legacy_and_exact() {
        let dir = dir_with(&["5 Mar.pdf", "2024-03-06.pdf"]);
        let index = AttachmentIndex::build(dir.path()).unwrap();
        assert_eq!(
            index.resolve(date(2024, 3, 5)),
            Resolution::Found {
                file_name: "5 Mar.pdf".to_string()
            }
        );
        // Legacy stems match the same month-day in any year.
        assert_eq!(
            index.resolve(date(2025, 3, 5)),
            Resolution::Found {
                file_name: "5 Mar.pdf".to_string()
            }
        );
        assert_eq!(
            index.resolve(date(2024, 3, 6)),
            Resolution::Found {
                file_name: "2024-03-06.pdf".to_string()
            }
        );
        assert_eq!(index.resolve(date(2024, 3, 7)), Resolution::NotFound);
    }

    #[test]
    fn test_exact_date_beats_legacy_stem() {
        let dir = dir_with(&["5 Mar.pdf", "2024-03-05.pdf"]);
        let index = AttachmentIndex::build(dir.path()).unwrap();
        // Different keys, so no collision warning, but the exact date wins.
        assert!(index.warnings().is_empty());
        assert_eq!(
            index.resolve(date(2024, 3, 5)),
            Resolution::Found {
                file_name: "2024-03-05.pdf".to_string()
            }
        );
        // Another year still falls back to the legacy stem.
        assert_eq!(
            index.resolve(date(2025, 3, 5)),
            Resolution::Found {
                file_name: "5 Mar.pdf".to_string()
            }
        );
    }

    #[test]
    fn test_load_returns_exact_bytes() {
        let dir = dir_with(&["5 Mar.pdf"]);
        let index = AttachmentIndex::build(dir.path()).unwrap();
        match index.load(date(2024, 3, 5)) {
            AttachmentState::Loaded(att) => {
                assert_eq!(att.file_name, "5 Mar.pdf");
                assert_eq!(att.bytes, b"%PDF 5 Mar.pdf");
                assert_eq!(att.content_type(), "application/pdf");
            }
            other => panic!("expected Loaded, got {other:?}"),
        }
    }

    #[test]
    fn test_load_not_found_is_terminal_not_error() {
        let dir = dir_with(&["5 Mar.pdf"]);
        let index = AttachmentIndex::build(dir.path()).unwrap();
        assert_eq!(index.load(date(2024, 3, 6)), AttachmentState::NotFound);
    }

    #[test]
    fn test_load_read_failure_is_local() {
        let dir = dir_with(&["5 Mar.pdf"]);
        let index = AttachmentIndex::build(dir.path()).unwrap();
        // Resolution is pinned to the scan-time listing; a file removed
        // afterwards fails the read, not the resolution.
        std::fs::remove_file(dir.path().join("5 Mar.pdf")).unwrap();
        match index.load(date(2024, 3, 5)) {
            AttachmentState::ReadFailed { file_name, .. } => {
                assert_eq!(file_name, "5 Mar.pdf");
            }
            other => panic!("expected ReadFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_directory_fails_build() {
        assert!(AttachmentIndex::build(Path::new("/nonexistent/pdfs")).is_err());
    }
}
