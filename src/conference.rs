//! ACM venue metadata embedded as LaTeX commands.
//!
//! Recognizes a fixed set of `acmart` commands as literal text shapes:
//! `\acmConference[short]{full}{dates}{location}`, `\acmDOI{..}`,
//! `\acmYear{..}`, `\copyrightyear{..}` and `\acmBooktitle{..}`.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::diagnostics::Diagnostic;

/// Conventional main-document file names, tried in this order.
pub const DEFAULT_MAIN_FILES: &[&str] = &["00_main.tex", "main.tex", "paper.tex"];

static CONFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\acmConference\[([^\]]+)\]\{([^}]+)\}\{([^}]+)\}\{([^}]+)\}")
        .expect("conference pattern is valid")
});
static DOI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\acmDOI\{([^}]+)\}").expect("DOI pattern is valid"));
static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\acmYear\{(\d+)\}").expect("year pattern is valid"));
static COPYRIGHT_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\copyrightyear\{(\d+)\}").expect("copyright year pattern is valid")
});
static BOOK_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\acmBooktitle\{([^}]+)\}").expect("book title pattern is valid")
});

/// Venue metadata accumulated from every scanned source.
///
/// Fields are set independently; a later match overwrites the same field
/// and leaves the others alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConferenceInfo {
    pub short_name: Option<String>,
    pub full_name: Option<String>,
    pub dates: Option<String>,
    pub location: Option<String>,
    /// `"<full_name> (<short_name>), <dates>, <location>"`.
    pub full_citation: Option<String>,
    pub doi: Option<String>,
    pub year: Option<String>,
    pub copyright_year: Option<String>,
    pub book_title: Option<String>,
}

impl ConferenceInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field has been set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Scans `text` for every known command and records what matches.
    ///
    /// Each command is looked for independently, using its first
    /// occurrence. Returns true if at least one command matched.
    pub fn scan(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        let mut found = false;

        if let Some(caps) = CONFERENCE_RE.captures(text) {
            let (short, full, dates, location) = (&caps[1], &caps[2], &caps[3], &caps[4]);
            self.full_citation = Some(format!("{} ({}), {}, {}", full, short, dates, location));
            self.short_name = Some(short.to_string());
            self.full_name = Some(full.to_string());
            self.dates = Some(dates.to_string());
            self.location = Some(location.to_string());
            found = true;
        }

        for (re, field) in [
            (&*DOI_RE, &mut self.doi),
            (&*YEAR_RE, &mut self.year),
            (&*COPYRIGHT_YEAR_RE, &mut self.copyright_year),
            (&*BOOK_TITLE_RE, &mut self.book_title),
        ] {
            if let Some(caps) = re.captures(text) {
                *field = Some(caps[1].to_string());
                found = true;
            }
        }

        if found {
            debug!(info = ?self, "conference metadata matched");
        }
        found
    }

    /// Scans the first readable main-document candidate under `dir`.
    ///
    /// Candidates are tried in order. A file that exists but cannot be read
    /// is reported and skipped. Searching stops at the first file in which
    /// something matched, even if fields remain unset. Returns the file that
    /// matched, if any.
    pub fn scan_main_files<S: AsRef<str>>(
        &mut self,
        dir: &Path,
        candidates: &[S],
    ) -> (Option<PathBuf>, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();

        for candidate in candidates {
            let path = dir.join(candidate.as_ref());
            if !path.exists() {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(content) => {
                    if self.scan(&content) {
                        debug!(path = %path.display(), "conference metadata found in main file");
                        return (Some(path), diagnostics);
                    }
                }
                Err(source) => {
                    debug!(path = %path.display(), error = %source, "unreadable main file");
                    diagnostics.push(Diagnostic::MainFileUnreadable { path, source });
                }
            }
        }

        (None, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ACM_PREAMBLE: &str = r"\documentclass[sigconf]{acmart}
\copyrightyear{2023}
\acmYear{2023}
\acmDOI{10.1145/3600006.3613138}
\acmConference[SOSP '23]{ACM SIGOPS 29th Symposium on Operating Systems Principles}{October 23--26, 2023}{Koblenz, Germany}
\acmBooktitle{ACM SIGOPS 29th Symposium on Operating Systems Principles (SOSP '23), October 23--26, 2023, Koblenz, Germany}
";

    #[test]
    fn test_scan_full_preamble() {
        // Given: a complete acmart rights block
        let mut info = ConferenceInfo::new();

        // When: we scan it
        let found = info.scan(ACM_PREAMBLE);

        // Then: every field is populated
        assert!(found);
        assert_eq!(info.short_name.as_deref(), Some("SOSP '23"));
        assert_eq!(
            info.full_name.as_deref(),
            Some("ACM SIGOPS 29th Symposium on Operating Systems Principles")
        );
        assert_eq!(info.dates.as_deref(), Some("October 23--26, 2023"));
        assert_eq!(info.location.as_deref(), Some("Koblenz, Germany"));
        assert_eq!(
            info.full_citation.as_deref(),
            Some("ACM SIGOPS 29th Symposium on Operating Systems Principles (SOSP '23), October 23--26, 2023, Koblenz, Germany")
        );
        assert_eq!(info.doi.as_deref(), Some("10.1145/3600006.3613138"));
        assert_eq!(info.year.as_deref(), Some("2023"));
        assert_eq!(info.copyright_year.as_deref(), Some("2023"));
        assert!(info.book_title.as_deref().unwrap().starts_with("ACM SIGOPS"));
    }

    #[test]
    fn test_scan_nothing_matches() {
        let mut info = ConferenceInfo::new();

        assert!(!info.scan(r"\section{Introduction} plain text"));
        assert!(!info.scan(""));
        assert!(info.is_empty());
    }

    #[test]
    fn test_scan_single_command() {
        let mut info = ConferenceInfo::new();

        assert!(info.scan(r"\acmDOI{10.1145/xyz}"));
        assert_eq!(info.doi.as_deref(), Some("10.1145/xyz"));
        assert_eq!(info.year, None);
        assert!(!info.is_empty());
    }

    #[test]
    fn test_scan_year_requires_digits() {
        let mut info = ConferenceInfo::new();

        assert!(!info.scan(r"\acmYear{twenty}"));
        assert!(!info.scan(r"\copyrightyear{}"));
        assert_eq!(info.year, None);
        assert_eq!(info.copyright_year, None);
    }

    #[test]
    fn test_scan_uses_first_occurrence() {
        let mut info = ConferenceInfo::new();

        info.scan(r"\acmYear{2021} \acmYear{2022}");

        assert_eq!(info.year.as_deref(), Some("2021"));
    }

    #[test]
    fn test_scan_twice_is_idempotent() {
        // Given: the same text scanned once and twice
        let mut once = ConferenceInfo::new();
        once.scan(ACM_PREAMBLE);
        let mut twice = ConferenceInfo::new();
        twice.scan(ACM_PREAMBLE);
        twice.scan(ACM_PREAMBLE);

        // Then: the field sets are identical
        assert_eq!(once, twice);
    }

    #[test]
    fn test_later_scan_overwrites_only_its_fields() {
        // Given: info populated from a preamble
        let mut info = ConferenceInfo::new();
        info.scan(ACM_PREAMBLE);

        // When: a later fragment declares a different conference
        info.scan(r"\acmConference[PLDI '24]{Programming Language Design and Implementation}{June 2024}{Copenhagen}");

        // Then: conference fields change, unrelated fields stay
        assert_eq!(info.short_name.as_deref(), Some("PLDI '24"));
        assert_eq!(
            info.full_citation.as_deref(),
            Some("Programming Language Design and Implementation (PLDI '24), June 2024, Copenhagen")
        );
        assert_eq!(info.doi.as_deref(), Some("10.1145/3600006.3613138"));
        assert_eq!(info.year.as_deref(), Some("2023"));
    }

    #[test]
    fn test_conference_requires_all_arguments() {
        let mut info = ConferenceInfo::new();

        assert!(!info.scan(r"\acmConference{Full}{Dates}{Place}"));
        assert!(!info.scan(r"\acmConference[]{Full}{Dates}{Place}"));
        assert_eq!(info.full_citation, None);
    }

    // --- Tests for scan_main_files ---

    #[test]
    fn test_main_files_first_match_stops_search() {
        // Given: two candidates that both declare a DOI
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.tex"), r"\acmDOI{10.1/main}").unwrap();
        fs::write(dir.path().join("paper.tex"), r"\acmDOI{10.1/paper} \acmYear{2020}").unwrap();

        // When: we scan the default candidates
        let mut info = ConferenceInfo::new();
        let (matched, diagnostics) = info.scan_main_files(dir.path(), DEFAULT_MAIN_FILES);

        // Then: only main.tex is used, even though paper.tex has a year
        assert_eq!(matched, Some(dir.path().join("main.tex")));
        assert!(diagnostics.is_empty());
        assert_eq!(info.doi.as_deref(), Some("10.1/main"));
        assert_eq!(info.year, None);
    }

    #[test]
    fn test_main_files_continue_past_file_without_matches() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("00_main.tex"), r"\input{body}").unwrap();
        fs::write(dir.path().join("paper.tex"), r"\acmYear{2019}").unwrap();

        let mut info = ConferenceInfo::new();
        let (matched, _) = info.scan_main_files(dir.path(), DEFAULT_MAIN_FILES);

        assert_eq!(matched, Some(dir.path().join("paper.tex")));
        assert_eq!(info.year.as_deref(), Some("2019"));
    }

    #[test]
    fn test_main_files_unreadable_candidate_is_skipped() {
        // Given: a non-UTF-8 00_main.tex and a valid main.tex
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("00_main.tex"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        fs::write(dir.path().join("main.tex"), r"\acmBooktitle{Proceedings}").unwrap();

        // When: we scan the default candidates
        let mut info = ConferenceInfo::new();
        let (matched, diagnostics) = info.scan_main_files(dir.path(), DEFAULT_MAIN_FILES);

        // Then: the unreadable file is reported and the next one is used
        assert_eq!(matched, Some(dir.path().join("main.tex")));
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0], Diagnostic::MainFileUnreadable { .. }));
        assert_eq!(info.book_title.as_deref(), Some("Proceedings"));
    }

    #[test]
    fn test_main_files_none_present() {
        let dir = TempDir::new().unwrap();

        let mut info = ConferenceInfo::new();
        let (matched, diagnostics) = info.scan_main_files(dir.path(), DEFAULT_MAIN_FILES);

        assert_eq!(matched, None);
        assert!(diagnostics.is_empty());
        assert!(info.is_empty());
    }
}
