//! Shared test helpers for integration tests.

#![allow(dead_code)]

/// Builds a pandoc JSON document from raw `meta` and `blocks` JSON.
pub fn document_json(meta: &str, blocks: &str) -> String {
    format!(
        r#"{{"pandoc-api-version": [1, 23, 1], "meta": {}, "blocks": {}}}"#,
        meta, blocks
    )
}

/// JSON for an author-in-text `Cite` of `key` rendered as `[1]`.
pub fn citet_json(key: &str) -> String {
    cite_json(key, "AuthorInText")
}

/// JSON for a `Cite` of `key` in the given citation mode.
pub fn cite_json(key: &str, mode: &str) -> String {
    format!(
        r#"{{"t": "Cite", "c": [[{{"citationId": "{}", "citationPrefix": [], "citationSuffix": [], "citationMode": {{"t": "{}"}}, "citationNoteNum": 1, "citationHash": 0}}], [{{"t": "Str", "c": "[1]"}}]]}}"#,
        key, mode
    )
}

/// ACM rights block as it appears in an `acmart` preamble.
pub const ACM_PREAMBLE: &str = r"\documentclass[sigconf]{acmart}
\copyrightyear{2023}
\acmYear{2023}
\acmDOI{10.1145/3600006.3613138}
\acmConference[SOSP '23]{ACM SIGOPS 29th Symposium on Operating Systems Principles}{October 23--26, 2023}{Koblenz, Germany}
\acmBooktitle{ACM SIGOPS 29th Symposium on Operating Systems Principles (SOSP '23), October 23--26, 2023, Koblenz, Germany}
";
