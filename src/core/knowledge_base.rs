//! The technology vocabulary: the fixed table of keywords the fingerprint
//! probe is allowed to report, each tagged with a category.
//! Keeping it as data means new keywords never touch probe logic.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// High-level grouping of a technology keyword.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TechCategory {
    Cms,
    Framework,
    Library,
    Markup,
    Language,
    Database,
}

/// One vocabulary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub keyword: String,
    pub category: TechCategory,
}

/// Built-in table used when no vocabulary file is configured.
static BUILTIN: &[(&str, TechCategory)] = &[
    ("wordpress", TechCategory::Cms),
    ("joomla", TechCategory::Cms),
    ("drupal", TechCategory::Cms),
    ("laravel", TechCategory::Framework),
    ("django", TechCategory::Framework),
    ("angular", TechCategory::Framework),
    ("react", TechCategory::Framework),
    ("vue", TechCategory::Framework),
    ("jquery", TechCategory::Library),
    ("html", TechCategory::Markup),
    ("css", TechCategory::Markup),
    ("php", TechCategory::Language),
    ("javascript", TechCategory::Language),
    ("python", TechCategory::Language),
    ("c+", TechCategory::Language),
    ("c#", TechCategory::Language),
    ("sqlite", TechCategory::Database),
    ("mysql", TechCategory::Database),
    ("oracle", TechCategory::Database),
];

/// A normalized keyword table. Keywords are lowercase and unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Vocabulary {
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN.iter().map(|(keyword, category)| VocabularyEntry {
            keyword: keyword.to_string(),
            category: *category,
        }))
    }

    /// Builds a table from arbitrary rows: keywords are trimmed and
    /// lowercased, blanks dropped, and the first row for a keyword wins.
    pub fn from_entries(entries: impl IntoIterator<Item = VocabularyEntry>) -> Self {
        let mut normalized: Vec<VocabularyEntry> = Vec::new();
        for entry in entries {
            let keyword = entry.keyword.trim().to_lowercase();
            if keyword.is_empty() || normalized.iter().any(|e| e.keyword == keyword) {
                continue;
            }
            normalized.push(VocabularyEntry { keyword, category: entry.category });
        }
        Self { entries: normalized }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact, case-insensitive lookup of a single token.
    pub fn lookup(&self, token: &str) -> Option<&VocabularyEntry> {
        let token = token.trim().to_lowercase();
        self.entries.iter().find(|e| e.keyword == token)
    }

    /// Every keyword that occurs in `text` as a standalone word.
    ///
    /// Matching is plain substring search over the lowercased text; a hit
    /// counts only when the characters on either side are not ASCII
    /// alphanumeric, so `react` does not fire on `unreachable`.
    pub fn keywords_in(&self, text: &str) -> Vec<&VocabularyEntry> {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .filter(|e| occurs_as_word(&haystack, &e.keyword))
            .collect()
    }
}

fn occurs_as_word(haystack: &str, keyword: &str) -> bool {
    let bytes = haystack.as_bytes();
    haystack.match_indices(keyword).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        before_ok && after_ok
    })
}
