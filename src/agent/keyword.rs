//! Deterministic keyword rules for intent extraction.
//!
//! Rules are checked in order; the first one that fires decides the intent:
//!
//! 1. detail words (`describe`, `details`, ...) → table details
//! 2. column words → column search, or table details when a dotted table name is given
//! 3. search words with a pattern → name search
//! 4. table words → list tables in a database
//! 5. database words → list databases
//!
//! When a rule fires but a required slot cannot be found, the result is a
//! clarification question rather than a guess.

use super::{CatalogTarget, Intent, IntentExtractor, ParsedQuery};
use crate::error::CatalogResult;
use async_trait::async_trait;

const DETAIL_WORDS: &[&str] = &["describe", "details", "detail", "structure", "definition"];
const COLUMN_WORDS: &[&str] = &["column", "columns", "field", "fields"];
const SEARCH_WORDS: &[&str] = &[
    "search", "find", "look", "named", "called", "matching", "containing", "like",
];
const TABLE_WORDS: &[&str] = &["table", "tables"];
const DATABASE_WORDS: &[&str] = &["database", "databases", "schema", "schemas"];

/// Words after which a search pattern is expected.
const PATTERN_MARKERS: &[&str] = &[
    "named", "called", "matching", "containing", "contain", "contains", "like", "for",
];
/// Words after which a table name is expected when `table` is not mentioned.
const TABLE_MARKERS: &[&str] = &["describe", "for", "of", "about"];
const DATABASE_MARKERS: &[&str] = &["in", "from"];

/// Skipped between a marker and its value.
const ARTICLES: &[&str] = &["a", "an", "the", "any", "some", "all"];

/// Never a slot value.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "any", "some", "all", "in", "from", "of", "for", "about", "with", "on",
    "to", "and", "or", "me", "my", "our", "us", "i", "you", "what", "which", "who", "where",
    "how", "is", "are", "do", "does", "have", "has", "there", "show", "list", "get", "give",
    "tell", "find", "search", "look", "describe", "detail", "details", "named", "called",
    "like", "matching", "containing", "contain", "contains", "please", "can", "could",
    "would", "available", "exist", "exists", "its", "their", "that", "this", "table",
    "tables", "database", "databases", "schema", "schemas", "column", "columns", "field",
    "fields", "name", "names", "catalog", "catalogs", "unity", "databricks", "glue", "aws",
    "both", "structure", "definition",
];

const ASK_DATABASE: &str = "Which database should I list tables from? For Unity use \
     'catalog_name.schema_name'; for Glue use the database name.";
const ASK_TABLE: &str = "Which table would you like details for? Please give it as \
     'database.table' (Glue) or 'catalog.schema.table' (Unity).";
const ASK_NAME_PATTERN: &str = "What table name, or part of a name, should I search for?";
const ASK_COLUMN_PATTERN: &str = "What column name, or part of a name, should I search for?";
const ASK_GENERAL: &str = "Would you like to list databases, list the tables in a database, \
     see a table's details, or search for tables by name or column?";

/// Keyword-rule extractor. Pure and synchronous; never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Apply the rules to `query`.
    pub fn parse(&self, query: &str) -> ParsedQuery {
        ParsedQuery::new(parse_intent(query), detect_target(query))
    }
}

#[async_trait]
impl IntentExtractor for KeywordExtractor {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn extract(&self, query: &str) -> CatalogResult<ParsedQuery> {
        Ok(self.parse(query))
    }
}

/// Unity for "unity"/"databricks", Glue for "glue"/"aws"; both or neither → both.
pub fn detect_target(query: &str) -> CatalogTarget {
    let words: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    let mentions = |names: &[&str]| words.iter().any(|w| names.contains(&w.as_str()));

    match (mentions(&["unity", "databricks"]), mentions(&["glue", "aws"])) {
        (true, false) => CatalogTarget::Unity,
        (false, true) => CatalogTarget::Glue,
        _ => CatalogTarget::Both,
    }
}

/// A word of the query with punctuation trimmed from both ends.
struct Token<'a> {
    text: &'a str,
    lower: String,
}

fn tokenize(query: &str) -> Vec<Token<'_>> {
    query
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_')))
        .filter(|w| !w.is_empty())
        .map(|text| Token {
            text,
            lower: text.to_lowercase(),
        })
        .collect()
}

/// First `'...'`, `"..."` or `` `...` `` span. A quote only opens at the start
/// of a word, so apostrophes inside words are ignored.
fn quoted(query: &str) -> Option<&str> {
    let mut prev: Option<char> = None;
    for (i, c) in query.char_indices() {
        let opens = matches!(c, '\'' | '"' | '`') && prev.is_none_or(char::is_whitespace);
        if opens {
            let rest = &query[i + c.len_utf8()..];
            if let Some(end) = rest.find(c) {
                let inner = rest[..end].trim();
                if !inner.is_empty() {
                    return Some(inner);
                }
            }
        }
        prev = Some(c);
    }
    None
}

struct Words<'a> {
    tokens: Vec<Token<'a>>,
}

impl<'a> Words<'a> {
    fn new(query: &'a str) -> Self {
        Self {
            tokens: tokenize(query),
        }
    }

    fn has_any(&self, words: &[&str]) -> bool {
        self.tokens.iter().any(|t| words.contains(&t.lower.as_str()))
    }

    fn positions(&self, words: &'static [&'static str]) -> impl Iterator<Item = usize> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(_, t)| words.contains(&t.lower.as_str()))
            .map(|(i, _)| i)
    }

    fn value_at(&self, index: usize) -> Option<&'a str> {
        self.tokens
            .get(index)
            .filter(|t| !STOP_WORDS.contains(&t.lower.as_str()))
            .map(|t| t.text)
    }

    /// The value right after any marker, skipping articles.
    fn after(&self, markers: &'static [&'static str]) -> Option<&'a str> {
        self.positions(markers).find_map(|i| {
            let next = (i + 1..self.tokens.len())
                .find(|&j| !ARTICLES.contains(&self.tokens[j].lower.as_str()))?;
            self.value_at(next)
        })
    }

    /// The value right before any marker.
    fn before(&self, markers: &'static [&'static str]) -> Option<&'a str> {
        self.positions(markers)
            .find_map(|i| i.checked_sub(1).and_then(|j| self.value_at(j)))
    }

    /// First `a.b` style identifier.
    fn dotted(&self) -> Option<&'a str> {
        self.tokens
            .iter()
            .map(|t| t.text)
            .find(|t| t.contains('.') && t.split('.').all(|part| !part.is_empty()))
    }

    fn database(&self) -> Option<&'a str> {
        self.dotted()
            .or_else(|| self.after(DATABASE_WORDS))
            .or_else(|| self.before(DATABASE_WORDS))
            .or_else(|| self.after(DATABASE_MARKERS))
    }

    /// `(database, table)` from a dotted name, or from separate table and database slots.
    fn table_ref(&self) -> Option<(String, String)> {
        if let Some((database, table)) = self.dotted().and_then(|d| d.rsplit_once('.')) {
            return Some((database.to_string(), table.to_string()));
        }
        let table = self
            .before(TABLE_WORDS)
            .or_else(|| self.after(TABLE_WORDS))
            .or_else(|| self.after(TABLE_MARKERS))?;
        let database = self
            .after(DATABASE_WORDS)
            .or_else(|| self.before(DATABASE_WORDS))
            .or_else(|| self.after(DATABASE_MARKERS))
            .filter(|d| *d != table)?;
        Some((database.to_string(), table.to_string()))
    }
}

fn parse_intent(query: &str) -> Intent {
    let words = Words::new(query);
    let quoted = quoted(query);

    if words.has_any(DETAIL_WORDS) {
        return table_details(&words);
    }

    if words.has_any(COLUMN_WORDS) {
        if quoted.is_none() && words.dotted().is_some() {
            return table_details(&words);
        }
        let pattern = quoted
            .or_else(|| words.after(PATTERN_MARKERS))
            .or_else(|| words.before(COLUMN_WORDS))
            .or_else(|| words.after(COLUMN_WORDS));
        return match pattern {
            Some(pattern) => Intent::SearchByColumn {
                pattern: pattern.to_string(),
            },
            None => ambiguous(ASK_COLUMN_PATTERN),
        };
    }

    if words.has_any(SEARCH_WORDS) || quoted.is_some() {
        if let Some(pattern) = quoted.or_else(|| words.after(PATTERN_MARKERS)) {
            return Intent::SearchByName {
                pattern: pattern.to_string(),
            };
        }
        if !words.has_any(TABLE_WORDS) && !words.has_any(DATABASE_WORDS) {
            return ambiguous(ASK_NAME_PATTERN);
        }
    }

    if words.has_any(TABLE_WORDS) {
        return match words.database() {
            Some(database) => Intent::ListTables {
                database: database.to_string(),
            },
            None => ambiguous(ASK_DATABASE),
        };
    }

    if words.has_any(DATABASE_WORDS) {
        return Intent::ListDatabases;
    }

    ambiguous(ASK_GENERAL)
}

fn table_details(words: &Words<'_>) -> Intent {
    match words.table_ref() {
        Some((database, table)) => Intent::TableDetails { database, table },
        None => ambiguous(ASK_TABLE),
    }
}

fn ambiguous(question: &str) -> Intent {
    Intent::Ambiguous {
        question: question.to_string(),
    }
}
