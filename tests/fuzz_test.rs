//! Randomized tests for identifier parsing, search filtering and intent
//! extraction.
//!
//! Inputs are random and edge-case strings; the properties checked are the
//! ones every caller relies on (no panics, consistent filtering).

use async_trait::async_trait;
use catalog_mcp_server::agent::{Intent, IntentExtractor, KeywordExtractor};
use catalog_mcp_server::catalog::NamespaceBrowser;
use catalog_mcp_server::catalog::search::{list_schema_refs, search_by_column, search_by_name};
use catalog_mcp_server::error::{CatalogError, CatalogResult};
use catalog_mcp_server::models::{
    ColumnDescriptor, SchemaRef, TableDescriptor, contains_ignore_case,
};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, BTreeSet};
use tokio_test::block_on;

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn edge_case_strings() -> Vec<String> {
    vec![
        String::new(),
        " ".to_string(),
        ".".to_string(),
        "..".to_string(),
        "a.".to_string(),
        ".b".to_string(),
        "a..b".to_string(),
        "a.b.c".to_string(),
        "\n\r\t".to_string(),
        "\0".to_string(),
        "üñí.çødé".to_string(),
        "'; DROP TABLE orders--".to_string(),
        "../../etc/passwd".to_string(),
        "%2e%2e".to_string(),
        "a".repeat(10_000),
        random_string(100),
    ]
}

#[test]
fn fuzz_schema_ref_parse() {
    let mut inputs = edge_case_strings();
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let parts = rng.gen_range(0..5);
        let segments: Vec<String> = (0..parts)
            .map(|_| random_string(rng.gen_range(0..6)))
            .collect();
        inputs.push(segments.join("."));
    }

    for input in inputs {
        let parts: Vec<&str> = input.split('.').collect();
        let valid = parts.len() == 2 && parts.iter().all(|p| !p.is_empty());
        match SchemaRef::parse(&input) {
            Ok(schema) => {
                assert!(valid, "accepted {input:?}");
                assert_eq!(schema.to_string(), input);
            }
            Err(err) => {
                assert!(!valid, "rejected {input:?}");
                assert!(matches!(err, CatalogError::InvalidIdentifier { .. }));
            }
        }
    }
}

/// Random in-memory namespace; catalogs listed in `broken` fail to list schemas.
struct RandomNamespace {
    tables: BTreeMap<SchemaRef, Vec<TableDescriptor>>,
    broken: Vec<String>,
}

impl RandomNamespace {
    fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut tables = BTreeMap::new();
        let mut broken = Vec::new();
        for c in 0..rng.gen_range(1..4) {
            let catalog = format!("cat{}", c);
            if rng.gen_bool(0.25) {
                broken.push(catalog.clone());
            }
            for s in 0..rng.gen_range(1..4) {
                let schema = SchemaRef::new(catalog.as_str(), format!("sch{}", s));
                let list = (0..rng.gen_range(0..5))
                    .map(|t| {
                        let columns = (0..rng.gen_range(0..4))
                            .map(|_| ColumnDescriptor::new(random_string(4), "string"))
                            .collect();
                        TableDescriptor::new(format!("t{}_{}", t, random_string(3)), schema.to_string())
                            .with_columns(columns)
                    })
                    .collect();
                tables.insert(schema, list);
            }
        }
        Self { tables, broken }
    }

    fn healthy(&self) -> impl Iterator<Item = (&SchemaRef, &Vec<TableDescriptor>)> {
        self.tables
            .iter()
            .filter(|(schema, _)| !self.broken.contains(&schema.catalog))
    }

    /// A pattern that is sometimes a substring of a real name.
    fn pattern(&self) -> String {
        let mut rng = rand::thread_rng();
        let names: Vec<&str> = self
            .tables
            .values()
            .flatten()
            .flat_map(|t| std::iter::once(t.name.as_str()).chain(t.columns.iter().map(|c| c.name.as_str())))
            .collect();
        match names.choose(&mut rng) {
            Some(name) if rng.gen_bool(0.7) => {
                let start = rng.gen_range(0..name.len());
                let end = rng.gen_range(start + 1..=name.len());
                name[start..end].to_uppercase()
            }
            _ => random_string(2),
        }
    }
}

#[async_trait]
impl NamespaceBrowser for RandomNamespace {
    async fn catalogs(&self) -> CatalogResult<Vec<String>> {
        let mut catalogs: Vec<String> = self.tables.keys().map(|s| s.catalog.clone()).collect();
        catalogs.dedup();
        Ok(catalogs)
    }

    async fn schemas(&self, catalog: &str) -> CatalogResult<Vec<String>> {
        if self.broken.iter().any(|b| b == catalog) {
            return Err(CatalogError::unavailable("boom", "retry"));
        }
        Ok(self
            .tables
            .keys()
            .filter(|s| s.catalog == catalog)
            .map(|s| s.schema.clone())
            .collect())
    }

    async fn tables(&self, schema: &SchemaRef) -> CatalogResult<Vec<String>> {
        Ok(self.tables[schema].iter().map(|t| t.name.clone()).collect())
    }

    async fn table(&self, schema: &SchemaRef, table: &str) -> CatalogResult<TableDescriptor> {
        self.tables[schema]
            .iter()
            .find(|t| t.name == table)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(table, "missing"))
    }
}

#[tokio::test]
async fn fuzz_search_matches_brute_force() {
    for _ in 0..100 {
        let namespace = RandomNamespace::generate();
        for tables in namespace.tables.values() {
            let names: BTreeSet<&str> =
                tables.iter().map(|t| t.name.as_str()).collect();
            assert_eq!(names.len(), tables.len(), "table names repeat within a schema");
        }
        let pattern = namespace.pattern();

        let expected_names: Vec<(String, String)> = namespace
            .healthy()
            .flat_map(|(schema, tables)| {
                tables
                    .iter()
                    .filter(|t| contains_ignore_case(&t.name, &pattern))
                    .map(move |t| (schema.to_string(), t.name.clone()))
            })
            .collect();
        let found: Vec<(String, String)> = search_by_name(&namespace, &pattern)
            .await
            .unwrap()
            .into_iter()
            .map(|m| (m.database, m.table))
            .collect();
        assert_eq!(found, expected_names, "pattern {pattern:?}");

        let by_column = search_by_column(&namespace, &pattern).await.unwrap();
        let expected_tables = namespace
            .healthy()
            .flat_map(|(_, tables)| tables)
            .filter(|t| t.columns.iter().any(|c| contains_ignore_case(&c.name, &pattern)))
            .count();
        assert_eq!(by_column.len(), expected_tables, "pattern {pattern:?}");
        for hit in &by_column {
            let columns = hit.matching_columns.as_ref().unwrap();
            assert!(!columns.is_empty());
            assert!(columns.iter().all(|c| contains_ignore_case(c, &pattern)));
        }

        let listed = list_schema_refs(&namespace).await;
        assert_eq!(listed.is_err(), !namespace.broken.is_empty());
    }
}

#[test]
fn fuzz_keyword_extractor_never_fails() {
    let extractor = KeywordExtractor::new();
    let mut inputs = edge_case_strings();
    let words = [
        "list", "tables", "databases", "in", "glue", "unity", "describe", "columns", "named",
        "find", "'", "\"", "`", "sales.orders", "with", "column", "the", "of", "?",
    ];
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let len = rng.gen_range(0..8);
        let sentence: Vec<&str> = (0..len).map(|_| *words.choose(&mut rng).unwrap()).collect();
        inputs.push(sentence.join(" "));
    }

    for input in inputs {
        let parsed = block_on(extractor.extract(&input)).unwrap();
        // Any pattern or name the rules pull out is non-blank.
        let slots: Vec<String> = match parsed.intent {
            Intent::ListTables { database } => vec![database],
            Intent::TableDetails { database, table } => {
                vec![database, table]
            }
            Intent::SearchByName { pattern }
            | Intent::SearchByColumn { pattern } => vec![pattern],
            _ => Vec::new(),
        };
        assert!(slots.iter().all(|s| !s.trim().is_empty()), "{input:?}");
    }
}
