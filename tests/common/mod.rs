//! Scenario corpora shared across integration tests.

use skillsel::test_utils::fixtures::skill_doc;

/// Four structurally identical database skills. A generic "database" query
/// has no trigger-phrase specificity to separate them, so they must come
/// back as one shortlist.
#[must_use]
pub fn database_corpus() -> Vec<(&'static str, String)> {
    ["mysql", "postgresql", "sqlite", "mongodb"]
        .into_iter()
        .map(|name| {
            let file: &'static str = match name {
                "mysql" => "mysql.md",
                "postgresql" => "postgresql.md",
                "sqlite" => "sqlite.md",
                _ => "mongodb.md",
            };
            let description =
                format!("{name} relational database. Trigger words: {name}, database");
            (
                file,
                skill_doc(name, &description, &["category: data-ai", "tags: [database]"]),
            )
        })
        .collect()
}
