//! Fixture corpus builders.

use std::path::Path;

/// Render one skill document with frontmatter and a stub body.
///
/// `metadata` lines are emitted verbatim under the `metadata:` key, e.g.
/// `&["category: devops", "tags: [proxy, web server]"]`.
#[must_use]
pub fn skill_doc(name: &str, description: &str, metadata: &[&str]) -> String {
    let mut doc = String::new();
    doc.push_str("---\n");
    doc.push_str(&format!("name: {name}\n"));
    doc.push_str(&format!("description: '{description}'\n"));
    if !metadata.is_empty() {
        doc.push_str("metadata:\n");
        for line in metadata {
            doc.push_str(&format!("  {line}\n"));
        }
    }
    doc.push_str("---\n\n# Instructions\n\nOpaque to the engine.\n");
    doc
}

/// Write `(file_name, content)` pairs into `dir`.
pub fn write_corpus<S: AsRef<str>>(dir: &Path, files: &[(&str, S)]) -> std::io::Result<()> {
    for (name, content) in files {
        std::fs::write(dir.join(name), content.as_ref())?;
    }
    Ok(())
}

/// A small corpus mirroring the real one's shape: overlapping database
/// skills, two image-processing near-duplicates, one skill with distinct
/// trigger phrases, one with none.
#[must_use]
pub fn sample_corpus() -> Vec<(&'static str, String)> {
    vec![
        (
            "nginx.md",
            skill_doc(
                "nginx",
                "Web server and reverse proxy configuration. \
                 Trigger words: nginx, reverse proxy, load balancer",
                &["category: devops", "tags: [web server, proxy]", "version: 1.0.0"],
            ),
        ),
        (
            "hono.md",
            skill_doc(
                "hono",
                "Lightweight web framework for building APIs. \
                 Trigger words: hono, web framework",
                &["category: development", "tags: [web framework, api]"],
            ),
        ),
        (
            "mysql.md",
            skill_doc(
                "mysql",
                "Relational database administration. Trigger words: mysql, database",
                &["category: data-ai", "tags: [database, sql]", "version: 2.1.0"],
            ),
        ),
        (
            "postgresql.md",
            skill_doc(
                "postgresql",
                "Relational database with advanced features. \
                 Trigger words: postgresql, postgres, database",
                &["category: data-ai", "tags: [database, sql]", "version: 1.4.0"],
            ),
        ),
        (
            "sharp.md",
            skill_doc(
                "sharp",
                "Fast image processing in Node. Trigger words: sharp, resize image",
                &["category: development", "tags: [images]"],
            ),
        ),
        (
            "sharp-image.md",
            skill_doc(
                "Sharp Image",
                "Image transformation pipelines. Trigger words: sharp image, resize image",
                &["category: development", "tags: [images]", "version: 0.3.0"],
            ),
        ),
    ]
}
