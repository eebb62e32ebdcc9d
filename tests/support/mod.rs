use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use target_catalog::ENTRY_FILE;

/// Route crate logs to the test writer; honours `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// The reference record used throughout the catalog's documentation.
pub fn sample_record() -> Value {
    json!({
        "name": "fastfoodhackings",
        "description": "Fast Food Hackings is a vulnerable web application that simulates a fast food restaurant. It contains multiple vulnerabilities that can be exploited for training purposes.",
        "url": "https://www.bugbountytraining.com/fastfoodhackings/",
        "technologies": ["php", "mysql", "nginx"],
        "tags": [],
        "vulnerabilities": ["xss", "sqli", "ssrf", "idor", "open-redirect"]
    })
}

pub fn lab_record(name: &str, technologies: &[&str], tags: &[&str]) -> Value {
    json!({
        "name": name,
        "description": format!("{name} training lab"),
        "url": format!("https://labs.example.com/{name}/"),
        "technologies": technologies,
        "tags": tags,
    })
}

/// Write `record` as `<root>/<rel>/index.json`.
pub fn write_entry_dir(root: &Path, rel: &str, record: &Value) -> Result<PathBuf> {
    let dir = root.join(rel);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let file = dir.join(ENTRY_FILE);
    fs::write(&file, serde_json::to_string_pretty(record)?)
        .with_context(|| format!("writing {}", file.display()))?;
    Ok(dir)
}
