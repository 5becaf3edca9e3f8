// src/pipeline/report.rs

//! Report rendering and output.

use std::collections::HashMap;
use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{OutputConfig, PageReport, ReportFormat, VisitRecord};

/// Ledger rows ordered by count descending, then URL ascending.
pub fn sort_pages(pages: HashMap<String, VisitRecord>) -> Vec<PageReport> {
    let mut rows: Vec<PageReport> = pages
        .into_iter()
        .map(|(url, record)| PageReport::new(url, record))
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.url.cmp(&b.url)));
    rows
}

/// Plain-text report with a banner naming the seed.
pub fn render_text(seed: &str, rows: &[PageReport]) -> String {
    let rule = "=============================";
    let mut out = format!("{rule}\n  REPORT for {seed}\n{rule}\n");
    for row in rows {
        out.push_str(&format!(
            "Found {} internal links to {}\n",
            row.count, row.url
        ));
    }
    out
}

pub fn render_json(rows: &[PageReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Render `rows` in the configured format and print or save them.
pub async fn write_report(seed: &str, rows: &[PageReport], output: &OutputConfig) -> Result<()> {
    let rendered = match output.format {
        ReportFormat::Text => render_text(seed, rows),
        ReportFormat::Json => render_json(rows)?,
    };

    match &output.path {
        Some(path) => {
            write_atomic(Path::new(path), rendered.as_bytes()).await?;
            log::info!("Report saved to {}", path);
        }
        None => println!("{}", rendered.trim_end()),
    }
    Ok(())
}

/// Write bytes atomically (write to temp, then rename).
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(counts: &[(&str, usize)]) -> HashMap<String, VisitRecord> {
        counts
            .iter()
            .map(|(url, count)| {
                (
                    url.to_string(),
                    VisitRecord {
                        count: *count,
                        ..VisitRecord::default()
                    },
                )
            })
            .collect()
    }

    fn order(rows: &[PageReport]) -> Vec<(&str, usize)> {
        rows.iter().map(|r| (r.url.as_str(), r.count)).collect()
    }

    #[test]
    fn test_sort_by_count_descending() {
        let rows = sort_pages(ledger(&[
            ("url1", 5),
            ("url2", 1),
            ("url3", 3),
            ("url4", 10),
            ("url5", 7),
        ]));
        assert_eq!(
            order(&rows),
            vec![("url4", 10), ("url5", 7), ("url1", 5), ("url3", 3), ("url2", 1)]
        );
    }

    #[test]
    fn test_sort_ties_alphabetically() {
        let rows = sort_pages(ledger(&[("d", 1), ("a", 1), ("e", 1), ("b", 1), ("c", 1)]));
        assert_eq!(
            order(&rows),
            vec![("a", 1), ("b", 1), ("c", 1), ("d", 1), ("e", 1)]
        );
    }

    #[test]
    fn test_sort_count_then_url() {
        let rows = sort_pages(ledger(&[("d", 2), ("a", 1), ("e", 3), ("b", 1), ("c", 2)]));
        assert_eq!(
            order(&rows),
            vec![("e", 3), ("c", 2), ("d", 2), ("a", 1), ("b", 1)]
        );
    }

    #[test]
    fn test_sort_empty() {
        assert!(sort_pages(HashMap::new()).is_empty());
    }

    #[test]
    fn test_text_report() {
        let rows = sort_pages(ledger(&[("http://a.test", 2), ("http://a.test/b", 1)]));
        let text = render_text("http://a.test/", &rows);

        assert!(text.contains("  REPORT for http://a.test/\n"));
        assert!(text.contains("Found 2 internal links to http://a.test\n"));
        assert!(text.ends_with("Found 1 internal links to http://a.test/b\n"));
    }

    #[test]
    fn test_json_report_is_sorted_array() {
        let rows = sort_pages(ledger(&[("http://a.test/b", 1), ("http://a.test", 4)]));
        let json: serde_json::Value = serde_json::from_str(&render_json(&rows).unwrap()).unwrap();

        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["url"], "http://a.test");
        assert_eq!(items[0]["count"], 4);
    }

    #[tokio::test]
    async fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");
        let output = OutputConfig {
            format: ReportFormat::Json,
            path: Some(path.to_string_lossy().into_owned()),
        };
        let rows = sort_pages(ledger(&[("http://a.test", 1)]));

        write_report("http://a.test/", &rows, &output).await.unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<PageReport> = serde_json::from_str(&saved).unwrap();
        assert_eq!(parsed, rows);
        assert!(!path.with_extension("tmp").exists());
    }
}
