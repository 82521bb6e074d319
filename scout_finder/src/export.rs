// Candidate lists as headerless CSV. The first column is always an openable profile URL,
// which is all the companion opener reads.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use scout_core::{AccountCollection, Result};
use scout_util::profile_url;

pub fn base_csv_path(dir: &Path, operator: &str, target: &str) -> PathBuf {
    dir.join(format!("{}-{}-base.csv", operator, target))
}

pub fn mutuals_csv_path(dir: &Path, operator: &str, target: &str) -> PathBuf {
    dir.join(format!("{}-{}-mutuals.csv", operator, target))
}

/// Rows of `url,handle` for every filtered candidate.
pub async fn write_base_csv(path: &Path, candidates: &AccountCollection) -> Result<()> {
    let rows = candidates.handles().map(|handle| vec![profile_url(handle), handle.to_string()]);
    write_rows(path, rows).await
}

/// Rows of `url,handle,mutuals` for every good candidate.
pub async fn write_mutuals_csv(path: &Path, good: &IndexMap<String, usize>) -> Result<()> {
    let rows = good
        .iter()
        .map(|(handle, mutuals)| vec![profile_url(handle), handle.clone(), mutuals.to_string()]);
    write_rows(path, rows).await
}

/// First-column URLs of an exported list, in file order.
pub async fn read_profile_urls(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_rows(&content)
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .map(|field| field.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect())
}

/// Split CSV content into rows of fields, undoing [`escape`].
fn parse_rows(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            c => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

async fn write_rows(path: &Path, rows: impl Iterator<Item = Vec<String>>) -> Result<()> {
    let mut content = String::new();
    for row in rows {
        let fields: Vec<String> = row.iter().map(|f| escape(f)).collect();
        content.push_str(&fields.join(","));
        content.push_str("\r\n");
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
