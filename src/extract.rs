use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::stats::{Metric, StatRecord, StatValue, TeamsCatalog};

const TITLE_PHRASE: &str = "NBA Advanced Team Stats";

// Title block up to the `#` that opens the column header line.
static BOILERPLATE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(&format!(r"(?s){}.*?\n#", regex::escape(TITLE_PHRASE))).ok());

// Rank, team name, then the 19 columns in report order.
static TEAM_ROW: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(concat!(
        r"(\d+)\s+([A-Za-z .]+)\s+",
        r"(\d+)\s+(\d+)\s+(\d+)\s+([\d.]+)\s+",
        r"([\d.]+)\s+([\d.-]+)\s+",
        r"([\d.-]+)\s+([\d.]+)\s+([\d.]+)\s+",
        r"([\d.]+)\s+([\d.]+)\s+([\d.]+)\s+",
        r"([\d.]+)\s+([\d.]+)\s+([\d.]+)\s+",
        r"([\d.]+)\s+([\d.]+)\s+([\d.]+)\s+([\d.]+)",
    ))
    .ok()
});

// Rank and name of another row on the same line.
static NEXT_ROW: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[ \t]+\d+[ \t]+[A-Za-z]").ok());

#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("team name is blank")]
    BlankTeamName,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    pub catalog: TeamsCatalog,
    pub rows_matched: usize,
    pub rows_skipped: usize,
}

/// Parses the concatenated page text of an advanced team stats report.
///
/// Never fails: rows the pattern does not recognise are absent, rows that
/// match but cannot be converted are logged and skipped.
pub fn extract_team_stats(text: &str) -> TeamsCatalog {
    extract_report(text).catalog
}

/// Reads a report from disk, PDF or plain text by extension. An unreadable
/// document yields an empty catalog.
pub fn extract_team_stats_from_path(path: &Path) -> TeamsCatalog {
    match read_document_text(path) {
        Ok(text) => extract_team_stats(&text),
        Err(err) => {
            tracing::error!(path = %path.display(), "report extraction failed: {err:#}");
            TeamsCatalog::new()
        }
    }
}

pub fn extract_team_stats_from_pdf(path: &Path) -> TeamsCatalog {
    match read_pdf_text(path) {
        Ok(text) => extract_team_stats(&text),
        Err(err) => {
            tracing::error!(path = %path.display(), "pdf extraction failed: {err:#}");
            TeamsCatalog::new()
        }
    }
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

pub fn read_document_text(path: &Path) -> Result<String> {
    if is_pdf(path) {
        return read_pdf_text(path);
    }
    fs::read_to_string(path).with_context(|| format!("read report {}", path.display()))
}

/// Text of every page in page order, joined with newlines.
pub fn read_pdf_text(path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path)
        .with_context(|| format!("open pdf {}", path.display()))?;
    let mut pages = Vec::new();
    for number in doc.get_pages().into_keys() {
        let text = doc
            .extract_text(&[number])
            .with_context(|| format!("extract text from page {number}"))?;
        pages.push(text);
    }
    Ok(pages.join("\n"))
}

pub fn extract_report(text: &str) -> ExtractReport {
    let Some(row_re) = TEAM_ROW.as_ref() else {
        tracing::error!("team row pattern failed to compile");
        return ExtractReport::default();
    };

    let cleaned = clean_report_text(text);
    if tracing::enabled!(tracing::Level::DEBUG) {
        let preview: String = cleaned.chars().take(1000).collect();
        tracing::debug!(%preview, "report text after cleanup");
    }

    let mut report = ExtractReport::default();
    let mut pos = 0;
    while let Some(caps) = row_re.captures_at(&cleaned, pos) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        if !row_ends_cleanly(&cleaned[whole.end()..]) {
            // More numeric columns follow; resume after this rank.
            pos = caps.get(1).map_or(whole.end(), |m| m.end());
            continue;
        }
        pos = whole.end();

        report.rows_matched += 1;
        match parse_row(&caps) {
            Ok((team, record)) => {
                report.catalog.insert(team, record);
            }
            Err(err) => {
                report.rows_skipped += 1;
                tracing::warn!(row = whole.as_str(), %err, "skipped malformed entry");
            }
        }
    }

    if report.rows_matched == 0 && !cleaned.trim().is_empty() {
        tracing::warn!("no team rows recognised; report layout may have changed");
    }
    tracing::debug!(
        matched = report.rows_matched,
        parsed = report.catalog.len(),
        "team rows extracted"
    );
    report
}

/// A row ends at the end of its line or where the next row's rank and name
/// begin on the same line.
fn row_ends_cleanly(rest: &str) -> bool {
    let after = rest.trim_start_matches([' ', '\t', '\r']);
    if after.is_empty() || after.starts_with('\n') {
        return true;
    }
    NEXT_ROW.as_ref().is_some_and(|re| re.is_match(rest))
}

/// Drops the title block(s) and collapses doubled newlines.
pub fn clean_report_text(text: &str) -> String {
    let stripped = match BOILERPLATE.as_ref() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    };
    stripped.replace("\n\n", "\n").trim().to_string()
}

fn parse_row(caps: &Captures<'_>) -> Result<(String, StatRecord), RowError> {
    let team = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .unwrap_or_default();
    if team.is_empty() || team.chars().all(|c| c == '.' || c.is_whitespace()) {
        return Err(RowError::BlankTeamName);
    }

    // Groups 3.. are the stat columns in report order.
    let mut record = StatRecord::unknown();
    for (metric, token) in Metric::ALL.into_iter().zip(caps.iter().skip(3).flatten()) {
        record.set(metric, parse_token(token.as_str()));
    }
    Ok((team.to_string(), record))
}

fn parse_token(token: &str) -> StatValue {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => StatValue::Number(v),
        _ => StatValue::Text(token.to_string()),
    }
}
