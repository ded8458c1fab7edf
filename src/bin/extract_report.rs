use std::path::PathBuf;

use anyhow::{Result, anyhow};

use nba_predictor::config::AppConfig;
use nba_predictor::stats::Metric;
use nba_predictor::{extract, logging, persist};

fn main() -> Result<()> {
    logging::init_stderr();
    let cfg = AppConfig::from_env();

    let input = path_arg("--input")
        .or_else(|| cfg.report_path.clone())
        .ok_or_else(|| anyhow!("usage: extract_report --input <report.pdf|report.txt> [--out <catalog.json>]"))?;
    let raw = extract::read_document_text(&input)?;

    let report = extract::extract_report(&raw);
    println!("Report: {}", input.display());
    println!("Rows matched: {}", report.rows_matched);
    println!("Rows skipped: {}", report.rows_skipped);
    println!("Teams parsed: {}", report.catalog.len());
    for (team, record) in &report.catalog {
        println!(
            "  {:<26} OffRtg={} DefRtg={} PACE={}",
            team,
            record.get(Metric::OffRtg),
            record.get(Metric::DefRtg),
            record.get(Metric::Pace)
        );
    }

    if report.catalog.is_empty() {
        return Err(anyhow!("failed to extract team stats from report"));
    }

    let out = path_arg("--out").or_else(|| cfg.data_dir.as_deref().map(persist::catalog_path));
    if let Some(out) = out {
        persist::save_catalog(&out, &report.catalog)?;
        println!("Saved: {}", out.display());
    }
    Ok(())
}

fn path_arg(flag: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
