use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use nba_predictor::config::AppConfig;
use nba_predictor::persist::{self, HistoryEntry};
use nba_predictor::predict::PredictionEngine;
use nba_predictor::{logging, report};

const USAGE: &str = "usage: predict_matchup [--catalog <teams_data.json>] [--save] <team 1> <team 2>";

fn main() -> Result<()> {
    logging::init_stderr();
    let cfg = AppConfig::from_env();
    let args = parse_args(std::env::args().skip(1).collect())?;

    // A missing or corrupt catalog falls back to the unknown-stats defaults.
    let catalog_path = args
        .catalog
        .or_else(|| cfg.data_dir.as_deref().map(persist::catalog_path))
        .context("unable to resolve catalog path")?;
    let catalog = persist::load_catalog(&catalog_path);

    let engine = PredictionEngine::new(cfg.simulation());
    let result = engine.predict_from_catalog(&catalog, &args.team1, &args.team2)?;
    let text = report::format_result(&result);
    println!("{text}");

    if args.save {
        let history_path = cfg
            .data_dir
            .as_deref()
            .map(persist::history_path)
            .context("unable to resolve history path")?;
        persist::append_history(
            &history_path,
            HistoryEntry {
                team1: result.team1,
                team2: result.team2,
                result: text,
            },
        )?;
    }
    Ok(())
}

struct Args {
    catalog: Option<PathBuf>,
    save: bool,
    team1: String,
    team2: String,
}

fn parse_args(raw: Vec<String>) -> Result<Args> {
    let mut catalog = None;
    let mut save = false;
    let mut teams = Vec::new();
    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        if let Some(path) = arg.strip_prefix("--catalog=") {
            catalog = Some(PathBuf::from(path.trim()));
        } else if arg == "--catalog" {
            catalog = iter.next().map(PathBuf::from);
        } else if arg == "--save" {
            save = true;
        } else {
            teams.push(arg);
        }
    }
    let [team1, team2]: [String; 2] = teams.try_into().map_err(|_| anyhow!(USAGE))?;
    Ok(Args {
        catalog,
        save,
        team1,
        team2,
    })
}
