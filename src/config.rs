use std::path::PathBuf;

use crate::persist;
use crate::predict::SimulationConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub sim_samples: usize,
    pub sim_seed: u64,
    pub sim_std_dev: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let sim = SimulationConfig::default();
        Self {
            data_dir: None,
            report_path: None,
            sim_samples: sim.samples,
            sim_seed: sim.seed,
            sim_std_dev: sim.std_dev,
        }
    }
}

impl AppConfig {
    /// Reads `.env.local`, `.env`, then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let data_dir = persist::data_dir_from(&lookup);
        let report_path = lookup("NBA_REPORT_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let sim_samples = lookup("NBA_SIM_SAMPLES")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults.sim_samples)
            .max(2);
        let sim_seed = lookup("NBA_SIM_SEED")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(defaults.sim_seed);
        let sim_std_dev = lookup("NBA_SIM_STDDEV")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(defaults.sim_std_dev);

        Self {
            data_dir,
            report_path,
            sim_samples,
            sim_seed,
            sim_std_dev,
        }
    }

    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            samples: self.sim_samples,
            seed: self.sim_seed,
            std_dev: self.sim_std_dev,
            ..SimulationConfig::default()
        }
    }
}
