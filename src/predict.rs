use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

use crate::stats::{Metric, PredictionResult, ScoreRange, StatRecord, TeamsCatalog};

pub const TEAM_PLACEHOLDER: &str = "Tap to select";

const TS_BASE: f64 = 58.0;
const EFG_BASE: f64 = 55.0;
const AST_BASE: f64 = 60.0;
const TOV_BASE: f64 = 15.0;
const REB_BASE: f64 = 50.0;
const PIE_BASE: f64 = 50.0;
const OFFENSE_SCALE: f64 = 0.9;

const DEFAULT_SAMPLES: usize = 5000;
const DEFAULT_STD_DEV: f64 = 8.0;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_DISPLAY_SPREAD: f64 = 16.0;

// Metrics read by the rating formula.
const FORMULA_METRICS: [Metric; 10] = [
    Metric::OffRtg,
    Metric::DefRtg,
    Metric::NetRtg,
    Metric::TsPct,
    Metric::EfgPct,
    Metric::AstPct,
    Metric::TovPct,
    Metric::RebPct,
    Metric::Pie,
    Metric::Pace,
];

#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("Please select two different teams.")]
    MissingTeam,
    #[error("Please select two different teams.")]
    PlaceholderTeam,
    #[error("Please select two different teams.")]
    SameTeam,
    #[error("Team data missing: {0}")]
    TeamDataMissing(String),
    #[error("{team} has no numeric value for {}", join_metrics(.metrics))]
    IncompleteStats { team: String, metrics: Vec<Metric> },
    #[error("invalid simulation config: {0}")]
    Simulation(String),
}

fn join_metrics(metrics: &[Metric]) -> String {
    metrics
        .iter()
        .map(|m| m.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// How stat values that are not numbers enter the rating formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionPolicy {
    /// Unknown or non-numeric values count as `0.0`. A team with no data
    /// collapses to all-zero ratings instead of being flagged.
    #[default]
    ZeroOnMissing,
    /// Fail with [`PredictionError::IncompleteStats`] instead.
    RejectMissing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub samples: usize,
    pub std_dev: f64,
    pub seed: u64,
    pub display_spread: f64,
    pub coercion: CoercionPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            std_dev: DEFAULT_STD_DEV,
            seed: DEFAULT_SEED,
            display_spread: DEFAULT_DISPLAY_SPREAD,
            coercion: CoercionPolicy::ZeroOnMissing,
        }
    }
}

/// Formula inputs after coercion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingInputs {
    pub off_rtg: f64,
    pub def_rtg: f64,
    pub net_rtg: f64,
    pub ts_pct: f64,
    pub efg_pct: f64,
    pub ast_pct: f64,
    pub tov_pct: f64,
    pub reb_pct: f64,
    pub pie: f64,
    pub pace: f64,
}

impl RatingInputs {
    pub fn coerce(
        team: &str,
        stats: &StatRecord,
        policy: CoercionPolicy,
    ) -> Result<Self, PredictionError> {
        if policy == CoercionPolicy::RejectMissing {
            let missing: Vec<Metric> = FORMULA_METRICS
                .into_iter()
                .filter(|m| stats.get(*m).as_f64().is_none())
                .collect();
            if !missing.is_empty() {
                return Err(PredictionError::IncompleteStats {
                    team: team.to_string(),
                    metrics: missing,
                });
            }
        }
        let v = |m: Metric| stats.get(m).as_f64().unwrap_or(0.0);
        Ok(Self {
            off_rtg: v(Metric::OffRtg),
            def_rtg: v(Metric::DefRtg),
            net_rtg: v(Metric::NetRtg),
            ts_pct: v(Metric::TsPct),
            efg_pct: v(Metric::EfgPct),
            ast_pct: v(Metric::AstPct),
            tov_pct: v(Metric::TovPct),
            reb_pct: v(Metric::RebPct),
            pie: v(Metric::Pie),
            pace: v(Metric::Pace),
        })
    }
}

pub fn adjusted_offense(s: &RatingInputs) -> f64 {
    OFFENSE_SCALE
        * (s.off_rtg
            + 0.25 * s.net_rtg
            + 0.5 * (s.ts_pct - TS_BASE)
            + 0.5 * (s.efg_pct - EFG_BASE)
            + 0.25 * (s.ast_pct - AST_BASE)
            - 0.6 * (s.tov_pct - TOV_BASE)
            + 0.25 * (s.reb_pct - REB_BASE)
            + 0.25 * (s.pie - PIE_BASE))
}

/// Points per 100 possessions: own adjusted offense blended evenly with the
/// opponent's defensive rating.
pub fn expected_per_100(offense: &RatingInputs, defense: &RatingInputs) -> f64 {
    (adjusted_offense(offense) + defense.def_rtg) / 2.0
}

pub fn matchup_pace(a: &RatingInputs, b: &RatingInputs) -> f64 {
    (a.pace + b.pace) / 2.0
}

/// Point estimates for both sides before simulation.
pub fn expected_scores(a: &RatingInputs, b: &RatingInputs) -> (f64, f64) {
    let pace = matchup_pace(a, b);
    let score1 = expected_per_100(a, b) * (pace / 100.0);
    let score2 = expected_per_100(b, a) * (pace / 100.0);
    (score1, score2)
}

#[derive(Debug, Clone, Default)]
pub struct PredictionEngine {
    config: SimulationConfig,
}

impl PredictionEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn predict_from_catalog(
        &self,
        catalog: &TeamsCatalog,
        team1: &str,
        team2: &str,
    ) -> Result<PredictionResult, PredictionError> {
        self.predict(team1, catalog.get(team1), team2, catalog.get(team2))
    }

    /// Runs the matchup with a generator freshly seeded from the config, so
    /// identical inputs always give an identical result.
    pub fn predict(
        &self,
        team1: &str,
        stats1: Option<&StatRecord>,
        team2: &str,
        stats2: Option<&StatRecord>,
    ) -> Result<PredictionResult, PredictionError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.predict_with_rng(team1, stats1, team2, stats2, &mut rng)
    }

    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        team1: &str,
        stats1: Option<&StatRecord>,
        team2: &str,
        stats2: Option<&StatRecord>,
        rng: &mut R,
    ) -> Result<PredictionResult, PredictionError> {
        validate_names(team1, team2)?;
        let stats1 = stats1.ok_or_else(|| PredictionError::TeamDataMissing(team1.to_string()))?;
        let stats2 = stats2.ok_or_else(|| PredictionError::TeamDataMissing(team2.to_string()))?;

        let s1 = RatingInputs::coerce(team1, stats1, self.config.coercion)?;
        let s2 = RatingInputs::coerce(team2, stats2, self.config.coercion)?;
        let (score1, score2) = expected_scores(&s1, &s2);

        let p = self.simulate(score1, score2, rng)?;
        let team1_wins = p >= 0.5;
        let (winner, loser) = if team1_wins {
            (team1, team2)
        } else {
            (team2, team1)
        };

        let spread = self.config.display_spread;
        Ok(PredictionResult {
            team1: team1.to_string(),
            team2: team2.to_string(),
            score1,
            score2,
            winner: winner.to_string(),
            loser: loser.to_string(),
            team1_win_probability: p,
            win_probability_pct: p.max(1.0 - p) * 100.0,
            margin: (score1 - score2).abs(),
            total_points: score1 + score2,
            display_range1: ScoreRange {
                low: score1 - spread,
                high: score1 + spread,
            },
            display_range2: ScoreRange {
                low: score2 - spread,
                high: score2 + spread,
            },
        })
    }

    /// Share of trials where team1 outscores team2; ties go to neither side.
    ///
    /// Noise is drawn in pairs and each pair is replayed with the draws
    /// swapped, so every team still sees `samples` draws from
    /// `Normal(score, std_dev)` and equal scores give exactly one half.
    fn simulate<R: Rng + ?Sized>(
        &self,
        score1: f64,
        score2: f64,
        rng: &mut R,
    ) -> Result<f64, PredictionError> {
        let noise = Normal::new(0.0, self.config.std_dev)
            .map_err(|err| PredictionError::Simulation(err.to_string()))?;
        let pairs = (self.config.samples / 2).max(1);

        let mut team1_wins = 0usize;
        for _ in 0..pairs {
            let e1 = noise.sample(rng);
            let e2 = noise.sample(rng);
            if score1 + e1 > score2 + e2 {
                team1_wins += 1;
            }
            if score1 + e2 > score2 + e1 {
                team1_wins += 1;
            }
        }
        Ok(team1_wins as f64 / (pairs * 2) as f64)
    }
}

fn validate_names(team1: &str, team2: &str) -> Result<(), PredictionError> {
    if team1.trim().is_empty() || team2.trim().is_empty() {
        return Err(PredictionError::MissingTeam);
    }
    if is_placeholder(team1) || is_placeholder(team2) {
        return Err(PredictionError::PlaceholderTeam);
    }
    if team1 == team2 {
        return Err(PredictionError::SameTeam);
    }
    Ok(())
}

pub fn is_placeholder(name: &str) -> bool {
    name.trim_start().starts_with(TEAM_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_a() -> StatRecord {
        StatRecord::unknown()
            .with(Metric::OffRtg, 115.0)
            .with(Metric::DefRtg, 110.0)
            .with(Metric::NetRtg, 5.0)
            .with(Metric::TsPct, 58.0)
            .with(Metric::EfgPct, 55.0)
            .with(Metric::AstPct, 60.0)
            .with(Metric::TovPct, 15.0)
            .with(Metric::RebPct, 50.0)
            .with(Metric::Pie, 50.0)
            .with(Metric::Pace, 100.0)
    }

    fn team_b() -> StatRecord {
        StatRecord::unknown()
            .with(Metric::OffRtg, 110.0)
            .with(Metric::DefRtg, 112.0)
            .with(Metric::NetRtg, -2.0)
            .with(Metric::TsPct, 56.0)
            .with(Metric::EfgPct, 53.0)
            .with(Metric::AstPct, 58.0)
            .with(Metric::TovPct, 16.0)
            .with(Metric::RebPct, 48.0)
            .with(Metric::Pie, 48.0)
            .with(Metric::Pace, 98.0)
    }

    fn inputs(rec: &StatRecord) -> RatingInputs {
        RatingInputs::coerce("t", rec, CoercionPolicy::ZeroOnMissing).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn formula_matches_reference_matchup() {
        let a = inputs(&team_a());
        let b = inputs(&team_b());
        assert!(close(adjusted_offense(&a), 104.625));
        assert!(close(adjusted_offense(&b), 94.86));
        assert!(close(expected_per_100(&a, &b), 108.3125));
        assert!(close(expected_per_100(&b, &a), 102.43));
        assert!(close(matchup_pace(&a, &b), 99.0));
        let (s1, s2) = expected_scores(&a, &b);
        assert!((s1 - 107.23).abs() < 0.01);
        assert!((s2 - 101.41).abs() < 0.01);
    }

    #[test]
    fn stronger_team_wins_reference_matchup() {
        let engine = PredictionEngine::default();
        let r = engine
            .predict("Team A", Some(&team_a()), "Team B", Some(&team_b()))
            .unwrap();
        assert_eq!(r.winner, "Team A");
        assert_eq!(r.loser, "Team B");
        assert!(r.win_probability_pct > 50.0);
        assert!(r.win_probability_pct <= 100.0);
        assert!(close(r.margin, (r.score1 - r.score2).abs()));
        assert!(close(r.display_range1.low, r.score1 - 16.0));
        assert!(close(r.display_range2.high, r.score2 + 16.0));
    }

    #[test]
    fn identical_records_are_a_coin_flip() {
        let engine = PredictionEngine::default();
        let r = engine
            .predict("Team A", Some(&team_a()), "Team B", Some(&team_a()))
            .unwrap();
        assert_eq!(r.win_probability_pct, 50.0);
        assert_eq!(r.margin, 0.0);
        assert_eq!(r.winner, "Team A");
    }

    #[test]
    fn same_team_is_rejected_before_simulation() {
        let engine = PredictionEngine::default();
        let err = engine
            .predict("Team A", Some(&team_a()), "Team A", Some(&team_a()))
            .unwrap_err();
        assert_eq!(err, PredictionError::SameTeam);
    }

    #[test]
    fn placeholder_and_blank_names_are_rejected() {
        let engine = PredictionEngine::default();
        let a = team_a();
        assert_eq!(
            engine.predict("Tap to select Team 1", Some(&a), "B", Some(&a)),
            Err(PredictionError::PlaceholderTeam)
        );
        assert_eq!(
            engine.predict("  ", Some(&a), "B", Some(&a)),
            Err(PredictionError::MissingTeam)
        );
    }

    #[test]
    fn missing_record_is_reported() {
        let engine = PredictionEngine::default();
        let err = engine
            .predict("A", Some(&team_a()), "B", None)
            .unwrap_err();
        assert_eq!(err, PredictionError::TeamDataMissing("B".to_string()));
    }

    #[test]
    fn unknown_values_coerce_to_zero_by_default() {
        let s = inputs(&StatRecord::unknown());
        assert_eq!(s, RatingInputs::default());
        // 0.9 * (-29 - 27.5 - 15 + 9 - 12.5 - 12.5)
        assert!(close(adjusted_offense(&s), -78.75));
    }

    #[test]
    fn reject_policy_lists_missing_metrics() {
        let engine = PredictionEngine::new(SimulationConfig {
            coercion: CoercionPolicy::RejectMissing,
            ..SimulationConfig::default()
        });
        let partial = team_a();
        let mut broken = team_b();
        broken.set(Metric::Pace, crate::stats::StatValue::Unknown);
        broken.set(Metric::Pie, crate::stats::StatValue::Text("n/a".to_string()));
        let err = engine
            .predict("A", Some(&partial), "B", Some(&broken))
            .unwrap_err();
        assert_eq!(
            err,
            PredictionError::IncompleteStats {
                team: "B".to_string(),
                metrics: vec![Metric::Pie, Metric::Pace],
            }
        );
    }

    #[test]
    fn repeated_calls_are_identical() {
        let engine = PredictionEngine::default();
        let a = team_a();
        let b = team_b();
        let first = engine.predict("A", Some(&a), "B", Some(&b)).unwrap();
        let second = engine.predict("A", Some(&a), "B", Some(&b)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_std_dev_is_an_error() {
        let engine = PredictionEngine::new(SimulationConfig {
            std_dev: f64::NAN,
            ..SimulationConfig::default()
        });
        let err = engine
            .predict("A", Some(&team_a()), "B", Some(&team_b()))
            .unwrap_err();
        assert!(matches!(err, PredictionError::Simulation(_)));
    }
}
