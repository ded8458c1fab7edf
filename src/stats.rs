use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

pub const METRIC_COUNT: usize = 19;

pub const NBA_TEAMS: [&str; 30] = [
    "Atlanta Hawks",
    "Boston Celtics",
    "Brooklyn Nets",
    "Charlotte Hornets",
    "Chicago Bulls",
    "Cleveland Cavaliers",
    "Dallas Mavericks",
    "Denver Nuggets",
    "Detroit Pistons",
    "Golden State Warriors",
    "Houston Rockets",
    "Indiana Pacers",
    "LA Clippers",
    "Los Angeles Lakers",
    "Memphis Grizzlies",
    "Miami Heat",
    "Milwaukee Bucks",
    "Minnesota Timberwolves",
    "New Orleans Pelicans",
    "New York Knicks",
    "Oklahoma City Thunder",
    "Orlando Magic",
    "Philadelphia 76ers",
    "Phoenix Suns",
    "Portland Trail Blazers",
    "Sacramento Kings",
    "San Antonio Spurs",
    "Toronto Raptors",
    "Utah Jazz",
    "Washington Wizards",
];

/// Column of the advanced team stats table, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    GamesPlayed,
    Wins,
    Losses,
    Minutes,
    OffRtg,
    DefRtg,
    NetRtg,
    AstPct,
    AstToRatio,
    AstRatio,
    OrebPct,
    DrebPct,
    RebPct,
    TovPct,
    EfgPct,
    TsPct,
    Pace,
    Pie,
    Poss,
}

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::GamesPlayed,
        Metric::Wins,
        Metric::Losses,
        Metric::Minutes,
        Metric::OffRtg,
        Metric::DefRtg,
        Metric::NetRtg,
        Metric::AstPct,
        Metric::AstToRatio,
        Metric::AstRatio,
        Metric::OrebPct,
        Metric::DrebPct,
        Metric::RebPct,
        Metric::TovPct,
        Metric::EfgPct,
        Metric::TsPct,
        Metric::Pace,
        Metric::Pie,
        Metric::Poss,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Metric::GamesPlayed => "GP",
            Metric::Wins => "W",
            Metric::Losses => "L",
            Metric::Minutes => "MIN",
            Metric::OffRtg => "OffRtg",
            Metric::DefRtg => "DefRtg",
            Metric::NetRtg => "NetRtg",
            Metric::AstPct => "AST%",
            Metric::AstToRatio => "AST/TO",
            Metric::AstRatio => "AST Ratio",
            Metric::OrebPct => "OREB%",
            Metric::DrebPct => "DREB%",
            Metric::RebPct => "REB%",
            Metric::TovPct => "TOV%",
            Metric::EfgPct => "eFG%",
            Metric::TsPct => "TS%",
            Metric::Pace => "PACE",
            Metric::Pie => "PIE",
            Metric::Poss => "POSS",
        }
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.key() == key)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

/// A single cell of a team's stat line.
///
/// Extraction keeps tokens that do not parse as numbers in their raw form, so
/// consumers must not assume every value is numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
    #[default]
    Unknown,
}

impl StatValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Number(v) => Some(*v),
            StatValue::Text(raw) => raw.trim().parse::<f64>().ok(),
            StatValue::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, StatValue::Unknown)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Number(v) => write!(f, "{v}"),
            StatValue::Text(raw) => f.write_str(raw),
            StatValue::Unknown => f.write_str("—"),
        }
    }
}

/// Fixed-schema stat line: one value per [`Metric`], always all 19.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatRecord {
    values: [StatValue; METRIC_COUNT],
}

impl StatRecord {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn from_values(values: [StatValue; METRIC_COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, metric: Metric) -> &StatValue {
        &self.values[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, value: StatValue) {
        self.values[metric.index()] = value;
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, StatValue::Number(value));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &StatValue)> {
        Metric::ALL.into_iter().zip(self.values.iter())
    }

    pub fn is_all_unknown(&self) -> bool {
        self.values.iter().all(StatValue::is_unknown)
    }
}

impl Serialize for StatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(METRIC_COUNT))?;
        for (metric, value) in self.iter() {
            map.serialize_entry(metric.key(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StatRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, StatValue>::deserialize(deserializer)?;
        let mut record = StatRecord::unknown();
        for (key, value) in raw {
            // Columns from a newer report layout are dropped rather than rejected.
            if let Some(metric) = Metric::from_key(&key) {
                record.set(metric, value);
            }
        }
        Ok(record)
    }
}

/// Team display name -> stat line, iterated alphabetically.
pub type TeamsCatalog = BTreeMap<String, StatRecord>;

pub fn initialize_catalog() -> TeamsCatalog {
    NBA_TEAMS
        .iter()
        .map(|name| (name.to_string(), StatRecord::unknown()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub team1: String,
    pub team2: String,
    pub score1: f64,
    pub score2: f64,
    pub winner: String,
    pub loser: String,
    // Fraction of trials team1 won; the headline number is `win_probability_pct`.
    pub team1_win_probability: f64,
    pub win_probability_pct: f64,
    pub margin: f64,
    pub total_points: f64,
    pub display_range1: ScoreRange,
    pub display_range2: ScoreRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_keys_follow_report_order() {
        let keys: Vec<&str> = Metric::ALL.iter().map(|m| m.key()).collect();
        assert_eq!(
            keys,
            vec![
                "GP", "W", "L", "MIN", "OffRtg", "DefRtg", "NetRtg", "AST%", "AST/TO",
                "AST Ratio", "OREB%", "DREB%", "REB%", "TOV%", "eFG%", "TS%", "PACE", "PIE",
                "POSS"
            ]
        );
        for m in Metric::ALL {
            assert_eq!(Metric::from_key(m.key()), Some(m));
        }
        assert_eq!(Metric::from_key("3PAr"), None);
    }

    #[test]
    fn initializer_has_thirty_unknown_teams() {
        let catalog = initialize_catalog();
        assert_eq!(catalog.len(), 30);
        assert!(catalog.values().all(StatRecord::is_all_unknown));
        assert!(catalog.contains_key("Philadelphia 76ers"));
    }

    #[test]
    fn record_serializes_all_keys_in_order() {
        let record = StatRecord::unknown()
            .with(Metric::OffRtg, 115.2)
            .with(Metric::GamesPlayed, 82.0);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.starts_with(r#"{"GP":82.0,"W":null"#));
        assert!(json.contains(r#""OffRtg":115.2"#));
        assert!(json.ends_with(r#""POSS":null}"#));
    }

    #[test]
    fn record_deserialize_fills_missing_and_keeps_text() {
        let record: StatRecord =
            serde_json::from_str(r#"{"GP": 82, "PIE": "51.x", "Extra": 1}"#).unwrap();
        assert_eq!(record.get(Metric::GamesPlayed), &StatValue::Number(82.0));
        assert_eq!(record.get(Metric::Pie), &StatValue::Text("51.x".to_string()));
        assert!(record.get(Metric::Poss).is_unknown());
    }

    #[test]
    fn stat_value_reads_numeric_text() {
        assert_eq!(StatValue::Text(" 98.5 ".to_string()).as_f64(), Some(98.5));
        assert_eq!(StatValue::Text("1.2.3".to_string()).as_f64(), None);
        assert_eq!(StatValue::Unknown.as_f64(), None);
    }
}
