use std::collections::VecDeque;

use crate::persist::HistoryEntry;
use crate::predict::{PredictionEngine, PredictionError, TEAM_PLACEHOLDER};
use crate::report;
use crate::stats::{PredictionResult, StatRecord, TeamsCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Teams,
    Predict,
    Result,
    History,
}

pub const HOME_ITEMS: [(Screen, &str); 3] = [
    (Screen::Teams, "Teams"),
    (Screen::Predict, "Predict a game"),
    (Screen::History, "History"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Team1,
    Team2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    ReportPath,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub home_selected: usize,
    pub catalog: TeamsCatalog,
    pub team_selected: usize,
    pub detail_open: bool,
    pub picker: Option<Slot>,
    pub picker_selected: usize,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub last_result: Option<PredictionResult>,
    pub result_text: String,
    pub history: Vec<HistoryEntry>,
    pub history_scroll: u16,
    pub input_mode: InputMode,
    pub input: String,
    pub popup: Option<(String, String)>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(catalog: TeamsCatalog, history: Vec<HistoryEntry>) -> Self {
        Self {
            screen: Screen::Home,
            home_selected: 0,
            catalog,
            team_selected: 0,
            detail_open: false,
            picker: None,
            picker_selected: 0,
            team1: None,
            team2: None,
            last_result: None,
            result_text: String::new(),
            history,
            history_scroll: 0,
            input_mode: InputMode::Normal,
            input: String::new(),
            popup: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn team_names(&self) -> Vec<&str> {
        self.catalog.keys().map(String::as_str).collect()
    }

    pub fn selected_team(&self) -> Option<(&str, &StatRecord)> {
        self.catalog
            .iter()
            .nth(self.team_selected)
            .map(|(name, rec)| (name.as_str(), rec))
    }

    pub fn slot_label(&self, slot: Slot) -> String {
        let (team, n) = match slot {
            Slot::Team1 => (&self.team1, 1),
            Slot::Team2 => (&self.team2, 2),
        };
        team.clone()
            .unwrap_or_else(|| format!("{TEAM_PLACEHOLDER} Team {n}"))
    }

    pub fn go_home(&mut self) {
        self.screen = Screen::Home;
        self.detail_open = false;
        self.picker = None;
    }

    pub fn enter_selected_home_item(&mut self) {
        if let Some((screen, _)) = HOME_ITEMS.get(self.home_selected) {
            self.screen = *screen;
            self.history_scroll = 0;
        }
    }

    pub fn select_next(&mut self) {
        let teams = self.catalog.len();
        match (self.screen, self.picker) {
            (Screen::Predict, Some(_)) => {
                if self.picker_selected + 1 < teams {
                    self.picker_selected += 1;
                }
            }
            (Screen::Home, _) => {
                if self.home_selected + 1 < HOME_ITEMS.len() {
                    self.home_selected += 1;
                }
            }
            (Screen::Teams, _) => {
                if !self.detail_open && self.team_selected + 1 < teams {
                    self.team_selected += 1;
                }
            }
            (Screen::History | Screen::Result, _) => {
                self.history_scroll = self.history_scroll.saturating_add(1);
            }
            _ => {}
        }
    }

    pub fn select_prev(&mut self) {
        match (self.screen, self.picker) {
            (Screen::Predict, Some(_)) => {
                self.picker_selected = self.picker_selected.saturating_sub(1);
            }
            (Screen::Home, _) => self.home_selected = self.home_selected.saturating_sub(1),
            (Screen::Teams, _) => {
                if !self.detail_open {
                    self.team_selected = self.team_selected.saturating_sub(1);
                }
            }
            (Screen::History | Screen::Result, _) => {
                self.history_scroll = self.history_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub fn open_picker(&mut self, slot: Slot) {
        let current = match slot {
            Slot::Team1 => self.team1.as_deref(),
            Slot::Team2 => self.team2.as_deref(),
        };
        self.picker_selected = current
            .and_then(|name| self.catalog.keys().position(|k| k == name))
            .unwrap_or(0);
        self.picker = Some(slot);
    }

    pub fn pick_team(&mut self) {
        let Some(slot) = self.picker.take() else {
            return;
        };
        let Some(name) = self.catalog.keys().nth(self.picker_selected).cloned() else {
            return;
        };
        match slot {
            Slot::Team1 => self.team1 = Some(name),
            Slot::Team2 => self.team2 = Some(name),
        }
    }

    pub fn begin_report_input(&mut self, default_path: Option<&str>) {
        self.input_mode = InputMode::ReportPath;
        self.input = default_path.unwrap_or_default().to_string();
    }

    pub fn finish_input(&mut self) -> String {
        self.input_mode = InputMode::Normal;
        std::mem::take(&mut self.input).trim().to_string()
    }

    /// Installs freshly extracted stats. An empty extraction keeps the
    /// previous catalog and reports failure.
    pub fn apply_extracted(&mut self, extracted: TeamsCatalog) -> bool {
        if extracted.is_empty() {
            self.show_popup("Error", "Failed to extract team stats from report.");
            self.push_log("[WARN] Report extraction produced no teams");
            return false;
        }
        let count = extracted.len();
        self.catalog = extracted;
        self.team_selected = 0;
        self.detail_open = false;
        let catalog = &self.catalog;
        for team in [&mut self.team1, &mut self.team2] {
            if team.as_ref().is_some_and(|t| !catalog.contains_key(t)) {
                *team = None;
            }
        }
        self.show_popup("Success", "Team stats updated.");
        self.push_log(format!("[INFO] Loaded stats for {count} teams"));
        true
    }

    /// Replaces the extraction popup with the outcome of persisting it.
    pub fn finish_catalog_save(&mut self, outcome: Result<(), String>) {
        match outcome {
            Ok(()) => self.show_popup("Success", "Team stats updated and saved."),
            Err(reason) => {
                self.show_popup(
                    "Error",
                    &format!("Team stats updated but not saved: {reason}"),
                );
                self.push_log(format!("[WARN] Saving stats failed: {reason}"));
            }
        }
    }

    /// Runs the engine for the two chosen teams. On success the result screen
    /// is shown and the history entry to persist is returned.
    pub fn run_prediction(
        &mut self,
        engine: &PredictionEngine,
    ) -> Result<HistoryEntry, PredictionError> {
        let team1 = self.slot_label(Slot::Team1);
        let team2 = self.slot_label(Slot::Team2);
        let result = match engine.predict_from_catalog(&self.catalog, &team1, &team2) {
            Ok(result) => result,
            Err(err) => {
                self.show_popup("Prediction", &err.to_string());
                self.push_log(format!("[WARN] Prediction rejected: {err}"));
                return Err(err);
            }
        };

        let text = report::format_result(&result);
        let entry = HistoryEntry {
            team1: result.team1.clone(),
            team2: result.team2.clone(),
            result: text.clone(),
        };
        self.push_log(format!(
            "[INFO] {} over {} ({:.1}%)",
            result.winner, result.loser, result.win_probability_pct
        ));
        self.history.push(entry.clone());
        self.result_text = text;
        self.last_result = Some(result);
        self.history_scroll = 0;
        self.screen = Screen::Result;
        Ok(entry)
    }

    pub fn show_popup(&mut self, title: &str, msg: &str) {
        self.popup = Some((title.to_string(), msg.to_string()));
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}
