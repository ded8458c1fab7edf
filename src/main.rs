use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};

use nba_predictor::config::AppConfig;
use nba_predictor::extract;
use nba_predictor::logging;
use nba_predictor::persist;
use nba_predictor::predict::PredictionEngine;
use nba_predictor::state::{AppState, HOME_ITEMS, InputMode, Screen, Slot};
use nba_predictor::stats::{PredictionResult, initialize_catalog};

const LOG_FILE: &str = "nba_predictor.log";

struct App {
    state: AppState,
    engine: PredictionEngine,
    catalog_path: Option<PathBuf>,
    history_path: Option<PathBuf>,
    default_report: Option<String>,
    should_quit: bool,
}

impl App {
    fn new(cfg: &AppConfig) -> Self {
        let catalog_path = cfg.data_dir.as_deref().map(persist::catalog_path);
        let history_path = cfg.data_dir.as_deref().map(persist::history_path);
        let catalog = catalog_path
            .as_deref()
            .map(persist::load_catalog)
            .unwrap_or_else(initialize_catalog);
        let history = history_path
            .as_deref()
            .map(persist::load_history)
            .unwrap_or_default();

        let mut state = AppState::new(catalog, history);
        if catalog_path.is_none() {
            state.push_log("[WARN] No data directory; stats and history are not saved");
        }
        Self {
            state,
            engine: PredictionEngine::new(cfg.simulation()),
            catalog_path,
            history_path,
            default_report: cfg
                .report_path
                .as_ref()
                .map(|p| p.display().to_string()),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.input_mode == InputMode::ReportPath {
            self.on_input_key(key);
            return;
        }
        if self.state.popup.is_some() {
            self.state.popup = None;
            return;
        }
        if self.state.help_overlay {
            self.state.help_overlay = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('h') | KeyCode::Char('H') => self.state.go_home(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('b') | KeyCode::Esc => self.back(),
            _ => self.on_screen_key(key),
        }
    }

    fn on_screen_key(&mut self, key: KeyEvent) {
        match self.state.screen {
            Screen::Home => {
                if key.code == KeyCode::Enter {
                    self.state.enter_selected_home_item();
                }
            }
            Screen::Teams => match key.code {
                KeyCode::Enter => self.state.detail_open = !self.state.detail_open,
                KeyCode::Char('o') | KeyCode::Char('O') => {
                    let default = self.default_report.clone();
                    self.state.begin_report_input(default.as_deref());
                }
                _ => {}
            },
            Screen::Predict => match (key.code, self.state.picker) {
                (KeyCode::Enter, Some(_)) => self.state.pick_team(),
                (KeyCode::Char('1'), None) => self.state.open_picker(Slot::Team1),
                (KeyCode::Char('2'), None) => self.state.open_picker(Slot::Team2),
                (KeyCode::Enter | KeyCode::Char('p'), None) => self.run_prediction(),
                _ => {}
            },
            Screen::Result => {
                if key.code == KeyCode::Char('p') {
                    self.state.screen = Screen::Predict;
                }
            }
            Screen::History => {}
        }
    }

    fn on_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let raw = self.state.finish_input();
                if !raw.is_empty() {
                    self.load_report(Path::new(&raw));
                }
            }
            KeyCode::Esc => {
                self.state.finish_input();
            }
            KeyCode::Backspace => {
                self.state.input.pop();
            }
            KeyCode::Char(c) => self.state.input.push(c),
            _ => {}
        }
    }

    fn back(&mut self) {
        if self.state.picker.take().is_some() {
            return;
        }
        if self.state.detail_open {
            self.state.detail_open = false;
            return;
        }
        match self.state.screen {
            Screen::Result => self.state.screen = Screen::Predict,
            _ => self.state.go_home(),
        }
    }

    fn load_report(&mut self, path: &Path) {
        let extracted = extract::extract_team_stats_from_path(path);
        if !self.state.apply_extracted(extracted) {
            return;
        }
        let outcome = match &self.catalog_path {
            Some(catalog_path) => {
                persist::save_catalog(catalog_path, &self.state.catalog).map_err(|err| {
                    tracing::error!("{err:#}");
                    format!("{err:#}")
                })
            }
            None => Err("no data directory".to_string()),
        };
        self.state.finish_catalog_save(outcome);
    }

    fn run_prediction(&mut self) {
        let Ok(entry) = self.state.run_prediction(&self.engine) else {
            return;
        };
        let Some(history_path) = &self.history_path else {
            return;
        };
        if let Err(err) = persist::append_history(history_path, entry) {
            tracing::error!("{err:#}");
            self.state.push_log(format!("[WARN] Saving history failed: {err}"));
        }
    }
}

fn main() -> io::Result<()> {
    let cfg = AppConfig::from_env();
    if let Some(dir) = &cfg.data_dir {
        if let Err(err) = logging::init_file(&dir.join(LOG_FILE)) {
            eprintln!("warning: {err:#}");
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(&cfg);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Home => render_home(frame, chunks[1], &app.state),
        Screen::Teams => render_teams(frame, chunks[1], &app.state),
        Screen::Predict => render_predict(frame, chunks[1], &app.state),
        Screen::Result => render_result(frame, chunks[1], &app.state),
        Screen::History => render_history(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.input_mode == InputMode::ReportPath {
        render_input(frame, frame.size(), &app.state);
    }
    if let Some((title, msg)) = &app.state.popup {
        render_popup(frame, frame.size(), title, msg);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Home => "NBA PREDICTOR".to_string(),
        Screen::Teams => format!("TEAMS | {} loaded", state.catalog.len()),
        Screen::Predict => "PREDICT".to_string(),
        Screen::Result => "RESULT".to_string(),
        Screen::History => format!("HISTORY | {} predictions", state.history.len()),
    };
    let last_log = state.logs.back().map(String::as_str).unwrap_or("");
    format!("  ( )  {title}\n  /|\\  {last_log}\n  / \\")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Home => "j/k/↑/↓ Move | Enter Open | ? Help | q Quit".to_string(),
        Screen::Teams => {
            "j/k Move | Enter Stats | o Load report | b/Esc Back | ? Help | q Quit".to_string()
        }
        Screen::Predict => {
            if state.picker.is_some() {
                "j/k Move | Enter Pick | b/Esc Cancel".to_string()
            } else {
                "1 Team 1 | 2 Team 2 | Enter/p Predict | b/Esc Back | q Quit".to_string()
            }
        }
        Screen::Result => "j/k Scroll | p/b Predict again | h Home | q Quit".to_string(),
        Screen::History => "j/k Scroll | b/Esc Back | q Quit".to_string(),
    }
}

fn render_home(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = HOME_ITEMS
        .iter()
        .enumerate()
        .map(|(idx, (_, label))| {
            let style = if idx == state.home_selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(format!("  {label}"), style)
        })
        .collect();
    let menu = Paragraph::new(lines).block(Block::default().title("Menu").borders(Borders::ALL));
    frame.render_widget(menu, centered_rect(40, 40, area));
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let names = state.team_names();
    render_team_list(frame, area, &names, state.team_selected, "Teams");

    if !state.detail_open {
        return;
    }
    let Some((team, record)) = state.selected_team() else {
        return;
    };
    let popup_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup_area);
    let text = record
        .iter()
        .map(|(metric, value)| format!("{metric:<10} {value}"))
        .collect::<Vec<_>>()
        .join("\n");
    let detail = Paragraph::new(text).block(
        Block::default()
            .title(format!("{team} | Stats"))
            .borders(Borders::ALL),
    );
    frame.render_widget(detail, popup_area);
}

fn render_team_list(frame: &mut Frame, area: Rect, names: &[&str], selected: usize, title: &str) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if names.is_empty() {
        let empty = Paragraph::new("No teams loaded").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let (start, end) = visible_range(selected, names.len(), inner.height as usize);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let style = if idx == selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(names[idx].to_string(), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_predict(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    for (row, slot, title) in [(rows[0], Slot::Team1, "Team 1"), (rows[1], Slot::Team2, "Team 2")] {
        let highlight = state.picker == Some(slot);
        let style = if highlight {
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow)
        } else {
            Style::default()
        };
        let widget = Paragraph::new(state.slot_label(slot))
            .style(style)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(widget, row);
    }

    if state.picker.is_some() {
        let names = state.team_names();
        render_team_list(frame, rows[2], &names, state.picker_selected, "Select team");
    } else if let Some(last) = &state.last_result {
        render_win_bar(frame, rows[2], last);
    }
}

fn render_win_bar(frame: &mut Frame, area: Rect, result: &PredictionResult) {
    let p1 = (result.team1_win_probability * 100.0).round() as u64;
    let bars = [
        Bar::default()
            .value(p1)
            .text_value(format!("{p1}%"))
            .label(result.team1.clone().into())
            .style(Style::default().fg(Color::Green)),
        Bar::default()
            .value(100 - p1.min(100))
            .text_value(format!("{}%", 100 - p1.min(100)))
            .label(result.team2.clone().into())
            .style(Style::default().fg(Color::Red)),
    ];
    let chart = BarChart::default()
        .block(Block::default().title("Last prediction").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .max(100);
    frame.render_widget(chart, area);
}

fn render_result(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = if state.result_text.is_empty() {
        "No prediction yet."
    } else {
        state.result_text.as_str()
    };
    let result = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((state.history_scroll, 0))
        .block(Block::default().title("Prediction").borders(Borders::ALL));
    frame.render_widget(result, area);
}

fn render_history(frame: &mut Frame, area: Rect, state: &AppState) {
    let shown = persist::history_newest_first(&state.history);
    let text = if shown.is_empty() {
        "No predictions yet.".to_string()
    } else {
        shown
            .iter()
            .map(|e| format!("{} vs {}\n{}", e.team1, e.team2, e.result))
            .collect::<Vec<_>>()
            .join("\n\n────────\n\n")
    };
    let history = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((state.history_scroll, 0))
        .block(Block::default().title("History").borders(Borders::ALL));
    frame.render_widget(history, area);
}

fn render_input(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(70, 20, area);
    frame.render_widget(Clear, popup_area);
    let input = Paragraph::new(format!("{}_", state.input)).block(
        Block::default()
            .title("Report file, .pdf or .txt (Enter load, Esc cancel)")
            .borders(Borders::ALL),
    );
    frame.render_widget(input, popup_area);
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, msg: &str) {
    let popup_area = centered_rect(60, 25, area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(msg.to_string())
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "NBA Predictor - Help",
        "",
        "Global:",
        "  j/k or ↑/↓   Move/scroll",
        "  b / Esc      Back",
        "  h            Home",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Teams:",
        "  Enter        Show stats",
        "  o            Load report (PDF or text)",
        "",
        "Predict:",
        "  1 / 2        Choose team 1 / team 2",
        "  Enter / p    Run prediction",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
