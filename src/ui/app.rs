use crate::config::{params_by_group, AppConfig, ParamKind, ParamSpec, ParamValue};
use crate::engine::{FilterEngine, Recompute};
use crate::export::export_csv;
use crate::model::{BreakdownTable, FilterAxis, Target};
use crate::parser::inventory::DEFAULT_SHEET;
use crate::parser::load_inventory;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Dashboard,
    Breakdown(Target),
    Settings,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Dashboard,
        View::Breakdown(Target::Registry),
        View::Breakdown(Target::Os),
        View::Breakdown(Target::Dbms),
        View::Breakdown(Target::Virtualization),
        View::Settings,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Breakdown(target) => target.title(),
            Self::Settings => "Settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusPanel {
    Filters,
    Table,
}

pub struct App {
    pub engine: FilterEngine,
    pub config: AppConfig,
    config_path: PathBuf,
    sheet: String,
    recompute: Receiver<Recompute>,
    pub tables: HashMap<Target, BreakdownTable>,
    /// Classes unchecked in each table; they stay in the table but leave the chart.
    pub hidden: HashMap<Target, HashSet<String>>,
    pub view_index: usize,
    pub focus_panel: FocusPanel,
    pub selected_filter: usize,
    pub selected_row: usize,
    pub selected_param: usize,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(mut engine: FilterEngine, config: AppConfig, config_path: PathBuf) -> Self {
        let recompute = engine.subscribe();
        let mut app = Self {
            engine,
            config,
            config_path,
            sheet: DEFAULT_SHEET.to_string(),
            recompute,
            tables: HashMap::new(),
            hidden: HashMap::new(),
            view_index: 0,
            focus_panel: FocusPanel::Filters,
            selected_filter: 0,
            selected_row: 0,
            selected_param: 0,
            status: None,
            should_quit: false,
        };
        app.rebuild_tables();
        app
    }

    /// Worksheet read by `o` reloads.
    #[must_use]
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            self.drain_recompute();
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        match self.view() {
            View::Dashboard => super::dashboard::draw_dashboard(frame, self),
            View::Breakdown(target) => super::dashboard::draw_breakdown(frame, self, target),
            View::Settings => super::dashboard::draw_settings(frame, self),
        }
    }

    #[must_use]
    pub fn view(&self) -> View {
        View::ALL[self.view_index]
    }

    /// Rebuilds cached tables if the engine announced a change.
    pub fn drain_recompute(&mut self) {
        if self.recompute.try_iter().count() > 0 {
            self.rebuild_tables();
        }
    }

    fn rebuild_tables(&mut self) {
        self.tables = Target::ALL
            .iter()
            .map(|&t| (t, self.engine.breakdown(t)))
            .collect();
        let rows = self.current_table().map_or(0, |t| t.rows.len());
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
    }

    fn handle_events(&mut self) -> Result<()> {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }
            self.handle_key(key.code);
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.switch_view(1),
            KeyCode::BackTab => self.switch_view(View::ALL.len() - 1),
            KeyCode::Char('o') => self.reload_data(),
            _ if self.view() == View::Settings => self.handle_settings_keys(code),
            _ => self.handle_breakdown_keys(code),
        }
    }

    fn switch_view(&mut self, step: usize) {
        self.view_index = (self.view_index + step) % View::ALL.len();
        self.selected_row = 0;
        if self.view() == View::Dashboard {
            self.focus_panel = FocusPanel::Filters;
        }
    }

    fn handle_breakdown_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.navigate_up(),
            KeyCode::Down | KeyCode::Char('j') => self.navigate_down(),
            KeyCode::Left | KeyCode::Char('h') => self.focus_panel = FocusPanel::Filters,
            KeyCode::Right | KeyCode::Char('l') => {
                if matches!(self.view(), View::Breakdown(_)) {
                    self.focus_panel = FocusPanel::Table;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => match self.focus_panel {
                FocusPanel::Filters => self.toggle_filter(),
                FocusPanel::Table => self.toggle_row(),
            },
            KeyCode::Char('a') => self.toggle_axis(),
            KeyCode::Char('e') => self.export_current(),
            _ => {}
        }
    }

    fn navigate_up(&mut self) {
        match self.focus_panel {
            FocusPanel::Filters => self.selected_filter = self.selected_filter.saturating_sub(1),
            FocusPanel::Table => self.selected_row = self.selected_row.saturating_sub(1),
        }
    }

    fn navigate_down(&mut self) {
        match self.focus_panel {
            FocusPanel::Filters => {
                if self.selected_filter + 1 < self.filter_entries().len() {
                    self.selected_filter += 1;
                }
            }
            FocusPanel::Table => {
                let rows = self.current_table().map_or(0, |t| t.rows.len());
                if self.selected_row + 1 < rows {
                    self.selected_row += 1;
                }
            }
        }
    }

    /// Every (axis, value) pair offered by the filter panel, axis by axis.
    #[must_use]
    pub fn filter_entries(&self) -> Vec<(FilterAxis, String)> {
        FilterAxis::ALL
            .iter()
            .flat_map(|&axis| {
                self.engine
                    .options(axis)
                    .iter()
                    .map(move |value| (axis, value.clone()))
            })
            .collect()
    }

    fn toggle_filter(&mut self) {
        if let Some((axis, value)) = self.filter_entries().get(self.selected_filter).cloned() {
            self.engine.toggle(axis, &value);
        }
    }

    // all selected -> none, otherwise -> all
    fn toggle_axis(&mut self) {
        let Some((axis, _)) = self.filter_entries().get(self.selected_filter).cloned() else {
            return;
        };
        let all = self
            .engine
            .options(axis)
            .iter()
            .all(|v| self.engine.is_selected(axis, v));
        if all {
            self.engine.update_filter(axis, Vec::<String>::new());
        } else {
            self.engine.select_all(axis);
        }
    }

    #[must_use]
    pub fn current_table(&self) -> Option<&BreakdownTable> {
        match self.view() {
            View::Breakdown(target) => self.tables.get(&target),
            View::Dashboard | View::Settings => None,
        }
    }

    #[must_use]
    pub fn is_checked(&self, target: Target, class: &str) -> bool {
        !self
            .hidden
            .get(&target)
            .is_some_and(|h| h.contains(class))
    }

    fn toggle_row(&mut self) {
        let View::Breakdown(target) = self.view() else {
            return;
        };
        let Some(class) = self
            .tables
            .get(&target)
            .and_then(|t| t.rows.get(self.selected_row))
            .map(|r| r.class.clone())
        else {
            return;
        };
        let hidden = self.hidden.entry(target).or_default();
        if !hidden.remove(&class) {
            hidden.insert(class);
        }
    }

    fn export_current(&mut self) {
        let View::Breakdown(target) = self.view() else {
            return;
        };
        let Some(table) = self.tables.get(&target) else {
            return;
        };
        let path = PathBuf::from(format!("{}_breakdown.csv", target.title().to_lowercase()));
        self.status = Some(match export_csv(table, &path) {
            Ok(()) => format!("Exported to {}", path.display()),
            Err(e) => format!("Export failed: {e}"),
        });
    }

    /// Reloads the configured data file. A failure leaves the dashboard empty.
    pub fn reload_data(&mut self) {
        let path = PathBuf::from(&self.config.data_path);
        if self.config.data_path.is_empty() {
            self.status = Some("No data file configured".to_string());
            return;
        }
        match load_inventory(&path, &self.sheet, &self.config.vocabulary) {
            Ok(dataset) => {
                self.status = Some(format!("Loaded {} systems", dataset.len()));
                self.engine.set_dataset(Some(dataset));
            }
            Err(e) => {
                warn!(error = %e, "reload failed");
                self.status = Some(format!("Error: {e}"));
                self.engine.set_dataset(None);
            }
        }
        self.selected_filter = 0;
        self.selected_row = 0;
        self.drain_recompute();
    }

    #[must_use]
    pub fn selected_spec(&self) -> Option<&'static ParamSpec> {
        params_by_group().get(self.selected_param).copied()
    }

    fn handle_settings_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_param = self.selected_param.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_param + 1 < params_by_group().len() {
                    self.selected_param += 1;
                }
            }
            KeyCode::Char('+' | '=') => self.adjust_param(1),
            KeyCode::Char('-') => self.adjust_param(-1),
            KeyCode::Char('r') => self.reset_param(),
            KeyCode::Char('s') => self.save_config(),
            _ => {}
        }
    }

    fn adjust_param(&mut self, delta: i64) {
        let Some(spec) = self.selected_spec() else {
            return;
        };
        let ParamKind::Number { .. } = spec.kind else {
            self.status = Some(format!("{} is edited in the config file", spec.label));
            return;
        };
        if let Some(ParamValue::Number(n)) = self.config.get(spec.key) {
            let result = self.config.set(spec.key, ParamValue::Number(n + delta));
            self.after_param_change(spec, result);
        }
    }

    fn reset_param(&mut self) {
        if let Some(spec) = self.selected_spec() {
            let result = self.config.reset(spec.key);
            self.after_param_change(spec, result);
        }
    }

    fn after_param_change(
        &mut self,
        spec: &ParamSpec,
        result: std::result::Result<(), crate::error::ConfigError>,
    ) {
        self.status = Some(match result {
            Ok(()) if spec.require_reload => format!("{} changed; press o to reload", spec.label),
            Ok(()) => format!("{} changed", spec.label),
            Err(e) => format!("Error: {e}"),
        });
    }

    fn save_config(&mut self) {
        self.status = Some(match self.config.save(&self.config_path) {
            Ok(()) => {
                info!(path = %self.config_path.display(), "configuration saved");
                format!("Saved {}", self.config_path.display())
            }
            Err(e) => format!("Error: {e}"),
        });
    }
}
