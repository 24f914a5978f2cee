//! Dashboard application state: county selection and forecast results.

use tracing::warn;

use crate::context::{CountyForecast, ForecastContext};

/// TUI application state.
pub struct App {
    /// Loaded dataset and model.
    ctx: ForecastContext,
    /// County names shown in the selector.
    pub counties: Vec<String>,
    /// Highlighted row in the selector.
    pub cursor: usize,
    /// Counties marked for comparison, in the order they were marked.
    pub marked: Vec<String>,
    /// Forecasts currently on the chart.
    pub results: Vec<CountyForecast>,
    /// Latest warning, shown in place of the growth summary.
    pub warning: Option<String>,
    /// Whether the user has requested quit.
    pub quit: bool,
}

impl App {
    /// Creates the app and forecasts the first county so the chart is never
    /// empty on launch.
    pub fn new(ctx: ForecastContext) -> Self {
        let counties = ctx.counties().into_iter().map(str::to_string).collect();
        let mut app = Self {
            ctx,
            counties,
            cursor: 0,
            marked: Vec::new(),
            results: Vec::new(),
            warning: None,
            quit: false,
        };
        app.run_selection();
        app
    }

    /// Moves the cursor up one row, stopping at the top.
    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor down one row, stopping at the bottom.
    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.counties.len() {
            self.cursor += 1;
        }
    }

    /// County under the cursor.
    pub fn highlighted(&self) -> Option<&str> {
        self.counties.get(self.cursor).map(String::as_str)
    }

    /// Marks or unmarks the highlighted county for comparison.
    ///
    /// Marking more than `max_compare` counties is refused with a warning.
    pub fn toggle_mark(&mut self) {
        let Some(name) = self.highlighted().map(str::to_string) else {
            return;
        };
        if let Some(pos) = self.marked.iter().position(|m| *m == name) {
            self.marked.remove(pos);
            self.warning = None;
        } else if self.marked.len() >= self.ctx.max_compare() {
            self.warning = Some(format!(
                "at most {} counties can be compared",
                self.ctx.max_compare()
            ));
        } else {
            self.marked.push(name);
            self.warning = None;
        }
    }

    /// Whether `name` is marked for comparison.
    pub fn is_marked(&self, name: &str) -> bool {
        self.marked.iter().any(|m| m == name)
    }

    /// Clears all marks.
    pub fn clear_marks(&mut self) {
        self.marked.clear();
        self.warning = None;
    }

    /// Forecasts the marked counties, or the highlighted one when none are
    /// marked. On failure the previous chart is kept and a warning is shown.
    pub fn run_selection(&mut self) {
        let outcome = if self.marked.is_empty() {
            match self.highlighted() {
                Some(name) => self.ctx.forecast(name).map(|r| vec![r]),
                None => Err(crate::error::ForecastError::NoCountySelected),
            }
        } else {
            self.ctx.compare(self.marked.as_slice())
        };

        match outcome {
            Ok(results) => {
                self.results = results;
                self.warning = None;
            }
            Err(e) => {
                warn!(error = %e, "dashboard selection rejected");
                self.warning = Some(e.to_string());
            }
        }
    }

    /// Forecast horizon in months.
    pub fn horizon(&self) -> u32 {
        self.ctx.horizon()
    }

    pub fn max_compare(&self) -> usize {
        self.ctx.max_compare()
    }

    /// Name of the model backend.
    pub fn model_name(&self) -> &'static str {
        self.ctx.model().name()
    }
}
