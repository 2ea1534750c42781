//! User-facing collaborators of the session: buttons and the status display.
//!
//! The session only tells the display *what* to show; rendering (LED matrix,
//! scrolling text, terminal) lives behind [`StatusDisplay`].

use tracing::{debug, info};

use crate::analysis::RunSummary;

/// Discrete user signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSignal {
    /// Advance to the next menu entry
    Next,
    /// Go back one menu entry
    Previous,
    /// Select the current entry
    Confirm,
    /// Cancel a run in progress, or restart from the results screen
    Cancel,
}

/// Button source with was-pressed semantics: each press is returned once.
pub trait UserInput {
    fn poll(&mut self) -> Option<UserSignal>;
}

impl<U: UserInput + ?Sized> UserInput for &mut U {
    fn poll(&mut self) -> Option<UserSignal> {
        (**self).poll()
    }
}

/// Measurement progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub elapsed_ms: u32,
    pub total_ms: u32,
}

impl Progress {
    /// Pixels on a 5x5 matrix
    pub const GRID_PIXELS: usize = 25;

    pub fn fraction(&self) -> f64 {
        if self.total_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms as f64 / self.total_ms as f64).clamp(0.0, 1.0)
    }

    /// Pixels to light, filled row by row
    pub fn lit_pixels(&self) -> usize {
        (Self::GRID_PIXELS as f64 * self.fraction() + 0.5) as usize
    }
}

/// One screen of the result cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultPage {
    MeanAccel,
    MeanVelocity,
    Vmax,
    Tau,
}

impl ResultPage {
    pub const CYCLE: [ResultPage; 4] = [
        ResultPage::MeanAccel,
        ResultPage::MeanVelocity,
        ResultPage::Vmax,
        ResultPage::Tau,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ResultPage::MeanAccel => "A",
            ResultPage::MeanVelocity => "V",
            ResultPage::Vmax => "VM",
            ResultPage::Tau => "T",
        }
    }

    pub fn value(&self, summary: &RunSummary) -> f64 {
        match self {
            ResultPage::MeanAccel => summary.mean_accel,
            ResultPage::MeanVelocity => summary.mean_velocity,
            ResultPage::Vmax => summary.fit.vmax,
            ResultPage::Tau => summary.fit.tau,
        }
    }

    /// Text as scrolled on the display, e.g. `VM 0.40`
    pub fn render(&self, summary: &RunSummary) -> String {
        format!("{} {:.2}", self.label(), self.value(summary))
    }
}

/// Status output. Every method defaults to doing nothing.
pub trait StatusDisplay {
    fn show_duration(&mut self, _secs: u32) {}
    fn show_calibrating(&mut self) {}
    fn show_countdown(&mut self, _remaining_secs: u32) {}
    fn show_progress(&mut self, _progress: Progress) {}
    fn show_result(&mut self, _page: ResultPage, _text: &str) {}
    fn clear(&mut self) {}
}

impl<D: StatusDisplay + ?Sized> StatusDisplay for &mut D {
    fn show_duration(&mut self, secs: u32) {
        (**self).show_duration(secs)
    }
    fn show_calibrating(&mut self) {
        (**self).show_calibrating()
    }
    fn show_countdown(&mut self, remaining_secs: u32) {
        (**self).show_countdown(remaining_secs)
    }
    fn show_progress(&mut self, progress: Progress) {
        (**self).show_progress(progress)
    }
    fn show_result(&mut self, page: ResultPage, text: &str) {
        (**self).show_result(page, text)
    }
    fn clear(&mut self) {
        (**self).clear()
    }
}

/// Display that writes status changes to the log
#[derive(Debug, Default)]
pub struct LogDisplay {
    last_pixels: Option<usize>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusDisplay for LogDisplay {
    fn show_duration(&mut self, secs: u32) {
        info!("[Display] Duration {} s", secs);
    }

    fn show_calibrating(&mut self) {
        info!("[Display] Calibrating, hold still");
    }

    fn show_countdown(&mut self, remaining_secs: u32) {
        info!("[Display] {}", remaining_secs);
    }

    fn show_progress(&mut self, progress: Progress) {
        let pixels = progress.lit_pixels();
        if self.last_pixels != Some(pixels) {
            self.last_pixels = Some(pixels);
            debug!("[Display] Progress {}/{}", pixels, Progress::GRID_PIXELS);
        }
    }

    fn show_result(&mut self, _page: ResultPage, text: &str) {
        info!("[Display] {}", text);
    }

    fn clear(&mut self) {
        self.last_pixels = None;
    }
}

/// Cyclic duration picker
#[derive(Debug, Clone)]
pub struct DurationMenu {
    options: Vec<u32>,
    index: usize,
}

impl DurationMenu {
    pub fn new(options: Vec<u32>) -> Self {
        Self { options, index: 0 }
    }

    pub fn current(&self) -> Option<u32> {
        self.options.get(self.index).copied()
    }

    pub fn next(&mut self) -> Option<u32> {
        if !self.options.is_empty() {
            self.index = (self.index + 1) % self.options.len();
        }
        self.current()
    }

    pub fn previous(&mut self) -> Option<u32> {
        if !self.options.is_empty() {
            self.index = (self.index + self.options.len() - 1) % self.options.len();
        }
        self.current()
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FitResult;
    use crate::calibration::CalibrationOffsets;

    #[test]
    fn test_lit_pixels_rounds_half_up() {
        let at = |elapsed_ms| Progress {
            elapsed_ms,
            total_ms: 5000,
        };
        assert_eq!(at(0).lit_pixels(), 0);
        assert_eq!(at(100).lit_pixels(), 1);
        assert_eq!(at(2500).lit_pixels(), 13);
        assert_eq!(at(5000).lit_pixels(), 25);
        assert_eq!(at(9000).lit_pixels(), 25);
    }

    #[test]
    fn test_menu_wraps_both_ways() {
        let mut menu = DurationMenu::new(vec![5, 10, 20]);
        assert_eq!(menu.current(), Some(5));
        assert_eq!(menu.previous(), Some(20));
        assert_eq!(menu.next(), Some(5));
        assert_eq!(menu.next(), Some(10));
        menu.reset();
        assert_eq!(menu.current(), Some(5));
    }

    #[test]
    fn test_empty_menu_has_no_selection() {
        let mut menu = DurationMenu::new(Vec::new());
        assert_eq!(menu.next(), None);
        assert_eq!(menu.previous(), None);
    }

    #[test]
    fn test_result_pages_render_two_decimals() {
        let summary = RunSummary {
            duration_secs: 5,
            sample_count: 500,
            mean_accel: 0.0818,
            mean_velocity: 0.371,
            fit: FitResult {
                vmax: 0.404,
                tau: 0.3955,
            },
            buffered_points: 50,
            calibration: CalibrationOffsets::zero(),
        };
        let rendered: Vec<String> = ResultPage::CYCLE
            .iter()
            .map(|page| page.render(&summary))
            .collect();
        assert_eq!(rendered, vec!["A 0.08", "V 0.37", "VM 0.40", "T 0.40"]);
    }
}
