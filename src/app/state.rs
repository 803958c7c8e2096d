use crate::audio::spectrum::{PipelineState, SpectrumPipeline};
use crate::audio::PcmChunk;
use crate::data::config::Config;
use crate::ui::display::DisplayAdapter;
use crate::ui::theme::Theme;

/// Everything the callbacks touch. Lives on the event-loop thread and is
/// handed to handlers by reference.
pub struct AppState {
    pub config: Config,
    pub theme: Theme,
    pub spectrum: SpectrumPipeline,
    pub display: DisplayAdapter,
}

impl AppState {
    pub fn new(config: Config, theme: Theme) -> Self {
        Self {
            config,
            theme,
            spectrum: SpectrumPipeline::new(),
            display: DisplayAdapter::new(),
        }
    }

    pub fn deliver_mono_pcm(&mut self, pcm: &PcmChunk) {
        if self.spectrum.deliver_mono_pcm(pcm, self.display.bands()) {
            self.display.request_redraw();
        }
    }

    pub fn on_resize(&mut self, cols: u16, rows: u16) {
        self.display.on_resize_cells(cols, rows);
        log::debug!(
            "resize to {cols}x{rows} cells, {} bands",
            self.display.bands()
        );
    }

    pub fn on_destroy(&mut self) {
        self.spectrum.teardown();
    }

    pub fn should_quit(&self) -> bool {
        self.spectrum.state() == PipelineState::TornDown
    }

    pub fn bars(&self) -> &[f64] {
        self.spectrum.bars(self.display.bands())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PCM_SAMPLES;

    fn app() -> AppState {
        let config = Config::default();
        let theme = Theme::from_config(&config);
        AppState::new(config, theme)
    }

    #[test]
    fn resize_sets_band_count() {
        let mut app = app();
        app.on_resize(200, 40);
        assert_eq!(app.display.bands(), 100);
        assert_eq!(app.bars().len(), 100);

        app.on_resize(12, 40);
        assert_eq!(app.display.bands(), 12);
    }

    #[test]
    fn transform_requests_redraw() {
        let mut app = app();
        app.on_resize(200, 40);
        let _ = app.display.take_redraw();

        app.deliver_mono_pcm(&[1.0; PCM_SAMPLES]);
        assert!(!app.display.take_redraw());
        app.deliver_mono_pcm(&[-1.0; PCM_SAMPLES]);
        assert!(app.display.take_redraw());
        assert!(app.bars().iter().any(|&b| b > 0.0));
    }

    #[test]
    fn bars_survive_resize() {
        let mut app = app();
        app.on_resize(200, 40);
        app.deliver_mono_pcm(&[1.0; PCM_SAMPLES]);
        app.deliver_mono_pcm(&[-1.0; PCM_SAMPLES]);
        let before = app.bars()[0];

        app.on_resize(100, 40);
        assert_eq!(app.bars().len(), 50);
        assert_eq!(app.bars()[0], before);
    }

    #[test]
    fn destroy_stops_the_pipeline() {
        let mut app = app();
        assert!(!app.should_quit());
        app.on_destroy();
        assert!(app.should_quit());
    }
}
