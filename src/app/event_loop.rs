use crate::app::state::AppState;
use crate::audio::source::AudioSource;
use crate::ui::tui::Tui;
use crate::utils::input::{map_key, Action};
use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::terminal;
use std::time::{Duration, Instant};

pub fn run(app: &mut AppState) -> Result<()> {
    let mut source = AudioSource::open(&app.config, Instant::now());
    log::info!("audio source: {}", source.label());

    let mut tui = Tui::new()?;
    tui.enter()?;

    let (cols, rows) = terminal::size()?;
    app.on_resize(cols, rows);

    let result = drive(app, &mut tui, &mut source);

    // deregister the source before restoring the terminal
    app.on_destroy();
    drop(source);
    tui.exit()?;
    result
}

fn drive(app: &mut AppState, tui: &mut Tui, source: &mut AudioSource) -> Result<()> {
    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) => {
                    if map_key(k) == Action::Quit {
                        app.on_destroy();
                    }
                }
                Event::Resize(cols, rows) => app.on_resize(cols, rows),
                _ => {}
            }
        }
        if app.should_quit() {
            return Ok(());
        }

        source.maintain(frame_start);
        for chunk in source.drain_chunks(frame_start) {
            app.deliver_mono_pcm(&chunk);
        }

        if app.display.take_redraw() {
            tui.draw(app)?;
        }

        // frame pacing
        let frame_dt = fps_to_dt(app.config.ui_fps);
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dt {
            std::thread::sleep(frame_dt - elapsed);
        }
    }
}

fn fps_to_dt(fps: u32) -> Duration {
    let fps = fps.clamp(30, 60);
    Duration::from_millis((1000 / fps) as u64)
}
