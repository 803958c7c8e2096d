mod app;
mod audio;
mod data;
mod render;
mod ui;
mod utils;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();

    let config = data::config::Config::load_or_default()?;
    let theme = ui::theme::Theme::from_config(&config);

    let mut app = app::state::AppState::new(config, theme);
    app::event_loop::run(&mut app)
}
