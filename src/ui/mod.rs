pub mod display;
pub mod theme;
pub mod tui;
