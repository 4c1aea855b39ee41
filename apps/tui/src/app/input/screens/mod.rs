use crate::app::state::{App, AppScreen, InputMode};
use crossterm::event::KeyCode;

mod filter;
mod help;
pub mod story;

pub fn dispatch_input(app: &mut App, key: KeyCode) {
    if help::handle_help_toggle(app, key) {
        return;
    }

    match app.screen {
        AppScreen::Loading => {
            if matches!(key, KeyCode::Char('q') | KeyCode::Esc) {
                app.running = false;
            }
        }
        AppScreen::Failed(_) => match key {
            KeyCode::Char('q') | KeyCode::Esc => app.running = false,
            KeyCode::Char('r') => app.retry_requested = true,
            _ => {}
        },
        AppScreen::Story => match app.input_mode {
            InputMode::Browse => story::handle_story_input(app, key),
            InputMode::EnteringTopN => filter::handle_top_n_input(app, key),
            InputMode::PickingCategory => filter::handle_category_input(app, key),
        },
    }
}
