// UI module for shop-story
// Handles all UI rendering functions

pub mod layout;
pub mod screens;
pub mod widgets;

use crate::app::{App, AppScreen};
use ratatui::Frame;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    match &app.screen {
        AppScreen::Loading => screens::loading::render_loading(app, f),
        AppScreen::Failed(message) => screens::failed::render_failed(f, message),
        AppScreen::Story => screens::story::render_story(app, f),
    }

    if app.show_help {
        let area = f.area();
        screens::help::render_help_popup(f, area);
    }
}
