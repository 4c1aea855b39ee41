pub mod helpers;
mod screens;

use crate::app::state::{App, AppScreen};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use screens::story::WHEEL_ROWS;

pub fn handle_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.running = false;
        return;
    }
    screens::dispatch_input(app, key.code);
}

/// Wheel scrolls the page, movement drives hover on the chart pane.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != AppScreen::Story || app.show_help {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_by(WHEEL_ROWS),
        MouseEventKind::ScrollUp => app.scroll_by(-WHEEL_ROWS),
        MouseEventKind::Moved => app.hover_at(mouse.column, mouse.row),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::InputMode;
    use crate::config::StoryConfig;
    use crossterm::event::KeyEventKind;
    use ratatui::layout::Rect;
    use shop_story::data::Dataset;
    use shop_story::domain::CategoryFilter;
    use shop_story::story::Story;
    use std::path::PathBuf;

    fn app() -> App {
        let config = StoryConfig {
            shops_path: PathBuf::from("shops.json"),
            categories_path: PathBuf::from("categories.json"),
            steps_path: None,
            log_file: PathBuf::from("test.log"),
            top_n: 10,
            category: CategoryFilter::All,
            debug: false,
        };
        let mut app = App::new(config, Rect::new(0, 0, 100, 30));
        app.on_loaded(Dataset::default(), Story::default_story());
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_input(
            app,
            KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press),
        );
    }

    #[test]
    fn help_swallows_keys_until_closed() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn typing_top_n_does_not_trigger_shortcuts() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.input_mode, InputMode::EnteringTopN);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('?'));
        assert!(app.running);
        assert!(!app.show_help);
        assert_eq!(app.current_input, "q?");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Browse);
    }

    #[test]
    fn scrolling_keys_move_the_page() {
        let mut app = app();
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.offset, app.page_rows());
        press(&mut app, KeyCode::Up);
        assert_eq!(app.offset, app.page_rows() - 1);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.offset, 0);
        press(&mut app, KeyCode::End);
        assert_eq!(app.offset, app.layout.as_ref().unwrap().max_offset());
    }

    #[test]
    fn wheel_scrolls_three_rows() {
        let mut app = app();
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 10,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut app, wheel);
        assert_eq!(app.offset, 3);
    }
}
