use crate::app::input::helpers::{push_bounded, MAX_TOP_N_INPUT};
use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_top_n_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Enter => app.submit_top_n(),
        KeyCode::Esc => {
            app.cancel_input();
            app.status_message.clear();
        }
        KeyCode::Backspace => {
            app.current_input.pop();
        }
        KeyCode::Char(c) => {
            push_bounded(&mut app.current_input, c, MAX_TOP_N_INPUT);
        }
        _ => {}
    }
}

pub fn handle_category_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Enter => {
            app.submit_category();
            return;
        }
        KeyCode::Esc => {
            app.cancel_input();
            app.status_message.clear();
            return;
        }
        _ => {}
    }

    let Some(picker) = app.picker.as_mut() else {
        return;
    };
    match key {
        KeyCode::Up => picker.prev(),
        KeyCode::Down | KeyCode::Tab => picker.next(),
        KeyCode::Backspace => picker.pop(),
        KeyCode::Char(c) if !c.is_control() => picker.push(c),
        _ => {}
    }
}
