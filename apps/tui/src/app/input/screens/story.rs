use crate::app::state::App;
use crossterm::event::KeyCode;
use shop_story::charts::quadrant::ThresholdAxis;
use shop_story::scroll::Pane;

/// Rows per mouse wheel notch and per arrow key.
pub const WHEEL_ROWS: isize = 3;
const LINE_ROWS: isize = 1;

pub fn handle_story_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Esc => {
            app.leave_hover();
        }
        KeyCode::Up | KeyCode::Char('k') => app.scroll_by(-LINE_ROWS),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_by(LINE_ROWS),
        KeyCode::PageUp => app.scroll_by(-rows(app.page_rows())),
        KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_by(rows(app.page_rows())),
        KeyCode::Home => app.scroll_to(0),
        KeyCode::End => app.scroll_to_end(),
        KeyCode::Tab => app.cycle_hover(true),
        KeyCode::BackTab => app.cycle_hover(false),
        KeyCode::Char('t') => app.begin_top_n(),
        KeyCode::Char('c') => app.begin_category(),
        KeyCode::Char(c @ ('x' | 'X' | 'y' | 'Y')) => nudge(app, c),
        KeyCode::Char('r') => {
            if app.pane() == Pane::Quadrant {
                app.reset_thresholds();
            } else {
                app.scroll_reset();
            }
        }
        _ => {}
    }
}

/// Lowercase lowers a threshold one slider step, uppercase raises it.
fn nudge(app: &mut App, key: char) {
    if app.pane() != Pane::Quadrant {
        app.status_message = "Scroll to the quadrant chart to move its thresholds".to_string();
        return;
    }
    let axis = if key.eq_ignore_ascii_case(&'x') {
        ThresholdAxis::Gmv
    } else {
        ThresholdAxis::Videos
    };
    let steps = if key.is_ascii_uppercase() { 1 } else { -1 };
    app.nudge_threshold(axis, steps);
}

fn rows(count: usize) -> isize {
    isize::try_from(count).unwrap_or(isize::MAX)
}
