use crate::app::App;
use crate::ui::widgets::popup::centered_rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, BRAILLE_SIX};

pub fn render_loading(app: &App, f: &mut Frame<'_>) {
    let area = centered_rect(50, 20, f.area());

    let loading_block = Block::default()
        .title("== Shop Story ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = loading_block.inner(area);
    f.render_widget(loading_block, area);

    let throbber = Throbber::default()
        .label(app.status_message.clone())
        .style(Style::default().fg(Color::White))
        .throbber_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .throbber_set(BRAILLE_SIX);

    let mut state = app.throbber.clone();
    f.render_stateful_widget(throbber, inner, &mut state);
}
