use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_failed(f: &mut Frame<'_>, message: &str) {
    let area = centered_rect(70, 40, f.area());
    f.render_widget(ClearWidget, area);

    let error_block = Block::default()
        .title(" Could not load the story ")
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = Text::from(vec![
        TextLine::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::White),
        )),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Check STORY_DATA_DIR / --data-dir, then press r to retry or q to quit.",
            Style::default().fg(Color::Gray),
        )),
    ]);

    f.render_widget(
        Paragraph::new(text)
            .block(error_block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true }),
        area,
    );
}
