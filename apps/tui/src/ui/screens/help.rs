use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const SHORTCUTS: [(&str, &str); 12] = [
    ("↑ / ↓, j / k", "Scroll one line"),
    ("PgUp / PgDn, Space", "Scroll one page"),
    ("Home / End", "Jump to the start or the summary"),
    ("Mouse wheel", "Scroll; move the pointer over a chart for details"),
    ("Tab / Shift-Tab", "Step through chart details with the keyboard"),
    ("t", "Set how many shops count as top"),
    ("c", "Pick a category (type to filter)"),
    ("x / X", "Lower / raise the GMV threshold (quadrant chart)"),
    ("y / Y", "Lower / raise the video threshold (quadrant chart)"),
    ("r", "Reset thresholds on the quadrant chart, otherwise back to the first step"),
    ("F1 or ?", "Toggle this help"),
    ("q", "Quit"),
];

pub fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(80, 80, area);
    f.render_widget(ClearWidget, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });

    f.render_widget(help_paragraph, popup_area);

    let hint = Paragraph::new(Text::from(TextLine::from(vec![Span::styled(
        "Press F1 or Esc to close",
        Style::default().fg(Color::Gray),
    )])))
    .alignment(Alignment::Center);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };

    f.render_widget(hint, hint_area);
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let mut lines = vec![
        TextLine::from(vec![Span::styled(
            "Shop Story",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        TextLine::from(""),
        TextLine::from(
            "Scroll through the story; each paragraph changes the chart on the right.",
        ),
        TextLine::from(""),
        TextLine::from(vec![Span::styled(
            "Keyboard Shortcuts:",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
    ];

    lines.extend(SHORTCUTS.iter().map(|(keys, action)| {
        TextLine::from(vec![
            Span::styled(
                format!("  {keys}"),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" - {action}"), Style::default()),
        ])
    }));

    lines
}
