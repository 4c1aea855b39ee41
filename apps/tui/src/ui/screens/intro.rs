use crate::app::App;
use crate::ui::widgets::scene_canvas::{blend, to_color, PAPER};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;
use shop_story::intro::{IntroFrame, BUBBLES, QUESTION, TITLE};
use shop_story::scene::Rgb;
use tachyonfx::EffectRenderer;

const INK: Rgb = Rgb(0x33, 0x33, 0x33);
const AVATAR: Rgb = Rgb(0xff, 0x6b, 0x6b);
const BUBBLE_EDGE: Rgb = Rgb(0x99, 0x99, 0x99);
const BUBBLE_COLORS: [Rgb; 4] = [
    Rgb(0x1a, 0xbc, 0x9c),
    Rgb(0x34, 0x98, 0xdb),
    Rgb(0xf3, 0x9c, 0x12),
    Rgb(0x9b, 0x59, 0xb6),
];
const AVATAR_FACE: [&str; 3] = ["╭─────╮", "│ •‿• │", "╰─────╯"];

/// Avatar, speech bubble, question bubbles and the dropping title, each
/// faded in against the page color by the intro timeline.
pub fn render_intro(app: &App, f: &mut Frame<'_>, area: Rect) {
    f.render_widget(
        Block::default().style(Style::default().bg(to_color(PAPER))),
        area,
    );
    if area.width < 30 || area.height < 12 {
        return;
    }

    let frame = IntroFrame::at(app.intro_elapsed());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(5), // Avatar and speech bubble
            Constraint::Length(1),
            Constraint::Length(3), // Question bubbles
            Constraint::Min(2),    // Title lands here
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(10), Constraint::Min(10)])
        .split(rows[1]);

    let face: Vec<ratatui::text::Line<'_>> = AVATAR_FACE
        .iter()
        .map(|line| ratatui::text::Line::from(*line))
        .collect();
    f.render_widget(
        Paragraph::new(face)
            .style(Style::default().fg(blend(AVATAR, frame.avatar, PAPER)))
            .alignment(Alignment::Center),
        Rect {
            y: top[0].y + 1,
            height: 3,
            ..top[0]
        },
    );

    let speech = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(blend(BUBBLE_EDGE, frame.speech_bubble, PAPER)));
    f.render_widget(
        Paragraph::new(QUESTION)
            .style(Style::default().fg(blend(INK, frame.question, PAPER)))
            .wrap(Wrap { trim: true })
            .block(speech),
        top[1],
    );

    let bubble_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[3]);
    for (index, label) in BUBBLES.iter().enumerate() {
        let edge = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(
                Style::default().fg(blend(BUBBLE_COLORS[index], frame.bubbles[index], PAPER)),
            );
        f.render_widget(
            Paragraph::new(*label)
                .style(Style::default().fg(blend(INK, frame.bubble_texts[index], PAPER)))
                .alignment(Alignment::Center)
                .block(edge),
            bubble_areas[index],
        );
    }

    render_title(app, f, &frame, rows[4]);
}

fn render_title(app: &App, f: &mut Frame<'_>, frame: &IntroFrame, area: Rect) {
    if !frame.title.visible() || area.height == 0 {
        return;
    }

    // Falls from the top of the landing area to its last row.
    let distance = area.height - 1;
    let y = area.y + distance - frame.title.drop_rows(distance);
    let width = u16::try_from(TITLE.chars().count())
        .unwrap_or(u16::MAX)
        .min(area.width);
    let centered = i32::from(area.x) + i32::from((area.width - width) / 2);
    let x = (centered + i32::from(frame.title.shake()))
        .clamp(i32::from(area.x), i32::from(area.right() - width));
    let title_area = Rect {
        x: u16::try_from(x).unwrap_or(area.x),
        y,
        width,
        height: 1,
    };

    f.render_widget(
        Paragraph::new(TITLE).style(
            Style::default()
                .fg(to_color(INK))
                .add_modifier(Modifier::BOLD),
        ),
        title_area,
    );

    if let Ok(mut effect) = app.title_fx.lock() {
        if let Some(effect) = effect.as_mut() {
            let buffer = f.buffer_mut();
            buffer.render_effect(effect, title_area, app.last_tick);
        }
    }
}
