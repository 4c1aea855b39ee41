use crate::app::{App, InputMode};
use crate::ui::layout::story_areas;
use crate::ui::screens::intro::render_intro;
use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use crate::ui::widgets::scene_canvas::{render_scene, render_tooltip};
use ratatui::layout::{Alignment, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;
use shop_story::charts::millions;
use shop_story::intro::TITLE;
use shop_story::orchestrator::Orchestrator;
use shop_story::scroll::{PageLayout, Pane, Span as PageSpan};
use shop_story::story::{QUADRANT_HEADING, QUADRANT_TEXT, SUMMARY_HEADING, SUMMARY_TEXT};

pub fn render_story(app: &App, f: &mut Frame<'_>) {
    let (Some(orchestrator), Some(layout)) = (&app.orchestrator, &app.layout) else {
        return;
    };
    let areas = story_areas(f.area(), app.filter_visible());

    render_title_section(app, orchestrator, layout, f, areas.title);
    render_narrative(app, orchestrator, layout, f, areas.narrative);
    if let Some(filter) = areas.filter {
        render_filter_bar(app, orchestrator, f, filter);
    }
    render_chart_pane(app, orchestrator, f, areas.chart);
    render_status_section(app, f, areas.status);
    render_shortcuts(app, f, areas.shortcuts);

    if app.input_mode == InputMode::PickingCategory {
        render_category_picker(app, f, areas.chart);
    }
}

fn render_title_section(
    app: &App,
    orchestrator: &Orchestrator,
    layout: &PageLayout,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let title_block = Block::default()
        .title("== Shop Story ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let where_label = match app.pane() {
        Pane::Intro => "Intro".to_string(),
        Pane::Quadrant => "Category quadrants".to_string(),
        Pane::Story => orchestrator.state().active_step.map_or_else(
            || "Summary".to_string(),
            |step| format!("Step {} of {}", step + 1, orchestrator.story().len()),
        ),
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let progress = if layout.max_offset() == 0 {
        100
    } else {
        (app.offset as f64 / layout.max_offset() as f64 * 100.0).round() as u16
    };

    let title = Paragraph::new(TextLine::from(vec![
        Span::styled(
            TITLE,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   {where_label} · {progress}%"),
            Style::default().fg(Color::Gray),
        ),
    ]))
    .block(title_block)
    .alignment(Alignment::Left);

    f.render_widget(title, area);
}

fn render_narrative(
    app: &App,
    orchestrator: &Orchestrator,
    layout: &PageLayout,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let narrative_block = Block::default()
        .title(" Story ")
        .title_style(Style::default().fg(Color::Green))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    f.render_widget(narrative_block, area);

    let viewport = area.inner(Margin::new(2, 1));
    let heading = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let intro = Text::from(vec![
        TextLine::from(""),
        TextLine::styled(
            shop_story::intro::QUESTION,
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ),
        TextLine::from(""),
        TextLine::styled(
            "Scroll down (↓, Space or the mouse wheel) to begin.",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    render_section(f, viewport, app.offset, layout.intro, intro);

    let quadrant = Text::from(vec![
        TextLine::styled(QUADRANT_HEADING, heading),
        TextLine::from(""),
        TextLine::styled(QUADRANT_TEXT, Style::default().fg(Color::Gray)),
        TextLine::from(""),
        TextLine::styled(
            "x/X and y/Y move the thresholds, r puts them back.",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    render_section(f, viewport, app.offset, layout.quadrant, quadrant);

    let active = orchestrator.state().active_step;
    for (index, (step, span)) in orchestrator
        .story()
        .steps()
        .iter()
        .zip(&layout.steps)
        .enumerate()
    {
        let style = if active == Some(index) {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text = Text::from(vec![
            TextLine::from(""),
            TextLine::styled(step.text.clone(), style),
        ]);
        render_section(f, viewport, app.offset, *span, text);
    }

    let summary = Text::from(vec![
        TextLine::styled(SUMMARY_HEADING, heading),
        TextLine::from(""),
        TextLine::styled(SUMMARY_TEXT, Style::default().fg(Color::Gray)),
    ]);
    render_section(f, viewport, app.offset, layout.summary, summary);
}

/// Draws the visible rows of one page section, clipping its top when the
/// section starts above the viewport.
fn render_section(
    f: &mut Frame<'_>,
    viewport: Rect,
    offset: usize,
    span: PageSpan,
    text: Text<'static>,
) {
    let visible = span.overlap(offset, usize::from(viewport.height));
    if visible == 0 {
        return;
    }
    let top = span.top.max(offset) - offset;
    let area = Rect {
        x: viewport.x,
        y: viewport.y + u16::try_from(top).unwrap_or(u16::MAX),
        width: viewport.width,
        height: u16::try_from(visible).unwrap_or(u16::MAX),
    };
    let clipped = u16::try_from(offset.saturating_sub(span.top)).unwrap_or(u16::MAX);

    f.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .scroll((clipped, 0)),
        area,
    );
}

fn render_filter_bar(app: &App, orchestrator: &Orchestrator, f: &mut Frame<'_>, area: Rect) {
    let filter_block = Block::default()
        .title(" Filters ")
        .title_style(Style::default().fg(Color::Magenta))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let editing = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let state = orchestrator.state();
    let top_n = if app.input_mode == InputMode::EnteringTopN {
        Span::styled(format!("{}_", app.current_input), editing)
    } else {
        Span::styled(state.top_n.to_string(), value)
    };

    let line = TextLine::from(vec![
        Span::styled("Top N: ", label),
        top_n,
        Span::styled("   Category: ", label),
        Span::styled(state.category.label().to_string(), value),
        Span::styled("   (t / c to change)", Style::default().fg(Color::DarkGray)),
    ]);

    f.render_widget(Paragraph::new(line).block(filter_block), area);
}

fn render_chart_pane(app: &App, orchestrator: &Orchestrator, f: &mut Frame<'_>, area: Rect) {
    let pane = app.pane();
    let scene = match pane {
        Pane::Intro => None,
        Pane::Quadrant => Some(orchestrator.quadrant_scene()),
        Pane::Story => orchestrator.scene(),
    };

    let title = match scene.and_then(|scene| scene.title.as_deref()) {
        _ if pane == Pane::Intro => " Intro ".to_string(),
        Some(title) => format!(" {title} "),
        None => " Chart ".to_string(),
    };

    let mut chart_block = Block::default()
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Blue));

    if pane == Pane::Quadrant {
        let thresholds = orchestrator.state().thresholds;
        chart_block = chart_block.title_bottom(format!(
            " GMV ≥ ${} · videos ≥ {:.0} ",
            millions(thresholds.x, 2),
            thresholds.y
        ));
    }

    let inner = area.inner(Margin::new(1, 1));
    f.render_widget(chart_block, area);

    match (pane, scene) {
        (Pane::Intro, _) => render_intro(app, f, inner),
        (_, Some(scene)) => {
            render_scene(f, inner, scene);
            render_tooltip(f, inner, scene);
        }
        (_, None) => {
            let waiting = Paragraph::new("The chart appears with the first step.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            f.render_widget(waiting, inner);
        }
    }
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let status = Paragraph::new(Span::styled(
        app.status_message.clone(),
        Style::default().fg(Color::White),
    ))
    .block(status_block);

    f.render_widget(status, area);
}

fn render_shortcuts(app: &App, f: &mut Frame<'_>, area: Rect) {
    let hint = match app.input_mode {
        InputMode::Browse => {
            "↑↓/PgUp/PgDn scroll · t top N · c category · Tab hover · r reset · F1 help · q quit"
        }
        InputMode::EnteringTopN => "type a number · Enter apply · Esc cancel",
        InputMode::PickingCategory => "type to filter · ↑↓ choose · Enter apply · Esc cancel",
    };
    f.render_widget(
        Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn render_category_picker(app: &App, f: &mut Frame<'_>, area: Rect) {
    let Some(picker) = &app.picker else {
        return;
    };
    let popup_area = centered_rect(60, 70, area);
    f.render_widget(ClearWidget, popup_area);

    let picker_block = Block::default()
        .title(format!(" Category: {}_ ", picker.query()))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let matches = picker.matches();
    let rows = usize::from(popup_area.height.saturating_sub(2)).max(1);
    let first = picker.selected().saturating_sub(rows - 1);

    let lines: Vec<TextLine<'_>> = if matches.is_empty() {
        vec![TextLine::styled(
            "No category matches",
            Style::default().fg(Color::DarkGray),
        )]
    } else {
        matches
            .iter()
            .enumerate()
            .skip(first)
            .take(rows)
            .map(|(index, option)| {
                if index == picker.selected() {
                    TextLine::styled(
                        format!("> {option}"),
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    TextLine::from(format!("  {option}"))
                }
            })
            .collect()
    };

    f.render_widget(Paragraph::new(lines).block(picker_block), popup_area);
}
