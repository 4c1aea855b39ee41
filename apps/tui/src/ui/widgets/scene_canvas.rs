//! Paints a `Scene` onto a ratatui canvas. Scene y grows downward and canvas
//! y grows upward, so every y coordinate goes through `flip`.

use crate::ui::widgets::popup::{beside_cell, ClearWidget};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line as TextLine;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine, Points, Rectangle};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use shop_story::scene::{Anchor, Axis, AxisOrient, Mark, Rgb, Scene, Shape, Surface, Swatch};

/// Chart background; the palette was picked for a light page.
pub const PAPER: Rgb = Rgb(250, 250, 250);
const INK: Rgb = Rgb(0x33, 0x33, 0x33);
const AXIS_INK: Rgb = Rgb(0x55, 0x55, 0x55);

const DASH_ON: f64 = 8.0;
const DASH_OFF: f64 = 6.0;

/// Scene units covered by one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CellSize {
    x: f64,
    y: f64,
}

impl CellSize {
    fn of(area: Rect, surface: Surface) -> Self {
        Self {
            x: surface.width / f64::from(area.width.max(1)),
            y: surface.height / f64::from(area.height.max(1)),
        }
    }
}

pub const fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// `color` at `opacity` over `over`, as an opaque terminal color.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend(color: Rgb, opacity: f64, over: Rgb) -> Color {
    let t = opacity.clamp(0.0, 1.0);
    let mix = |c: u8, b: u8| f64::from(c).mul_add(t, f64::from(b) * (1.0 - t)).round() as u8;
    Color::Rgb(mix(color.0, over.0), mix(color.1, over.1), mix(color.2, over.2))
}

pub fn render_scene(f: &mut Frame<'_>, area: Rect, scene: &Scene) {
    if area.width < 4 || area.height < 3 {
        return;
    }
    let Surface { width, height } = scene.surface;
    let cell = CellSize::of(area, scene.surface);

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .background_color(to_color(PAPER))
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            if let Some(message) = &scene.placeholder {
                print_text(
                    ctx,
                    cell,
                    height,
                    (width / 2.0, height / 2.0),
                    message,
                    Anchor::Middle,
                    Style::default().fg(to_color(INK)),
                );
                return;
            }
            for axis in &scene.axes {
                draw_axis(ctx, axis, cell, height);
            }
            ctx.layer();
            for mark in &scene.marks {
                draw_mark(ctx, scene, mark, cell, height);
            }
            draw_legend(ctx, scene, cell, height);
        });

    f.render_widget(canvas, area);
}

const fn flip(height: f64, y: f64) -> f64 {
    height - y
}

fn draw_axis(ctx: &mut Context<'_>, axis: &Axis, cell: CellSize, height: f64) {
    let (r0, r1) = axis.range;
    let (lo, hi) = (r0.min(r1), r0.max(r1));
    let color = to_color(AXIS_INK);
    let label = Style::default().fg(to_color(INK));

    match axis.orient {
        AxisOrient::Bottom => {
            let y = axis.offset;
            ctx.draw(&CanvasLine {
                x1: lo,
                y1: flip(height, y),
                x2: hi,
                y2: flip(height, y),
                color,
            });
            for tick in &axis.ticks {
                ctx.draw(&CanvasLine {
                    x1: tick.position,
                    y1: flip(height, y),
                    x2: tick.position,
                    y2: flip(height, y + 6.0),
                    color,
                });
                print_text(
                    ctx,
                    cell,
                    height,
                    (tick.position, y + 18.0),
                    &tick.label,
                    Anchor::Middle,
                    label,
                );
            }
            print_text(
                ctx,
                cell,
                height,
                ((lo + hi) / 2.0, (y + 42.0).min(height - 4.0)),
                &axis.title,
                Anchor::Middle,
                label,
            );
        }
        AxisOrient::Left => {
            let x = axis.offset;
            ctx.draw(&CanvasLine {
                x1: x,
                y1: flip(height, lo),
                x2: x,
                y2: flip(height, hi),
                color,
            });
            for tick in &axis.ticks {
                ctx.draw(&CanvasLine {
                    x1: x - 6.0,
                    y1: flip(height, tick.position),
                    x2: x,
                    y2: flip(height, tick.position),
                    color,
                });
                print_text(
                    ctx,
                    cell,
                    height,
                    (x - 9.0, tick.position),
                    &tick.label,
                    Anchor::End,
                    label,
                );
            }
            // No rotated text in a terminal: the title sits above the axis.
            print_text(
                ctx,
                cell,
                height,
                (x, (lo - 12.0).max(cell.y)),
                &axis.title,
                Anchor::Start,
                label,
            );
        }
    }
}

fn draw_mark(ctx: &mut Context<'_>, scene: &Scene, mark: &Mark, cell: CellSize, height: f64) {
    let opacity = scene.effective_opacity(mark);
    let stroke = mark
        .effective_stroke()
        .map(|(color, _)| blend(color, opacity, PAPER));

    match &mark.shape {
        Shape::Circle { cx, cy, r } => {
            let center = (*cx, flip(height, *cy));
            if let Some(fill) = mark.fill {
                let coords = disc(center, *r, cell);
                ctx.draw(&Points {
                    coords: &coords,
                    color: blend(fill, opacity, PAPER),
                });
            }
            if let Some(color) = stroke {
                ctx.draw(&Circle {
                    x: center.0,
                    y: center.1,
                    radius: *r,
                    color,
                });
            }
        }
        Shape::Rect {
            x,
            y,
            width,
            height: h,
        } => {
            let bottom = flip(height, y + h);
            if let Some(fill) = mark.fill {
                let coords = block((*x, bottom), (*width, *h), cell);
                ctx.draw(&Points {
                    coords: &coords,
                    color: blend(fill, opacity, PAPER),
                });
            }
            if let Some(color) = stroke {
                ctx.draw(&Rectangle {
                    x: *x,
                    y: bottom,
                    width: *width,
                    height: *h,
                    color,
                });
            }
        }
        Shape::Line {
            x1,
            y1,
            x2,
            y2,
            dashed,
        } => {
            let color = stroke.unwrap_or_else(|| blend(AXIS_INK, opacity, PAPER));
            let from = (*x1, flip(height, *y1));
            let to = (*x2, flip(height, *y2));
            if *dashed {
                for (a, b) in dashes(from, to) {
                    ctx.draw(&CanvasLine {
                        x1: a.0,
                        y1: a.1,
                        x2: b.0,
                        y2: b.1,
                        color,
                    });
                }
            } else {
                ctx.draw(&CanvasLine {
                    x1: from.0,
                    y1: from.1,
                    x2: to.0,
                    y2: to.1,
                    color,
                });
            }
        }
        Shape::Text {
            x,
            y,
            text,
            anchor,
            bold,
            ..
        } => {
            let mut style = Style::default().fg(blend(mark.fill.unwrap_or(INK), opacity, PAPER));
            if *bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            print_text(ctx, cell, height, (*x, *y), text, *anchor, style);
        }
    }
}

fn draw_legend(ctx: &mut Context<'_>, scene: &Scene, cell: CellSize, height: f64) {
    let (x, y) = scene.legend_origin;
    for (index, entry) in scene.legend.iter().enumerate() {
        // One legend row per text row, however short the surface is.
        let row = y + index as f64 * cell.y.max(20.0) + 10.0;
        let symbol = match entry.swatch {
            Swatch::Dot => "●",
            Swatch::Square => "■",
        };
        print_text(
            ctx,
            cell,
            height,
            (x, row),
            symbol,
            Anchor::Start,
            Style::default().fg(to_color(entry.color)),
        );
        print_text(
            ctx,
            cell,
            height,
            (x + 2.0 * cell.x, row),
            &entry.label,
            Anchor::Start,
            Style::default().fg(to_color(INK)),
        );
    }
}

fn print_text(
    ctx: &mut Context<'_>,
    cell: CellSize,
    height: f64,
    (x, y): (f64, f64),
    text: &str,
    anchor: Anchor,
    style: Style,
) {
    let columns = text.chars().count() as f64;
    let start = match anchor {
        Anchor::Start => x,
        Anchor::Middle => x - columns * cell.x / 2.0,
        Anchor::End => x - columns * cell.x,
    };
    ctx.print(
        start.max(0.0),
        flip(height, y).clamp(0.0, height),
        TextLine::styled(text.to_string(), style),
    );
}

/// Braille-resolution points covering a disc; at least its center.
fn disc(center: (f64, f64), r: f64, cell: CellSize) -> Vec<(f64, f64)> {
    let (dx, dy) = (cell.x / 2.0, cell.y / 4.0);
    let mut coords = vec![center];
    let mut y = center.1 - r;
    while y <= center.1 + r {
        let mut x = center.0 - r;
        while x <= center.0 + r {
            if (x - center.0).hypot(y - center.1) <= r {
                coords.push((x, y));
            }
            x += dx;
        }
        y += dy;
    }
    coords
}

fn block(origin: (f64, f64), (width, height): (f64, f64), cell: CellSize) -> Vec<(f64, f64)> {
    let (dx, dy) = (cell.x / 2.0, cell.y / 4.0);
    let mut coords = Vec::new();
    let mut y = origin.1;
    while y <= origin.1 + height {
        let mut x = origin.0;
        while x <= origin.0 + width {
            coords.push((x, y));
            x += dx;
        }
        y += dy;
    }
    coords
}

fn dashes(from: (f64, f64), to: (f64, f64)) -> Vec<((f64, f64), (f64, f64))> {
    let length = (to.0 - from.0).hypot(to.1 - from.1);
    if length <= f64::EPSILON {
        return Vec::new();
    }
    let (ux, uy) = ((to.0 - from.0) / length, (to.1 - from.1) / length);
    let mut segments = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + DASH_ON).min(length);
        segments.push((
            (ux.mul_add(start, from.0), uy.mul_add(start, from.1)),
            (ux.mul_add(end, from.0), uy.mul_add(end, from.1)),
        ));
        start = end + DASH_OFF;
    }
    segments
}

/// Topmost interactive mark under any part of terminal cell
/// `(column, row)` of a scene drawn into `area`.
pub fn hit_cell(area: Rect, scene: &Scene, column: u16, row: u16) -> Option<usize> {
    if !area.contains(Position::new(column, row)) {
        return None;
    }
    let cell = CellSize::of(area, scene.surface);
    let left = f64::from(column - area.x) * cell.x;
    let top = f64::from(row - area.y) * cell.y;
    [(0.5, 0.5), (0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)]
        .into_iter()
        .find_map(|(fx, fy): (f64, f64)| {
            scene.hit_test(fx.mul_add(cell.x, left), fy.mul_add(cell.y, top))
        })
}

/// Terminal cell holding scene point `(x, y)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn cell_of(area: Rect, surface: Surface, (x, y): (f64, f64)) -> (u16, u16) {
    let cell = CellSize::of(area, surface);
    let column = (x / cell.x).floor().clamp(0.0, f64::from(area.width.saturating_sub(1)));
    let row = (y / cell.y).floor().clamp(0.0, f64::from(area.height.saturating_sub(1)));
    (area.x + column as u16, area.y + row as u16)
}

fn mark_center(mark: &Mark) -> (f64, f64) {
    match &mark.shape {
        Shape::Circle { cx, cy, .. } => (*cx, *cy),
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => (x + width / 2.0, y + height / 2.0),
        Shape::Line { x1, y1, x2, y2, .. } => ((x1 + x2) / 2.0, (y1 + y2) / 2.0),
        Shape::Text { x, y, .. } => (*x, *y),
    }
}

/// Tooltip box for the hovered mark, kept inside `area`.
pub fn render_tooltip(f: &mut Frame<'_>, area: Rect, scene: &Scene) {
    let Some(mark) = scene.hovered() else {
        return;
    };
    let Some(tooltip) = &mark.tooltip else {
        return;
    };

    let mut lines = vec![TextLine::styled(
        tooltip.title.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    lines.extend(tooltip.lines.iter().map(|line| TextLine::from(line.clone())));

    let text_width = lines.iter().map(TextLine::width).max().unwrap_or(0);
    let popup = beside_cell(
        area,
        cell_of(area, scene.surface, mark_center(mark)),
        u16::try_from(text_width + 2).unwrap_or(u16::MAX),
        u16::try_from(lines.len() + 2).unwrap_or(u16::MAX),
    );

    f.render_widget(ClearWidget, popup);
    f.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(Color::Rgb(0x22, 0x22, 0x22)).fg(Color::Gray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
        popup,
    );
}
