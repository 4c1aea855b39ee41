//! Retained-mode scene graph shared by every chart. Renderers fill a
//! `Scene` from scratch; the orchestrator restyles it by class or highlight
//! key; the terminal and SVG back ends only read it.

use crate::domain::{Highlight, Metric, ScatterGroup, ShopGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    #[allow(clippy::cast_possible_truncation)]
    pub const fn hex(value: u32) -> Self {
        Self((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    pub fn css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Drawing area in abstract pixels; y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 560.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Selector classes attached to marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkClass {
    Highlightable,
    Box(ShopGroup),
    Dot(ShopGroup),
    Outlier,
    Whisker,
    Median,
    Stack(Metric),
    Scatter(ScatterGroup),
    QuadrantPoint,
    QuadrantLabel,
    Divider,
}

impl MarkClass {
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Highlightable => "highlightable",
            Self::Box(ShopGroup::Top) => "box-Top",
            Self::Box(ShopGroup::NonTop) => "box-Non-top",
            Self::Dot(ShopGroup::Top) => "dot-top",
            Self::Dot(ShopGroup::NonTop) => "dot-nontop",
            Self::Outlier => "outlier",
            Self::Whisker => "whisker",
            Self::Median => "median",
            Self::Stack(metric) => metric.as_str(),
            Self::Scatter(group) => group.as_str(),
            Self::QuadrantPoint => "quadrant-point",
            Self::QuadrantLabel => "quadrant-label",
            Self::Divider => "divider",
        }
    }
}

/// Classes on the scene root, the equivalent of classes on the svg element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RootClass {
    StackedBar,
    ActiveMode,
}

impl RootClass {
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::StackedBar => "stacked-bar",
            Self::ActiveMode => "active-mode",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        dashed: bool,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        anchor: Anchor,
        size: f64,
        bold: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub title: String,
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }
}

/// Style applied while the pointer is over a mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverStyle {
    pub radius: f64,
    pub stroke: Rgb,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub shape: Shape,
    pub fill: Option<Rgb>,
    pub stroke: Option<Rgb>,
    pub stroke_width: f64,
    pub opacity: f64,
    pub classes: Vec<MarkClass>,
    pub highlight_key: Option<Highlight>,
    pub highlighted: bool,
    pub tooltip: Option<Tooltip>,
    pub hover: Option<HoverStyle>,
}

impl Mark {
    const fn with_shape(shape: Shape) -> Self {
        Self {
            shape,
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
            classes: Vec::new(),
            highlight_key: None,
            highlighted: false,
            tooltip: None,
            hover: None,
        }
    }

    pub const fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Self::with_shape(Shape::Circle { cx, cy, r })
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::with_shape(Shape::Rect {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        })
    }

    pub const fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::with_shape(Shape::Line {
            x1,
            y1,
            x2,
            y2,
            dashed: false,
        })
        .stroked(Rgb(0, 0, 0), 1.0)
    }

    pub fn text(x: f64, y: f64, text: impl Into<String>, anchor: Anchor) -> Self {
        Self::with_shape(Shape::Text {
            x,
            y,
            text: text.into(),
            anchor,
            size: 12.0,
            bold: false,
        })
        .filled(Rgb::hex(0x33_33_33))
    }

    #[must_use]
    pub const fn filled(mut self, color: Rgb) -> Self {
        self.fill = Some(color);
        self
    }

    #[must_use]
    pub const fn stroked(mut self, color: Rgb, width: f64) -> Self {
        self.stroke = Some(color);
        self.stroke_width = width;
        self
    }

    #[must_use]
    pub const fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    #[must_use]
    pub fn class(mut self, class: MarkClass) -> Self {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    #[must_use]
    pub const fn highlight_key(mut self, key: Highlight) -> Self {
        self.highlight_key = Some(key);
        self
    }

    #[must_use]
    pub fn tooltip(mut self, tooltip: Tooltip) -> Self {
        self.tooltip = Some(tooltip);
        self
    }

    #[must_use]
    pub const fn hover(mut self, hover: HoverStyle) -> Self {
        self.hover = Some(hover);
        self
    }

    #[must_use]
    pub fn dashed(mut self) -> Self {
        if let Shape::Line { dashed, .. } = &mut self.shape {
            *dashed = true;
        }
        self
    }

    #[must_use]
    pub fn sized(mut self, font_size: f64, font_bold: bool) -> Self {
        if let Shape::Text { size, bold, .. } = &mut self.shape {
            *size = font_size;
            *bold = font_bold;
        }
        self
    }

    pub fn has_class(&self, class: MarkClass) -> bool {
        self.classes.contains(&class)
    }

    /// Stroke to draw with; highlighted marks get a heavy dark outline.
    pub fn effective_stroke(&self) -> Option<(Rgb, f64)> {
        if self.highlighted {
            return Some((HIGHLIGHT_STROKE, self.stroke_width.max(2.5)));
        }
        self.stroke.map(|color| (color, self.stroke_width))
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        const SLOP: f64 = 2.0;
        match self.shape {
            Shape::Circle { cx, cy, r } => (x - cx).hypot(y - cy) <= r + SLOP,
            Shape::Rect {
                x: rx,
                y: ry,
                width,
                height,
            } => x >= rx && x <= rx + width && y >= ry && y <= ry + height,
            Shape::Line { .. } | Shape::Text { .. } => false,
        }
    }
}

pub const HIGHLIGHT_STROKE: Rgb = Rgb::hex(0x2c_3e_50);
/// Opacity multiplier for the segments a focused stacked bar leaves out.
pub const FOCUS_DIM: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrient {
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// An axis line at `offset` (y for bottom axes, x for left axes) spanning
/// `range` along its own direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub orient: AxisOrient,
    pub offset: f64,
    pub range: (f64, f64),
    pub ticks: Vec<Tick>,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    Dot,
    Square,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
    pub swatch: Swatch,
}

#[derive(Debug, Clone, PartialEq)]
struct SavedStyle {
    index: usize,
    shape: Shape,
    stroke: Option<Rgb>,
    stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub surface: Surface,
    pub title: Option<String>,
    pub root_classes: Vec<RootClass>,
    pub axes: Vec<Axis>,
    pub marks: Vec<Mark>,
    pub legend: Vec<LegendEntry>,
    pub legend_origin: (f64, f64),
    pub placeholder: Option<String>,
    hovered: Option<SavedStyle>,
}

impl Scene {
    pub const fn new(surface: Surface) -> Self {
        Self {
            surface,
            title: None,
            root_classes: Vec::new(),
            axes: Vec::new(),
            marks: Vec::new(),
            legend: Vec::new(),
            legend_origin: (0.0, 0.0),
            placeholder: None,
            hovered: None,
        }
    }

    /// Scene shown when the filtered data is empty.
    pub fn placeholder(surface: Surface, title: &str, message: &str) -> Self {
        let mut scene = Self::new(surface);
        scene.title = Some(title.to_string());
        scene.placeholder = Some(message.to_string());
        scene
    }

    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    pub fn select(&self, class: MarkClass) -> impl Iterator<Item = &Mark> {
        self.marks.iter().filter(move |mark| mark.has_class(class))
    }

    pub fn select_mut(&mut self, class: MarkClass) -> impl Iterator<Item = &mut Mark> {
        self.marks.iter_mut().filter(move |mark| mark.has_class(class))
    }

    pub fn set_opacity(&mut self, class: MarkClass, opacity: f64) {
        for mark in self.select_mut(class) {
            mark.opacity = opacity;
        }
    }

    pub fn clear_highlights(&mut self) {
        for mark in &mut self.marks {
            mark.highlighted = false;
        }
    }

    pub fn clear_highlights_in(&mut self, class: MarkClass) {
        for mark in self.select_mut(class) {
            mark.highlighted = false;
        }
    }

    /// Marks every element carrying `key`; returns how many matched.
    pub fn highlight_key(&mut self, key: Highlight) -> usize {
        let mut count = 0;
        for mark in &mut self.marks {
            if mark.highlight_key == Some(key) {
                mark.highlighted = true;
                count += 1;
            }
        }
        count
    }

    pub fn highlight_class(&mut self, class: MarkClass) -> usize {
        let mut count = 0;
        for mark in self.select_mut(class) {
            mark.highlighted = true;
            count += 1;
        }
        count
    }

    pub fn set_root_class(&mut self, class: RootClass, on: bool) {
        let present = self.root_classes.contains(&class);
        if on && !present {
            self.root_classes.push(class);
        } else if !on && present {
            self.root_classes.retain(|c| *c != class);
        }
    }

    pub fn has_root_class(&self, class: RootClass) -> bool {
        self.root_classes.contains(&class)
    }

    /// Opacity after root-level modes: in active mode a stacked bar dims
    /// every segment that is not highlighted.
    pub fn effective_opacity(&self, mark: &Mark) -> f64 {
        let focused = self.has_root_class(RootClass::StackedBar)
            && self.has_root_class(RootClass::ActiveMode);
        if focused && mark.has_class(MarkClass::Highlightable) && !mark.highlighted {
            mark.opacity * FOCUS_DIM
        } else {
            mark.opacity
        }
    }

    /// Topmost mark with a tooltip under the point.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        self.marks
            .iter()
            .enumerate()
            .rev()
            .find(|(_, mark)| mark.tooltip.is_some() && mark.contains(x, y))
            .map(|(index, _)| index)
    }

    /// Moves the pointer onto mark `index`, restoring whatever was hovered
    /// before.
    pub fn pointer_enter(&mut self, index: usize) {
        if self.hovered.as_ref().map(|saved| saved.index) == Some(index) {
            return;
        }
        self.pointer_leave();
        let Some(mark) = self.marks.get_mut(index) else {
            return;
        };
        self.hovered = Some(SavedStyle {
            index,
            shape: mark.shape.clone(),
            stroke: mark.stroke,
            stroke_width: mark.stroke_width,
        });
        if let Some(hover) = mark.hover {
            if let Shape::Circle { r, .. } = &mut mark.shape {
                *r = hover.radius;
            }
            mark.stroke = Some(hover.stroke);
            mark.stroke_width = hover.stroke_width;
        }
    }

    pub fn pointer_leave(&mut self) {
        if let Some(saved) = self.hovered.take() {
            if let Some(mark) = self.marks.get_mut(saved.index) {
                mark.shape = saved.shape;
                mark.stroke = saved.stroke;
                mark.stroke_width = saved.stroke_width;
            }
        }
    }

    pub fn hovered(&self) -> Option<&Mark> {
        self.hovered
            .as_ref()
            .and_then(|saved| self.marks.get(saved.index))
    }

    /// Indices of marks that have tooltips, in draw order.
    pub fn interactive_marks(&self) -> Vec<usize> {
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, mark)| mark.tooltip.is_some())
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(cx: f64, class: MarkClass) -> Mark {
        Mark::circle(cx, 10.0, 3.0)
            .class(MarkClass::Highlightable)
            .class(class)
            .opacity(0.5)
            .tooltip(Tooltip::new("dot", Vec::new()))
            .hover(HoverStyle {
                radius: 6.0,
                stroke: Rgb::hex(0x11_11_11),
                stroke_width: 2.0,
            })
    }

    #[test]
    fn hex_colors_split_channels() {
        assert_eq!(Rgb::hex(0x1a_bc_9c), Rgb(0x1a, 0xbc, 0x9c));
        assert_eq!(Rgb(255, 107, 107).css(), "#ff6b6b");
    }

    #[test]
    fn class_selection_and_opacity() {
        let mut scene = Scene::new(Surface::default());
        scene.push(dot(10.0, MarkClass::Scatter(ScatterGroup::Top)));
        scene.push(dot(30.0, MarkClass::Scatter(ScatterGroup::LowPrice)));
        scene.set_opacity(MarkClass::Highlightable, 0.1);
        scene.set_opacity(MarkClass::Scatter(ScatterGroup::Top), 0.9);
        let opacities: Vec<f64> = scene.marks.iter().map(|m| m.opacity).collect();
        assert_eq!(opacities, vec![0.9, 0.1]);
    }

    #[test]
    fn hover_restyles_and_restores() {
        let mut scene = Scene::new(Surface::default());
        scene.push(dot(10.0, MarkClass::Dot(ShopGroup::Top)));
        scene.push(dot(40.0, MarkClass::Dot(ShopGroup::NonTop)));

        let hit = scene.hit_test(11.0, 11.0);
        assert_eq!(hit, Some(0));
        scene.pointer_enter(0);
        assert!(matches!(scene.marks[0].shape, Shape::Circle { r, .. } if (r - 6.0).abs() < 1e-9));
        assert_eq!(scene.marks[0].stroke_width, 2.0);

        scene.pointer_enter(1);
        assert!(matches!(scene.marks[0].shape, Shape::Circle { r, .. } if (r - 3.0).abs() < 1e-9));
        assert_eq!(scene.marks[0].stroke, None);

        scene.pointer_leave();
        assert!(scene.hovered().is_none());
        assert!(matches!(scene.marks[1].shape, Shape::Circle { r, .. } if (r - 3.0).abs() < 1e-9));
    }

    #[test]
    fn root_classes_toggle_once() {
        let mut scene = Scene::new(Surface::default());
        scene.set_root_class(RootClass::ActiveMode, true);
        scene.set_root_class(RootClass::ActiveMode, true);
        assert_eq!(scene.root_classes, vec![RootClass::ActiveMode]);
        scene.set_root_class(RootClass::ActiveMode, false);
        assert!(!scene.has_root_class(RootClass::ActiveMode));
    }

    #[test]
    fn active_mode_dims_unhighlighted_segments() {
        let mut scene = Scene::new(Surface::default());
        scene.push(dot(10.0, MarkClass::Stack(Metric::Videos)));
        scene.push(dot(20.0, MarkClass::Stack(Metric::Creators)));
        scene.set_root_class(RootClass::StackedBar, true);
        scene.highlight_class(MarkClass::Stack(Metric::Videos));
        assert!((scene.effective_opacity(&scene.marks[1]) - 0.5).abs() < 1e-9);

        scene.set_root_class(RootClass::ActiveMode, true);
        assert!((scene.effective_opacity(&scene.marks[0]) - 0.5).abs() < 1e-9);
        assert!((scene.effective_opacity(&scene.marks[1]) - 0.15).abs() < 1e-9);
        assert_eq!(
            scene.marks[0].effective_stroke(),
            Some((HIGHLIGHT_STROKE, 2.5))
        );
    }

    #[test]
    fn highlight_by_key_counts_matches() {
        let mut scene = Scene::new(Surface::default());
        scene.push(Mark::rect(0.0, 0.0, 10.0, 10.0).highlight_key(Highlight::BoxCore));
        scene.push(dot(10.0, MarkClass::Outlier).highlight_key(Highlight::BoxOutliers));
        assert_eq!(scene.highlight_key(Highlight::BoxOutliers), 1);
        assert!(scene.marks[1].highlighted);
        scene.clear_highlights();
        assert!(scene.marks.iter().all(|m| !m.highlighted));
    }
}
