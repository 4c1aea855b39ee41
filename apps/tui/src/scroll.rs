//! Page geometry in terminal rows and the step tracker that turns a scroll
//! offset into step enter/exit events.

use crate::story::{Story, QUADRANT_TEXT, SUMMARY_TEXT};

/// Fraction of the viewport, from the top, where a step becomes current.
pub const TRIGGER: f64 = 0.7;
/// Fraction of the viewport where the scroll reset places the anchor step.
pub const RESET_OFFSET: f64 = 0.65;
/// Share of the summary section that must be visible to hide the filter bar.
pub const SUMMARY_THRESHOLD: f64 = 0.3;
/// Minimum step height as a share of the viewport.
pub const STEP_MIN_HEIGHT: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub top: usize,
    pub height: usize,
}

impl Span {
    pub const fn bottom(self) -> usize {
        self.top + self.height
    }

    pub const fn contains(self, row: usize) -> bool {
        row >= self.top && row < self.bottom()
    }

    /// Rows of this span inside `[start, start + len)`.
    pub fn overlap(self, start: usize, len: usize) -> usize {
        let lo = self.top.max(start);
        let hi = self.bottom().min(start + len);
        hi.saturating_sub(lo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Intro,
    Quadrant,
    Step(usize),
    Summary,
}

/// What the chart pane shows for the section under the trigger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Intro,
    Quadrant,
    Story,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    pub viewport: usize,
    pub text_width: usize,
    pub intro: Span,
    pub quadrant: Span,
    pub steps: Vec<Span>,
    pub summary: Span,
}

impl PageLayout {
    /// Stacks intro, quadrant section, every step and the summary.
    pub fn build(story: &Story, text_width: usize, viewport: usize) -> Self {
        let viewport = viewport.max(1);
        let text_width = text_width.max(1);
        let step_min = scaled(viewport, STEP_MIN_HEIGHT);

        let intro = Span {
            top: 0,
            height: viewport,
        };
        let quadrant = Span {
            top: intro.bottom(),
            height: viewport.max(wrapped_height(QUADRANT_TEXT, text_width) + 4),
        };

        let mut top = quadrant.bottom();
        let steps = story
            .steps()
            .iter()
            .map(|step| {
                let span = Span {
                    top,
                    height: step_min.max(wrapped_height(&step.text, text_width) + 2),
                };
                top = span.bottom();
                span
            })
            .collect();

        let summary = Span {
            top,
            height: (viewport / 2).max(wrapped_height(SUMMARY_TEXT, text_width) + 4),
        };

        Self {
            viewport,
            text_width,
            intro,
            quadrant,
            steps,
            summary,
        }
    }

    pub const fn total_height(&self) -> usize {
        self.summary.bottom()
    }

    pub const fn max_offset(&self) -> usize {
        self.total_height().saturating_sub(self.viewport)
    }

    pub fn clamp_offset(&self, offset: usize) -> usize {
        offset.min(self.max_offset())
    }

    pub fn trigger_row(&self, offset: usize) -> usize {
        offset + scaled(self.viewport, TRIGGER)
    }

    pub fn section_at(&self, row: usize) -> Option<Section> {
        if self.intro.contains(row) {
            return Some(Section::Intro);
        }
        if self.quadrant.contains(row) {
            return Some(Section::Quadrant);
        }
        if let Some(index) = self.step_at(row) {
            return Some(Section::Step(index));
        }
        self.summary.contains(row).then_some(Section::Summary)
    }

    pub fn step_at(&self, row: usize) -> Option<usize> {
        self.steps.iter().position(|span| span.contains(row))
    }

    pub fn pane(&self, offset: usize) -> Pane {
        match self.section_at(self.trigger_row(offset)) {
            Some(Section::Intro) => Pane::Intro,
            Some(Section::Quadrant) => Pane::Quadrant,
            Some(Section::Step(_) | Section::Summary) | None => Pane::Story,
        }
    }

    /// The filter bar hides while enough of the summary is on screen.
    pub fn filter_bar_visible(&self, offset: usize) -> bool {
        let visible = self.summary.overlap(offset, self.viewport) as f64;
        visible / (self.summary.height.max(1) as f64) < SUMMARY_THRESHOLD
    }

    /// Offset that puts the top of step `anchor` at 0.65 of the viewport.
    pub fn reset_offset(&self, anchor: usize) -> Option<usize> {
        let span = self.steps.get(anchor)?;
        let target = reset_target(span.top as f64, self.viewport as f64);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rows = target.round() as usize;
        Some(self.clamp_offset(rows))
    }
}

/// `anchor_top - 0.65 * viewport`, never above the page.
pub fn reset_target(anchor_top: f64, viewport_height: f64) -> f64 {
    RESET_OFFSET.mul_add(-viewport_height, anchor_top).max(0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled(rows: usize, fraction: f64) -> usize {
    (rows as f64 * fraction).floor() as usize
}

/// Rows needed to word-wrap `text` into `width` columns.
pub fn wrapped_height(text: &str, width: usize) -> usize {
    let width = width.max(1);
    let mut lines = 0;
    for paragraph in text.split('\n') {
        let mut used = 0;
        let mut paragraph_lines = 1;
        for word in paragraph.split_whitespace() {
            let len = word.chars().count();
            if used == 0 {
                paragraph_lines += (len.max(1) - 1) / width;
                used = len % width;
                if used == 0 && len > 0 {
                    used = width;
                }
            } else if used + 1 + len <= width {
                used += 1 + len;
            } else {
                paragraph_lines += 1 + (len.max(1) - 1) / width;
                used = len % width;
                if used == 0 {
                    used = width;
                }
            }
        }
        lines += paragraph_lines;
    }
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Enter(usize),
    Exit(usize),
}

/// Tracks which step holds the trigger line.
#[derive(Debug, Clone, Default)]
pub struct StepTracker {
    current: Option<usize>,
}

impl StepTracker {
    pub const fn new() -> Self {
        Self { current: None }
    }

    pub const fn current(&self) -> Option<usize> {
        self.current
    }

    /// Emits `Exit(old)` then `Enter(new)` when the trigger line crosses
    /// into another step; nothing when the step is unchanged.
    pub fn update(&mut self, layout: &PageLayout, offset: usize) -> Vec<StepEvent> {
        let next = layout.step_at(layout.trigger_row(offset));
        if next == self.current {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(2);
        if let Some(old) = self.current {
            events.push(StepEvent::Exit(old));
        }
        if let Some(new) = next {
            events.push(StepEvent::Enter(new));
        }
        self.current = next;
        events
    }

    /// Re-evaluates against a rebuilt layout, e.g. after a resize or a
    /// programmatic scroll.
    pub fn refresh(&mut self, layout: &PageLayout, offset: usize) -> Vec<StepEvent> {
        self.update(layout, offset)
    }

    /// Drops the current step without an exit event, so the next update
    /// re-enters whatever step is under the trigger line.
    pub fn forget(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartId, Highlight};
    use crate::story::NarrativeStep;

    fn story(count: usize) -> Story {
        let steps = (0..count)
            .map(|i| NarrativeStep::new(ChartId::Boxplot, Highlight::None, format!("step {i}")))
            .collect();
        Story::new(steps).unwrap()
    }

    #[test]
    fn steps_are_at_least_most_of_a_viewport() {
        let layout = PageLayout::build(&story(3), 40, 50);
        assert_eq!(layout.intro, Span { top: 0, height: 50 });
        assert_eq!(layout.quadrant.top, 50);
        for span in &layout.steps {
            assert!(span.height >= 40);
        }
        assert_eq!(layout.steps[0].top, layout.quadrant.bottom());
        assert_eq!(layout.summary.top, layout.steps[2].bottom());
    }

    #[test]
    fn trigger_line_picks_the_step() {
        let layout = PageLayout::build(&story(3), 40, 50);
        let offset = layout.steps[1].top - 35;
        assert_eq!(layout.step_at(layout.trigger_row(offset)), Some(1));
        assert_eq!(layout.pane(0), Pane::Intro);
        assert_eq!(layout.pane(layout.quadrant.top), Pane::Quadrant);
        assert_eq!(layout.pane(offset), Pane::Story);
    }

    #[test]
    fn tracker_exits_before_entering() {
        let layout = PageLayout::build(&story(3), 40, 50);
        let mut tracker = StepTracker::new();
        assert!(tracker.update(&layout, 0).is_empty());

        let first = layout.steps[0].top - 35;
        assert_eq!(tracker.update(&layout, first), vec![StepEvent::Enter(0)]);
        assert!(tracker.update(&layout, first + 1).is_empty());

        let second = layout.steps[1].top - 35;
        assert_eq!(
            tracker.update(&layout, second),
            vec![StepEvent::Exit(0), StepEvent::Enter(1)]
        );

        assert_eq!(tracker.update(&layout, 0), vec![StepEvent::Exit(1)]);
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn refresh_is_quiet_for_an_unchanged_step() {
        let layout = PageLayout::build(&story(2), 40, 50);
        let mut tracker = StepTracker::new();
        let offset = layout.steps[0].top - 30;
        tracker.update(&layout, offset);

        let resized = PageLayout::build(&story(2), 60, 50);
        assert!(tracker.refresh(&resized, offset).is_empty());

        tracker.forget();
        assert_eq!(tracker.refresh(&resized, offset), vec![StepEvent::Enter(0)]);
    }

    #[test]
    fn filter_bar_hides_over_the_summary() {
        let layout = PageLayout::build(&story(2), 40, 50);
        assert!(layout.filter_bar_visible(0));
        assert!(!layout.filter_bar_visible(layout.max_offset()));

        let summary = layout.summary;
        let barely = summary.top + (summary.height * 3) / 10 - 1 - layout.viewport;
        assert!(layout.filter_bar_visible(barely));
    }

    #[test]
    fn reset_places_anchor_at_sixty_five_percent() {
        assert!((reset_target(1000.0, 800.0) - 480.0).abs() < 1e-9);
        assert_eq!(reset_target(100.0, 800.0), 0.0);

        let layout = PageLayout::build(&story(3), 40, 40);
        let offset = layout.reset_offset(0).unwrap();
        assert_eq!(offset, layout.steps[0].top - 26);
        let trigger = layout.trigger_row(offset);
        assert_eq!(layout.step_at(trigger), Some(0));
        assert_eq!(layout.reset_offset(7), None);
    }

    #[test]
    fn wrapping_counts_rows() {
        assert_eq!(wrapped_height("", 10), 1);
        assert_eq!(wrapped_height("one two three", 7), 2);
        assert_eq!(wrapped_height("one two three", 13), 1);
        assert_eq!(wrapped_height("abcdefghijkl", 5), 3);
        assert_eq!(wrapped_height("a\nb", 10), 2);
    }
}
