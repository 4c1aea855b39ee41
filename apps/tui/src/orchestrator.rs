//! Binds step events and selector changes to chart state. The host feeds
//! `Message`s in and carries out the returned `Command`s (scrolling, timers).

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::charts::quadrant::ThresholdAxis;
use crate::charts::{render_chart, QuadrantChart, Thresholds};
use crate::data::Dataset;
use crate::domain::{CategoryFilter, ChartId, Highlight};
use crate::scene::{MarkClass, RootClass, Scene, Surface};
use crate::story::Story;

pub const DEFAULT_TOP_N: usize = 10;
/// Delay before the step tracker re-measures after a programmatic scroll.
pub const REFRESH_DELAY: Duration = Duration::from_millis(300);

pub const SCATTER_DEFAULT_OPACITY: f64 = 0.7;
pub const SCATTER_DIMMED_OPACITY: f64 = 0.1;
pub const SCATTER_SPOTLIGHT_OPACITY: f64 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct StoryState {
    pub top_n: usize,
    pub category: CategoryFilter,
    pub active_chart: Option<ChartId>,
    pub active_step: Option<usize>,
    /// Stacked bar dims everything but the highlighted metric.
    pub focused_mode: bool,
    pub thresholds: Thresholds,
}

impl StoryState {
    pub fn new(top_n: usize, category: CategoryFilter, thresholds: Thresholds) -> Self {
        Self {
            top_n,
            category,
            active_chart: None,
            active_step: None,
            focused_mode: false,
            thresholds,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorChange {
    TopN(usize),
    Category(CategoryFilter),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    StepEnter(usize),
    StepExit(usize),
    Selector(SelectorChange),
    SetThresholds(Thresholds),
    NudgeThreshold(ThresholdAxis, i32),
    ResetThresholds,
    ScrollReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Scroll so that step `anchor` sits at the reset line, immediately.
    ScrollToAnchor(usize),
    /// Re-measure the step tracker once `delay` has passed.
    ScheduleRefresh(Duration),
}

pub struct Orchestrator {
    dataset: Arc<Dataset>,
    story: Story,
    surface: Surface,
    state: StoryState,
    scene: Option<Scene>,
    quadrant: QuadrantChart,
    quadrant_scene: Scene,
}

impl Orchestrator {
    pub fn new(
        dataset: Arc<Dataset>,
        story: Story,
        top_n: usize,
        category: CategoryFilter,
        surface: Surface,
    ) -> Self {
        let quadrant = QuadrantChart::new(&dataset.categories, surface);
        let quadrant_scene = quadrant.scene();
        let state = StoryState::new(top_n, category, quadrant.thresholds());
        Self {
            dataset,
            story,
            surface,
            state,
            scene: None,
            quadrant,
            quadrant_scene,
        }
    }

    pub const fn state(&self) -> &StoryState {
        &self.state
    }

    pub const fn story(&self) -> &Story {
        &self.story
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The scroll-driven chart, once a step has been entered or a reset ran.
    pub const fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    pub const fn quadrant(&self) -> &QuadrantChart {
        &self.quadrant
    }

    pub const fn quadrant_scene(&self) -> &Scene {
        &self.quadrant_scene
    }

    pub fn quadrant_scene_mut(&mut self) -> &mut Scene {
        &mut self.quadrant_scene
    }

    /// Options of the category selector: `All` first, then first-appearance
    /// order.
    pub fn category_options(&self) -> Vec<String> {
        let mut options = vec![CategoryFilter::All.label().to_string()];
        options.extend(self.dataset.category_names());
        options
    }

    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::StepEnter(index) => {
                self.enter_step(index);
                Vec::new()
            }
            Message::StepExit(index) => {
                self.exit_step(index);
                Vec::new()
            }
            Message::Selector(change) => self.change_selector(change),
            Message::SetThresholds(thresholds) => {
                self.quadrant.set_thresholds(thresholds);
                self.rebuild_quadrant();
                Vec::new()
            }
            Message::NudgeThreshold(axis, steps) => {
                self.quadrant.nudge(axis, steps);
                self.rebuild_quadrant();
                Vec::new()
            }
            Message::ResetThresholds => {
                self.quadrant.reset_thresholds();
                self.rebuild_quadrant();
                Vec::new()
            }
            Message::ScrollReset => self.reset(),
        }
    }

    fn render(&self, chart: ChartId, highlight: bool) -> Scene {
        render_chart(
            chart,
            &self.dataset.shops,
            &self.state.category,
            self.state.top_n,
            highlight,
            self.surface,
        )
    }

    fn enter_step(&mut self, index: usize) {
        let Some(step) = self.story.step(index).cloned() else {
            warn!(index, "enter for a step that does not exist");
            return;
        };
        info!(
            step = index,
            chart = step.chart.as_str(),
            highlight = step.highlight.as_str(),
            "step enter"
        );

        if self.state.active_chart != Some(step.chart) {
            self.scene = Some(self.render(step.chart, false));
            self.state.active_chart = Some(step.chart);
        }
        self.state.active_step = Some(index);

        match step.chart {
            ChartId::Boxplot => {
                let mut scene = self.render(ChartId::Boxplot, false);
                scene.clear_highlights();
                if step.highlight != Highlight::None {
                    let count = scene.highlight_key(step.highlight);
                    debug!(count, "boxplot marks highlighted");
                }
                self.scene = Some(scene);
            }
            ChartId::StackedBar => {
                let focused = match step.highlight {
                    Highlight::Stack(metric) => Some(metric),
                    _ => None,
                };
                if let Some(scene) = self.scene.as_mut() {
                    scene.clear_highlights_in(MarkClass::Highlightable);
                    if let Some(metric) = focused {
                        scene.highlight_class(MarkClass::Stack(metric));
                    }
                    scene.set_root_class(RootClass::ActiveMode, focused.is_some());
                }
                self.state.focused_mode = focused.is_some();
            }
            ChartId::Scatter => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.set_opacity(MarkClass::Highlightable, SCATTER_DEFAULT_OPACITY);
                    if let Highlight::Scatter(group) = step.highlight {
                        scene.set_opacity(MarkClass::Highlightable, SCATTER_DIMMED_OPACITY);
                        scene.set_opacity(MarkClass::Scatter(group), SCATTER_SPOTLIGHT_OPACITY);
                    }
                }
            }
        }
    }

    fn exit_step(&mut self, index: usize) {
        let Some(step) = self.story.step(index) else {
            return;
        };
        debug!(step = index, chart = step.chart.as_str(), "step exit");
        if step.chart == ChartId::Scatter {
            if let Some(scene) = self.scene.as_mut() {
                scene.set_opacity(MarkClass::Highlightable, SCATTER_DEFAULT_OPACITY);
            }
        }
    }

    fn change_selector(&mut self, change: SelectorChange) -> Vec<Command> {
        match change {
            SelectorChange::TopN(top_n) => {
                info!(top_n, "top-n changed");
                self.state.top_n = top_n;
            }
            SelectorChange::Category(category) => {
                info!(category = category.label(), "category changed");
                self.state.category = category;
            }
        }

        let mut scene = self.render(ChartId::StackedBar, false);
        scene.set_root_class(RootClass::ActiveMode, false);
        self.scene = Some(scene);
        self.state.focused_mode = false;

        self.reset()
    }

    /// Returns to the anchor step with every transient highlight cleared and
    /// the boxplot as the chart on screen. A story without an anchor step
    /// leaves everything as it is.
    fn reset(&mut self) -> Vec<Command> {
        let Some(anchor) = self.story.anchor_index() else {
            debug!("scroll reset skipped: story has no anchor step");
            return Vec::new();
        };
        info!(anchor, "scroll reset");

        self.state.active_chart = None;
        self.state.active_step = None;
        self.state.focused_mode = false;
        // A fresh render carries no highlights or spotlight opacities.
        self.scene = Some(self.render(ChartId::Boxplot, false));

        vec![
            Command::ScrollToAnchor(anchor),
            Command::ScheduleRefresh(REFRESH_DELAY),
        ]
    }

    fn rebuild_quadrant(&mut self) {
        self.state.thresholds = self.quadrant.thresholds();
        self.quadrant_scene = self.quadrant.scene();
        debug!(
            x = self.state.thresholds.x,
            y = self.state.thresholds.y,
            "quadrant thresholds moved"
        );
    }
}
