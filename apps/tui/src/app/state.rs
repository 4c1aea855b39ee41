use crate::app::input::helpers::cycle;
use crate::config::{parse_top_n, StoryConfig};
use crate::ui::layout::{chart_canvas, narrative_viewport};
use crate::ui::widgets::scene_canvas::hit_cell;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use ratatui::layout::Rect;
use ratatui::style::Color;
use shop_story::charts::millions;
use shop_story::charts::quadrant::ThresholdAxis;
use shop_story::data::Dataset;
use shop_story::domain::CategoryFilter;
use shop_story::intro::TitlePhase;
use shop_story::orchestrator::{Command, Message, Orchestrator, SelectorChange};
use shop_story::scene::{Scene, Surface};
use shop_story::scroll::{PageLayout, Pane, StepEvent, StepTracker};
use shop_story::story::Story;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tachyonfx::{fx, Effect, Interpolation};
use throbber_widgets_tui::ThrobberState;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppScreen {
    Loading,
    Story,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    EnteringTopN,
    PickingCategory,
}

/// Category selector with fuzzy filtering over `All` plus every category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPicker {
    query: String,
    options: Vec<String>,
    matches: Vec<usize>,
    selected: usize,
}

impl CategoryPicker {
    pub fn new(options: Vec<String>, current: &str) -> Self {
        let selected = options.iter().position(|o| o == current).unwrap_or(0);
        Self {
            query: String::new(),
            matches: (0..options.len()).collect(),
            options,
            selected,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> Vec<&str> {
        self.matches
            .iter()
            .map(|&index| self.options[index].as_str())
            .collect()
    }

    pub const fn selected(&self) -> usize {
        self.selected
    }

    pub fn choice(&self) -> Option<&str> {
        self.matches
            .get(self.selected)
            .map(|&index| self.options[index].as_str())
    }

    pub fn push(&mut self, c: char) {
        self.query.push(c);
        self.refilter();
    }

    pub fn pop(&mut self) {
        self.query.pop();
        self.refilter();
    }

    pub fn next(&mut self) {
        self.selected = cycle(Some(self.selected), self.matches.len(), true);
    }

    pub fn prev(&mut self) {
        self.selected = cycle(Some(self.selected), self.matches.len(), false);
    }

    fn refilter(&mut self) {
        self.selected = 0;
        if self.query.is_empty() {
            self.matches = (0..self.options.len()).collect();
            return;
        }
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, usize)> = self
            .options
            .iter()
            .enumerate()
            .filter_map(|(index, option)| {
                matcher
                    .fuzzy_match(option, &self.query)
                    .map(|score| (score, index))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        self.matches = scored.into_iter().map(|(_, index)| index).collect();
    }
}

pub struct App {
    pub running: bool,
    pub screen: AppScreen,
    pub config: StoryConfig,
    pub orchestrator: Option<Orchestrator>,
    pub layout: Option<PageLayout>,
    pub tracker: StepTracker,
    /// First page row shown in the narrative column.
    pub offset: usize,
    pub refresh_at: Option<Instant>,
    pub intro_started: Instant,
    pub status_message: String,
    pub show_help: bool,
    pub input_mode: InputMode,
    pub current_input: String,
    pub picker: Option<CategoryPicker>,
    /// Whole terminal.
    pub area: Rect,
    pub retry_requested: bool,
    pub title_fx: Mutex<Option<Effect>>,
    title_fx_armed: bool,
    pub last_tick: Duration,
    pub last_frame: Instant,
    pub throbber: ThrobberState,
}

impl App {
    pub fn new(config: StoryConfig, area: Rect) -> Self {
        Self {
            running: true,
            screen: AppScreen::Loading,
            config,
            orchestrator: None,
            layout: None,
            tracker: StepTracker::new(),
            offset: 0,
            refresh_at: None,
            intro_started: Instant::now(),
            status_message: String::new(),
            show_help: false,
            input_mode: InputMode::Browse,
            current_input: String::new(),
            picker: None,
            area,
            retry_requested: false,
            title_fx: Mutex::new(None),
            title_fx_armed: false,
            last_tick: Duration::ZERO,
            last_frame: Instant::now(),
            throbber: ThrobberState::default(),
        }
    }

    /// Per-frame housekeeping: frame delta, spinner, the delayed tracker
    /// refresh and the intro title effect.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.last_tick = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.screen == AppScreen::Loading {
            self.throbber.calc_next();
        }

        if self.refresh_at.is_some_and(|at| now >= at) {
            self.refresh_at = None;
            self.refresh_tracker();
        }

        if self.screen == AppScreen::Story {
            self.update_title_fx();
        }
    }

    fn update_title_fx(&mut self) {
        let Ok(mut slot) = self.title_fx.lock() else {
            return;
        };
        if !self.title_fx_armed && TitlePhase::at(self.intro_elapsed()).visible() {
            *slot = Some(fx::fade_from_fg(
                Color::Rgb(250, 250, 250),
                (800, Interpolation::CubicInOut),
            ));
            self.title_fx_armed = true;
        }
        if slot.as_ref().is_some_and(Effect::done) {
            *slot = None;
        }
    }

    pub fn intro_elapsed(&self) -> Duration {
        self.intro_started.elapsed()
    }

    pub fn on_loaded(&mut self, dataset: Dataset, story: Story) {
        info!(
            shops = dataset.shops.len(),
            categories = dataset.categories.len(),
            steps = story.len(),
            "story ready"
        );
        self.orchestrator = Some(Orchestrator::new(
            Arc::new(dataset),
            story,
            self.config.top_n,
            self.config.category.clone(),
            Surface::default(),
        ));
        self.tracker = StepTracker::new();
        self.offset = 0;
        self.rebuild_layout();
        self.screen = AppScreen::Story;
        self.intro_started = Instant::now();
        self.title_fx_armed = false;
        self.status_message = "Scroll down to start the story".to_string();
    }

    pub fn on_load_failed(&mut self, message: String) {
        warn!(error = %message, "story failed to load");
        self.status_message = "Could not load the data; press r to retry".to_string();
        self.screen = AppScreen::Failed(message);
    }

    pub fn on_loading(&mut self) {
        self.screen = AppScreen::Loading;
        self.retry_requested = false;
        self.status_message = "Loading shop data...".to_string();
    }

    fn rebuild_layout(&mut self) {
        let Some(orchestrator) = &self.orchestrator else {
            return;
        };
        let viewport = narrative_viewport(self.area);
        let layout = PageLayout::build(
            orchestrator.story(),
            usize::from(viewport.width),
            usize::from(viewport.height),
        );
        self.offset = layout.clamp_offset(self.offset);
        self.layout = Some(layout);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
        self.rebuild_layout();
        self.refresh_tracker();
    }

    /// Rows moved by PageUp/PageDown.
    pub fn page_rows(&self) -> usize {
        self.layout
            .as_ref()
            .map_or(1, |layout| (layout.viewport * 9 / 10).max(1))
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_to(self.offset.saturating_add_signed(delta));
    }

    pub fn scroll_to(&mut self, offset: usize) {
        let Some(layout) = &self.layout else {
            return;
        };
        let offset = layout.clamp_offset(offset);
        if offset == self.offset {
            return;
        }
        self.offset = offset;
        self.leave_hover();
        self.track();
    }

    pub fn scroll_to_end(&mut self) {
        let end = self.layout.as_ref().map_or(0, PageLayout::max_offset);
        self.scroll_to(end);
    }

    fn track(&mut self) {
        let Some(layout) = &self.layout else {
            return;
        };
        let events = self.tracker.update(layout, self.offset);
        self.dispatch(events);
    }

    fn refresh_tracker(&mut self) {
        let Some(layout) = &self.layout else {
            return;
        };
        let events = self.tracker.refresh(layout, self.offset);
        self.dispatch(events);
    }

    fn dispatch(&mut self, events: Vec<StepEvent>) {
        for event in events {
            let message = match event {
                StepEvent::Enter(index) => Message::StepEnter(index),
                StepEvent::Exit(index) => Message::StepExit(index),
            };
            self.send(message);
        }
    }

    pub fn send(&mut self, message: Message) {
        let Some(orchestrator) = self.orchestrator.as_mut() else {
            return;
        };
        let commands = orchestrator.update(message);
        self.apply(commands);
    }

    fn apply(&mut self, commands: Vec<Command>) {
        for command in commands {
            debug!(?command, "host command");
            match command {
                Command::ScrollToAnchor(anchor) => {
                    if let Some(target) = self
                        .layout
                        .as_ref()
                        .and_then(|layout| layout.reset_offset(anchor))
                    {
                        self.offset = target;
                    }
                    self.leave_hover();
                    self.tracker.forget();
                }
                Command::ScheduleRefresh(delay) => {
                    self.refresh_at = Some(Instant::now() + delay);
                }
            }
        }
    }

    pub fn pane(&self) -> Pane {
        self.layout
            .as_ref()
            .map_or(Pane::Intro, |layout| layout.pane(self.offset))
    }

    pub fn filter_visible(&self) -> bool {
        self.layout
            .as_ref()
            .map_or(true, |layout| layout.filter_bar_visible(self.offset))
    }

    /// Scene shown in the chart pane, if the pane shows a chart at all.
    pub fn active_scene(&self) -> Option<&Scene> {
        let orchestrator = self.orchestrator.as_ref()?;
        match self.pane() {
            Pane::Intro => None,
            Pane::Quadrant => Some(orchestrator.quadrant_scene()),
            Pane::Story => orchestrator.scene(),
        }
    }

    fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        let pane = self.pane();
        let orchestrator = self.orchestrator.as_mut()?;
        match pane {
            Pane::Intro => None,
            Pane::Quadrant => Some(orchestrator.quadrant_scene_mut()),
            Pane::Story => orchestrator.scene_mut(),
        }
    }

    /// Pointer moved to terminal cell `(column, row)`.
    pub fn hover_at(&mut self, column: u16, row: u16) {
        let canvas = chart_canvas(self.area, self.filter_visible());
        let Some(scene) = self.active_scene_mut() else {
            return;
        };
        match hit_cell(canvas, scene, column, row) {
            Some(index) => scene.pointer_enter(index),
            None => scene.pointer_leave(),
        }
    }

    /// Keyboard hover: steps through the marks that carry tooltips.
    pub fn cycle_hover(&mut self, forward: bool) {
        let Some(scene) = self.active_scene_mut() else {
            return;
        };
        let marks = scene.interactive_marks();
        if marks.is_empty() {
            return;
        }
        let current = scene.hovered().and_then(|hovered| {
            marks
                .iter()
                .position(|&index| std::ptr::eq(&scene.marks[index], hovered))
        });
        let next = cycle(current, marks.len(), forward);
        scene.pointer_enter(marks[next]);
    }

    pub fn leave_hover(&mut self) {
        if let Some(orchestrator) = self.orchestrator.as_mut() {
            orchestrator.quadrant_scene_mut().pointer_leave();
            if let Some(scene) = orchestrator.scene_mut() {
                scene.pointer_leave();
            }
        }
    }

    pub fn is_typing(&self) -> bool {
        self.input_mode != InputMode::Browse
    }

    pub fn begin_top_n(&mut self) {
        let Some(orchestrator) = &self.orchestrator else {
            return;
        };
        self.current_input = orchestrator.state().top_n.to_string();
        self.input_mode = InputMode::EnteringTopN;
        self.status_message = "Type the number of top shops, Enter to apply".to_string();
    }

    /// A non-numeric entry leaves the story untouched.
    pub fn submit_top_n(&mut self) {
        match parse_top_n(&self.current_input) {
            Ok(top_n) => {
                self.leave_hover();
                self.send(Message::Selector(SelectorChange::TopN(top_n)));
                self.status_message = format!("Ranking the top {top_n} shops");
            }
            Err(_) => {
                warn!(input = %self.current_input, "rejected top-n input");
                self.status_message =
                    format!("\"{}\" is not a number of shops", self.current_input);
            }
        }
        self.cancel_input();
    }

    pub fn begin_category(&mut self) {
        let Some(orchestrator) = &self.orchestrator else {
            return;
        };
        let current = orchestrator.state().category.label().to_string();
        self.picker = Some(CategoryPicker::new(
            orchestrator.category_options(),
            &current,
        ));
        self.input_mode = InputMode::PickingCategory;
        self.status_message = "Type to filter categories, Enter to apply".to_string();
    }

    pub fn submit_category(&mut self) {
        let choice = self
            .picker
            .as_ref()
            .and_then(CategoryPicker::choice)
            .map(CategoryFilter::parse);
        if let Some(category) = choice {
            self.status_message = format!("Category: {}", category.label());
            self.leave_hover();
            self.send(Message::Selector(SelectorChange::Category(category)));
        } else {
            self.status_message = "No category matches".to_string();
        }
        self.cancel_input();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Browse;
        self.current_input.clear();
        self.picker = None;
    }

    pub fn nudge_threshold(&mut self, axis: ThresholdAxis, steps: i32) {
        self.send(Message::NudgeThreshold(axis, steps));
        self.describe_thresholds();
    }

    pub fn reset_thresholds(&mut self) {
        self.send(Message::ResetThresholds);
        self.describe_thresholds();
    }

    fn describe_thresholds(&mut self) {
        if let Some(orchestrator) = &self.orchestrator {
            let thresholds = orchestrator.state().thresholds;
            self.status_message = format!(
                "Thresholds: GMV ${}, videos {:.0}",
                millions(thresholds.x, 2),
                thresholds.y
            );
        }
    }

    pub fn scroll_reset(&mut self) {
        self.send(Message::ScrollReset);
        self.status_message = "Back to the first chart".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_story::data::{CategoryAggregate, ShopRecord};
    use shop_story::domain::ChartId;
    use std::path::PathBuf;

    fn config() -> StoryConfig {
        StoryConfig {
            shops_path: PathBuf::from("shops.json"),
            categories_path: PathBuf::from("categories.json"),
            steps_path: None,
            log_file: PathBuf::from("test.log"),
            top_n: 2,
            category: CategoryFilter::All,
            debug: false,
        }
    }

    fn shop(name: &str, category: &str, gmv: f64) -> ShopRecord {
        ShopRecord {
            category: category.to_string(),
            unit_price: 10.0,
            total_gmv: gmv,
            related_creators: 1.0,
            related_videos: 1.0,
            selling_products: 1.0,
            shop_name: name.to_string(),
        }
    }

    fn ready_app() -> App {
        let dataset = Dataset::new(
            vec![
                shop("a", "Beauty", 500.0),
                shop("b", "Toys", 300.0),
                shop("c", "Beauty", 100.0),
            ],
            vec![CategoryAggregate {
                category: "Beauty".to_string(),
                avg_gmv: 1.0e6,
                avg_videos: 20.0,
            }],
        );
        let mut app = App::new(config(), Rect::new(0, 0, 120, 40));
        app.on_loaded(dataset, Story::default_story());
        app
    }

    #[test]
    fn picker_filters_fuzzily() {
        let options = vec![
            "All".to_string(),
            "Beauty & Personal Care".to_string(),
            "Toys & Hobbies".to_string(),
        ];
        let mut picker = CategoryPicker::new(options, "Toys & Hobbies");
        assert_eq!(picker.selected(), 2);
        assert_eq!(picker.matches().len(), 3);

        for c in "toy".chars() {
            picker.push(c);
        }
        assert_eq!(picker.matches(), vec!["Toys & Hobbies"]);
        assert_eq!(picker.choice(), Some("Toys & Hobbies"));

        picker.push('z');
        assert!(picker.choice().is_none());
        picker.pop();
        picker.pop();
        picker.pop();
        picker.pop();
        assert_eq!(picker.query(), "");
        picker.prev();
        assert_eq!(picker.choice(), Some("Toys & Hobbies"));
    }

    #[test]
    fn scrolling_into_a_step_renders_its_chart() {
        let mut app = ready_app();
        assert_eq!(app.screen, AppScreen::Story);
        assert_eq!(app.pane(), Pane::Intro);
        assert!(app.active_scene().is_none());

        let layout = app.layout.clone().unwrap();
        let trigger = layout.trigger_row(0);
        app.scroll_to(layout.steps[0].top + 1 - trigger);
        let state = app.orchestrator.as_ref().unwrap().state();
        assert_eq!(state.active_step, Some(0));
        assert_eq!(state.active_chart, Some(ChartId::Boxplot));
        assert_eq!(app.pane(), Pane::Story);
        assert!(app.active_scene().is_some());
    }

    #[test]
    fn bad_top_n_changes_nothing() {
        let mut app = ready_app();
        app.begin_top_n();
        app.current_input = "ten".to_string();
        app.submit_top_n();
        assert_eq!(app.orchestrator.as_ref().unwrap().state().top_n, 2);
        assert!(app.status_message.contains("not a number"));
        assert_eq!(app.input_mode, InputMode::Browse);
    }

    #[test]
    fn selector_change_scrolls_back_to_the_anchor() {
        let mut app = ready_app();
        app.scroll_to_end();
        app.begin_top_n();
        app.current_input = "1".to_string();
        app.submit_top_n();

        let layout = app.layout.clone().unwrap();
        assert_eq!(Some(app.offset), layout.reset_offset(0));
        assert!(app.refresh_at.is_some());
        assert_eq!(app.orchestrator.as_ref().unwrap().state().top_n, 1);

        app.refresh_at = Some(Instant::now());
        app.update();
        assert_eq!(
            app.orchestrator.as_ref().unwrap().state().active_step,
            Some(0)
        );
    }

    #[test]
    fn keyboard_hover_cycles_marks() {
        let mut app = ready_app();
        let quadrant_top = app.layout.as_ref().unwrap().quadrant.top;
        app.scroll_to(quadrant_top);
        assert_eq!(app.pane(), Pane::Quadrant);

        app.cycle_hover(true);
        assert!(app.active_scene().unwrap().hovered().is_some());
        app.leave_hover();
        assert!(app.active_scene().unwrap().hovered().is_none());
    }
}
