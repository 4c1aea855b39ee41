use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use shop_story::data::Dataset;
use shop_story::export::{export_all, summarize, summary_text};
use shop_story::story::Story;
use std::convert::TryFrom;
use std::fmt;
use std::io::Stdout;
use std::path::Path;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, error, info};

use crate::app::{handle_input, handle_mouse, App};
use crate::config::StoryConfig;
use crate::ui;

// States of the background data load
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::Ready => write!(f, "Ready"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// Events that drive the data load
enum LoadEvent {
    Start,
    Loaded(Box<(Dataset, Story)>),
    Failed(String),
    Retry,
}

impl fmt::Display for LoadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Loaded(loaded) => write!(
                f,
                "Loaded({} shops, {} steps)",
                loaded.0.shops.len(),
                loaded.1.len()
            ),
            Self::Failed(msg) => write!(f, "Failed({msg})"),
            Self::Retry => write!(f, "Retry"),
        }
    }
}

#[derive(Debug)]
struct StateTransitionError {
    from: LoadState,
    event: String,
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} with event {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for StateTransitionError {}

struct LoadMachine {
    state: LoadState,
}

impl LoadMachine {
    const fn new(initial_state: LoadState) -> Self {
        Self {
            state: initial_state,
        }
    }

    const fn state(&self) -> LoadState {
        self.state
    }

    // Process an event and update the state machine and app
    fn process_event(
        &mut self,
        event: LoadEvent,
        app: &mut App,
    ) -> std::result::Result<(), StateTransitionError> {
        let next_state = NextState::try_from((self.state, event, app))?;
        debug!(from = %self.state, to = %next_state.0, "load state");
        self.state = next_state.0;
        Ok(())
    }
}

struct NextState(LoadState);

impl NextState {
    const fn new(state: LoadState) -> Self {
        Self(state)
    }
}

impl LoadState {
    const fn next_state(self) -> NextState {
        NextState::new(self)
    }
}

impl TryFrom<(LoadState, LoadEvent, &mut App)> for NextState {
    type Error = StateTransitionError;

    fn try_from(
        value: (LoadState, LoadEvent, &mut App),
    ) -> std::result::Result<Self, Self::Error> {
        let (current_state, event, app) = value;

        match (current_state, event) {
            (LoadState::Idle, LoadEvent::Start) => {
                app.on_loading();
                Ok(LoadState::Loading.next_state())
            }
            (LoadState::Loading, LoadEvent::Loaded(loaded)) => {
                let (dataset, story) = *loaded;
                app.on_loaded(dataset, story);
                Ok(LoadState::Ready.next_state())
            }
            (LoadState::Loading, LoadEvent::Failed(error)) => {
                app.on_load_failed(error);
                Ok(LoadState::Failed.next_state())
            }
            (LoadState::Failed, LoadEvent::Retry) => Ok(LoadState::Idle.next_state()),
            (from, event) => Err(StateTransitionError {
                from,
                event: event.to_string(),
            }),
        }
    }
}

/// Reads both data files in parallel, plus the narrative file when one is
/// configured.
pub async fn load_story(config: &StoryConfig) -> shop_story::Result<(Dataset, Story)> {
    let dataset = Dataset::load(&config.shops_path, &config.categories_path);
    match &config.steps_path {
        Some(path) => tokio::try_join!(dataset, Story::load(path)),
        None => Ok((dataset.await?, Story::default_story())),
    }
}

fn spawn_load(config: StoryConfig) -> oneshot::Receiver<shop_story::Result<(Dataset, Story)>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let result = load_story(&config).await;
        let _ = tx.send(result);
    });
    rx
}

/// Run the application in headless mode (no UI)
pub async fn run_headless(config: &StoryConfig, json: bool, export_dir: Option<&Path>) -> Result<()> {
    let (dataset, story) = load_story(config).await?;

    if let Some(dir) = export_dir {
        let written = export_all(&dataset, &config.category, config.top_n, dir)?;
        println!("Exported {} charts to {}", written.len(), dir.display());
        for path in written {
            println!("- {}", path.display());
        }
        return Ok(());
    }

    let summary = summarize(&dataset, &story, &config.category, config.top_n);
    if json {
        let json = serde_json::to_string_pretty(&summary)?;
        println!("{json}");
    } else {
        println!("\nShop Story");
        println!("==========");
        print!("{}", summary_text(&summary));
    }

    Ok(())
}

/// Run the main application event loop
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let mut load_machine = LoadMachine::new(LoadState::Idle);
    let mut pending = None;

    loop {
        if load_machine.state() == LoadState::Idle {
            info!("loading story data");
            if load_machine.process_event(LoadEvent::Start, app).is_ok() {
                pending = Some(spawn_load(app.config.clone()));
            }
        }

        if let Some(receiver) = pending.as_mut() {
            let event = match receiver.try_recv() {
                Ok(Ok((dataset, story))) => Some(LoadEvent::Loaded(Box::new((dataset, story)))),
                Ok(Err(e)) => Some(LoadEvent::Failed(e.to_string())),
                Err(TryRecvError::Closed) => Some(LoadEvent::Failed(
                    "the loader stopped before finishing".to_string(),
                )),
                Err(TryRecvError::Empty) => None,
            };
            if let Some(event) = event {
                pending = None;
                if let Err(e) = load_machine.process_event(event, app) {
                    error!("{e}");
                }
            }
        }

        if app.retry_requested {
            app.retry_requested = false;
            if let Err(e) = load_machine.process_event(LoadEvent::Retry, app) {
                debug!("{e}");
            }
        }

        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key);
                }
                Ok(Event::Mouse(mouse)) => handle_mouse(app, mouse),
                Ok(Event::Resize(width, height)) => {
                    app.resize(width, height);
                    // Redraw right away at the new size
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        // Non-fatal redraw error
                    }
                }
                Ok(
                    Event::Key(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_),
                )
                | Err(_) => {}
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
