mod app;
mod cli;
mod config;
mod event;
mod terminal;
mod ui;

use app::App;
use clap::Parser;
use cli::CliArgs;
use color_eyre::Result;
use ratatui::layout::Rect;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    let config = config::init_story_config()?;
    config::init_logging(&config)?;
    tracing::info!(?config, "starting shop-story");

    if args.wants_headless() || !is_terminal() {
        return event::run_headless(&config, args.json, args.export_svg.as_deref()).await;
    }

    let mut terminal = terminal::setup()?;
    let size = match terminal.size() {
        Ok(size) => size,
        Err(e) => {
            terminal::cleanup(true, true);
            return Err(e.into());
        }
    };
    let mut app = App::new(config, Rect::new(0, 0, size.width, size.height));

    let result = event::run(&mut terminal, &mut app).await;

    terminal::cleanup(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
