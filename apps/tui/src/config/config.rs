use color_eyre::eyre::{eyre, WrapErr};
use dotenv::dotenv;
use shop_story::domain::CategoryFilter;
use shop_story::orchestrator::DEFAULT_TOP_N;
use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_SHOP_FILE: &str = "non_anomalous_tiktok_shops_cleaned.json";
pub const DEFAULT_CATEGORY_FILE: &str = "category_avg_gmv_video.json";
pub const DEFAULT_LOG_FILE: &str = "shop-story.log";

#[derive(Debug, Clone, PartialEq)]
pub struct StoryConfig {
    pub shops_path: PathBuf,
    pub categories_path: PathBuf,
    /// `None` plays the built-in story.
    pub steps_path: Option<PathBuf>,
    pub log_file: PathBuf,
    pub top_n: usize,
    pub category: CategoryFilter,
    pub debug: bool,
}

/// Reads `.env` and the environment into a `StoryConfig`.
pub fn init_story_config() -> color_eyre::eyre::Result<StoryConfig> {
    dotenv().ok();

    let data_dir = env::var("STORY_DATA_DIR")
        .map_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
    let shops_file = env::var("SHOP_DATA_FILE").unwrap_or_else(|_| DEFAULT_SHOP_FILE.to_string());
    let categories_file =
        env::var("CATEGORY_DATA_FILE").unwrap_or_else(|_| DEFAULT_CATEGORY_FILE.to_string());

    let steps_path = env::var("STORY_STEPS_FILE")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from);

    let log_file = env::var("STORY_LOG_FILE")
        .map_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from);

    let top_n = match env::var("STORY_TOP_N") {
        Ok(value) => parse_top_n(&value)?,
        Err(_) => DEFAULT_TOP_N,
    };

    let category = env::var("STORY_CATEGORY")
        .map_or(CategoryFilter::All, |value| CategoryFilter::parse(&value));

    Ok(StoryConfig {
        shops_path: data_dir.join(shops_file),
        categories_path: data_dir.join(categories_file),
        steps_path,
        log_file,
        top_n,
        category,
        debug: debug_enabled(env::var("DEBUG").ok().as_deref()),
    })
}

pub fn parse_top_n(value: &str) -> color_eyre::eyre::Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| eyre!("STORY_TOP_N must be a whole number, got {value:?}"))
}

fn debug_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
}

/// Sends tracing output to the log file; the terminal belongs to the UI.
pub fn init_logging(config: &StoryConfig) -> color_eyre::eyre::Result<()> {
    let file = File::create(&config.log_file)
        .wrap_err_with(|| format!("failed to create log file {}", config.log_file.display()))?;
    let level = if config.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("failed to install logger: {e}"))
}
