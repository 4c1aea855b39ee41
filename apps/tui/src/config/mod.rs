#[allow(clippy::module_inception)]
mod config;

pub use config::{init_logging, init_story_config, parse_top_n, StoryConfig};
