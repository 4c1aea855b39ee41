// Export our modules for use in the binary and tests
pub mod charts;
pub mod data;
pub mod domain;
pub mod error;
pub mod export;
pub mod intro;
pub mod orchestrator;
pub mod rank;
pub mod scale;
pub mod scene;
pub mod scroll;
pub mod stats;
pub mod story;

pub use data::{CategoryAggregate, Dataset, ShopRecord};
pub use domain::{CategoryFilter, ChartId, Highlight, Quadrant};
pub use error::{Result, StoryError};
pub use orchestrator::{Command, Message, Orchestrator, StoryState};
pub use story::{NarrativeStep, Story};
