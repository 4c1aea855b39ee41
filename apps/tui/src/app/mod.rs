// App module for shop-story
// Holds the session state and turns input into story messages

pub mod input;
pub mod state;

pub use input::{handle_input, handle_mouse};
pub use state::{App, AppScreen, InputMode};
