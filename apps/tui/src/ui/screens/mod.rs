pub mod failed;
pub mod help;
pub mod intro;
pub mod loading;
pub mod story;
