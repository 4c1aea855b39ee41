//! Timed intro sequence: an avatar, a speech bubble with the opening
//! question, four smaller question bubbles, then the page title dropping in.
//! Everything here is a pure function of the elapsed time.

use std::time::Duration;

pub const QUESTION: &str = "I want to open a TikTok store, what factors should I consider?";
pub const BUBBLES: [&str; 4] = ["Category?", "Product?", "Price?", "Video Promotion?"];
pub const TITLE: &str = "What Makes a Top TikTok Shop?";

pub const TITLE_DROP_MS: u64 = 4500;
pub const TITLE_DROP_LEN_MS: u64 = 800;
pub const WIGGLE_MS: u64 = 5100;
pub const WIGGLE_LEN_MS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueTarget {
    Avatar,
    SpeechBubble,
    Question,
    Bubble(usize),
    BubbleText(usize),
}

/// A fade from transparent to opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cue {
    pub target: CueTarget,
    pub delay_ms: u64,
    pub duration_ms: u64,
}

impl Cue {
    const fn new(target: CueTarget, delay_ms: u64, duration_ms: u64) -> Self {
        Self {
            target,
            delay_ms,
            duration_ms,
        }
    }

    pub const fn end_ms(&self) -> u64 {
        self.delay_ms + self.duration_ms
    }

    pub fn opacity_at(&self, elapsed: Duration) -> f64 {
        let progress = progress(elapsed, self.delay_ms, self.duration_ms);
        ease_cubic_in_out(progress)
    }
}

pub fn timeline() -> Vec<Cue> {
    let mut cues = vec![
        Cue::new(CueTarget::Avatar, 0, 1000),
        Cue::new(CueTarget::SpeechBubble, 0, 1500),
        Cue::new(CueTarget::Question, 1000, 1000),
    ];
    for index in 0..BUBBLES.len() {
        let stagger = 600 * index as u64;
        cues.push(Cue::new(CueTarget::Bubble(index), 1700 + stagger, 600));
        cues.push(Cue::new(CueTarget::BubbleText(index), 1800 + stagger, 600));
    }
    cues
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TitlePhase {
    Hidden,
    /// Falling into place; progress in `[0, 1]`.
    Dropping(f64),
    Wiggling(f64),
    Settled,
}

impl TitlePhase {
    pub fn at(elapsed: Duration) -> Self {
        let ms = elapsed.as_millis();
        if ms < u128::from(TITLE_DROP_MS) {
            Self::Hidden
        } else if ms < u128::from(WIGGLE_MS) {
            Self::Dropping(progress(elapsed, TITLE_DROP_MS, TITLE_DROP_LEN_MS))
        } else if ms < u128::from(WIGGLE_MS + WIGGLE_LEN_MS) {
            Self::Wiggling(progress(elapsed, WIGGLE_MS, WIGGLE_LEN_MS))
        } else {
            Self::Settled
        }
    }

    pub const fn visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    /// Horizontal offset in columns for the current frame.
    #[allow(clippy::cast_possible_truncation)]
    pub fn shake(self) -> i16 {
        match self {
            Self::Wiggling(t) => {
                let swing = (t * std::f64::consts::TAU * 3.0).sin();
                (swing * 2.0 * (1.0 - t)).round() as i16
            }
            _ => 0,
        }
    }

    /// Rows still to fall before the title reaches its place.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn drop_rows(self, distance: u16) -> u16 {
        match self {
            Self::Hidden => distance,
            Self::Dropping(t) => {
                (f64::from(distance) * (1.0 - ease_cubic_in_out(t))).round() as u16
            }
            Self::Wiggling(_) | Self::Settled => 0,
        }
    }
}

/// Opacity of every intro element at `elapsed`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntroFrame {
    pub avatar: f64,
    pub speech_bubble: f64,
    pub question: f64,
    pub bubbles: [f64; 4],
    pub bubble_texts: [f64; 4],
    pub title: TitlePhase,
}

impl IntroFrame {
    pub fn at(elapsed: Duration) -> Self {
        let mut frame = Self {
            avatar: 0.0,
            speech_bubble: 0.0,
            question: 0.0,
            bubbles: [0.0; 4],
            bubble_texts: [0.0; 4],
            title: TitlePhase::at(elapsed),
        };
        for cue in timeline() {
            let opacity = cue.opacity_at(elapsed);
            match cue.target {
                CueTarget::Avatar => frame.avatar = opacity,
                CueTarget::SpeechBubble => frame.speech_bubble = opacity,
                CueTarget::Question => frame.question = opacity,
                CueTarget::Bubble(i) => frame.bubbles[i] = opacity,
                CueTarget::BubbleText(i) => frame.bubble_texts[i] = opacity,
            }
        }
        frame
    }
}

pub fn is_complete(elapsed: Duration) -> bool {
    TitlePhase::at(elapsed) == TitlePhase::Settled
}

fn progress(elapsed: Duration, delay_ms: u64, duration_ms: u64) -> f64 {
    let ms = elapsed.as_secs_f64() * 1000.0;
    if duration_ms == 0 {
        return if ms >= delay_ms as f64 { 1.0 } else { 0.0 };
    }
    ((ms - delay_ms as f64) / duration_ms as f64).clamp(0.0, 1.0)
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t).mul_add(t, 2.0) / 2.0
    }
}
