//! Story playback.
//!
//! # States
//! - Closed: nothing on screen, working set empty
//! - Viewing(i): story `i` of the working set shown, progress 0..100
//!
//! # State Transitions
//! ```text
//! Closed → Viewing(i): open with a non-empty set and a valid index
//! Viewing(i) → Viewing(i+1): next, or progress reaching 100
//! Viewing(last) → Closed: next, or progress reaching 100
//! Viewing(i) → Viewing(i-1): prev (no-op at 0)
//! Viewing(_) → Closed: close
//! ```

use crate::stories::types::StoryEntry;

const FULL: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Closed,
    Viewing { index: usize },
}

#[derive(Debug, Clone)]
pub struct Playback {
    state: PlaybackState,
    progress: f64,
    entries: Vec<StoryEntry>,
    tick_ms: u64,
}

impl Playback {
    pub fn new(tick_ms: u64) -> Self {
        Self {
            state: PlaybackState::Closed,
            progress: 0.0,
            entries: Vec::new(),
            tick_ms: tick_ms.max(1),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn current(&self) -> Option<&StoryEntry> {
        match self.state {
            PlaybackState::Viewing { index } => self.entries.get(index),
            PlaybackState::Closed => None,
        }
    }

    /// Start viewing `entries` (sorted oldest first) at `index`.
    pub fn open(&mut self, mut entries: Vec<StoryEntry>, index: usize) -> PlaybackState {
        if index >= entries.len() {
            self.close();
            return self.state;
        }
        entries.sort_by_key(StoryEntry::order_key);
        self.entries = entries;
        self.progress = 0.0;
        self.state = PlaybackState::Viewing { index };
        self.state
    }

    /// Progress gained per tick for the current story.
    fn step(&self) -> f64 {
        let duration = self
            .current()
            .map(|s| s.display_duration_ms)
            .unwrap_or(self.tick_ms);
        let ticks = (duration as f64 / self.tick_ms as f64).max(1.0);
        FULL / ticks
    }

    /// Advance one tick; moves on when the current story completes.
    pub fn tick(&mut self) -> PlaybackState {
        if self.state == PlaybackState::Closed {
            return self.state;
        }
        self.progress += self.step();
        if self.progress >= FULL {
            return self.next();
        }
        self.state
    }

    pub fn next(&mut self) -> PlaybackState {
        if let PlaybackState::Viewing { index } = self.state {
            if index + 1 < self.entries.len() {
                self.state = PlaybackState::Viewing { index: index + 1 };
                self.progress = 0.0;
            } else {
                self.close();
            }
        }
        self.state
    }

    pub fn prev(&mut self) -> PlaybackState {
        if let PlaybackState::Viewing { index } = self.state {
            if index > 0 {
                self.state = PlaybackState::Viewing { index: index - 1 };
                self.progress = 0.0;
            }
        }
        self.state
    }

    pub fn close(&mut self) {
        self.state = PlaybackState::Closed;
        self.progress = 0.0;
        self.entries.clear();
    }
}
