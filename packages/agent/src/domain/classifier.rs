//! Road-surface classification from the accelerometer z axis.
//!
//! Each sample is labelled from the jump between its z value and the previous one:
//!
//! 1. `prev` is the newest value in the window, or `z` itself when the window is empty
//! 2. `z` is pushed into the window (capacity 5, oldest evicted)
//! 3. `diff = z - prev`
//! 4. `diff < -1000` is a pothole
//! 5. `diff > 800` with at least two values in the window and `window[-2] > window[-1]`
//!    (read after the push) is a bump
//! 6. anything else is normal
//!
//! Thresholds apply to the raw delta, so they only make sense for a roughly constant
//! sampling interval.
//!
//! Note on step 5: after the push `window[-2]` is `prev` and `window[-1]` is `z`, so the bump
//! condition asks for `z > prev + 800` and `prev > z` at the same time. It can never hold and
//! every large upward jump is labelled `normal`. The rule is kept exactly as written.

use std::collections::VecDeque;

use michi_shared::{ClassifiedSample, RoadState, Sample};

/// A drop larger than this is a pothole
pub const POTHOLE_THRESHOLD: i64 = 1000;
/// A rise larger than this is a bump candidate
pub const BUMP_THRESHOLD: i64 = 800;
/// Number of z values kept in the trailing window
pub const WINDOW_CAPACITY: usize = 5;

/// Trailing window of the most recent z readings, oldest first.
///
/// One window belongs to one stream. Two vehicles need two classifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierState {
    window: VecDeque<i32>,
}

impl ClassifierState {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_CAPACITY),
        }
    }

    /// Append a value, evicting the oldest one past capacity
    pub fn push(&mut self, z: i32) {
        self.window.push_back(z);
        if self.window.len() > WINDOW_CAPACITY {
            self.window.pop_front();
        }
    }

    /// Most recent value
    pub fn last(&self) -> Option<i32> {
        self.window.back().copied()
    }

    /// Value just before the most recent one
    pub fn second_last(&self) -> Option<i32> {
        let len = self.window.len();
        if len < 2 {
            return None;
        }
        self.window.get(len - 2).copied()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Window contents in arrival order
    pub fn values(&self) -> Vec<i32> {
        self.window.iter().copied().collect()
    }

    /// Forget the history (explicit stream restart)
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

/// Classify one z value against `state`, updating it.
pub fn classify_z(state: &mut ClassifierState, z: i32) -> RoadState {
    let prev = state.last().unwrap_or(z);
    state.push(z);

    let diff = i64::from(z) - i64::from(prev);

    if diff < -POTHOLE_THRESHOLD {
        RoadState::Pothole
    } else if diff > BUMP_THRESHOLD && state.len() >= 2 {
        match (state.second_last(), state.last()) {
            (Some(before), Some(latest)) if before > latest => RoadState::Bump,
            _ => RoadState::Normal,
        }
    } else {
        RoadState::Normal
    }
}

/// Stateful classifier for one telemetry stream
#[derive(Debug, Clone, Default)]
pub struct RoadSurfaceClassifier {
    state: ClassifierState,
}

impl RoadSurfaceClassifier {
    pub fn new() -> Self {
        Self::with_state(ClassifierState::new())
    }

    /// Resume classification from an existing window
    pub fn with_state(state: ClassifierState) -> Self {
        Self { state }
    }

    /// Label one sample
    pub fn classify(&mut self, sample: Sample) -> ClassifiedSample {
        let road_state = classify_z(&mut self.state, sample.accelerometer.z);
        if road_state != RoadState::Normal {
            tracing::debug!(
                "Detected {} at ({}, {})",
                road_state,
                sample.gps.latitude,
                sample.gps.longitude
            );
        }
        ClassifiedSample::new(road_state, sample)
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}
