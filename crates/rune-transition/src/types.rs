//! Core transition types.
//!
//! This module defines the small value types shared by the engine and the
//! controllers:
//! - `RunId`: Unique identifier for one enter/exit/move run
//! - `Phase`: Which sequence a run is driving
//! - `TransitionState`: Per-element lifecycle state
//! - `Rect` / `Offset`: Layout boxes and translate deltas for move detection

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a single phase run on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub u64);

impl RunId {
    /// Generate a new unique run ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// The sequence an engine run drives an element through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Enter,
    Exit,
    Move,
}

/// Lifecycle state of a managed element.
///
/// Exactly one phase is active per element; starting another phase
/// interrupts the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionState {
    #[default]
    Idle,
    Entering,
    Exiting,
    Moving,
}

impl From<Phase> for TransitionState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Enter => Self::Entering,
            Phase::Exit => Self::Exiting,
            Phase::Move => Self::Moving,
        }
    }
}

impl TransitionState {
    /// Entering and exiting elements have no stable box to move from.
    pub fn can_move(self) -> bool {
        matches!(self, Self::Idle | Self::Moving)
    }
}

/// Translate delta in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f32,
    pub dy: f32,
}

impl Offset {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// Bounding box of an element, in the host's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Translation that renders an element laid out at `self` where it
    /// used to be (`first`). This is the "invert" step of FLIP.
    pub fn invert_from(&self, first: &Rect) -> Offset {
        Offset {
            dx: first.x - self.x,
            dy: first.y - self.y,
        }
    }
}
