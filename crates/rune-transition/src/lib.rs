//! Class-driven enter/exit/move transitions for UI children.
//!
//! This crate provides:
//! - **Transition**: a single child slot whose replacements enter and exit,
//!   optionally ordered `outin` or `inout`
//! - **TransitionGroup**: a keyed collection with per-key enter/exit and a
//!   FLIP move pass for reordered survivors
//! - **TransitionEngine**: the shared phase state machine both controllers
//!   drive
//! - **HeadlessDom**: an in-memory host for tests and the scenario runner
//!
//! Nothing here interpolates values. Phases toggle class names on the host
//! and wait for the host's stylesheet to report `transitionend` or
//! `animationend`.
//!
//! # Architecture
//!
//! ```text
//! Transition / TransitionGroup
//!   └── TransitionEngine
//!         ├── CompletionDetector (end events, zero-duration fast path)
//!         └── EventQueue          (Started / Finished / Interrupted)
//!
//! TransitionHost (implemented by the embedder, or HeadlessDom)
//! ```

pub mod classes;
pub mod detector;
pub mod engine;
pub mod error;
pub mod events;
pub mod group;
pub mod headless;
pub mod hooks;
pub mod host;
pub mod single;
pub mod types;

pub use classes::{
    ClassList, DEFAULT_NAME, PhaseClasses, TransitionClasses, TransitionMode, TransitionOptions,
};
pub use detector::{CompletionDetector, EventFilter};
pub use engine::TransitionEngine;
pub use error::{Result, TransitionError};
pub use events::{EventQueue, TransitionEvent};
pub use group::{GroupEntry, TransitionGroup};
pub use headless::{DomOp, ElementId, HeadlessDom};
pub use hooks::{Completion, DoneToken, LifecycleHooks, TransitionHooks};
pub use host::{CompletionEvent, EndEventKind, TransitionHost};
pub use single::Transition;
pub use types::{Offset, Phase, Rect, RunId, TransitionState};
