//! Transition configuration and class-name resolution.
//!
//! `TransitionOptions` mirrors the component properties a caller sets;
//! `TransitionClasses` is the resolved, immutable class-name set an engine
//! run applies and strips.
//!
//! # Example
//!
//! ```ignore
//! use rune_transition::classes::TransitionOptions;
//!
//! let options = TransitionOptions::named("fade");
//! let classes = options.resolve_classes();
//! assert_eq!(classes.enter_active.to_string(), "fade-enter-active");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::types::Phase;

/// Prefix used when no `name` is configured.
pub const DEFAULT_NAME: &str = "s";

/// Ordering between the outgoing and incoming element of a single slot.
///
/// Absence of a mode means both transitions run simultaneously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionMode {
    /// Enter the new element first, then exit the old one.
    #[serde(rename = "inout")]
    InOut,
    /// Exit the old element first, then enter the new one.
    #[serde(rename = "outin")]
    OutIn,
}

impl FromStr for TransitionMode {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "inout" => Ok(Self::InOut),
            "outin" => Ok(Self::OutIn),
            other => Err(TransitionError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for TransitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InOut => f.write_str("inout"),
            Self::OutIn => f.write_str("outin"),
        }
    }
}

/// Configuration surface shared by `Transition` and `TransitionGroup`.
///
/// Every field is optional; unset class names derive from `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionOptions {
    /// Prefix for derived class names (`<name>-enter`, ...). Defaults to `"s"`.
    pub name: Option<String>,
    /// Applied before the enter starts and removed on the next frame.
    /// Defaults to `<name>-enter`.
    pub enter_class: Option<String>,
    /// Present for the whole enter phase. Defaults to `<name>-enter-active`.
    pub enter_active_class: Option<String>,
    /// Added on the frame after the enter starts, removed when it finishes.
    /// Defaults to `<name>-enter-to`.
    pub enter_to_class: Option<String>,
    /// Applied before the exit starts and removed on the next frame.
    /// Defaults to `<name>-exit`.
    pub exit_class: Option<String>,
    /// Present for the whole exit phase. Defaults to `<name>-exit-active`.
    pub exit_active_class: Option<String>,
    /// Added on the frame after the exit starts, removed when it finishes.
    /// Defaults to `<name>-exit-to`.
    pub exit_to_class: Option<String>,
    /// Applied while a reordered element slides to its new box. Group only;
    /// defaults to `<name>-move`.
    pub move_class: Option<String>,
    /// Run the enter transition on the initial render.
    pub appear: bool,
    /// Single controller only.
    pub mode: Option<TransitionMode>,
}

impl TransitionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options deriving every class from `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_appear(mut self, appear: bool) -> Self {
        self.appear = appear;
        self
    }

    pub fn with_mode(mut self, mode: TransitionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_move_class(mut self, class: impl Into<String>) -> Self {
        self.move_class = Some(class.into());
        self
    }

    /// Prefix in effect, falling back to [`DEFAULT_NAME`].
    pub fn prefix(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_NAME,
        }
    }

    /// Resolve the full class-name set, applying overrides over derived names.
    pub fn resolve_classes(&self) -> TransitionClasses {
        let prefix = self.prefix();
        let pick = |custom: &Option<String>, suffix: &str| match custom {
            Some(value) => ClassList::parse(value),
            None => ClassList::parse(&format!("{prefix}-{suffix}")),
        };

        TransitionClasses {
            enter: pick(&self.enter_class, "enter"),
            enter_active: pick(&self.enter_active_class, "enter-active"),
            enter_to: pick(&self.enter_to_class, "enter-to"),
            exit: pick(&self.exit_class, "exit"),
            exit_active: pick(&self.exit_active_class, "exit-active"),
            exit_to: pick(&self.exit_to_class, "exit-to"),
            move_: pick(&self.move_class, "move"),
        }
    }
}

/// One configured class value, split on whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn parse(value: &str) -> Self {
        Self(value.split_whitespace().map(str::to_string).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// The three class lists a phase toggles: applied at start, held for the
/// whole phase, and swapped in on the next frame.
#[derive(Debug, Clone, Copy)]
pub struct PhaseClasses<'a> {
    pub from: &'a ClassList,
    pub active: &'a ClassList,
    pub to: &'a ClassList,
}

impl<'a> PhaseClasses<'a> {
    pub fn is_empty(&self) -> bool {
        self.from.is_empty() && self.active.is_empty() && self.to.is_empty()
    }

    pub fn iter(self) -> impl Iterator<Item = &'a str> + 'a {
        self.from.iter().chain(self.active.iter()).chain(self.to.iter())
    }
}

/// Resolved class names for one controller instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionClasses {
    pub enter: ClassList,
    pub enter_active: ClassList,
    pub enter_to: ClassList,
    pub exit: ClassList,
    pub exit_active: ClassList,
    pub exit_to: ClassList,
    #[serde(rename = "move")]
    pub move_: ClassList,
}

impl Default for TransitionClasses {
    fn default() -> Self {
        TransitionOptions::default().resolve_classes()
    }
}

impl TransitionClasses {
    /// Classes toggled by `phase`. A move only holds its move class.
    pub fn phase(&self, phase: Phase) -> PhaseClasses<'_> {
        static EMPTY: ClassList = ClassList(Vec::new());
        match phase {
            Phase::Enter => PhaseClasses {
                from: &self.enter,
                active: &self.enter_active,
                to: &self.enter_to,
            },
            Phase::Exit => PhaseClasses {
                from: &self.exit,
                active: &self.exit_active,
                to: &self.exit_to,
            },
            Phase::Move => PhaseClasses {
                from: &EMPTY,
                active: &self.move_,
                to: &EMPTY,
            },
        }
    }

    /// Every class name this set may put on an element.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        [Phase::Enter, Phase::Exit, Phase::Move]
            .into_iter()
            .flat_map(move |phase| self.phase(phase).iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_class_names() {
        let classes = TransitionOptions::default().resolve_classes();
        assert_eq!(classes.enter.to_string(), "s-enter");
        assert_eq!(classes.enter_active.to_string(), "s-enter-active");
        assert_eq!(classes.enter_to.to_string(), "s-enter-to");
        assert_eq!(classes.exit.to_string(), "s-exit");
        assert_eq!(classes.exit_active.to_string(), "s-exit-active");
        assert_eq!(classes.exit_to.to_string(), "s-exit-to");
        assert_eq!(classes.move_.to_string(), "s-move");
    }

    #[test]
    fn test_named_prefix_and_overrides() {
        let mut options = TransitionOptions::named("fade");
        options.enter_active_class = Some("animate fade-in".to_string());
        options.exit_to_class = Some(String::new());

        let classes = options.resolve_classes();
        assert_eq!(classes.enter.to_string(), "fade-enter");
        assert!(classes.enter_active.contains("animate"));
        assert!(classes.enter_active.contains("fade-in"));
        assert_eq!(classes.enter_active.iter().count(), 2);
        assert!(classes.exit_to.is_empty());
        assert_eq!(classes.move_.to_string(), "fade-move");
    }

    #[test]
    fn test_empty_name_falls_back_to_default() {
        let options = TransitionOptions::named("");
        assert_eq!(options.prefix(), DEFAULT_NAME);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("inout".parse::<TransitionMode>(), Ok(TransitionMode::InOut));
        assert_eq!(" outin ".parse::<TransitionMode>(), Ok(TransitionMode::OutIn));
        assert_eq!(
            "in-out".parse::<TransitionMode>(),
            Err(TransitionError::InvalidMode("in-out".to_string()))
        );
        assert_eq!(TransitionMode::OutIn.to_string(), "outin");
    }

    #[test]
    fn test_phase_classes() {
        let classes = TransitionClasses::default();
        let enter = classes.phase(Phase::Enter);
        assert_eq!(enter.iter().collect::<Vec<_>>(), vec!["s-enter", "s-enter-active", "s-enter-to"]);

        let mv = classes.phase(Phase::Move);
        assert!(mv.from.is_empty());
        assert_eq!(mv.active.to_string(), "s-move");
        assert!(!mv.is_empty());
        assert_eq!(classes.all().count(), 7);
    }

    #[test]
    fn test_options_deserialize() {
        let json = r#"{"name":"slide","appear":true,"mode":"outin"}"#;
        let options: TransitionOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.prefix(), "slide");
        assert!(options.appear);
        assert_eq!(options.mode, Some(TransitionMode::OutIn));
        assert!(options.enter_class.is_none());
    }
}
