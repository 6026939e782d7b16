//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Bindings are
//! written as chord strings (`"mod+shift+z"`, `"Delete"`,
//! `"shift+ArrowUp"`) and parsed once into `KeyChord`s.
//!
//! `mod` is the platform command key: Ctrl on Windows/Linux, ⌘ on macOS.
//! Modifiers must match exactly, so `mod+z` never fires for
//! `mod+shift+z`.

use std::fmt;
use winnow::combinator::{repeat, terminated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// Arrow-key nudge direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl NudgeDirection {
    /// Unit offset in canvas space (y grows downward).
    pub fn delta(&self, step: f32) -> (f32, f32) {
        match self {
            NudgeDirection::Up => (0.0, -step),
            NudgeDirection::Down => (0.0, step),
            NudgeDirection::Left => (-step, 0.0),
            NudgeDirection::Right => (step, 0.0),
        }
    }
}

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Duplicate,
    SelectAll,
    Deselect,
    Copy,
    Cut,
    Paste,
    Save,

    // ── Focus ──
    Enter,
    Tab,
    ShiftTab,

    // ── Arrange ──
    /// Move the selection; `large` moves one grid step.
    Nudge(NudgeDirection, bool),
    BringToFront,
    SendToBack,

    // ── View ──
    ZoomIn,
    ZoomOut,
}

impl ShortcutAction {
    /// Actions that still resolve while a text field has focus.
    pub fn allowed_in_text_input(&self) -> bool {
        matches!(
            self,
            ShortcutAction::Deselect
                | ShortcutAction::Enter
                | ShortcutAction::Tab
                | ShortcutAction::ShiftTab
        )
    }
}

/// Where keyboard focus sits when the key arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusContext {
    #[default]
    Canvas,
    /// An input, textarea or contenteditable element.
    TextInput,
}

/// A key press as reported by the host (`KeyboardEvent.key` + modifiers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn with_modifiers(key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        Self {
            key: key.to_string(),
            ctrl,
            shift,
            alt,
            meta,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

// ─── Chords ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChordModifier {
    Mod,
    Ctrl,
    Meta,
    Shift,
    Alt,
}

/// A parsed binding such as `mod+shift+z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    /// Ctrl or ⌘ (either satisfies it).
    pub cmd: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn parse(input: &str) -> Result<Self, String> {
        parse_chord
            .parse(input.trim())
            .map_err(|e| format!("Invalid key chord {input:?}: {e}"))
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        let command_ok = if self.cmd {
            event.ctrl || event.meta
        } else {
            event.ctrl == self.ctrl && event.meta == self.meta
        };
        command_ok
            && event.shift == self.shift
            && event.alt == self.alt
            && key_matches(&self.key, &event.key)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.cmd, "mod"),
            (self.ctrl, "ctrl"),
            (self.meta, "meta"),
            (self.alt, "alt"),
            (self.shift, "shift"),
        ];
        for (_, name) in flags.iter().filter(|(on, _)| *on) {
            write!(f, "{name}+")?;
        }
        f.write_str(&self.key)
    }
}

/// Single letters compare case-insensitively (Shift changes `key`).
fn key_matches(bound: &str, pressed: &str) -> bool {
    let single_letter = bound.chars().count() == 1 && bound.chars().all(char::is_alphabetic);
    if single_letter {
        bound.eq_ignore_ascii_case(pressed)
    } else {
        bound == pressed
    }
}

fn parse_modifier(input: &mut &str) -> ModalResult<ChordModifier> {
    let word: &str =
        terminated(take_while(1.., |c: char| c.is_ascii_alphabetic()), '+').parse_next(input)?;
    match word.to_ascii_lowercase().as_str() {
        "mod" | "cmdorctrl" => Ok(ChordModifier::Mod),
        "ctrl" | "control" => Ok(ChordModifier::Ctrl),
        "meta" | "cmd" | "super" => Ok(ChordModifier::Meta),
        "shift" => Ok(ChordModifier::Shift),
        "alt" | "option" => Ok(ChordModifier::Alt),
        _ => Err(ErrMode::Backtrack(ContextError::new())),
    }
}

fn parse_key<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| !c.is_whitespace()).parse_next(input)
}

fn parse_chord(input: &mut &str) -> ModalResult<KeyChord> {
    let modifiers: Vec<ChordModifier> = repeat(0.., parse_modifier).parse_next(input)?;
    let key = parse_key.parse_next(input)?;
    let mut chord = KeyChord {
        key: key.to_string(),
        cmd: false,
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };
    for m in modifiers {
        match m {
            ChordModifier::Mod => chord.cmd = true,
            ChordModifier::Ctrl => chord.ctrl = true,
            ChordModifier::Meta => chord.meta = true,
            ChordModifier::Shift => chord.shift = true,
            ChordModifier::Alt => chord.alt = true,
        }
    }
    Ok(chord)
}

// ─── Map ─────────────────────────────────────────────────────────────────

/// Stock bindings of the page-builder editor.
pub const DEFAULT_BINDINGS: &[(&str, ShortcutAction)] = &[
    ("mod+z", ShortcutAction::Undo),
    ("mod+y", ShortcutAction::Redo),
    ("mod+shift+z", ShortcutAction::Redo),
    ("Delete", ShortcutAction::Delete),
    ("Backspace", ShortcutAction::Delete),
    ("mod+d", ShortcutAction::Duplicate),
    ("mod+a", ShortcutAction::SelectAll),
    ("Escape", ShortcutAction::Deselect),
    ("mod+c", ShortcutAction::Copy),
    ("mod+x", ShortcutAction::Cut),
    ("mod+v", ShortcutAction::Paste),
    ("mod+s", ShortcutAction::Save),
    ("Enter", ShortcutAction::Enter),
    ("Tab", ShortcutAction::Tab),
    ("shift+Tab", ShortcutAction::ShiftTab),
    ("ArrowUp", ShortcutAction::Nudge(NudgeDirection::Up, false)),
    ("ArrowDown", ShortcutAction::Nudge(NudgeDirection::Down, false)),
    ("ArrowLeft", ShortcutAction::Nudge(NudgeDirection::Left, false)),
    ("ArrowRight", ShortcutAction::Nudge(NudgeDirection::Right, false)),
    ("shift+ArrowUp", ShortcutAction::Nudge(NudgeDirection::Up, true)),
    ("shift+ArrowDown", ShortcutAction::Nudge(NudgeDirection::Down, true)),
    ("shift+ArrowLeft", ShortcutAction::Nudge(NudgeDirection::Left, true)),
    ("shift+ArrowRight", ShortcutAction::Nudge(NudgeDirection::Right, true)),
    ("mod+shift+]", ShortcutAction::BringToFront),
    ("mod+shift+[", ShortcutAction::SendToBack),
    ("mod+=", ShortcutAction::ZoomIn),
    ("mod+-", ShortcutAction::ZoomOut),
];

/// Resolves key events into shortcut actions.
#[derive(Debug, Clone)]
pub struct ShortcutMap {
    bindings: Vec<(KeyChord, ShortcutAction)>,
}

impl Default for ShortcutMap {
    fn default() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .filter_map(|(chord, action)| match KeyChord::parse(chord) {
                Ok(parsed) => Some((parsed, *action)),
                Err(e) => {
                    log::error!("{e}");
                    None
                }
            })
            .collect();
        Self { bindings }
    }
}

impl ShortcutMap {
    /// Build a map from host-supplied chord strings.
    pub fn with_bindings(bindings: &[(&str, ShortcutAction)]) -> Result<Self, String> {
        let bindings = bindings
            .iter()
            .map(|(chord, action)| KeyChord::parse(chord).map(|c| (c, *action)))
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Self { bindings })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve a key event to an action.
    ///
    /// Returns `None` if the combo has no binding, or if focus is in a text
    /// field and the action is not one that passes through.
    pub fn resolve(&self, event: &KeyEvent, focus: FocusContext) -> Option<ShortcutAction> {
        let action = self
            .bindings
            .iter()
            .find(|(chord, _)| chord.matches(event))
            .map(|(_, action)| *action)?;
        match focus {
            FocusContext::TextInput if !action.allowed_in_text_input() => None,
            _ => Some(action),
        }
    }

    /// Every chord bound to `action`, for menus and tooltips.
    pub fn chords_for(&self, action: ShortcutAction) -> Vec<&KeyChord> {
        self.bindings
            .iter()
            .filter(|(_, a)| *a == action)
            .map(|(chord, _)| chord)
            .collect()
    }
}
