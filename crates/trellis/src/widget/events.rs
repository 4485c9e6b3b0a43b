//! Window and widget event types.
//!
//! An [`Event`] carries an [`EventKind`] and the [`EventSource`] it came
//! from. Platform glue delivers window events to
//! [`Surface::route_window_event`](crate::Surface::route_window_event); the
//! router synthesizes enter/leave and focus events itself and delivers them
//! straight to the widgets concerned.

use super::WidgetId;

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held.
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keys the toolkit itself cares about. Everything else arrives as
/// [`Key::Other`] with the platform key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Escape,
    Enter,
    Space,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Other(u32),
}

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventSource {
    /// Emitted by a widget.
    Widget(WidgetId),
    /// Delivered by the platform window.
    #[default]
    Window,
    /// Anything else.
    Other,
}

/// The payload of an [`Event`].
///
/// Pointer coordinates are in canvas space when delivered to the router and
/// in the receiving widget's local space when delivered to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    MouseMove { x: i32, y: i32 },
    MousePress { x: i32, y: i32, button: MouseButton },
    MouseRelease { x: i32, y: i32, button: MouseButton },
    MouseWheel { delta: i32 },
    KeyPressed { key: Key, modifiers: KeyboardModifiers },
    KeyReleased { key: Key, modifiers: KeyboardModifiers },
    Char(char),
    SizeChanged { width: u32, height: u32 },
    Expose,
    Closed,
    MouseEnter,
    MouseLeave,
    FocusGained,
    FocusLost,
    /// Application-defined event code.
    Custom(u32),
}

impl EventKind {
    /// Returns `true` for the kinds the router synthesizes itself.
    ///
    /// These are never routed when they arrive from outside.
    pub fn is_synthesized(&self) -> bool {
        matches!(
            self,
            Self::MouseEnter | Self::MouseLeave | Self::FocusGained | Self::FocusLost
        )
    }

    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<(i32, i32)> {
        match *self {
            Self::MouseMove { x, y }
            | Self::MousePress { x, y, .. }
            | Self::MouseRelease { x, y, .. } => Some((x, y)),
            _ => None,
        }
    }

    /// Copy of the event with its pointer position moved by `(-dx, -dy)`.
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        match self {
            Self::MouseMove { x, y } => Self::MouseMove { x: x - dx, y: y - dy },
            Self::MousePress { x, y, button } => Self::MousePress {
                x: x - dx,
                y: y - dy,
                button,
            },
            Self::MouseRelease { x, y, button } => Self::MouseRelease {
                x: x - dx,
                y: y - dy,
                button,
            },
            other => other,
        }
    }
}

/// An input, window or widget event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub source: EventSource,
}

impl Event {
    /// A window event.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            source: EventSource::Window,
        }
    }

    /// An event emitted by a widget.
    pub fn from_widget(id: WidgetId, kind: EventKind) -> Self {
        Self {
            kind,
            source: EventSource::Widget(id),
        }
    }

    pub fn mouse_move(x: i32, y: i32) -> Self {
        Self::new(EventKind::MouseMove { x, y })
    }

    pub fn mouse_press(x: i32, y: i32, button: MouseButton) -> Self {
        Self::new(EventKind::MousePress { x, y, button })
    }

    pub fn mouse_release(x: i32, y: i32, button: MouseButton) -> Self {
        Self::new(EventKind::MouseRelease { x, y, button })
    }

    pub fn key_pressed(key: Key) -> Self {
        Self::key_pressed_with(key, KeyboardModifiers::NONE)
    }

    /// A key press with modifiers held, e.g. Shift+Tab.
    pub fn key_pressed_with(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self::new(EventKind::KeyPressed { key, modifiers })
    }

    pub fn key_released(key: Key) -> Self {
        Self::key_released_with(key, KeyboardModifiers::NONE)
    }

    pub fn key_released_with(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self::new(EventKind::KeyReleased { key, modifiers })
    }

    /// Copy of the event with a different kind and the same source.
    pub(crate) fn with_kind(self, kind: EventKind) -> Self {
        Self { kind, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_kinds() {
        assert!(EventKind::MouseEnter.is_synthesized());
        assert!(EventKind::FocusLost.is_synthesized());
        assert!(!EventKind::Expose.is_synthesized());
        assert!(!EventKind::MouseMove { x: 0, y: 0 }.is_synthesized());
    }

    #[test]
    fn test_translate_pointer_events() {
        let press = EventKind::MousePress {
            x: 20,
            y: 30,
            button: MouseButton::Left,
        };
        assert_eq!(press.translated(10, 10).position(), Some((10, 20)));
        assert_eq!(EventKind::Char('a').translated(5, 5), EventKind::Char('a'));
    }

    #[test]
    fn test_key_constructors_carry_modifiers() {
        assert_eq!(
            Event::key_pressed(Key::Tab).kind,
            EventKind::KeyPressed {
                key: Key::Tab,
                modifiers: KeyboardModifiers::default(),
            }
        );
        assert_eq!(
            Event::key_released_with(Key::Tab, KeyboardModifiers::SHIFT).kind,
            EventKind::KeyReleased {
                key: Key::Tab,
                modifiers: KeyboardModifiers {
                    shift: true,
                    ..KeyboardModifiers::NONE
                },
            }
        );
    }
}
