/// Keys reported to games.
///
/// Left and right modifiers are distinct keys. Anything else on the
/// keyboard arrives as `Unknown` and is never reported as held.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,

    Enter,
    Escape,
    Backspace,
    Tab,
    Space,

    Up,
    Down,
    Left,
    Right,

    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    Unknown,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    /// Extra buttons (back, forward, ...) by platform index.
    Other(u16),
}

/// Transition carried by key and mouse button events.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Window input, already translated from the platform.
///
/// Positions are physical pixels of the drawable surface; wheel movement
/// is in lines, positive away from the user.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, state: ButtonState },
    MouseButton { button: MouseButton, state: ButtonState },
    PointerMoved { x: f32, y: f32 },
    PointerLeft,
    Wheel { lines: f32 },
    Focused(bool),
}
