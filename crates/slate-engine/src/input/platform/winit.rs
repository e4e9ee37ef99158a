use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{ButtonState, InputEvent, Key, MouseButton};

/// Pixel-precise wheel deltas are divided by this to approximate lines.
pub(crate) const PIXELS_PER_WHEEL_LINE: f32 = 20.0;

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Positions stay in physical pixels so they line up with the drawable
/// surface. Returns `None` for events the input subsystem ignores.
pub(crate) fn translate_window_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),

        WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::MouseButton {
            button: map_mouse_button(*button),
            state: map_state(*state),
        }),

        WindowEvent::MouseWheel { delta, .. } => {
            let lines = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_WHEEL_LINE,
            };
            Some(InputEvent::Wheel { lines })
        }

        WindowEvent::KeyboardInput { event, .. } => Some(InputEvent::Key {
            key: map_key(event.physical_key),
            state: map_state(event.state),
        }),

        _ => None,
    }
}

fn map_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Maps by physical position, so WASD stays WASD on any layout.
fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        return Key::Unknown;
    };

    use KeyCode as C;
    match code {
        C::KeyA => Key::A, C::KeyB => Key::B, C::KeyC => Key::C, C::KeyD => Key::D,
        C::KeyE => Key::E, C::KeyF => Key::F, C::KeyG => Key::G, C::KeyH => Key::H,
        C::KeyI => Key::I, C::KeyJ => Key::J, C::KeyK => Key::K, C::KeyL => Key::L,
        C::KeyM => Key::M, C::KeyN => Key::N, C::KeyO => Key::O, C::KeyP => Key::P,
        C::KeyQ => Key::Q, C::KeyR => Key::R, C::KeyS => Key::S, C::KeyT => Key::T,
        C::KeyU => Key::U, C::KeyV => Key::V, C::KeyW => Key::W, C::KeyX => Key::X,
        C::KeyY => Key::Y, C::KeyZ => Key::Z,

        C::Digit0 => Key::Num0, C::Digit1 => Key::Num1, C::Digit2 => Key::Num2,
        C::Digit3 => Key::Num3, C::Digit4 => Key::Num4, C::Digit5 => Key::Num5,
        C::Digit6 => Key::Num6, C::Digit7 => Key::Num7, C::Digit8 => Key::Num8,
        C::Digit9 => Key::Num9,

        C::Enter | C::NumpadEnter => Key::Enter,
        C::Escape => Key::Escape,
        C::Backspace => Key::Backspace,
        C::Tab => Key::Tab,
        C::Space => Key::Space,

        C::ArrowUp => Key::Up,
        C::ArrowDown => Key::Down,
        C::ArrowLeft => Key::Left,
        C::ArrowRight => Key::Right,

        C::ShiftLeft => Key::LeftShift,
        C::ShiftRight => Key::RightShift,
        C::ControlLeft => Key::LeftCtrl,
        C::ControlRight => Key::RightCtrl,
        C::AltLeft => Key::LeftAlt,
        C::AltRight => Key::RightAlt,

        C::F1 => Key::F1, C::F2 => Key::F2, C::F3 => Key::F3, C::F4 => Key::F4,
        C::F5 => Key::F5, C::F6 => Key::F6, C::F7 => Key::F7, C::F8 => Key::F8,
        C::F9 => Key::F9, C::F10 => Key::F10, C::F11 => Key::F11, C::F12 => Key::F12,

        _ => Key::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};
    use winit::event::{DeviceId, TouchPhase};
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn keys_map_by_physical_position() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyW)), Key::W);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Digit7)), Key::Num7);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowLeft)), Key::Left);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftRight)), Key::RightShift);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ControlLeft)), Key::LeftCtrl);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::NumpadEnter)), Key::Enter);
    }

    #[test]
    fn unmapped_keys_are_unknown() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::NumpadAdd)), Key::Unknown);
        assert_eq!(
            map_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)),
            Key::Unknown
        );
    }

    #[test]
    fn mouse_buttons_map() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(map_mouse_button(WinitMouseButton::Back), MouseButton::Other(3));
        assert_eq!(map_mouse_button(WinitMouseButton::Other(9)), MouseButton::Other(9));
    }

    #[test]
    fn cursor_moves_stay_physical() {
        let ev = WindowEvent::CursorMoved {
            device_id: DeviceId::dummy(),
            position: PhysicalPosition::new(640.0, 360.5),
        };
        assert_eq!(
            translate_window_event(&ev),
            Some(InputEvent::PointerMoved { x: 640.0, y: 360.5 })
        );
    }

    #[test]
    fn wheel_deltas_become_lines() {
        let line = WindowEvent::MouseWheel {
            device_id: DeviceId::dummy(),
            delta: MouseScrollDelta::LineDelta(4.0, -2.0),
            phase: TouchPhase::Moved,
        };
        assert_eq!(translate_window_event(&line), Some(InputEvent::Wheel { lines: -2.0 }));

        let pixel = WindowEvent::MouseWheel {
            device_id: DeviceId::dummy(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 30.0)),
            phase: TouchPhase::Moved,
        };
        assert_eq!(translate_window_event(&pixel), Some(InputEvent::Wheel { lines: 1.5 }));
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let ev = WindowEvent::Resized(PhysicalSize::new(10, 10));
        assert_eq!(translate_window_event(&ev), None);
    }
}
