//! Arrow-key camera navigation

use cgmath::Vector3;
use winit::keyboard::KeyCode;

use super::events::CameraNav;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
    Space,
}

impl NavKey {
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::ArrowUp => Some(NavKey::Up),
            KeyCode::ArrowDown => Some(NavKey::Down),
            KeyCode::ArrowLeft => Some(NavKey::Left),
            KeyCode::ArrowRight => Some(NavKey::Right),
            KeyCode::Space => Some(NavKey::Space),
            _ => None,
        }
    }
}

/// Maps navigation keys to fixed-step camera moves.
///
/// Up/Down move along y, Left/Right along x. With Ctrl held only Left/Right
/// respond, moving along z instead (Left towards +z).
#[derive(Debug, Clone, Copy)]
pub struct KeyboardNavigator {
    pub step: f32,
}

impl Default for KeyboardNavigator {
    fn default() -> Self {
        Self { step: 1.0 }
    }
}

impl KeyboardNavigator {
    pub fn new(step: f32) -> Self {
        Self { step }
    }

    pub fn navigate(&self, key: NavKey, ctrl: bool) -> Option<CameraNav> {
        let step = self.step;
        let delta = match (key, ctrl) {
            (NavKey::Space, false) => return Some(CameraNav::ResetPosition),
            (NavKey::Up, false) => Vector3::new(0.0, step, 0.0),
            (NavKey::Down, false) => Vector3::new(0.0, -step, 0.0),
            (NavKey::Left, false) => Vector3::new(-step, 0.0, 0.0),
            (NavKey::Right, false) => Vector3::new(step, 0.0, 0.0),
            (NavKey::Left, true) => Vector3::new(0.0, 0.0, step),
            (NavKey::Right, true) => Vector3::new(0.0, 0.0, -step),
            (NavKey::Up | NavKey::Down | NavKey::Space, true) => return None,
        };
        Some(CameraNav::Translate(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_switches_left_right_to_depth() {
        let nav = KeyboardNavigator::new(2.0);
        assert_eq!(
            nav.navigate(NavKey::Left, false),
            Some(CameraNav::Translate(Vector3::new(-2.0, 0.0, 0.0)))
        );
        assert_eq!(
            nav.navigate(NavKey::Left, true),
            Some(CameraNav::Translate(Vector3::new(0.0, 0.0, 2.0)))
        );
        assert_eq!(
            nav.navigate(NavKey::Right, true),
            Some(CameraNav::Translate(Vector3::new(0.0, 0.0, -2.0)))
        );
        assert_eq!(nav.navigate(NavKey::Up, true), None);
        assert_eq!(nav.navigate(NavKey::Space, false), Some(CameraNav::ResetPosition));
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(NavKey::from_key_code(KeyCode::ArrowDown), Some(NavKey::Down));
        assert_eq!(NavKey::from_key_code(KeyCode::KeyW), None);
    }
}
