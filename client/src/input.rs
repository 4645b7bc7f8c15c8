use log::debug;
use macroquad::prelude::*;
use shared::{clamp_paddle_y, MOVE_STEP, TABLE_HEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Where the table is drawn on screen, in screen pixels.
///
/// The table may be displayed at a different size than its logical
/// coordinate space; touch coordinates are rescaled through this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    /// Viewport where one screen pixel is one table unit.
    pub fn identity() -> Self {
        Self {
            top: 0.0,
            height: TABLE_HEIGHT,
        }
    }

    /// Converts a screen y coordinate into table units.
    pub fn to_table_y(&self, screen_y: f32) -> Option<f32> {
        if self.height <= 0.0 || !self.height.is_finite() {
            return None;
        }
        let scale = TABLE_HEIGHT / self.height;
        Some((screen_y - self.top) * scale)
    }
}

/// Discrete device events as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Direction),
    KeyUp(Direction),
    TouchStart { screen_y: f32, viewport: Viewport },
    TouchMove { screen_y: f32, viewport: Viewport },
    TouchEnd,
}

/// Anchor captured when a touch gesture begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchAnchor {
    /// Touch position at gesture start, in table units.
    pub start_y: f32,
    /// Paddle position at gesture start.
    pub paddle_y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub touch: Option<TouchAnchor>,
}

impl InputState {
    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn any_key_held(&self) -> bool {
        self.up || self.down
    }

    /// Position the held keys ask for, starting from `current`.
    ///
    /// Up is applied before down and each step is clamped on its own, so
    /// holding both at a table edge can still produce a net move.
    pub fn keyboard_target(&self, current: f32) -> Option<f32> {
        if !self.any_key_held() {
            return None;
        }

        let mut target = current;
        if self.up {
            target = clamp_paddle_y(target - MOVE_STEP);
        }
        if self.down {
            target = clamp_paddle_y(target + MOVE_STEP);
        }
        Some(target)
    }
}

/// Owns the [`InputState`] and applies device events to it.
#[derive(Debug, Default)]
pub struct InputAggregator {
    state: InputState,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// Marks a direction held. Returns whether any direction is now held.
    pub fn key_down(&mut self, direction: Direction) -> bool {
        self.set_held(direction, true);
        self.state.any_key_held()
    }

    /// Marks a direction released. Returns whether any direction is still held.
    pub fn key_up(&mut self, direction: Direction) -> bool {
        self.set_held(direction, false);
        self.state.any_key_held()
    }

    fn set_held(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.state.up = held,
            Direction::Down => self.state.down = held,
        }
    }

    pub fn touch_start(&mut self, screen_y: f32, viewport: Viewport, paddle_y: f32) {
        self.state.touch = viewport
            .to_table_y(screen_y)
            .map(|start_y| TouchAnchor { start_y, paddle_y });
        debug!("Touch anchored: {:?}", self.state.touch);
    }

    /// Absolute target for the current drag: anchor paddle position plus the
    /// delta from the gesture's first touch (not from the previous move).
    pub fn touch_move(&mut self, screen_y: f32, viewport: Viewport) -> Option<f32> {
        let anchor = self.state.touch?;
        let current_y = viewport.to_table_y(screen_y)?;
        Some(anchor.paddle_y + (current_y - anchor.start_y))
    }

    pub fn touch_end(&mut self) {
        self.state.touch = None;
    }

    /// Releases everything; used when input listeners are detached.
    pub fn reset(&mut self) {
        self.state = InputState::default();
    }
}

/// Host-level controls that are not paddle input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostControls {
    pub start: bool,
    pub quit: bool,
}

/// Polls macroquad's device state once per frame and turns it into
/// discrete [`InputEvent`]s.
pub struct InputManager {
    mouse_dragging: bool,
    active_touch: Option<u64>,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            mouse_dragging: false,
            active_touch: None,
        }
    }

    pub fn poll(&mut self, viewport: Viewport) -> (Vec<InputEvent>, HostControls) {
        let mut events = Vec::new();

        for (codes, direction) in [
            ([KeyCode::Up, KeyCode::W], Direction::Up),
            ([KeyCode::Down, KeyCode::S], Direction::Down),
        ] {
            if codes.iter().any(|&k| is_key_pressed(k)) {
                events.push(InputEvent::KeyDown(direction));
            }
            if codes.iter().any(|&k| is_key_released(k))
                && !codes.iter().any(|&k| is_key_down(k))
            {
                events.push(InputEvent::KeyUp(direction));
            }
        }

        let touches = touches();
        if touches.is_empty() {
            self.poll_mouse(viewport, &mut events);
        } else {
            self.poll_touches(&touches, viewport, &mut events);
        }

        let controls = HostControls {
            start: is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Enter),
            quit: is_key_pressed(KeyCode::Escape),
        };

        (events, controls)
    }

    fn poll_touches(&mut self, touches: &[Touch], viewport: Viewport, events: &mut Vec<InputEvent>) {
        for touch in touches {
            let screen_y = touch.position.y;
            match touch.phase {
                TouchPhase::Started if self.active_touch.is_none() => {
                    self.active_touch = Some(touch.id);
                    events.push(InputEvent::TouchStart { screen_y, viewport });
                }
                TouchPhase::Moved if self.active_touch == Some(touch.id) => {
                    events.push(InputEvent::TouchMove { screen_y, viewport });
                }
                TouchPhase::Ended | TouchPhase::Cancelled if self.active_touch == Some(touch.id) => {
                    self.active_touch = None;
                    events.push(InputEvent::TouchEnd);
                }
                _ => {}
            }
        }
    }

    // Mouse drags stand in for touch on desktop.
    fn poll_mouse(&mut self, viewport: Viewport, events: &mut Vec<InputEvent>) {
        let (_, screen_y) = mouse_position();

        if is_mouse_button_pressed(MouseButton::Left) {
            self.mouse_dragging = true;
            events.push(InputEvent::TouchStart { screen_y, viewport });
        } else if self.mouse_dragging && is_mouse_button_down(MouseButton::Left) {
            if mouse_delta_position().y != 0.0 {
                events.push(InputEvent::TouchMove { screen_y, viewport });
            }
        } else if self.mouse_dragging {
            self.mouse_dragging = false;
            events.push(InputEvent::TouchEnd);
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_key_hold_tracking() {
        let mut input = InputAggregator::new();
        assert!(input.key_down(Direction::Up));
        assert!(input.key_down(Direction::Down));
        assert!(input.key_up(Direction::Up));
        assert!(!input.key_up(Direction::Down));
        assert!(!input.state().any_key_held());
    }

    #[test]
    fn test_keyboard_target_steps() {
        let mut state = InputState::default();
        assert_eq!(state.keyboard_target(300.0), None);

        state.up = true;
        assert_approx_eq!(state.keyboard_target(300.0).unwrap(), 280.0);
        assert_approx_eq!(state.keyboard_target(10.0).unwrap(), 0.0);

        state.up = false;
        state.down = true;
        assert_approx_eq!(state.keyboard_target(300.0).unwrap(), 320.0);
        assert_approx_eq!(state.keyboard_target(495.0).unwrap(), 500.0);
    }

    #[test]
    fn test_both_keys_cancel_out_mid_table() {
        let state = InputState {
            up: true,
            down: true,
            touch: None,
        };
        assert_approx_eq!(state.keyboard_target(300.0).unwrap(), 300.0);
        // Up clamps at the top edge before down is applied.
        assert_approx_eq!(state.keyboard_target(0.0).unwrap(), 20.0);
    }

    #[test]
    fn test_touch_moves_relative_to_gesture_start() {
        let mut input = InputAggregator::new();
        let viewport = Viewport::identity();

        input.touch_start(300.0, viewport, 300.0);
        assert_approx_eq!(input.touch_move(350.0, viewport).unwrap(), 350.0);
        assert_approx_eq!(input.touch_move(280.0, viewport).unwrap(), 280.0);
    }

    #[test]
    fn test_touch_delta_is_scaled_to_table_units() {
        let mut input = InputAggregator::new();
        // Table drawn at half size, 40px below the top of the screen.
        let viewport = Viewport::new(40.0, 300.0);

        input.touch_start(190.0, viewport, 100.0);
        let anchor = input.state().touch.unwrap();
        assert_approx_eq!(anchor.start_y, 300.0);

        // 25 screen pixels down is 50 table units.
        assert_approx_eq!(input.touch_move(215.0, viewport).unwrap(), 150.0);
    }

    #[test]
    fn test_touch_end_clears_anchor() {
        let mut input = InputAggregator::new();
        let viewport = Viewport::identity();

        input.touch_start(100.0, viewport, 200.0);
        input.touch_end();
        assert!(input.state().touch.is_none());
        assert_eq!(input.touch_move(150.0, viewport), None);
    }

    #[test]
    fn test_degenerate_viewport_is_ignored() {
        let mut input = InputAggregator::new();
        input.touch_start(100.0, Viewport::new(0.0, 0.0), 200.0);
        assert!(input.state().touch.is_none());
    }

    #[test]
    fn test_reset_releases_everything() {
        let mut input = InputAggregator::new();
        input.key_down(Direction::Down);
        input.touch_start(10.0, Viewport::identity(), 10.0);
        input.reset();
        assert_eq!(input.state(), &InputState::default());
    }
}
