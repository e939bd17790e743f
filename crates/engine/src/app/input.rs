#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Edge-triggered presses: true for exactly one tick per key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressedEdges {
    pub switch_map: bool,
    pub reset: bool,
    pub interact: bool,
    pub use_tool: bool,
    pub next_tool: bool,
    pub plant: bool,
    pub pause: bool,
}

/// Input state handed to a scene for one simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    pressed: PressedEdges,
    zoom_delta_steps: i32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        pressed: PressedEdges,
        zoom_delta_steps: i32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            pressed,
            zoom_delta_steps,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn pressed(&self) -> PressedEdges {
        self.pressed
    }

    pub fn zoom_delta_steps(&self) -> i32 {
        self.zoom_delta_steps
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_pressed(mut self, pressed: PressedEdges) -> Self {
        self.pressed = pressed;
        self
    }

    pub fn with_zoom_delta_steps(mut self, zoom_delta_steps: i32) -> Self {
        self.zoom_delta_steps = zoom_delta_steps;
        self
    }

    /// Unit-or-zero walking direction from the held movement keys, in screen
    /// orientation (down is +y).
    pub fn movement_direction(&self) -> (f32, f32) {
        let mut x = 0.0f32;
        let mut y = 0.0f32;
        if self.is_down(InputAction::MoveRight) {
            x += 1.0;
        }
        if self.is_down(InputAction::MoveLeft) {
            x -= 1.0;
        }
        if self.is_down(InputAction::MoveDown) {
            y += 1.0;
        }
        if self.is_down(InputAction::MoveUp) {
            y -= 1.0;
        }
        (x, y)
    }
}
