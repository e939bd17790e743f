use crate::geometry::{Rect, Vec2};

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.5;
pub const CAMERA_ZOOM_MAX: f32 = 2.0;
pub const CAMERA_ZOOM_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// `position` is the world point shown at the centre of the viewport.
#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport: Viewport,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
            viewport: Viewport::default(),
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        clamp_camera_zoom(self.zoom)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
    }

    pub fn apply_zoom_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        let target_zoom = self.zoom + steps as f32 * CAMERA_ZOOM_STEP;
        self.set_zoom_clamped(target_zoom);
    }

    pub fn follow(&mut self, target: Vec2) {
        self.position = target;
    }

    pub fn world_to_screen(&self, world: Rect) -> Rect {
        let zoom = self.effective_zoom();
        Rect {
            x: (world.x - self.position.x) * zoom + self.viewport.width as f32 * 0.5,
            y: (world.y - self.position.y) * zoom + self.viewport.height as f32 * 0.5,
            w: world.w * zoom,
            h: world.h * zoom,
        }
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let zoom = self.effective_zoom();
        Vec2 {
            x: (screen.x - self.viewport.width as f32 * 0.5) / zoom + self.position.x,
            y: (screen.y - self.viewport.height as f32 * 0.5) / zoom + self.position.y,
        }
    }

    /// World-space region covered by the viewport when centred on `center`.
    pub fn visible_extent(&self, center: Vec2) -> Rect {
        let zoom = self.effective_zoom();
        Rect::from_center(
            center,
            self.viewport.width as f32 / zoom,
            self.viewport.height as f32 / zoom,
        )
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}
