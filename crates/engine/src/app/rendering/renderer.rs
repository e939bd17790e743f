use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::camera::Viewport;
use crate::geometry::Rect;
use crate::spatial::DrawTarget;
use crate::sprite::Sprite;
use crate::world::SpriteWorld;

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const HITBOX_OUTLINE_COLOR: [u8; 4] = [255, 90, 90, 255];
const COLLIDING_OUTLINE_COLOR: [u8; 4] = [255, 230, 70, 255];
/// Brightness change per animation frame, so animated placeholders visibly cycle.
const ANIMATION_SHADE_STEP: u8 = 12;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    /// Clears the frame, paints the world's visible sprites and presents.
    /// Returns the number of sprites drawn.
    pub(crate) fn render_world(
        &mut self,
        world: &mut SpriteWorld,
        show_hitboxes: bool,
    ) -> Result<usize, Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(0);
        }

        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }
        let mut target = FrameTarget {
            frame,
            width: self.viewport.width,
            height: self.viewport.height,
            show_hitboxes,
        };
        let drawn = world.draw(&mut target);

        self.pixels.render()?;
        Ok(drawn)
    }
}

/// RGBA frame buffer adapter for [`SpriteWorld::draw`].
struct FrameTarget<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    show_hitboxes: bool,
}

impl DrawTarget for FrameTarget<'_> {
    fn draw_sprite(&mut self, sprite: &Sprite, screen_rect: Rect) {
        let color = match sprite.animation {
            Some(animation) => shade(sprite.color, animation.current_frame()),
            None => sprite.color,
        };
        fill_rect_clipped(self.frame, self.width, self.height, screen_rect, color);

        if self.show_hitboxes {
            let outline = if sprite.is_colliding() {
                COLLIDING_OUTLINE_COLOR
            } else {
                HITBOX_OUTLINE_COLOR
            };
            let hitbox = hitbox_screen_rect(sprite, screen_rect);
            outline_rect_clipped(self.frame, self.width, self.height, hitbox, outline);
        }
    }
}

/// Maps the hitbox into screen space using the transform that took
/// `sprite.rect` to `screen_rect`.
fn hitbox_screen_rect(sprite: &Sprite, screen_rect: Rect) -> Rect {
    if sprite.rect.w <= 0.0 || sprite.rect.h <= 0.0 {
        return screen_rect;
    }
    let scale_x = screen_rect.w / sprite.rect.w;
    let scale_y = screen_rect.h / sprite.rect.h;
    Rect {
        x: screen_rect.x + (sprite.hitbox.x - sprite.rect.x) * scale_x,
        y: screen_rect.y + (sprite.hitbox.y - sprite.rect.y) * scale_y,
        w: sprite.hitbox.w * scale_x,
        h: sprite.hitbox.h * scale_y,
    }
}

fn shade(color: [u8; 4], frame_index: u16) -> [u8; 4] {
    let boost = ANIMATION_SHADE_STEP.saturating_mul(frame_index.min(u8::MAX as u16) as u8);
    [
        color[0].saturating_add(boost),
        color[1].saturating_add(boost),
        color[2].saturating_add(boost),
        color[3],
    ]
}

/// Pixel bounds `[left, right) x [top, bottom)` of `rect`, clipped to the frame.
fn clipped_bounds(width: u32, height: u32, rect: Rect) -> Option<(i32, i32, i32, i32)> {
    if !rect.x.is_finite() || !rect.y.is_finite() || !rect.has_area() {
        return None;
    }
    let left = (rect.left().round() as i32).max(0);
    let top = (rect.top().round() as i32).max(0);
    let right = (rect.right().round() as i32).min(width as i32);
    let bottom = (rect.bottom().round() as i32).min(height as i32);
    (left < right && top < bottom).then_some((left, top, right, bottom))
}

fn fill_rect_clipped(frame: &mut [u8], width: u32, height: u32, rect: Rect, color: [u8; 4]) {
    let Some((left, top, right, bottom)) = clipped_bounds(width, height, rect) else {
        return;
    };
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn outline_rect_clipped(frame: &mut [u8], width: u32, height: u32, rect: Rect, color: [u8; 4]) {
    if !rect.x.is_finite() || !rect.y.is_finite() || !rect.has_area() {
        return;
    }
    let left = rect.left().round() as i32;
    let top = rect.top().round() as i32;
    let right = rect.right().round() as i32 - 1;
    let bottom = rect.bottom().round() as i32 - 1;
    if right < 0 || bottom < 0 || left >= width as i32 || top >= height as i32 {
        return;
    }

    for x in left.max(0)..=right.min(width as i32 - 1) {
        write_pixel_rgba_clipped(frame, width as usize, x, top, color);
        write_pixel_rgba_clipped(frame, width as usize, x, bottom, color);
    }
    for y in top.max(0)..=bottom.min(height as i32 - 1) {
        write_pixel_rgba_clipped(frame, width as usize, left, y, color);
        write_pixel_rgba_clipped(frame, width as usize, right, y, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
