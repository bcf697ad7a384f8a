use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{Sprite, SceneWorld};

use super::{LogicalView, Viewport};

const CLEAR_COLOR: [u8; 4] = [12, 12, 18, 255];
const LETTERBOX_COLOR: [u8; 4] = [0, 0, 0, 255];

struct LoadedTexture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

pub(crate) struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    texture_cache: HashMap<String, Option<LoadedTexture>>,
    warned_texture_keys: HashSet<String>,
    draw_order: Vec<usize>,
}

impl Renderer {
    pub(crate) fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            texture_cache: HashMap::new(),
            warned_texture_keys: HashSet::new(),
            draw_order: Vec::new(),
        })
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
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
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    /// Draws every sprite of the finished tick, lowest depth first.
    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        let viewport = self.viewport;
        let view = LogicalView::fit(viewport);

        let sprites: Vec<&Sprite> = world.sprites().collect();
        self.draw_order.clear();
        self.draw_order.extend(0..sprites.len());
        self.draw_order
            .sort_by(|a, b| sprites[*a].depth.total_cmp(&sprites[*b].depth));

        for index in &self.draw_order {
            let key = sprites[*index].texture.as_str();
            if !self.texture_cache.contains_key(key) {
                let loaded = load_texture(world, key, &mut self.warned_texture_keys);
                self.texture_cache.insert(key.to_string(), loaded);
            }
        }

        let frame = self.pixels.frame_mut();
        fill_frame(frame, LETTERBOX_COLOR);
        fill_logical_area(frame, viewport, view, CLEAR_COLOR);
        for index in &self.draw_order {
            let sprite = sprites[*index];
            let texture = self
                .texture_cache
                .get(sprite.texture.as_str())
                .and_then(Option::as_ref);
            draw_sprite(frame, viewport, view, sprite, texture);
        }

        self.pixels.render()
    }
}

fn load_texture(
    world: &SceneWorld,
    key: &str,
    warned_keys: &mut HashSet<String>,
) -> Option<LoadedTexture> {
    let path = world.textures().path(key)?;
    match decode_rgba(path) {
        Ok(texture) => Some(texture),
        Err(reason) => {
            warn_texture_load_once(warned_keys, key, path, reason.as_str());
            None
        }
    }
}

fn decode_rgba(path: &Path) -> Result<LoadedTexture, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedTexture {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_texture_load_once(warned_keys: &mut HashSet<String>, key: &str, path: &Path, reason: &str) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    warn!(
        texture_key = key,
        path = %path.display(),
        reason = reason,
        "renderer_texture_load_failed_using_flat_fill"
    );
}

fn fill_frame(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

fn fill_logical_area(frame: &mut [u8], viewport: Viewport, view: LogicalView, color: [u8; 4]) {
    let left = view.offset_x.round() as i32;
    let top = view.offset_y.round() as i32;
    let right = viewport.width as i32 - left;
    let bottom = viewport.height as i32 - top;
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, viewport, x, y, color);
        }
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], viewport: Viewport, x: i32, y: i32, color: [u8; 4]) {
    let Some(offset) = pixel_offset(viewport, x, y) else {
        return;
    };
    if offset + 4 > frame.len() {
        return;
    }
    frame[offset..offset + 4].copy_from_slice(&color);
}

fn blend_pixel_clipped(frame: &mut [u8], viewport: Viewport, x: i32, y: i32, color: [u8; 4]) {
    let alpha = color[3];
    if alpha == 0 {
        return;
    }
    if alpha == 255 {
        write_pixel_rgba_clipped(frame, viewport, x, y, color);
        return;
    }
    let Some(offset) = pixel_offset(viewport, x, y) else {
        return;
    };
    if offset + 4 > frame.len() {
        return;
    }
    let a = alpha as u32;
    for channel in 0..3 {
        let dst = frame[offset + channel] as u32;
        let src = color[channel] as u32;
        frame[offset + channel] = ((src * a + dst * (255 - a) + 127) / 255) as u8;
    }
    frame[offset + 3] = 255;
}

fn pixel_offset(viewport: Viewport, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 || x >= viewport.width as i32 || y >= viewport.height as i32 {
        return None;
    }
    (y as usize)
        .checked_mul(viewport.width as usize)?
        .checked_add(x as usize)?
        .checked_mul(4)
}

fn modulate(texel: [u8; 4], tint: [u8; 4]) -> [u8; 4] {
    let mut out = [0u8; 4];
    for channel in 0..4 {
        out[channel] = ((texel[channel] as u32 * tint[channel] as u32 + 127) / 255) as u8;
    }
    out
}

/// Rotation is not applied; sprites are drawn axis-aligned.
fn draw_sprite(
    frame: &mut [u8],
    viewport: Viewport,
    view: LogicalView,
    sprite: &Sprite,
    texture: Option<&LoadedTexture>,
) {
    let width_px = view.scale_length(sprite.size.x);
    let height_px = view.scale_length(sprite.size.y);
    if width_px == 0 || height_px == 0 {
        return;
    }
    let (center_x, center_y) = view.to_screen_px(sprite.position);
    let left = center_x - (width_px as i32 / 2);
    let top = center_y - (height_px as i32 / 2);
    let tint = sprite.tint.to_bytes();

    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = (left + width_px as i32).min(viewport.width as i32);
    let draw_bottom = (top + height_px as i32).min(viewport.height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let Some(texture) = texture.filter(|texture| texture_is_sound(texture)) else {
        for y in draw_top..draw_bottom {
            for x in draw_left..draw_right {
                blend_pixel_clipped(frame, viewport, x, y, tint);
            }
        }
        return;
    };

    let (u0, v0, u1, v1) = sprite.frame.uv_rect();
    let cell_left = u0 * texture.width as f32;
    let cell_top = v0 * texture.height as f32;
    let cell_width = (u1 - u0) * texture.width as f32;
    let cell_height = (v1 - v0) * texture.height as f32;

    for y in draw_top..draw_bottom {
        let fy = (y - top) as f32 / height_px as f32;
        let src_y = ((cell_top + fy * cell_height) as u32).min(texture.height - 1) as usize;
        for x in draw_left..draw_right {
            let fx = (x - left) as f32 / width_px as f32;
            let src_x = ((cell_left + fx * cell_width) as u32).min(texture.width - 1) as usize;
            let src_offset = (src_y * texture.width as usize + src_x) * 4;
            let texel = [
                texture.rgba[src_offset],
                texture.rgba[src_offset + 1],
                texture.rgba[src_offset + 2],
                texture.rgba[src_offset + 3],
            ];
            blend_pixel_clipped(frame, viewport, x, y, modulate(texel, tint));
        }
    }
}

fn texture_is_sound(texture: &LoadedTexture) -> bool {
    texture.width > 0
        && texture.height > 0
        && texture.rgba.len() >= texture.width as usize * texture.height as usize * 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AtlasFrame, Rgba, Vec2};

    const VIEWPORT: Viewport = Viewport {
        width: 1280,
        height: 720,
    };

    fn blank_frame() -> Vec<u8> {
        vec![0u8; VIEWPORT.width as usize * VIEWPORT.height as usize * 4]
    }

    fn pixel_at(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
        let offset = (y * VIEWPORT.width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn two_cell_texture() -> LoadedTexture {
        // Left cell red, right cell green.
        let mut rgba = Vec::new();
        for _row in 0..2 {
            rgba.extend_from_slice(&[255, 0, 0, 255, 255, 0, 0, 255]);
            rgba.extend_from_slice(&[0, 255, 0, 255, 0, 255, 0, 255]);
        }
        LoadedTexture {
            width: 4,
            height: 2,
            rgba,
        }
    }

    #[test]
    fn write_pixel_ignores_out_of_bounds() {
        let mut frame = blank_frame();
        write_pixel_rgba_clipped(&mut frame, VIEWPORT, -1, 0, [9, 9, 9, 9]);
        write_pixel_rgba_clipped(&mut frame, VIEWPORT, 1280, 0, [9, 9, 9, 9]);
        write_pixel_rgba_clipped(&mut frame, VIEWPORT, 0, 720, [9, 9, 9, 9]);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn missing_texture_draws_flat_tinted_rect() {
        let mut frame = blank_frame();
        let view = LogicalView::fit(VIEWPORT);
        let sprite = Sprite::new("missing", Vec2::new(100.0, 100.0), Vec2::new(10.0, 10.0))
            .with_tint(Rgba::new(0.0, 0.0, 1.0, 1.0));

        draw_sprite(&mut frame, VIEWPORT, view, &sprite, None);

        assert_eq!(pixel_at(&frame, 100, 100), [0, 0, 255, 255]);
        assert_eq!(pixel_at(&frame, 120, 100), [0, 0, 0, 0]);
    }

    #[test]
    fn atlas_column_selects_texture_cell() {
        let texture = two_cell_texture();
        let view = LogicalView::fit(VIEWPORT);
        let mut frame = blank_frame();
        let mut atlas_frame = AtlasFrame::grid(2, 1);
        let sprite = Sprite::new("panel", Vec2::new(50.0, 50.0), Vec2::new(20.0, 20.0));

        draw_sprite(
            &mut frame,
            VIEWPORT,
            view,
            &sprite.clone().with_frame(atlas_frame),
            Some(&texture),
        );
        assert_eq!(pixel_at(&frame, 50, 50), [255, 0, 0, 255]);

        atlas_frame.column = 1;
        draw_sprite(
            &mut frame,
            VIEWPORT,
            view,
            &sprite.with_frame(atlas_frame),
            Some(&texture),
        );
        assert_eq!(pixel_at(&frame, 50, 50), [0, 255, 0, 255]);
    }

    #[test]
    fn tint_modulates_texels() {
        assert_eq!(modulate([200, 100, 50, 255], [255, 0, 255, 255]), [200, 0, 50, 255]);
        assert_eq!(modulate([255, 255, 255, 255], [128, 128, 128, 255])[0], 128);
    }

    #[test]
    fn half_alpha_blends_over_destination() {
        let mut frame = blank_frame();
        write_pixel_rgba_clipped(&mut frame, VIEWPORT, 0, 0, [0, 0, 0, 255]);
        blend_pixel_clipped(&mut frame, VIEWPORT, 0, 0, [255, 255, 255, 128]);
        assert_eq!(pixel_at(&frame, 0, 0), [128, 128, 128, 255]);
    }
}
