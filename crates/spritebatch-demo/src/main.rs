use anyhow::{Context, Result};
use spritebatch::batch::SpriteBatch;
use spritebatch::coords::{Rect, Viewport};
use spritebatch::device::{GpuInit, HeadlessGpu, SpriteDeviceInit, WgpuDevice};
use spritebatch::logging::{init_logging, LoggingConfig};
use spritebatch::paint::Color;
use spritebatch::render::{RenderCtx, RenderTarget};
use spritebatch::scene::{SortPolicy, TextureId};

const TARGET_SIZE: u32 = 256;
const TEXTURE_SIZE: u32 = 16;
const DEFAULT_SPRITES: u32 = 64;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let sprites = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u32>()
            .with_context(|| format!("sprite count must be a number, got {arg:?}"))?,
        None => DEFAULT_SPRITES,
    };

    let gpu = HeadlessGpu::new_blocking(GpuInit::default())?;
    let target = gpu.create_target(TARGET_SIZE, TARGET_SIZE, wgpu::TextureFormat::Rgba8UnormSrgb)?;

    let checker = gpu.create_texture_rgba8(TEXTURE_SIZE, TEXTURE_SIZE, &checker_pixels(TEXTURE_SIZE))?;
    let ramp = gpu.create_texture_rgba8(TEXTURE_SIZE, TEXTURE_SIZE, &ramp_pixels(TEXTURE_SIZE))?;

    let ctx = RenderCtx::new(
        gpu.device(),
        gpu.queue(),
        target.format,
        Viewport::new(target.width as f32, target.height as f32),
    );
    let mut device = WgpuDevice::new(&ctx, SpriteDeviceInit::default());
    let textures = [device.register_texture(&checker), device.register_texture(&ramp)];

    let mut batch = SpriteBatch::with_capacity(device, sprites as usize)?;

    for policy in [SortPolicy::Texture, SortPolicy::FrontToBack, SortPolicy::BackToFront] {
        batch.begin(policy);
        queue_grid(&mut batch, sprites, &textures);
        batch.end()?;
        batch.render()?;

        let mut encoder = gpu.create_encoder();
        let mut frame = RenderTarget::new(&mut encoder, &target.view).with_clear(wgpu::Color::BLACK);
        batch.device_mut().encode(&mut frame);
        gpu.submit(encoder);

        let stats = batch.stats();
        log::info!(
            "{policy:?}: {} sprites, {} vertices, {} batches ({} texture switches)",
            stats.sprites,
            stats.vertices,
            stats.batches,
            stats.texture_switches
        );
    }

    Ok(())
}

/// Lays `count` sprites out on a square grid, alternating textures and
/// giving every sprite a distinct depth.
fn queue_grid(batch: &mut SpriteBatch<WgpuDevice>, count: u32, textures: &[TextureId]) {
    let columns = (count as f32).sqrt().ceil().max(1.0) as u32;
    let cell = TARGET_SIZE as f32 / columns as f32;

    for i in 0..count {
        let (col, row) = (i % columns, i / columns);
        let dest = Rect::new(col as f32 * cell, row as f32 * cell, cell * 0.9, cell * 0.9);
        let texture = textures[i as usize % textures.len()];
        let depth = ((i * 37) % count) as f32;
        let tint = Color::from_f32(1.0, 1.0 - depth / count as f32, 1.0, 1.0);
        batch.draw(dest, Rect::UNIT, texture, depth, tint);
    }
}

fn checker_pixels(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / 4) + (y / 4)) % 2 == 0;
            let v = if on { 255 } else { 40 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}

fn ramp_pixels(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let r = (x * 255 / (size - 1)) as u8;
            let g = (y * 255 / (size - 1)) as u8;
            pixels.extend_from_slice(&[r, g, 128, 255]);
        }
    }
    pixels
}
