use std::sync::atomic::{AtomicU32, Ordering};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ParticleBatch, build_indices, build_vertices, linear_color};
use crate::asset::ParticleTypeError;
use crate::particle::Particle;
use crate::textures::TextureRef;

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

fn default_frame_duration() -> u32 {
    1
}

/// Frame layout of a sprite sheet texture.
///
/// Frames are numbered row by row, starting at the top-left cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpriteSheet {
    /// Number of cells per row.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Number of frames in the animation, at most `columns * rows`.
    pub frames: u32,
    /// Number of render calls each frame stays on screen. Defaults to `1`.
    #[serde(default = "default_frame_duration")]
    pub frame_duration: u32,
}

impl SpriteSheet {
    /// A sheet holding a single, unanimated image.
    pub fn single() -> Self {
        Self {
            columns: 1,
            rows: 1,
            frames: 1,
            frame_duration: 1,
        }
    }

    /// A strip of `frames` cells laid out horizontally.
    pub fn strip(frames: u32) -> Self {
        Self {
            columns: frames,
            rows: 1,
            frames,
            frame_duration: 1,
        }
    }

    /// Keeps each frame on screen for `frame_duration` render calls.
    pub fn with_frame_duration(mut self, frame_duration: u32) -> Self {
        self.frame_duration = frame_duration;
        self
    }

    fn validate(&self) -> Result<(), ParticleTypeError> {
        let cells = self.columns.checked_mul(self.rows).unwrap_or(0);
        if cells == 0 || self.frames == 0 || self.frames > cells || self.frame_duration == 0 {
            return Err(ParticleTypeError::InvalidSpriteSheet(*self));
        }
        Ok(())
    }

    /// UV rectangle `(min, max)` of `frame`.
    pub fn frame_rect(&self, frame: u32) -> (Vec2, Vec2) {
        let frame = frame % self.frames.max(1);
        let cell = Vec2::new(1.0 / self.columns as f32, 1.0 / self.rows as f32);
        let min = Vec2::new((frame % self.columns) as f32, (frame / self.columns) as f32) * cell;
        (min, min + cell)
    }
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self::single()
    }
}

/// Renders every particle as a textured quad.
///
/// All particles of the type share one animation clock: the renderer
/// advances it once per non-empty render call, so every particle drawn in
/// the same call shows the same sprite frame.
#[derive(Debug, Serialize, Deserialize)]
pub struct TexturedParticleRenderer {
    texture: TextureRef,
    size: Vec2,
    #[serde(default)]
    sheet: SpriteSheet,
    #[serde(skip)]
    clock: AtomicU32,
}

impl TexturedParticleRenderer {
    /// Creates a renderer drawing `size`-sized quads centered on each particle.
    pub fn new(
        texture: TextureRef,
        size: Vec2,
        sheet: SpriteSheet,
    ) -> Result<Self, ParticleTypeError> {
        let renderer = Self {
            texture,
            size,
            sheet,
            clock: AtomicU32::new(0),
        };
        renderer.validate()?;
        Ok(renderer)
    }

    /// The image sampled by every quad.
    pub fn texture(&self) -> &TextureRef {
        &self.texture
    }

    /// Quad size before the particle transform is applied.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Frame layout of the texture.
    pub fn sheet(&self) -> &SpriteSheet {
        &self.sheet
    }

    /// The frame the next render call will draw.
    pub fn current_frame(&self) -> u32 {
        self.frame_at(self.clock.load(Ordering::Relaxed))
    }

    fn frame_at(&self, clock: u32) -> u32 {
        (clock / self.sheet.frame_duration) % self.sheet.frames
    }

    pub(crate) fn validate(&self) -> Result<(), ParticleTypeError> {
        if !self.size.is_finite() || self.size.cmple(Vec2::ZERO).any() {
            return Err(ParticleTypeError::InvalidSpriteSize(self.size));
        }
        self.sheet.validate()
    }

    pub(crate) fn build_batch(&self, particles: &[Particle]) -> ParticleBatch {
        let frame = self.frame_at(self.clock.fetch_add(1, Ordering::Relaxed));
        let (uv_min, uv_max) = self.sheet.frame_rect(frame);

        let half = self.size * 0.5;
        let corners = [
            (Vec2::new(-half.x, -half.y), [uv_min.x, uv_max.y]),
            (Vec2::new(half.x, -half.y), [uv_max.x, uv_max.y]),
            (Vec2::new(half.x, half.y), [uv_max.x, uv_min.y]),
            (Vec2::new(-half.x, half.y), [uv_min.x, uv_min.y]),
        ];

        let vertices = build_vertices(particles, corners.len(), |particle, block| {
            let color = linear_color(particle);
            for (vertex, (local, uv)) in block.iter_mut().zip(&corners) {
                vertex.position = (particle.location + particle.transform * *local).to_array();
                vertex.color = color;
                vertex.uv = *uv;
            }
        });

        ParticleBatch {
            vertices,
            indices: build_indices(particles.len(), corners.len(), &QUAD_INDICES),
            texture: Some(self.texture.clone()),
        }
    }
}
