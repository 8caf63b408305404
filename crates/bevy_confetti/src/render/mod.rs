mod colored;
mod textured;

pub use colored::ColoredParticleRenderer;
pub use textured::{SpriteSheet, TexturedParticleRenderer};

use std::ops::{Deref, DerefMut};

use bevy::render::alpha::AlphaMode;
use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::particle::Particle;
use crate::textures::TextureRef;

/// Batches with at least this many particles build their vertices on the
/// rayon thread pool.
pub const PARALLEL_THRESHOLD: usize = 512;

/// How a particle batch is composited over what is already drawn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// No blending, alpha is ignored.
    Opaque,
    /// Standard alpha blending.
    #[default]
    Alpha,
    /// Colors are added to the destination, like light.
    Additive,
    /// Colors are multiplied with the destination, like pigment.
    Multiply,
    /// Alpha blending with premultiplied colors.
    Premultiplied,
}

impl From<BlendMode> for AlphaMode {
    fn from(mode: BlendMode) -> Self {
        match mode {
            BlendMode::Opaque => AlphaMode::Opaque,
            BlendMode::Alpha => AlphaMode::Blend,
            BlendMode::Additive => AlphaMode::Add,
            BlendMode::Multiply => AlphaMode::Multiply,
            BlendMode::Premultiplied => AlphaMode::Premultiplied,
        }
    }
}

/// One vertex of a particle batch, laid out for direct GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    /// World-space position.
    pub position: [f32; 2],
    /// Linear RGBA color.
    pub color: [f32; 4],
    /// Texture coordinates. Zero for untextured batches.
    pub uv: [f32; 2],
}

/// All geometry for one draw call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBatch {
    /// Vertex data, one contiguous block per particle.
    pub vertices: Vec<ParticleVertex>,
    /// Triangle list indices into [`vertices`](Self::vertices).
    pub indices: Vec<u32>,
    /// Texture sampled by the batch, if any.
    pub texture: Option<TextureRef>,
}

impl ParticleBatch {
    /// Number of triangles in the batch.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes in [`ParticleVertex`] layout.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// `true` if the batch draws nothing.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// The graphics layer a particle renderer draws into.
pub trait ParticleCanvas {
    /// The currently bound blend mode.
    fn blend_mode(&self) -> BlendMode;

    /// Binds a blend mode for subsequent submissions.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Submits one batch as a single draw call.
    fn submit(&mut self, batch: ParticleBatch);
}

/// Binds a blend mode on a canvas for as long as the scope lives.
///
/// The previous mode is restored when the scope is dropped, including
/// while unwinding from a panic.
pub struct BlendScope<'a, C: ParticleCanvas + ?Sized> {
    canvas: &'a mut C,
    previous: BlendMode,
}

impl<'a, C: ParticleCanvas + ?Sized> BlendScope<'a, C> {
    /// Binds `mode` on `canvas`, remembering the mode it replaces.
    pub fn new(canvas: &'a mut C, mode: BlendMode) -> Self {
        let previous = canvas.blend_mode();
        canvas.set_blend_mode(mode);
        Self { canvas, previous }
    }
}

impl<C: ParticleCanvas + ?Sized> Deref for BlendScope<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.canvas
    }
}

impl<C: ParticleCanvas + ?Sized> DerefMut for BlendScope<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.canvas
    }
}

impl<C: ParticleCanvas + ?Sized> Drop for BlendScope<'_, C> {
    fn drop(&mut self) {
        self.canvas.set_blend_mode(self.previous);
    }
}

/// Turns a slice of live particles into one batched draw call.
///
/// The renderer is chosen when a [`ParticleType`](crate::asset::ParticleType)
/// is built and never changes afterwards.
#[derive(Debug, Serialize, Deserialize)]
pub enum ParticleRenderer {
    /// Flat-colored polygons.
    Colored(ColoredParticleRenderer),
    /// Textured quads from a sprite sheet.
    Textured(TexturedParticleRenderer),
}

impl ParticleRenderer {
    /// Builds and submits the batch for `particles`.
    ///
    /// Does nothing for an empty slice.
    pub fn render<C: ParticleCanvas + ?Sized>(&self, particles: &[Particle], canvas: &mut C) {
        if particles.is_empty() {
            return;
        }
        let batch = match self {
            Self::Colored(renderer) => renderer.build_batch(particles),
            Self::Textured(renderer) => renderer.build_batch(particles),
        };
        canvas.submit(batch);
    }

    /// Number of vertices emitted per particle.
    pub fn vertices_per_particle(&self) -> usize {
        match self {
            Self::Colored(renderer) => renderer.vertices().len(),
            Self::Textured(_) => 4,
        }
    }
}

// Fills one fixed-size vertex block per particle. Blocks are disjoint, so
// large batches are split across the rayon pool without synchronization.
pub(crate) fn build_vertices<F>(
    particles: &[Particle],
    per_particle: usize,
    fill: F,
) -> Vec<ParticleVertex>
where
    F: Fn(&Particle, &mut [ParticleVertex]) + Sync,
{
    let mut vertices = vec![ParticleVertex::zeroed(); particles.len() * per_particle];
    if particles.len() >= PARALLEL_THRESHOLD {
        vertices
            .par_chunks_mut(per_particle)
            .zip(particles.par_iter())
            .for_each(|(block, particle)| fill(particle, block));
    } else {
        vertices
            .chunks_mut(per_particle)
            .zip(particles)
            .for_each(|(block, particle)| fill(particle, block));
    }
    vertices
}

// Repeats a per-particle index template, offset by each particle's first vertex.
pub(crate) fn build_indices(
    particle_count: usize,
    per_particle: usize,
    template: &[u32],
) -> Vec<u32> {
    (0..particle_count)
        .flat_map(|i| {
            let base = (i * per_particle) as u32;
            template.iter().map(move |index| base + index)
        })
        .collect()
}

pub(crate) fn linear_color(particle: &Particle) -> [f32; 4] {
    let color = bevy::color::LinearRgba::from(particle.color);
    [color.red, color.green, color.blue, color.alpha]
}
