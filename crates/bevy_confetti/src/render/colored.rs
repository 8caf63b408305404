use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ParticleBatch, build_indices, build_vertices, linear_color};
use crate::asset::ParticleTypeError;
use crate::particle::Particle;

/// Renders every particle as a flat-colored convex polygon.
///
/// The polygon is drawn as a triangle fan around its first vertex, so it must
/// be convex (or at least star-shaped around vertex 0) to render correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColoredParticleRenderer {
    vertices: Vec<Vec2>,
    #[serde(skip)]
    fan: Vec<u32>,
}

impl ColoredParticleRenderer {
    /// Creates a renderer for the polygon template `vertices`, in particle-local space.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self, ParticleTypeError> {
        let mut renderer = Self {
            vertices,
            fan: Vec::new(),
        };
        renderer.prepare()?;
        Ok(renderer)
    }

    /// A regular polygon with `sides` corners and the given circumradius.
    pub fn regular(sides: usize, radius: f32) -> Result<Self, ParticleTypeError> {
        let step = std::f32::consts::TAU / sides.max(1) as f32;
        let vertices = (0..sides)
            .map(|i| Vec2::from_angle(i as f32 * step) * radius)
            .collect();
        Self::new(vertices)
    }

    /// The polygon template, in particle-local space.
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub(crate) fn validate(&self) -> Result<(), ParticleTypeError> {
        if self.vertices.len() < 3 {
            return Err(ParticleTypeError::TooFewVertices(self.vertices.len()));
        }
        if let Some(index) = self.vertices.iter().position(|v| !v.is_finite()) {
            return Err(ParticleTypeError::NonFiniteVertex(index));
        }
        Ok(())
    }

    // rebuilds the fan indices, which are not serialized
    pub(crate) fn prepare(&mut self) -> Result<(), ParticleTypeError> {
        self.validate()?;
        self.fan = (1..self.vertices.len() as u32 - 1)
            .flat_map(|i| [0, i, i + 1])
            .collect();
        Ok(())
    }

    pub(crate) fn build_batch(&self, particles: &[Particle]) -> ParticleBatch {
        let per_particle = self.vertices.len();
        let vertices = build_vertices(particles, per_particle, |particle, block| {
            let color = linear_color(particle);
            for (vertex, local) in block.iter_mut().zip(&self.vertices) {
                vertex.position = (particle.location + particle.transform * *local).to_array();
                vertex.color = color;
            }
        });

        ParticleBatch {
            vertices,
            indices: build_indices(particles.len(), per_particle, &self.fan),
            texture: None,
        }
    }
}
