use bevy::prelude::*;

use crate::descriptor::{LineAttractor, PointAttractor, Shared};
use crate::particle::Particle;

/// Per-particle effect, produced by a
/// [`ParticleDescriptor`](crate::descriptor::ParticleDescriptor) when the
/// particle is spawned.
///
/// Random parameters are already sampled; a behavior only reads and writes
/// the particle it is attached to. Attraction behaviors hold a handle to
/// the descriptor's live parameter block instead of a copy, so moving an
/// attractor affects every particle made from it.
#[derive(Debug, Clone)]
pub enum ParticleBehavior {
    /// Adds a velocity once at spawn. [`Particle::update`] integrates it.
    LinearMotion {
        /// Velocity added at spawn, in units per tick.
        velocity: Vec2,
    },
    /// Pulls (or pushes, for negative strength) toward a point.
    PointAttraction(Shared<PointAttractor>),
    /// Pulls (or pushes, for negative strength) toward an infinite line.
    LineAttraction(Shared<LineAttractor>),
    /// Constant acceleration followed by friction.
    Acceleration {
        /// Added to the velocity every tick.
        acceleration: Vec2,
        /// Speed removed every tick along the direction of motion.
        friction: f32,
    },
    /// Sets the blend color once at spawn.
    Color {
        /// The sampled color.
        color: Srgba,
    },
    /// Fades alpha linearly from opaque to transparent over the lifetime.
    Fadeout,
    /// Uniform scale at spawn, optionally compounded every tick.
    Scale {
        /// Scale factor applied at spawn.
        initial: f32,
        /// Scale factor multiplied into the transform every tick.
        growth: Option<f32>,
    },
    /// Rotation at spawn, optionally compounded every tick.
    Rotation {
        /// Angle applied at spawn, in radians.
        initial: f32,
        /// Angle added every tick, in radians.
        spin: Option<f32>,
    },
    /// Arbitrary linear transform at spawn, optionally compounded every tick.
    Transformation {
        /// Matrix applied at spawn.
        initial: Mat2,
        /// Matrix multiplied into the transform every tick.
        per_tick: Option<Mat2>,
    },
}

impl ParticleBehavior {
    /// Runs once when the behavior is attached.
    pub fn initialize(&self, particle: &mut Particle) {
        match self {
            Self::LinearMotion { velocity } => particle.velocity += *velocity,
            Self::Color { color } => particle.color = *color,
            Self::Scale { initial, .. } => {
                particle.transform =
                    Mat2::from_diagonal(Vec2::splat(*initial)) * particle.transform;
            }
            Self::Rotation { initial, .. } => {
                particle.transform = Mat2::from_angle(*initial) * particle.transform;
            }
            Self::Transformation { initial, .. } => {
                particle.transform = *initial * particle.transform;
            }
            Self::PointAttraction(_)
            | Self::LineAttraction(_)
            | Self::Acceleration { .. }
            | Self::Fadeout => {}
        }
    }

    /// Runs once per tick after the particle has moved.
    pub fn update(&self, particle: &mut Particle) {
        match self {
            Self::LinearMotion { .. } | Self::Color { .. } => {}
            Self::PointAttraction(attractor) => {
                let PointAttractor { location, strength } = attractor.get();
                let offset = location - particle.location;
                let distance = offset.length();
                // coincident with the target: no defined direction
                if distance > 0.0 {
                    particle.velocity += strength * offset / distance;
                }
            }
            Self::LineAttraction(attractor) => {
                let LineAttractor {
                    origin,
                    direction,
                    strength,
                } = attractor.get();
                let normal = direction.normalize_or_zero().perp();
                let distance = (particle.location - origin).dot(normal);
                particle.velocity -= strength * distance * normal;
            }
            Self::Acceleration {
                acceleration,
                friction,
            } => {
                particle.velocity += *acceleration;
                apply_friction(&mut particle.velocity, *friction);
            }
            Self::Fadeout => {
                particle.color.alpha = 1.0 - particle.progress();
            }
            Self::Scale { growth, .. } => {
                if let Some(growth) = growth {
                    particle.transform =
                        Mat2::from_diagonal(Vec2::splat(*growth)) * particle.transform;
                }
            }
            Self::Rotation { spin, .. } => {
                if let Some(spin) = spin {
                    particle.transform = Mat2::from_angle(*spin) * particle.transform;
                }
            }
            Self::Transformation { per_tick, .. } => {
                if let Some(per_tick) = per_tick {
                    particle.transform = *per_tick * particle.transform;
                }
            }
        }
    }
}

// friction larger than the current speed stops the particle outright
fn apply_friction(velocity: &mut Vec2, friction: f32) {
    if friction <= 0.0 {
        return;
    }
    let speed = velocity.length();
    if speed <= friction {
        *velocity = Vec2::ZERO;
    } else {
        *velocity -= *velocity / speed * friction;
    }
}
