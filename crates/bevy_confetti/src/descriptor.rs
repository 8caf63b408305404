use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::RwLock;
use rand::{Rng, distr::Distribution};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::behavior::ParticleBehavior;
use crate::distribution::{ColorDistribution, DistributionError, Range, VectorDistribution};

/// Errors raised when building a [`ParticleDescriptor`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescriptorError {
    /// One of the descriptor's distributions is invalid.
    #[error(transparent)]
    Distribution(#[from] DistributionError),
    /// A fixed parameter is NaN or infinite.
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    /// Friction cannot add energy.
    #[error("friction must not be negative, got {0}")]
    NegativeFriction(f32),
    /// A line attractor needs a direction to derive its normal from.
    #[error("line attractor direction must not be zero")]
    ZeroDirection,
}

/// A parameter block shared between a descriptor and every behavior it made.
///
/// Cloning a `Shared` clones the handle, not the value: writes through any
/// clone are seen by all of them on their next read.
#[derive(Debug, Default)]
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    /// Wraps `value` in a new shared block.
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Mutates the shared value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.0.write());
    }

    /// Returns `true` if both handles point at the same block.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Copy> Shared<T> {
    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        *self.0.read()
    }

    /// Replaces the shared value.
    pub fn set(&self, value: T) {
        *self.0.write() = value;
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Serialize> Serialize for Shared<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.read().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Shared<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::new)
    }
}

/// Live parameters of a point attractor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PointAttractor {
    /// Target point in world space.
    pub location: Vec2,
    /// Velocity change per tick toward the target. Negative values repel.
    pub strength: f32,
}

impl Shared<PointAttractor> {
    /// Current target point.
    pub fn location(&self) -> Vec2 {
        self.get().location
    }

    /// Moves the target point.
    pub fn set_location(&self, location: Vec2) {
        self.update(|attractor| attractor.location = location);
    }

    /// Current attraction strength.
    pub fn strength(&self) -> f32 {
        self.get().strength
    }

    /// Changes the attraction strength.
    pub fn set_strength(&self, strength: f32) {
        self.update(|attractor| attractor.strength = strength);
    }
}

/// Live parameters of a line attractor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LineAttractor {
    /// Any point on the line.
    pub origin: Vec2,
    /// Direction of the line. Does not need to be normalized.
    pub direction: Vec2,
    /// Velocity change per tick per unit of perpendicular distance.
    pub strength: f32,
}

impl Default for LineAttractor {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            direction: Vec2::X,
            strength: 0.0,
        }
    }
}

impl Shared<LineAttractor> {
    /// Moves the line so it passes through `origin`.
    pub fn set_origin(&self, origin: Vec2) {
        self.update(|attractor| attractor.origin = origin);
    }

    /// Turns the line. A zero direction disables the attraction.
    pub fn set_direction(&self, direction: Vec2) {
        self.update(|attractor| attractor.direction = direction);
    }

    /// Changes the attraction strength.
    pub fn set_strength(&self, strength: f32) {
        self.update(|attractor| attractor.strength = strength);
    }
}

/// Configuration for one particle effect.
///
/// A descriptor never touches a live particle. It is a factory that turns
/// its configuration into a fresh [`ParticleBehavior`] for every spawned
/// particle, sampling each random distribution exactly once per call to
/// [`make_behavior`](Self::make_behavior).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParticleDescriptor {
    /// Adds a sampled velocity at spawn.
    LinearMotion {
        /// Initial velocity, in units per tick.
        velocity: VectorDistribution,
    },
    /// Attraction toward a movable point.
    PointAttraction(Shared<PointAttractor>),
    /// Attraction toward a movable line.
    LineAttraction(Shared<LineAttractor>),
    /// Constant acceleration with friction.
    Acceleration {
        /// Velocity added every tick.
        acceleration: Vec2,
        /// Speed removed every tick. Defaults to `0.0`.
        #[serde(default)]
        friction: f32,
    },
    /// Sets a sampled blend color at spawn.
    Color {
        /// Color to sample from.
        color: ColorDistribution,
    },
    /// Linear fade to transparent over the lifetime.
    Fadeout,
    /// Sampled uniform scale at spawn with optional per-tick growth.
    Scale {
        /// Scale factor applied at spawn.
        initial: Range,
        /// Scale factor compounded every tick, sampled once per particle.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        growth: Option<Range>,
    },
    /// Sampled rotation at spawn with optional per-tick spin.
    Rotation {
        /// Initial angle in degrees.
        initial: Range,
        /// Angle added every tick in degrees, sampled once per particle.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spin: Option<Range>,
    },
    /// Fixed linear transform at spawn with an optional per-tick delta.
    Transformation {
        /// Matrix applied at spawn.
        initial: Mat2,
        /// Matrix compounded every tick.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        per_tick: Option<Mat2>,
    },
}

impl ParticleDescriptor {
    /// Initial velocity sampled from `velocity`.
    pub fn linear_motion(velocity: VectorDistribution) -> Result<Self, DescriptorError> {
        Self::validated(Self::LinearMotion { velocity })
    }

    /// Attraction toward the point stored in `attractor`.
    ///
    /// Keep a clone of `attractor` to move the target or change the strength
    /// while particles are alive.
    pub fn point_attraction(
        attractor: &Shared<PointAttractor>,
    ) -> Result<Self, DescriptorError> {
        Self::validated(Self::PointAttraction(attractor.clone()))
    }

    /// Attraction toward the line stored in `attractor`.
    pub fn line_attraction(
        attractor: &Shared<LineAttractor>,
    ) -> Result<Self, DescriptorError> {
        Self::validated(Self::LineAttraction(attractor.clone()))
    }

    /// Adds `acceleration` every tick, then removes `friction` from the speed.
    pub fn acceleration(acceleration: Vec2, friction: f32) -> Result<Self, DescriptorError> {
        Self::validated(Self::Acceleration {
            acceleration,
            friction,
        })
    }

    /// Blend color sampled from `color`.
    pub fn color(color: ColorDistribution) -> Result<Self, DescriptorError> {
        Self::validated(Self::Color { color })
    }

    /// Linear fade to transparent over the particle's lifetime.
    pub fn fadeout() -> Self {
        Self::Fadeout
    }

    /// Uniform scale sampled from `initial`, compounded by `growth` each tick.
    pub fn scale(initial: Range, growth: Option<Range>) -> Result<Self, DescriptorError> {
        Self::validated(Self::Scale { initial, growth })
    }

    /// Rotation in degrees sampled from `initial`, advanced by `spin` each tick.
    pub fn rotation(initial: Range, spin: Option<Range>) -> Result<Self, DescriptorError> {
        Self::validated(Self::Rotation { initial, spin })
    }

    /// Fixed matrix applied at spawn, with an optional per-tick matrix.
    pub fn transformation(
        initial: Mat2,
        per_tick: Option<Mat2>,
    ) -> Result<Self, DescriptorError> {
        Self::validated(Self::Transformation { initial, per_tick })
    }

    fn validated(descriptor: Self) -> Result<Self, DescriptorError> {
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Checks every distribution and fixed parameter of this descriptor.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        match self {
            Self::LinearMotion { velocity } => velocity.validate()?,
            Self::PointAttraction(attractor) => {
                let PointAttractor { location, strength } = attractor.get();
                if !location.is_finite() {
                    return Err(DescriptorError::NonFinite("attractor location"));
                }
                if !strength.is_finite() {
                    return Err(DescriptorError::NonFinite("attractor strength"));
                }
            }
            Self::LineAttraction(attractor) => {
                let LineAttractor {
                    origin,
                    direction,
                    strength,
                } = attractor.get();
                if !origin.is_finite() || !direction.is_finite() {
                    return Err(DescriptorError::NonFinite("line attractor geometry"));
                }
                if direction == Vec2::ZERO {
                    return Err(DescriptorError::ZeroDirection);
                }
                if !strength.is_finite() {
                    return Err(DescriptorError::NonFinite("attractor strength"));
                }
            }
            Self::Acceleration {
                acceleration,
                friction,
            } => {
                if !acceleration.is_finite() {
                    return Err(DescriptorError::NonFinite("acceleration"));
                }
                if !friction.is_finite() {
                    return Err(DescriptorError::NonFinite("friction"));
                }
                if *friction < 0.0 {
                    return Err(DescriptorError::NegativeFriction(*friction));
                }
            }
            Self::Color { color } => color.validate()?,
            Self::Fadeout => {}
            Self::Scale { initial, growth } => {
                initial.validate()?;
                if let Some(growth) = growth {
                    growth.validate()?;
                }
            }
            Self::Rotation { initial, spin } => {
                initial.validate()?;
                if let Some(spin) = spin {
                    spin.validate()?;
                }
            }
            Self::Transformation { initial, per_tick } => {
                if !initial.is_finite() || per_tick.is_some_and(|m| !m.is_finite()) {
                    return Err(DescriptorError::NonFinite("transformation matrix"));
                }
            }
        }
        Ok(())
    }

    /// Creates the behavior for one newly spawned particle.
    pub fn make_behavior<R: Rng + ?Sized>(&self, rng: &mut R) -> ParticleBehavior {
        match self {
            Self::LinearMotion { velocity } => ParticleBehavior::LinearMotion {
                velocity: velocity.sample(rng),
            },
            Self::PointAttraction(attractor) => {
                ParticleBehavior::PointAttraction(attractor.clone())
            }
            Self::LineAttraction(attractor) => ParticleBehavior::LineAttraction(attractor.clone()),
            Self::Acceleration {
                acceleration,
                friction,
            } => ParticleBehavior::Acceleration {
                acceleration: *acceleration,
                friction: *friction,
            },
            Self::Color { color } => ParticleBehavior::Color {
                color: color.sample(rng),
            },
            Self::Fadeout => ParticleBehavior::Fadeout,
            Self::Scale { initial, growth } => ParticleBehavior::Scale {
                initial: initial.sample(rng),
                growth: growth.map(|growth| growth.sample(rng)),
            },
            Self::Rotation { initial, spin } => ParticleBehavior::Rotation {
                initial: initial.sample(rng).to_radians(),
                spin: spin.map(|spin| spin.sample(rng).to_radians()),
            },
            Self::Transformation { initial, per_tick } => ParticleBehavior::Transformation {
                initial: *initial,
                per_tick: *per_tick,
            },
        }
    }
}
