use bevy::color::Mix;
use bevy::prelude::*;
use rand::{
    Rng,
    distr::{Distribution, Uniform},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a distribution cannot produce valid samples.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    /// The lower bound of a range is greater than its upper bound.
    #[error("range minimum {min} is greater than maximum {max}")]
    InvertedRange {
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
    /// A range bound, span or constant is NaN or infinite.
    #[error("distribution contains a non-finite value")]
    NonFinite,
    /// A choice distribution has nothing to choose from.
    #[error("choice distribution is empty")]
    EmptyChoice,
    /// A lifetime range allows particles that are dead on arrival.
    #[error("particle lifetime must be at least one tick")]
    ZeroLifetime,
    /// The lower bound of a lifetime range is greater than its upper bound.
    #[error("lifetime minimum {min} is greater than maximum {max}")]
    InvertedLifetime {
        /// Lower bound, in ticks.
        min: u32,
        /// Upper bound, in ticks.
        max: u32,
    },
}

/// A minimum/maximum range of `f32` values, sampled uniformly.
///
/// When `min == max` the range always yields that value without touching
/// the random source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Reflect)]
pub struct Range {
    /// Lower bound of the range.
    pub min: f32,
    /// Upper bound of the range.
    pub max: f32,
}

impl Range {
    /// Creates a new range with the given bounds.
    ///
    /// The range is not checked; call [`validate`](Self::validate) or use
    /// [`try_new`](Self::try_new) when the bounds come from user data.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Creates a validated range.
    pub fn try_new(min: f32, max: f32) -> Result<Self, DistributionError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// A range that always yields `value`.
    pub fn constant(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Checks that both bounds are finite and ordered, and that the span
    /// between them is representable.
    pub fn validate(&self) -> Result<(), DistributionError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(DistributionError::NonFinite);
        }
        if self.min > self.max {
            return Err(DistributionError::InvertedRange {
                min: self.min,
                max: self.max,
            });
        }
        // Spans the uniform sampler cannot scale panic when sampled.
        Uniform::new_inclusive(self.min, self.max)
            .map(|_| ())
            .map_err(|_| DistributionError::NonFinite)
    }

    /// Returns `true` if the range can only produce a single value.
    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }
}

impl Default for Range {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl Distribution<f32> for Range {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.is_constant() {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }
}

/// Particle lifetime range, in simulation ticks (inclusive on both ends).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Reflect)]
pub struct LifetimeRange {
    /// Shortest lifetime.
    pub min: u32,
    /// Longest lifetime.
    pub max: u32,
}

impl LifetimeRange {
    /// Creates a validated lifetime range.
    pub fn new(min: u32, max: u32) -> Result<Self, DistributionError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Every particle lives exactly `ticks` ticks.
    pub fn fixed(ticks: u32) -> Self {
        Self {
            min: ticks,
            max: ticks,
        }
    }

    /// Checks that the range is ordered and excludes zero.
    pub fn validate(&self) -> Result<(), DistributionError> {
        if self.min == 0 {
            return Err(DistributionError::ZeroLifetime);
        }
        if self.min > self.max {
            return Err(DistributionError::InvertedLifetime {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for LifetimeRange {
    fn default() -> Self {
        Self::fixed(60)
    }
}

impl Distribution<u32> for LifetimeRange {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.min == self.max {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }
}

/// A distribution of 2D vectors, used for initial velocities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum VectorDistribution {
    /// Always the same vector.
    Constant(Vec2),
    /// Uniform within the axis-aligned rectangle spanned by `min` and `max`.
    Rect {
        /// Lower corner.
        min: Vec2,
        /// Upper corner.
        max: Vec2,
    },
    /// A random speed along a random direction.
    Polar {
        /// Vector length.
        speed: Range,
        /// Direction angle in degrees, counter-clockwise from +X.
        angle: Range,
    },
}

impl VectorDistribution {
    /// Checks every component range.
    pub fn validate(&self) -> Result<(), DistributionError> {
        match self {
            Self::Constant(v) => {
                if v.is_finite() {
                    Ok(())
                } else {
                    Err(DistributionError::NonFinite)
                }
            }
            Self::Rect { min, max } => {
                Range::new(min.x, max.x).validate()?;
                Range::new(min.y, max.y).validate()
            }
            Self::Polar { speed, angle } => {
                speed.validate()?;
                angle.validate()
            }
        }
    }
}

impl Default for VectorDistribution {
    fn default() -> Self {
        Self::Constant(Vec2::ZERO)
    }
}

impl Distribution<Vec2> for VectorDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        match self {
            Self::Constant(v) => *v,
            Self::Rect { min, max } => Vec2::new(
                Range::new(min.x, max.x).sample(rng),
                Range::new(min.y, max.y).sample(rng),
            ),
            Self::Polar { speed, angle } => {
                let speed = speed.sample(rng);
                let angle = angle.sample(rng).to_radians();
                Vec2::from_angle(angle) * speed
            }
        }
    }
}

/// A distribution of particle blend colors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ColorDistribution {
    /// Always the same color.
    Constant(Srgba),
    /// One of the listed colors, picked uniformly.
    Choice(Vec<Srgba>),
    /// A uniform mix between two colors.
    Mix {
        /// Color at mix factor `0.0`.
        from: Srgba,
        /// Color at mix factor `1.0`.
        to: Srgba,
    },
}

impl ColorDistribution {
    /// Checks that every channel is finite and that a choice has at least
    /// one color.
    pub fn validate(&self) -> Result<(), DistributionError> {
        let finite = match self {
            Self::Constant(color) => is_finite_color(color),
            Self::Choice(colors) if colors.is_empty() => {
                return Err(DistributionError::EmptyChoice);
            }
            Self::Choice(colors) => colors.iter().all(is_finite_color),
            Self::Mix { from, to } => is_finite_color(from) && is_finite_color(to),
        };
        if finite {
            Ok(())
        } else {
            Err(DistributionError::NonFinite)
        }
    }
}

fn is_finite_color(color: &Srgba) -> bool {
    [color.red, color.green, color.blue, color.alpha]
        .iter()
        .all(|channel| channel.is_finite())
}

impl Default for ColorDistribution {
    fn default() -> Self {
        Self::Constant(Srgba::WHITE)
    }
}

impl Distribution<Srgba> for ColorDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Srgba {
        match self {
            Self::Constant(color) => *color,
            Self::Choice(colors) => colors[rng.random_range(0..colors.len())],
            Self::Mix { from, to } => from.mix(to, rng.random::<f32>()),
        }
    }
}
