use bevy::prelude::*;

use crate::behavior::ParticleBehavior;

/// A single simulated particle.
///
/// Particles are plain mutable records owned by exactly one
/// [`ParticleSystem`](crate::runtime::ParticleSystem). Every tick the owning
/// system calls [`update`](Self::update), which integrates velocity and runs
/// the attached behaviors in attachment order.
#[derive(Debug, Clone)]
pub struct Particle {
    /// World-space position.
    pub location: Vec2,
    /// Displacement applied to [`location`](Self::location) every tick.
    pub velocity: Vec2,
    /// Scale and rotation applied to the renderer's vertex template.
    pub transform: Mat2,
    /// Blend color. For colored renderers this is the fill color, for textured
    /// renderers a tint.
    pub color: Srgba,
    age: u32,
    lifetime: u32,
    behaviors: Vec<ParticleBehavior>,
}

impl Particle {
    /// Creates a particle at `location` that lives for `lifetime` ticks.
    ///
    /// The particle starts at rest, untransformed and opaque white.
    pub fn new(location: Vec2, lifetime: u32) -> Self {
        Self {
            location,
            velocity: Vec2::ZERO,
            transform: Mat2::IDENTITY,
            color: Srgba::WHITE,
            age: 0,
            lifetime,
            behaviors: Vec::new(),
        }
    }

    /// Number of ticks this particle has been updated.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Total number of ticks this particle lives.
    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    /// `true` until the particle has reached its lifetime.
    pub fn is_alive(&self) -> bool {
        self.age < self.lifetime
    }

    /// Fraction of the lifetime already elapsed, from `0.0` to `1.0`.
    pub fn progress(&self) -> f32 {
        if self.lifetime == 0 {
            return 1.0;
        }
        self.age as f32 / self.lifetime as f32
    }

    /// Attached behaviors, in the order they run.
    pub fn behaviors(&self) -> &[ParticleBehavior] {
        &self.behaviors
    }

    /// Initializes `behavior` against this particle and appends it.
    ///
    /// Behaviors run in attachment order, so a later behavior observes the
    /// state already written by earlier ones within the same tick.
    pub fn attach_behavior(&mut self, behavior: ParticleBehavior) {
        behavior.initialize(self);
        self.behaviors.push(behavior);
    }

    /// Advances the particle by one tick.
    ///
    /// Returns `false` once the particle has reached the end of its lifetime;
    /// in that case no motion or behavior is applied and the caller must drop
    /// the particle before the next render.
    pub fn update(&mut self) -> bool {
        self.age = self.age.saturating_add(1);
        if self.age >= self.lifetime {
            return false;
        }

        self.location += self.velocity;

        let behaviors = std::mem::take(&mut self.behaviors);
        for behavior in &behaviors {
            behavior.update(self);
        }
        self.behaviors = behaviors;

        true
    }
}
