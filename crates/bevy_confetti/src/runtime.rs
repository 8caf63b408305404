use bevy::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::asset::ParticleType;
use crate::particle::Particle;
use crate::render::ParticleCanvas;

/// A live group of particles spawned from one [`ParticleType`].
///
/// Spawn it as a component to have [`ConfettiPlugin`](crate::ConfettiPlugin)
/// tick it in `FixedUpdate` and draw it in `PostUpdate`:
///
/// ```
/// use bevy::prelude::*;
/// use bevy_confetti::prelude::*;
///
/// fn setup(mut commands: Commands, asset_server: Res<AssetServer>) {
///     let mut fountain = ParticleSystem::new(asset_server.load("sparks.ron"), Vec2::ZERO)
///         .with_spawn_per_tick(4);
///     fountain.emit(u32::MAX);
///     commands.spawn(fountain);
/// }
/// ```
#[derive(Component, Debug)]
pub struct ParticleSystem {
    /// The type every particle of this system is generated from.
    pub kind: Handle<ParticleType>,
    /// Where new particles are generated.
    pub origin: Vec2,
    /// Upper bound on particles generated per tick from the pending count.
    /// `None` or `Some(0)` generates everything pending on the next tick.
    pub spawn_per_tick: Option<u32>,
    /// Whether the system despawns itself once it has no particles and
    /// nothing pending.
    pub auto_destroy: bool,
    particles: Vec<Particle>,
    pending: u32,
}

impl ParticleSystem {
    /// Creates an empty, persistent system.
    pub fn new(kind: Handle<ParticleType>, origin: Vec2) -> Self {
        Self {
            kind,
            origin,
            spawn_per_tick: None,
            auto_destroy: false,
            particles: Vec::new(),
            pending: 0,
        }
    }

    /// Sets whether the system despawns itself once it runs out of particles.
    pub fn with_auto_destroy(mut self, auto_destroy: bool) -> Self {
        self.auto_destroy = auto_destroy;
        self
    }

    /// Limits how many pending particles are generated per tick. A rate of
    /// zero removes the limit.
    pub fn with_spawn_per_tick(mut self, rate: u32) -> Self {
        self.spawn_per_tick = (rate > 0).then_some(rate);
        self
    }

    /// The live particles, in spawn order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to the live particles, for effects driven from outside.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// `true` when no particle is alive. Pending spawns are not counted.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of particles queued to be generated on upcoming ticks.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Queues `count` particles to be generated at [`origin`](Self::origin)
    /// on upcoming ticks.
    pub fn emit(&mut self, count: u32) {
        self.pending = self.pending.saturating_add(count);
    }

    /// Drops every pending spawn.
    pub fn stop_emitting(&mut self) {
        self.pending = 0;
    }

    /// Generates `count` particles at [`origin`](Self::origin) right away.
    pub fn spawn<R: Rng + ?Sized>(&mut self, kind: &ParticleType, count: u32, rng: &mut R) {
        self.particles.reserve(count as usize);
        for _ in 0..count {
            self.particles.push(kind.generate(self.origin, rng));
        }
    }

    /// Advances the system by one tick.
    ///
    /// Every particle is updated and the ones that reached the end of their
    /// lifetime are removed. Pending spawns are generated afterwards, so they
    /// are drawn at age zero. Returns the number of particles removed.
    pub fn tick<R: Rng + ?Sized>(&mut self, kind: &ParticleType, rng: &mut R) -> usize {
        let before = self.particles.len();
        self.particles.retain_mut(Particle::update);
        let removed = before - self.particles.len();

        if self.pending > 0 {
            let count = self
                .spawn_per_tick
                .filter(|&rate| rate > 0)
                .map_or(self.pending, |rate| rate.min(self.pending));
            self.pending -= count;
            self.spawn(kind, count, rng);
        }

        if removed > 0 {
            trace!(
                "particle system of \"{}\": removed {removed}, {} alive",
                kind.name,
                self.particles.len()
            );
        }
        removed
    }

    /// Draws every live particle through `kind` in a single batch.
    pub fn render<C: ParticleCanvas + ?Sized>(&self, kind: &ParticleType, canvas: &mut C) {
        kind.render(&self.particles, canvas);
    }

    /// `true` once an auto-destroying system has nothing left to simulate.
    pub fn is_finished(&self) -> bool {
        self.auto_destroy && self.particles.is_empty() && self.pending == 0
    }
}

/// Playback state of a [`ParticleSystem`] entity.
///
/// Inserted by the plugin when the system is set up, unless the entity
/// already carries one. Paused systems keep their particles on screen but
/// neither age them nor generate new ones.
#[derive(Component, Debug, Default)]
pub struct ParticleSystemRuntime {
    /// Whether ticking is suspended.
    pub paused: bool,
    /// Number of ticks simulated so far.
    pub ticks: u64,
}

impl ParticleSystemRuntime {
    /// Stops ticking until [`resume`](Self::resume) is called.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Continues ticking.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flips between paused and running.
    pub fn toggle(&mut self) {
        self.paused = !self.paused;
    }
}

/// Random source shared by every particle system in the app.
#[derive(Resource, Deref, DerefMut)]
pub struct ParticleRng(pub StdRng);

impl ParticleRng {
    /// A deterministic generator when `seed` is set, otherwise one seeded
    /// from the operating system.
    pub fn from_seed(seed: Option<u64>) -> Self {
        Self(match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        })
    }
}

/// Something that takes ownership of particle systems so they get ticked
/// and rendered every frame.
pub trait ParticleRegistry {
    /// Identifier handed back for a registered system.
    type Id;

    /// Takes ownership of `system` and returns its identifier.
    fn register(&mut self, system: ParticleSystem) -> Self::Id;
}

impl ParticleRegistry for Commands<'_, '_> {
    type Id = Entity;

    fn register(&mut self, system: ParticleSystem) -> Entity {
        self.spawn(system).id()
    }
}

impl ParticleRegistry for Vec<ParticleSystem> {
    type Id = usize;

    fn register(&mut self, system: ParticleSystem) -> usize {
        self.push(system);
        self.len() - 1
    }
}

/// Links the entity drawing a particle system back to it.
#[derive(Component)]
pub struct ParticleMeshEntity {
    /// The entity carrying the [`ParticleSystem`].
    pub system_entity: Entity,
}

/// The mesh a particle system's batch is written into every frame.
#[derive(Component)]
pub struct ParticleMeshHandle(pub Handle<Mesh>);

/// The material the particle mesh is drawn with.
#[derive(Component)]
pub struct ParticleMaterialHandle(pub Handle<StandardMaterial>);
