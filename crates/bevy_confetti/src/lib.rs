#![deny(missing_docs)]
//! **Confetti** is a CPU particle system for 2D effects in the
//! [Bevy game engine](https://bevyengine.org/).
//!
//! Particles are plain records (position, velocity, transform, color, age)
//! mutated every tick by small behaviors. All live particles of a system are
//! drawn with a single batched draw call.
//!
//! # Getting started
//!
//! Add [`ConfettiPlugin`] to your Bevy app:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_confetti::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, ConfettiPlugin::default()))
//!         .run();
//! }
//! ```
//!
//! ## Particle types
//!
//! A [`ParticleType`] is a template: a lifetime distribution, an ordered list
//! of [descriptors](ParticleDescriptor), a [renderer](ParticleRenderer) and
//! an optional [`BlendMode`]. Types are Bevy assets and can be loaded from RON
//! files:
//!
//! ```ron
//! (
//!     confetti_version: "0.3",
//!     name: "Sparks",
//!     lifetime: (min: 30, max: 60),
//!     descriptors: [
//!         LinearMotion(velocity: Polar(speed: (min: 1.0, max: 3.0), angle: (min: 0.0, max: 360.0))),
//!         Color(color: Constant((red: 1.0, green: 0.8, blue: 0.2, alpha: 1.0))),
//!         Fadeout,
//!     ],
//!     renderer: Colored((vertices: [(-1.0, -1.0), (1.0, -1.0), (0.0, 1.0)])),
//!     blend_mode: Some(Additive),
//! )
//! ```
//!
//! ## Spawning particles
//!
//! Particles are drawn as unlit meshes on the XY plane, so they need a
//! [`Camera3d`] looking down -Z. An orthographic projection gives the usual
//! 2D framing. The quickest way to show particles is a burst, which despawns
//! itself once every particle has died:
//!
//! ```
//! use bevy::prelude::*;
//! use bevy_confetti::prelude::*;
//!
//! fn explode(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn((
//!         Camera3d::default(),
//!         Projection::Orthographic(OrthographicProjection::default_2d()),
//!         Transform::from_xyz(0.0, 0.0, 10.0),
//!     ));
//!     commands.burst_particles(asset_server.load("sparks.ron"), Vec2::ZERO, 64);
//! }
//! ```
//!
//! For continuous effects spawn a [`ParticleSystem`] and [`emit`](ParticleSystem::emit)
//! into it. Its [`ParticleSystemRuntime`] pauses and resumes the simulation.
//!
//! # Simulation
//!
//! Systems tick in `FixedUpdate`: every particle ages by one tick, moves by
//! its velocity and runs its behaviors in order. Particles that reach their
//! lifetime are removed before the next render. Rendering happens in
//! `PostUpdate`, where each system's batch is written into a mesh on the XY
//! plane.

/// Particle type assets, their loader and format versioning.
pub mod asset;
/// Per-particle mutators.
pub mod behavior;
/// Descriptors that make behaviors, and shared attractor parameters.
pub mod descriptor;
/// Random distributions sampled when particles are generated.
pub mod distribution;
mod mesh;
/// The particle record.
pub mod particle;
/// Convenience re-exports for common particle types.
pub mod prelude;
/// Batch building, renderers and the canvas abstraction.
pub mod render;
/// Particle system components, the shared random source and registries.
pub mod runtime;
mod spawning;
/// Texture references for textured particle types.
pub mod textures;

use bevy::prelude::*;

use asset::ParticleTypeLoader;
use spawning::{
    cleanup_particle_entities, despawn_finished_particle_systems, render_particle_systems,
    setup_particle_systems, tick_particle_systems,
};

/// Plugin that simulates and draws [`ParticleSystem`]s.
///
/// Registers the [`ParticleType`] asset and its loader, inserts the shared
/// [`ParticleRng`] and adds the setup, tick and render systems.
#[derive(Debug, Default, Clone)]
pub struct ConfettiPlugin {
    /// Seed for [`ParticleRng`]. `None` seeds from the operating system.
    pub fixed_seed: Option<u64>,
}

impl Plugin for ConfettiPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<ParticleType>()
            .init_asset_loader::<ParticleTypeLoader>();

        app.insert_resource(ParticleRng::from_seed(self.fixed_seed));

        app.add_systems(Update, (setup_particle_systems, cleanup_particle_entities))
            .add_systems(
                FixedUpdate,
                (tick_particle_systems, despawn_finished_particle_systems).chain(),
            )
            .add_systems(PostUpdate, render_particle_systems);
    }
}

pub use asset::{ParticleType, ParticleTypeError, ParticleTypeLoaderError};
pub use descriptor::{LineAttractor, ParticleDescriptor, PointAttractor, Shared};
pub use mesh::MeshCanvas;
pub use render::{
    BlendMode, BlendScope, ParticleBatch, ParticleCanvas, ParticleRenderer, ParticleVertex,
};
pub use runtime::{ParticleRegistry, ParticleRng, ParticleSystem, ParticleSystemRuntime};
pub use spawning::ParticleCommandsExt;
