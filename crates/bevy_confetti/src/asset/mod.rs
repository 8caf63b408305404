/// Asset format version tracking and compatibility validation.
pub mod versioning;

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    prelude::*,
};
use rand::{Rng, distr::Distribution};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::{DescriptorError, ParticleDescriptor};
use crate::distribution::{DistributionError, LifetimeRange};
use crate::particle::Particle;
use crate::render::{
    BlendMode, BlendScope, ColoredParticleRenderer, ParticleCanvas, ParticleRenderer, SpriteSheet,
    TexturedParticleRenderer,
};
use crate::runtime::{ParticleRegistry, ParticleSystem};
use crate::textures::TextureRef;
use versioning::{VersionStatus, current_format_version};

/// Errors raised when a [`ParticleType`] or one of its parts is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParticleTypeError {
    /// A polygon template needs at least a triangle.
    #[error("polygon renderer needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    /// A polygon template vertex is NaN or infinite.
    #[error("polygon vertex {0} is not finite")]
    NonFiniteVertex(usize),
    /// A sprite quad must have a positive, finite size.
    #[error("sprite size must be positive and finite, got {0}")]
    InvalidSpriteSize(Vec2),
    /// The sprite sheet layout cannot hold its frames.
    #[error("invalid sprite sheet layout: {0:?}")]
    InvalidSpriteSheet(SpriteSheet),
    /// The lifetime distribution is invalid.
    #[error("invalid lifetime: {0}")]
    Lifetime(#[from] DistributionError),
    /// One of the descriptors is invalid.
    #[error("descriptor {index} is invalid: {source}")]
    Descriptor {
        /// Position of the descriptor in the type's list.
        index: usize,
        /// What is wrong with it.
        #[source]
        source: DescriptorError,
    },
}

/// Asset loader for [`ParticleType`] files in RON format.
#[derive(Default, TypePath)]
pub struct ParticleTypeLoader;

/// Errors that can occur when loading a [`ParticleType`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ParticleTypeLoaderError {
    /// An I/O error occurred while reading the asset file.
    #[error("Could not load asset: {0}")]
    Io(#[from] std::io::Error),
    /// The asset file contained invalid RON syntax.
    #[error("Could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// The asset parsed but describes an invalid particle type.
    #[error("Invalid particle type: {0}")]
    Invalid(#[from] ParticleTypeError),
    /// The asset file has an unknown format version, likely from a newer release.
    #[error("Unknown confetti_version. You may need a newer version of bevy_confetti.")]
    UnknownVersion,
    /// The asset file predates a breaking format revision.
    #[error(
        "Asset version \"{found}\" is incompatible with current version \"{current}\" \
         ({breaking_change} since {breaking_version}). Manual migration is required."
    )]
    IncompatibleVersion {
        /// The version found in the asset file.
        found: String,
        /// The current format version.
        current: String,
        /// The first breaking revision the file predates.
        breaking_version: String,
        /// What that revision changed.
        breaking_change: String,
    },
}

impl AssetLoader for ParticleTypeLoader {
    type Asset = ParticleType;
    type Settings = ();
    type Error = ParticleTypeLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let mut particle_type = ron::de::from_bytes::<ParticleType>(&bytes)?;

        match particle_type.try_upgrade_version() {
            VersionStatus::Current => {}
            VersionStatus::Outdated { found, current } => {
                let path = load_context.path();
                warn!(
                    "{path:?}: particle type uses confetti_version \"{found}\", \
                     upgraded to \"{current}\""
                );
            }
            VersionStatus::Incompatible {
                found,
                current,
                blocked_by,
            } => {
                return Err(ParticleTypeLoaderError::IncompatibleVersion {
                    found,
                    current: current.to_string(),
                    breaking_version: blocked_by.version.to_string(),
                    breaking_change: blocked_by.change.to_string(),
                });
            }
            VersionStatus::Unknown => {
                return Err(ParticleTypeLoaderError::UnknownVersion);
            }
        }

        particle_type.prepare()?;
        Ok(particle_type)
    }

    fn extensions(&self) -> &[&str] {
        &["confetti.ron", "ron"]
    }
}

/// A reusable particle template.
///
/// A particle type combines a lifetime distribution, an ordered list of
/// [`ParticleDescriptor`]s, a renderer and an optional blend mode. It is a
/// stateless factory: [`generate`](Self::generate) makes fully initialized
/// particles and [`burst`](Self::burst) makes whole particle systems.
///
/// Types are usually loaded from RON files, but can also be built in code:
///
/// ```
/// use bevy::prelude::*;
/// use bevy_confetti::prelude::*;
///
/// # fn build() -> Result<ParticleType, ParticleTypeError> {
/// let sparks = ParticleType::polygon(
///     "Sparks",
///     vec![Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(0.0, 1.0)],
///     LifetimeRange::new(30, 60)?,
/// )?
/// .with_blend_mode(BlendMode::Additive)
/// .with_descriptor(ParticleDescriptor::fadeout())?;
/// # Ok(sparks)
/// # }
/// ```
#[derive(Asset, TypePath, Debug, Serialize, Deserialize)]
pub struct ParticleType {
    confetti_version: String,
    /// Display name for this particle type.
    pub name: String,
    /// How many ticks each particle lives, sampled once per particle.
    pub lifetime: LifetimeRange,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    descriptors: Vec<ParticleDescriptor>,
    renderer: ParticleRenderer,
    /// Blend mode bound while this type renders. `None` draws with whatever
    /// mode the canvas already has bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<BlendMode>,
}

impl ParticleType {
    /// Creates a particle type with the current format version.
    pub fn new(
        name: impl Into<String>,
        renderer: ParticleRenderer,
        lifetime: LifetimeRange,
    ) -> Result<Self, ParticleTypeError> {
        let mut particle_type = Self {
            confetti_version: current_format_version().to_string(),
            name: name.into(),
            lifetime,
            descriptors: Vec::new(),
            renderer,
            blend_mode: None,
        };
        particle_type.prepare()?;
        Ok(particle_type)
    }

    /// A type whose particles are flat-colored polygons.
    pub fn polygon(
        name: impl Into<String>,
        vertices: Vec<Vec2>,
        lifetime: LifetimeRange,
    ) -> Result<Self, ParticleTypeError> {
        let renderer = ColoredParticleRenderer::new(vertices)?;
        Self::new(name, ParticleRenderer::Colored(renderer), lifetime)
    }

    /// A type whose particles are textured quads.
    pub fn sprite(
        name: impl Into<String>,
        texture: impl Into<TextureRef>,
        size: Vec2,
        sheet: SpriteSheet,
        lifetime: LifetimeRange,
    ) -> Result<Self, ParticleTypeError> {
        let renderer = TexturedParticleRenderer::new(texture.into(), size, sheet)?;
        Self::new(name, ParticleRenderer::Textured(renderer), lifetime)
    }

    /// Draws this type with `mode` instead of the canvas's current blend mode.
    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = Some(mode);
        self
    }

    /// Builder form of [`add_descriptor`](Self::add_descriptor).
    pub fn with_descriptor(
        mut self,
        descriptor: ParticleDescriptor,
    ) -> Result<Self, ParticleTypeError> {
        self.add_descriptor(descriptor)?;
        Ok(self)
    }

    /// Appends a descriptor. Descriptors are applied to new particles in the
    /// order they were added.
    pub fn add_descriptor(
        &mut self,
        descriptor: ParticleDescriptor,
    ) -> Result<&mut Self, ParticleTypeError> {
        descriptor
            .validate()
            .map_err(|source| ParticleTypeError::Descriptor {
                index: self.descriptors.len(),
                source,
            })?;
        self.descriptors.push(descriptor);
        Ok(self)
    }

    /// Appends every descriptor in order, stopping at the first invalid one.
    pub fn add_descriptors(
        &mut self,
        descriptors: impl IntoIterator<Item = ParticleDescriptor>,
    ) -> Result<&mut Self, ParticleTypeError> {
        for descriptor in descriptors {
            self.add_descriptor(descriptor)?;
        }
        Ok(self)
    }

    /// Format version this type was written with, or upgraded to on load.
    pub fn confetti_version(&self) -> &str {
        &self.confetti_version
    }

    /// Descriptors in application order.
    pub fn descriptors(&self) -> &[ParticleDescriptor] {
        &self.descriptors
    }

    /// How particles of this type are drawn.
    pub fn renderer(&self) -> &ParticleRenderer {
        &self.renderer
    }

    /// Checks the lifetime, every descriptor and the renderer.
    pub fn validate(&self) -> Result<(), ParticleTypeError> {
        self.lifetime.validate()?;
        for (index, descriptor) in self.descriptors.iter().enumerate() {
            descriptor
                .validate()
                .map_err(|source| ParticleTypeError::Descriptor { index, source })?;
        }
        match &self.renderer {
            ParticleRenderer::Colored(renderer) => renderer.validate(),
            ParticleRenderer::Textured(renderer) => renderer.validate(),
        }
    }

    /// Validates the type and rebuilds render data that is not serialized.
    ///
    /// Called by the constructors and the asset loader.
    pub fn prepare(&mut self) -> Result<(), ParticleTypeError> {
        self.validate()?;
        if let ParticleRenderer::Colored(renderer) = &mut self.renderer {
            renderer.prepare()?;
        }
        Ok(())
    }

    /// Validates this type's `confetti_version` against the current format version.
    ///
    /// If the version is outdated but compatible, it is automatically upgraded.
    /// Returns the original [`VersionStatus`] so the caller can react accordingly.
    pub fn try_upgrade_version(&mut self) -> VersionStatus {
        let status = versioning::validate_version(&self.confetti_version);
        if matches!(status, VersionStatus::Outdated { .. }) {
            self.confetti_version = current_format_version().to_string();
        }
        status
    }

    /// Makes one particle at `location`.
    ///
    /// The lifetime is sampled once, then every descriptor in order makes a
    /// behavior that is attached (and initialized) immediately, so later
    /// descriptors see the state left by earlier ones.
    pub fn generate<R: Rng + ?Sized>(&self, location: Vec2, rng: &mut R) -> Particle {
        let mut particle = Particle::new(location, self.lifetime.sample(rng));
        for descriptor in &self.descriptors {
            particle.attach_behavior(descriptor.make_behavior(rng));
        }
        particle
    }

    /// Makes an auto-destroying particle system holding `count` new particles
    /// at `location`.
    ///
    /// `kind` must be the handle this type is stored under; the system keeps
    /// it to find its type again every frame.
    pub fn burst<R: Rng + ?Sized>(
        &self,
        kind: Handle<ParticleType>,
        location: Vec2,
        count: u32,
        rng: &mut R,
    ) -> ParticleSystem {
        let mut system = ParticleSystem::new(kind, location).with_auto_destroy(true);
        system.spawn(self, count, rng);
        system
    }

    /// Like [`burst`](Self::burst), then hands the system to `registry` for
    /// per-frame ticking.
    pub fn burst_into<R: Rng + ?Sized, G: ParticleRegistry + ?Sized>(
        &self,
        kind: Handle<ParticleType>,
        location: Vec2,
        count: u32,
        rng: &mut R,
        registry: &mut G,
    ) -> G::Id {
        registry.register(self.burst(kind, location, count, rng))
    }

    /// Draws `particles` as one batch.
    ///
    /// When [`blend_mode`](Self::blend_mode) is set it is bound for the
    /// duration of the call and the canvas' previous mode is restored on
    /// every exit path.
    pub fn render<C: ParticleCanvas + ?Sized>(&self, particles: &[Particle], canvas: &mut C) {
        match self.blend_mode {
            Some(mode) => {
                let mut scope = BlendScope::new(canvas, mode);
                self.renderer.render(particles, &mut *scope);
            }
            None => self.renderer.render(particles, canvas),
        }
    }
}
