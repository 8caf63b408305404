pub use crate::ConfettiPlugin;

pub use crate::asset::{ParticleType, ParticleTypeError, ParticleTypeLoaderError};
pub use crate::behavior::ParticleBehavior;
pub use crate::descriptor::{
    DescriptorError, LineAttractor, ParticleDescriptor, PointAttractor, Shared,
};
pub use crate::distribution::{
    ColorDistribution, DistributionError, LifetimeRange, Range as ParticleRange,
    VectorDistribution,
};
pub use crate::mesh::MeshCanvas;
pub use crate::particle::Particle;
pub use crate::render::{
    BlendMode, BlendScope, ColoredParticleRenderer, ParticleBatch, ParticleCanvas,
    ParticleRenderer, ParticleVertex, SpriteSheet, TexturedParticleRenderer,
};
pub use crate::runtime::{
    ParticleRegistry, ParticleRng, ParticleSystem, ParticleSystemRuntime,
};
pub use crate::spawning::ParticleCommandsExt;
pub use crate::textures::TextureRef;
