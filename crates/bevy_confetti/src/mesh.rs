use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
    render::alpha::AlphaMode,
};

use crate::render::{BlendMode, ParticleBatch, ParticleCanvas};

/// A [`ParticleCanvas`] that collects one frame's batch for a particle
/// system and writes it into that system's [`Mesh`] and [`StandardMaterial`].
///
/// The blend mode active when the batch is submitted becomes the material's
/// [`AlphaMode`].
#[derive(Debug, Default)]
pub struct MeshCanvas {
    blend_mode: BlendMode,
    submitted: Option<(ParticleBatch, BlendMode)>,
}

impl MeshCanvas {
    /// An empty canvas with the default blend mode bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// The batch submitted this frame, if any.
    pub fn batch(&self) -> Option<&ParticleBatch> {
        self.submitted.as_ref().map(|(batch, _)| batch)
    }

    /// The blend mode the batch was submitted with.
    pub fn submitted_blend_mode(&self) -> Option<BlendMode> {
        self.submitted.as_ref().map(|(_, mode)| *mode)
    }

    /// Replaces the mesh geometry with the submitted batch, or empties it
    /// when nothing was submitted.
    pub fn write_mesh(&self, mesh: &mut Mesh) {
        match self.batch() {
            Some(batch) => write_particle_mesh(mesh, batch),
            None => write_particle_mesh(mesh, &ParticleBatch::default()),
        }
    }

    /// The material settings the submitted batch needs, or `None` when
    /// nothing was submitted and the material can stay as it is.
    pub fn material_state(
        &self,
        asset_server: &AssetServer,
    ) -> Option<(AlphaMode, Option<Handle<Image>>)> {
        let (batch, mode) = self.submitted.as_ref()?;
        let texture = batch.texture.as_ref().map(|texture| texture.load(asset_server));
        Some(((*mode).into(), texture))
    }
}

impl ParticleCanvas for MeshCanvas {
    fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    fn submit(&mut self, batch: ParticleBatch) {
        if self.submitted.is_some() {
            warn!("particle mesh canvas received more than one batch this frame, keeping the last one");
        }
        self.submitted = Some((batch, self.blend_mode));
    }
}

/// An empty mesh ready to receive particle batches.
pub(crate) fn empty_particle_mesh() -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    write_particle_mesh(&mut mesh, &ParticleBatch::default());
    mesh
}

/// Unlit, double-sided material that takes its color from the mesh vertices.
pub(crate) fn particle_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE,
        alpha_mode: BlendMode::default().into(),
        unlit: true,
        cull_mode: None,
        ..default()
    }
}

// particles live on the XY plane, facing +Z
fn write_particle_mesh(mesh: &mut Mesh, batch: &ParticleBatch) {
    let count = batch.vertices.len();
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(count);
    let mut colors: Vec<[f32; 4]> = Vec::with_capacity(count);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(count);

    for vertex in &batch.vertices {
        positions.push([vertex.position[0], vertex.position[1], 0.0]);
        colors.push(vertex.color);
        uvs.push(vertex.uv);
    }

    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, vec![[0.0f32, 0.0, 1.0]; count]);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(batch.indices.clone()));
}
