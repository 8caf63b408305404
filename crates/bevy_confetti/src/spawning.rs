use bevy::prelude::*;

use crate::{
    asset::ParticleType,
    mesh::{MeshCanvas, empty_particle_mesh, particle_material},
    runtime::{
        ParticleMaterialHandle, ParticleMeshEntity, ParticleMeshHandle, ParticleRng,
        ParticleSystem, ParticleSystemRuntime,
    },
};

/// Bursts particles from [`Commands`] without access to the loaded asset.
pub trait ParticleCommandsExt {
    /// Spawns an auto-destroying [`ParticleSystem`] with `count` particles of
    /// `kind` at `location` and returns its entity.
    ///
    /// If `kind` is already loaded the particles are generated when the
    /// command is applied. Otherwise they are queued and generated on the
    /// first tick after the asset finishes loading.
    fn burst_particles(&mut self, kind: Handle<ParticleType>, location: Vec2, count: u32) -> Entity;
}

impl ParticleCommandsExt for Commands<'_, '_> {
    fn burst_particles(
        &mut self,
        kind: Handle<ParticleType>,
        location: Vec2,
        count: u32,
    ) -> Entity {
        let entity = self.spawn_empty().id();
        self.queue(move |world: &mut World| {
            let mut system = ParticleSystem::new(kind.clone(), location).with_auto_destroy(true);
            let generated = world.try_resource_scope(|world, mut rng: Mut<ParticleRng>| {
                let particle_type = world.resource::<Assets<ParticleType>>().get(&kind)?;
                system.spawn(particle_type, count, &mut rng.0);
                Some(particle_type.name.clone())
            });

            match generated.flatten() {
                Some(name) => debug!("burst {count} \"{name}\" particles at {location}"),
                None => {
                    system.emit(count);
                    debug!("deferred burst of {count} particles at {location} until its type loads");
                }
            }

            if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
                entity_mut.insert(system);
            }
        });
        entity
    }
}

/// Gives every new [`ParticleSystem`] a runtime, a mesh and a material, and
/// spawns the entity that draws it.
pub fn setup_particle_systems(
    mut commands: Commands,
    query: Query<
        (Entity, Has<ParticleSystemRuntime>),
        (With<ParticleSystem>, Without<ParticleMeshHandle>),
    >,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (system_entity, has_runtime) in query.iter() {
        let mesh_handle = meshes.add(empty_particle_mesh());
        let material_handle = materials.add(particle_material());

        commands.spawn((
            Mesh3d(mesh_handle.clone()),
            MeshMaterial3d(material_handle.clone()),
            Transform::default(),
            Visibility::default(),
            ParticleMeshEntity { system_entity },
        ));

        let mut system = commands.entity(system_entity);
        system.insert((
            ParticleMeshHandle(mesh_handle),
            ParticleMaterialHandle(material_handle),
        ));
        if !has_runtime {
            system.insert(ParticleSystemRuntime::default());
        }
    }
}

/// Advances every unpaused particle system whose type is loaded by one tick.
pub fn tick_particle_systems(
    types: Res<Assets<ParticleType>>,
    mut rng: ResMut<ParticleRng>,
    mut query: Query<(&mut ParticleSystem, Option<&mut ParticleSystemRuntime>)>,
) {
    for (mut system, runtime) in query.iter_mut() {
        if runtime.as_ref().is_some_and(|runtime| runtime.paused) {
            continue;
        }
        let Some(kind) = types.get(&system.kind) else {
            continue;
        };

        system.tick(kind, &mut rng.0);

        if let Some(mut runtime) = runtime {
            runtime.ticks += 1;
        }
    }
}

/// Despawns auto-destroying systems with nothing left to simulate.
pub fn despawn_finished_particle_systems(
    mut commands: Commands,
    query: Query<(Entity, &ParticleSystem)>,
) {
    for (entity, system) in query.iter() {
        if system.is_finished() {
            debug!("despawning finished particle system {entity}");
            commands.entity(entity).despawn();
        }
    }
}

/// Draws each particle system into its mesh with a single batch.
pub fn render_particle_systems(
    query: Query<(&ParticleSystem, &ParticleMeshHandle, &ParticleMaterialHandle)>,
    types: Res<Assets<ParticleType>>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (system, mesh_handle, material_handle) in query.iter() {
        let Some(kind) = types.get(&system.kind) else {
            continue;
        };

        let mut canvas = MeshCanvas::new();
        system.render(kind, &mut canvas);

        let already_empty = canvas.batch().is_none()
            && meshes
                .get(&mesh_handle.0)
                .is_some_and(|mesh| mesh.count_vertices() == 0);
        if !already_empty {
            if let Some(mut mesh) = meshes.get_mut(&mesh_handle.0) {
                canvas.write_mesh(&mut mesh);
            }
        }

        let Some((alpha_mode, texture)) = canvas.material_state(&asset_server) else {
            continue;
        };
        let stale = materials
            .get(&material_handle.0)
            .is_some_and(|material| {
                material.alpha_mode != alpha_mode || material.base_color_texture != texture
            });
        if stale {
            if let Some(material) = materials.get_mut(&material_handle.0) {
                material.alpha_mode = alpha_mode;
                material.base_color_texture = texture;
            }
        }
    }
}

/// Despawns the drawing entities of removed particle systems.
pub fn cleanup_particle_entities(
    mut commands: Commands,
    mut removed_systems: RemovedComponents<ParticleSystem>,
    mesh_entities: Query<(Entity, &ParticleMeshEntity)>,
) {
    for removed_system in removed_systems.read() {
        for (mesh_entity, link) in mesh_entities.iter() {
            if link.system_entity == removed_system {
                commands.entity(mesh_entity).despawn();
            }
        }
    }
}
