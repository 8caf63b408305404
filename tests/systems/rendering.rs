use super::helpers::*;

use bevy::prelude::*;
use bevy::render::alpha::AlphaMode;
use bevy_confetti::prelude::*;
use bevy_confetti::runtime::{ParticleMaterialHandle, ParticleMeshHandle};

fn mesh_vertex_count(app: &App, entity: Entity) -> usize {
    let handle = &app.world().get::<ParticleMeshHandle>(entity).unwrap().0;
    app.world()
        .resource::<Assets<Mesh>>()
        .get(handle)
        .map_or(0, Mesh::count_vertices)
}

fn material_alpha_mode(app: &App, entity: Entity) -> AlphaMode {
    let handle = &app.world().get::<ParticleMaterialHandle>(entity).unwrap().0;
    app.world()
        .resource::<Assets<StandardMaterial>>()
        .get(handle)
        .unwrap()
        .alpha_mode
}

#[test]
fn render_writes_batch_into_mesh() {
    let mut app = create_minimal_app();
    let kind = add_particle_type(&mut app, triangle_type(10));
    let mut system = ParticleSystem::new(kind, Vec2::ZERO);
    system.emit(5);
    let entity = spawn_system(&mut app, system);
    assert_eq!(mesh_vertex_count(&app, entity), 0);

    tick(&mut app, 1);
    render(&mut app);

    assert_eq!(mesh_vertex_count(&app, entity), 15);
}

#[test]
fn mesh_is_cleared_once_particles_die() {
    let mut app = create_minimal_app();
    let kind = add_particle_type(&mut app, triangle_type(2));
    let mut system = ParticleSystem::new(kind, Vec2::ZERO);
    system.emit(3);
    let entity = spawn_system(&mut app, system);

    tick(&mut app, 1);
    render(&mut app);
    assert_eq!(mesh_vertex_count(&app, entity), 9);

    tick(&mut app, 2);
    render(&mut app);
    assert_eq!(mesh_vertex_count(&app, entity), 0);
}

#[test]
fn blend_mode_maps_to_material() {
    let mut app = create_minimal_app();
    let kind = add_particle_type(
        &mut app,
        triangle_type(10).with_blend_mode(BlendMode::Additive),
    );
    let mut system = ParticleSystem::new(kind, Vec2::ZERO);
    system.emit(1);
    let entity = spawn_system(&mut app, system);
    assert_eq!(material_alpha_mode(&app, entity), AlphaMode::Blend);

    tick(&mut app, 1);
    render(&mut app);

    assert_eq!(material_alpha_mode(&app, entity), AlphaMode::Add);
}

#[test]
fn textured_material_uses_type_texture() {
    let mut app = create_minimal_app();
    let image = app
        .world_mut()
        .resource_mut::<Assets<Image>>()
        .add(Image::default());
    let kind = add_particle_type(
        &mut app,
        ParticleType::sprite(
            "Runtime sprite",
            image.clone(),
            Vec2::ONE,
            SpriteSheet::single(),
            LifetimeRange::fixed(10),
        )
        .unwrap(),
    );
    let mut system = ParticleSystem::new(kind, Vec2::ZERO);
    system.emit(2);
    let entity = spawn_system(&mut app, system);

    tick(&mut app, 1);
    render(&mut app);

    let handle = &app.world().get::<ParticleMaterialHandle>(entity).unwrap().0;
    let material = app
        .world()
        .resource::<Assets<StandardMaterial>>()
        .get(handle)
        .unwrap();
    assert_eq!(material.base_color_texture, Some(image));
    assert_eq!(mesh_vertex_count(&app, entity), 8);
}
