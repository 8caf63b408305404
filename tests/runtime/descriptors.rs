use super::helpers::*;

use bevy::prelude::*;
use bevy_confetti::prelude::*;

#[test]
fn each_behavior_samples_independently() {
    let descriptor = ParticleDescriptor::linear_motion(VectorDistribution::Rect {
        min: Vec2::splat(-10.0),
        max: Vec2::splat(10.0),
    })
    .unwrap();
    let mut rng = rng();

    let velocities: Vec<Vec2> = (0..16)
        .map(|_| match descriptor.make_behavior(&mut rng) {
            ParticleBehavior::LinearMotion { velocity } => velocity,
            other => panic!("unexpected behavior {other:?}"),
        })
        .collect();

    assert!(
        velocities
            .iter()
            .all(|v| v.cmpge(Vec2::splat(-10.0)).all() && v.cmple(Vec2::splat(10.0)).all())
    );
    assert!(velocities.windows(2).any(|pair| pair[0] != pair[1]));
}

#[test]
fn generated_particles_do_not_share_state() {
    let particle_type = triangle_type(30)
        .with_descriptor(
            ParticleDescriptor::linear_motion(VectorDistribution::Constant(Vec2::X)).unwrap(),
        )
        .unwrap();
    let mut rng = rng();

    let mut first = particle_type.generate(Vec2::ZERO, &mut rng);
    let second = particle_type.generate(Vec2::ZERO, &mut rng);

    first.velocity = Vec2::new(5.0, 5.0);
    first.update();
    assert_eq!(second.velocity, Vec2::X);
    assert_eq!(second.location, Vec2::ZERO);
}

#[test]
fn moving_attractor_redirects_live_particles() {
    let attractor = Shared::new(PointAttractor {
        location: Vec2::new(10.0, 0.0),
        strength: 1.0,
    });
    let particle_type = triangle_type(30)
        .with_descriptor(ParticleDescriptor::point_attraction(&attractor).unwrap())
        .unwrap();
    let mut rng = rng();
    let mut particle = particle_type.generate(Vec2::ZERO, &mut rng);

    particle.update();
    assert_eq!(particle.velocity, Vec2::X);

    attractor.set_location(Vec2::new(1.0, -100.0));
    particle.update();
    assert!(particle.velocity.y < 0.0, "particle should now be pulled down");
}

#[test]
fn line_attractor_strength_change_is_shared() {
    let attractor = Shared::new(LineAttractor {
        strength: 0.0,
        ..default()
    });
    let descriptor = ParticleDescriptor::line_attraction(&attractor).unwrap();
    let mut rng = rng();

    let mut particle = Particle::new(Vec2::new(0.0, 2.0), 10);
    particle.attach_behavior(descriptor.make_behavior(&mut rng));
    particle.update();
    assert_eq!(particle.velocity, Vec2::ZERO);

    attractor.set_strength(0.5);
    particle.update();
    assert_eq!(particle.velocity, Vec2::new(0.0, -1.0));
}

#[test]
fn rotation_is_given_in_degrees() {
    let descriptor = ParticleDescriptor::rotation(ParticleRange::constant(90.0), None).unwrap();
    let mut rng = rng();
    let mut particle = Particle::new(Vec2::ZERO, 10);
    particle.attach_behavior(descriptor.make_behavior(&mut rng));

    let rotated = particle.transform * Vec2::X;
    assert!(rotated.abs_diff_eq(Vec2::Y, 1e-6), "got {rotated}");
}

#[test]
fn invalid_descriptors_are_rejected() {
    assert_eq!(
        ParticleDescriptor::acceleration(Vec2::ZERO, -1.0).unwrap_err(),
        DescriptorError::NegativeFriction(-1.0)
    );
    assert_eq!(
        ParticleDescriptor::color(ColorDistribution::Choice(vec![])).unwrap_err(),
        DescriptorError::Distribution(DistributionError::EmptyChoice)
    );
    assert_eq!(
        ParticleDescriptor::scale(ParticleRange::new(2.0, 1.0), None).unwrap_err(),
        DescriptorError::Distribution(DistributionError::InvertedRange { min: 2.0, max: 1.0 })
    );
    assert!(matches!(
        ParticleDescriptor::acceleration(Vec2::new(f32::NAN, 0.0), 0.0),
        Err(DescriptorError::NonFinite(_))
    ));

    let flat = Shared::new(LineAttractor {
        direction: Vec2::ZERO,
        ..default()
    });
    assert_eq!(
        ParticleDescriptor::line_attraction(&flat).unwrap_err(),
        DescriptorError::ZeroDirection
    );
}

#[test]
fn shared_clone_points_at_same_block() {
    let attractor = Shared::new(PointAttractor::default());
    let clone = attractor.clone();
    assert!(attractor.ptr_eq(&clone));

    clone.set_strength(3.0);
    assert_eq!(attractor.strength(), 3.0);
}
