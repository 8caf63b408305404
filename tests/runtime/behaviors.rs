use bevy::prelude::*;
use bevy_confetti::prelude::*;

fn particle_with(lifetime: u32, behavior: ParticleBehavior) -> Particle {
    let mut particle = Particle::new(Vec2::ZERO, lifetime);
    particle.attach_behavior(behavior);
    particle
}

#[test]
fn fadeout_alpha_follows_age() {
    let mut particle = particle_with(4, ParticleBehavior::Fadeout);
    assert_eq!(particle.color.alpha, 1.0);

    let mut alphas = Vec::new();
    while particle.update() {
        alphas.push(particle.color.alpha);
    }
    assert_eq!(alphas, vec![0.75, 0.5, 0.25]);
}

#[test]
fn fadeout_at_half_life_is_half_transparent() {
    let mut particle = particle_with(100, ParticleBehavior::Fadeout);
    for _ in 0..50 {
        particle.update();
    }
    let byte_alpha = (particle.color.alpha * 255.0).round() as u8;
    assert!((127..=128).contains(&byte_alpha), "got {byte_alpha}");
}

#[test]
fn linear_motion_sets_velocity_once() {
    let mut particle = particle_with(
        20,
        ParticleBehavior::LinearMotion {
            velocity: Vec2::new(0.5, 1.0),
        },
    );
    assert_eq!(particle.velocity, Vec2::new(0.5, 1.0));
    for _ in 0..10 {
        particle.update();
    }
    assert_eq!(particle.velocity, Vec2::new(0.5, 1.0));
    assert_eq!(particle.location, Vec2::new(5.0, 10.0));
}

#[test]
fn point_attraction_pulls_toward_target() {
    let attractor = Shared::new(PointAttractor {
        location: Vec2::new(10.0, 0.0),
        strength: 0.5,
    });
    let mut particle = particle_with(10, ParticleBehavior::PointAttraction(attractor));
    particle.update();
    assert_eq!(particle.velocity, Vec2::new(0.5, 0.0));
}

#[test]
fn negative_point_attraction_repels() {
    let attractor = Shared::new(PointAttractor {
        location: Vec2::new(0.0, 5.0),
        strength: -1.0,
    });
    let mut particle = particle_with(10, ParticleBehavior::PointAttraction(attractor));
    particle.update();
    assert_eq!(particle.velocity, Vec2::new(0.0, -1.0));
}

#[test]
fn point_attraction_at_target_is_skipped() {
    let attractor = Shared::new(PointAttractor {
        location: Vec2::ZERO,
        strength: 1.0,
    });
    let mut particle = particle_with(10, ParticleBehavior::PointAttraction(attractor));
    particle.update();
    assert_eq!(particle.velocity, Vec2::ZERO);
    assert!(particle.velocity.is_finite());
}

#[test]
fn line_attraction_pulls_toward_line() {
    let attractor = Shared::new(LineAttractor {
        origin: Vec2::ZERO,
        direction: Vec2::new(3.0, 0.0),
        strength: 0.1,
    });
    for side in [1.0, -1.0] {
        let mut particle = Particle::new(Vec2::new(7.0, 4.0 * side), 10);
        particle.attach_behavior(ParticleBehavior::LineAttraction(attractor.clone()));
        particle.update();
        assert!(particle.velocity.x.abs() < 1e-6);
        assert!((particle.velocity.y + 0.4 * side).abs() < 1e-6, "got {}", particle.velocity);
    }
}

#[test]
fn acceleration_adds_every_tick() {
    let mut particle = particle_with(
        10,
        ParticleBehavior::Acceleration {
            acceleration: Vec2::new(0.0, -1.0),
            friction: 0.0,
        },
    );
    for _ in 0..3 {
        particle.update();
    }
    assert_eq!(particle.velocity, Vec2::new(0.0, -3.0));
    assert_eq!(particle.location, Vec2::new(0.0, -3.0));
}

#[test]
fn friction_brings_particle_to_rest() {
    let mut particle = particle_with(
        100,
        ParticleBehavior::Acceleration {
            acceleration: Vec2::ZERO,
            friction: 0.3,
        },
    );
    particle.velocity = Vec2::new(1.0, 0.0);

    particle.update();
    assert!((particle.velocity.x - 0.7).abs() < 1e-6);
    for _ in 0..3 {
        particle.update();
    }
    assert_eq!(particle.velocity, Vec2::ZERO);
}

#[test]
fn color_is_set_at_spawn() {
    let red = Srgba::new(1.0, 0.0, 0.0, 1.0);
    let particle = particle_with(10, ParticleBehavior::Color { color: red });
    assert_eq!(particle.color, red);
}

#[test]
fn transforms_compose_in_declared_order() {
    let scale = Mat2::from_diagonal(Vec2::new(2.0, 1.0));
    let rotate = Mat2::from_angle(std::f32::consts::FRAC_PI_2);

    let mut particle = Particle::new(Vec2::ZERO, 10);
    particle.attach_behavior(ParticleBehavior::Transformation {
        initial: scale,
        per_tick: None,
    });
    particle.attach_behavior(ParticleBehavior::Transformation {
        initial: rotate,
        per_tick: None,
    });

    assert!(particle.transform.abs_diff_eq(rotate * scale, 1e-6));
    assert!(!particle.transform.abs_diff_eq(scale * rotate, 1e-6));
}

#[test]
fn per_tick_deltas_compound() {
    let mut particle = particle_with(
        10,
        ParticleBehavior::Scale {
            initial: 1.0,
            growth: Some(2.0),
        },
    );
    for _ in 0..3 {
        particle.update();
    }
    assert!(particle.transform.abs_diff_eq(Mat2::from_diagonal(Vec2::splat(8.0)), 1e-6));
}

#[test]
fn spin_accumulates_rotation() {
    let quarter = std::f32::consts::FRAC_PI_4;
    let mut particle = particle_with(
        10,
        ParticleBehavior::Rotation {
            initial: 0.0,
            spin: Some(quarter),
        },
    );
    particle.update();
    particle.update();
    assert!(particle.transform.abs_diff_eq(Mat2::from_angle(2.0 * quarter), 1e-6));
}
