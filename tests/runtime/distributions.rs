use super::helpers::*;

use bevy::prelude::*;
use bevy_confetti::prelude::*;
use rand::distr::Distribution;

#[test]
fn range_samples_stay_in_bounds() {
    let range = ParticleRange::new(-2.0, 3.0);
    let mut rng = rng();
    for _ in 0..256 {
        let value = range.sample(&mut rng);
        assert!((-2.0..=3.0).contains(&value), "got {value}");
    }
}

#[test]
fn range_validation() {
    assert!(ParticleRange::try_new(0.0, 1.0).is_ok());
    assert_eq!(
        ParticleRange::try_new(1.0, 0.0),
        Err(DistributionError::InvertedRange { min: 1.0, max: 0.0 })
    );
    assert_eq!(
        ParticleRange::try_new(f32::NAN, 0.0),
        Err(DistributionError::NonFinite)
    );
}

#[test]
fn lifetime_samples_stay_in_bounds() {
    let lifetime = LifetimeRange::new(10, 12).unwrap();
    let mut rng = rng();
    for _ in 0..128 {
        let ticks = lifetime.sample(&mut rng);
        assert!((10..=12).contains(&ticks));
    }
}

#[test]
fn lifetime_validation() {
    assert_eq!(LifetimeRange::new(0, 5), Err(DistributionError::ZeroLifetime));
    assert_eq!(
        LifetimeRange::new(9, 3),
        Err(DistributionError::InvertedLifetime { min: 9, max: 3 })
    );
    assert_eq!(LifetimeRange::fixed(7).sample(&mut rng()), 7);
}

#[test]
fn polar_vectors_have_sampled_length() {
    let distribution = VectorDistribution::Polar {
        speed: ParticleRange::new(1.0, 2.0),
        angle: ParticleRange::new(0.0, 360.0),
    };
    let mut rng = rng();
    for _ in 0..64 {
        let length = distribution.sample(&mut rng).length();
        assert!((1.0 - 1e-5..=2.0 + 1e-5).contains(&length), "got {length}");
    }
}

#[test]
fn color_choice_picks_listed_colors() {
    let palette = vec![Srgba::RED, Srgba::GREEN, Srgba::BLUE];
    let distribution = ColorDistribution::Choice(palette.clone());
    let mut rng = rng();
    for _ in 0..32 {
        assert!(palette.contains(&distribution.sample(&mut rng)));
    }
}

#[test]
fn color_mix_stays_between_endpoints() {
    let distribution = ColorDistribution::Mix {
        from: Srgba::BLACK,
        to: Srgba::WHITE,
    };
    let mut rng = rng();
    for _ in 0..32 {
        let color = distribution.sample(&mut rng);
        assert!((0.0..=1.0).contains(&color.red));
        assert_eq!(color.red, color.green);
    }
}

#[test]
fn range_with_overflowing_span_is_rejected() {
    assert_eq!(
        ParticleRange::try_new(-f32::MAX, f32::MAX),
        Err(DistributionError::NonFinite)
    );

    let velocity = VectorDistribution::Polar {
        speed: ParticleRange::new(-f32::MAX, f32::MAX),
        angle: ParticleRange::constant(0.0),
    };
    assert_eq!(velocity.validate(), Err(DistributionError::NonFinite));
}

#[test]
fn color_validation_rejects_non_finite_channels() {
    let broken = Srgba::new(f32::NAN, 0.0, 0.0, 1.0);
    assert_eq!(
        ColorDistribution::Constant(broken).validate(),
        Err(DistributionError::NonFinite)
    );
    assert_eq!(
        ColorDistribution::Choice(vec![Srgba::RED, broken]).validate(),
        Err(DistributionError::NonFinite)
    );
    assert_eq!(
        ColorDistribution::Mix {
            from: Srgba::BLACK,
            to: Srgba::new(1.0, f32::INFINITY, 1.0, 1.0),
        }
        .validate(),
        Err(DistributionError::NonFinite)
    );
    assert_eq!(
        ColorDistribution::Choice(Vec::new()).validate(),
        Err(DistributionError::EmptyChoice)
    );
    assert!(ColorDistribution::Constant(Srgba::WHITE).validate().is_ok());
}
