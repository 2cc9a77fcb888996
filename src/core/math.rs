// Math utilities and helper functions

use glam::{Quat, Vec3};
use rand::Rng;
use rapier3d::prelude::nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Sample a triangular distribution over `[min, max]` peaking at `mode`.
///
/// Used to emulate reaction times: most samples land near `mode`, the tails
/// thin out towards the bounds.
pub fn random_triangular<R: Rng>(rng: &mut R, min: f32, mode: f32, max: f32) -> f32 {
    debug_assert!(min <= mode && mode <= max, "triangular bounds out of order");
    let span = max - min;
    if span <= 0.0 {
        return min;
    }
    let u: f32 = rng.random();
    if u <= (mode - min) / span {
        min + (u * span * (mode - min)).sqrt()
    } else {
        max - ((1.0 - u) * span * (max - mode)).sqrt()
    }
}

/// Sample a uniform distribution over `[min, max]`
pub fn random_uniform<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

/// Horizontal (XZ plane) part of a vector
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Convert a physics vector into a glam vector
pub fn to_glam(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Convert a physics rotation into a glam quaternion
pub fn quat_to_glam(q: &UnitQuaternion<f32>) -> Quat {
    let c = q.quaternion().coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

/// Convert a glam quaternion into a physics rotation
pub fn quat_to_physics(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_triangular_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let sample = random_triangular(&mut rng, 0.3, 0.6, 1.2);
            assert!((0.3..=1.2).contains(&sample), "sample {sample} out of range");
        }
    }

    #[test]
    fn test_triangular_mean_near_expected() {
        // Mean of a triangular distribution is (min + mode + max) / 3
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let total: f32 = (0..n).map(|_| random_triangular(&mut rng, 0.8, 1.2, 2.0)).sum();
        let mean = total / n as f32;
        assert_relative_eq!(mean, (0.8 + 1.2 + 2.0) / 3.0, epsilon = 0.02);
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_triangular(&mut rng, 1.0, 1.0, 1.0), 1.0);
        assert_eq!(random_uniform(&mut rng, 2.0, 2.0), 2.0);
    }

    #[test]
    fn test_uniform_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let sample = random_uniform(&mut rng, 0.8, 1.5);
            assert!((0.8..=1.5).contains(&sample));
        }
    }

    #[test]
    fn test_quat_round_trip() {
        let q = Quat::from_rotation_y(1.2);
        let back = quat_to_glam(&quat_to_physics(q));
        assert_relative_eq!(back.x, q.x, epsilon = 1e-5);
        assert_relative_eq!(back.y, q.y, epsilon = 1e-5);
        assert_relative_eq!(back.w, q.w, epsilon = 1e-5);
    }

    #[test]
    fn test_horizontal_drops_y() {
        assert_eq!(horizontal(Vec3::new(1.0, 5.0, -2.0)), Vec3::new(1.0, 0.0, -2.0));
    }
}
