//! Orientation helpers on top of glam

use glam::{Mat3, Quat, Vec3};

/// Squared length below which a direction is treated as absent
pub const MIN_DIRECTION_SQ: f32 = 1e-8;

/// Rotation whose +Z points along `forward` and whose +Y leans toward `up`.
///
/// Falls back to the shortest arc from +Z when `up` is parallel to `forward`.
/// Returns `None` for a degenerate forward vector.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let z = forward.try_normalize()?;
    let Some(x) = up.cross(z).try_normalize() else {
        return Some(Quat::from_rotation_arc(Vec3::Z, z));
    };
    let y = z.cross(x);
    Some(Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize())
}

/// Shortest rotation taking direction `from` onto direction `to`
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Option<Quat> {
    let from = from.try_normalize()?;
    let to = to.try_normalize()?;
    Some(Quat::from_rotation_arc(from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, 1e-5), "{:?} != {:?}", a, b);
    }

    fn assert_quat_eq(a: Quat, b: Quat) {
        assert!(a.abs_diff_eq(b, 1e-5) || a.abs_diff_eq(-b, 1e-5), "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_look_rotation_identity() {
        let q = look_rotation(Vec3::Z, Vec3::Y).unwrap();
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_look_rotation_axes() {
        let forward = Vec3::X;
        let q = look_rotation(forward, Vec3::Y).unwrap();
        assert_vec_eq(q * Vec3::Z, forward);
        assert_vec_eq(q * Vec3::Y, Vec3::Y);
        assert_quat_eq(q, Quat::from_rotation_y(FRAC_PI_2));
    }

    #[test]
    fn test_look_rotation_parallel_up() {
        let q = look_rotation(Vec3::Y, Vec3::Y).unwrap();
        assert_vec_eq(q * Vec3::Z, Vec3::Y);
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_from_to_rotation() {
        let q = from_to_rotation(Vec3::X, Vec3::new(0.0, -2.0, 0.0)).unwrap();
        assert_vec_eq(q * Vec3::X, Vec3::NEG_Y);

        let opposite = from_to_rotation(Vec3::X, Vec3::NEG_X).unwrap();
        assert_vec_eq(opposite * Vec3::X, Vec3::NEG_X);
    }

    fn direction() -> impl Strategy<Value = Vec3> {
        (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z))
            .prop_filter("non-degenerate", |v| v.length_squared() > 0.01)
    }

    proptest! {
        #[test]
        fn prop_from_to_lands_on_target(from in direction(), to in direction()) {
            let q = from_to_rotation(from, to).unwrap();
            prop_assert!((q * from.normalize()).abs_diff_eq(to.normalize(), 1e-3));
        }

        #[test]
        fn prop_look_rotation_forward(forward in direction(), up in direction()) {
            prop_assume!(forward.normalize().cross(up.normalize()).length() > 0.05);
            let q = look_rotation(forward, up).unwrap();
            prop_assert!((q * Vec3::Z).abs_diff_eq(forward.normalize(), 1e-3));
            prop_assert!((q.length() - 1.0).abs() < 1e-4);
        }
    }
}
