use glam::Vec3;

use super::aabb::Aabb;

/// Distance along `dir` to the first intersection with `bounds`, if any.
///
/// Slab method with epsilon-clamped inverse direction so axis-parallel rays
/// do not divide by zero. A ray starting inside the box reports the exit
/// distance.
pub fn intersect_aabb(origin: Vec3, dir: Vec3, bounds: &Aabb) -> Option<f32> {
    const EPSILON: f32 = 1e-8;

    let inv_dir = Vec3::new(
        if dir.x.abs() < EPSILON { 1.0 / EPSILON.copysign(dir.x) } else { 1.0 / dir.x },
        if dir.y.abs() < EPSILON { 1.0 / EPSILON.copysign(dir.y) } else { 1.0 / dir.y },
        if dir.z.abs() < EPSILON { 1.0 / EPSILON.copysign(dir.z) } else { 1.0 / dir.z },
    );

    let t_min = (bounds.min - origin) * inv_dir;
    let t_max = (bounds.max - origin) * inv_dir;

    let t1 = t_min.min(t_max);
    let t2 = t_min.max(t_max);

    let t_near = t1.x.max(t1.y).max(t1.z);
    let t_far = t2.x.min(t2.y).min(t2.z);

    if t_near > t_far || t_far < 0.0 {
        return None;
    }

    if t_near < 0.0 {
        (t_far > 1e-3).then_some(t_far)
    } else {
        Some(t_near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_from_outside_reports_entry_distance() {
        let bounds = Aabb::new(Vec3::new(5.0, -1.0, -1.0), Vec3::new(10.0, 1.0, 1.0));
        let t = intersect_aabb(Vec3::ZERO, Vec3::X, &bounds).expect("ray should hit");
        assert!((t - 5.0).abs() < 0.01);
    }

    #[test]
    fn miss_is_none() {
        let bounds = Aabb::new(Vec3::new(5.0, 2.0, 2.0), Vec3::new(10.0, 3.0, 3.0));
        assert!(intersect_aabb(Vec3::ZERO, Vec3::X, &bounds).is_none());
    }

    #[test]
    fn ray_starting_inside_reports_exit() {
        let bounds = Aabb::new(Vec3::new(0.0, -1.0, -1.0), Vec3::new(10.0, 1.0, 1.0));
        let t = intersect_aabb(Vec3::new(5.0, 0.0, 0.0), Vec3::X, &bounds).expect("exit hit");
        assert!(t > 0.0);
    }

    #[test]
    fn ray_pointing_away_is_none() {
        let bounds = Aabb::new(Vec3::new(5.0, -1.0, -1.0), Vec3::new(10.0, 1.0, 1.0));
        assert!(intersect_aabb(Vec3::ZERO, Vec3::NEG_X, &bounds).is_none());
    }

    #[test]
    fn axis_parallel_ray_does_not_divide_by_zero() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 6.0));
        let t = intersect_aabb(Vec3::ZERO, Vec3::Z, &bounds).expect("straight-on hit");
        assert!((t - 5.0).abs() < 0.01);
    }
}
