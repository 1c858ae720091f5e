use crate::math::Vec3;

/// Axis-aligned bounding box over point positions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    /// Bounds of all finite points, or `None` when there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut out: Option<Self> = None;
        for p in points {
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                continue;
            }
            let a = [p.x, p.y, p.z];
            out = Some(match out {
                None => Aabb3::new(a, a),
                Some(mut b) => {
                    for axis in 0..3 {
                        b.min[axis] = b.min[axis].min(a[axis]);
                        b.max[axis] = b.max[axis].max(a[axis]);
                    }
                    b
                }
            });
        }
        out
    }

    pub fn extent(&self) -> Vec3 {
        Vec3::new(
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        )
    }
}
