use foundation::bounds::Aabb3;
use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

/// Points per leaf before a node is split.
const LEAF_SIZE: usize = 8;

/// Bounding volume hierarchy over point positions.
///
/// Ordering contract:
/// - `query_ray` returns point indices in ascending order.
///
/// Leaves own contiguous runs of `order`, a permutation of the point
/// indices, so the tree stores no per-point copies.
#[derive(Debug, Clone, Default)]
pub struct PointBvh {
    positions: Vec<Vec3>,
    order: Vec<u32>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

#[derive(Debug, Clone)]
struct Node {
    bounds: Aabb3,
    span: Span,
}

#[derive(Debug, Copy, Clone)]
enum Span {
    Leaf { start: usize, end: usize },
    Split { left: usize, right: usize },
}

impl PointBvh {
    /// Builds over all finite positions; non-finite points are never returned.
    pub fn build(positions: &[Vec3]) -> Self {
        let mut order: Vec<u32> = positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
            .map(|(i, _)| i as u32)
            .collect();
        let mut nodes = Vec::new();
        let len = order.len();
        let root = (len > 0).then(|| subdivide(&mut nodes, &mut order, positions, 0, len));
        Self {
            positions: positions.to_vec(),
            order,
            nodes,
            root,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Indices of points within `radius` of the ray segment `[t_min, t_max]`.
    ///
    /// `t` is measured along the normalized `dir`.
    pub fn query_ray(&self, origin: Vec3, dir: Vec3, radius: f64, t_min: f64, t_max: f64) -> Vec<u32> {
        let (Some(root), Some(dir)) = (self.root, dir.normalize()) else {
            return Vec::new();
        };
        let radius_sq = radius * radius;
        let mut hits = Vec::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !slab_hit(origin, dir, &node.bounds, radius, t_min, t_max) {
                continue;
            }
            match node.span {
                Span::Leaf { start, end } => {
                    hits.extend(self.order[start..end].iter().copied().filter(|&i| {
                        let p = self.positions[i as usize];
                        let t = (p - origin).dot(dir).clamp(t_min, t_max);
                        (p - (origin + dir.scale(t))).length_squared() <= radius_sq
                    }));
                }
                Span::Split { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        hits.sort_unstable();
        hits
    }
}

fn subdivide(nodes: &mut Vec<Node>, order: &mut [u32], positions: &[Vec3], start: usize, end: usize) -> usize {
    let run = &mut order[start..end];
    let bounds = Aabb3::from_points(run.iter().map(|&i| positions[i as usize]))
        .unwrap_or_else(|| Aabb3::new([0.0; 3], [0.0; 3]));
    let idx = nodes.len();
    nodes.push(Node {
        bounds,
        span: Span::Leaf { start, end },
    });
    if run.len() <= LEAF_SIZE {
        return idx;
    }

    let extent = bounds.extent();
    let key: fn(Vec3) -> f64 = if extent.x >= extent.y && extent.x >= extent.z {
        |p| p.x
    } else if extent.y >= extent.z {
        |p| p.y
    } else {
        |p| p.z
    };
    run.sort_by(|&a, &b| {
        stable_total_cmp_f64(key(positions[a as usize]), key(positions[b as usize])).then(a.cmp(&b))
    });

    let mid = start + run.len() / 2;
    let left = subdivide(nodes, order, positions, start, mid);
    let right = subdivide(nodes, order, positions, mid, end);
    nodes[idx].span = Span::Split { left, right };
    idx
}

/// Whether the segment meets `bounds` grown by `pad` on every side.
fn slab_hit(origin: Vec3, dir: Vec3, bounds: &Aabb3, pad: f64, mut t_min: f64, mut t_max: f64) -> bool {
    let o = [origin.x, origin.y, origin.z];
    let d = [dir.x, dir.y, dir.z];
    for axis in 0..3 {
        let lo = bounds.min[axis] - pad;
        let hi = bounds.max[axis] + pad;
        if d[axis].abs() < 1e-12 {
            if o[axis] < lo || o[axis] > hi {
                return false;
            }
            continue;
        }
        let (t0, t1) = ((lo - o[axis]) / d[axis], (hi - o[axis]) / d[axis]);
        t_min = t_min.max(t0.min(t1));
        t_max = t_max.min(t0.max(t1));
        if t_max < t_min {
            return false;
        }
    }
    true
}
