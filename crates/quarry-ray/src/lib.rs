//! First-hit ray resolution over occupied cells and static scenery.
#![forbid(unsafe_code)]

use quarry_geom::{Aabb, Vec3};
use quarry_grid::GridCell;

/// Classification of the struck surface. Player volumes are never part
/// of the cast set; the submitting player must not occlude their own
/// ray and other players are excluded wholesale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitKind {
    Block,
    Scenery,
}

#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub kind: HitKind,
    /// World-space point on the struck face.
    pub point: Vec3,
    /// Axis-aligned unit outward normal of the struck face. Zero when
    /// the ray started inside a block.
    pub normal: Vec3,
    /// Distance from the ray origin along the normalized direction.
    pub distance: f32,
    /// Cell holding the struck block; `None` for scenery hits.
    pub cell: Option<GridCell>,
    /// Empty-side neighbor of the struck face: the placement target.
    /// Equals `GridCell::from_world(point + normal * grid_size / 2)`.
    pub adjacent: GridCell,
}

// Cells traversed before the walk gives up; generous next to any
// realistic reach / grid-size ratio.
const MAX_STEPS: usize = 512;

/// Resolves the first solid surface along `origin + t * dir`, querying
/// `is_block` for cell occupancy and testing `scenery` boxes with the
/// slab method. Nearest intersection wins. Returns `None` for no hit
/// within `max_dist` or a degenerate direction.
pub fn resolve<F>(
    origin: Vec3,
    dir: Vec3,
    max_dist: f32,
    grid_size: f32,
    is_block: F,
    scenery: &[Aabb],
) -> Option<RayHit>
where
    F: FnMut(GridCell) -> bool,
{
    let len = dir.length();
    if len < 1e-6 {
        return None;
    }
    let d = dir / len;

    let block = walk_cells(origin, d, max_dist, grid_size, is_block);
    let scenery_hit = scenery
        .iter()
        .filter_map(|aabb| ray_aabb(origin, d, *aabb))
        .filter(|(t, _)| *t >= 0.0 && *t <= max_dist)
        .min_by(|a, b| a.0.total_cmp(&b.0));

    match (block, scenery_hit) {
        (Some(b), Some((t, _))) if b.t <= t => Some(block_hit(origin, d, b)),
        (Some(_), Some((t, n))) => Some(scenery_hit_at(origin, d, grid_size, t, n)),
        (Some(b), None) => Some(block_hit(origin, d, b)),
        (None, Some((t, n))) => Some(scenery_hit_at(origin, d, grid_size, t, n)),
        (None, None) => None,
    }
}

struct CellWalkHit {
    cell: GridCell,
    prev: GridCell,
    t: f32,
    normal: [i32; 3],
}

fn block_hit(origin: Vec3, d: Vec3, hit: CellWalkHit) -> RayHit {
    let normal = Vec3::new(
        hit.normal[0] as f32,
        hit.normal[1] as f32,
        hit.normal[2] as f32,
    );
    RayHit {
        kind: HitKind::Block,
        point: origin + d * hit.t,
        normal,
        distance: hit.t,
        cell: Some(hit.cell),
        adjacent: hit.prev,
    }
}

fn scenery_hit_at(origin: Vec3, d: Vec3, grid_size: f32, t: f32, normal: [i32; 3]) -> RayHit {
    let n = Vec3::new(normal[0] as f32, normal[1] as f32, normal[2] as f32);
    let point = origin + d * t;
    RayHit {
        kind: HitKind::Scenery,
        point,
        normal: n,
        distance: t,
        cell: None,
        adjacent: GridCell::from_world(point + n * (grid_size * 0.5), grid_size),
    }
}

/// Amanatides-Woo walk over the cell lattice. Works in cell space,
/// where cell boundaries sit at the half-integers of `point / grid`;
/// `t` stays in world units so distances compare against scenery hits
/// directly.
fn walk_cells<F>(
    origin: Vec3,
    d: Vec3,
    max_dist: f32,
    grid: f32,
    mut is_block: F,
) -> Option<CellWalkHit>
where
    F: FnMut(GridCell) -> bool,
{
    // Shift by half a cell so boundaries land on integers.
    let ux = origin.x / grid + 0.5;
    let uy = origin.y / grid + 0.5;
    let uz = origin.z / grid + 0.5;

    let mut vx = ux.floor() as i32;
    let mut vy = uy.floor() as i32;
    let mut vz = uz.floor() as i32;

    let stepx = if d.x > 0.0 {
        1
    } else if d.x < 0.0 {
        -1
    } else {
        0
    };
    let stepy = if d.y > 0.0 {
        1
    } else if d.y < 0.0 {
        -1
    } else {
        0
    };
    let stepz = if d.z > 0.0 {
        1
    } else if d.z < 0.0 {
        -1
    } else {
        0
    };

    // World distance spent crossing one full cell per axis.
    let tdx = if stepx == 0 { f32::MAX } else { grid / d.x.abs() };
    let tdy = if stepy == 0 { f32::MAX } else { grid / d.y.abs() };
    let tdz = if stepz == 0 { f32::MAX } else { grid / d.z.abs() };

    let fx = ux - ux.floor();
    let fy = uy - uy.floor();
    let fz = uz - uz.floor();
    let mut tmx = match stepx {
        1 => (1.0 - fx) * tdx,
        -1 => fx * tdx,
        _ => f32::MAX,
    };
    let mut tmy = match stepy {
        1 => (1.0 - fy) * tdy,
        -1 => fy * tdy,
        _ => f32::MAX,
    };
    let mut tmz = match stepz {
        1 => (1.0 - fz) * tdz,
        -1 => fz * tdz,
        _ => f32::MAX,
    };

    let mut prevx = vx;
    let mut prevy = vy;
    let mut prevz = vz;
    let mut t = 0.0f32;

    for _ in 0..MAX_STEPS {
        if t > max_dist {
            break;
        }
        let cell = GridCell::new(vx, vy, vz);
        if is_block(cell) {
            // Face normal from the step between prev and current
            let dx = vx - prevx;
            let dy = vy - prevy;
            let dz = vz - prevz;
            let mut normal = [0i32; 3];
            if dx != 0 {
                normal[0] = -dx;
            } else if dy != 0 {
                normal[1] = -dy;
            } else if dz != 0 {
                normal[2] = -dz;
            }
            return Some(CellWalkHit {
                cell,
                prev: GridCell::new(prevx, prevy, prevz),
                t,
                normal,
            });
        }
        prevx = vx;
        prevy = vy;
        prevz = vz;
        if tmx < tmy {
            if tmx < tmz {
                vx += stepx;
                t = tmx;
                tmx += tdx;
            } else {
                vz += stepz;
                t = tmz;
                tmz += tdz;
            }
        } else if tmy < tmz {
            vy += stepy;
            t = tmy;
            tmy += tdy;
        } else {
            vz += stepz;
            t = tmz;
            tmz += tdz;
        }
    }
    None
}

/// Slab-method ray/AABB test. Returns entry distance and the entered
/// face's outward normal; `None` when the ray misses or starts inside.
fn ray_aabb(origin: Vec3, d: Vec3, aabb: Aabb) -> Option<(f32, [i32; 3])> {
    let o = [origin.x, origin.y, origin.z];
    let dir = [d.x, d.y, d.z];
    let lo = [aabb.min.x, aabb.min.y, aabb.min.z];
    let hi = [aabb.max.x, aabb.max.y, aabb.max.z];

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut normal = [0i32; 3];

    for i in 0..3 {
        if dir[i].abs() < 1e-8 {
            if o[i] < lo[i] || o[i] > hi[i] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[i];
        let mut t1 = (lo[i] - o[i]) * inv;
        let mut t2 = (hi[i] - o[i]) * inv;
        let mut sign = -1i32;
        if t1 > t2 {
            core::mem::swap(&mut t1, &mut t2);
            sign = 1;
        }
        if t1 > t_min {
            t_min = t1;
            normal = [0, 0, 0];
            normal[i] = sign;
        }
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    // Origin inside the box: no surface to strike.
    if t_min < 0.0 {
        return None;
    }
    Some((t_min, normal))
}
