use cgmath::{Point3, Vector3};

use crate::engine::voxels::block::{Direction, Voxel};

/// Corner order of every quad: lower-left, lower-right, upper-left,
/// upper-right, as signs along the face's `(u, v)` tangents.
pub const CORNER_SIGNS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Texture coordinates per corner, in [`CORNER_SIGNS`] order.
pub const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

/// Normal and in-plane tangents of a face. `u × v == normal`, so corners in
/// [`CORNER_SIGNS`] order wind counter-clockwise seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBasis {
    pub normal: Vector3<i32>,
    pub u: Vector3<i32>,
    pub v: Vector3<i32>,
}

impl FaceBasis {
    pub fn of(direction: Direction) -> Self {
        let (u, v) = match direction {
            Direction::Right => (Vector3::new(0, 0, -1), Vector3::new(0, 1, 0)),
            Direction::Left => (Vector3::new(0, 0, 1), Vector3::new(0, 1, 0)),
            Direction::Forward => (Vector3::new(1, 0, 0), Vector3::new(0, 1, 0)),
            Direction::Backward => (Vector3::new(-1, 0, 0), Vector3::new(0, 1, 0)),
            Direction::Up => (Vector3::new(1, 0, 0), Vector3::new(0, 0, -1)),
            Direction::Down => (Vector3::new(1, 0, 0), Vector3::new(0, 0, 1)),
        };
        FaceBasis {
            normal: direction.offset(),
            u,
            v,
        }
    }
}

/// A single visible voxel face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Voxel position in chunk-local coordinates.
    pub position: Point3<i32>,
    pub direction: Direction,
    pub voxel: Voxel,
    pub basis: FaceBasis,
}

impl Face {
    pub fn new(position: Point3<i32>, direction: Direction, voxel: Voxel) -> Self {
        Face {
            position,
            direction,
            voxel,
            basis: FaceBasis::of(direction),
        }
    }

    /// Corner positions in chunk-local space, scaled by `block_size`.
    ///
    /// A voxel is centred on its integer coordinate, so corners lie half a
    /// block out along the normal and both tangents.
    pub fn corners(&self, block_size: f32) -> [Point3<f32>; 4] {
        let to_f32 = |v: Vector3<i32>| Vector3::new(v.x as f32, v.y as f32, v.z as f32);
        let center = Vector3::new(
            self.position.x as f32,
            self.position.y as f32,
            self.position.z as f32,
        ) + to_f32(self.basis.normal) * 0.5;
        let u = to_f32(self.basis.u) * 0.5;
        let v = to_f32(self.basis.v) * 0.5;

        CORNER_SIGNS.map(|(su, sv)| {
            let corner = (center + u * su as f32 + v * sv as f32) * block_size;
            Point3::new(corner.x, corner.y, corner.z)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{EuclideanSpace, InnerSpace};

    #[test]
    fn tangents_wind_outward_for_every_direction() {
        for direction in Direction::ALL {
            let basis = FaceBasis::of(direction);
            assert_eq!(basis.u.cross(basis.v), basis.normal, "{:?}", direction);
        }
    }

    #[test]
    fn corners_lie_on_the_face_plane() {
        let face = Face::new(Point3::new(2, 3, 4), Direction::Up, Voxel::Grass);
        let corners = face.corners(2.0);

        for corner in corners {
            assert_eq!(corner.y, 7.0);
        }
        assert_eq!(corners[0], Point3::new(3.0, 7.0, 9.0));
        assert_eq!(corners[3], Point3::new(5.0, 7.0, 7.0));

        let normal = (corners[1] - corners[0]).cross(corners[2] - corners[0]).normalize();
        assert_eq!(normal, Direction::Up.normal());
        assert_eq!(corners.iter().map(|c| c.to_vec()).sum::<Vector3<f32>>() / 4.0, Vector3::new(4.0, 7.0, 8.0));
    }
}
