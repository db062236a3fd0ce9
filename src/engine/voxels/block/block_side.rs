//! # Block Side Module
//!
//! The six face directions of a voxel and the per-voxel bitmask recording
//! which of those faces border transparent space.

use cgmath::Vector3;

/// One of the six axis-aligned faces of a voxel.
///
/// The discriminant doubles as the bit index inside a [`FaceMask`] and as the
/// column index of the material table.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Direction {
    /// Positive Y.
    Up = 0,
    /// Negative Y.
    Down = 1,
    /// Negative X.
    Left = 2,
    /// Positive X.
    Right = 3,
    /// Negative Z.
    Backward = 4,
    /// Positive Z.
    Forward = 5,
}

impl Direction {
    /// All six directions in mask bit order.
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Backward,
        Direction::Forward,
    ];

    /// Unit step from a voxel to its neighbour across this face.
    #[inline]
    pub fn offset(self) -> Vector3<i32> {
        match self {
            Direction::Up => Vector3::new(0, 1, 0),
            Direction::Down => Vector3::new(0, -1, 0),
            Direction::Left => Vector3::new(-1, 0, 0),
            Direction::Right => Vector3::new(1, 0, 0),
            Direction::Backward => Vector3::new(0, 0, -1),
            Direction::Forward => Vector3::new(0, 0, 1),
        }
    }

    /// The direction pointing the other way.
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Backward => Direction::Forward,
            Direction::Forward => Direction::Backward,
        }
    }

    /// Axis index (0 = x, 1 = y, 2 = z) this direction moves along.
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            Direction::Left | Direction::Right => 0,
            Direction::Up | Direction::Down => 1,
            Direction::Backward | Direction::Forward => 2,
        }
    }

    /// `true` for directions pointing along a positive axis.
    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Direction::Up | Direction::Right | Direction::Forward)
    }

    /// Face normal as a float vector.
    pub fn normal(self) -> Vector3<f32> {
        self.offset().cast::<f32>().unwrap_or(Vector3::new(0.0, 0.0, 0.0))
    }
}

/// A 6-bit set of [`Direction`]s, one bit per face.
///
/// For face visibility a set bit means the neighbour across that face is
/// transparent, so the face must be meshed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FaceMask(u8);

impl FaceMask {
    /// No faces.
    pub const EMPTY: FaceMask = FaceMask(0);
    /// All six faces.
    pub const ALL: FaceMask = FaceMask(0b11_1111);

    /// Builds a mask from its raw bits. Bits above the sixth are discarded.
    pub fn from_bits(bits: u8) -> Self {
        FaceMask(bits & Self::ALL.0)
    }

    /// Raw bit representation.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if the face is in the set.
    #[inline]
    pub fn contains(self, direction: Direction) -> bool {
        self.0 & (1 << direction as u8) != 0
    }

    /// Adds a face to the set.
    #[inline]
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= 1 << direction as u8;
    }

    /// Removes a face from the set.
    #[inline]
    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !(1 << direction as u8);
    }

    /// Returns `true` if no face is set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of faces in the set.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates the set faces in [`Direction::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

impl FromIterator<Direction> for FaceMask {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut mask = FaceMask::EMPTY;
        for direction in iter {
            mask.insert(direction);
        }
        mask
    }
}
