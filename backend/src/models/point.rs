//! Three-dimensional integer points
//!
//! Used for block, core, and volume extents of a project.

/// An immutable `(x, y, z)` triple of unsigned integers.
///
/// Denotes either an offset or an extent. Points compare structurally and
/// order lexicographically by `x`, then `y`, then `z`.
///
/// # Example
/// ```
/// use pysopnet::Point3;
///
/// let block_size = Point3::new(256, 256, 10);
/// assert_eq!(block_size.to_array(), [256, 256, 10]);
/// assert!(Point3::new(1, 9, 9) < Point3::new(2, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point3 {
    x: u32,
    y: u32,
    z: u32,
}

impl Point3 {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub const fn x(&self) -> u32 {
        self.x
    }

    pub const fn y(&self) -> u32 {
        self.y
    }

    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Components in `x, y, z` order.
    pub const fn to_array(&self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[u32; 3]> for Point3 {
    fn from([x, y, z]: [u32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Point3> for [u32; 3] {
    fn from(point: Point3) -> Self {
        point.to_array()
    }
}
