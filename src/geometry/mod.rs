pub mod bbox;
pub mod octree;

pub use bbox::{intersection_volume, BoundingBox, BOX_EDGES};
pub use octree::Octree;
