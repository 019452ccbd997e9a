pub mod ingest;
pub mod point;
pub mod topology;

pub use ingest::flatten_predictions;
pub use point::{average_x, Point3D, PointSet};
pub use topology::{finger_of, HAND_FINGERS, HAND_LANDMARK_COUNT};
