pub mod geometry;

pub use geometry::Bound;
