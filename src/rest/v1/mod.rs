pub mod analysis;
pub mod geometry;
pub mod sessions;
