//! Small numerical and string helpers shared by the rest of the library.

pub mod geometry;
pub mod pattern;
