// Re-export glam for convenience
pub use glam::*;

// Ingot math types
mod aabb;
pub use aabb::Aabb;
