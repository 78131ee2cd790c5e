//! Numerical primitives for graphical-model inference and testing.

pub mod math;

pub use math::beta::*;
pub use math::gamma::*;
pub use math::normal::*;
pub use math::stable::*;
