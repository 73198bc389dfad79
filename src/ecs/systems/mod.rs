mod deformation;
mod forces;
mod physics;
mod picking;

pub use deformation::*;
pub use forces::*;
pub use physics::*;
pub use picking::*;
