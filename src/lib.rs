pub mod audio;
pub mod camera3d;
pub mod cli;
pub mod config;
pub mod deformation;
pub mod ecs;
pub mod events;
pub mod forces;
pub mod input;
pub mod interaction;
pub mod playground;
pub mod renderer;
pub mod shapes;
pub mod time;
pub mod timer;

pub use playground::Playground;

pub(crate) fn wrap_angle(mut radians: f32) -> f32 {
    let two_pi = 2.0 * std::f32::consts::PI;
    while radians > std::f32::consts::PI {
        radians -= two_pi;
    }
    while radians < -std::f32::consts::PI {
        radians += two_pi;
    }
    radians
}
