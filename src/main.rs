use bevy::prelude::*;

mod camera;
mod config;
mod emitter;
mod input;
mod particles;
mod scan;
mod visual;

use bevy::window::WindowResolution;
use camera::CameraPlugin;
use input::InputPlugin;

use crate::visual::plugin::ScanPlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Biometric Scan".into(),
            resolution: WindowResolution::new(1280, 800),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .add_plugins(CameraPlugin)
    .add_plugins(InputPlugin)
    .add_plugins(ScanPlugin);

    app.run();
}
