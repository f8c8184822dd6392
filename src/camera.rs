use bevy::camera::ScalingMode;
use bevy::prelude::*;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Viewport>()
            .insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, setup_camera)
            .add_systems(Update, update_viewport);
    }
}

/// Size of the render surface in logical pixels
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    /// Window pixels (top-left origin, +y down) to world space (centered, +y up)
    pub fn to_world(&self, window_pos: Vec2) -> Vec2 {
        Vec2::new(
            window_pos.x - self.width * 0.5,
            self.height * 0.5 - window_pos.y,
        )
    }

    /// Record a new surface size. Returns true if it actually changed.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if (width - self.width).abs() < 0.5 && (height - self.height).abs() < 0.5 {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }
}

#[derive(Component)]
pub struct MainCamera;

/// Orthographic camera looking down -Z at the XY plane, one world unit per pixel
///
/// ```text
///        Y (up on screen)
///        ↑
///        |
///   -----+----→ X (right on screen)
///       /
///      Z (towards the viewer)
/// ```
fn setup_camera(mut commands: Commands) {
    let projection = Projection::Orthographic(OrthographicProjection {
        scaling_mode: ScalingMode::WindowSize,
        near: 0.0,
        far: 1000.0,
        ..OrthographicProjection::default_3d()
    });
    commands.spawn((
        Camera3d::default(),
        projection,
        Transform::from_xyz(0.0, 0.0, 100.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));
}

/// Track the window size so drawing always matches the surface
fn update_viewport(mut viewport: ResMut<Viewport>, windows: Query<&Window>) {
    if let Ok(window) = windows.single() {
        if viewport.resize(window.width(), window.height()) {
            info!("Viewport resized to {}x{}", viewport.width, viewport.height);
        }
    }
}
