use glam::{Mat4, Vec3};
use pasture_common::CameraConfig;

const PITCH_LIMIT: f32 = 89.0;

/// Unit look direction for yaw/pitch given in degrees.
///
/// `(cos yaw * cos pitch, sin pitch, sin yaw * cos pitch)`. Anything that aims
/// along the view (the gun) derives its direction from the angles through this
/// function, never from a view matrix.
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.to_radians().sin_cos();
    let (sp, cp) = pitch.to_radians().sin_cos();
    Vec3::new(cy * cp, sp, sy * cp)
}

/// First-person camera: eye position, yaw/pitch in degrees, and the vertical
/// motion of the player body it is attached to.
///
/// Mutators only touch scalars. The view matrix is synthesized by
/// [`Camera::update_view`] and cached until the next call.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    velocity_y: f32,
    grounded: bool,
    view: Mat4,
    view_updates: u64,
    pub aspect: f32,
    move_speed: f32,
    pan_step: f32,
    sensitivity: f32,
    ground_y: f32,
    jump_force: f32,
    gravity: f32,
    fov: f32,
    near: f32,
    far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: config.start,
            yaw: config.yaw,
            pitch: 0.0,
            velocity_y: 0.0,
            grounded: true,
            view: Mat4::IDENTITY,
            view_updates: 0,
            aspect: 16.0 / 9.0,
            move_speed: config.move_speed,
            pan_step: config.pan_step,
            sensitivity: config.mouse_sensitivity,
            ground_y: config.ground_y,
            jump_force: config.jump_force,
            gravity: config.gravity,
            fov: config.fov,
            near: config.near,
            far: config.far,
        };
        camera.set_pitch(config.pitch);
        camera
    }

    /// Heading in degrees; 0 looks down +X.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Elevation in degrees, within +/-89.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical speed in units per frame.
    pub fn velocity_y(&self) -> f32 {
        self.velocity_y
    }

    /// Standing on the ground or a block stack.
    pub fn grounded(&self) -> bool {
        self.grounded
    }

    /// Eye height over an empty cell.
    pub fn ground_y(&self) -> f32 {
        self.ground_y
    }

    /// Set the heading. Yaw is not wrapped.
    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    /// Set the elevation, clamped to +/-89 degrees.
    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Full look direction including pitch.
    pub fn forward(&self) -> Vec3 {
        look_direction(self.yaw, self.pitch)
    }

    /// Horizontal forward, derived from yaw alone.
    pub fn flat_forward(&self) -> Vec3 {
        let (s, c) = self.yaw.to_radians().sin_cos();
        Vec3::new(c, 0.0, s)
    }

    /// Horizontal right: forward rotated by -90 degrees about world up.
    pub fn right(&self) -> Vec3 {
        let (s, c) = self.yaw.to_radians().sin_cos();
        Vec3::new(s, 0.0, -c)
    }

    /// Step one `move_speed` along horizontal forward.
    pub fn move_forward(&mut self) {
        self.position += self.flat_forward() * self.move_speed;
    }

    pub fn move_backward(&mut self) {
        self.position -= self.flat_forward() * self.move_speed;
    }

    pub fn move_left(&mut self) {
        self.position -= self.right() * self.move_speed;
    }

    pub fn move_right(&mut self) {
        self.position += self.right() * self.move_speed;
    }

    /// Turn left by one `pan_step`.
    pub fn pan_left(&mut self) {
        self.yaw += self.pan_step;
    }

    /// Turn right by one `pan_step`.
    pub fn pan_right(&mut self) {
        self.yaw -= self.pan_step;
    }

    /// Accumulate mouse motion in pixels. Safe to call any number of times
    /// between frames; no matrix work happens here.
    pub fn mouse_rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.set_pitch(self.pitch - dy * self.sensitivity);
    }

    /// Start a jump if standing on something. Returns whether it started.
    pub fn jump(&mut self) -> bool {
        if !self.grounded {
            return false;
        }
        self.velocity_y = self.jump_force;
        self.grounded = false;
        true
    }

    /// Integrate one frame of vertical motion against a floor height.
    ///
    /// A grounded camera follows the floor up, and starts falling when the
    /// floor drops away beneath it.
    pub fn apply_gravity(&mut self, floor: f32) {
        if self.grounded {
            if self.position.y <= floor {
                self.position.y = floor;
                return;
            }
            self.grounded = false;
        }

        self.velocity_y -= self.gravity;
        self.position.y += self.velocity_y;

        if self.position.y <= floor {
            self.position.y = floor;
            self.velocity_y = 0.0;
            self.grounded = true;
        }
    }

    /// Rebuild the view matrix from (position, yaw, pitch). Call exactly once
    /// per rendered frame.
    pub fn update_view(&mut self) -> Mat4 {
        let eye = self.position;
        self.view = Mat4::look_at_lh(eye, eye + self.forward(), Vec3::Y);
        self.view_updates += 1;
        self.view
    }

    /// View matrix as of the last [`Camera::update_view`].
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Number of times the view matrix has been synthesized.
    pub fn view_updates(&self) -> u64 {
        self.view_updates
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view
    }
}
