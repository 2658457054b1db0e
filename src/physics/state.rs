use std::time::{Duration, Instant};

/// Unit heading vector for a facing angle in degrees.
///
/// Angle 0 points straight up (negative y); positive angles turn the nose
/// clockwise. Thrust projection, projectile spawn offsets and spawn
/// velocities all share this one convention.
pub fn heading(angle_deg: f64) -> (f64, f64) {
    let rad = (angle_deg - 90.0).to_radians();
    (rad.cos(), rad.sin())
}

/// Wraps an angle in degrees into [0, 360).
pub fn wrap_angle(angle_deg: f64) -> f64 {
    angle_deg.rem_euclid(360.0)
}

/// Immutable kinematic snapshot of one body at one instant.
///
/// Values are never mutated in place: every change builds a new snapshot
/// that the owning engine installs with an atomic replace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsState {
    /// Instant this snapshot describes. Integration advances it by dt, not
    /// to wall-clock now, so repeated steps stay self-consistent.
    pub timestamp: Instant,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub ax: f64,
    pub ay: f64,
    /// Facing angle in degrees, wrapped to [0, 360).
    pub angle: f64,
    /// Angular velocity in degrees per second.
    pub angular_velocity: f64,
    /// Angular acceleration in degrees per second squared.
    pub angular_accel: f64,
    /// Thrust scalar; projected along the facing angle during integration.
    pub thrust: f64,
    pub size: f64,
}

impl PhysicsState {
    /// Snapshot of a motionless body, timestamped now.
    pub fn at_rest(x: f64, y: f64, size: f64) -> Self {
        Self {
            timestamp: Instant::now(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            ax: 0.0,
            ay: 0.0,
            angle: 0.0,
            angular_velocity: 0.0,
            angular_accel: 0.0,
            thrust: 0.0,
            size,
        }
    }

    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// Pure integration step over `dt`.
    ///
    /// Effective acceleration is the stored acceleration plus, when thrust
    /// is non-zero, the thrust projected along the facing angle. Velocity is
    /// Euler; position uses the trapezoidal average of the old and new
    /// velocity. The angle update is
    /// `angle + angular_velocity * dt + 0.5 * new_angular_velocity * dt^2`,
    /// wrapped to [0, 360). Stored acceleration, angular acceleration,
    /// thrust and size carry over unchanged.
    pub fn advanced(&self, dt: Duration) -> PhysicsState {
        let dt_s = dt.as_secs_f64();

        let (eff_ax, eff_ay) = if self.thrust != 0.0 {
            let (hx, hy) = heading(self.angle);
            (self.ax + self.thrust * hx, self.ay + self.thrust * hy)
        } else {
            (self.ax, self.ay)
        };

        let vx1 = self.vx + eff_ax * dt_s;
        let vy1 = self.vy + eff_ay * dt_s;

        let x1 = self.x + (self.vx + vx1) * 0.5 * dt_s;
        let y1 = self.y + (self.vy + vy1) * 0.5 * dt_s;

        let angular_velocity1 = self.angular_velocity + self.angular_accel * dt_s;
        let angle1 = wrap_angle(
            self.angle + self.angular_velocity * dt_s + 0.5 * angular_velocity1 * dt_s * dt_s,
        );

        PhysicsState {
            timestamp: self.timestamp + dt,
            x: x1,
            y: y1,
            vx: vx1,
            vy: vy1,
            ax: self.ax,
            ay: self.ay,
            angle: angle1,
            angular_velocity: angular_velocity1,
            angular_accel: self.angular_accel,
            thrust: self.thrust,
            size: self.size,
        }
    }
}
