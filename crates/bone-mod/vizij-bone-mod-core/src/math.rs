//! Small vector/quaternion helpers over the `[f32; N]` encoding used across vizij.
//!
//! Quaternions are `[x, y, z, w]`. Euler angles are in degrees.

pub type Vec3 = [f32; 3];
pub type Quat = [f32; 4];

pub const QUAT_IDENTITY: Quat = [0.0, 0.0, 0.0, 1.0];

#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Component-wise linear interpolation (unclamped).
#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
    ]
}

#[inline]
pub fn dot_quat(a: Quat, b: Quat) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

/// Normalize a quaternion; a zero quaternion maps to identity.
#[inline]
pub fn normalize_quat(q: Quat) -> Quat {
    let mag = dot_quat(q, q).sqrt();
    if mag == 0.0 {
        QUAT_IDENTITY
    } else {
        [q[0] / mag, q[1] / mag, q[2] / mag, q[3] / mag]
    }
}

/// Hamilton product `a * b` (apply `b` first, then `a`).
#[inline]
pub fn mul_quat(a: Quat, b: Quat) -> Quat {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

/// Spherical interpolation along the shortest arc.
///
/// Falls back to normalized lerp when the inputs are nearly parallel.
pub fn slerp_quat(a: Quat, b: Quat, t: f32) -> Quat {
    let qa = normalize_quat(a);
    let mut qb = normalize_quat(b);

    let mut dot = dot_quat(qa, qb);
    if dot < 0.0 {
        qb = [-qb[0], -qb[1], -qb[2], -qb[3]];
        dot = -dot;
    }

    const DOT_THRESHOLD: f32 = 0.9995;
    if dot > DOT_THRESHOLD {
        return normalize_quat([
            lerp_f32(qa[0], qb[0], t),
            lerp_f32(qa[1], qb[1], t),
            lerp_f32(qa[2], qb[2], t),
            lerp_f32(qa[3], qb[3], t),
        ]);
    }

    let theta_0 = dot.clamp(-1.0, 1.0).acos();
    let theta = theta_0 * t;
    let sin_theta_0 = theta_0.sin();
    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = theta.sin() / sin_theta_0;

    normalize_quat([
        s0 * qa[0] + s1 * qb[0],
        s0 * qa[1] + s1 * qb[1],
        s0 * qa[2] + s1 * qb[2],
        s0 * qa[3] + s1 * qb[3],
    ])
}

#[inline]
fn axis_angle(axis: usize, degrees: f32) -> Quat {
    let half = degrees.to_radians() * 0.5;
    let mut q = [0.0, 0.0, 0.0, half.cos()];
    q[axis] = half.sin();
    q
}

/// Build a rotation from Euler angles in degrees.
///
/// Rotation order is Z, then X, then Y (`q = qy * qx * qz`).
pub fn euler_to_quat(degrees: Vec3) -> Quat {
    let qx = axis_angle(0, degrees[0]);
    let qy = axis_angle(1, degrees[1]);
    let qz = axis_angle(2, degrees[2]);
    normalize_quat(mul_quat(mul_quat(qy, qx), qz))
}

/// Angle in radians between two orientations (sign-insensitive).
pub fn quat_angle_between(a: Quat, b: Quat) -> f32 {
    let d = dot_quat(normalize_quat(a), normalize_quat(b)).abs().min(1.0);
    2.0 * d.acos()
}
