use nalgebra::{Point3, Rotation3, Vector3};

use crate::telemetry::Attitude;

/// Fuselage box, nose along +x. Eight corners, meters.
pub const FUSELAGE: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [2.0, 0.0, 0.0],
    [2.0, 0.2, 0.0],
    [0.0, 0.2, 0.0],
    [0.0, 0.0, -0.2],
    [2.0, 0.0, -0.2],
    [2.0, 0.2, -0.2],
    [0.0, 0.0, -0.2],
];

pub const WING: [[f32; 3]; 4] = [
    [1.0, -2.0, 0.0],
    [1.0, 2.0, 0.0],
    [1.2, 2.0, 0.0],
    [1.2, -2.0, 0.0],
];

pub const TAIL: [[f32; 3]; 4] = [
    [0.2, -0.8, 0.0],
    [0.2, 0.8, 0.0],
    [0.4, 0.8, 0.0],
    [0.4, -0.8, 0.0],
];

/// Quads over [`FUSELAGE`]: top and bottom cross-sections plus the two side
/// panels.
pub const FUSELAGE_QUADS: [[usize; 4]; 4] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
];

/// Roll/pitch attitude as a single rotation, R = Ry(−pitch) · Rx(−roll),
/// angles in degrees. The negated angles are what make physical tilt and
/// rendered tilt agree; yaw is not modelled.
pub fn attitude_rotation(roll_deg: f32, pitch_deg: f32) -> Rotation3<f32> {
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), (-roll_deg).to_radians());
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), (-pitch_deg).to_radians());
    ry * rx
}

/// The three point sets posed for one frame.
pub struct PosedAirframe {
    pub fuselage: [Point3<f32>; 8],
    pub wing: [Point3<f32>; 4],
    pub tail: [Point3<f32>; 4],
}

/// Rotates every point set by the sample's roll/pitch and lifts it by the
/// scaled height.
pub fn pose(attitude: &Attitude, height_scale: f32) -> PosedAirframe {
    let rotation = attitude_rotation(attitude.roll_deg, attitude.pitch_deg);
    let lift = attitude.height_m * height_scale;
    PosedAirframe {
        fuselage: place(&FUSELAGE, &rotation, lift),
        wing: place(&WING, &rotation, lift),
        tail: place(&TAIL, &rotation, lift),
    }
}

fn place<const N: usize>(
    points: &[[f32; 3]; N],
    rotation: &Rotation3<f32>,
    lift: f32,
) -> [Point3<f32>; N] {
    points.map(|p| {
        let mut p = rotation * Point3::from(p);
        p.z += lift;
        p
    })
}
