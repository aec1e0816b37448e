//! Checks for 4x4 rigid transforms.

use nalgebra::{Matrix3, Matrix4};

/// Upper-left 3x3 block of a homogeneous transform.
pub fn rotation_block(m: &Matrix4<f32>) -> Matrix3<f32> {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// True if `m` has an orthonormal, right-handed rotation block and a
/// `[0, 0, 0, 1]` bottom row, within `eps`.
pub fn is_rigid(m: &Matrix4<f32>, eps: f32) -> bool {
    let r = rotation_block(m);
    let orthonormal = (r.transpose() * r - Matrix3::identity()).amax() <= eps;
    let right_handed = (r.determinant() - 1.0).abs() <= eps;
    let bottom = m.row(3);
    let homogeneous = bottom[0].abs() <= eps
        && bottom[1].abs() <= eps
        && bottom[2].abs() <= eps
        && (bottom[3] - 1.0).abs() <= eps;
    orthonormal && right_handed && homogeneous
}
