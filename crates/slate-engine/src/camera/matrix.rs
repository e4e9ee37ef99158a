use bytemuck::{Pod, Zeroable};

/// Column-major 4×4 matrix holding a 2D affine transform in homogeneous form.
///
/// `cols[c][r]` is column `c`, row `r`, matching WGSL `mat4x4<f32>` memory
/// layout.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4::from_affine_2d([1.0, 0.0], [0.0, 1.0], [0.0, 0.0]);

    /// Embeds the 2D affine map `p ↦ x_axis * p.x + y_axis * p.y + translation`.
    pub const fn from_affine_2d(x_axis: [f32; 2], y_axis: [f32; 2], translation: [f32; 2]) -> Self {
        Self {
            cols: [
                [x_axis[0], x_axis[1], 0.0, 0.0],
                [y_axis[0], y_axis[1], 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [translation[0], translation[1], 0.0, 1.0],
            ],
        }
    }

    /// Applies the matrix to the point `(x, y, 0, 1)` and returns `(x', y')`.
    #[inline]
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let c = &self.cols;
        (
            c[0][0] * x + c[1][0] * y + c[3][0],
            c[0][1] * x + c[1][1] * y + c[3][1],
        )
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_points_alone() {
        assert_eq!(Mat4::IDENTITY.transform_point(3.0, -4.0), (3.0, -4.0));
    }

    #[test]
    fn affine_columns_are_laid_out_column_major() {
        let m = Mat4::from_affine_2d([2.0, 0.0], [0.0, 3.0], [5.0, 7.0]);
        assert_eq!(m.cols[3], [5.0, 7.0, 0.0, 1.0]);
        assert_eq!(m.transform_point(1.0, 1.0), (7.0, 10.0));
    }

    #[test]
    fn mat4_is_64_bytes() {
        assert_eq!(std::mem::size_of::<Mat4>(), 64);
    }
}
