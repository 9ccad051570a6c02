//! Component transforms as they appear in documents.
//!
//! The usual form is a six element affine `[a, b, c, d, tx, ty]`, the same
//! layout as [`kurbo::Affine::as_coeffs`]. Some producers write a decomposed
//! form instead; both read, and both convert to an [`Affine`].

use kurbo::Affine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformData {
    Matrix([f64; 6]),
    Decomposed(DecomposedTransform),
}

impl TransformData {
    pub fn to_affine(&self) -> Affine {
        match self {
            TransformData::Matrix(coeffs) => Affine::new(*coeffs),
            TransformData::Decomposed(decomposed) => decomposed.to_affine(),
        }
    }

    /// Move the transform by `(dx, dy)` after its linear part, keeping its form.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            TransformData::Matrix(coeffs) => {
                coeffs[4] += dx;
                coeffs[5] += dy;
            }
            TransformData::Decomposed(decomposed) => {
                decomposed.translation[0] += dx;
                decomposed.translation[1] += dy;
            }
        }
    }
}

impl Default for TransformData {
    fn default() -> Self {
        TransformData::Matrix(Affine::IDENTITY.as_coeffs())
    }
}

impl From<Affine> for TransformData {
    fn from(value: Affine) -> Self {
        TransformData::Matrix(value.as_coeffs())
    }
}

/// Translation, rotation, skew and scale, applied scale first.
///
/// Angles are in degrees, counter-clockwise in font coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecomposedTransform {
    #[serde(default)]
    pub translation: [f64; 2],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 2],
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub skew: [f64; 2],
}

fn unit_scale() -> [f64; 2] {
    [1.0, 1.0]
}

impl Default for DecomposedTransform {
    fn default() -> Self {
        DecomposedTransform {
            translation: [0.0, 0.0],
            scale: unit_scale(),
            rotation: 0.0,
            skew: [0.0, 0.0],
        }
    }
}

impl DecomposedTransform {
    pub fn to_affine(&self) -> Affine {
        let [tx, ty] = self.translation;
        let [sx, sy] = self.scale;
        let skew_x = self.skew[0].to_radians().tan();
        let skew_y = self.skew[1].to_radians().tan();
        Affine::translate((tx, ty))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::new([1.0, skew_y, skew_x, 1.0, 0.0, 0.0])
            * Affine::scale_non_uniform(sx, sy)
    }

    /// QR style decomposition.
    ///
    /// The first column gives the x scale and the rotation, the second column's
    /// projection onto the first gives the skew and what remains is the y
    /// scale, negative when the transform mirrors. The result never has a y
    /// skew.
    pub fn from_affine(affine: Affine) -> DecomposedTransform {
        let [a, b, c, d, tx, ty] = affine.as_coeffs();
        let scale_x = a.hypot(b);
        if scale_x == 0.0 {
            // first column collapsed; only the second column's length survives
            return DecomposedTransform {
                translation: [tx, ty],
                scale: [0.0, c.hypot(d)],
                ..Default::default()
            };
        }
        let (ux, uy) = (a / scale_x, b / scale_x);
        let scale_y = (a * d - b * c) / scale_x;
        let shear = c * ux + d * uy;
        let skew_x = if scale_y != 0.0 {
            (shear / scale_y).atan().to_degrees()
        } else {
            0.0
        };
        DecomposedTransform {
            translation: [tx, ty],
            scale: [scale_x, scale_y],
            rotation: b.atan2(a).to_degrees(),
            skew: [skew_x, 0.0],
        }
    }
}
