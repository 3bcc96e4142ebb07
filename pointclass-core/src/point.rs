//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// An 8-bit color, always stored as `[red, green, blue]`
pub type Color = [u8; 3];

/// Squared euclidean distance between two points
#[inline]
pub fn squared_distance(a: &Point3f, b: &Point3f) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    dx * dx + dy * dy + dz * dz
}

/// Narrow a 16-bit color channel to 8 bits by rescaling
#[inline]
pub fn color_from_u16(value: u16) -> u8 {
    ((value as f64 / 65535.0) * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_distance() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(1.0, 2.0, 2.0);
        assert_eq!(squared_distance(&a, &b), 9.0);
        assert_eq!(squared_distance(&b, &b), 0.0);
    }

    #[test]
    fn test_color_from_u16() {
        assert_eq!(color_from_u16(0), 0);
        assert_eq!(color_from_u16(65535), 255);
        assert_eq!(color_from_u16(32768), 127);
    }
}
