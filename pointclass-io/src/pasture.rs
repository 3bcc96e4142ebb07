//! LAS/LAZ support through the pasture library

use crate::registry::{PointSetReader, PointSetWriter};
use pasture_core::containers::{BorrowedBuffer, VectorBuffer};
use pasture_core::layout::attributes::{CLASSIFICATION, COLOR_RGB, POSITION_3D};
use pasture_core::nalgebra::Vector3;
use pasture_io::base::PointReader;
use pasture_io::las::LASReader;
use pointclass_core::{color_from_u16, Error, Point3f, PointSet, Result};
use std::path::Path;
use tracing::info;

pub struct PastureReader;
pub struct PastureWriter;

fn backend_error(e: impl std::fmt::Display) -> Error {
    Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

impl PointSetReader for PastureReader {
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    fn read_point_set(&self, path: &Path) -> Result<PointSet> {
        let mut reader = LASReader::from_path(path, false).map_err(backend_error)?;
        let remaining = reader.remaining_points();
        let buffer = reader.read::<VectorBuffer>(remaining).map_err(backend_error)?;
        let layout = buffer.point_layout();

        info!("Reading {} points", buffer.len());

        let mut set = PointSet::with_capacity(buffer.len());
        for position in buffer.view_attribute::<Vector3<f64>>(&POSITION_3D) {
            set.points.push(Point3f::new(
                position.x as f32,
                position.y as f32,
                position.z as f32,
            ));
        }

        if layout.has_attribute(&COLOR_RGB) {
            let raw: Vec<Vector3<u16>> = buffer
                .view_attribute::<Vector3<u16>>(&COLOR_RGB)
                .into_iter()
                .collect();

            // 16-bit colors are scaled down; 8-bit values stored in 16-bit
            // fields are kept as they are.
            let wide = raw.iter().any(|c| c.x > 255 || c.y > 255 || c.z > 255);
            set.colors = raw
                .iter()
                .map(|c| {
                    if wide {
                        [color_from_u16(c.x), color_from_u16(c.y), color_from_u16(c.z)]
                    } else {
                        [c.x as u8, c.y as u8, c.z as u8]
                    }
                })
                .collect();
        }

        if layout.has_attribute(&CLASSIFICATION) {
            set.labels = buffer.view_attribute::<u8>(&CLASSIFICATION).into_iter().collect();
        }

        Ok(set)
    }

    fn can_read(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext.to_lowercase().as_str(), "las" | "laz"))
            .unwrap_or(false)
    }

    fn format_name(&self) -> &'static str {
        "pasture"
    }
}

impl PointSetWriter for PastureWriter {
    fn write_point_set(&self, _set: &PointSet, path: &Path) -> Result<()> {
        Err(Error::Unsupported(format!(
            "writing {} through pasture is not supported",
            path.display()
        )))
    }

    fn format_name(&self) -> &'static str {
        "pasture"
    }
}
