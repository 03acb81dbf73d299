use super::capture_worker::{load_scaled, parse_capture_name};
use crate::objective::ZonedObjective;
use crate::warn;
use image::{ImageFormat, RgbImage};
use std::{io::Cursor, path::PathBuf};

/// Composites the photos of a zoned objective onto a canvas covering its zone and encodes
/// the result as PNG.
#[allow(clippy::cast_sign_loss)]
pub fn stitch_zone(
    objective: &ZonedObjective,
    images: &[PathBuf],
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let extent = objective.extent();
    let mut canvas = RgbImage::new(extent.x().max(1) as u32, extent.y().max(1) as u32);
    let origin = objective.origin().to_f64();
    for path in images {
        let Some((angle, pos)) = parse_capture_name(path) else {
            warn!("Skipping unrecognized photo {}", path.display());
            continue;
        };
        let tile = match load_scaled(path, angle, 1) {
            Ok(tile) => tile,
            Err(e) => {
                warn!("Skipping unreadable photo {}: {e}", path.display());
                continue;
            }
        };
        let offset = origin.to_wrapped(&pos.to_f64());
        let half = i64::from(tile.width() / 2);
        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = (offset.x().round() as i64 - half, offset.y().round() as i64 - half);
        image::imageops::overlay(&mut canvas, &tile, x, y);
    }
    let mut png = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// File name of the stitched artifact.
pub fn objective_file_name(id: usize) -> String { format!("OBJECTIVE_ID_{id}.png") }
