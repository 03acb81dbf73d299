use crate::flight_control::CameraAngle;
use crate::util::{MAP_HEIGHT, MAP_WIDTH, Vec2D};
use crate::{error, info, warn};
use image::{ImageReader, RgbImage, imageops::FilterType};
use regex::Regex;
use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
    thread::JoinHandle,
};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Photo file name, e.g. `lens8_10432_5120.png`.
static CAPTURE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"lens(\d)_(-?\d+)_(-?\d+)\.\w+$").unwrap());

/// File name of a photo taken with `angle` at cell `pos`.
pub fn capture_file_name(angle: CameraAngle, pos: Vec2D<i32>) -> String {
    format!("lens{}_{}_{}.png", angle.lens_code(), pos.x(), pos.y())
}

/// Recovers lens and position from a photo file name.
pub fn parse_capture_name(path: &Path) -> Option<(CameraAngle, Vec2D<i32>)> {
    let name = path.file_name()?.to_str()?;
    let caps = CAPTURE_NAME_REGEX.captures(name)?;
    let angle = CameraAngle::from_lens_code(caps.get(1)?.as_str().parse().ok()?)?;
    let x = caps.get(2)?.as_str().parse().ok()?;
    let y = caps.get(3)?.as_str().parse().ok()?;
    Some((angle, Vec2D::new(x, y)))
}

/// Decodes a photo and scales it to the footprint of its lens divided by `scale`.
pub fn load_scaled(
    path: &Path,
    angle: CameraAngle,
    scale: u32,
) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>> {
    let decoded = ImageReader::open(path)?.with_guessed_format()?.decode()?.to_rgb8();
    let side = (angle.footprint() / scale.max(1)).max(1);
    Ok(image::imageops::resize(&decoded, side, side, FilterType::Lanczos3))
}

/// Producer side of the bounded filename queue to the compositor.
///
/// The queue never grows past its capacity: when full, new file names are dropped so
/// navigation is never blocked by compositing.
#[derive(Clone, Debug)]
pub struct ImageSink {
    tx: mpsc::Sender<PathBuf>,
}

impl ImageSink {
    /// Capacity of the filename queue.
    pub const QUEUE_CAPACITY: usize = 40;

    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<PathBuf>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueues `path`; returns `false` if it was dropped.
    pub fn offer(&self, path: PathBuf) -> bool {
        match self.tx.try_send(path) {
            Ok(()) => true,
            Err(TrySendError::Full(path)) => {
                warn!("Compositor queue full, dropping {}", path.display());
                false
            }
            Err(TrySendError::Closed(path)) => {
                error!("Compositor gone, dropping {}", path.display());
                false
            }
        }
    }
}

/// Debug mosaic compositor running on its own OS thread.
pub struct ImageCaptureWorker {
    mosaic_path: PathBuf,
    scale: u32,
    mosaic: RgbImage,
}

impl ImageCaptureWorker {
    /// Map cells per mosaic pixel.
    pub const DEF_SCALE: u32 = 10;

    pub fn new(mosaic_path: PathBuf, scale: u32) -> Self {
        let scale = scale.max(1);
        let mosaic = ImageReader::open(&mosaic_path)
            .ok()
            .and_then(|r| r.decode().ok())
            .map(|img| img.to_rgb8())
            .filter(|img| img.dimensions() == (MAP_WIDTH / scale, MAP_HEIGHT / scale))
            .unwrap_or_else(|| RgbImage::new(MAP_WIDTH / scale, MAP_HEIGHT / scale));
        Self { mosaic_path, scale, mosaic }
    }

    pub fn mosaic(&self) -> &RgbImage { &self.mosaic }

    /// Consumes file names until every sender is dropped.
    pub fn spawn(mut self, mut rx: mpsc::Receiver<PathBuf>) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new().name("compositor".to_string()).spawn(move || {
            while let Some(path) = rx.blocking_recv() {
                if let Err(e) = self.composite(&path) {
                    error!("Could not composite {}: {e}", path.display());
                    continue;
                }
                if let Err(e) = self.mosaic.save(&self.mosaic_path) {
                    error!("Could not write mosaic: {e}");
                }
            }
            info!("Compositor stopped");
        })
    }

    /// Pastes one photo onto the mosaic, centered on its position and clipped at the bounds.
    pub fn composite(&mut self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (angle, pos) = parse_capture_name(path).ok_or("unrecognized capture file name")?;
        let tile = load_scaled(path, angle, self.scale)?;
        let scale = i64::from(self.scale);
        let half = i64::from(tile.width() / 2);
        let x = i64::from(pos.x()) / scale - half;
        let y = i64::from(pos.y()) / scale - half;
        image::imageops::overlay(&mut self.mosaic, &tile, x, y);
        Ok(())
    }
}
