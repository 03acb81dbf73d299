use crate::flight_control::CameraAngle;
use crate::util::{MAP_HEIGHT, MAP_WIDTH, Vec2D};
use crate::{fatal, warn};
use bitvec::{bitbox, boxed::BitBox, order::Lsb0, vec::BitVec};
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use std::{
    fmt,
    fs,
    io::{self, Read, Write},
    path::Path,
};
use strum_macros::Display;

/// Errors raised while decoding a persisted coverage map.
#[derive(Debug, Display)]
pub enum MapFileError {
    Io(io::Error),
    Truncated,
    SizeMismatch { expected: usize, found: usize },
}

impl std::error::Error for MapFileError {}

impl From<io::Error> for MapFileError {
    fn from(value: io::Error) -> Self { MapFileError::Io(value) }
}

/// One bit per map cell, set once the cell has been photographed.
///
/// `points_taken` mirrors the number of set bits. It is updated from the bits that actually
/// flip inside each window, so overlapping and clipped windows never let it drift.
#[derive(Clone, PartialEq, Eq)]
pub struct CoverageMap {
    /// The width of the map in cells.
    width: u32,
    /// The height of the map in cells.
    height: u32,
    /// Running set-bit count.
    points_taken: u64,
    /// Row-major bit-packed cells.
    data: BitBox<u8, Lsb0>,
}

impl CoverageMap {
    /// Size of the little-endian file header: width, height, points taken, compressed flag.
    pub const HEADER_LEN: usize = 4 + 4 + 8 + 1;

    /// Creates an empty map of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self { width, height, points_taken: 0, data: bitbox![u8, Lsb0; 0; len] }
    }

    /// Creates an empty map covering the whole toroidal surface.
    pub fn from_map_size() -> Self { Self::new(MAP_WIDTH, MAP_HEIGHT) }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn points_taken(&self) -> u64 { self.points_taken }
    pub fn len(&self) -> usize { self.data.len() }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    fn index(&self, x: u32, y: u32) -> usize { y as usize * self.width as usize + x as usize }

    /// Returns whether cell `(x, y)` is set.
    ///
    /// # Panics
    /// Out-of-bounds access is an invariant violation and aborts via `fatal!`.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            fatal!("Cell ({x}, {y}) out of map bounds {}x{}", self.width, self.height);
        }
        self.data[self.index(x, y)]
    }

    /// Row ranges `[start, end)` of the square window around `(x, y)`, clipped at the bounds.
    #[allow(clippy::cast_sign_loss)]
    fn window_rows(&self, x: i32, y: i32, half: i32) -> Vec<(usize, usize)> {
        let clip = |v: i32, max: u32| v.clamp(0, max.saturating_sub(1).try_into().unwrap_or(i32::MAX));
        let (x_lo, x_hi) = (x.saturating_sub(half), x.saturating_add(half));
        let (y_lo, y_hi) = (y.saturating_sub(half), y.saturating_add(half));
        let width = i32::try_from(self.width).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height).unwrap_or(i32::MAX);
        if x_hi < 0 || y_hi < 0 || x_lo >= width || y_lo >= height || self.is_empty() {
            return Vec::new();
        }
        let (x_min, x_max) = (clip(x_lo, self.width) as u32, clip(x_hi, self.width) as u32);
        let (y_min, y_max) = (clip(y_lo, self.height) as u32, clip(y_hi, self.height) as u32);
        (y_min..=y_max)
            .map(|row| (self.index(x_min, row), self.index(x_max, row) + 1))
            .collect()
    }

    /// Sets or clears the square window a photo with `angle` covers around `(x, y)`.
    ///
    /// The window spans `±radius` inclusive and is clipped, not wrapped, at the map bounds.
    #[allow(clippy::cast_possible_wrap)]
    pub fn update_region(&mut self, x: i32, y: i32, angle: CameraAngle, value: bool) {
        let half = angle.get_square_radius() as i32;
        for (start, end) in self.window_rows(x, y, half) {
            let row = &mut self.data[start..end];
            let before = row.count_ones() as u64;
            row.fill(value);
            let after = if value { (end - start) as u64 } else { 0 };
            self.points_taken = self.points_taken + after - before;
        }
    }

    /// Whether the window of `angle` around `(x, y)` still contains an unset cell.
    #[allow(clippy::cast_possible_wrap)]
    pub fn window_has_unset(&self, x: i32, y: i32, angle: CameraAngle) -> bool {
        let half = angle.get_square_radius() as i32;
        self.window_rows(x, y, half).into_iter().any(|(start, end)| self.data[start..end].not_all())
    }

    /// Fraction of unset cells in the window of side `2·half + 1` around `(x, y)`, sampled
    /// every `stride` cells in both directions.
    #[allow(clippy::cast_precision_loss)]
    pub fn vacant_fraction_around(&self, x: i32, y: i32, half: i32, stride: usize) -> f64 {
        let stride = stride.max(1);
        let (mut total, mut vacant) = (0usize, 0usize);
        for (row_idx, (start, end)) in self.window_rows(x, y, half).into_iter().enumerate() {
            if row_idx % stride != 0 {
                continue;
            }
            for i in (start..end).step_by(stride) {
                total += 1;
                if !self.data[i] {
                    vacant += 1;
                }
            }
        }
        if total == 0 { 0.0 } else { vacant as f64 / total as f64 }
    }

    /// Exact number of set bits.
    pub fn count_ones(&self) -> u64 { self.data.count_ones() as u64 }

    /// Share of photographed cells according to `points_taken`.
    #[allow(clippy::cast_precision_loss)]
    pub fn coverage_fraction(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.points_taken as f64 / self.len() as f64 }
    }

    /// Serializes header and bit data, optionally zlib-compressing the data.
    pub fn encode(&self, compress: bool) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(Self::HEADER_LEN + self.data.as_raw_slice().len());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.points_taken.to_le_bytes());
        out.push(u8::from(compress));
        if compress {
            let mut enc = ZlibEncoder::new(out, Compression::default());
            enc.write_all(self.data.as_raw_slice())?;
            enc.finish()
        } else {
            out.extend_from_slice(self.data.as_raw_slice());
            Ok(out)
        }
    }

    /// Inverse of [`CoverageMap::encode`].
    ///
    /// The stored counter is checked against the exact popcount and replaced on mismatch.
    pub fn decode(bytes: &[u8]) -> Result<Self, MapFileError> {
        if bytes.len() < Self::HEADER_LEN {
            return Err(MapFileError::Truncated);
        }
        let u32_at = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let width = u32_at(0);
        let height = u32_at(4);
        let mut counter = [0u8; 8];
        counter.copy_from_slice(&bytes[8..16]);
        let points_taken = u64::from_le_bytes(counter);
        let compressed = bytes[16] != 0;

        let body = &bytes[Self::HEADER_LEN..];
        let raw = if compressed {
            let mut raw = Vec::new();
            ZlibDecoder::new(body).read_to_end(&mut raw)?;
            raw
        } else {
            body.to_vec()
        };
        let len = width as usize * height as usize;
        let expected = len.div_ceil(8);
        if raw.len() != expected {
            return Err(MapFileError::SizeMismatch { expected, found: raw.len() });
        }
        let mut bits = BitVec::<u8, Lsb0>::from_vec(raw);
        bits.truncate(len);
        let mut map = Self { width, height, points_taken, data: bits.into_boxed_bitslice() };
        let exact = map.count_ones();
        if exact != points_taken {
            warn!("Stored coverage counter {points_taken} differs from popcount {exact}, using popcount");
            map.points_taken = exact;
        }
        Ok(map)
    }

    /// Writes the map to `path` via a temporary file and rename.
    pub fn save(&self, path: &Path, compress: bool) -> io::Result<()> {
        let bytes = self.encode(compress)?;
        let tmp = path.with_extension("tmp");
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)
    }

    pub fn load(path: &Path) -> Result<Self, MapFileError> { Self::decode(&fs::read(path)?) }

    /// Loads the map at `path`, or starts a fresh full-size map if there is none.
    pub fn restore_or_new(path: &Path) -> Self {
        match Self::load(path) {
            Ok(map) if map.width == MAP_WIDTH && map.height == MAP_HEIGHT => map,
            Ok(map) => {
                warn!("Ignoring coverage map of size {}x{} at {}", map.width, map.height, path.display());
                Self::from_map_size()
            }
            Err(MapFileError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::from_map_size(),
            Err(e) => {
                warn!("Could not restore coverage map from {}: {e}, starting empty", path.display());
                Self::from_map_size()
            }
        }
    }

    /// Cell under `pos` as unsigned coordinates.
    #[allow(clippy::cast_sign_loss)]
    pub fn cell_of(pos: Vec2D<f64>) -> (u32, u32) {
        let c = pos.to_cell();
        (c.x() as u32, c.y() as u32)
    }
}

impl fmt::Debug for CoverageMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverageMap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("points_taken", &self.points_taken)
            .finish_non_exhaustive()
    }
}
