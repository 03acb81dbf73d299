use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Lens settings of the onboard camera.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash, EnumIter)]
pub enum CameraAngle {
    Narrow,
    Normal,
    Wide,
}

impl CameraAngle {
    /// Half the side length of the square photographed with this lens.
    pub fn get_square_radius(self) -> u32 {
        match self {
            CameraAngle::Narrow => 300,
            CameraAngle::Normal => 400,
            CameraAngle::Wide => 500,
        }
    }

    /// Full side length of the photographed square.
    pub fn footprint(self) -> u32 { self.get_square_radius() * 2 }

    /// Numeric code embedded in photo file names.
    pub fn lens_code(self) -> u8 {
        match self {
            CameraAngle::Wide => 1,
            CameraAngle::Normal => 8,
            CameraAngle::Narrow => 6,
        }
    }

    /// Inverse of [`CameraAngle::lens_code`].
    pub fn from_lens_code(code: u8) -> Option<Self> { Self::iter().find(|a| a.lens_code() == code) }
}

impl TryFrom<&str> for CameraAngle {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "narrow" => Ok(CameraAngle::Narrow),
            "normal" => Ok(CameraAngle::Normal),
            "wide" => Ok(CameraAngle::Wide),
            other => Err(format!("unknown camera angle '{other}'")),
        }
    }
}

impl From<CameraAngle> for &'static str {
    fn from(value: CameraAngle) -> Self {
        match value {
            CameraAngle::Narrow => "narrow",
            CameraAngle::Normal => "normal",
            CameraAngle::Wide => "wide",
        }
    }
}
