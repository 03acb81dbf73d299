use std::{env, path::PathBuf, time::Duration};

/// Runtime configuration shared by the commander and the fallback process.
///
/// Everything is read from the environment once at startup; every wait in the crate takes
/// its poll period from here so tests can run with millisecond polls.
#[derive(Debug, Clone)]
pub struct CommanderConfig {
    /// Base URL of the DRS backend.
    base_url: String,
    /// Directory holding the persisted map, photos and audit logs.
    work_dir: PathBuf,
    /// Poll period of every blocking wait.
    poll: Duration,
    /// Interval of the objective poller.
    obj_poll: Duration,
    /// Whether the coverage map snapshot is zlib compressed.
    compress_map: bool,
    /// Explicit path of the fallback binary, if set.
    fallback_bin: Option<PathBuf>,
}

impl CommanderConfig {
    const DEF_BASE_URL: &'static str = "http://localhost:33000";
    const DEF_POLL_MS: u64 = 500;
    const DEF_OBJ_POLL_SECS: u64 = 5;
    /// File name of the persisted coverage map.
    pub const MAP_FILE: &'static str = "coverage.bmap";
    /// File name of the debug mosaic written by the capture worker.
    pub const MOSAIC_FILE: &'static str = "debug_stitched_map.png";
    /// Directory name for raw photos.
    pub const IMAGE_DIR: &'static str = "images";
    /// Directory name for stitched objective artifacts.
    pub const OBJECTIVE_IMAGE_DIR: &'static str = "objective_images";

    /// Assembles the configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url = env::var("DRS_BASE_URL").unwrap_or_else(|_| Self::DEF_BASE_URL.to_string());
        let work_dir = env::var("MELVIN_WORK_DIR").map_or_else(|_| PathBuf::from("./"), PathBuf::from);
        let poll_ms = Self::env_num("MELVIN_POLL_MS").unwrap_or(Self::DEF_POLL_MS);
        let obj_poll_secs = Self::env_num("MELVIN_OBJ_POLL_SECS").unwrap_or(Self::DEF_OBJ_POLL_SECS);
        let compress_map =
            env::var("MELVIN_MAP_COMPRESS").map_or(true, |v| !matches!(v.as_str(), "0" | "false"));
        let fallback_bin = env::var("MELVIN_FALLBACK_BIN").ok().map(PathBuf::from);
        Self {
            base_url,
            work_dir,
            poll: Duration::from_millis(poll_ms),
            obj_poll: Duration::from_secs(obj_poll_secs),
            compress_map,
            fallback_bin,
        }
    }

    /// Configuration rooted at `work_dir` with explicit poll periods.
    pub fn with_work_dir(work_dir: impl Into<PathBuf>, poll: Duration, obj_poll: Duration) -> Self {
        Self {
            base_url: Self::DEF_BASE_URL.to_string(),
            work_dir: work_dir.into(),
            poll,
            obj_poll,
            compress_map: true,
            fallback_bin: None,
        }
    }

    /// Overrides the fallback binary.
    pub fn with_fallback_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.fallback_bin = Some(bin.into());
        self
    }

    fn env_num(key: &str) -> Option<u64> { env::var(key).ok().and_then(|v| v.parse().ok()) }

    pub fn base_url(&self) -> &str { &self.base_url }
    pub fn work_dir(&self) -> &PathBuf { &self.work_dir }
    pub fn poll(&self) -> Duration { self.poll }
    pub fn obj_poll(&self) -> Duration { self.obj_poll }
    pub fn compress_map(&self) -> bool { self.compress_map }
    pub fn map_path(&self) -> PathBuf { self.work_dir.join(Self::MAP_FILE) }
    pub fn mosaic_path(&self) -> PathBuf { self.work_dir.join(Self::MOSAIC_FILE) }
    pub fn image_dir(&self) -> PathBuf { self.work_dir.join(Self::IMAGE_DIR) }
    pub fn objective_image_dir(&self) -> PathBuf { self.work_dir.join(Self::OBJECTIVE_IMAGE_DIR) }

    /// Path of the fallback binary: the explicit override, or `safety-fallback` next to the
    /// running executable.
    pub fn fallback_bin(&self) -> PathBuf {
        if let Some(bin) = &self.fallback_bin {
            return bin.clone();
        }
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("safety-fallback")))
            .unwrap_or_else(|| PathBuf::from("safety-fallback"))
    }
}
