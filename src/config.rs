use {
    serde::{Deserialize, Serialize},
    std::{fs, path::PathBuf, time::Duration},
};

/// Resampling filter used when fitting page images into the book frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScalingFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ScalingFilter> for image::imageops::FilterType {
    fn from(filter: ScalingFilter) -> Self {
        match filter {
            ScalingFilter::Nearest => Self::Nearest,
            ScalingFilter::Triangle => Self::Triangle,
            ScalingFilter::CatmullRom => Self::CatmullRom,
            ScalingFilter::Gaussian => Self::Gaussian,
            ScalingFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub autoplay_interval_ms: u64,
    pub flip_duration_ms: u64,
    pub scaling_filter: ScalingFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autoplay_interval_ms: 4000,
            flip_duration_ms: 280,
            scaling_filter: ScalingFilter::Lanczos3,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flipbook").join("config.toml"))
}

impl Settings {
    /// Loads settings from the user config file, falling back to
    /// defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Replaces out-of-range values with defaults. The autoplay
    /// interval must be strictly positive.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.autoplay_interval_ms == 0 {
            log::warn!("autoplay interval of 0 ms replaced with default");
            self.autoplay_interval_ms = defaults.autoplay_interval_ms;
        }
        if self.flip_duration_ms == 0 {
            self.flip_duration_ms = defaults.flip_duration_ms;
        }
        self
    }

    pub fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.autoplay_interval_ms)
    }

    pub fn flip_duration(&self) -> Duration {
        Duration::from_millis(self.flip_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, assert2::check as assert};

    #[test]
    fn test_defaults_are_sane() {
        let settings = Settings::default();
        assert!(settings.autoplay_interval_ms > 0);
        assert!(settings.flip_duration_ms > 0);
    }

    #[test]
    fn test_sanitized_rejects_zero_interval() {
        let settings = Settings {
            autoplay_interval_ms: 0,
            ..Settings::default()
        }
        .sanitized();
        assert!(settings.autoplay_interval_ms == Settings::default().autoplay_interval_ms);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let settings: Settings = toml::from_str("autoplay_interval_ms = 1500\n").unwrap();
        assert!(settings.autoplay_interval_ms == 1500);
        assert!(settings.flip_duration_ms == Settings::default().flip_duration_ms);
    }

    #[test]
    fn test_filter_roundtrip() {
        let settings = Settings {
            scaling_filter: ScalingFilter::CatmullRom,
            ..Settings::default()
        };
        let serialized = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&serialized).unwrap();
        assert!(parsed.scaling_filter == ScalingFilter::CatmullRom);
    }
}
