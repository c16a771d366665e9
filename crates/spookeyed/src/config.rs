use spookeye_core::engine::EngineOptions;
use spookeye_core::ContentSize;
use std::path::PathBuf;
use std::time::Duration;

/// Refresh rates above this are treated as this; the ticker needs a non-zero
/// period.
const MAX_FPS: u32 = 1000;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// Decorative image file (default: images/spooky.png).
    pub image_path: PathBuf,
    /// Optional eye layout TOML replacing the built-in one.
    pub layout_path: Option<PathBuf>,
    /// Initial content box of the overlaid element, until the first resize.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Display refresh rate driving the render loop.
    pub fps: u32,
    /// How long pupils stay in the alert color after a face report.
    pub alert_window_ms: u64,
    /// Where canvas snapshots are written.
    pub snapshot_path: PathBuf,
    /// Frames between periodic snapshots; 0 writes only on shutdown.
    pub snapshot_every: u64,
    /// Draw the debug overlay (tinted background, eye sockets).
    pub debug: bool,
}

impl Config {
    /// Load configuration from `SPOOKEYE_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            image_path: std::env::var("SPOOKEYE_IMAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("images/spooky.png")),
            layout_path: std::env::var("SPOOKEYE_LAYOUT_PATH").ok().map(PathBuf::from),
            canvas_width: env_u32("SPOOKEYE_CANVAS_WIDTH", 640),
            canvas_height: env_u32("SPOOKEYE_CANVAS_HEIGHT", 480),
            fps: env_u32("SPOOKEYE_FPS", 60).clamp(1, MAX_FPS),
            alert_window_ms: env_u64("SPOOKEYE_ALERT_WINDOW_MS", 1000),
            snapshot_path: std::env::var("SPOOKEYE_SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("spookeye.png")),
            snapshot_every: env_u64("SPOOKEYE_SNAPSHOT_EVERY", 30),
            debug: std::env::var("SPOOKEYE_DEBUG")
                .map(|v| v == "1")
                .unwrap_or(false),
        }
    }

    pub fn initial_size(&self) -> ContentSize {
        ContentSize::new(self.canvas_width, self.canvas_height)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.clamp(1, MAX_FPS)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            alert_window: Duration::from_millis(self.alert_window_ms),
            debug: self.debug,
            ..EngineOptions::default()
        }
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_fps(fps: u32) -> Config {
        Config {
            image_path: PathBuf::from("images/spooky.png"),
            layout_path: None,
            canvas_width: 640,
            canvas_height: 480,
            fps,
            alert_window_ms: 1000,
            snapshot_path: PathBuf::from("spookeye.png"),
            snapshot_every: 30,
            debug: false,
        }
    }

    #[test]
    fn test_refresh_interval_at_60_fps() {
        assert_eq!(
            config_with_fps(60).refresh_interval(),
            Duration::from_secs(1) / 60
        );
    }

    #[test]
    fn test_refresh_interval_never_zero() {
        let huge = config_with_fps(2_000_000_000).refresh_interval();
        assert_eq!(huge, Duration::from_millis(1));
        assert_eq!(config_with_fps(0).refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_engine_options_carry_alert_window() {
        let mut config = config_with_fps(60);
        config.alert_window_ms = 250;
        config.debug = true;
        let options = config.engine_options();
        assert_eq!(options.alert_window, Duration::from_millis(250));
        assert!(options.debug);
    }
}
