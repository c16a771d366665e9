use spookeye_core::{
    ContentSize, DecorativeImage, Engine, EyePair, FaceReport, Point, ResizeSource, SurfaceError,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("snapshot failed: {0}")]
    Snapshot(#[from] SurfaceError),
    #[error("render loop exited")]
    ChannelClosed,
}

/// Point-in-time view of the engine, for diagnostics.
#[derive(Debug, Clone)]
pub struct LoopStatus {
    pub frames: u64,
    pub image_ready: bool,
    pub eyes: Option<EyePair>,
    pub tracked_point: Option<Point>,
    pub alert: bool,
}

/// Messages sent from input readers to the render loop.
enum LoopRequest {
    Face(Box<FaceReport>),
    Resize {
        source: ResizeSource,
        size: ContentSize,
    },
    ImageReady(DecorativeImage),
    Snapshot {
        path: PathBuf,
        reply: oneshot::Sender<Result<(), SurfaceError>>,
    },
    Status {
        reply: oneshot::Sender<LoopStatus>,
    },
}

/// Clone-safe handle to the render loop.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<LoopRequest>,
}

impl EngineHandle {
    async fn send(&self, req: LoopRequest) -> Result<(), DaemonError> {
        self.tx.send(req).await.map_err(|_| DaemonError::ChannelClosed)
    }

    /// Forward one detected face.
    pub async fn report_face(&self, report: FaceReport) -> Result<(), DaemonError> {
        self.send(LoopRequest::Face(Box::new(report))).await
    }

    /// The overlaid element or the window changed size.
    pub async fn resize(&self, source: ResizeSource, size: ContentSize) -> Result<(), DaemonError> {
        self.send(LoopRequest::Resize { source, size }).await
    }

    /// Hand over the decoded decorative image.
    pub async fn image_ready(&self, image: DecorativeImage) -> Result<(), DaemonError> {
        self.send(LoopRequest::ImageReady(image)).await
    }

    /// Write the current canvas to `path` as PNG.
    pub async fn snapshot(&self, path: PathBuf) -> Result<(), DaemonError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LoopRequest::Snapshot {
            path,
            reply: reply_tx,
        })
        .await?;
        Ok(reply_rx.await.map_err(|_| DaemonError::ChannelClosed)??)
    }

    pub async fn status(&self) -> Result<LoopStatus, DaemonError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LoopRequest::Status { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| DaemonError::ChannelClosed)
    }
}

/// Periodic snapshot settings.
#[derive(Debug, Clone)]
pub struct SnapshotPolicy {
    pub path: PathBuf,
    /// Frames between snapshots; 0 disables.
    pub every: u64,
}

/// The display-refresh driven loop. Owns the engine; all mutation happens on
/// the loop thread, so reports and frames never race.
pub struct RenderLoop {
    engine: Engine,
    rx: mpsc::Receiver<LoopRequest>,
    refresh: Duration,
    snapshots: SnapshotPolicy,
}

impl RenderLoop {
    pub fn new(
        engine: Engine,
        refresh: Duration,
        snapshots: SnapshotPolicy,
    ) -> (Self, EngineHandle) {
        let (tx, rx) = mpsc::channel(64);
        let render_loop = Self {
            engine,
            rx,
            refresh,
            snapshots,
        };
        (render_loop, EngineHandle { tx })
    }

    /// Start ticking on a dedicated OS thread. Consumes the loop, so it can
    /// only be started once.
    ///
    /// Drawing and PNG encoding are blocking, so they stay off the shared
    /// runtime workers serving stdin and signals. The thread drives its own
    /// single-threaded runtime for the refresh ticker and exits once every
    /// [`EngineHandle`] is dropped.
    pub fn start(self) -> std::io::Result<std::thread::JoinHandle<()>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        std::thread::Builder::new()
            .name("spookeye-render".into())
            .spawn(move || {
                runtime.block_on(self.run());
                tracing::info!("render loop exiting");
            })
    }

    async fn run(mut self) {
        tracing::info!(refresh_ms = self.refresh.as_millis() as u64, "render loop started");

        let mut ticker = tokio::time::interval(self.refresh);
        // One frame in flight: a late tick is dropped, not queued.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = Instant::now();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let elapsed = now.saturating_duration_since(last);
                    last = now;
                    self.engine.frame(now, elapsed);
                    self.periodic_snapshot();
                }
                req = self.rx.recv() => match req {
                    Some(req) => self.handle(req),
                    None => break,
                },
            }
        }
    }

    fn handle(&mut self, req: LoopRequest) {
        let now = Instant::now();
        match req {
            LoopRequest::Face(report) => {
                self.engine.report(&report, now);
            }
            LoopRequest::Resize { source, size } => {
                self.engine.resize(source, &size, now);
            }
            LoopRequest::ImageReady(image) => {
                self.engine.set_image(image, now);
            }
            LoopRequest::Snapshot { path, reply } => {
                let result = self.engine.canvas().surface().save_png(&path);
                if result.is_ok() {
                    tracing::info!(path = %path.display(), "snapshot written");
                }
                let _ = reply.send(result);
            }
            LoopRequest::Status { reply } => {
                let _ = reply.send(LoopStatus {
                    frames: self.engine.frames(),
                    image_ready: self.engine.image_ready(),
                    eyes: self.engine.eyes().copied(),
                    tracked_point: self.engine.tracked_point(),
                    alert: self.engine.is_alert(now),
                });
            }
        }
    }

    fn periodic_snapshot(&self) {
        let every = self.snapshots.every;
        if every == 0 || self.engine.frames() % every != 0 {
            return;
        }
        if let Err(e) = self.engine.canvas().surface().save_png(&self.snapshots.path) {
            tracing::warn!(error = %e, "periodic snapshot failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use spookeye_core::face::LANDMARK_COUNT;
    use spookeye_core::{EngineOptions, EyeLayout, ExpressionScores, FaceLandmarks, Rect};

    fn spawn(size: ContentSize) -> EngineHandle {
        let engine = Engine::raster(EyeLayout::default(), EngineOptions::default(), &size);
        let snapshots = SnapshotPolicy {
            path: PathBuf::new(),
            every: 0,
        };
        let (render_loop, handle) = RenderLoop::new(engine, Duration::from_millis(2), snapshots);
        render_loop.start().unwrap();
        handle
    }

    fn face_at(p: Point) -> FaceReport {
        FaceReport {
            bounds: Rect::default(),
            landmarks: FaceLandmarks::new(vec![p; LANDMARK_COUNT]).unwrap(),
            expressions: ExpressionScores::default(),
        }
    }

    fn image_400x300() -> DecorativeImage {
        DecorativeImage::new(RgbaImage::from_pixel(400, 300, Rgba([255, 255, 255, 255]))).unwrap()
    }

    #[tokio::test]
    async fn test_loop_ticks_without_image() {
        let handle = spawn(ContentSize::new(800, 600));
        tokio::time::sleep(Duration::from_millis(30)).await;
        let status = handle.status().await.unwrap();
        assert!(status.frames > 0);
        assert!(!status.image_ready);
        assert!(status.eyes.is_none());
        assert!(!status.alert);
    }

    #[tokio::test]
    async fn test_image_ready_places_eyes() {
        let handle = spawn(ContentSize::new(800, 600));
        handle.image_ready(image_400x300()).await.unwrap();
        let status = handle.status().await.unwrap();
        assert!(status.image_ready);
        let left = status.eyes.unwrap().left;
        assert!((left.radius - 60.0).abs() < 1e-9);
        // At rest or one jitter step away from it.
        assert!(left.center.distance(&Point::new(70.0, 30.0)) <= 1.0 + 1e-9);
    }

    #[tokio::test]
    async fn test_face_report_sets_alert() {
        let handle = spawn(ContentSize::new(800, 600));
        handle.report_face(face_at(Point::new(10.0, 20.0))).await.unwrap();
        let status = handle.status().await.unwrap();
        assert_eq!(status.tracked_point, Some(Point::new(10.0, 20.0)));
        assert!(status.alert);
    }

    #[tokio::test]
    async fn test_resize_rescales_eyes() {
        let handle = spawn(ContentSize::new(800, 600));
        handle.image_ready(image_400x300()).await.unwrap();
        handle
            .resize(ResizeSource::Window, ContentSize::new(400, 300))
            .await
            .unwrap();
        let status = handle.status().await.unwrap();
        assert!((status.eyes.unwrap().left.radius - 30.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_loop_runs_on_its_own_thread_and_exits_when_handles_drop() {
        let engine = Engine::raster(
            EyeLayout::default(),
            EngineOptions::default(),
            &ContentSize::new(32, 32),
        );
        let snapshots = SnapshotPolicy {
            path: PathBuf::new(),
            every: 0,
        };
        let (render_loop, handle) = RenderLoop::new(engine, Duration::from_millis(2), snapshots);
        let thread = render_loop.start().unwrap();
        assert_eq!(thread.thread().name(), Some("spookeye-render"));

        assert!(handle.status().await.is_ok());
        drop(handle);
        tokio::task::spawn_blocking(move || thread.join())
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_writes_png() {
        let handle = spawn(ContentSize::new(64, 48));
        let path = std::env::temp_dir().join(format!("spookeyed-loop-{}.png", std::process::id()));
        handle.snapshot(path.clone()).await.unwrap();
        let img = image::open(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[tokio::test]
    async fn test_snapshot_to_bad_path_fails() {
        let handle = spawn(ContentSize::new(8, 8));
        let err = handle
            .snapshot(PathBuf::from("/nonexistent/dir/out.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DaemonError::Snapshot(_)));
    }
}
