use crate::common::landmark::Point3;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Renderer collaborator: pulls the latest point set on its own schedule.
/// Rendering technology is fully external and swappable.
#[async_trait]
pub trait Renderer: Send {
    async fn render(&mut self, points: &[Point3]);
}

#[derive(Debug, Default)]
struct VizBuffer {
    points: Vec<Point3>,
    paused: bool,
    epoch: u64,
}

/// Latest point set plus the epoch it was written under, as observed by a
/// consumer at one instant.
#[derive(Debug, Clone)]
pub struct VizSnapshot {
    pub points: Vec<Point3>,
    pub epoch: u64,
    pub paused: bool,
}

/// Thread-safe single-slot buffer between the analysis loop (producer) and
/// the render loop (consumer). Latest-write-wins: there is no queue, a new
/// publish overwrites the old points and readers may skip intermediate sets.
/// While paused, publishes are dropped and the pre-pause points stay put.
#[derive(Clone, Default)]
pub struct VisualizationFeed {
    inner: Arc<Mutex<VizBuffer>>,
}

impl VisualizationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&self) -> MutexGuard<'_, VizBuffer> {
        self.inner.lock().expect("visualization buffer lock poisoned")
    }

    /// Producer call; never blocks beyond the buffer swap. No-op while
    /// paused.
    pub fn publish(&self, points: Vec<Point3>) {
        let mut buffer = self.buffer();
        if buffer.paused {
            return;
        }
        buffer.points = points;
        buffer.epoch += 1;
    }

    pub fn pause(&self) {
        self.buffer().paused = true;
        debug!("visualization feed paused");
    }

    pub fn resume(&self) {
        self.buffer().paused = false;
        debug!("visualization feed resumed");
    }

    /// Empties the buffer. Works while paused too; the clear itself counts
    /// as a new observation for consumers.
    pub fn clear(&self) {
        let mut buffer = self.buffer();
        buffer.points.clear();
        buffer.epoch += 1;
    }

    pub fn is_paused(&self) -> bool {
        self.buffer().paused
    }

    pub fn latest(&self) -> VizSnapshot {
        let buffer = self.buffer();
        VizSnapshot {
            points: buffer.points.clone(),
            epoch: buffer.epoch,
            paused: buffer.paused,
        }
    }
}

/// Spawns the render-side consumer on its own fixed tick, independent of the
/// analysis rate. Skips a tick when the buffer is paused, empty, or hasn't
/// advanced past the last rendered epoch; exits after the current iteration
/// once cancelled.
pub fn spawn_render_loop(
    feed: VisualizationFeed,
    mut renderer: Box<dyn Renderer>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        let mut last_epoch = 0u64;
        info!(period_ms = period.as_millis() as u64, "render loop started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let snapshot = feed.latest();
                    if snapshot.paused
                        || snapshot.epoch == last_epoch
                        || snapshot.points.is_empty()
                    {
                        continue;
                    }
                    renderer.render(&snapshot.points).await;
                    last_epoch = snapshot.epoch;
                }
            }
        }
        info!("render loop stopped");
    })
}

/// Renderer that drops every point set; stands in when no display is wired.
pub struct NullRenderer;

#[async_trait]
impl Renderer for NullRenderer {
    async fn render(&mut self, _points: &[Point3]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(v: f32) -> Vec<Point3> {
        vec![Point3::new(v, v, v)]
    }

    #[test]
    fn publish_overwrites_previous_points() {
        let feed = VisualizationFeed::new();
        feed.publish(points(0.1));
        feed.publish(points(0.2));
        let snapshot = feed.latest();
        assert_eq!(snapshot.points, points(0.2));
        assert_eq!(snapshot.epoch, 2);
    }

    #[test]
    fn paused_feed_retains_pre_pause_points() {
        let feed = VisualizationFeed::new();
        feed.publish(points(0.1));
        feed.pause();
        feed.publish(points(0.2));
        feed.publish(points(0.3));
        assert_eq!(feed.latest().points, points(0.1));

        feed.resume();
        feed.publish(points(0.4));
        assert_eq!(feed.latest().points, points(0.4));
    }

    #[test]
    fn clear_empties_and_bumps_epoch() {
        let feed = VisualizationFeed::new();
        feed.publish(points(0.1));
        let before = feed.latest().epoch;
        feed.clear();
        let snapshot = feed.latest();
        assert!(snapshot.points.is_empty());
        assert_eq!(snapshot.epoch, before + 1);
    }

    struct CollectingRenderer {
        rendered: Arc<Mutex<Vec<Vec<Point3>>>>,
    }

    #[async_trait]
    impl Renderer for CollectingRenderer {
        async fn render(&mut self, points: &[Point3]) {
            self.rendered.lock().unwrap().push(points.to_vec());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn render_loop_skips_unchanged_epochs_and_stops_on_cancel() {
        let feed = VisualizationFeed::new();
        let rendered = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();
        let handle = spawn_render_loop(
            feed.clone(),
            Box::new(CollectingRenderer {
                rendered: rendered.clone(),
            }),
            Duration::from_millis(50),
            cancel.clone(),
        );

        feed.publish(points(0.5));
        // Several render ticks pass with a single published epoch.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(rendered.lock().unwrap().len(), 1);

        feed.publish(points(0.6));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rendered.lock().unwrap().len(), 2);
        assert_eq!(rendered.lock().unwrap()[1], points(0.6));

        cancel.cancel();
        handle.await.unwrap();
    }
}
