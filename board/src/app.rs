use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::{LatestSource, Snapshot};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::board::{Board, BoardSettings, UpdateOutcome};
use crate::config::Config;
use crate::scheduler::{Scheduler, Tick};
use crate::view::TerminalView;

const FETCH_CHANNEL_CAPACITY: usize = 16;

/// A finished fetch, tagged with the order it was issued in.
#[derive(Debug)]
pub struct Fetched {
    pub seq: u64,
    pub result: Result<Snapshot>,
}

/// One chart frame in flight at a time. Ticks that arrive while a frame is
/// still rendering are dropped.
#[derive(Debug, Clone, Default)]
struct FrameSlot {
    busy: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
}

impl FrameSlot {
    fn try_claim(&self) -> bool {
        !self.busy.swap(true, Ordering::AcqRel)
    }

    fn release(&self, result: Result<()>) {
        match result {
            Ok(()) => self.failed.store(false, Ordering::Release),
            // Frames repeat every few hundred ms, report a failure streak once.
            Err(e) => {
                if !self.failed.swap(true, Ordering::AcqRel) {
                    log::warn!("Failed to write chart frame: {e:#}");
                }
            }
        }
        self.busy.store(false, Ordering::Release);
    }
}

pub struct App {
    config: Config,
    source: LatestSource,
    board: Board,
    view: TerminalView,
    font_data: Option<Vec<u8>>,
    rng: StdRng,
    next_seq: u64,
    applied_seq: u64,
    frames: FrameSlot,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let source = LatestSource::with_timeout(&config.api_url, config.request_timeout)?;
        let font_data = match &config.chart_font_path {
            Some(path) => Some(
                std::fs::read(path)
                    .with_context(|| format!("Failed to read font {}", path.display()))?,
            ),
            None => None,
        };
        let board = Board::init(BoardSettings {
            chart_window: config.chart_window,
            history: config.history,
            timezone: config.timezone,
        });

        Ok(App {
            config,
            source,
            board,
            view: TerminalView::new(),
            font_data,
            rng: StdRng::from_os_rng(),
            next_seq: 0,
            applied_seq: 0,
            frames: FrameSlot::default(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Runs until Ctrl-C.
    pub async fn run(mut self) -> Result<()> {
        let (tx, mut rx) = mpsc::channel::<Fetched>(FETCH_CHANNEL_CAPACITY);
        let frame = self.config.chart_output.as_ref().map(|_| self.config.frame_interval);
        let mut scheduler = Scheduler::new(
            self.config.refresh_interval,
            self.config.clock_interval,
            frame,
            self.config.timezone,
        );
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        log::info!(
            "Polling {} every {:?}, display timezone {}",
            self.source.url(),
            self.config.refresh_interval,
            self.config.timezone
        );

        loop {
            tokio::select! {
                tick = scheduler.next() => self.on_tick(tick, &tx),
                Some(fetched) = rx.recv() => {
                    self.on_fetched(fetched, Utc::now());
                }
                result = &mut shutdown => {
                    result.context("Failed to listen for Ctrl-C")?;
                    log::info!("Shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    fn on_tick(&mut self, tick: Tick, tx: &mpsc::Sender<Fetched>) {
        match tick {
            Tick::Data => self.spawn_fetch(tx),
            Tick::HourRollover => {
                log::info!("New hour, refreshing out of cycle");
                self.spawn_fetch(tx);
            }
            Tick::Clock => {
                self.board.set_clock(Utc::now());
                self.redraw();
            }
            Tick::Frame => {
                self.write_frame(Utc::now());
            }
        }
    }

    fn spawn_fetch(&mut self, tx: &mpsc::Sender<Fetched>) {
        self.next_seq += 1;
        let seq = self.next_seq;
        let source = self.source.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            let result = source.fetch().await;
            // The receiver only goes away on shutdown.
            let _ = tx.send(Fetched { seq, result }).await;
        });
    }

    /// Applies a fetch result unless a newer one has already been applied.
    /// Returns `None` for stale or failed fetches.
    pub fn on_fetched(&mut self, fetched: Fetched, now: DateTime<Utc>) -> Option<UpdateOutcome> {
        let Fetched { seq, result } = fetched;
        if seq <= self.applied_seq {
            log::debug!("Dropping stale response #{seq}, already showing #{}", self.applied_seq);
            return None;
        }

        match result {
            Ok(snapshot) => {
                let outcome = self.board.update(&snapshot, now);
                match outcome {
                    UpdateOutcome::Applied => {
                        self.applied_seq = seq;
                        log::debug!("Applied response #{seq}");
                        self.redraw();
                    }
                    UpdateOutcome::Skipped => {
                        log::debug!("Response #{seq} has no price, keeping previous board");
                    }
                }
                Some(outcome)
            }
            Err(e) => {
                log::warn!("Fetch #{seq} failed: {e:#}");
                None
            }
        }
    }

    fn redraw(&self) {
        if let Err(e) = self.view.draw(&self.board) {
            log::warn!("{e:#}");
        }
    }

    /// Renders and writes the chart on the blocking pool. `None` when there
    /// is nothing to draw or the previous frame is still being written.
    fn write_frame(&mut self, now: DateTime<Utc>) -> Option<JoinHandle<()>> {
        let path = self.config.chart_output.clone()?;
        let view = self.board.chart().filter(|view| !view.is_empty())?;
        if !self.frames.try_claim() {
            return None;
        }

        let mut chart = view.frame(self.config.timezone, now.timestamp_millis(), &mut self.rng);
        if let Some(font_data) = &self.font_data {
            chart = chart.with_font_data(font_data.clone());
        }

        let frames = self.frames.clone();
        Some(tokio::task::spawn_blocking(move || {
            let result = chart.build().and_then(|png| write_atomically(&path, &png));
            frames.release(result);
        }))
    }
}

/// Readers of `path` never see a half written file.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = PathBuf::from(path);
    tmp.as_mut_os_string().push(".tmp");

    std::fs::write(&tmp, bytes).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move frame into {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementId;
    use anyhow::anyhow;
    use std::collections::HashMap;

    fn app() -> App {
        let env: HashMap<&str, &str> = HashMap::from([("LATEST_API_URL", "http://127.0.0.1:9/")]);
        let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
        App::new(config).unwrap()
    }

    fn priced(price: f64) -> Snapshot {
        Snapshot {
            price: Some(price),
            ..Default::default()
        }
    }

    #[test]
    fn test_out_of_order_responses() {
        let mut app = app();
        let now = Utc::now();

        let newer = Fetched { seq: 2, result: Ok(priced(2050.0)) };
        let older = Fetched { seq: 1, result: Ok(priced(2000.0)) };

        assert_eq!(app.on_fetched(newer, now), Some(UpdateOutcome::Applied));
        assert_eq!(app.on_fetched(older, now), None);
        assert_eq!(app.board().text(ElementId::CurrentPrice), "$2050.00");
    }

    #[test]
    fn test_failed_fetch_keeps_board() {
        let mut app = app();
        let now = Utc::now();

        app.on_fetched(Fetched { seq: 1, result: Ok(priced(2000.0)) }, now);
        let failed = Fetched {
            seq: 2,
            result: Err(anyhow!("Request failed with status: 500")),
        };
        assert_eq!(app.on_fetched(failed, now), None);
        assert_eq!(app.board().text(ElementId::CurrentPrice), "$2000.00");

        // A failure does not block the older in-flight response either.
        assert_eq!(app.applied_seq, 1);
    }

    #[test]
    fn test_skipped_snapshot_does_not_advance() {
        let mut app = app();
        let now = Utc::now();

        let empty = Fetched { seq: 3, result: Ok(Snapshot::default()) };
        assert_eq!(app.on_fetched(empty, now), Some(UpdateOutcome::Skipped));
        assert_eq!(app.applied_seq, 0);

        let older = Fetched { seq: 2, result: Ok(priced(1990.0)) };
        assert_eq!(app.on_fetched(older, now), Some(UpdateOutcome::Applied));
    }

    #[test]
    fn test_write_atomically() {
        let dir = std::env::temp_dir().join(format!("board-frame-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("live.png");

        write_atomically(&path, b"first").unwrap();
        write_atomically(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(!dir.join("live.png.tmp").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_frames_skip_while_busy() {
        let dir = std::env::temp_dir().join(format!("board-busy-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("live.png");

        let mut app = app();
        app.config.chart_output = Some(path.clone());
        let labels: Vec<f64> = (0..4).map(|i| 1_710_064_800.0 + i as f64 * 3600.0).collect();
        let snapshot = Snapshot {
            price: Some(2030.0),
            chart: Some(common::ChartSeries {
                labels,
                prices: vec![Some(2000.0), Some(2010.0), Some(2030.0), None],
                prediction_point: vec![Some(2001.0), Some(2012.0), Some(2028.0), Some(2040.0)],
                ..Default::default()
            }),
            ..Default::default()
        };
        app.on_fetched(Fetched { seq: 1, result: Ok(snapshot) }, Utc::now());

        assert!(app.frames.try_claim());
        assert!(app.write_frame(Utc::now()).is_none());
        assert!(!path.exists());

        app.frames.release(Ok(()));
        app.write_frame(Utc::now()).unwrap().await.unwrap();

        let png = std::fs::read(&path).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert!(app.frames.try_claim());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_no_frame_without_chart() {
        let mut app = app();
        app.config.chart_output = Some(std::env::temp_dir().join("board-never.png"));

        assert!(app.write_frame(Utc::now()).is_none());
        assert!(app.frames.try_claim());
    }

    #[test]
    fn test_missing_font_is_startup_error() {
        let config = Config {
            chart_font_path: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..Config::from_lookup(|_| None).unwrap()
        };
        assert!(App::new(config).is_err());
    }
}
