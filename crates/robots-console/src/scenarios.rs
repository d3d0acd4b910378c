//! The console subcommands

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use robots_log::{LogEntry, LogLevel, LogSource};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::context::AppContext;
use crate::viewer::LogViewer;

/// Append a, b, c, d to a source of capacity 3 and show what is left
pub fn run_demo<W: Write>(out: &mut W) -> anyhow::Result<()> {
    let source: LogSource = LogSource::new(3)?;
    for msg in ["a", "b", "c", "d"] {
        source.append(LogLevel::Debug, msg);
    }

    writeln!(out, "all():")?;
    print_entries(out, &source.all())?;
    writeln!(out, "range(0, 2):")?;
    print_entries(out, &source.range(0, 2))?;
    writeln!(out, "size(): {}", source.size())?;
    Ok(())
}

fn print_entries<W: Write>(out: &mut W, entries: &[Arc<LogEntry>]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "  {entry}")?;
    }
    Ok(())
}

/// Outcome of a stress run
#[derive(Debug, Clone)]
pub struct StressReport {
    pub appended: usize,
    pub retained: usize,
    pub capacity: usize,
    pub notifications: usize,
    pub elapsed: Duration,
}

impl StressReport {
    pub fn per_second(&self) -> f64 {
        self.appended as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }
}

/// Hammer the shared source from `producers` blocking tasks
pub async fn run_stress(ctx: &AppContext, producers: usize, per_producer: usize) -> anyhow::Result<StressReport> {
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    let listener = Arc::new(move || {
        counter.fetch_add(1, Ordering::Relaxed);
    });
    ctx.source().register_listener(&listener);

    info!(producers, per_producer, capacity = ctx.source().capacity(), "Starting stress run");
    let start = Instant::now();

    let mut tasks = JoinSet::new();
    for producer in 0..producers {
        let logger = ctx.logger().clone();
        tasks.spawn_blocking(move || {
            for i in 0..per_producer {
                logger.debug(format!("producer {producer} message {i}"));
            }
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.context("stress producer failed")?;
    }

    let elapsed = start.elapsed();
    ctx.source().unregister_listener(&listener);

    let report = StressReport {
        appended: producers * per_producer,
        retained: ctx.source().size(),
        capacity: ctx.source().capacity(),
        notifications: notifications.load(Ordering::Relaxed),
        elapsed,
    };
    info!(
        appended = report.appended,
        retained = report.retained,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Stress run finished"
    );
    Ok(report)
}

/// Emit entries on a timer while the viewer prints them to stdout
///
/// Returns how many entries the viewer printed.
pub async fn run_watch(ctx: &AppContext, ticks: u32, interval_ms: u64, producers: usize) -> anyhow::Result<usize> {
    let source = Arc::clone(ctx.source());
    let viewer = LogViewer::attach(&source);

    let mut tasks = JoinSet::new();
    for producer in 0..producers {
        let logger = ctx.logger().clone();
        tasks.spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
            for tick in 0..ticks {
                interval.tick().await;
                let level = match tick % 10 {
                    9 => LogLevel::Warn,
                    4 => LogLevel::Debug,
                    _ => LogLevel::Info,
                };
                logger.log(level, format!("robot {producer} tick {tick}"));
            }
            // Bridged through the tracing layer into the same store
            info!(robot = producer, ticks, "Robot finished");
        });
    }

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let finished = tokio::spawn(async move {
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                debug!(error = %e, "Watch producer ended abnormally");
            }
        }
        let _ = shutdown_tx.send(());
    });

    let mut stdout = io::stdout();
    let printed = viewer.run(&source, &mut stdout, shutdown_rx).await?;
    finished.await.context("watch producers failed")?;

    source.unregister_listener(&viewer);
    Ok(printed)
}
