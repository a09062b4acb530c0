//! # Example: taskbar
//!
//! Drive a taskbar-style progress indicator from a few concurrent jobs.
//!
//! Demonstrates how to:
//! - Spawn `TaskJob`s with progress, cancellation and pause controls.
//! - Group jobs into a nested `RegistryJob`.
//! - Observe the registry through `LogWriter` and a synchronous callback.
//! - Watch succeeded jobs remove themselves while a faulted one stays.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► registry + SubscriberSet::attach(registry, [LogWriter])
//!   ├─► register "download" (progress, pausable)
//!   ├─► register "backups" (RegistryJob over two uploads)
//!   ├─► register "scan" (cancellable, fails after cancel)
//!   ├─► pause/resume "download", cancel "scan"
//!   └─► print ProgressIndicator on every OverallStatus/Progress change
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example taskbar --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use jobvisor::{
    Job, JobRegistry, LogWriter, PauseTokenSource, RegistryEventKind, RegistryJob, Subscribe,
    SubscriberSet, TaskError, TaskJob,
};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // 1) Registry plus async observers
    let registry = JobRegistry::new();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::with_registry(registry.clone()))];
    let set = SubscriberSet::attach(&registry, subs);

    // 2) Synchronous observer: redraw the indicator
    let _redraw = {
        let reg = registry.clone();
        registry.subscribe_fn(move |ev| {
            if matches!(
                ev.kind,
                RegistryEventKind::OverallStatusChanged | RegistryEventKind::OverallProgressChanged
            ) {
                let indicator = reg.aggregate().indicator();
                println!("[taskbar] {:?} {:>5.1}%", indicator.state, indicator.value * 100.0);
            }
        })
    };

    // 3) Jobs
    let pause = PauseTokenSource::new();
    let download = TaskJob::builder("download")
        .with_description("fetching release archive")
        .with_progress()
        .with_pausing(pause.clone())
        .spawn(|ctx| async move {
            for step in 1..=10 {
                ctx.pause.wait_while_paused().await;
                tokio::time::sleep(Duration::from_millis(60)).await;
                ctx.progress.report(step as f64 / 10.0);
            }
            Ok(())
        });
    registry.register(download.clone());

    let uploads = JobRegistry::new();
    for name in ["upload-a", "upload-b"] {
        let job = TaskJob::builder(name).with_progress().spawn(|ctx| async move {
            for step in 1..=5 {
                tokio::time::sleep(Duration::from_millis(90)).await;
                ctx.progress.report(step as f64 / 5.0);
            }
            Ok(())
        });
        uploads.register(job);
    }
    let backups = RegistryJob::new(uploads, "backups");
    registry.register(backups.clone());

    let scan = TaskJob::builder("scan")
        .with_cancellation(CancellationToken::new())
        .spawn(|ctx| async move {
            ctx.cancel.cancelled().await;
            Err(TaskError::fail("scan interrupted"))
        });
    registry.register(scan.clone());

    // 4) Drive controls
    tokio::time::sleep(Duration::from_millis(200)).await;
    download.pause()?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    download.resume()?;
    scan.cancel()?;

    download.join().await;
    scan.join().await;
    while registry.contains(backups.id()) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // 5) Only the faulted scan remains
    for job in registry.jobs() {
        println!("[left] {} status={} title={}", job.id(), job.status(), job.title());
    }

    // 6) Deliver what is still queued, then stop the subscribers
    set.shutdown().await;
    Ok(())
}
