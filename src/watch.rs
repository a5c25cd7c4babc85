//! Watch mode.
//!
//! Filesystem events from the sectors directory are funnelled through a channel into a single
//! regeneration loop, so two runs never write the output directory at the same time. After
//! the first relevant event the loop waits until the tree has been quiet for the configured
//! debounce window, then runs once. Events that arrive while a run is in progress stay queued
//! and produce exactly one follow-up run.

use crate::config::GenerationConfig;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

/// Path components that never trigger regeneration
const IGNORED_COMPONENTS: &[&str] = &[".git", "node_modules"];

/// Runs `regenerate` once, then again after every relevant change under the sectors root.
///
/// Returns when the watcher's event channel closes. Errors from `regenerate` are its own
/// business; a failed regeneration never stops the loop.
pub fn watch<F>(config: &GenerationConfig, mut regenerate: F) -> Result<()>
where
    F: FnMut(),
{
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    watcher
        .watch(&config.sectors_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", config.sectors_dir.display()))?;

    info!("Watching {} for changes", config.sectors_dir.display());
    regenerate();

    let ignored_roots = vec![config.output_dir.clone()];
    run_loop(&rx, config.watch_debounce, &ignored_roots, regenerate);
    Ok(())
}

fn run_loop<F>(
    rx: &Receiver<notify::Result<Event>>,
    debounce: Duration,
    ignored_roots: &[PathBuf],
    mut regenerate: F,
) where
    F: FnMut(),
{
    while let Ok(event) = rx.recv() {
        match event {
            Ok(event) if is_relevant(&event, ignored_roots) => {
                debug!("Change detected: {:?}", event.paths);
                if !wait_for_quiet(rx, debounce) {
                    break;
                }
                info!("Sources changed, regenerating");
                regenerate();
            }
            Ok(_) => {}
            Err(e) => warn!("watch error: {}", e),
        }
    }
    debug!("Watcher channel closed");
}

/// Drains events until none arrive for `debounce`. Returns `false` once the channel closes.
fn wait_for_quiet<T>(rx: &Receiver<T>, debounce: Duration) -> bool {
    loop {
        match rx.recv_timeout(debounce) {
            Ok(_) => continue,
            Err(RecvTimeoutError::Timeout) => return true,
            Err(RecvTimeoutError::Disconnected) => return false,
        }
    }
}

/// Whether an event touches a source path that should trigger regeneration.
fn is_relevant(event: &Event, ignored_roots: &[PathBuf]) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|path| !is_ignored(path, ignored_roots))
}

fn is_ignored(path: &Path, ignored_roots: &[PathBuf]) -> bool {
    let in_ignored_dir = path.components().any(|c| {
        let name = c.as_os_str().to_string_lossy();
        IGNORED_COMPONENTS.contains(&name.as_ref())
    });
    in_ignored_dir || ignored_roots.iter().any(|root| path.starts_with(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, ModifyKind};
    use std::thread;

    fn modify(path: &str) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_is_relevant_filters_ignored_paths() {
        let roots = vec![PathBuf::from("/app/src/sectors/generated")];

        assert!(is_relevant(&modify("/app/src/sectors/user/router.ts"), &roots));
        assert!(!is_relevant(&modify("/app/src/sectors/.git/index"), &roots));
        assert!(!is_relevant(
            &modify("/app/src/sectors/user/node_modules/zod/index.js"),
            &roots
        ));
        assert!(!is_relevant(
            &modify("/app/src/sectors/generated/router.ts"),
            &roots
        ));

        let access = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/app/src/sectors/user/router.ts"));
        assert!(!is_relevant(&access, &roots));
    }

    #[test]
    fn test_wait_for_quiet_drains_burst() {
        let (tx, rx) = mpsc::channel();
        for i in 0..5 {
            tx.send(i).unwrap();
        }

        assert!(wait_for_quiet(&rx, Duration::from_millis(20)));
        assert!(rx.try_recv().is_err());

        drop(tx);
        assert!(!wait_for_quiet(&rx, Duration::from_millis(20)));
    }

    #[test]
    fn test_run_loop_stops_when_channel_closes() {
        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let producer = thread::spawn(move || {
            for _ in 0..10 {
                tx.send(Ok(modify("/app/src/sectors/user/router.ts"))).unwrap();
            }
            tx.send(Ok(modify("/app/src/sectors/.git/HEAD"))).unwrap();
            // dropping tx ends the loop
        });
        producer.join().unwrap();

        let mut runs = 0;
        run_loop(&rx, Duration::from_millis(10), &[], || runs += 1);
        assert_eq!(runs, 0, "a burst cut off by the channel closing is not regenerated");
    }

    #[test]
    fn test_run_loop_runs_once_per_quiet_period() {
        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let producer = thread::spawn(move || {
            for _ in 0..3 {
                tx.send(Ok(modify("/app/src/sectors/user/router.ts"))).unwrap();
            }
            thread::sleep(Duration::from_millis(200));
            tx.send(Ok(modify("/app/src/sectors/project/router.ts"))).unwrap();
            thread::sleep(Duration::from_millis(200));
        });

        let mut runs = 0;
        run_loop(&rx, Duration::from_millis(50), &[], || runs += 1);
        producer.join().unwrap();
        assert_eq!(runs, 2);
    }
}
