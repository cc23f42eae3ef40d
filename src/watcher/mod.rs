pub mod parser;

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, SystemTime};

use crate::watcher::parser::{diff, parse_snapshot, PageSignal, PageSnapshot};

const POLL_INTERVAL_MS: u64 = 500;
/// Snapshot writers rewrite the file in bursts; wait this long after a
/// modification before reading, so we see the settled version.
const DEBOUNCE_MS: u64 = 150;

/// Default snapshot location: `$PET_HUD_PAGE` or `~/.cache/pet-hud/page.json`.
pub fn default_snapshot_path() -> PathBuf {
    std::env::var("PET_HUD_PAGE")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("pet-hud/page.json")
        })
}

/// Handle to the background page-snapshot watcher thread.
pub struct WatcherHandle {
    receiver: mpsc::Receiver<PageSignal>,
}

impl WatcherHandle {
    /// Spawn a watcher polling `path`. The file may not exist yet; the
    /// watcher keeps polling until it appears. The first successful read
    /// establishes a baseline and fires no signals.
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let poll_interval = Duration::from_millis(POLL_INTERVAL_MS);
            let mut last_mtime: Option<SystemTime> = None;
            let mut snapshot: Option<PageSnapshot> = None;

            loop {
                let mtime = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
                if mtime.is_some() && mtime != last_mtime {
                    thread::sleep(Duration::from_millis(DEBOUNCE_MS));
                    // Re-stat after the debounce so a write landing during
                    // the wait is picked up next poll, not half-read now.
                    last_mtime = std::fs::metadata(&path).and_then(|m| m.modified()).ok();

                    match std::fs::read_to_string(&path) {
                        Ok(content) => match parse_snapshot(&content) {
                            Some(next) => {
                                if let Some(prev) = &snapshot {
                                    for signal in diff(prev, &next) {
                                        if tx.send(signal).is_err() {
                                            return;
                                        }
                                    }
                                }
                                snapshot = Some(next);
                            }
                            None => {
                                eprintln!("[pet-hud] unreadable page snapshot at {path:?}");
                            }
                        },
                        Err(e) => {
                            eprintln!("[pet-hud] cannot read page snapshot {path:?}: {e}");
                        }
                    }
                }

                thread::sleep(poll_interval);
            }
        });

        WatcherHandle { receiver: rx }
    }

    /// Drain all pending signals (non-blocking).
    pub fn drain_signals(&self) -> Vec<PageSignal> {
        let mut signals = Vec::new();
        while let Ok(signal) = self.receiver.try_recv() {
            signals.push(signal);
        }
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_read_is_silent_then_changes_fire() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        std::fs::write(&path, r#"{"url": "https://example.io/", "issue_count": 1}"#).unwrap();

        let watcher = WatcherHandle::spawn(path.clone());
        thread::sleep(Duration::from_millis(900));
        assert!(watcher.drain_signals().is_empty());

        std::fs::write(&path, r#"{"url": "https://example.io/", "issue_count": 4}"#).unwrap();
        thread::sleep(Duration::from_millis(1200));
        let signals = watcher.drain_signals();
        assert!(signals.contains(&PageSignal::ErrorsIncreased { from: 1, to: 4 }));
    }

    #[test]
    fn missing_file_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = WatcherHandle::spawn(dir.path().join("absent.json"));
        thread::sleep(Duration::from_millis(700));
        assert!(watcher.drain_signals().is_empty());
    }
}
