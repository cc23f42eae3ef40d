use std::io::BufRead;
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::time::Duration;

use futures::channel::mpsc;

use crate::app::Message;
use crate::state::{AnimationState, Corner};
use crate::storage::Storage;
use crate::watcher::{default_snapshot_path, WatcherHandle};

pub(crate) fn socket_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("pet-hud.sock")
}

/// Parse one control-socket line into a message. Shared with the ctl
/// binary for validation.
pub(crate) fn parse_command(line: &str) -> Option<Message> {
    match line.trim() {
        "toggle" => Some(Message::ToggleVisibility),
        "show" => Some(Message::SetVisibility(true)),
        "hide" => Some(Message::SetVisibility(false)),
        "focus" => Some(Message::ToggleFocus),
        "snap-edge" => Some(Message::ToggleSnapToEdge),
        "animations" => Some(Message::ToggleAnimations),
        "reset-position" => Some(Message::ResetPosition),
        "reset-all" => Some(Message::ResetAll),
        cmd if cmd.starts_with("say ") => {
            let text = cmd[4..].trim();
            if text.is_empty() {
                None
            } else {
                Some(Message::Say(text.to_string()))
            }
        }
        cmd if cmd.starts_with("info ") => match cmd[5..].trim() {
            "1" => Some(Message::Info(0)),
            "2" => Some(Message::Info(1)),
            "3" => Some(Message::Info(2)),
            _ => None,
        },
        cmd if cmd.starts_with("size ") => {
            cmd[5..].trim().parse::<f32>().ok().map(Message::SetSize)
        }
        cmd if cmd.starts_with("decoration ") => {
            parse_decoration(cmd[11..].trim()).map(Message::SetDecoration)
        }
        cmd if cmd.starts_with("corner ") => {
            parse_corner(cmd[7..].trim()).map(Message::SnapCorner)
        }
        _ => None,
    }
}

fn parse_decoration(s: &str) -> Option<AnimationState> {
    match s {
        "idle" => Some(AnimationState::Idle),
        "blink" => Some(AnimationState::Blink),
        "bounce" => Some(AnimationState::Bounce),
        "sip" => Some(AnimationState::Sip),
        _ => None,
    }
}

fn parse_corner(s: &str) -> Option<Corner> {
    match s {
        "top-left" => Some(Corner::TopLeft),
        "top-right" => Some(Corner::TopRight),
        "bottom-left" => Some(Corner::BottomLeft),
        "bottom-right" => Some(Corner::BottomRight),
        _ => None,
    }
}

pub(crate) fn socket_listener() -> impl futures::Stream<Item = Message> {
    let (tx, rx) = mpsc::unbounded();
    std::thread::spawn(move || {
        let path = socket_path();
        let _ = std::fs::remove_file(&path);
        let listener = match UnixListener::bind(&path) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("[pet-hud] failed to bind socket {path:?}: {e}");
                return;
            }
        };
        eprintln!("[pet-hud] listening on {path:?}");
        for stream in listener.incoming().flatten() {
            let mut buf = String::new();
            if std::io::BufReader::new(stream).read_line(&mut buf).is_ok() {
                match parse_command(&buf) {
                    Some(msg) => {
                        if tx.unbounded_send(msg).is_err() {
                            break;
                        }
                    }
                    None => eprintln!("[pet-hud] unknown command: {:?}", buf.trim()),
                }
            }
        }
    });
    rx
}

pub(crate) fn tick_stream(ms: &u64) -> mpsc::UnboundedReceiver<Message> {
    let ms = *ms;
    let (tx, rx) = mpsc::unbounded();
    std::thread::spawn(move || loop {
        std::thread::sleep(Duration::from_millis(ms));
        if tx.unbounded_send(Message::Tick).is_err() {
            break;
        }
    });
    rx
}

// --- Storage change notification bridge ---

/// Poll the shared state file's mtime and emit a message whenever another
/// instance (or the ctl binary) wrote it.
pub(crate) fn storage_change_stream() -> impl futures::Stream<Item = Message> {
    let (tx, rx) = mpsc::unbounded();
    std::thread::spawn(move || {
        let storage = Storage::at_default_path();
        let mut last = storage.mtime();
        loop {
            std::thread::sleep(Duration::from_millis(200));
            let current = storage.mtime();
            if current != last {
                last = current;
                if tx.unbounded_send(Message::StorageChanged).is_err() {
                    return;
                }
            }
        }
    });
    rx
}

// --- Page watcher subscription bridge ---

pub(crate) fn watcher_stream() -> impl futures::Stream<Item = Message> {
    let (tx, rx) = mpsc::unbounded();
    std::thread::spawn(move || {
        let handle = WatcherHandle::spawn(default_snapshot_path());
        loop {
            for signal in handle.drain_signals() {
                if tx.unbounded_send(Message::PageSignal(signal)).is_err() {
                    return;
                }
            }
            std::thread::sleep(Duration::from_millis(100));
        }
    });
    rx
}
