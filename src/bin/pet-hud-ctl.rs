use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process;

fn socket_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("pet-hud.sock")
}

fn valid(cmd: &str) -> bool {
    match cmd {
        "toggle" | "show" | "hide" | "focus" | "snap-edge" | "animations"
        | "reset-position" | "reset-all" => true,
        _ if cmd.starts_with("say ") => !cmd[4..].trim().is_empty(),
        _ if cmd.starts_with("info ") => matches!(cmd[5..].trim(), "1" | "2" | "3"),
        _ if cmd.starts_with("size ") => cmd[5..].trim().parse::<f32>().is_ok(),
        _ if cmd.starts_with("decoration ") => {
            matches!(cmd[11..].trim(), "idle" | "blink" | "bounce" | "sip")
        }
        _ if cmd.starts_with("corner ") => matches!(
            cmd[7..].trim(),
            "top-left" | "top-right" | "bottom-left" | "bottom-right"
        ),
        _ => false,
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
        process::exit(1);
    }

    let cmd = args.join(" ");
    if !valid(&cmd) {
        eprintln!("unknown command: {cmd}");
        usage();
        process::exit(1);
    }

    let path = socket_path();
    let mut stream = match UnixStream::connect(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("pet-hud not running ({path:?}): {e}");
            process::exit(1);
        }
    };

    if let Err(e) = writeln!(stream, "{cmd}") {
        eprintln!("failed to send command: {e}");
        process::exit(1);
    }
}

fn usage() {
    eprintln!("usage: pet-hud-ctl <command>");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  toggle          show/hide the mascot");
    eprintln!("  show            show the mascot");
    eprintln!("  hide            hide the mascot (restore tab remains)");
    eprintln!("  focus           toggle interactive mode");
    eprintln!("  snap-edge       toggle edge snapping");
    eprintln!("  animations      toggle idle animations");
    eprintln!("  reset-position  move the mascot back to its default corner");
    eprintln!("  reset-all       reset every setting to defaults");
    eprintln!("  say <text>      make the mascot say something");
    eprintln!("  info <1|2|3>    show one of the built-in info messages");
    eprintln!("  size <px>       set the mascot size (clamped to 64-128)");
    eprintln!("  decoration <s>  idle decoration: idle, blink, bounce, sip");
    eprintln!("  corner <c>      snap to top-left, top-right, bottom-left, bottom-right");
}
