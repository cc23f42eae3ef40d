use std::process::Command;

fn main() {
    // PET_HUD_VERSION can be injected by release tooling; falls back to
    // CARGO_PKG_VERSION for local builds.
    let version = std::env::var("PET_HUD_VERSION")
        .unwrap_or_else(|_| std::env::var("CARGO_PKG_VERSION").unwrap_or_default());
    println!("cargo:rustc-env=PET_HUD_VERSION={version}");

    // PET_HUD_COMMIT likewise; falls back to `git rev-parse --short HEAD`.
    let commit = std::env::var("PET_HUD_COMMIT").unwrap_or_else(|_| {
        let output = Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output();
        match output {
            Ok(o) if o.status.success() => {
                String::from_utf8_lossy(&o.stdout).trim().to_string()
            }
            _ => "unknown".to_string(),
        }
    });
    println!("cargo:rustc-env=PET_HUD_COMMIT={commit}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}
