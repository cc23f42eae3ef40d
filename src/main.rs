mod app;
mod assets;
mod bubble;
mod drag;
mod ipc;
mod mood;
mod state;
mod storage;
mod surface;
mod theme;
mod util;
mod views;
mod watcher;

fn main() -> Result<(), iced_layershell::Error> {
    app::run()
}
