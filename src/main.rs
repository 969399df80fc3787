mod app;
mod confetti;
mod config;
mod debug;
mod field;
mod frame_loop;
mod glow;
mod pointer;
mod render;
mod resize;
mod spatial;

fn main() {
    env_logger::init();
    log::info!("dotfield starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
