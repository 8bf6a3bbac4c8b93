mod api;
mod audio;
mod capacity;
mod config;
mod jobs;
mod playlist;
mod runtime;
mod session;
mod ui;
mod upload;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
