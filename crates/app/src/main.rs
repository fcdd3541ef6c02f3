//! RegionSnap - capture a screen region selected with a global hotkey

#![windows_subsystem = "windows"]
#![cfg_attr(not(windows), allow(dead_code))]

mod config;
mod hotkey;
mod scheduler;
mod session;

#[cfg(windows)]
mod notify;
#[cfg(windows)]
mod runner;

use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    log::info!("Starting RegionSnap {}", env!("CARGO_PKG_VERSION"));

    #[cfg(windows)]
    {
        runner::run()
    }

    #[cfg(not(windows))]
    {
        log::error!("RegionSnap needs the Win32 desktop and only runs on Windows");
        anyhow::bail!("unsupported platform")
    }
}
