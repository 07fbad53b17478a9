//! flipbook - read page-image documents as a flippable book.
mod cli;

use std::fs::{self, File};

use simplelog::{LevelFilter, WriteLogger};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Logs go to a file: stdout belongs to the terminal UI.
fn init_logging() {
    let Some(dir) = dirs::data_dir().map(|d| d.join("flipbook")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    if let Ok(file) = File::create(dir.join("flipbook.log")) {
        let _ = WriteLogger::init(LevelFilter::Info, simplelog::Config::default(), file);
    }
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().color(true).build())
    }))
    .ok();

    init_logging();
    log::info!("flipbook starting");

    if let Err(err) = cli::app() {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}
