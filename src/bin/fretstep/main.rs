//! fretstep - terminal step sequencer for a virtual fretboard
//!
//! Run with: cargo run -- [song.json]

mod app;
mod ui;

use app::Fretstep;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let song = std::env::args().nth(1);

    Fretstep::new().song(song).run()
}
