use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::error;

use ff4_sprite_editor::persist::{export_rom, exported_rom_path, load_rom, load_session};

#[derive(Parser, Debug)]
#[command(about = "Write a saved session's sprites into a copy of a ROM")]
struct Args {
    /// Source ROM (.smc or .sfc)
    rom: PathBuf,

    /// Session snapshot (.json)
    session: PathBuf,

    /// Output ROM path (default: <stem>_NewSprites.<ext> next to the source)
    #[arg(long)]
    out: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let state = load_session(&args.session)?;
    let mut rom = load_rom(&args.rom)?;
    let out = match args.out {
        Some(p) => p,
        None => exported_rom_path(&args.rom)?,
    };
    export_rom(&mut rom, &state, &out)
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run(Args::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
