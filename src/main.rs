use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, warn};

use ff4_sprite_editor::{
    common::CharIdx,
    import::{RomGraphicsChoice, RomImport},
    message::Message,
    persist::{
        export_rom, exported_rom_path, load_global_config, load_preset, load_preset_dir, load_rom,
        load_session, save_global_config, save_preset, save_session,
    },
    preset::Preset,
    preview::{render_all, save_png, PreviewOptions},
    state::{get_global_config_path, CharacterGraphics, Editor, EditorState, GlobalConfig},
    update::update,
};

#[derive(Parser, Debug)]
#[command(about = "Edit FF4 character sprites and palettes")]
struct Args {
    /// Vanilla ROM used as the baseline (overrides the config file)
    #[arg(long, global = true)]
    baseline: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Choice {
    UseRom,
    KeepEditor,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a ROM's character graphics into a session file
    Import {
        rom: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        /// What to do if the ROM's graphics differ from the baseline
        #[arg(long, value_enum, default_value = "use-rom")]
        choice: Choice,
    },
    /// Write a session's graphics into a copy of a ROM
    Export {
        rom: PathBuf,
        session: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render every tilesheet of a session to a PNG
    Preview {
        session: PathBuf,
        out: PathBuf,
        #[arg(long, default_value_t = 3)]
        pixel_size: usize,
        #[arg(long, default_value_t = 0.0)]
        grid_alpha: f32,
    },
    /// Apply a preset (a file, or a name from the preset directory) to one character
    Preset {
        session: PathBuf,
        preset: String,
        #[arg(long)]
        character: CharIdx,
    },
    /// Save one character's changes relative to the baseline as a preset
    CapturePreset {
        session: PathBuf,
        #[arg(long)]
        character: CharIdx,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Store default paths in the config file
    Config {
        #[arg(long)]
        vanilla_rom: Option<PathBuf>,
        #[arg(long)]
        preset_dir: Option<PathBuf>,
        #[arg(long)]
        max_history: Option<usize>,
    },
}

fn baseline_path(args_baseline: &Option<PathBuf>, config: &GlobalConfig) -> Option<PathBuf> {
    args_baseline.clone().or_else(|| config.vanilla_rom.clone())
}

fn load_baseline(path: Option<PathBuf>) -> Result<Vec<CharacterGraphics>> {
    let path = path.context("No baseline ROM given (use --baseline or set vanillaRom in the config)")?;
    load_rom(&path)?.decode()
}

fn find_preset(name: &str, config: &GlobalConfig) -> Result<Preset> {
    let path = Path::new(name);
    if path.exists() {
        return load_preset(path);
    }
    let Some(dir) = &config.preset_dir else {
        bail!("Preset file {} not found and no preset directory is configured", name);
    };
    load_preset_dir(dir)?
        .into_iter()
        .find(|p| p.name == name)
        .with_context(|| format!("No preset named '{}' in {}", name, dir.display()))
}

fn run(args: Args) -> Result<()> {
    let config_path = get_global_config_path()?;
    let mut config = load_global_config(&config_path)?;

    match args.command {
        Command::Import { rom, out, choice } => {
            let out = out.unwrap_or_else(|| rom.with_extension("json"));
            let Some(baseline) = baseline_path(&args.baseline, &config) else {
                warn!("No baseline ROM; using the imported graphics as is");
                let import = RomImport::read(&rom)?;
                return save_session(&out, &import.to_state());
            };
            let vanilla = load_baseline(Some(baseline))?;
            let state = EditorState::from_graphics(vanilla.clone());
            let mut editor = Editor::new(state, config.max_history);
            let import = RomImport::load(&rom, &vanilla)?;
            let choice = match choice {
                Choice::UseRom => RomGraphicsChoice::UseRom,
                Choice::KeepEditor => RomGraphicsChoice::KeepEditor,
            };
            if import.modified {
                info!("Resolving modified graphics with {:?}", choice);
            }
            import.resolve(&mut editor, choice);
            save_session(&out, &editor.state)?;
        }
        Command::Export { rom, session, out } => {
            let state = load_session(&session)?;
            let mut image = load_rom(&rom)?;
            let out = match out {
                Some(p) => p,
                None => exported_rom_path(&rom)?,
            };
            export_rom(&mut image, &state, &out)?;
        }
        Command::Preview {
            session,
            out,
            pixel_size,
            grid_alpha,
        } => {
            let state = load_session(&session)?;
            let opts = PreviewOptions {
                pixel_size: pixel_size.max(1),
                grid_alpha: grid_alpha.clamp(0.0, 1.0),
            };
            save_png(&out, &render_all(&state, &opts))?;
        }
        Command::Preset {
            session,
            preset,
            character,
        } => {
            let preset = find_preset(&preset, &config)?;
            let vanilla = load_baseline(baseline_path(&args.baseline, &config))?;
            let mut editor = Editor::new(EditorState::from_graphics(vanilla), config.max_history);
            editor.load_snapshot(load_session(&session)?);
            update(&mut editor, Message::SelectCharacter(character))?;
            update(&mut editor, Message::ApplyPreset(preset))?;
            save_session(&session, &editor.state)?;
        }
        Command::CapturePreset {
            session,
            character,
            name,
            description,
            out,
        } => {
            let state = load_session(&session)?;
            let vanilla = EditorState::from_graphics(load_baseline(baseline_path(
                &args.baseline,
                &config,
            ))?);
            let preset = Preset::capture(
                &name,
                &description,
                vanilla.character(character)?,
                state.character(character)?,
            );
            info!("Captured {} changed pixels", preset.delta.len());
            save_preset(&out, &preset)?;
        }
        Command::Config {
            vanilla_rom,
            preset_dir,
            max_history,
        } => {
            if let Some(p) = vanilla_rom {
                config.vanilla_rom = Some(p);
                config.modified = true;
            }
            if let Some(p) = preset_dir {
                config.preset_dir = Some(p);
                config.modified = true;
            }
            if let Some(n) = max_history {
                config.max_history = n;
                config.modified = true;
            }
            save_global_config(&config_path, &mut config)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run(Args::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
