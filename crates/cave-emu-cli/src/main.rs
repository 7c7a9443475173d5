mod config;

use std::path::PathBuf;

use cave_emu_core::hardware::GameVariant;
use cave_emu_core::machine::CaveMachine;
use cave_emu_core::memory_map::AddressRange;
use cave_emu_core::nvram::NvramStatus;
use clap::Parser;
use log::{debug, info, warn};

#[derive(Parser)]
#[command(version, about = "Headless driver for the Cave 68000 board")]
struct Args {
    /// Game to run: dfeveron, ddonpach, esprade, guwange or uopoko
    #[arg(long)]
    game: Option<GameVariant>,

    /// Flat big-endian program ROM image
    #[arg(long)]
    rom: Option<PathBuf>,

    /// Directory holding <game>.nv EEPROM images
    #[arg(long)]
    nvram_dir: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long)]
    frames: Option<usize>,

    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the selected game's address maps and exit
    #[arg(long)]
    dump_map: bool,

    /// Write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,
}

fn print_table(title: &str, ranges: &[AddressRange]) {
    println!("{title}:");
    for range in ranges {
        if range.base != 0 {
            println!(
                "  {:06X}-{:06X}  {:?} (+{:#X})",
                range.start, range.end, range.region, range.base
            );
        } else {
            println!("  {:06X}-{:06X}  {:?}", range.start, range.end, range.region);
        }
    }
}

fn resolve_game(args: &Args, cfg: &config::CliConfig) -> GameVariant {
    if let Some(game) = args.game {
        return game;
    }
    match cfg.game.as_deref().map(str::parse::<GameVariant>) {
        Some(Ok(game)) => game,
        Some(Err(e)) => {
            warn!("{e}; falling back to {}", GameVariant::default());
            GameVariant::default()
        }
        None => GameVariant::default(),
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let mut cfg = config::load_from_file(&config_path);

    let game = resolve_game(&args, &cfg);
    if args.dump_map {
        let map = game.memory_map();
        println!("{} ({})", game.title(), game.short_name());
        print_table("read", map.read);
        print_table("write", map.write);
        return;
    }

    let frames = args.frames.unwrap_or(cfg.frames);
    let nvram_dir = args
        .nvram_dir
        .clone()
        .or_else(|| cfg.nvram_dir.clone())
        .unwrap_or_else(config::default_nvram_dir);

    if args.save_config {
        cfg.game = Some(game.short_name().to_string());
        cfg.frames = frames;
        cfg.nvram_dir = Some(nvram_dir.clone());
        if let Err(e) = config::save_to_file(&config_path, &cfg) {
            eprintln!("Failed to save config {}: {e}", config_path.display());
        }
    }

    println!("Starting {}", game.title());

    let mut machine = CaveMachine::new(game);
    machine.bus.input.set_port(0, cfg.inputs.port0);
    machine.bus.input.set_port(1, cfg.inputs.port1);

    if let Some(path) = &args.rom {
        if let Err(e) = machine.load_rom_file(path) {
            eprintln!("Failed to load ROM: {e}");
            return;
        }
        info!("Loaded {} bytes of program ROM", machine.bus.rom().len());
    }

    let nvram_path = machine.nvram_path(&nvram_dir);
    match machine.load_nvram_file(&nvram_path) {
        Ok(NvramStatus::Restored) => info!("Restored NVRAM from {}", nvram_path.display()),
        Ok(NvramStatus::Blank) => {}
        Err(e) => warn!("{}: {e}", nvram_path.display()),
    }

    let mut tiles = 0usize;
    let mut colours = 0usize;
    for frame in 0..frames {
        let _ = machine.frame_tick();
        let cause = machine.acknowledge_vblank();

        let mut frame_tiles = 0;
        for layer in 0..machine.bus.video.layer_count() {
            frame_tiles += machine.bus.video.take_dirty_tiles(layer).len();
        }
        let frame_colours = machine.bus.video.take_dirty_palette().len();
        debug!(
            "frame {frame}: cause={cause:04X?} tiles={frame_tiles} colours={frame_colours} irq={:?}",
            machine.bus.irq_level()
        );
        tiles += frame_tiles;
        colours += frame_colours;
    }

    if let Err(e) = machine.save_nvram_file(&nvram_path) {
        eprintln!("Failed to save NVRAM: {e}");
    }

    println!(
        "Ran {frames} frames of {}: {tiles} tile updates, {colours} palette updates, NVRAM at {}",
        game.short_name(),
        nvram_path.display()
    );
}
