use std::{path::PathBuf, process};

use anyhow::Context;
use clap::Parser;
use octochip::{
    chip8::{ChipSet, Framebuffer, HexDump},
    definitions::{cpu, keyboard},
    devices::{DisplayCommands, KeyboardCommands},
    resources::Rom,
};

#[derive(Parser, Debug)]
#[command(name = "octochip")]
#[command(about = "Runs a chip8 rom headless and prints the final machine state", long_about = None)]
struct Cli {
    /// The rom file to run
    rom: PathBuf,

    /// How many cycles to run at most
    #[arg(long, value_name = "N", default_value_t = cpu::DEFAULT_CYCLES)]
    cycles: u64,

    /// Print the memory dump after the registers
    #[arg(long)]
    dump: bool,
}

/// Only counts the frames.
struct Headless {
    frames: usize,
}

/// No key is ever pressed.
struct NoKeys;

impl DisplayCommands for Headless {
    fn display(&mut self, pixels: &Framebuffer) {
        self.frames += 1;
        let lit = pixels.iter().flatten().filter(|&&p| p == 1).count();
        log::trace!("frame {} with {} pixels lit", self.frames, lit);
    }
}

impl KeyboardCommands for NoKeys {
    fn get_keyboard(&self) -> [bool; keyboard::SIZE] {
        [false; keyboard::SIZE]
    }
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    env_logger::init();

    let rom = Rom::load(&cli.rom)
        .with_context(|| format!("unable to read rom {}", cli.rom.display()))?;

    let mut chip = ChipSet::new();
    chip.load_program(rom.get_data())
        .with_context(|| format!("unable to load rom {}", rom.get_name()))?;

    let mut headless = Headless { frames: 0 };
    let result = octochip::run(&mut chip, &mut headless, &NoKeys, cli.cycles);

    println!("{}", chip.snapshot());
    if cli.dump {
        println!("{}", HexDump(chip.get_memory()));
    }

    result.with_context(|| format!("rom {} failed", rom.get_name()))?;
    log::info!("finished after drawing {} frames", headless.frames);
    Ok(())
}
