use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use crate::{
    bus::Bus,
    hardware::GameVariant,
    interrupt::FrameInterrupt,
    memory_map::Region,
    nvram::{self, NvramError, NvramStatus},
    sound::SoundChip,
};

/// One Cave 68000 board: the bus and every device hanging off it.
///
/// The CPU core is external; it drives [`Bus::read_word`] / [`Bus::write`]
/// and polls [`Bus::irq_level`].
pub struct CaveMachine {
    pub bus: Bus,
    game: GameVariant,
}

impl CaveMachine {
    pub fn new(game: GameVariant) -> Self {
        Self {
            bus: Bus::new(game),
            game,
        }
    }

    #[inline]
    pub fn game(&self) -> GameVariant {
        self.game
    }

    pub fn load_rom(&mut self, data: Vec<u8>) {
        self.bus.load_rom(data);
    }

    pub fn load_rom_file<P: AsRef<Path>>(&mut self, path: P) -> io::Result<()> {
        let data = fs::read(path)?;
        self.bus.load_rom(data);
        Ok(())
    }

    pub fn connect_sound(&mut self, chip: Box<dyn SoundChip>) {
        self.bus.connect_sound(chip);
    }

    /// End-of-frame tick: latch vblank and recompute the IRQ line.
    pub fn frame_tick(&mut self) -> FrameInterrupt {
        self.bus.raise_vblank()
    }

    /// Read the cause register the way the game's vblank handler does,
    /// clearing the vblank flag. Returns the value the handler would see.
    pub fn acknowledge_vblank(&mut self) -> Option<u16> {
        let cause = self
            .bus
            .map()
            .read
            .iter()
            .find(|r| r.region == Region::IrqCause)?;
        Some(self.bus.read_word(cause.start + self.game.vblank_ack_offset()))
    }

    /// Power-cycle the board, keeping the program ROM, EEPROM contents, the
    /// attached sound chip and the host's input port values.
    pub fn reset(&mut self) {
        let rom = self.bus.take_rom();
        let sound = self.bus.take_sound();
        let input = std::mem::take(&mut self.bus.input);
        let mut eeprom = std::mem::take(&mut self.bus.eeprom);
        eeprom.reset_interface();
        self.bus = Bus::new(self.game);
        self.bus.load_rom(rom);
        self.bus.connect_sound(sound);
        self.bus.input = input;
        self.bus.eeprom = eeprom;
    }

    /// `<dir>/<short name>.nv`
    pub fn nvram_path<P: AsRef<Path>>(&self, dir: P) -> PathBuf {
        dir.as_ref()
            .join(self.game.short_name())
            .with_extension("nv")
    }

    /// Restore the EEPROM from `path`. A missing file is not an error.
    pub fn load_nvram_file<P: AsRef<Path>>(&mut self, path: P) -> Result<NvramStatus, NvramError> {
        match File::open(path.as_ref()) {
            Ok(mut file) => nvram::load(&mut self.bus.eeprom, Some(&mut file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                nvram::load::<File>(&mut self.bus.eeprom, None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_nvram_file<P: AsRef<Path>>(&self, path: P) -> Result<(), NvramError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        nvram::save(&self.bus.eeprom, &mut file)
    }
}
