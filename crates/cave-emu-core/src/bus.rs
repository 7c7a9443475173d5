use crate::{
    eeprom::Eeprom93C46,
    hardware::GameVariant,
    input::InputPorts,
    interrupt::{FrameInterrupt, InterruptController},
    memory_map::{AddressRange, MemoryMap, Region},
    sound::{self, NullSoundChip, SoundChip},
    video::VideoMemory,
};

/// The 68000 drives 24 address lines.
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// Byte-lane mask in the upper half of a bus write: the even (high) byte is
/// left untouched.
pub const KEEP_EVEN_BYTE: u32 = 0xFF00_0000;
/// Byte-lane mask in the upper half of a bus write: the odd (low) byte is
/// left untouched.
pub const KEEP_ODD_BYTE: u32 = 0x00FF_0000;

/// Merge a bus write into a stored word.
///
/// The low 16 bits of `data` are the value; the high 16 bits mask the bits of
/// `old` that the access leaves alone.
#[inline]
pub fn combine_word(old: u16, data: u32) -> u16 {
    let keep = (data >> 16) as u16;
    (old & keep) | (data as u16 & !keep)
}

/// Address decoder and owner of every device on the board.
pub struct Bus {
    game: GameVariant,
    map: MemoryMap,
    rom: Vec<u8>,
    pub work_ram: Vec<u16>,
    pub scratch_ram: Vec<u16>,
    pub video: VideoMemory,
    pub interrupts: InterruptController,
    pub eeprom: Eeprom93C46,
    pub input: InputPorts,
    sound: Box<dyn SoundChip>,
}

impl Bus {
    pub fn new(game: GameVariant) -> Self {
        let map = game.memory_map();
        Self {
            game,
            map,
            rom: Vec::new(),
            work_ram: vec![0; map.backing_size(Region::WorkRam) / 2],
            scratch_ram: vec![0; map.backing_size(Region::ScratchRam) / 2],
            video: VideoMemory::new(game),
            interrupts: InterruptController::new(game.irq_protocol()),
            eeprom: Eeprom93C46::new(),
            input: InputPorts::new(),
            sound: Box::new(NullSoundChip),
        }
    }

    #[inline]
    pub fn game(&self) -> GameVariant {
        self.game
    }

    #[inline]
    pub fn map(&self) -> &MemoryMap {
        &self.map
    }

    /// Install the program ROM image (big-endian, as the CPU sees it).
    pub fn load_rom(&mut self, data: Vec<u8>) {
        let limit = self.map.backing_size(Region::Rom);
        if data.len() > limit {
            log::warn!(
                "Program ROM is {} bytes; only the first {limit} are mapped",
                data.len()
            );
        }
        self.rom = data;
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    pub(crate) fn take_rom(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.rom)
    }

    pub fn connect_sound(&mut self, chip: Box<dyn SoundChip>) {
        self.sound = chip;
    }

    /// Detach the sound chip, leaving a [`NullSoundChip`] in its place.
    pub(crate) fn take_sound(&mut self) -> Box<dyn SoundChip> {
        std::mem::replace(&mut self.sound, Box::new(NullSoundChip))
    }

    /// Sound chip IRQ output changed.
    pub fn set_sound_irq(&mut self, active: bool) {
        self.interrupts.set_sound_irq(active);
    }

    /// Once-per-frame vblank tick.
    pub fn raise_vblank(&mut self) -> FrameInterrupt {
        self.interrupts.raise_vblank()
    }

    /// Interrupt level currently requested from the CPU.
    #[inline]
    pub fn irq_level(&self) -> Option<u8> {
        self.interrupts.irq_level()
    }

    pub fn read_word(&mut self, addr: u32) -> u16 {
        let addr = addr & ADDRESS_MASK & !1;
        let Some(range) = self.map.find_read(addr) else {
            log::trace!("unmapped read {addr:06X}");
            return 0;
        };
        self.read_region(range, addr)
    }

    pub fn read_byte(&mut self, addr: u32) -> u8 {
        let word = self.read_word(addr);
        if addr & 1 == 0 {
            (word >> 8) as u8
        } else {
            word as u8
        }
    }

    fn read_region(&mut self, range: &AddressRange, addr: u32) -> u16 {
        let offset = range.offset(addr);
        match range.region {
            Region::Rom => {
                let i = offset as usize;
                let hi = self.rom.get(i).copied().unwrap_or(0);
                let lo = self.rom.get(i + 1).copied().unwrap_or(0);
                u16::from_be_bytes([hi, lo])
            }
            Region::WorkRam => read_ram(&self.work_ram, offset),
            Region::ScratchRam => read_ram(&self.scratch_ram, offset),
            Region::SpriteRam => self.video.read_sprite_ram(offset),
            Region::Vram { layer, .. } => self.video.read_vram(layer as usize, offset),
            Region::LayerControl(layer) => self.video.read_layer_control(layer as usize, offset),
            Region::VideoRegs => self.video.read_video_reg(offset),
            Region::Palette => self.video.read_palette(offset),
            Region::IrqCause => self.interrupts.read_cause(offset),
            Region::Sound => self.sound.status_read(offset) as u16,
            Region::Inputs => {
                self.input
                    .read_with_eeprom(offset, &self.eeprom, self.game.eeprom_input_bit())
            }
            Region::EepromControl => 0,
        }
    }

    /// Bus write. `data` carries the value in its low half and the byte-lane
    /// keep mask in its high half (see [`combine_word`]).
    pub fn write(&mut self, addr: u32, data: u32) {
        let addr = addr & ADDRESS_MASK & !1;
        let Some(range) = self.map.find_write(addr) else {
            log::trace!("unmapped write {addr:06X} <- {data:08X}");
            return;
        };
        let offset = range.offset(addr);
        match range.region {
            Region::Rom | Region::IrqCause | Region::Inputs => {}
            Region::WorkRam => write_ram(&mut self.work_ram, offset, data),
            Region::ScratchRam => write_ram(&mut self.scratch_ram, offset, data),
            Region::SpriteRam => self.video.write_sprite_ram(offset, data),
            Region::Vram { layer, .. } => self.video.write_vram(layer as usize, offset, data),
            Region::LayerControl(layer) => {
                self.video.write_layer_control(layer as usize, offset, data)
            }
            Region::VideoRegs => self.video.write_video_reg(offset, data),
            Region::Palette => self.video.write_palette(offset, data),
            Region::Sound => sound::write_port(self.sound.as_mut(), offset, data),
            Region::EepromControl => self
                .game
                .eeprom_wiring()
                .write_control(data, &mut self.eeprom),
        }
    }

    pub fn write_word(&mut self, addr: u32, value: u16) {
        self.write(addr, value as u32);
    }

    pub fn write_byte(&mut self, addr: u32, value: u8) {
        if addr & 1 == 0 {
            self.write(addr, KEEP_ODD_BYTE | (value as u32) << 8);
        } else {
            self.write(addr, KEEP_EVEN_BYTE | value as u32);
        }
    }
}

#[inline]
fn read_ram(ram: &[u16], offset: u32) -> u16 {
    ram.get((offset >> 1) as usize).copied().unwrap_or(0)
}

#[inline]
fn write_ram(ram: &mut [u16], offset: u32, data: u32) {
    if let Some(word) = ram.get_mut((offset >> 1) as usize) {
        *word = combine_word(*word, data);
    }
}
