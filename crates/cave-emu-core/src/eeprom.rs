//! 93C46 serial EEPROM and the board's byte-lane wiring to it.
//!
//! The CPU drives the chip through three bits of a single write (data in,
//! chip select, clock) and samples data out through an input port bit. Which
//! bits those are depends on whether the chip hangs off the even or the odd
//! byte lane of the 16-bit bus.

/// Serial EEPROM pins as seen from the board.
pub trait SerialEeprom {
    /// Latch the data-in line. Sampled on the next rising clock edge.
    fn write_bit(&mut self, bit: bool);

    /// Drive the chip-select line. While asserted the device is held in reset.
    fn set_chip_select(&mut self, asserted: bool);

    /// Drive the serial clock line.
    fn set_clock(&mut self, asserted: bool);

    /// Current level of the data-out line.
    fn read_bit(&self) -> bool;
}

/// Byte lane the EEPROM control latch is wired to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EepromWiring {
    /// Control bits in the even (high) byte: bits 11/9/10.
    EvenLane,
    /// Control bits in the odd (low) byte: bits 7/5/6 (Guwange).
    OddLane,
}

/// Lane mask that must be clear for an even-lane write to reach the latch.
pub const EVEN_LANE_KEEP_MASK: u32 = 0xFF00_0000;
pub const EVEN_DATA_IN: u32 = 0x0800;
pub const EVEN_CHIP_SELECT_N: u32 = 0x0200;
pub const EVEN_CLOCK: u32 = 0x0400;

/// Lane mask that must be clear for an odd-lane write to reach the latch.
pub const ODD_LANE_KEEP_MASK: u32 = 0x00FF_0000;
pub const ODD_DATA_IN: u32 = 0x0080;
pub const ODD_CHIP_SELECT_N: u32 = 0x0020;
pub const ODD_CLOCK: u32 = 0x0040;

impl EepromWiring {
    #[inline]
    const fn masks(self) -> (u32, u32, u32, u32) {
        match self {
            EepromWiring::EvenLane => (
                EVEN_LANE_KEEP_MASK,
                EVEN_DATA_IN,
                EVEN_CHIP_SELECT_N,
                EVEN_CLOCK,
            ),
            EepromWiring::OddLane => (
                ODD_LANE_KEEP_MASK,
                ODD_DATA_IN,
                ODD_CHIP_SELECT_N,
                ODD_CLOCK,
            ),
        }
    }

    /// Decode a bus write to the control latch and drive the EEPROM pins.
    ///
    /// Writes that do not reach the wired byte lane are dropped.
    pub fn write_control<E: SerialEeprom + ?Sized>(self, data: u32, eeprom: &mut E) {
        let (keep, data_in, chip_select_n, clock) = self.masks();
        if data & keep != 0 {
            return;
        }
        eeprom.write_bit(data & data_in != 0);
        eeprom.set_chip_select(data & chip_select_n == 0);
        eeprom.set_clock(data & clock != 0);
    }
}

/// Number of 16-bit words in a 93C46.
pub const EEPROM_WORDS: usize = 64;
/// Size of the NVRAM image in bytes.
pub const EEPROM_BYTES: usize = EEPROM_WORDS * 2;
const ADDRESS_BITS: u32 = 6;
const DATA_BITS: u32 = 16;
const ADDRESS_MASK: u16 = (1 << ADDRESS_BITS) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Read(u8),
    Write(u8, u16),
    Erase(u8),
    Lock,
    Unlock,
}

/// Shift register collecting command bits after the start bit.
#[derive(Debug, Clone, Copy, Default)]
struct CommandBuffer {
    started: bool,
    bits: u32,
    len: u32,
}

impl CommandBuffer {
    fn clear(&mut self) {
        *self = Self::default();
    }

    /// Clock one bit in. Returns a command once enough bits are collected.
    fn push(&mut self, bit: bool) -> Option<Command> {
        if !self.started {
            // Idle zeros before the start bit are ignored.
            self.started = bit;
            return None;
        }
        self.bits = (self.bits << 1) | bit as u32;
        self.len += 1;

        let header = 2 + ADDRESS_BITS;
        if self.len < header {
            return None;
        }
        let opcode = (self.bits >> (self.len - 2)) & 0x03;
        let address = ((self.bits >> (self.len - header)) as u16 & ADDRESS_MASK) as u8;
        let command = match opcode {
            0b10 => Command::Read(address),
            0b11 => Command::Erase(address),
            0b01 => {
                if self.len < header + DATA_BITS {
                    return None;
                }
                Command::Write(address, self.bits as u16)
            }
            _ => match address >> 4 {
                0b11 => Command::Unlock,
                0b00 => Command::Lock,
                other => {
                    log::debug!("EEPROM: ignoring extended command {other:02b}");
                    self.clear();
                    return None;
                }
            },
        };
        self.clear();
        Some(command)
    }
}

/// 64 x 16-bit serial EEPROM.
#[derive(Debug, Clone)]
pub struct Eeprom93C46 {
    data: [u16; EEPROM_WORDS],
    command: CommandBuffer,
    /// Shift register for read-out; bit 16 drives data-out.
    read_shift: Option<u32>,
    latch: bool,
    reset: bool,
    clock: bool,
    locked: bool,
}

impl Eeprom93C46 {
    pub fn new() -> Self {
        Self {
            data: [0; EEPROM_WORDS],
            command: CommandBuffer::default(),
            read_shift: None,
            latch: false,
            reset: false,
            clock: false,
            locked: true,
        }
    }

    pub fn words(&self) -> &[u16; EEPROM_WORDS] {
        &self.data
    }

    pub fn word(&self, address: usize) -> u16 {
        self.data[address % EEPROM_WORDS]
    }

    pub fn set_word(&mut self, address: usize, value: u16) {
        self.data[address % EEPROM_WORDS] = value;
    }

    /// Big-endian byte image, as stored in NVRAM files.
    pub fn to_bytes(&self) -> [u8; EEPROM_BYTES] {
        let mut out = [0u8; EEPROM_BYTES];
        for (chunk, word) in out.chunks_exact_mut(2).zip(self.data.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Load a big-endian byte image. Short images leave the remaining words
    /// cleared; extra bytes are ignored.
    pub fn load_bytes(&mut self, bytes: &[u8]) {
        self.data = [0; EEPROM_WORDS];
        for (word, chunk) in self.data.iter_mut().zip(bytes.chunks(2)) {
            let hi = chunk[0];
            let lo = chunk.get(1).copied().unwrap_or(0);
            *word = u16::from_be_bytes([hi, lo]);
        }
    }

    /// Whether write/erase commands are currently refused.
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Return the serial interface to its power-on state, keeping contents.
    pub fn reset_interface(&mut self) {
        self.command.clear();
        self.read_shift = None;
        self.latch = false;
        self.reset = false;
        self.clock = false;
        self.locked = true;
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Read(address) => {
                let value = self.data[address as usize];
                log::debug!("EEPROM read {value:04X} from address {address:02X}");
                self.read_shift = Some(value as u32);
            }
            Command::Write(address, value) => {
                if self.locked {
                    log::warn!("EEPROM write to {address:02X} refused: device is locked");
                } else {
                    log::debug!("EEPROM write {value:04X} to address {address:02X}");
                    self.data[address as usize] = value;
                }
            }
            Command::Erase(address) => {
                if self.locked {
                    log::warn!("EEPROM erase of {address:02X} refused: device is locked");
                } else {
                    log::debug!("EEPROM erase address {address:02X}");
                    self.data[address as usize] = 0xFFFF;
                }
            }
            Command::Lock => {
                log::debug!("EEPROM lock");
                self.locked = true;
            }
            Command::Unlock => {
                log::debug!("EEPROM unlock");
                self.locked = false;
            }
        }
    }

    fn rising_edge(&mut self) {
        if self.reset {
            return;
        }
        if let Some(shift) = self.read_shift.as_mut() {
            *shift = (*shift << 1) | 1;
            return;
        }
        if let Some(command) = self.command.push(self.latch) {
            self.execute(command);
        }
    }
}

impl Default for Eeprom93C46 {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialEeprom for Eeprom93C46 {
    fn write_bit(&mut self, bit: bool) {
        self.latch = bit;
    }

    fn set_chip_select(&mut self, asserted: bool) {
        self.reset = asserted;
        if asserted {
            if self.command.len > 0 {
                log::debug!(
                    "EEPROM reset with {} command bits pending ({:b})",
                    self.command.len,
                    self.command.bits
                );
            }
            self.command.clear();
            self.read_shift = None;
        }
    }

    fn set_clock(&mut self, asserted: bool) {
        if asserted && !self.clock {
            self.rising_edge();
        }
        self.clock = asserted;
    }

    fn read_bit(&self) -> bool {
        match self.read_shift {
            Some(shift) => (shift >> DATA_BITS) & 1 != 0,
            None => true,
        }
    }
}
