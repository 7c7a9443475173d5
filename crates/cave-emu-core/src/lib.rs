//! Cave 68000 arcade board: bus dispatch, interrupt causes and serial EEPROM.
//!
//! This crate contains the board glue shared by Dangun Feveron, Dodonpachi,
//! Esprade, Guwange and Uo Poko. The CPU core, the sound chip and the video
//! renderer live outside the crate and talk to it through the [`bus`] and the
//! [`machine`] facade.

/// Address-range dispatcher that routes CPU accesses to devices.
pub mod bus;

/// 93C46 serial EEPROM and the byte-lane wiring used to drive it.
pub mod eeprom;

/// Per-game variants and their board-level quirks.
pub mod hardware;

/// Digital input ports and the input/EEPROM composite read.
pub mod input;

/// Interrupt-cause latch and the combined CPU interrupt line.
pub mod interrupt;

/// High-level facade that owns the bus for one selected game.
pub mod machine;

/// Static read/write address maps for each game.
pub mod memory_map;

/// EEPROM persistence to and from NVRAM files.
pub mod nvram;

/// Sound chip port interface.
pub mod sound;

/// Video RAM, layer control, sprite RAM and palette storage.
pub mod video;
