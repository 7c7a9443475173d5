/// Host side of the sound chip (a YMZ280B on most of these boards).
///
/// The chip's IRQ output is reported back through
/// [`Bus::set_sound_irq`](crate::bus::Bus::set_sound_irq).
pub trait SoundChip {
    /// Select the register that the next data write targets.
    fn register_write(&mut self, offset: u32, value: u8);

    /// Write to the selected register.
    fn data_write(&mut self, offset: u32, value: u8);

    fn status_read(&mut self, offset: u32) -> u8;
}

/// Sound chip stand-in used when no chip is attached. Writes vanish and the
/// status register reads as idle.
#[derive(Default)]
pub struct NullSoundChip;

impl SoundChip for NullSoundChip {
    fn register_write(&mut self, _offset: u32, _value: u8) {}

    fn data_write(&mut self, _offset: u32, _value: u8) {}

    fn status_read(&mut self, _offset: u32) -> u8 {
        0
    }
}

/// Route a 32-bit bus write to the chip's register-select or data port.
///
/// Only full-word writes reach the chip; bit 1 of the offset picks the data
/// port.
pub fn write_port(chip: &mut dyn SoundChip, offset: u32, data: u32) {
    if data & 0xFFFF_0000 != 0 {
        return;
    }
    let value = (data & 0xFF) as u8;
    if offset & 2 != 0 {
        chip.data_write(offset, value);
    } else {
        chip.register_write(offset, value);
    }
}
