//! Battery-free persistence of the EEPROM contents.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::eeprom::{EEPROM_BYTES, Eeprom93C46};

#[derive(Debug, Error)]
pub enum NvramError {
    #[error("NVRAM I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("NVRAM image is {actual} bytes, expected {expected}")]
    Truncated { expected: usize, actual: usize },
}

/// What [`load`] found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NvramStatus {
    /// Contents were restored from a saved image.
    Restored,
    /// No image existed; the EEPROM starts zeroed and the game must be set
    /// up in service mode.
    Blank,
}

/// Write the EEPROM image (64 big-endian words).
pub fn save<W: Write + ?Sized>(eeprom: &Eeprom93C46, writer: &mut W) -> Result<(), NvramError> {
    writer.write_all(&eeprom.to_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Restore the EEPROM from `reader`, or start blank when there is none.
///
/// A short image still loads what it has, the rest reads as zero, and the
/// shortfall is reported as [`NvramError::Truncated`].
pub fn load<R: Read + ?Sized>(
    eeprom: &mut Eeprom93C46,
    reader: Option<&mut R>,
) -> Result<NvramStatus, NvramError> {
    let Some(reader) = reader else {
        log::warn!("You MUST initialize NVRAM in service mode");
        eeprom.load_bytes(&[]);
        return Ok(NvramStatus::Blank);
    };

    let mut image = Vec::with_capacity(EEPROM_BYTES);
    reader.take(EEPROM_BYTES as u64).read_to_end(&mut image)?;
    eeprom.load_bytes(&image);
    if image.len() < EEPROM_BYTES {
        return Err(NvramError::Truncated {
            expected: EEPROM_BYTES,
            actual: image.len(),
        });
    }
    Ok(NvramStatus::Restored)
}
