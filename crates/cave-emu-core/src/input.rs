use crate::eeprom::SerialEeprom;

/// Raw digital input ports. Active low, so the idle value is all ones.
#[derive(Debug, Clone)]
pub struct InputPorts {
    ports: [u16; 2],
}

impl InputPorts {
    pub fn new() -> Self {
        Self {
            ports: [0xFFFF; 2],
        }
    }

    /// Raw value of port `index`. Ports that do not exist read as 0.
    pub fn read_port(&self, index: usize) -> u16 {
        self.ports.get(index).copied().unwrap_or(0)
    }

    pub fn set_port(&mut self, index: usize, value: u16) {
        if let Some(port) = self.ports.get_mut(index) {
            *port = value;
        }
    }

    /// Composite read of the input window at byte `offset`.
    ///
    /// The second word carries the EEPROM data-out line OR'd in at
    /// `eeprom_bit`.
    pub fn read_with_eeprom<E: SerialEeprom + ?Sized>(
        &self,
        offset: u32,
        eeprom: &E,
        eeprom_bit: u32,
    ) -> u16 {
        match offset & !1 {
            0 => self.read_port(0),
            2 => self.read_port(1) | ((eeprom.read_bit() as u16) << eeprom_bit),
            _ => 0,
        }
    }
}

impl Default for InputPorts {
    fn default() -> Self {
        Self::new()
    }
}
