//! Interrupt-cause latch.
//!
//! The board funnels three sources into the single 68000 level-1 interrupt:
//! the once-per-frame vblank, the sound chip IRQ output, and a third source
//! whose origin is not known. The game's IRQ handler reads a cause register to
//! find out which one fired, and some of those reads acknowledge a cause.

/// 68000 interrupt level the board drives.
pub const IRQ_LEVEL: u8 = 1;

/// How the cause register answers reads and which reads acknowledge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqProtocol {
    /// Dangun Feveron, Esprade, Guwange and Uo Poko.
    ///
    /// Bits 0/1 read low while vblank/unknown are pending. Reading offset 4
    /// acknowledges vblank, offset 6 acknowledges the unknown cause.
    Standard,
    /// Dodonpachi. Bits 0-2 idle high and only bit 0 reports vblank. Reading
    /// offset 0 acknowledges vblank; the unknown cause is never reported.
    ///
    /// This is known to work with the game but probably does not match the
    /// real hardware.
    Dodonpachi,
}

impl IrqProtocol {
    /// Byte offset whose read acknowledges vblank.
    #[inline]
    pub const fn vblank_ack_offset(self) -> u32 {
        match self {
            IrqProtocol::Standard => 4,
            IrqProtocol::Dodonpachi => 0,
        }
    }

    /// Byte offset whose read acknowledges the unknown cause, if any.
    #[inline]
    pub const fn unknown_ack_offset(self) -> Option<u32> {
        match self {
            IrqProtocol::Standard => Some(6),
            IrqProtocol::Dodonpachi => None,
        }
    }

    #[inline]
    const fn idle_value(self) -> u16 {
        match self {
            IrqProtocol::Standard => 0x0003,
            IrqProtocol::Dodonpachi => 0x0007,
        }
    }
}

/// Size in bytes of the readable cause register window.
pub const CAUSE_REGISTER_SIZE: u32 = 8;

/// Returned by the frame-tick hook. The vblank reaches the CPU through the
/// level-1 line, so the CPU core must not take a vectored interrupt itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum FrameInterrupt {
    Ignore,
}

#[derive(Debug, Clone)]
pub struct InterruptController {
    protocol: IrqProtocol,
    vblank_pending: bool,
    sound_pending: bool,
    unknown_pending: bool,
    /// Combined level-1 request line as last driven to the CPU.
    line: bool,
}

impl InterruptController {
    pub fn new(protocol: IrqProtocol) -> Self {
        Self {
            protocol,
            vblank_pending: false,
            sound_pending: false,
            unknown_pending: false,
            line: false,
        }
    }

    #[inline]
    pub fn protocol(&self) -> IrqProtocol {
        self.protocol
    }

    /// Frame tick: latch a vblank interrupt.
    pub fn raise_vblank(&mut self) -> FrameInterrupt {
        self.vblank_pending = true;
        self.update_line();
        FrameInterrupt::Ignore
    }

    /// Sound chip IRQ output changed.
    pub fn set_sound_irq(&mut self, active: bool) {
        self.sound_pending = active;
        self.update_line();
    }

    /// Latch the third, unidentified cause. Ignored under the Dodonpachi
    /// protocol, which never reports it.
    pub fn raise_unknown(&mut self) {
        if self.protocol.unknown_ack_offset().is_some() {
            self.unknown_pending = true;
        }
        self.update_line();
    }

    /// CPU read of the cause register at byte `offset`.
    ///
    /// Offsets beyond the register read as 0 and acknowledge nothing.
    pub fn read_cause(&mut self, offset: u32) -> u16 {
        if offset >= CAUSE_REGISTER_SIZE {
            return 0;
        }
        let offset = offset & !1;

        let mut result = self.protocol.idle_value();
        if self.vblank_pending {
            result ^= 0x01;
        }
        if let Some(unknown_ack) = self.protocol.unknown_ack_offset() {
            if self.unknown_pending {
                result ^= 0x02;
            }
            if offset == unknown_ack {
                self.unknown_pending = false;
            }
        }
        if offset == self.protocol.vblank_ack_offset() {
            self.vblank_pending = false;
        }

        self.update_line();
        result
    }

    #[inline]
    pub fn vblank_pending(&self) -> bool {
        self.vblank_pending
    }

    #[inline]
    pub fn sound_pending(&self) -> bool {
        self.sound_pending
    }

    #[inline]
    pub fn unknown_pending(&self) -> bool {
        self.unknown_pending
    }

    /// Whether the level-1 request line is currently asserted.
    #[inline]
    pub fn line(&self) -> bool {
        self.line
    }

    /// Interrupt level presented to the CPU, if any.
    #[inline]
    pub fn irq_level(&self) -> Option<u8> {
        self.line.then_some(IRQ_LEVEL)
    }

    fn update_line(&mut self) {
        let asserted = self.vblank_pending || self.sound_pending || self.unknown_pending;
        if asserted != self.line {
            log::trace!(
                "IRQ{IRQ_LEVEL} {} (vblank={} sound={} unknown={})",
                if asserted { "asserted" } else { "cleared" },
                self.vblank_pending,
                self.sound_pending,
                self.unknown_pending
            );
        }
        self.line = asserted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_offsets_alias_the_even_word() {
        let mut irq = InterruptController::new(IrqProtocol::Standard);
        let _ = irq.raise_vblank();
        assert_eq!(irq.read_cause(5), 0x0002);
        assert!(!irq.vblank_pending());
        assert!(!irq.line());
    }

    #[test]
    fn out_of_window_reads_are_inert() {
        let mut irq = InterruptController::new(IrqProtocol::Standard);
        let _ = irq.raise_vblank();
        assert_eq!(irq.read_cause(8), 0);
        assert_eq!(irq.read_cause(0x7E), 0);
        assert!(irq.vblank_pending());
        assert_eq!(irq.irq_level(), Some(IRQ_LEVEL));
    }
}
