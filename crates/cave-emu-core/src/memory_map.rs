//! Per-game address maps.
//!
//! Every board has a read table and a write table. Lookup returns the first
//! range containing the address, so where ranges overlap (Guwange's layer 2
//! control block sits on top of palette RAM) the earlier entry wins.

use crate::hardware::GameVariant;
use crate::video::TileMode;

/// What sits behind an address range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Rom,
    WorkRam,
    /// Two banks of sprite lists; the renderer reads the bank selected by
    /// the video registers.
    SpriteRam,
    Vram {
        layer: u8,
        mode: TileMode,
    },
    /// Scroll/enable/priority words of one tilemap layer.
    LayerControl(u8),
    /// Write side of the block whose reads return the interrupt cause.
    VideoRegs,
    Palette,
    /// RAM of unknown purpose next to the Dangun Feveron palette.
    ScratchRam,
    IrqCause,
    Sound,
    /// Input port 0, then input port 1 with the EEPROM data-out bit.
    Inputs,
    EepromControl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressRange {
    pub start: u32,
    /// Inclusive.
    pub end: u32,
    pub region: Region,
    /// Byte offset into the region's backing store that `start` maps to.
    pub base: u32,
}

impl AddressRange {
    pub const fn new(start: u32, end: u32, region: Region) -> Self {
        Self {
            start,
            end,
            region,
            base: 0,
        }
    }

    pub const fn at(self, base: u32) -> Self {
        Self { base, ..self }
    }

    #[inline]
    pub const fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr <= self.end
    }

    /// Offset of `addr` into the backing store.
    #[inline]
    pub const fn offset(&self, addr: u32) -> u32 {
        self.base + (addr - self.start)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start + 1
    }
}

const fn r(start: u32, end: u32, region: Region) -> AddressRange {
    AddressRange::new(start, end, region)
}

const fn vram(layer: u8) -> Region {
    Region::Vram {
        layer,
        mode: TileMode::Linear,
    }
}

const VRAM_8X8_L2: Region = Region::Vram {
    layer: 2,
    mode: TileMode::Mirrored8x8,
};

#[derive(Clone, Copy, Debug)]
pub struct MemoryMap {
    pub read: &'static [AddressRange],
    pub write: &'static [AddressRange],
}

impl MemoryMap {
    pub const fn for_game(game: GameVariant) -> Self {
        match game {
            GameVariant::DangunFeveron => Self {
                read: DFEVERON_READ,
                write: DFEVERON_WRITE,
            },
            GameVariant::Dodonpachi => Self {
                read: DDONPACH_READ,
                write: DDONPACH_WRITE,
            },
            GameVariant::Esprade => Self {
                read: ESPRADE_READ,
                write: ESPRADE_WRITE,
            },
            GameVariant::Guwange => Self {
                read: GUWANGE_READ,
                write: GUWANGE_WRITE,
            },
            GameVariant::UoPoko => Self {
                read: UOPOKO_READ,
                write: UOPOKO_WRITE,
            },
        }
    }

    #[inline]
    pub fn find_read(&self, addr: u32) -> Option<&'static AddressRange> {
        self.read.iter().find(|range| range.contains(addr))
    }

    #[inline]
    pub fn find_write(&self, addr: u32) -> Option<&'static AddressRange> {
        self.write.iter().find(|range| range.contains(addr))
    }

    /// Bytes of backing store `region` needs to cover every range mapping it.
    pub fn backing_size(&self, region: Region) -> usize {
        self.read
            .iter()
            .chain(self.write.iter())
            .filter(|range| range.region == region)
            .map(|range| (range.base + range.len()) as usize)
            .max()
            .unwrap_or(0)
    }
}

const DFEVERON_READ: &[AddressRange] = &[
    r(0x000000, 0x0FFFFF, Region::Rom),
    r(0x100000, 0x10FFFF, Region::WorkRam),
    r(0x300002, 0x300003, Region::Sound).at(2),
    r(0x400000, 0x407FFF, Region::SpriteRam),
    r(0x408000, 0x40FFFF, Region::SpriteRam).at(0x8000),
    r(0x500000, 0x507FFF, vram(0)),
    r(0x600000, 0x607FFF, vram(1)),
    r(0x708000, 0x708FFF, Region::Palette),
    r(0x710000, 0x710FFF, Region::ScratchRam),
    r(0x800000, 0x800007, Region::IrqCause),
    r(0x900000, 0x900005, Region::LayerControl(0)),
    r(0xA00000, 0xA00005, Region::LayerControl(1)),
    r(0xB00000, 0xB00003, Region::Inputs),
];

const DFEVERON_WRITE: &[AddressRange] = &[
    r(0x000000, 0x0FFFFF, Region::Rom),
    r(0x100000, 0x10FFFF, Region::WorkRam),
    r(0x300000, 0x300003, Region::Sound),
    r(0x400000, 0x407FFF, Region::SpriteRam),
    r(0x408000, 0x40FFFF, Region::SpriteRam).at(0x8000),
    r(0x500000, 0x507FFF, vram(0)),
    r(0x600000, 0x607FFF, vram(1)),
    r(0x708000, 0x708FFF, Region::Palette),
    r(0x710C00, 0x710FFF, Region::ScratchRam).at(0x0C00),
    r(0x800000, 0x80007F, Region::VideoRegs),
    r(0x900000, 0x900005, Region::LayerControl(0)),
    r(0xA00000, 0xA00005, Region::LayerControl(1)),
    r(0xC00000, 0xC00001, Region::EepromControl),
];

const DDONPACH_READ: &[AddressRange] = &[
    r(0x000000, 0x0FFFFF, Region::Rom),
    r(0x100000, 0x10FFFF, Region::WorkRam),
    r(0x300002, 0x300003, Region::Sound).at(2),
    r(0x400000, 0x407FFF, Region::SpriteRam),
    r(0x408000, 0x40FFFF, Region::SpriteRam).at(0x8000),
    r(0x500000, 0x507FFF, vram(0)),
    r(0x600000, 0x607FFF, vram(1)),
    r(0x700000, 0x70FFFF, VRAM_8X8_L2),
    r(0x800000, 0x800007, Region::IrqCause),
    r(0x900000, 0x900005, Region::LayerControl(0)),
    r(0xA00000, 0xA00005, Region::LayerControl(1)),
    r(0xB00000, 0xB00005, Region::LayerControl(2)),
    r(0xC00000, 0xC0FFFF, Region::Palette),
    r(0xD00000, 0xD00003, Region::Inputs),
];

const DDONPACH_WRITE: &[AddressRange] = &[
    r(0x000000, 0x0FFFFF, Region::Rom),
    r(0x100000, 0x10FFFF, Region::WorkRam),
    r(0x300000, 0x300003, Region::Sound),
    r(0x400000, 0x407FFF, Region::SpriteRam),
    r(0x408000, 0x40FFFF, Region::SpriteRam).at(0x8000),
    r(0x500000, 0x507FFF, vram(0)),
    r(0x600000, 0x607FFF, vram(1)),
    r(0x700000, 0x70FFFF, VRAM_8X8_L2),
    r(0x800000, 0x80007F, Region::VideoRegs),
    r(0x900000, 0x900005, Region::LayerControl(0)),
    r(0xA00000, 0xA00005, Region::LayerControl(1)),
    r(0xB00000, 0xB00005, Region::LayerControl(2)),
    r(0xC00000, 0xC0FFFF, Region::Palette),
    r(0xE00000, 0xE00001, Region::EepromControl),
];

const ESPRADE_READ: &[AddressRange] = &[
    r(0x000000, 0x0FFFFF, Region::Rom),
    r(0x100000, 0x10FFFF, Region::WorkRam),
    r(0x300002, 0x300003, Region::Sound).at(2),
    r(0x400000, 0x407FFF, Region::SpriteRam),
    r(0x408000, 0x40FFFF, Region::SpriteRam).at(0x8000),
    r(0x500000, 0x507FFF, vram(0)),
    r(0x600000, 0x607FFF, vram(1)),
    r(0x700000, 0x707FFF, vram(2)),
    r(0x800000, 0x800007, Region::IrqCause),
    r(0x900000, 0x900005, Region::LayerControl(0)),
    r(0xA00000, 0xA00005, Region::LayerControl(1)),
    r(0xB00000, 0xB00005, Region::LayerControl(2)),
    r(0xC00000, 0xC0FFFF, Region::Palette),
    r(0xD00000, 0xD00003, Region::Inputs),
];

const ESPRADE_WRITE: &[AddressRange] = &[
    r(0x000000, 0x0FFFFF, Region::Rom),
    r(0x100000, 0x10FFFF, Region::WorkRam),
    r(0x300000, 0x300003, Region::Sound),
    r(0x400000, 0x407FFF, Region::SpriteRam),
    r(0x408000, 0x40FFFF, Region::SpriteRam).at(0x8000),
    r(0x500000, 0x507FFF, vram(0)),
    r(0x600000, 0x607FFF, vram(1)),
    r(0x700000, 0x707FFF, vram(2)),
    r(0x800000, 0x80007F, Region::VideoRegs),
    r(0x900000, 0x900005, Region::LayerControl(0)),
    r(0xA00000, 0xA00005, Region::LayerControl(1)),
    r(0xB00000, 0xB00005, Region::LayerControl(2)),
    r(0xC00000, 0xC0FFFF, Region::Palette),
    r(0xE00000, 0xE00001, Region::EepromControl),
];

// Layer 2 control is decoded ahead of palette RAM on this board, so the first
// six palette bytes are never reachable.
const GUWANGE_READ: &[AddressRange] = &[
    r(0x000000, 0x0FFFFF, Region::Rom),
    r(0x200000, 0x20FFFF, Region::WorkRam),
    r(0x300000, 0x300007, Region::IrqCause),
    r(0x400000, 0x407FFF, Region::SpriteRam),
    r(0x408000, 0x40FFFF, Region::SpriteRam).at(0x8000),
    r(0x500000, 0x507FFF, vram(0)),
    r(0x600000, 0x607FFF, vram(1)),
    r(0x700000, 0x707FFF, vram(2)),
    r(0x800002, 0x800003, Region::Sound).at(2),
    r(0xB00000, 0xB00005, Region::LayerControl(0)),
    r(0xB80000, 0xB80005, Region::LayerControl(1)),
    r(0xC00000, 0xC00005, Region::LayerControl(2)),
    r(0xC00000, 0xC0FFFF, Region::Palette),
    r(0xD00010, 0xD00013, Region::Inputs),
];

const GUWANGE_WRITE: &[AddressRange] = &[
    r(0x000000, 0x0FFFFF, Region::Rom),
    r(0x200000, 0x20FFFF, Region::WorkRam),
    r(0x300000, 0x30007F, Region::VideoRegs),
    r(0x400000, 0x407FFF, Region::SpriteRam),
    r(0x408000, 0x40FFFF, Region::SpriteRam).at(0x8000),
    r(0x500000, 0x507FFF, vram(0)),
    r(0x600000, 0x607FFF, vram(1)),
    r(0x700000, 0x707FFF, vram(2)),
    r(0x800000, 0x800003, Region::Sound),
    r(0xB00000, 0xB00005, Region::LayerControl(0)),
    r(0xB80000, 0xB80005, Region::LayerControl(1)),
    r(0xC00000, 0xC00005, Region::LayerControl(2)),
    r(0xC00000, 0xC0FFFF, Region::Palette),
    r(0xD00010, 0xD00011, Region::EepromControl),
];

const UOPOKO_READ: &[AddressRange] = &[
    r(0x000000, 0x0FFFFF, Region::Rom),
    r(0x100000, 0x10FFFF, Region::WorkRam),
    r(0x300002, 0x300003, Region::Sound).at(2),
    r(0x400000, 0x407FFF, Region::SpriteRam),
    r(0x408000, 0x40FFFF, Region::SpriteRam).at(0x8000),
    r(0x500000, 0x507FFF, vram(0)),
    r(0x600000, 0x600007, Region::IrqCause),
    r(0x700000, 0x700005, Region::LayerControl(0)),
    r(0x800000, 0x80FFFF, Region::Palette),
    r(0x900000, 0x900003, Region::Inputs),
];

const UOPOKO_WRITE: &[AddressRange] = &[
    r(0x000000, 0x0FFFFF, Region::Rom),
    r(0x100000, 0x10FFFF, Region::WorkRam),
    r(0x300000, 0x300003, Region::Sound),
    r(0x400000, 0x407FFF, Region::SpriteRam),
    r(0x408000, 0x40FFFF, Region::SpriteRam).at(0x8000),
    r(0x500000, 0x507FFF, vram(0)),
    r(0x600000, 0x60007F, Region::VideoRegs),
    r(0x700000, 0x700005, Region::LayerControl(0)),
    r(0x800000, 0x80FFFF, Region::Palette),
    r(0xA00000, 0xA00001, Region::EepromControl),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn overlapping_pairs(table: &[AddressRange]) -> Vec<(AddressRange, AddressRange)> {
        let mut out = Vec::new();
        for (i, a) in table.iter().enumerate() {
            for b in &table[i + 1..] {
                if a.start <= b.end && b.start <= a.end {
                    out.push((*a, *b));
                }
            }
        }
        out
    }

    #[test]
    fn only_guwange_palette_overlaps() {
        for game in GameVariant::ALL {
            let map = game.memory_map();
            for table in [map.read, map.write] {
                let overlaps = overlapping_pairs(table);
                if game == GameVariant::Guwange {
                    assert_eq!(overlaps.len(), 1, "{game}");
                    let (first, second) = overlaps[0];
                    assert_eq!(first.region, Region::LayerControl(2));
                    assert_eq!(second.region, Region::Palette);
                } else {
                    assert!(overlaps.is_empty(), "{game}: {overlaps:?}");
                }
            }
        }
    }

    #[test]
    fn ranges_are_word_aligned_and_in_24_bit_space() {
        for game in GameVariant::ALL {
            let map = game.memory_map();
            for range in map.read.iter().chain(map.write.iter()) {
                assert_eq!(range.start & 1, 0, "{game}: {range:?}");
                assert_eq!(range.end & 1, 1, "{game}: {range:?}");
                assert!(range.end <= 0xFF_FFFF, "{game}: {range:?}");
            }
        }
    }

    #[test]
    fn first_match_wins() {
        let map = GameVariant::Guwange.memory_map();
        assert_eq!(
            map.find_write(0xC00004).map(|r| r.region),
            Some(Region::LayerControl(2))
        );
        assert_eq!(
            map.find_write(0xC00006).map(|r| r.region),
            Some(Region::Palette)
        );
        assert!(map.find_read(0xF00000).is_none());
    }

    #[test]
    fn every_populated_layer_has_vram_and_control() {
        for game in GameVariant::ALL {
            let map = game.memory_map();
            for (layer, &mode) in game.layers().iter().enumerate() {
                let layer = layer as u8;
                assert!(
                    map.write
                        .iter()
                        .any(|r| r.region == Region::Vram { layer, mode }),
                    "{game} layer {layer}"
                );
                assert!(map.backing_size(Region::LayerControl(layer)) == 6);
            }
        }
    }

    #[test]
    fn backing_size_covers_offset_ranges() {
        let map = GameVariant::DangunFeveron.memory_map();
        assert_eq!(map.backing_size(Region::ScratchRam), 0x1000);
        assert_eq!(map.backing_size(Region::SpriteRam), 0x10000);
        assert_eq!(map.backing_size(Region::Palette), 0x1000);
        assert_eq!(GameVariant::UoPoko.memory_map().backing_size(Region::Palette), 0x10000);
    }
}
