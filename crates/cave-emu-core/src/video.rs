//! Video memory as written by the CPU and read by the renderer.
//!
//! The bus owns this storage. The renderer runs after a frame's writes, reads
//! VRAM, layer control, video registers, sprite RAM and palette RAM directly,
//! and drains the dirty-tile and dirty-palette queues to know what changed.

use crate::bus::combine_word;
use crate::hardware::GameVariant;
use crate::memory_map::Region;

/// How a layer's VRAM window maps onto tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileMode {
    /// One tile per 4 bytes across the whole window.
    Linear,
    /// 8x8 tile layer whose RAM is mirrored every 0x4000 bytes (Dodonpachi
    /// layer 2). Writes land in both mirrors.
    Mirrored8x8,
}

/// Bytes of VRAM per layer.
pub const VRAM_SIZE: usize = 0x8000;
/// Mirror span of the 8x8 layer.
pub const MIRROR_SPAN: u32 = 0x4000;
/// Bytes per tile entry (code word + attribute word).
pub const TILE_BYTES: u32 = 4;
pub const SPRITE_BANK_SIZE: usize = 0x8000;
pub const VIDEO_REGS_SIZE: usize = 0x80;
pub const LAYER_CONTROL_SIZE: usize = 6;

/// Decoded view of a layer's three control words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerControl {
    pub scroll_x: u16,
    pub scroll_y: u16,
    pub flip_x: bool,
    pub flip_y: bool,
    pub enabled: bool,
    pub priority: u8,
}

impl LayerControl {
    pub fn from_words(words: [u16; 3]) -> Self {
        Self {
            scroll_x: words[0] & 0x01FF,
            scroll_y: words[1] & 0x01FF,
            flip_x: words[0] & 0x8000 == 0,
            flip_y: words[1] & 0x8000 == 0,
            enabled: words[2] & 0x0010 == 0,
            priority: (words[2] & 0x0003) as u8,
        }
    }
}

/// Expand an xGGGGGRRRRRBBBBB palette word to 8-bit RGB.
pub fn xgrb555_to_rgb888(word: u16) -> [u8; 3] {
    let expand = |c: u16| {
        let c = (c & 0x1F) as u8;
        (c << 3) | (c >> 2)
    };
    [expand(word >> 5), expand(word >> 10), expand(word)]
}

#[derive(Debug, Clone)]
struct TileLayer {
    vram: Vec<u16>,
    control: [u16; 3],
    mode: TileMode,
    dirty: Vec<usize>,
}

impl TileLayer {
    fn new(mode: TileMode) -> Self {
        Self {
            vram: vec![0; VRAM_SIZE / 2],
            control: [0; 3],
            mode,
            dirty: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoMemory {
    layers: Vec<TileLayer>,
    video_regs: [u16; VIDEO_REGS_SIZE / 2],
    sprite_ram: Vec<u16>,
    palette: Vec<u16>,
    palette_dirty: Vec<usize>,
}

impl VideoMemory {
    pub fn new(game: GameVariant) -> Self {
        let palette_bytes = game.memory_map().backing_size(Region::Palette);
        Self {
            layers: game.layers().iter().map(|&m| TileLayer::new(m)).collect(),
            video_regs: [0; VIDEO_REGS_SIZE / 2],
            sprite_ram: vec![0; SPRITE_BANK_SIZE],
            palette: vec![0; palette_bytes / 2],
            palette_dirty: Vec::new(),
        }
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn read_vram(&self, layer: usize, offset: u32) -> u16 {
        let Some(l) = self.layers.get(layer) else {
            return 0;
        };
        l.vram[word_index(offset, VRAM_SIZE)]
    }

    /// CPU write to a layer's VRAM window. Queues exactly one dirty tile.
    pub fn write_vram(&mut self, layer: usize, offset: u32, data: u32) {
        let Some(l) = self.layers.get_mut(layer) else {
            return;
        };
        let offset = match l.mode {
            TileMode::Linear => offset % VRAM_SIZE as u32,
            TileMode::Mirrored8x8 => offset % MIRROR_SPAN,
        };
        let idx = (offset >> 1) as usize;
        l.vram[idx] = combine_word(l.vram[idx], data);
        if l.mode == TileMode::Mirrored8x8 {
            let mirror = idx + (MIRROR_SPAN as usize >> 1);
            l.vram[mirror] = l.vram[idx];
        }
        l.dirty.push((offset / TILE_BYTES) as usize);
    }

    /// Word view of a layer's VRAM.
    pub fn vram(&self, layer: usize) -> &[u16] {
        self.layers.get(layer).map_or(&[], |l| l.vram.as_slice())
    }

    /// Tiles written since the last call, in write order.
    pub fn take_dirty_tiles(&mut self, layer: usize) -> Vec<usize> {
        self.layers
            .get_mut(layer)
            .map(|l| std::mem::take(&mut l.dirty))
            .unwrap_or_default()
    }

    pub fn read_layer_control(&self, layer: usize, offset: u32) -> u16 {
        self.layers
            .get(layer)
            .map_or(0, |l| l.control[word_index(offset, LAYER_CONTROL_SIZE)])
    }

    pub fn write_layer_control(&mut self, layer: usize, offset: u32, data: u32) {
        if let Some(l) = self.layers.get_mut(layer) {
            let idx = word_index(offset, LAYER_CONTROL_SIZE);
            l.control[idx] = combine_word(l.control[idx], data);
        }
    }

    pub fn layer_control(&self, layer: usize) -> Option<LayerControl> {
        self.layers
            .get(layer)
            .map(|l| LayerControl::from_words(l.control))
    }

    pub fn read_video_reg(&self, offset: u32) -> u16 {
        self.video_regs[word_index(offset, VIDEO_REGS_SIZE)]
    }

    pub fn write_video_reg(&mut self, offset: u32, data: u32) {
        let idx = word_index(offset, VIDEO_REGS_SIZE);
        self.video_regs[idx] = combine_word(self.video_regs[idx], data);
    }

    pub fn video_regs(&self) -> &[u16] {
        &self.video_regs
    }

    pub fn read_sprite_ram(&self, offset: u32) -> u16 {
        self.sprite_ram[word_index(offset, SPRITE_BANK_SIZE * 2)]
    }

    pub fn write_sprite_ram(&mut self, offset: u32, data: u32) {
        let idx = word_index(offset, SPRITE_BANK_SIZE * 2);
        self.sprite_ram[idx] = combine_word(self.sprite_ram[idx], data);
    }

    /// Sprite bank the renderer should read, selected by video register 4.
    #[inline]
    pub fn sprite_bank(&self) -> usize {
        (self.video_regs[4] & 1) as usize
    }

    /// Sprite list the renderer should draw this frame.
    pub fn active_sprites(&self) -> &[u16] {
        let words = SPRITE_BANK_SIZE / 2;
        let start = self.sprite_bank() * words;
        &self.sprite_ram[start..start + words]
    }

    pub fn read_palette(&self, offset: u32) -> u16 {
        if self.palette.is_empty() {
            return 0;
        }
        self.palette[word_index(offset, self.palette.len() * 2)]
    }

    /// Store a raw palette word and queue its index for colour conversion.
    pub fn write_palette(&mut self, offset: u32, data: u32) {
        if self.palette.is_empty() {
            return;
        }
        let idx = word_index(offset, self.palette.len() * 2);
        self.palette[idx] = combine_word(self.palette[idx], data);
        self.palette_dirty.push(idx);
    }

    pub fn palette(&self) -> &[u16] {
        &self.palette
    }

    pub fn take_dirty_palette(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.palette_dirty)
    }
}

#[inline]
fn word_index(offset: u32, size_bytes: usize) -> usize {
    (offset as usize % size_bytes) >> 1
}
