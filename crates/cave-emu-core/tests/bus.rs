use std::cell::RefCell;
use std::rc::Rc;

use cave_emu_core::bus::{Bus, KEEP_EVEN_BYTE, KEEP_ODD_BYTE};
use cave_emu_core::hardware::GameVariant;
use cave_emu_core::sound::SoundChip;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SoundEvent {
    Register(u32, u8),
    Data(u32, u8),
    Status(u32),
}

#[derive(Clone, Default)]
struct RecordingSound(Rc<RefCell<Vec<SoundEvent>>>);

impl SoundChip for RecordingSound {
    fn register_write(&mut self, offset: u32, value: u8) {
        self.0.borrow_mut().push(SoundEvent::Register(offset, value));
    }

    fn data_write(&mut self, offset: u32, value: u8) {
        self.0.borrow_mut().push(SoundEvent::Data(offset, value));
    }

    fn status_read(&mut self, offset: u32) -> u8 {
        self.0.borrow_mut().push(SoundEvent::Status(offset));
        0x80
    }
}

fn ram_base(game: GameVariant) -> u32 {
    match game {
        GameVariant::Guwange => 0x200000,
        _ => 0x100000,
    }
}

fn input_base(game: GameVariant) -> u32 {
    match game {
        GameVariant::DangunFeveron => 0xB00000,
        GameVariant::Dodonpachi | GameVariant::Esprade => 0xD00000,
        GameVariant::Guwange => 0xD00010,
        GameVariant::UoPoko => 0x900000,
    }
}

#[test]
fn work_ram_round_trips_on_every_board() {
    for game in GameVariant::ALL {
        let mut bus = Bus::new(game);
        let base = ram_base(game);
        bus.write_word(base + 0x10, 0xBEEF);
        bus.write_word(base + 0xFFFE, 0x1234);
        assert_eq!(bus.read_word(base + 0x10), 0xBEEF, "{game}");
        assert_eq!(bus.read_word(base + 0xFFFE), 0x1234, "{game}");
        assert_eq!(bus.read_byte(base + 0x11), 0xEF, "{game}");
    }
}

#[test]
fn byte_writes_touch_one_lane() {
    let mut bus = Bus::new(GameVariant::Esprade);
    bus.write_word(0x100000, 0x1234);
    bus.write_byte(0x100000, 0xAB);
    assert_eq!(bus.read_word(0x100000), 0xAB34);
    bus.write_byte(0x100001, 0xCD);
    assert_eq!(bus.read_word(0x100000), 0xABCD);

    bus.write(0x100002, KEEP_ODD_BYTE | 0x5600);
    bus.write(0x100002, KEEP_EVEN_BYTE | 0x0078);
    assert_eq!(bus.read_word(0x100002), 0x5678);
}

#[test]
fn rom_reads_big_endian_and_ignores_writes() {
    let mut bus = Bus::new(GameVariant::DangunFeveron);
    bus.load_rom(vec![0x12, 0x34, 0x56]);
    assert_eq!(bus.read_word(0x000000), 0x1234);
    assert_eq!(bus.read_word(0x000002), 0x5600);
    assert_eq!(bus.read_word(0x0FFFFE), 0x0000);

    bus.write_word(0x000000, 0xFFFF);
    assert_eq!(bus.read_word(0x000000), 0x1234);
}

#[test]
fn unmapped_accesses_fall_back_quietly() {
    for game in GameVariant::ALL {
        let mut bus = Bus::new(game);
        bus.write_word(0xF00000, 0xFFFF);
        assert_eq!(bus.read_word(0xF00000), 0, "{game}");
        assert_eq!(bus.read_byte(0xF00001), 0, "{game}");
    }
}

#[test]
fn vram_write_marks_exactly_one_tile() {
    let mut bus = Bus::new(GameVariant::Esprade);
    bus.write_word(0x600010, 0x1234);
    assert_eq!(bus.read_word(0x600010), 0x1234);
    assert_eq!(bus.video.take_dirty_tiles(1), vec![4]);
    assert!(bus.video.take_dirty_tiles(0).is_empty());
    assert!(bus.video.take_dirty_tiles(1).is_empty());

    bus.write_word(0x700000, 0x0001);
    bus.write_word(0x700002, 0x0002);
    assert_eq!(bus.video.take_dirty_tiles(2), vec![0, 0]);
}

#[test]
fn dodonpachi_8x8_layer_is_mirrored() {
    let mut bus = Bus::new(GameVariant::Dodonpachi);
    bus.write_word(0x704002, 0xBEEF);
    assert_eq!(bus.read_word(0x700002), 0xBEEF);
    assert_eq!(bus.read_word(0x704002), 0xBEEF);
    assert_eq!(bus.read_word(0x70C002), 0xBEEF);
    assert_eq!(bus.video.take_dirty_tiles(2), vec![0]);
}

#[test]
fn palette_writes_queue_their_index() {
    let mut bus = Bus::new(GameVariant::Dodonpachi);
    bus.write_word(0xC00002, 0x7FFF);
    bus.write_word(0xC0FFFE, 0x001F);
    assert_eq!(bus.read_word(0xC00002), 0x7FFF);
    assert_eq!(bus.video.palette()[1], 0x7FFF);
    assert_eq!(bus.video.take_dirty_palette(), vec![1, 0x7FFF]);
    assert!(bus.video.take_dirty_palette().is_empty());
}

#[test]
fn guwange_layer_2_control_shadows_palette_start() {
    let mut bus = Bus::new(GameVariant::Guwange);
    bus.write_word(0xC00000, 0x0123);
    assert_eq!(bus.read_word(0xC00000), 0x0123);
    assert_eq!(bus.video.palette()[0], 0);
    assert!(bus.video.take_dirty_palette().is_empty());
    let ctrl = bus.video.layer_control(2).unwrap();
    assert_eq!(ctrl.scroll_x, 0x0123);

    bus.write_word(0xC00006, 0x03E0);
    assert_eq!(bus.video.palette()[3], 0x03E0);
    assert_eq!(bus.video.take_dirty_palette(), vec![3]);
}

#[test]
fn layer_control_and_video_registers() {
    let mut bus = Bus::new(GameVariant::DangunFeveron);
    bus.write_word(0x900000, 0x8010);
    bus.write_word(0x900002, 0x0020);
    bus.write_word(0x900004, 0x0002);
    let ctrl = bus.video.layer_control(0).unwrap();
    assert_eq!((ctrl.scroll_x, ctrl.scroll_y), (0x010, 0x020));
    assert!(!ctrl.flip_x);
    assert!(ctrl.flip_y);
    assert!(ctrl.enabled);
    assert_eq!(ctrl.priority, 2);

    bus.write_word(0x408000, 0x2222);
    assert_eq!(bus.video.active_sprites()[0], 0);
    bus.write_word(0x800008, 0x0001);
    assert_eq!(bus.video.active_sprites()[0], 0x2222);
    assert_eq!(bus.video.video_regs()[4], 0x0001);
}

#[test]
fn dangun_feveron_scratch_ram_is_write_protected_below_0c00() {
    let mut bus = Bus::new(GameVariant::DangunFeveron);
    bus.write_word(0x710000, 0x1111);
    bus.write_word(0x710C00, 0x2222);
    assert_eq!(bus.read_word(0x710000), 0);
    assert_eq!(bus.read_word(0x710C00), 0x2222);
}

#[test]
fn sound_ports_forward_full_words_only() {
    for (game, base) in [
        (GameVariant::DangunFeveron, 0x300000),
        (GameVariant::Guwange, 0x800000),
    ] {
        let chip = RecordingSound::default();
        let events = chip.0.clone();
        let mut bus = Bus::new(game);
        bus.connect_sound(Box::new(chip));

        bus.write_word(base, 0x0012);
        bus.write_word(base + 2, 0x0034);
        bus.write_byte(base + 3, 0x56);
        assert_eq!(bus.read_word(base + 2), 0x0080);
        assert_eq!(bus.read_word(base), 0);

        assert_eq!(
            *events.borrow(),
            vec![
                SoundEvent::Register(0, 0x12),
                SoundEvent::Data(2, 0x34),
                SoundEvent::Status(2),
            ],
            "{game}"
        );
    }
}

#[test]
fn inputs_carry_eeprom_bit_per_board() {
    for game in GameVariant::ALL {
        let mut bus = Bus::new(game);
        bus.input.set_port(0, 0x1234);
        bus.input.set_port(1, 0x0000);
        let base = input_base(game);
        assert_eq!(bus.read_word(base), 0x1234, "{game}");
        let expected = 1u16 << game.eeprom_input_bit();
        assert_eq!(bus.read_word(base + 2), expected, "{game}");
    }
}

#[test]
fn cause_register_is_reachable_through_the_bus() {
    for (game, base) in [
        (GameVariant::DangunFeveron, 0x800000),
        (GameVariant::Guwange, 0x300000),
        (GameVariant::UoPoko, 0x600000),
    ] {
        let mut bus = Bus::new(game);
        let _ = bus.raise_vblank();
        assert_eq!(bus.irq_level(), Some(1), "{game}");
        assert_eq!(bus.read_word(base), 0x0002, "{game}");
        assert_eq!(bus.read_word(base + 4), 0x0002, "{game}");
        assert_eq!(bus.irq_level(), None, "{game}");
    }
}
