use crate::common;

use overdrive_core::vdp::Status;
use rgb::RGB8;

#[test]
fn disabled_display_frames_render_black() {
    let mut vdp = common::setup();
    vdp.write_control(0x8114);
    vdp.write_control(0x8707);
    common::command(&mut vdp, common::CRAM_WRITE, 14);
    vdp.write_data(0x000E);

    let frame = common::run_frame(&mut vdp);
    assert_eq!(frame.width(), 256);
    assert_eq!(frame.height(), 224);
    assert_eq!(frame.pixel(0, 0), RGB8::new(0, 0, 0));
    assert_eq!(frame.pixel(255, 223), RGB8::new(0, 0, 0));
}

#[test]
fn backdrop_color_fills_empty_frames() {
    let mut vdp = common::setup();
    vdp.write_control(0x8707);
    common::command(&mut vdp, common::CRAM_WRITE, 14);
    vdp.write_data(0x000E);

    common::run_frame(&mut vdp);
    let frame = common::run_frame(&mut vdp);
    assert_eq!(frame.pixel(0, 0), RGB8::new(255, 0, 0));
    assert_eq!(frame.pixel(255, 223), RGB8::new(255, 0, 0));
}

#[test]
fn static_scene_renders_identically_every_frame() {
    let mut vdp = common::setup();
    vdp.write_control(0x8407);
    common::write_vram_words(&mut vdp, 0x0020, &[0x1111; 16]);
    common::write_vram_words(&mut vdp, 0xE000, &[0x0001, 0x0001, 0x8001]);
    common::command(&mut vdp, common::CRAM_WRITE, 2);
    vdp.write_data(0x00E0);

    // Lines rendered while the tables were being written are stale;
    // let one frame pass before comparing.
    common::run_frame(&mut vdp);
    let first = common::run_frame(&mut vdp);
    let second = common::run_frame(&mut vdp);
    assert!(first == second);
    assert_eq!(first.pixel(0, 0), RGB8::new(0, 255, 0));
}

#[test]
fn h40_mode_resizes_the_frame() {
    let mut vdp = common::setup();
    vdp.write_control(0x8C81);
    let frame = common::run_frame(&mut vdp);
    assert_eq!(frame.width(), 320);
    assert_eq!(frame.height(), 224);

    vdp.write_control(0x8C00);
    vdp.write_control(0x8158);
    let frame = common::run_frame(&mut vdp);
    assert_eq!(frame.width(), 256);
    assert_eq!(frame.height(), 240);
}

#[test]
fn seventeenth_sprite_on_a_line_sets_overflow() {
    let mut vdp = common::setup();
    vdp.write_control(0x856C);

    // 17 single-cell sprites linked in table order, all on line 0.
    let mut table = Vec::new();
    for i in 0..17u16 {
        let link = if i < 16 { i + 1 } else { 0 };
        table.extend_from_slice(&[128, link, 0x0001, 128 + i * 8]);
    }
    common::write_vram_words(&mut vdp, 0xD800, &table);

    // The flag latches when the table is evaluated at vertical blank.
    vdp.read_status();
    common::run_frame(&mut vdp);
    let status = vdp.read_status();
    assert_ne!(status & Status::SPRITE_OVERFLOW.bits(), 0);
    assert_eq!(vdp.read_status() & Status::SPRITE_OVERFLOW.bits(), 0);
}

#[test]
fn sixteen_sprites_on_a_line_do_not_overflow() {
    let mut vdp = common::setup();
    vdp.write_control(0x856C);

    let mut table = Vec::new();
    for i in 0..16u16 {
        let link = if i < 15 { i + 1 } else { 0 };
        table.extend_from_slice(&[128, link, 0x0001, 128 + i * 8]);
    }
    common::write_vram_words(&mut vdp, 0xD800, &table);

    vdp.read_status();
    common::run_frame(&mut vdp);
    assert_eq!(vdp.read_status() & Status::SPRITE_OVERFLOW.bits(), 0);
}

#[test]
fn left_column_blank_masks_the_first_eight_pixels() {
    let mut vdp = common::setup();
    vdp.write_control(0x8407);
    common::write_vram_words(&mut vdp, 0x0020, &[0x2222; 16]);
    common::write_vram_words(&mut vdp, 0xE000, &[0x0001, 0x0001]);
    common::command(&mut vdp, common::CRAM_WRITE, 4);
    vdp.write_data(0x00E0);

    vdp.write_control(0x8020);
    common::run_frame(&mut vdp);
    let frame = common::run_frame(&mut vdp);
    assert_eq!(frame.pixel(0, 0), RGB8::new(0, 0, 0));
    assert_eq!(frame.pixel(7, 0), RGB8::new(0, 0, 0));
    assert_eq!(frame.pixel(8, 0), RGB8::new(0, 255, 0));
}
