use crate::common;

use overdrive_core::vdp::Status;

#[test]
fn vram_words_read_back_through_the_ports() {
    let mut vdp = common::setup();
    common::command(&mut vdp, common::VRAM_WRITE, 0x1000);
    vdp.write_data(0xBEEF);
    vdp.write_data(0x1234);

    common::command(&mut vdp, common::VRAM_READ, 0x1000);
    assert_eq!(vdp.read_data(), 0xBEEF);
    assert_eq!(vdp.read_data(), 0x1234);
}

#[test]
fn odd_address_vram_write_swaps_bytes() {
    let mut vdp = common::setup();
    common::command(&mut vdp, common::VRAM_WRITE, 0x2001);
    vdp.write_data(0xCAFE);

    common::command(&mut vdp, common::VRAM_READ, 0x2000);
    assert_eq!(vdp.read_data(), 0xFECA);
    assert_eq!(vdp.memory().vram_byte(0x2000), 0xFE);
    assert_eq!(vdp.memory().vram_byte(0x2001), 0xCA);
}

#[test]
fn long_data_writes_split_into_two_words() {
    let mut vdp = common::setup();
    common::command(&mut vdp, common::VRAM_WRITE, 0x4000);
    vdp.write_data_long(0x1234_5678);

    common::command(&mut vdp, common::VRAM_READ, 0x4000);
    assert_eq!(vdp.read_data(), 0x1234);
    assert_eq!(vdp.read_data(), 0x5678);
}

#[test]
fn byte_data_writes_duplicate_across_the_word() {
    let mut vdp = common::setup();
    common::command(&mut vdp, common::VRAM_WRITE, 0x4000);
    vdp.write_data_byte(0xAB);

    common::command(&mut vdp, common::VRAM_READ, 0x4000);
    assert_eq!(vdp.read_data(), 0xABAB);
}

#[test]
fn cram_and_vsram_round_trips() {
    let mut vdp = common::setup();
    common::command(&mut vdp, common::CRAM_WRITE, 0x04);
    vdp.write_data(0x0EEE);
    common::command(&mut vdp, common::CRAM_READ, 0x04);
    assert_eq!(vdp.read_data(), 0x0EEE);

    common::command(&mut vdp, common::VSRAM_WRITE, 0x02);
    vdp.write_data(0x0123);
    common::command(&mut vdp, common::VSRAM_READ, 0x02);
    assert_eq!(vdp.read_data(), 0x0123);
}

#[test]
fn status_read_aborts_half_written_command() {
    let mut vdp = common::setup();
    // First word of a VRAM write command, then a status read.
    vdp.write_control(0x4000);
    vdp.read_status();
    // Without the abort this would be consumed as a second word.
    vdp.write_control(0x8F04);
    assert_eq!(vdp.registers().auto_increment(), 4);
}

#[test]
fn data_access_aborts_half_written_command() {
    let mut vdp = common::setup();
    common::command(&mut vdp, common::VRAM_WRITE, 0x3000);
    vdp.write_control(0x4100);
    vdp.write_data(0x5555);
    vdp.write_control(0x8F06);
    assert_eq!(vdp.registers().auto_increment(), 6);
}

#[test]
fn fifo_status_bits_track_queue_depth() {
    let mut vdp = common::setup();
    let status = vdp.read_status();
    assert_ne!(status & Status::FIFO_EMPTY.bits(), 0);
    assert_eq!(status & Status::FIFO_FULL.bits(), 0);

    common::command(&mut vdp, common::VRAM_WRITE, 0x0000);
    for value in 0..4 {
        vdp.write_data(value);
    }
    let status = vdp.read_status();
    assert_eq!(status & Status::FIFO_EMPTY.bits(), 0);
    assert_ne!(status & Status::FIFO_FULL.bits(), 0);

    common::run_slots(&mut vdp, 342);
    let status = vdp.read_status();
    assert_ne!(status & Status::FIFO_EMPTY.bits(), 0);
}

#[test]
fn hv_counter_freezes_while_latched() {
    let mut vdp = common::setup();
    common::run_slots(&mut vdp, 100);
    assert_eq!(vdp.hv_counter() & 0xFF, 50);

    vdp.write_control(0x8002);
    let latched = vdp.hv_counter();
    common::run_slots(&mut vdp, 40);
    assert_eq!(vdp.hv_counter(), latched);

    vdp.write_control(0x8000);
    common::run_slots(&mut vdp, 1);
    assert_ne!(vdp.hv_counter(), latched);
}

#[test]
fn hv_counter_wrap_jumps() {
    let mut vdp = common::setup();
    common::run_slots(&mut vdp, 295);
    assert_eq!(vdp.hv_counter() & 0xFF, 0x93);
    common::run_slots(&mut vdp, 1);
    assert_eq!(vdp.hv_counter() & 0xFF, 0xE9);

    // Line 234 of an NTSC V28 frame reads back as 0xE4.
    let mut vdp = common::setup();
    common::run_slots(&mut vdp, 234 * 342);
    assert_eq!(vdp.hv_counter() >> 8, 0xE4);
}
