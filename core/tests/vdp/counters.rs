use crate::common::{self, NullBus};

use overdrive_core::vdp::Status;
use overdrive_core::vdp::Vdp;
use overdrive_core::vdp::registers::Region;

fn setup_interrupts(region: Region, h40: bool, v30: bool, reload: u8) -> Vdp {
    let mut vdp = Vdp::new(region);
    let mode2: u8 = 0x64 | if v30 { 0x08 } else { 0x00 };
    vdp.write_control(0x8100 | u16::from(mode2));
    vdp.write_control(0x8010);
    vdp.write_control(0x8A00 | u16::from(reload));
    if h40 {
        vdp.write_control(0x8C81);
    }
    vdp
}

fn count_interrupts(vdp: &mut Vdp, frames: u32, lines: u32, slots_per_line: u32) -> (u32, u32) {
    let mut vertical = 0;
    let mut horizontal = 0;
    for _ in 0..frames * lines * slots_per_line {
        let result = vdp.step(&mut NullBus);
        if result.vertical_interrupt {
            vertical += 1;
        }
        if result.horizontal_interrupt {
            horizontal += 1;
        }
    }
    (vertical, horizontal)
}

/// Steady-state interrupt counts for every {region, H, V} mode over
/// three frames. The per-frame count depends only on the vertical mode:
/// the countdown reloads continuously through blanking, however many
/// blanking lines the region provides, and the horizontal mode only
/// changes the slot count of each line.
#[test]
fn horizontal_interrupt_counts_across_the_mode_matrix() {
    let v28_counts: [(u8, u32); 6] = [
        (0x00, 225),
        (0x01, 112),
        (0xBE, 1),
        (0xBF, 1),
        (0xC0, 1),
        (0xFF, 0),
    ];
    let v30_counts: [(u8, u32); 6] = [
        (0x00, 241),
        (0x01, 120),
        (0xBE, 1),
        (0xBF, 1),
        (0xC0, 1),
        (0xFF, 0),
    ];

    for region in [Region::Ntsc, Region::Pal] {
        for h40 in [false, true] {
            for v30 in [false, true] {
                let counts = if v30 { &v30_counts } else { &v28_counts };
                let lines = if region == Region::Pal { 313 } else { 262 };
                let slots = if h40 { 420 } else { 342 };
                for &(reload, expected) in counts {
                    let mut vdp = setup_interrupts(region, h40, v30, reload);
                    // First frame settles the countdown; measure the
                    // three that follow.
                    count_interrupts(&mut vdp, 1, lines, slots);
                    let (vertical, horizontal) = count_interrupts(&mut vdp, 3, lines, slots);
                    assert_eq!(
                        vertical, 3,
                        "vint {region:?} h40={h40} v30={v30} reload {reload:#04x}"
                    );
                    assert_eq!(
                        horizontal,
                        expected * 3,
                        "hint {region:?} h40={h40} v30={v30} reload {reload:#04x}"
                    );
                }
            }
        }
    }
}

#[test]
fn pal_units_report_the_status_bit() {
    let mut vdp = Vdp::new(Region::Pal);
    assert_ne!(vdp.read_status() & Status::PAL.bits(), 0);
    let mut vdp = Vdp::new(Region::Ntsc);
    assert_eq!(vdp.read_status() & Status::PAL.bits(), 0);
}

#[test]
fn interrupt_enables_gate_step_results() {
    let mut vdp = common::setup();
    // Neither interrupt enable is set in the basic setup.
    let (vertical, horizontal) = count_interrupts(&mut vdp, 1, 262, 342);
    assert_eq!(vertical, 0);
    assert_eq!(horizontal, 0);
}

#[test]
fn vertical_interrupt_flag_clears_on_status_read() {
    let mut vdp = common::setup();
    common::run_slots(&mut vdp, 225 * 342);
    let status = vdp.read_status();
    assert_ne!(status & Status::VERTICAL_INTERRUPT.bits(), 0);
    assert_ne!(status & Status::V_BLANK.bits(), 0);
    let status = vdp.read_status();
    assert_eq!(status & Status::VERTICAL_INTERRUPT.bits(), 0);
}

#[test]
fn hblank_status_tracks_line_position() {
    let mut vdp = common::setup();
    common::run_slots(&mut vdp, 100);
    assert_eq!(vdp.read_status() & Status::H_BLANK.bits(), 0);
    common::run_slots(&mut vdp, 200);
    assert_ne!(vdp.read_status() & Status::H_BLANK.bits(), 0);
}
