//! Unit tests for keyboard report layout.
//!
//! The transport forwards report bytes unmodified, so the byte layout is
//! a hard contract with the host.

use super::keyboard::{modifier, usage, KeyboardReport, KEYBOARD_REPORT_MAP};

// ═══════════════════════════════════════════════════════════════════════════
// Keyboard Report Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn release_report_is_all_zero() {
    let report = KeyboardReport::RELEASE;
    assert!(report.is_empty());
    assert_eq!(report.to_bytes(), [0u8; 8]);
}

#[test]
fn single_key_layout() {
    // Ctrl + X
    let report = KeyboardReport::key(modifier::LEFT_CTRL, usage::X);
    assert_eq!(
        report.to_bytes(),
        [0x01, 0x00, 0x1B, 0x00, 0x00, 0x00, 0x00, 0x00]
    );
    assert!(!report.is_empty());
}

#[test]
fn modifier_only_report_is_not_empty() {
    let report = KeyboardReport::key(modifier::LEFT_SHIFT, 0);
    assert!(!report.is_empty());
}

#[test]
fn serialize_buffer_too_small() {
    let report = KeyboardReport::key(0, usage::SPACE);
    let mut small_buf = [0u8; 4];
    assert_eq!(report.serialize(&mut small_buf), 0);
    assert_eq!(small_buf, [0u8; 4]);
}

#[test]
fn report_map_is_a_closed_keyboard_collection() {
    assert_eq!(&KEYBOARD_REPORT_MAP[..4], &[0x05, 0x01, 0x09, 0x06]);
    assert_eq!(KEYBOARD_REPORT_MAP[KEYBOARD_REPORT_MAP.len() - 1], 0xC0);
}
