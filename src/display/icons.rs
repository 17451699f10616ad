//! Page-layout bitmaps for the status row.

use crate::io::Bitmap;

/// Bluetooth rune, 8x8.
pub const BLUETOOTH: Bitmap = Bitmap {
    width: 8,
    pages: 1,
    data: &[0x00, 0x24, 0x18, 0xFF, 0x5A, 0x24, 0x00, 0x00],
};

/// Battery outline, 15x8.
pub const BATTERY: Bitmap = Bitmap {
    width: 15,
    pages: 1,
    data: &[
        0x7E, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x7E, 0x18, 0x18,
    ],
};
