#![no_main]

use libfuzzer_sys::fuzz_target;
use safemem::{ReleaseError, Released};

/// Fuzz target that interprets a byte slice as a sequence of allocator operations.
///
/// Each operation is encoded as:
///   byte 0: opcode (0=allocate, 1=release, 2=release twice, 3=aligned allocate)
///   byte 1-2: size (little-endian u16)
///   byte 3: slot index (which tracked pointer to operate on)
///
/// We track up to 64 live pointers. Each live block is filled with its slot
/// number so overlapping blocks show up as a mismatched fill.
const MAX_SLOTS: usize = 64;

fuzz_target!(|data: &[u8]| {
    let mut slots: [*mut u8; MAX_SLOTS] = [std::ptr::null_mut(); MAX_SLOTS];
    let mut sizes: [usize; MAX_SLOTS] = [0; MAX_SLOTS];
    // Slab-backed blocks, the only ones a double release can safely probe.
    let mut small: [bool; MAX_SLOTS] = [false; MAX_SLOTS];

    let mut i = 0;
    while i + 4 <= data.len() {
        let opcode = data[i] & 0x03;
        let size = u16::from_le_bytes([data[i + 1], data[i + 2]]) as usize;
        let slot = (data[i + 3] as usize) % MAX_SLOTS;
        i += 4;

        match opcode {
            0 | 3 => {
                if !slots[slot].is_null() {
                    check_fill(slots[slot], sizes[slot], slot);
                    let outcome = unsafe { safemem::try_release(slots[slot]) };
                    assert!(outcome.is_ok(), "live block refused: {:?}", outcome);
                }
                let align = if opcode == 0 {
                    16
                } else {
                    16usize << ((data[i - 4] >> 2) & 0x07)
                };
                let ptr = safemem::allocate_aligned(size, align);
                assert_eq!(ptr as usize % align, 0);
                if size == 0 {
                    assert!(ptr.is_null());
                }
                slots[slot] = ptr;
                sizes[slot] = size;
                small[slot] = align == 16 && size <= 128;
                if !ptr.is_null() {
                    assert_eq!(ptr as usize % 16, 0);
                    unsafe { std::ptr::write_bytes(ptr, slot as u8, std::cmp::min(size, 256)) };
                }
            }
            1 => {
                if !slots[slot].is_null() {
                    check_fill(slots[slot], sizes[slot], slot);
                    let outcome = unsafe { safemem::try_release(slots[slot]) };
                    assert!(outcome.is_ok(), "live block refused: {:?}", outcome);
                    slots[slot] = std::ptr::null_mut();
                    sizes[slot] = 0;
                }
            }
            2 => {
                // A second release of a small block must be refused. Large
                // blocks are unmapped by the first release, so only small
                // ones are probed.
                if !slots[slot].is_null() && small[slot] {
                    check_fill(slots[slot], sizes[slot], slot);
                    let p = slots[slot];
                    let first = unsafe { safemem::try_release(p) };
                    assert!(matches!(first, Ok(Released::Small { .. })));
                    let second = unsafe { safemem::try_release(p) };
                    assert!(matches!(second, Err(ReleaseError::InvalidTag { .. })));
                    slots[slot] = std::ptr::null_mut();
                    sizes[slot] = 0;
                }
            }
            _ => unreachable!(),
        }
    }

    for (slot, ptr) in slots.iter().enumerate() {
        if !ptr.is_null() {
            check_fill(*ptr, sizes[slot], slot);
            unsafe { safemem::release(*ptr) };
        }
    }
});

fn check_fill(ptr: *mut u8, size: usize, slot: usize) {
    for j in 0..std::cmp::min(size, 256) {
        assert_eq!(unsafe { *ptr.add(j) }, slot as u8, "slot {} clobbered at {}", slot, j);
    }
}
