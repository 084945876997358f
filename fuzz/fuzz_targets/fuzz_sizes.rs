#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target that exercises size boundaries and alignment.
// Interprets input as a series of u32 sizes, allocates memory of that size,
// writes to the full extent, verifies alignment, and releases. Sizes around
// the small/large split (128/129) are the interesting ones.

fuzz_target!(|data: &[u8]| {
    let mut i = 0;
    while i + 4 <= data.len() {
        let raw_size = u32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        i += 4;

        // Cap size to prevent OOM
        let size = (raw_size as usize) % (1024 * 1024); // Max 1 MiB

        let ptr = safemem::allocate(size);
        if size == 0 {
            assert!(ptr.is_null(), "allocate(0) returned {:p}", ptr);
            continue;
        }

        if ptr.is_null() {
            continue; // OOM is ok
        }

        assert_eq!(
            (ptr as usize) % 16,
            0,
            "allocate({}) returned unaligned pointer {:p}",
            size,
            ptr
        );

        // Write to full extent -- this should not crash
        unsafe {
            std::ptr::write_bytes(ptr, 0xBB, size);
        }

        for j in 0..size {
            assert_eq!(unsafe { *ptr.add(j) }, 0xBB);
        }

        let outcome = unsafe { safemem::try_release(ptr) };
        match outcome {
            Ok(safemem::Released::Small { .. }) => assert!(size <= 128),
            Ok(safemem::Released::Large { size: s }) => {
                assert!(size > 128);
                assert_eq!(s, size);
            }
            other => panic!("allocate({}) then release gave {:?}", size, other),
        }

        // Owned block of the same size, zero-filled.
        if size < 65536 {
            if let Ok(block) = safemem::Block::zeroed(size) {
                assert!(block.as_slice().iter().take(4096).all(|&b| b == 0));
            }
        }
    }
});
