use core::sync::atomic::{AtomicBool, Ordering};

/// Cached config values (read once at init, never allocate).
static HUGEPAGES: AtomicBool = AtomicBool::new(true);
static PREWARM: AtomicBool = AtomicBool::new(true);
static REPORT_CORRUPTION: AtomicBool = AtomicBool::new(true);

/// Read configuration from environment variables.
///
/// * `SAFEMEM_HUGEPAGES=0` skips the hugepage mapping attempt.
/// * `SAFEMEM_PREWARM=0` skips touching fresh slabs before carving.
/// * `SAFEMEM_QUIET` (any value) silences corruption diagnostics.
///
/// # Safety
/// Calls libc::getenv, which races with concurrent setenv; call from init.
pub unsafe fn read_config() {
    if let Some(val) = getenv_flag(b"SAFEMEM_HUGEPAGES\0") {
        HUGEPAGES.store(val, Ordering::Relaxed);
    }
    if let Some(val) = getenv_flag(b"SAFEMEM_PREWARM\0") {
        PREWARM.store(val, Ordering::Relaxed);
    }
    if !getenv_raw(b"SAFEMEM_QUIET\0").is_null() {
        REPORT_CORRUPTION.store(false, Ordering::Relaxed);
    }
}

pub fn hugepages_enabled() -> bool {
    HUGEPAGES.load(Ordering::Relaxed)
}

pub fn set_hugepages_enabled(enabled: bool) {
    HUGEPAGES.store(enabled, Ordering::Relaxed);
}

pub fn prewarm_enabled() -> bool {
    PREWARM.load(Ordering::Relaxed)
}

pub fn set_prewarm_enabled(enabled: bool) {
    PREWARM.store(enabled, Ordering::Relaxed);
}

pub fn report_corruption() -> bool {
    REPORT_CORRUPTION.load(Ordering::Relaxed)
}

pub fn set_report_corruption(enabled: bool) {
    REPORT_CORRUPTION.store(enabled, Ordering::Relaxed);
}

unsafe fn getenv_raw(key: &[u8]) -> *const libc::c_char {
    libc::getenv(key.as_ptr() as *const libc::c_char)
}

/// Read an environment variable as a boolean flag.
///
/// # Safety
/// `key` must be NUL-terminated. Calls libc::getenv.
unsafe fn getenv_flag(key: &[u8]) -> Option<bool> {
    let val = getenv_raw(key);
    if val.is_null() {
        return None;
    }
    let bytes = core::ffi::CStr::from_ptr(val).to_bytes();
    parse_flag(bytes)
}

/// Parse a flag value without allocating. Unknown spellings are ignored.
fn parse_flag(value: &[u8]) -> Option<bool> {
    match value {
        b"1" | b"on" | b"yes" | b"true" => Some(true),
        b"0" | b"off" | b"no" | b"false" => Some(false),
        _ => None,
    }
}
