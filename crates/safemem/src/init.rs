use crate::{config, util};
use core::sync::atomic::{AtomicU8, Ordering};

const UNINIT: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;

static INIT_STATE: AtomicU8 = AtomicU8::new(UNINIT);

/// Library constructor -- called before main() when loaded as a shared object.
#[used]
#[cfg_attr(target_os = "linux", link_section = ".init_array")]
#[cfg_attr(target_os = "macos", link_section = "__DATA,__mod_init_func")]
static CTOR: unsafe extern "C" fn() = {
    unsafe extern "C" fn init() {
        safemem_init();
    }
    init
};

/// Read configuration and the page size. Idempotent; concurrent callers
/// wait for the first one to finish.
///
/// # Safety
/// Reads the environment with libc::getenv.
pub unsafe fn safemem_init() {
    match INIT_STATE.compare_exchange(UNINIT, INITIALIZING, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {}
        Err(INITIALIZING) => {
            while INIT_STATE.load(Ordering::Acquire) == INITIALIZING {
                core::hint::spin_loop();
            }
            return;
        }
        Err(_) => return,
    }

    util::init_page_size();
    config::read_config();

    INIT_STATE.store(READY, Ordering::Release);
}

/// Make sure init has run. Only the slow paths (slab refill, large
/// mappings) call this; the cache-hit path never needs configuration.
#[inline]
pub fn ensure_initialized() {
    if INIT_STATE.load(Ordering::Acquire) != READY {
        init_slow();
    }
}

#[cold]
#[inline(never)]
fn init_slow() {
    unsafe { safemem_init() }
}
