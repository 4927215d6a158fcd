// Author: Dustin Pilgrim
// License: MIT
//
// Last-resort SIGSEGV diagnostic. Not a recovery path: the handler runs once
// (SA_RESETHAND) and the faulting instruction then kills the process.

use std::io;

const CRASH_MESSAGE: &[u8] = b"[ERROR] (xwayback): Received SIGSEGV (Segmentation fault)!\n\
This is a bug!\n\
Please visit https://gitlab.freedesktop.org/wayback/wayback/-/issues/ to check\n\
if this bug has already been reported.  If not, fill a new bug report with steps\n\
to reproduce this error.  If you need assistance, join #wayback on Libera.Chat\n\
or #wayback:catircservices.org on Matrix.\n";

extern "C" fn handle_segv(_sig: libc::c_int) {
    // SAFETY: write(2) is async-signal-safe and the buffer is static.
    unsafe {
        libc::write(
            libc::STDERR_FILENO,
            CRASH_MESSAGE.as_ptr().cast(),
            CRASH_MESSAGE.len(),
        );
    }
}

pub fn install() -> io::Result<()> {
    // SAFETY: the sigaction struct is fully initialised before use and the
    // handler only performs async-signal-safe calls.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handle_segv as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESETHAND;
        libc::sigemptyset(&mut action.sa_mask);

        if libc::sigaction(libc::SIGSEGV, &action, std::ptr::null_mut()) == -1 {
            return Err(io::Error::last_os_error());
        }
    }

    Ok(())
}
