use crate::session::CancelToken;
use std::io;
use std::sync::OnceLock;

static TOKEN: OnceLock<CancelToken> = OnceLock::new();

extern "C" fn on_sigint(_signal: libc::c_int) {
    if let Some(token) = TOKEN.get() {
        token.cancel();
    }
    // A second Ctrl-C terminates immediately
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_DFL);
    }
}

/// Route the first SIGINT into `token` so sessions can wind down cleanly.
pub fn cancel_on_interrupt(token: &CancelToken) -> io::Result<()> {
    if TOKEN.set(token.clone()).is_err() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "interrupt handler already installed",
        ));
    }

    let handler = on_sigint as extern "C" fn(libc::c_int);
    let previous = unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) };
    if previous == libc::SIG_ERR {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
