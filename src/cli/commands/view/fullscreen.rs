use std::io::{self, Write};

/// xterm-family window operations. Not every terminal honors these;
/// the capability probe below decides which (if any) to use, and an
/// unsupported terminal degrades to a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    /// CSI 10;n t — the dedicated fullscreen window op.
    WindowFullscreen,
    /// CSI 9;n t — legacy maximize, the fallback.
    WindowMaximize,
}

impl Backend {
    const fn sequence(self, on: bool) -> &'static str {
        match (self, on) {
            (Self::WindowFullscreen, true) => "\x1b[10;1t",
            (Self::WindowFullscreen, false) => "\x1b[10;0t",
            (Self::WindowMaximize, true) => "\x1b[9;1t",
            (Self::WindowMaximize, false) => "\x1b[9;0t",
        }
    }
}

/// Fullscreen as a progressive enhancement: resolved once at startup
/// to the first supported backend, never re-probed per call.
#[derive(Debug)]
pub struct Fullscreen {
    backend: Option<Backend>,
    active: bool,
}

impl Fullscreen {
    pub fn detect() -> Self {
        Self {
            backend: probe(),
            active: false,
        }
    }

    pub const fn is_supported(&self) -> bool {
        self.backend.is_some()
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Requests fullscreen. Silent no-op without a backend.
    pub fn enter(&mut self) {
        if self.active {
            return;
        }
        if let Some(backend) = self.backend {
            send(backend.sequence(true));
            self.active = true;
        }
    }

    pub fn leave(&mut self) {
        if !self.active {
            return;
        }
        if let Some(backend) = self.backend {
            send(backend.sequence(false));
        }
        self.active = false;
    }

    pub fn toggle(&mut self) {
        if self.active {
            self.leave();
        } else {
            self.enter();
        }
    }

    #[cfg(test)]
    const fn unsupported() -> Self {
        Self {
            backend: None,
            active: false,
        }
    }
}

fn probe() -> Option<Backend> {
    let term = std::env::var("TERM").unwrap_or_default();
    if term.contains("xterm") || std::env::var_os("WINDOWID").is_some() {
        Some(Backend::WindowFullscreen)
    } else if term.contains("rxvt") {
        Some(Backend::WindowMaximize)
    } else {
        None
    }
}

fn send(sequence: &str) {
    // Failures here must never disturb the viewer.
    let mut stdout = io::stdout();
    let _ = stdout.write_all(sequence.as_bytes());
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use {super::*, assert2::check as assert};

    #[test]
    fn test_sequences() {
        assert!(Backend::WindowFullscreen.sequence(true) == "\x1b[10;1t");
        assert!(Backend::WindowFullscreen.sequence(false) == "\x1b[10;0t");
        assert!(Backend::WindowMaximize.sequence(true) == "\x1b[9;1t");
    }

    #[test]
    fn test_unsupported_terminal_is_silent_noop() {
        let mut fullscreen = Fullscreen::unsupported();
        fullscreen.enter();
        assert!(!fullscreen.is_active());
        fullscreen.toggle();
        assert!(!fullscreen.is_active());
        fullscreen.leave();
        assert!(!fullscreen.is_active());
    }

    #[test]
    fn test_toggle_tracks_state_with_backend() {
        let mut fullscreen = Fullscreen {
            backend: Some(Backend::WindowMaximize),
            active: false,
        };
        fullscreen.toggle();
        assert!(fullscreen.is_active());
        fullscreen.toggle();
        assert!(!fullscreen.is_active());
    }
}
