use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Disposition {
    Ignore,
    Default,
    Inherit,
}

/// The part a process plays in the session, which decides how it reacts
/// to an interrupt.
///
/// The shell ignores SIGINT for its whole lifetime.  A foreground child goes
/// back to the default (terminating) disposition before exec, so Ctrl-C
/// kills the command the user is waiting on.  A background child keeps the
/// ignore it inherited from the shell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    Shell,
    Foreground,
    Background,
}

impl Role {
    pub fn for_child(background: bool) -> Role {
        if background {
            Role::Background
        } else {
            Role::Foreground
        }
    }

    pub fn interrupt_disposition(self) -> Disposition {
        match self {
            Role::Shell => Disposition::Ignore,
            Role::Foreground => Disposition::Default,
            Role::Background => Disposition::Inherit,
        }
    }

    // Only calls sigaction(2), so it is safe between fork and exec.
    pub fn apply(self) -> nix::Result<()> {
        let handler = match self.interrupt_disposition() {
            Disposition::Ignore => SigHandler::SigIgn,
            Disposition::Default => SigHandler::SigDfl,
            Disposition::Inherit => return Ok(()),
        };

        let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
        unsafe { sigaction(Signal::SIGINT, &action) }?;

        Ok(())
    }
}

// Used by `exit` so the shell outlives the SIGTERM it sends to its own
// process group.
pub fn ignore_terminate() -> nix::Result<()> {
    let action = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    unsafe { sigaction(Signal::SIGTERM, &action) }?;

    Ok(())
}
