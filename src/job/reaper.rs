use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::{debug, warn};

use std::collections::BTreeSet;

use crate::shell::state::EndState;

// Collects every background job that has already terminated, without
// blocking.  Finished jobs are removed from `jobs` and returned in pid order.
pub fn reap(jobs: &mut BTreeSet<Pid>) -> Vec<(Pid, EndState)> {
    let mut done = Vec::new();

    jobs.retain(|&pid| match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::StillAlive) => true,
        Ok(status) => match EndState::from_wait_status(status) {
            Some(end_state) => {
                debug!("reaped background pid {}: {}", pid, end_state);
                done.push((pid, end_state));
                false
            }
            None => true,
        },
        Err(Errno::EINTR) => true,
        Err(e) => {
            warn!("dropping background pid {}: {}", pid, e);
            false
        }
    });

    done
}
