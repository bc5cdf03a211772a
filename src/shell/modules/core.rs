use crate::shell::state::EndState;
use crate::shell::Shell;

use anyhow::Result;
use tracing::debug;

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

// Never fatal: a failed `cd` is reported and recorded as exit value 1.
pub fn chdir(smsh: &mut Shell, argv: Vec<&str>) -> Result<()> {
    let dir = match argv.get(1) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => env::var_os("HOME").map(PathBuf::from),
    };

    let Some(dir) = dir else {
        eprintln!("cd: HOME not set");
        smsh.state_mut().set_end_state(EndState::failure());
        return Ok(());
    };

    match env::set_current_dir(&dir) {
        Ok(()) => {
            debug!("cd: {}", dir.display());
            smsh.state_mut().set_end_state(EndState::success());
        }
        Err(e) => {
            debug!("cd: {}: {}", dir.display(), e);
            eprintln!("no such file or directory");
            smsh.state_mut().set_end_state(EndState::failure());
        }
    }

    Ok(())
}

// Reading the record resets it, so a second `status` reports success.
pub fn status(smsh: &mut Shell, _argv: Vec<&str>) -> Result<()> {
    let end_state = smsh.state_mut().take_end_state();

    println!("{}", end_state);
    io::stdout().flush()?;

    Ok(())
}

pub fn exit(smsh: &mut Shell, _argv: Vec<&str>) -> Result<()> {
    smsh.terminate_jobs()?;
    smsh.state_mut().request_exit();

    Ok(())
}
