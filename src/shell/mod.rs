use crate::job::reaper::reap;
use crate::job::signal::ignore_terminate;
use crate::job::{Launch, Outcome};
use crate::line::Line;
use crate::sources::Sources;
use anyhow::Result;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::debug;

use std::collections::HashMap;
use std::io::{self, Write};

pub mod config;
mod init;
mod modules;
pub mod state;

use config::Config;
use init::init;
use modules::Builtin;
use state::State;

pub struct Shell {
    config: Config,
    sources: Sources,
    builtins: HashMap<&'static str, Builtin>,
    state: State,
}

impl Shell {
    pub fn new() -> Result<Shell> {
        init()
    }

    // Reap, read, execute; until `exit` or end of input.  Errors in a
    // single line are returned so the caller can report them and call
    // `run` again.
    pub fn run(&mut self) -> Result<()> {
        while !self.state.exit_requested() {
            self.report_finished_jobs()?;

            match self.sources.get_line()? {
                Some(line) => {
                    debug!("{:?} line: {}", line.kind(), line.rawline());
                    line.execute(self)?
                }
                None => {
                    debug!("no more input");
                    self.terminate_jobs()?;
                    self.state.request_exit();
                }
            }
        }

        Ok(())
    }

    pub fn execute_external_command(&mut self, line: &Line) -> Result<()> {
        let launch = Launch::new(line, &self.config.null_device)?;

        match launch.launch()? {
            Outcome::Foreground(end_state) => {
                // Reported right away; `status` would only show it later
                if end_state.is_signaled() {
                    println!("{}", end_state);
                    io::stdout().flush()?;
                }
                self.state.set_end_state(end_state);
            }
            Outcome::Background(pid) => {
                println!("background pid is {}", pid);
                io::stdout().flush()?;
                self.state.jobs.insert(pid);
            }
        }

        Ok(())
    }

    fn report_finished_jobs(&mut self) -> Result<()> {
        for (pid, end_state) in reap(&mut self.state.jobs) {
            println!("background pid {} is done: {}", pid, end_state);
        }

        io::stdout().flush()?;
        Ok(())
    }

    // Sends SIGTERM to the whole process group, which holds every job
    // this session started.  The shell itself ignores it.
    pub fn terminate_jobs(&mut self) -> Result<()> {
        debug!("terminating {} outstanding jobs", self.state.jobs.len());

        ignore_terminate()?;
        kill(Pid::from_raw(0), Signal::SIGTERM)?;

        Ok(())
    }

    pub fn get_builtin(&self, command: &str) -> Option<Builtin> {
        self.builtins.get(command).copied()
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn backtrace(&mut self) {
        self.sources.backtrace();
    }
}
