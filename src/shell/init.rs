use anyhow::Result;
use tracing::{debug, warn};

use crate::job::signal::Role;
use crate::sources::{script::Script, tty::Tty, Sources};
use super::config::Config;
use super::modules::{load_module, Module};
use super::state::State;
use super::Shell;

use std::collections::HashMap;

pub fn init() -> Result<Shell> {
    // Inherited by every child unless the launcher overrides it
    Role::Shell.apply()?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!("using default configuration: {}", e);
        Config::default()
    });

    let mut sources = Sources::new();
    sources.push_source(Tty::build_source(&config.prompt));

    let mut smsh = Shell {
        config,
        sources,
        builtins: HashMap::new(),
        state: State::new(),
    };

    load_module(&mut smsh, Module::Core);

    push_init_script(&mut smsh);

    Ok(smsh)
}

pub fn push_init_script(smsh: &mut Shell) {
    if let Some(path) = smsh.config.init_script.clone() {
        match Script::build_source(path.clone()) {
            Ok(script) => {
                debug!("running init script {}", path.display());
                smsh.sources.push_source(script);
            }
            Err(e) => {
                eprintln!("smallsh: {}: {}", path.display(), e);
            }
        }
    }
}
