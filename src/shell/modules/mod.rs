use super::Shell;
use anyhow::Result;

mod core;

pub type Builtin = fn(&mut Shell, Vec<&str>) -> Result<()>;

pub enum Module {
    Core,
}

pub fn load_module(smsh: &mut Shell, module: Module) {
    match module {
        Module::Core => {
            smsh.builtins.insert("cd", core::chdir);
            smsh.builtins.insert("status", core::status);
            smsh.builtins.insert("exit", core::exit);
        }
    }
}
