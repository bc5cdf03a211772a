use nix::errno::Errno;
use thiserror::Error;

// Rejections raised while turning a raw line into a `Line`.
// Nothing is launched for a line that fails to parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line too long ({len} bytes, at most {max})")]
    LineTooLong { len: usize, max: usize },

    #[error("too many arguments ({count}, at most {max})")]
    TooManyArguments { count: usize, max: usize },

    #[error("syntax error near `{0}`: expected a file name")]
    MissingRedirectTarget(&'static str),
}

// Errors the interpreter loop cannot recover from.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("fork error")]
    Fork(#[source] Errno),

    #[error("cannot read input: {0}")]
    Input(#[from] std::io::Error),
}

impl ShellError {
    pub fn exit_code(&self) -> i32 {
        1
    }
}
