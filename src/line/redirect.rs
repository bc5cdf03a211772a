use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stream {
    Input,
    Output,
}

impl Stream {
    pub fn marker(&self) -> &'static str {
        match self {
            Stream::Input => "<",
            Stream::Output => ">",
        }
    }

    pub fn from_marker(text: &str) -> Option<Stream> {
        match text {
            "<" => Some(Stream::Input),
            ">" => Some(Stream::Output),
            _ => None,
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Input => write!(f, "input"),
            Stream::Output => write!(f, "output"),
        }
    }
}

// A requested redirection of stdin or stdout.  `path` is absent only
// when the marker had no file name and the line runs in the background.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Redirect {
    stream: Stream,
    path: Option<String>,
}

impl Redirect {
    pub fn new(stream: Stream, path: Option<String>) -> Self {
        Redirect { stream, path }
    }

    pub fn stream(&self) -> Stream {
        self.stream
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}
