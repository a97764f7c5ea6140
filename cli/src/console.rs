use colored::Colorize;
use std::fmt::Display;
use std::io::{self, Stderr, Stdout, Write};

/// Command output on one stream, status and errors on the other.
pub struct Console<O: Write = Stdout, E: Write = Stderr> {
    out: O,
    err: E,
}

impl Console<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl Console<Vec<u8>, Vec<u8>> {
    /// A console that keeps everything in memory.
    pub fn captured() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.err).into_owned()
    }
}

impl<O: Write, E: Write> Console<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn out(&mut self) -> &mut O {
        &mut self.out
    }

    pub fn header(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "{}", title.bold())
    }

    pub fn success(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.out, "{}", format!("✔ {message}").green())
    }

    pub fn info(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.out, "{}", format!("ℹ {message}").blue())
    }

    /// Like [`Console::success`], but on stderr so piped output stays clean.
    pub fn notice(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.err, "{}", format!("✔ {message}").green())
    }

    pub fn error(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.err, "{}", format!("✖ {message}").red())
    }
}
