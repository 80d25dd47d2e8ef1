//! Console output abstraction.
//!
//! Handlers write through [`Output`] so they can be tested against an
//! in-memory buffer.

#[cfg(test)]
use std::cell::RefCell;

use console::style;

/// Where command output goes.
pub trait Output {
    fn println(&self, msg: &str);
    fn header(&self, title: &str);
    fn success(&self, msg: &str);
    fn warning(&self, msg: &str);

    /// Print `key: value` with aligned keys.
    fn field(&self, key: &str, value: &str) {
        self.println(&format!("  {:<18} {}", format!("{}:", key), value));
    }

    fn newline(&self) {
        self.println("");
    }
}

/// Styled stdout output.
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Output for ConsoleOutput {
    fn println(&self, msg: &str) {
        println!("{}", msg);
    }

    fn header(&self, title: &str) {
        println!("{}", style(title).bold());
        println!("{}", "=".repeat(title.chars().count()));
    }

    fn success(&self, msg: &str) {
        println!("{} {}", style("✔").green(), msg);
    }

    fn warning(&self, msg: &str) {
        println!("{} {}", style("!").yellow(), msg);
    }
}

/// Captures output lines, unstyled.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct BufferOutput {
    lines: RefCell<Vec<String>>,
}

#[cfg(test)]
impl BufferOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn text(&self) -> String {
        self.lines.borrow().join("\n")
    }
}

#[cfg(test)]
impl Output for BufferOutput {
    fn println(&self, msg: &str) {
        self.lines.borrow_mut().push(msg.to_string());
    }

    fn header(&self, title: &str) {
        self.println(title);
    }

    fn success(&self, msg: &str) {
        self.println(msg);
    }

    fn warning(&self, msg: &str) {
        self.println(msg);
    }
}
