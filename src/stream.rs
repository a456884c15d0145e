// Text-stream sink for command replies and diagnostics

use std::fmt;

/// Destination for text produced while handling a command
pub trait StreamOutput {
    fn puts(&mut self, text: &str);

    /// Formatted write, used as `stream.printf(format_args!(...))`
    fn printf(&mut self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(text) => self.puts(text),
            None => self.puts(&args.to_string()),
        }
    }
}

/// Collects everything written, in order
impl StreamOutput for String {
    fn puts(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// Discards everything written
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStream;

impl StreamOutput for NullStream {
    fn puts(&mut self, _text: &str) {}
}
