// Line-oriented G-code command parsing
//
// A line is a sequence of words, each a letter followed by an optional
// number. The first G/M/T word is the command, the rest are parameters.

use thiserror::Error;

/// Errors raised while parsing a command line
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GcodeError {
    #[error("empty command line")]
    Empty,

    #[error("unexpected character `{found}` at column {column}")]
    UnexpectedChar { found: char, column: usize },

    #[error("invalid number `{text}` for word {letter}")]
    InvalidNumber { letter: char, text: String },
}

/// One letter/number pair of a command line
#[derive(Debug, Clone, Copy, PartialEq)]
struct Word {
    letter: char,
    value: Option<f32>,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Gcode {
    line: String,
    command: Option<(char, u32)>,
    params: Vec<Word>,
}

impl Gcode {
    /// Parse a command line
    ///
    /// Text after `;` and text in `( )` are comments, and a `*checksum`
    /// suffix is dropped. Letters are case-insensitive. `N` line numbers are
    /// skipped. Numbers may carry an exponent (`1e-3`).
    ///
    /// # Returns
    /// * `Ok(Gcode)` if every word is well formed
    /// * `Err(GcodeError)` describing the first malformed word
    pub fn parse(line: &str) -> Result<Self, GcodeError> {
        let content = strip_comments(line);
        let content = content.split('*').next().unwrap_or("").trim();
        if content.is_empty() {
            return Err(GcodeError::Empty);
        }

        let mut command = None;
        let mut params = Vec::new();
        let mut first_word = true;

        for word in Words::new(content) {
            let word = word?;
            if word.letter == 'N' {
                continue;
            }

            if first_word && matches!(word.letter, 'G' | 'M' | 'T') {
                command = Some((word.letter, command_code(word)?));
            } else {
                params.push(word);
            }
            first_word = false;
        }

        Ok(Self {
            line: line.to_string(),
            command,
            params,
        })
    }

    /// Original line text, including any comment
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Command letter and code, e.g. `('M', 907)`
    pub fn command(&self) -> Option<(char, u32)> {
        self.command
    }

    pub fn has_m(&self) -> bool {
        self.m().is_some()
    }

    /// M code of the command, if it is an M command
    pub fn m(&self) -> Option<u32> {
        match self.command {
            Some(('M', code)) => Some(code),
            _ => None,
        }
    }

    pub fn has_g(&self) -> bool {
        self.g().is_some()
    }

    /// G code of the command, if it is a G command
    pub fn g(&self) -> Option<u32> {
        match self.command {
            Some(('G', code)) => Some(code),
            _ => None,
        }
    }

    /// Whether a parameter letter is present (with or without a number)
    pub fn has_letter(&self, letter: char) -> bool {
        self.word(letter).is_some()
    }

    /// Numeric value of a parameter letter
    ///
    /// Returns `None` if the letter is absent or carries no number.
    pub fn value(&self, letter: char) -> Option<f32> {
        self.word(letter).and_then(|word| word.value)
    }

    /// Numeric value of a parameter letter, 0.0 if absent or bare
    pub fn get_value(&self, letter: char) -> f32 {
        self.value(letter).unwrap_or(0.0)
    }

    fn word(&self, letter: char) -> Option<&Word> {
        let letter = letter.to_ascii_uppercase();
        self.params.iter().find(|word| word.letter == letter)
    }
}

fn command_code(word: Word) -> Result<u32, GcodeError> {
    let value = word.value.unwrap_or(0.0);
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f32 {
        return Err(GcodeError::InvalidNumber {
            letter: word.letter,
            text: value.to_string(),
        });
    }
    Ok(value as u32)
}

/// Remove `;` comments and parenthesized `( )` comments
///
/// An unclosed `(` comments out the rest of the line.
fn strip_comments(line: &str) -> String {
    let mut content = String::with_capacity(line.len());
    let mut in_paren = false;

    for c in line.chars() {
        match c {
            ';' if !in_paren => break,
            '(' => in_paren = true,
            ')' if in_paren => {
                in_paren = false;
                // Keep the words on both sides apart
                content.push(' ');
            }
            _ if !in_paren => content.push(c),
            _ => {}
        }
    }
    content
}

/// Iterator over the words of a comment-free line
struct Words<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Words<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn number_end(&self, start: usize) -> usize {
        let bytes = self.text.as_bytes();
        let mut end = start;
        if end < bytes.len() && matches!(bytes[end], b'+' | b'-') {
            end += 1;
        }
        let mantissa_start = end;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            end += 1;
        }

        // Exponent, only directly after digits and only if digits follow it
        let has_digits = bytes[mantissa_start..end].iter().any(u8::is_ascii_digit);
        if has_digits && end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
            let mut exp_end = end + 1;
            if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
                exp_end += 1;
            }
            let digits_start = exp_end;
            while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            if exp_end > digits_start {
                end = exp_end;
            }
        }
        end
    }
}

impl Iterator for Words<'_> {
    type Item = Result<Word, GcodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;

        let found = self.text[self.pos..].chars().next()?;
        if !found.is_ascii_alphabetic() {
            let column = self.pos + 1;
            // Stop iterating after reporting the error
            self.pos = self.text.len();
            return Some(Err(GcodeError::UnexpectedChar { found, column }));
        }

        let letter = found.to_ascii_uppercase();
        let start = self.pos + 1;
        let end = self.number_end(start);
        self.pos = end;

        let text = &self.text[start..end];
        if text.is_empty() {
            return Some(Ok(Word { letter, value: None }));
        }

        Some(match text.parse::<f32>() {
            Ok(value) => Ok(Word {
                letter,
                value: Some(value),
            }),
            Err(_) => Err(GcodeError::InvalidNumber {
                letter,
                text: text.to_string(),
            }),
        })
    }
}
