/// Input unit that submits the current line.
pub const SUBMIT: char = '\r';
/// Input unit that erases the last buffered character.
pub const ERASE: char = '\x7f';
/// What the viewport is sent to visually remove one character.
pub const ERASE_SEQUENCE: &str = "\x08 \x08";

/// What the session should do after one input unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    /// Echo the character; it was appended to the buffer.
    Echo(char),
    /// The last character was removed; write [`ERASE_SEQUENCE`].
    Erase,
    /// A non-blank line was submitted. Carries the trimmed text.
    Submit(String),
    /// A blank line was submitted; redraw the prompt.
    Reprompt,
    Noop,
}

/// Local line buffer. Only submit and erase are interpreted; every other unit
/// is taken verbatim.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, unit: char) -> LineAction {
        match unit {
            SUBMIT => {
                let line = std::mem::take(&mut self.buffer);
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    LineAction::Reprompt
                } else {
                    LineAction::Submit(trimmed.to_string())
                }
            }
            ERASE => match self.buffer.pop() {
                Some(_) => LineAction::Erase,
                None => LineAction::Noop,
            },
            c => {
                self.buffer.push(c);
                LineAction::Echo(c)
            }
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}
