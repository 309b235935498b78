//! Path data tokenizer.
//!
//! Splits an SVG `d` attribute on whitespace and commas. Command letters are
//! always emitted as standalone tokens, so `M0,0` yields `M`, `0`, `0`.
//! Nothing is validated here; classification happens in [`super::segments`].

/// Path command letters recognised by the SVG grammar.
const COMMAND_LETTERS: &[u8] = b"MmLlHhVvCcSsQqTtAaZz";

fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b','
}

fn is_command(b: u8) -> bool {
    COMMAND_LETTERS.contains(&b)
}

/// Lazy iterator over the tokens of one path data string.
///
/// Cloning snapshots the current position; a clone taken before iterating
/// replays the whole sequence.
#[derive(Debug, Clone)]
pub struct PathTokens<'a> {
    data: &'a str,
    pos: usize,
}

/// Tokenize `data`. Empty or blank input produces an empty sequence.
pub fn tokenize(data: &str) -> PathTokens<'_> {
    PathTokens { data, pos: 0 }
}

impl<'a> PathTokens<'a> {
    /// The not-yet-consumed tail of the input.
    pub fn remainder(&self) -> &'a str {
        &self.data[self.pos..]
    }
}

impl<'a> Iterator for PathTokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.data.as_bytes();
        while self.pos < bytes.len() && is_separator(bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return None;
        }

        let start = self.pos;
        if is_command(bytes[start]) {
            self.pos += 1;
            return Some(&self.data[start..self.pos]);
        }

        // Separators and command letters are ASCII, so any stop position
        // lands on a char boundary.
        while self.pos < bytes.len()
            && !is_separator(bytes[self.pos])
            && !is_command(bytes[self.pos])
        {
            self.pos += 1;
        }
        Some(&self.data[start..self.pos])
    }
}

/// Whether a token is a finite numeric literal.
pub fn is_numeric(token: &str) -> bool {
    parse_number(token).is_some()
}

/// Parse a token as a finite number. `inf`/`NaN` spellings are rejected.
pub fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric coercion for anchor and attribute values: NaN when not a number.
pub fn coerce_number(token: &str) -> f64 {
    parse_number(token.trim()).unwrap_or(f64::NAN)
}
