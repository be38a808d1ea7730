use Token::*;

/// All the commands that can be in a BF program.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Token {
    /// `>`; Increment the data pointer by one (to point to the next cell to the right).
    RAngle,
    /// `<`; Decrement the data pointer by one (to point to the next cell to the left).
    LAngle,

    /// `+`; Increment the byte at the data pointer by one.
    Plus,
    /// `-`; Decrement the byte at the data pointer by one
    Minus,

    /// `.`; Output the byte at the data pointer.
    Dot,
    /// `,`; Accept one byte of input, storing its value in the byte at the data pointer.
    Comma,

    /// `[`
    LBrack,
    /// `]`
    RBrack,
}

impl Token {
    /// Recognizes a command byte; anything else is a comment.
    pub const fn from_byte(c: u8) -> Option<Self> {
        let t = match c {
            b'<' => LAngle,
            b'>' => RAngle,

            b'+' => Plus,
            b'-' => Minus,

            b'.' => Dot,
            b',' => Comma,

            b'[' => LBrack,
            b']' => RBrack,

            _ => return None,
        };

        Some(t)
    }
}

/// Creates a [`fn@Lexer`] which lexes the `source`.
#[allow(non_snake_case)]
pub fn Lexer(source: &[u8]) -> Lexer<'_> {
    Lexer {
        source: source.iter(),
    }
}

/// A lexer, duh.
///
/// Cloning it gives a lexer that starts over from the same position.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: std::slice::Iter<'a, u8>,
}

impl Lexer<'_> {
    /// Returns a *hint* on number of tokens returned by the lexer.
    ///
    /// This is an upper bound, since comments are skipped.
    pub fn len_hint(&self) -> usize {
        self.source.len()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Returns the next command, skipping everything that isn't one.
    ///
    /// `None` means the end of the source was reached.
    fn next(&mut self) -> Option<Token> {
        self.source.by_ref().find_map(|&c| Token::from_byte(c))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.len_hint()))
    }
}
