//! Tokenizer for the commodore file format.
//!
//! Converts a character stream into a lazy, peekable stream of [`Token`]s:
//!
//! - `{`, `}` and `;` are standalone structural tokens.
//! - Runs of printable ASCII (`'!'..='~'`) other than the structural characters
//!   and `"` form words.
//! - Double-quoted strings form a single word; the quotes are dropped and
//!   backslash escapes are decoded. A quoted string also ends at a newline or at
//!   the end of the input.
//! - `// line` and `/* block */` comments and whitespace (every character up to
//!   and including space) separate tokens and never produce one.
//!
//! Anything else outside a quoted string is a lex error.

use std::fmt;
use std::io::BufRead;

use serde::Serialize;
use tracing::trace;

use crate::err_at;
use crate::syntax::reader::SourceReader;
use crate::syntax::{Span, Spanned};
use crate::CommodoreError;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Token {
    /// `{`
    OpenScope,
    /// `}`
    CloseScope,
    /// `;`
    Terminator,
    /// A bare or quoted word.
    Word(String),
    EndOfInput,
}

impl Token {
    pub fn is_word(&self) -> bool {
        matches!(self, Token::Word(_))
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(text) => Some(text),
            _ => None,
        }
    }

    /// Describes the token for "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            Token::OpenScope => "'{'".to_string(),
            Token::CloseScope => "'}'".to_string(),
            Token::Terminator => "';'".to_string(),
            Token::Word(text) => format!("word '{}'", text),
            Token::EndOfInput => "end of input".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// A sequential token source with one token of lookahead.
///
/// This is what the parser and extension argument type resolvers consume.
/// After the end of the input, every call yields [`Token::EndOfInput`].
pub trait TokenStream {
    /// Returns and consumes the next token.
    fn next_token(&mut self) -> Result<Spanned<Token>, CommodoreError>;

    /// Returns the next token without consuming it.
    fn peek_token(&mut self) -> Result<&Spanned<Token>, CommodoreError>;

    /// The 1-based line of the most recently produced token.
    fn current_line(&self) -> usize;

    /// Consumes the next token only if it is a word.
    fn next_word_if_present(&mut self) -> Result<Option<Spanned<String>>, CommodoreError> {
        if !self.peek_token()?.value.is_word() {
            return Ok(None);
        }
        let token = self.next_token()?;
        match token.value {
            Token::Word(text) => Ok(Some(Spanned::new(text, token.span))),
            _ => Ok(None),
        }
    }
}

/// Lazy tokenizer over any buffered reader.
#[derive(Debug)]
pub struct Lexer<R> {
    reader: SourceReader<R>,
    peeked: Option<Spanned<Token>>,
    line: usize,
}

impl<'a> Lexer<&'a [u8]> {
    /// Creates a lexer over in-memory text.
    pub fn for_str(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl<R: BufRead> Lexer<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: SourceReader::new(source),
            peeked: None,
            line: 1,
        }
    }

    /// All source text read so far.
    pub fn source_text(&self) -> &str {
        self.reader.consumed()
    }

    fn lex(&mut self) -> Result<Spanned<Token>, CommodoreError> {
        self.skip_trivia()?;

        let start = self.reader.offset();
        let line = self.reader.line();
        self.line = line;

        let Some(ch) = self.peek_char()? else {
            return Ok(Spanned::new(Token::EndOfInput, Span::new(start, start, line)));
        };

        let token = match ch {
            '{' | '}' | ';' => {
                self.next_char()?;
                match ch {
                    '{' => Token::OpenScope,
                    '}' => Token::CloseScope,
                    _ => Token::Terminator,
                }
            }
            '"' => {
                self.next_char()?;
                Token::Word(self.read_quoted()?)
            }
            c if is_word_char(c) => Token::Word(self.read_word()?),
            other => {
                let span = Span::new(start, start + other.len_utf8(), line);
                return Err(err_at!(
                    Lex,
                    span,
                    "unknown character {:?} (U+{:04X})",
                    other,
                    other as u32
                )
                .with_help("quote words that contain characters outside printable ASCII"));
            }
        };

        let span = Span::new(start, self.reader.offset(), line);
        trace!(line, token = %token, "lexed token");
        Ok(Spanned::new(token, span))
    }

    fn skip_trivia(&mut self) -> Result<(), CommodoreError> {
        while let Some(ch) = self.peek_char()? {
            if ch <= ' ' {
                self.next_char()?;
            } else if ch == '/' && self.peek_second_char()? == Some('/') {
                while let Some(c) = self.next_char()? {
                    if c == '\n' {
                        break;
                    }
                }
            } else if ch == '/' && self.peek_second_char()? == Some('*') {
                self.next_char()?;
                self.next_char()?;
                // An unterminated block comment runs to the end of the input.
                while let Some(c) = self.next_char()? {
                    if c == '*' && self.peek_char()? == Some('/') {
                        self.next_char()?;
                        break;
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn read_word(&mut self) -> Result<String, CommodoreError> {
        let mut word = String::new();
        while let Some(ch) = self.peek_char()? {
            if !is_word_char(ch) || self.at_comment_start(ch)? {
                break;
            }
            word.push(ch);
            self.next_char()?;
        }
        Ok(word)
    }

    fn read_quoted(&mut self) -> Result<String, CommodoreError> {
        let mut text = String::new();
        while let Some(ch) = self.peek_char()? {
            match ch {
                '"' => {
                    self.next_char()?;
                    break;
                }
                '\n' | '\r' => break,
                '\\' => {
                    self.next_char()?;
                    if let Some(escaped) = self.read_escape()? {
                        text.push(escaped);
                    }
                }
                _ => {
                    text.push(ch);
                    self.next_char()?;
                }
            }
        }
        Ok(text)
    }

    /// Decodes the character after a backslash.
    fn read_escape(&mut self) -> Result<Option<char>, CommodoreError> {
        let Some(ch) = self.next_char()? else {
            return Ok(None);
        };
        let decoded = match ch {
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0B}',
            '0'..='7' => {
                // Up to three octal digits, capped at \377.
                let max_digits = if ch <= '3' { 3 } else { 2 };
                let mut value = ch as u32 - '0' as u32;
                for _ in 1..max_digits {
                    match self.peek_char()? {
                        Some(d @ '0'..='7') => {
                            value = value * 8 + (d as u32 - '0' as u32);
                            self.next_char()?;
                        }
                        _ => break,
                    }
                }
                char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
            }
            other => other,
        };
        Ok(Some(decoded))
    }

    fn at_comment_start(&mut self, ch: char) -> Result<bool, CommodoreError> {
        if ch != '/' {
            return Ok(false);
        }
        Ok(matches!(self.peek_second_char()?, Some('/') | Some('*')))
    }

    // ------------------------------------------------------------------------
    // Reader access with I/O failures mapped to lex errors
    // ------------------------------------------------------------------------

    fn io_span(&self) -> Span {
        let offset = self.reader.offset();
        Span::new(offset, offset, self.reader.line())
    }

    fn peek_char(&mut self) -> Result<Option<char>, CommodoreError> {
        let span = self.io_span();
        self.reader
            .peek()
            .map_err(|e| CommodoreError::read_failure(e, span))
    }

    fn peek_second_char(&mut self) -> Result<Option<char>, CommodoreError> {
        let span = self.io_span();
        self.reader
            .peek_second()
            .map_err(|e| CommodoreError::read_failure(e, span))
    }

    fn next_char(&mut self) -> Result<Option<char>, CommodoreError> {
        let span = self.io_span();
        self.reader
            .next_char()
            .map_err(|e| CommodoreError::read_failure(e, span))
    }
}

impl<R: BufRead> TokenStream for Lexer<R> {
    fn next_token(&mut self) -> Result<Spanned<Token>, CommodoreError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lex(),
        }
    }

    fn peek_token(&mut self) -> Result<&Spanned<Token>, CommodoreError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lex()?,
        };
        let token: &Spanned<Token> = self.peeked.insert(token);
        Ok(token)
    }

    fn current_line(&self) -> usize {
        self.line
    }
}

/// Characters that may appear in an unquoted word.
fn is_word_char(ch: char) -> bool {
    matches!(ch, '!'..='~') && !matches!(ch, '{' | '}' | ';' | '"')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token> {
        let mut lexer = Lexer::for_str(text);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap().value;
            if token == Token::EndOfInput {
                return out;
            }
            out.push(token);
        }
    }

    fn word(text: &str) -> Token {
        Token::Word(text.to_string())
    }

    #[test]
    fn test_structural_and_words() {
        assert_eq!(
            tokens("root {\n  count integer 0 10;\n}"),
            vec![
                word("root"),
                Token::OpenScope,
                word("count"),
                word("integer"),
                word("0"),
                word("10"),
                Token::Terminator,
                Token::CloseScope,
            ]
        );
    }

    #[test]
    fn test_structural_chars_split_words() {
        assert_eq!(
            tokens("a{b;c}"),
            vec![
                word("a"),
                Token::OpenScope,
                word("b"),
                Token::Terminator,
                word("c"),
                Token::CloseScope,
            ]
        );
    }

    #[test]
    fn test_comments_are_discarded() {
        let source = "// heading\nroot /* inline\n block */ { leaf; // trailing\n}";
        assert_eq!(
            tokens(source),
            vec![
                word("root"),
                Token::OpenScope,
                word("leaf"),
                Token::Terminator,
                Token::CloseScope,
            ]
        );
    }

    #[test]
    fn test_comment_directly_after_word() {
        assert_eq!(tokens("leaf// note\n;"), vec![word("leaf"), Token::Terminator]);
        assert_eq!(tokens("a/b"), vec![word("a/b")]);
    }

    #[test]
    fn test_quoted_strings_are_words() {
        assert_eq!(
            tokens(r#""hello world" "{" "a\tb\"c" "\101""#),
            vec![word("hello world"), word("{"), word("a\tb\"c"), word("A")]
        );
    }

    #[test]
    fn test_quoted_string_ends_at_newline() {
        assert_eq!(tokens("\"open\nnext"), vec![word("open"), word("next")]);
        assert_eq!(tokens("\"\""), vec![word("")]);
    }

    #[test]
    fn test_peek_is_idempotent() {
        let mut lexer = Lexer::for_str("a b");
        let first = lexer.peek_token().unwrap().clone();
        for _ in 0..5 {
            assert_eq!(lexer.peek_token().unwrap(), &first);
        }
        assert_eq!(lexer.next_token().unwrap(), first);
        assert_eq!(lexer.next_token().unwrap().value, word("b"));
    }

    #[test]
    fn test_end_of_input_repeats() {
        let mut lexer = Lexer::for_str("x");
        lexer.next_token().unwrap();
        for _ in 0..3 {
            assert_eq!(lexer.next_token().unwrap().value, Token::EndOfInput);
            assert_eq!(lexer.peek_token().unwrap().value, Token::EndOfInput);
        }
    }

    #[test]
    fn test_current_line_follows_tokens() {
        let mut lexer = Lexer::for_str("a\n\nb /* x\ny */ c\n");
        lexer.next_token().unwrap();
        assert_eq!(lexer.current_line(), 1);
        lexer.next_token().unwrap();
        assert_eq!(lexer.current_line(), 3);
        let c = lexer.next_token().unwrap();
        assert_eq!(c.span.line, 4);
        assert_eq!(lexer.current_line(), 4);
        let end = lexer.next_token().unwrap();
        assert_eq!(end.value, Token::EndOfInput);
        assert_eq!(end.span.line, 5);
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let mut lexer = Lexer::for_str("ab \"cd\";");
        assert_eq!(lexer.next_token().unwrap().span, Span::new(0, 2, 1));
        assert_eq!(lexer.next_token().unwrap().span, Span::new(3, 7, 1));
        assert_eq!(lexer.next_token().unwrap().span, Span::new(7, 8, 1));
    }

    #[test]
    fn test_unknown_character_fails_with_line() {
        let mut lexer = Lexer::for_str("ok;\nbad é");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.error_type(), crate::ErrorType::Lex);
        assert_eq!(err.line(), 2);
        assert!(err.message().contains("unknown character"));
    }

    #[test]
    fn test_control_characters_are_whitespace() {
        assert_eq!(tokens("a\u{0}\u{1}\tb\r\n"), vec![word("a"), word("b")]);
    }
}
