//! FILENAME: parser/src/lexer.rs
//! PURPOSE: Scans a raw formula string and produces a stream of Tokens.
//! CONTEXT: First stage of the parsing pipeline. Handles whitespace
//! skipping, number literals (including exponents), and cell-reference
//! identifiers.

use crate::token::Token;
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.input.next() {
            Some('+') => Token::Plus,
            Some('-') => Token::Minus,
            Some('*') => Token::Star,
            Some('/') => Token::Slash,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,

            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch),
            Some(ch) if ch.is_ascii_alphabetic() => self.read_cell_ref(ch),

            None => Token::EOF,
            Some(ch) => Token::Illegal(ch),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.input.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.input.next();
        }
    }

    /// Reads a base-10 floating point literal with an optional decimal
    /// point and an optional exponent (`1e10`, `2.5e-3`, `1.`).
    fn read_number(&mut self, first_char: char) -> Token {
        let mut text = String::from(first_char);
        let mut has_dot = first_char == '.';

        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.input.next();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                text.push(ch);
                self.input.next();
            } else {
                break;
            }
        }

        if matches!(self.input.peek(), Some('e') | Some('E')) {
            self.read_exponent(&mut text);
        }

        match text.parse::<f64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Illegal(first_char),
        }
    }

    /// Consumes an exponent suffix (`e`/`E`, optional sign, digits) into
    /// `text` only if it's followed by at least one digit — otherwise the
    /// `e`/`E` is left untouched for the caller (it isn't part of this
    /// number, e.g. a bare trailing letter would be a lexer error).
    fn read_exponent(&mut self, text: &mut String) {
        let mut lookahead = self.input.clone();
        let e = lookahead.next().unwrap();
        let sign = match lookahead.peek() {
            Some('+') | Some('-') => lookahead.next(),
            _ => None,
        };
        let mut digits = String::new();
        while let Some(&ch) = lookahead.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                lookahead.next();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return;
        }
        text.push(e);
        if let Some(s) = sign {
            text.push(s);
        }
        text.push_str(&digits);
        self.input = lookahead;
    }

    /// Reads exactly one `column-letters row-digits` run (e.g. "A1",
    /// "ZZ99") into a single `CellRef` token — a letter run followed by a
    /// digit run, stopping the moment the digit run ends. This keeps
    /// `=A1B2` two adjacent tokens ("A1", "B2") rather than one malformed
    /// one: the trailing "B2" then surfaces as the ordinary "unexpected
    /// trailing token" parse error instead of silently becoming an
    /// `InvalidCellRef`. The parser still decides whether the text is
    /// actually a valid, in-range position.
    fn read_cell_ref(&mut self, first_char: char) -> Token {
        let mut text = String::from(first_char);
        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_alphabetic() {
                text.push(ch);
                self.input.next();
            } else {
                break;
            }
        }
        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.input.next();
            } else {
                break;
            }
        }
        Token::CellRef(text.to_uppercase())
    }
}
