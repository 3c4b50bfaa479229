//! Text assembler for chronoweave programs.
//!
//! The syntax is a sequence of mnemonics, each optionally followed by an
//! integer literal:
//!
//! ```text
//! # store 7 at address 5
//! pos 5
//! read 7
//! write
//! ```
//!
//! Whitespace (including newlines) separates tokens, `#` starts a comment
//! running to the end of the line, and mnemonics are case-insensitive.

use crate::ast::{Instruction, OpCode, Program};
use crate::core::{ChronoError, ChronoResult, Value};

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A mnemonic (or something that should have been one).
    Word(String),
    /// An integer literal, kept as text until parsing so that overflow is
    /// reported with its line.
    Number(String),
}

/// A token with the 1-based line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub line: usize,
}

/// Split source text into tokens.
pub fn tokenize(input: &str) -> Vec<SpannedToken> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\n' => {
                line += 1;
                i += 1;
            }

            c if c.is_whitespace() => {
                i += 1;
            }

            // Line comment
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }

            // Number, possibly negative
            c if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).map_or(false, |n| n.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                tokens.push(SpannedToken {
                    token: Token::Number(chars[start..i].iter().collect()),
                    line,
                });
            }

            _ => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '#' {
                    i += 1;
                }
                tokens.push(SpannedToken {
                    token: Token::Word(chars[start..i].iter().collect()),
                    line,
                });
            }
        }
    }

    tokens
}

/// Parser over a token stream.
pub struct Parser<'a> {
    tokens: &'a [SpannedToken],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [SpannedToken]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the whole stream into a validated program.
    pub fn parse_program(&mut self) -> ChronoResult<Program> {
        let mut instructions = Vec::new();
        let mut lines = Vec::new();

        while let Some(spanned) = self.tokens.get(self.pos) {
            self.pos += 1;
            let line = spanned.line;
            let opcode = match &spanned.token {
                Token::Word(word) => word.parse::<OpCode>().map_err(|e| e.at_line(line))?,
                Token::Number(text) => {
                    let literal = parse_literal(text).map_err(|e| e.at_line(line))?;
                    return Err(ChronoError::StrayLiteral { literal }.at_line(line));
                }
            };

            let literal = match self.tokens.get(self.pos) {
                Some(SpannedToken { token: Token::Number(text), line: lit_line }) => {
                    self.pos += 1;
                    Some(parse_literal(text).map_err(|e| e.at_line(*lit_line))?)
                }
                _ => None,
            };

            instructions.push(Instruction::new(opcode, literal));
            lines.push(line);
        }

        Program::new(instructions).map_err(|e| match e {
            ChronoError::UnexpectedLiteral { step, .. } => {
                let line = lines.get(step).copied().unwrap_or(0);
                e.at_line(line)
            }
            other => other,
        })
    }
}

fn parse_literal(text: &str) -> ChronoResult<Value> {
    text.parse::<Value>()
        .map_err(|_| ChronoError::InvalidLiteral { text: text.to_string() })
}

/// Tokenize and parse in one go.
pub fn parse(source: &str) -> ChronoResult<Program> {
    let tokens = tokenize(source);
    Parser::new(&tokens).parse_program()
}
