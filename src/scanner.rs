use crate::error::SyntaxError;
use crate::token::{Literal, Token, TokenType};
use phf::phf_map;
use std::iter::Peekable;
use std::str::CharIndices;
use tracing::debug;

const VARIATION_SELECTOR: char = '\u{FE0F}';
const ZERO_WIDTH_SPACE: char = '\u{200B}';

// Note: current becomes self.iter.peek()?.0
struct Scanner<'a> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
    start: usize,
    line: usize,
}

pub fn scan_tokens(source: &str) -> (Vec<Token>, Vec<SyntaxError>) {
    let mut scanner = Scanner {
        source,
        iter: source.char_indices().peekable(),
        start: 0,
        line: 1,
    };
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<SyntaxError> = Vec::new();

    while let Some((idx, _)) = scanner.iter.peek() {
        scanner.start = *idx;
        match scanner.scan_token() {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }
    tokens.push(Token {
        tokentype: TokenType::EOF,
        lexeme: String::new(),
        literal: None,
        line: scanner.line,
    });
    debug!(
        tokens = tokens.len(),
        errors = errors.len(),
        "scanned source"
    );
    (tokens, errors)
}

impl<'a> Scanner<'a> {
    fn scan_token(&mut self) -> Result<Option<Token>, SyntaxError> {
        let c = match self.iter.next() {
            Some((_, c)) => c,
            None => return Ok(None),
        };
        match c {
            '(' => Ok(Some(self.token(TokenType::LeftParen))),
            ')' => Ok(Some(self.token(TokenType::RightParen))),
            '{' => Ok(Some(self.token(TokenType::LeftBrace))),
            '}' => Ok(Some(self.token(TokenType::RightBrace))),
            ',' => Ok(Some(self.token(TokenType::Comma))),
            '.' => Ok(Some(self.token(TokenType::Dot))),
            ';' => Ok(Some(self.token(TokenType::Semicolon))),
            '-' => Ok(Some(self.token(TokenType::Minus))),
            '+' => Ok(Some(self.token(TokenType::Plus))),
            '*' => Ok(Some(self.token(TokenType::Star))),
            '/' => Ok(Some(self.token(TokenType::Slash))),
            '%' => Ok(Some(self.token(TokenType::Percent))),
            '^' => Ok(Some(self.token(TokenType::Caret))),
            '!' => Ok(Some(self.compound('=', TokenType::BangEqual, TokenType::Bang))),
            '=' => Ok(Some(self.compound('=', TokenType::EqualEqual, TokenType::Equal))),
            '<' => Ok(Some(self.compound('=', TokenType::LessEqual, TokenType::Less))),
            '>' => Ok(Some(self.compound('=', TokenType::GreaterEqual, TokenType::Greater))),
            '🙅' => Ok(Some(self.compound('🤝', TokenType::BangEqual, TokenType::Bang))),
            '👇' => Ok(Some(self.compound('🤝', TokenType::LessEqual, TokenType::Less))),
            '☝' => Ok(Some(self.compound('🤝', TokenType::GreaterEqual, TokenType::Greater))),
            '🧐' => {
                while let Some((_, c)) = self.iter.peek() {
                    match c {
                        '\n' => {
                            break;
                        }
                        _ => {
                            self.iter.next();
                        }
                    }
                }
                Ok(None)
            }
            ' ' | '\r' | '\t' | ZERO_WIDTH_SPACE | VARIATION_SELECTOR => Ok(None),
            '\n' => {
                self.line += 1;
                Ok(None)
            }
            '"' => self.string().map(Some),
            '0'..='9' => self.number().map(Some),
            c if c.is_alphanumeric() || c == '_' => Ok(Some(self.word())),
            c => match SYMBOLS.get(&c) {
                Some(tokentype) => {
                    self.skip_variation_selector();
                    let literal = match tokentype {
                        TokenType::True => Some(Literal::Boolean(true)),
                        TokenType::False => Some(Literal::Boolean(false)),
                        _ => None,
                    };
                    Ok(Some(self.token_with_literal(*tokentype, literal)))
                }
                None => Err(SyntaxError::new(
                    self.line,
                    format!("Unexpected character [{}]", c),
                )),
            },
        }
    }
    fn current(&mut self) -> usize {
        match self.iter.peek() {
            None => self.source.len(),
            Some((idx, _)) => *idx,
        }
    }
    fn token(&mut self, tokentype: TokenType) -> Token {
        self.token_with_literal(tokentype, None)
    }
    fn token_with_literal(&mut self, tokentype: TokenType, literal: Option<Literal>) -> Token {
        let current = self.current();
        Token {
            tokentype,
            lexeme: self.source[self.start..current].to_string(),
            literal,
            line: self.line,
        }
    }
    fn next_if(&mut self, expected: char) -> bool {
        if let Some((_, c)) = self.iter.peek() {
            if *c == expected {
                self.iter.next();
                return true;
            }
        }
        false
    }
    fn skip_variation_selector(&mut self) {
        self.next_if(VARIATION_SELECTOR);
    }
    /// Picks the two-symbol kind when `second` follows, the single kind otherwise.
    fn compound(&mut self, second: char, double: TokenType, single: TokenType) -> Token {
        self.skip_variation_selector();
        if self.next_if(second) {
            self.skip_variation_selector();
            self.token(double)
        } else {
            self.token(single)
        }
    }
    fn string(&mut self) -> Result<Token, SyntaxError> {
        while let Some((_, c)) = self.iter.peek() {
            match c {
                '"' => {
                    break;
                }
                '\n' => {
                    self.line += 1;
                    self.iter.next();
                }
                _ => {
                    self.iter.next();
                }
            }
        }
        if self.iter.next().is_none() {
            return Err(SyntaxError::new(self.line, "Unterminated string."));
        }
        let current = self.current();
        let value = self.source[self.start + 1..current - 1].to_string();
        Ok(self.token_with_literal(TokenType::String, Some(Literal::String(value))))
    }
    fn digits(&mut self) {
        while let Some((_, c)) = self.iter.peek() {
            match c {
                '0'..='9' => {
                    self.iter.next();
                }
                _ => {
                    break;
                }
            }
        }
    }
    fn number(&mut self) -> Result<Token, SyntaxError> {
        self.digits();
        if self.next_if('.') {
            self.digits();
        }
        let current = self.current();
        let text = &self.source[self.start..current];
        let value: f64 = text
            .parse()
            .map_err(|_| SyntaxError::new(self.line, format!("Invalid number [{}]", text)))?;
        Ok(self.token_with_literal(TokenType::Number, Some(Literal::Number(value))))
    }
    /// `and`/`or` win over identifier scanning whenever the source continues with them.
    fn word(&mut self) -> Token {
        let rest = &self.source[self.start..];
        if rest.starts_with("and") {
            self.iter.next();
            self.iter.next();
            return self.token(TokenType::And);
        }
        if rest.starts_with("or") {
            self.iter.next();
            return self.token(TokenType::Or);
        }
        while let Some((_, c)) = self.iter.peek() {
            if c.is_alphanumeric() || *c == '_' {
                self.iter.next();
            } else {
                break;
            }
        }
        self.token(TokenType::Identifier)
    }
}

static SYMBOLS: phf::Map<char, TokenType> = phf_map! {
    '✍' => TokenType::Equal,
    '🤝' => TokenType::EqualEqual,
    '➕' => TokenType::Plus,
    '➖' => TokenType::Minus,
    '✖' => TokenType::Star,
    '➗' => TokenType::Slash,
    '🍕' => TokenType::Percent,
    '🥕' => TokenType::Caret,
    '🥸' => TokenType::Var,
    '🗣' => TokenType::Print,
    '🖊' => TokenType::Input,
    '🫡' => TokenType::Return,
    '🛠' => TokenType::Function,
    '👀' => TokenType::Call,
    '🤔' => TokenType::If,
    '🙈' => TokenType::ElseIf,
    '💅' => TokenType::Else,
    '🔁' => TokenType::Loop,
    '💥' => TokenType::Break,
    '🤓' => TokenType::Continue,
    '😤' => TokenType::True,
    '😔' => TokenType::False,
};
