use std::fmt;
use strum_macros::Display;

#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TokenType {
    // Single-character tokens.
    LeftParen, RightParen, LeftBrace, RightBrace,
    Comma, Dot, Semicolon,
    Minus, Plus, Star, Slash, Percent, Caret,

    // One or two character tokens.
    Bang, BangEqual,
    Equal, EqualEqual,
    Greater, GreaterEqual,
    Less, LessEqual,

    // Literals.
    Identifier, String, Number,

    // Keywords.
    And, Or, True, False,
    Var, Print, Input, If, ElseIf, Else, Loop,
    Function, Return, Break, Continue, Call,

    EOF
}

pub const TRUE_SYMBOL: &str = "😤";
pub const FALSE_SYMBOL: &str = "😔";

impl TokenType {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenType::Number | TokenType::String | TokenType::True | TokenType::False
        )
    }

    pub fn is_binary_operator(self) -> bool {
        matches!(
            self,
            TokenType::Minus
                | TokenType::Plus
                | TokenType::Star
                | TokenType::Slash
                | TokenType::Percent
                | TokenType::Caret
                | TokenType::BangEqual
                | TokenType::EqualEqual
                | TokenType::Greater
                | TokenType::GreaterEqual
                | TokenType::Less
                | TokenType::LessEqual
                | TokenType::And
                | TokenType::Or
        )
    }

    pub fn is_unary_operator(self) -> bool {
        self == TokenType::Bang
    }

    /// Tokens that may appear inside an expression.
    pub fn is_valid_expression(self) -> bool {
        self.is_literal()
            || self.is_binary_operator()
            || self.is_unary_operator()
            || matches!(
                self,
                TokenType::Identifier
                    | TokenType::LeftParen
                    | TokenType::RightParen
                    | TokenType::Call
                    | TokenType::Input
            )
    }

    /// Tokens that may start an expression.
    pub fn starts_expression(self) -> bool {
        self.is_literal()
            || self.is_unary_operator()
            || matches!(
                self,
                TokenType::Identifier | TokenType::LeftParen | TokenType::Call | TokenType::Input
            )
    }

    pub fn continues_if(self) -> bool {
        matches!(self, TokenType::ElseIf | TokenType::Else)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tokentype: TokenType,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tokentype {
            TokenType::EOF => write!(f, "end of file"),
            _ => write!(f, "{} '{}'", self.tokentype, self.lexeme),
        }
    }
}
