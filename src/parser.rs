use crate::ast::{BinaryOperator, Block, BlockKind, LiteralValue, Node};
use crate::error::SyntaxError;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Literal, Token, TokenType};
use std::convert::TryFrom;
use std::rc::Rc;
use tracing::debug;

type ParseResult<T> = Result<T, SyntaxError>;

/// Deepest allowed nesting of groups, operators, and blocks.
pub const MAX_NESTING: usize = 512;

/// Parses a whole program. The token slice must end with an EOF token, as
/// `scanner::scan_tokens` produces.
pub fn parse(tokens: &[Token]) -> ParseResult<Block> {
    match tokens.last() {
        Some(last) if last.tokentype == TokenType::EOF => {
            let mut parser = Parser {
                tokens,
                current: 0,
                depth: 0,
            };
            parser.parse()
        }
        last => Err(SyntaxError::new(
            last.map_or(1, |token| token.line),
            "Token stream must end with an EOF token.",
        )),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn parse(&mut self) -> ParseResult<Block> {
        let line = self.peek().line;
        let mut statements: Vec<Node> = Vec::new();
        while !self.is_at_end() {
            statements.push(self.statement()?);
        }
        debug!(statements = statements.len(), "parsed program");
        Ok(Block {
            statements,
            kind: BlockKind::Global,
            line,
        })
    }
    fn statement(&mut self) -> ParseResult<Node> {
        match self.peek().tokentype {
            TokenType::Var => self.declaration(),
            TokenType::Identifier => self.reassignment(),
            TokenType::Print => {
                let line = self.advance().line;
                let value = self.expression()?;
                self.terminate()?;
                Ok(Node::Print {
                    value: Box::new(value),
                    line,
                })
            }
            TokenType::Input | TokenType::Call => {
                let expr = self.expression()?;
                self.terminate()?;
                Ok(expr)
            }
            TokenType::If => self.if_statement(),
            TokenType::Loop => self.loop_statement(),
            TokenType::Function => self.function_declaration(),
            TokenType::Return => {
                let line = self.advance().line;
                let value = match self.peek().tokentype {
                    TokenType::Semicolon => None,
                    _ => Some(Box::new(self.expression()?)),
                };
                self.terminate()?;
                Ok(Node::Return { value, line })
            }
            TokenType::Break => {
                let line = self.advance().line;
                self.terminate()?;
                Ok(Node::Break { line })
            }
            TokenType::Continue => {
                let line = self.advance().line;
                self.terminate()?;
                Ok(Node::Continue { line })
            }
            _ => Err(self.error("Expected a statement.")),
        }
    }
    fn terminate(&mut self) -> ParseResult<()> {
        self.consume(
            TokenType::Semicolon,
            "Expected ';' to terminate the statement.",
        )?;
        Ok(())
    }
    fn declaration(&mut self) -> ParseResult<Node> {
        self.advance();
        let (name, value) = self.assignment()?;
        Ok(Node::Declare {
            name: name.lexeme.clone(),
            value: Box::new(value),
            line: name.line,
        })
    }
    fn reassignment(&mut self) -> ParseResult<Node> {
        let (name, value) = self.assignment()?;
        Ok(Node::Reassign {
            name: name.lexeme.clone(),
            value: Box::new(value),
            line: name.line,
        })
    }
    fn assignment(&mut self) -> ParseResult<(&'a Token, Node)> {
        let name = self.consume(
            TokenType::Identifier,
            "Expected an identifier for assignment.",
        )?;
        self.consume(TokenType::Equal, "Expected '✍️' for assignment.")?;
        let value = self.expression()?;
        self.terminate()?;
        Ok((name, value))
    }
    fn if_statement(&mut self) -> ParseResult<Node> {
        let line = self.advance().line;
        let condition = self.expression()?;
        let body = self.block(BlockKind::Conditional, "if statement")?;
        let next = self.next_arm()?;
        Ok(Node::Conditional {
            condition: Some(Box::new(condition)),
            body,
            next,
            line,
        })
    }
    fn next_arm(&mut self) -> ParseResult<Option<Box<Node>>> {
        if !self.peek().tokentype.continues_if() {
            return Ok(None);
        }
        let arm = self.advance();
        match arm.tokentype {
            TokenType::ElseIf => {
                let condition = self.expression()?;
                let body = self.block(BlockKind::Conditional, "elseif")?;
                let next = self.next_arm()?;
                Ok(Some(Box::new(Node::Conditional {
                    condition: Some(Box::new(condition)),
                    body,
                    next,
                    line: arm.line,
                })))
            }
            _ => {
                let body = self.block(BlockKind::Conditional, "else")?;
                Ok(Some(Box::new(Node::Conditional {
                    condition: None,
                    body,
                    next: None,
                    line: arm.line,
                })))
            }
        }
    }
    fn loop_statement(&mut self) -> ParseResult<Node> {
        let line = self.advance().line;
        let condition = self.expression()?;
        let body = self.block(BlockKind::Loop, "loop")?;
        Ok(Node::Loop {
            condition: Box::new(condition),
            body,
            line,
        })
    }
    fn function_declaration(&mut self) -> ParseResult<Node> {
        let line = self.advance().line;
        let name = self.consume(
            TokenType::Identifier,
            "Expected an identifier for function declaration.",
        )?;
        self.consume(
            TokenType::LeftParen,
            "Expected left parenthesis for function declaration.",
        )?;
        let mut params: Vec<String> = Vec::new();
        while self.peek().tokentype == TokenType::Var {
            self.advance();
            let param = self.consume(
                TokenType::Identifier,
                "Expected an identifier for function argument declaration.",
            )?;
            params.push(param.lexeme.clone());
            if self.peek().tokentype == TokenType::Comma {
                self.advance();
            }
        }
        self.consume(
            TokenType::RightParen,
            "Expected right parenthesis for function declaration.",
        )?;
        let body = self.block(BlockKind::Function, "function")?;
        Ok(Node::FunctionDecl {
            name: name.lexeme.clone(),
            params,
            body: Rc::new(body),
            line,
        })
    }
    fn block(&mut self, kind: BlockKind, what: &str) -> ParseResult<Block> {
        let open = self.consume(
            TokenType::LeftBrace,
            &format!("Expected '{{' to begin {} block.", what),
        )?;
        let statements = self.nested(|parser| parser.block_statements())?;
        Ok(Block {
            statements,
            kind,
            line: open.line,
        })
    }
    fn block_statements(&mut self) -> ParseResult<Vec<Node>> {
        let mut statements: Vec<Node> = Vec::new();
        loop {
            match self.peek().tokentype {
                TokenType::RightBrace => {
                    self.advance();
                    break;
                }
                TokenType::EOF => return Err(self.error("Missing closing right brace.")),
                _ => statements.push(self.statement()?),
            }
        }
        Ok(statements)
    }
    /// Runs `f` one nesting level deeper, failing past `MAX_NESTING`.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| f(self));
        self.depth -= 1;
        result
    }
    fn too_deep(&self) -> SyntaxError {
        SyntaxError::new(
            self.peek().line,
            format!("Nesting exceeds the limit of {} levels.", MAX_NESTING),
        )
    }

    // Precedence tiers, loosest first. Every binary tier is left-associative.
    fn expression(&mut self) -> ParseResult<Node> {
        self.nested(Self::or)
    }
    fn or(&mut self) -> ParseResult<Node> {
        self.binary_tier(&[TokenType::Or], Self::and)
    }
    fn and(&mut self) -> ParseResult<Node> {
        self.binary_tier(&[TokenType::And], Self::comparison)
    }
    fn comparison(&mut self) -> ParseResult<Node> {
        self.binary_tier(
            &[
                TokenType::EqualEqual,
                TokenType::BangEqual,
                TokenType::Less,
                TokenType::LessEqual,
                TokenType::Greater,
                TokenType::GreaterEqual,
            ],
            Self::not,
        )
    }
    fn not(&mut self) -> ParseResult<Node> {
        match self.peek().tokentype {
            TokenType::Bang => {
                let operator = self.advance();
                self.expect_operand(operator)?;
                let operand = self.nested(Self::not)?;
                Ok(Node::Not {
                    operand: Box::new(operand),
                    line: operator.line,
                })
            }
            _ => self.additive(),
        }
    }
    fn additive(&mut self) -> ParseResult<Node> {
        self.binary_tier(&[TokenType::Plus, TokenType::Minus], Self::multiplicative)
    }
    fn multiplicative(&mut self) -> ParseResult<Node> {
        self.binary_tier(
            &[TokenType::Star, TokenType::Slash, TokenType::Percent],
            Self::exponent,
        )
    }
    fn exponent(&mut self) -> ParseResult<Node> {
        self.binary_tier(&[TokenType::Caret], Self::primary)
    }
    fn binary_tier(
        &mut self,
        operators: &[TokenType],
        next: fn(&mut Self) -> ParseResult<Node>,
    ) -> ParseResult<Node> {
        let mut expr = next(self)?;
        let mut chained = 0;
        while operators.contains(&self.peek().tokentype) {
            // A left-leaning chain deepens the tree one level per operator.
            chained += 1;
            if self.depth + chained > MAX_NESTING {
                return Err(self.too_deep());
            }
            let operator = self.advance();
            self.expect_operand(operator)?;
            let right = next(self)?;
            let binary = BinaryOperator::try_from(operator.tokentype).map_err(|tokentype| {
                SyntaxError::new(
                    operator.line,
                    format!("{} is not a binary operator.", tokentype),
                )
            })?;
            expr = Node::Binary {
                operator: binary,
                left: Box::new(expr),
                right: Box::new(right),
                line: operator.line,
            };
        }
        Ok(expr)
    }
    fn expect_operand(&self, operator: &Token) -> ParseResult<()> {
        if self.peek().tokentype.starts_expression() {
            Ok(())
        } else {
            Err(SyntaxError::new(
                operator.line,
                "Invalid expression: missing right operand.",
            ))
        }
    }
    fn primary(&mut self) -> ParseResult<Node> {
        let token = self.peek();
        match token.tokentype {
            TokenType::Number | TokenType::String | TokenType::True | TokenType::False => {
                self.advance();
                let value = match &token.literal {
                    Some(Literal::Number(x)) => LiteralValue::Number(*x),
                    Some(Literal::String(x)) => LiteralValue::String(x.clone()),
                    Some(Literal::Boolean(x)) => LiteralValue::Boolean(*x),
                    None => {
                        return Err(SyntaxError::new(
                            token.line,
                            format!("Literal {} carries no value.", token),
                        ))
                    }
                };
                Ok(Node::Literal {
                    value,
                    line: token.line,
                })
            }
            TokenType::Identifier => {
                self.advance();
                Ok(Node::Variable {
                    name: token.lexeme.clone(),
                    line: token.line,
                })
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                match self.peek().tokentype {
                    TokenType::RightParen => {
                        self.advance();
                        Ok(expr)
                    }
                    _ => Err(SyntaxError::new(
                        token.line,
                        "Left parenthesis missing closing right.",
                    )),
                }
            }
            TokenType::Call => self.call(),
            TokenType::Input => {
                self.advance();
                self.expect_operand(token)?;
                let prompt = self.nested(Self::primary)?;
                Ok(Node::Input {
                    prompt: Box::new(prompt),
                    line: token.line,
                })
            }
            t if t.is_binary_operator() => Err(SyntaxError::new(
                token.line,
                "Invalid expression: missing left operand.",
            )),
            t if !t.is_valid_expression() => Err(SyntaxError::new(
                token.line,
                format!("Invalid token in expression: {}", token),
            )),
            _ => Err(SyntaxError::new(
                token.line,
                "Invalid expression: no valid operations found.",
            )),
        }
    }
    fn call(&mut self) -> ParseResult<Node> {
        let line = self.advance().line;
        let name = self.consume(
            TokenType::Identifier,
            "Expected an identifier for function call.",
        )?;
        self.consume(
            TokenType::LeftParen,
            "Expected left parenthesis for function call.",
        )?;
        let mut arguments: Vec<Node> = Vec::new();
        if self.peek().tokentype != TokenType::RightParen {
            loop {
                arguments.push(self.expression()?);
                match self.peek().tokentype {
                    TokenType::Comma => {
                        self.advance();
                    }
                    _ => break,
                }
            }
        }
        self.consume(
            TokenType::RightParen,
            "Expected right parenthesis for function call.",
        )?;
        Ok(Node::FunctionCall {
            name: name.lexeme.clone(),
            arguments,
            line,
        })
    }
    fn consume(&mut self, tokentype: TokenType, message: &str) -> ParseResult<&'a Token> {
        if self.peek().tokentype == tokentype {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }
    fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }
    fn is_at_end(&self) -> bool {
        self.peek().tokentype == TokenType::EOF
    }
    fn peek(&self) -> &'a Token {
        &self.tokens[self.current]
    }
    fn previous(&self) -> &'a Token {
        &self.tokens[self.current.saturating_sub(1)]
    }
    fn error(&self, message: &str) -> SyntaxError {
        let token = self.peek();
        SyntaxError::new(token.line, format!("{} Found {}.", message, token))
    }
}
