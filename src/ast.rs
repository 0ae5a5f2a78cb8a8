use crate::callable::MojiFunction;
use crate::token::{TokenType, FALSE_SYMBOL, TRUE_SYMBOL};
use std::convert::TryFrom;
use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;
use strum_macros::Display;

#[derive(Debug, Clone)]
pub enum Value {
    None,
    Boolean(bool),
    Number(f64),
    String(String),
    Function(Rc<MojiFunction>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Boolean(true) => write!(f, "{}", TRUE_SYMBOL),
            Value::Boolean(false) => write!(f, "{}", FALSE_SYMBOL),
            Value::Number(x) => fmt_number(*x, f),
            Value::String(x) => write!(f, "{}", x),
            Value::Function(function) => write!(f, "{}", function),
        }
    }
}

// Integral numbers keep a trailing ".0" so every number reads as a float.
// Magnitudes from 1e16 up or below 1e-4 switch to exponent form, `1e+16`.
fn fmt_number(x: f64, f: &mut Formatter<'_>) -> fmt::Result {
    if x.is_nan() {
        write!(f, "nan")
    } else if x.is_infinite() {
        write!(f, "{}", if x > 0.0 { "inf" } else { "-inf" })
    } else if x != 0.0 && (x.abs() >= 1e16 || x.abs() < 1e-4) {
        let scientific = format!("{:e}", x);
        match scientific.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                write!(f, "{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => write!(f, "{}", scientific),
        }
    } else if x.fract() == 0.0 {
        write!(f, "{:.1}", x)
    } else {
        write!(f, "{}", x)
    }
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Boolean(x) => *x,
            Value::Number(x) => *x != 0.0,
            Value::String(x) => !x.is_empty(),
            Value::Function(_) => true,
        }
    }
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
        }
    }
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Which kind of frame a block runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BlockKind {
    Global,
    Function,
    Loop,
    Conditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BinaryOperator {
    #[strum(serialize = "or")]
    Or,
    #[strum(serialize = "and")]
    And,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulus,
    #[strum(serialize = "^")]
    Exponent,
}

impl TryFrom<TokenType> for BinaryOperator {
    type Error = TokenType;

    fn try_from(tokentype: TokenType) -> Result<Self, Self::Error> {
        match tokentype {
            TokenType::Or => Ok(BinaryOperator::Or),
            TokenType::And => Ok(BinaryOperator::And),
            TokenType::EqualEqual => Ok(BinaryOperator::Equal),
            TokenType::BangEqual => Ok(BinaryOperator::NotEqual),
            TokenType::Less => Ok(BinaryOperator::Less),
            TokenType::LessEqual => Ok(BinaryOperator::LessEqual),
            TokenType::Greater => Ok(BinaryOperator::Greater),
            TokenType::GreaterEqual => Ok(BinaryOperator::GreaterEqual),
            TokenType::Plus => Ok(BinaryOperator::Add),
            TokenType::Minus => Ok(BinaryOperator::Subtract),
            TokenType::Star => Ok(BinaryOperator::Multiply),
            TokenType::Slash => Ok(BinaryOperator::Divide),
            TokenType::Percent => Ok(BinaryOperator::Modulus),
            TokenType::Caret => Ok(BinaryOperator::Exponent),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Node>,
    pub kind: BlockKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal {
        value: LiteralValue,
        line: usize,
    },
    Variable {
        name: String,
        line: usize,
    },
    Declare {
        name: String,
        value: Box<Node>,
        line: usize,
    },
    Reassign {
        name: String,
        value: Box<Node>,
        line: usize,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
        line: usize,
    },
    Not {
        operand: Box<Node>,
        line: usize,
    },
    /// One arm of an if/elseif/else chain. `else` arms have no condition.
    Conditional {
        condition: Option<Box<Node>>,
        body: Block,
        next: Option<Box<Node>>,
        line: usize,
    },
    Loop {
        condition: Box<Node>,
        body: Block,
        line: usize,
    },
    Break {
        line: usize,
    },
    Continue {
        line: usize,
    },
    Print {
        value: Box<Node>,
        line: usize,
    },
    Input {
        prompt: Box<Node>,
        line: usize,
    },
    FunctionDecl {
        name: String,
        params: Vec<String>,
        body: Rc<Block>,
        line: usize,
    },
    FunctionCall {
        name: String,
        arguments: Vec<Node>,
        line: usize,
    },
    Return {
        value: Option<Box<Node>>,
        line: usize,
    },
}

impl Node {
    pub fn line(&self) -> usize {
        match self {
            Node::Literal { line, .. }
            | Node::Variable { line, .. }
            | Node::Declare { line, .. }
            | Node::Reassign { line, .. }
            | Node::Binary { line, .. }
            | Node::Not { line, .. }
            | Node::Conditional { line, .. }
            | Node::Loop { line, .. }
            | Node::Break { line }
            | Node::Continue { line }
            | Node::Print { line, .. }
            | Node::Input { line, .. }
            | Node::FunctionDecl { line, .. }
            | Node::FunctionCall { line, .. }
            | Node::Return { line, .. } => *line,
        }
    }
    pub fn accept<T>(&self, v: &mut dyn Visitor<Node, T>) -> T {
        v.visit(self)
    }
}

impl Block {
    pub fn accept<T>(&self, v: &mut dyn Visitor<Block, T>) -> T {
        v.visit(self)
    }
}

pub trait Visitor<T, Output> {
    fn visit(&mut self, n: &T) -> Output;
}

/// Renders a tree as s-expressions, one statement per line at the top level.
pub struct AstPrinter {}

impl AstPrinter {
    fn parenthesize(&mut self, name: &str, args: Vec<&Node>) -> String {
        let mut x = String::from("(");
        x.push_str(name);
        for arg in args {
            x.push(' ');
            x.push_str(self.node(arg).as_str());
        }
        x.push(')');
        x
    }
    fn node(&mut self, n: &Node) -> String {
        n.accept(self)
    }
    fn block(&mut self, n: &Block) -> String {
        n.accept(self)
    }
    pub fn print(&mut self, root: &Block) -> String {
        root.statements
            .iter()
            .map(|stmt| self.node(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Visitor<Block, String> for AstPrinter {
    fn visit(&mut self, n: &Block) -> String {
        let mut x = format!("(block:{}", n.kind);
        for stmt in &n.statements {
            x.push(' ');
            x.push_str(self.node(stmt).as_str());
        }
        x.push(')');
        x
    }
}

impl Visitor<Node, String> for AstPrinter {
    fn visit(&mut self, n: &Node) -> String {
        match n {
            Node::Literal { value, .. } => match value {
                LiteralValue::Number(x) => Value::Number(*x).to_string(),
                LiteralValue::String(x) => format!("{:?}", x),
                LiteralValue::Boolean(x) => Value::Boolean(*x).to_string(),
            },
            Node::Variable { name, .. } => name.clone(),
            Node::Declare { name, value, .. } => {
                format!("(declare {} {})", name, self.node(value))
            }
            Node::Reassign { name, value, .. } => {
                format!("(assign {} {})", name, self.node(value))
            }
            Node::Binary {
                operator,
                left,
                right,
                ..
            } => self.parenthesize(&operator.to_string(), vec![&**left, &**right]),
            Node::Not { operand, .. } => self.parenthesize("!", vec![&**operand]),
            Node::Conditional {
                condition,
                body,
                next,
                ..
            } => {
                let mut x = match condition {
                    Some(condition) => {
                        format!("(if {} {}", self.node(condition), self.block(body))
                    }
                    None => format!("(else {}", self.block(body)),
                };
                if let Some(next) = next {
                    x.push(' ');
                    x.push_str(self.node(next).as_str());
                }
                x.push(')');
                x
            }
            Node::Loop {
                condition, body, ..
            } => format!("(loop {} {})", self.node(condition), self.block(body)),
            Node::Break { .. } => String::from("(break)"),
            Node::Continue { .. } => String::from("(continue)"),
            Node::Print { value, .. } => self.parenthesize("print", vec![&**value]),
            Node::Input { prompt, .. } => self.parenthesize("input", vec![&**prompt]),
            Node::FunctionDecl {
                name, params, body, ..
            } => format!(
                "(function {} ({}) {})",
                name,
                params.join(" "),
                self.block(body)
            ),
            Node::FunctionCall {
                name, arguments, ..
            } => {
                let name = format!("call {}", name);
                self.parenthesize(&name, arguments.iter().collect())
            }
            Node::Return { value, .. } => match value {
                Some(value) => self.parenthesize("return", vec![&**value]),
                None => String::from("(return)"),
            },
        }
    }
}
