use std::fmt;
use std::io;
use thiserror::Error;

/// Malformed token stream or grammar violation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Syntax error at line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("Variable '{0}' has already been declared. Cannot redeclare.")]
    AlreadyDeclared(String),
    #[error("Variable '{0}' has not been declared yet.")]
    NotDeclared(String),
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
    #[error("Attempting to divide by zero.")]
    DivisionByZero,
    #[error("Unsupported operand types for {operator}: {left} and {right}.")]
    TypeMismatch {
        operator: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("'{0}' is not a function.")]
    NotCallable(String),
    #[error("Function '{name}' expects {expected} arguments but got {got}.")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("'💥' used outside of a loop.")]
    BreakOutsideLoop,
    #[error("'🤓' used outside of a loop.")]
    ContinueOutsideLoop,
    #[error("Reached end of input while waiting for a line.")]
    UnexpectedEndOfInput,
    #[error("Maximum recursion depth of {0} calls exceeded.")]
    RecursionLimit(usize),
}

/// A failure raised while evaluating the tree, tagged with its source line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}, mojilang Runtime Error: {kind}")]
pub struct RuntimeError {
    pub line: usize,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(line: usize, kind: RuntimeErrorKind) -> RuntimeError {
        RuntimeError { line, kind }
    }
}

/// Every error the scan → parse → interpret pipeline can surface.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Found the following syntax errors:\n{}", ScanErrors(.0))]
    Scan(Vec<SyntaxError>),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

struct ScanErrors<'a>(&'a [SyntaxError]);

impl<'a> fmt::Display for ScanErrors<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}", err)?;
        }
        Ok(())
    }
}
