pub mod ast;
pub mod callable;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
mod stack;
pub mod token;

pub use crate::error::Error;

use crate::ast::Block;
use crate::interpreter::Interpreter;
use std::io::{BufRead, Write};

/// Scans and parses `source` into the global block. Scan errors are reported
/// together; parsing stops at the first syntax error.
pub fn parse_source(source: &str) -> Result<Block, Error> {
    let (tokens, errors) = scanner::scan_tokens(source);
    if !errors.is_empty() {
        return Err(Error::Scan(errors));
    }
    Ok(parser::parse(&tokens)?)
}

/// Runs a program against stdout and stdin.
pub fn run(source: &str) -> Result<(), Error> {
    let root = parse_source(source)?;
    Interpreter::new().interpret(&root)
}

/// Runs a program with its output and input streams supplied by the caller.
pub fn run_with_io<W: Write, R: BufRead>(source: &str, output: W, input: R) -> Result<(), Error> {
    let root = parse_source(source)?;
    Interpreter::with_io(output, input).interpret(&root)
}
