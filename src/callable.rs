use crate::ast::{Block, Value};
use crate::error::{Error, RuntimeError, RuntimeErrorKind};
use crate::interpreter::{Flow, Interpreter};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, PartialEq)]
pub struct MojiFunction {
    name: String,
    params: Vec<String>,
    body: Rc<Block>,
}

impl fmt::Display for MojiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name)
    }
}

impl MojiFunction {
    pub fn new(name: &str, params: &[String], body: Rc<Block>) -> MojiFunction {
        MojiFunction {
            name: name.to_string(),
            params: params.to_vec(),
            body,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn arity(&self) -> usize {
        self.params.len()
    }
    /// Runs the body in a fresh function frame chained to the caller's active frame.
    pub fn call(
        &self,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<Value>,
        line: usize,
    ) -> Result<Value, Error> {
        if arguments.len() != self.arity() {
            return Err(RuntimeError::new(
                line,
                RuntimeErrorKind::ArityMismatch {
                    name: self.name.clone(),
                    expected: self.arity(),
                    got: arguments.len(),
                },
            )
            .into());
        }
        let bindings = self.params.iter().cloned().zip(arguments).collect();
        match interpreter.execute_block(&self.body, bindings)? {
            Flow::Normal(_) => Ok(Value::None),
            Flow::Return(value) => Ok(value),
            Flow::Break => Err(RuntimeError::new(line, RuntimeErrorKind::BreakOutsideLoop).into()),
            Flow::Continue => {
                Err(RuntimeError::new(line, RuntimeErrorKind::ContinueOutsideLoop).into())
            }
        }
    }
}
