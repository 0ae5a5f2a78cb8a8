use crate::ast::{BinaryOperator, Block, BlockKind, LiteralValue, Node, Value, Visitor};
use crate::callable::MojiFunction;
use crate::environment::Environment;
use crate::error::{Error, RuntimeError, RuntimeErrorKind};
use crate::stack::ensure_sufficient_stack;
use std::cmp::Ordering;
use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;
use tracing::debug;

/// Outcome of evaluating one node. Anything but `Normal` unwinds the
/// enclosing blocks until a loop or function call consumes it.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal(Value),
    Break,
    Continue,
    Return(Value),
}

pub type ExecResult = Result<Flow, Error>;

/// Deepest allowed chain of nested function calls.
pub const MAX_CALL_DEPTH: usize = 1000;

pub struct Interpreter<'io> {
    pub environment: Environment,
    calls: usize,
    output: Box<dyn Write + 'io>,
    input: Box<dyn BufRead + 'io>,
}

impl<'io> Visitor<Node, ExecResult> for Interpreter<'io> {
    fn visit(&mut self, node: &Node) -> ExecResult {
        match node {
            Node::Literal { value, .. } => Ok(Flow::Normal(match value {
                LiteralValue::Number(x) => Value::Number(*x),
                LiteralValue::String(x) => Value::String(x.clone()),
                LiteralValue::Boolean(x) => Value::Boolean(*x),
            })),
            Node::Variable { name, line } => self
                .environment
                .resolve(name)
                .map(Flow::Normal)
                .map_err(|kind| RuntimeError::new(*line, kind).into()),
            Node::Declare { name, value, line } => {
                let value = self.value(value)?;
                self.environment
                    .declare(name, value)
                    .map_err(|kind| RuntimeError::new(*line, kind))?;
                Ok(Flow::Normal(Value::None))
            }
            Node::Reassign { name, value, line } => {
                let value = self.value(value)?;
                self.environment
                    .reassign(name, value)
                    .map_err(|kind| RuntimeError::new(*line, kind))?;
                Ok(Flow::Normal(Value::None))
            }
            Node::Binary {
                operator,
                left,
                right,
                line,
            } => {
                // Both sides always run, `and`/`or` included.
                let left = self.value(left)?;
                let right = self.value(right)?;
                let result =
                    binary(*operator, left, right).map_err(|kind| RuntimeError::new(*line, kind))?;
                Ok(Flow::Normal(result))
            }
            Node::Not { operand, .. } => {
                let operand = self.value(operand)?;
                Ok(Flow::Normal(Value::Boolean(!operand.is_truthy())))
            }
            Node::Conditional {
                condition,
                body,
                next,
                ..
            } => {
                let taken = match condition {
                    Some(condition) => self.value(condition)?.is_truthy(),
                    None => true,
                };
                if taken {
                    self.execute_block(body, Vec::new())
                } else if let Some(next) = next {
                    self.evaluate(next)
                } else {
                    Ok(Flow::Normal(Value::None))
                }
            }
            Node::Loop {
                condition, body, ..
            } => {
                let mut last = Value::None;
                while self.value(condition)?.is_truthy() {
                    match self.execute_block(body, Vec::new())? {
                        Flow::Normal(value) => last = value,
                        Flow::Break => break,
                        Flow::Continue => continue,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                    }
                }
                Ok(Flow::Normal(last))
            }
            Node::Break { line } => {
                if !self.environment.within(BlockKind::Loop) {
                    return Err(RuntimeError::new(*line, RuntimeErrorKind::BreakOutsideLoop).into());
                }
                Ok(Flow::Break)
            }
            Node::Continue { line } => {
                if !self.environment.within(BlockKind::Loop) {
                    return Err(
                        RuntimeError::new(*line, RuntimeErrorKind::ContinueOutsideLoop).into(),
                    );
                }
                Ok(Flow::Continue)
            }
            Node::Print { value, .. } => {
                let value = self.value(value)?;
                writeln!(self.output, "{}", value)?;
                Ok(Flow::Normal(Value::None))
            }
            Node::Input { prompt, line } => {
                let prompt = self.value(prompt)?;
                write!(self.output, "{}", prompt)?;
                self.output.flush()?;
                let mut text = String::new();
                if self.input.read_line(&mut text)? == 0 {
                    return Err(
                        RuntimeError::new(*line, RuntimeErrorKind::UnexpectedEndOfInput).into(),
                    );
                }
                while text.ends_with('\n') || text.ends_with('\r') {
                    text.pop();
                }
                Ok(Flow::Normal(Value::String(text)))
            }
            Node::FunctionDecl {
                name, params, body, ..
            } => {
                let function = MojiFunction::new(name, params, Rc::clone(body));
                self.environment
                    .define(name, Value::Function(Rc::new(function)));
                Ok(Flow::Normal(Value::None))
            }
            Node::FunctionCall {
                name,
                arguments,
                line,
            } => {
                let callee = self
                    .environment
                    .resolve(name)
                    .map_err(|kind| RuntimeError::new(*line, kind))?;
                let function = match callee {
                    Value::Function(function) => function,
                    _ => {
                        return Err(RuntimeError::new(
                            *line,
                            RuntimeErrorKind::NotCallable(name.clone()),
                        )
                        .into())
                    }
                };
                let mut evaluated_arguments: Vec<Value> = Vec::new();
                for argument in arguments {
                    evaluated_arguments.push(self.value(argument)?);
                }
                if self.calls >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::new(
                        *line,
                        RuntimeErrorKind::RecursionLimit(MAX_CALL_DEPTH),
                    )
                    .into());
                }
                debug!(function = function.name(), line, depth = self.calls, "call");
                self.calls += 1;
                let result = function.call(self, evaluated_arguments, *line);
                self.calls -= 1;
                Ok(Flow::Normal(result?))
            }
            Node::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.value(value)?,
                    None => Value::None,
                };
                Ok(Flow::Return(value))
            }
        }
    }
}

impl Interpreter<'static> {
    pub fn new() -> Interpreter<'static> {
        Interpreter::with_io(io::stdout(), BufReader::new(io::stdin()))
    }
}

impl Default for Interpreter<'static> {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl<'io> Interpreter<'io> {
    pub fn with_io(output: impl Write + 'io, input: impl BufRead + 'io) -> Interpreter<'io> {
        Interpreter {
            environment: Environment::new(),
            calls: 0,
            output: Box::new(output),
            input: Box::new(input),
        }
    }
    fn evaluate(&mut self, node: &Node) -> ExecResult {
        ensure_sufficient_stack(|| node.accept(self))
    }
    fn value(&mut self, node: &Node) -> Result<Value, Error> {
        match self.evaluate(node)? {
            Flow::Normal(value) | Flow::Return(value) => Ok(value),
            Flow::Break | Flow::Continue => Ok(Value::None),
        }
    }
    /// Runs `block` in a frame of its own kind (the active frame for Global
    /// blocks), binding `bindings` there first.
    pub fn execute_block(&mut self, block: &Block, bindings: Vec<(String, Value)>) -> ExecResult {
        let frame = match block.kind {
            BlockKind::Global => None,
            kind => Some(self.environment.enter(kind)),
        };
        for (name, value) in bindings {
            self.environment.define(&name, value);
        }
        let result = self.execute_statements(&block.statements);
        if let Some(frame) = frame {
            self.environment.exit(frame);
        }
        result
    }
    fn execute_statements(&mut self, statements: &[Node]) -> ExecResult {
        let mut last = Value::None;
        for stmt in statements {
            match self.evaluate(stmt)? {
                Flow::Normal(value) => last = value,
                signal => return Ok(signal),
            }
        }
        Ok(Flow::Normal(last))
    }
    pub fn interpret(&mut self, root: &Block) -> Result<(), Error> {
        debug!(statements = root.statements.len(), "interpreting");
        self.execute_block(root, Vec::new())?;
        self.output.flush()?;
        Ok(())
    }
}

fn type_mismatch(operator: BinaryOperator, left: &Value, right: &Value) -> RuntimeErrorKind {
    RuntimeErrorKind::TypeMismatch {
        operator: operator.to_string(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn binary(operator: BinaryOperator, left: Value, right: Value) -> Result<Value, RuntimeErrorKind> {
    match operator {
        BinaryOperator::And => Ok(if left.is_truthy() { right } else { left }),
        BinaryOperator::Or => Ok(if left.is_truthy() { left } else { right }),
        BinaryOperator::Equal => Ok(Value::Boolean(left.equals(&right))),
        BinaryOperator::NotEqual => Ok(Value::Boolean(!left.equals(&right))),
        BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::Greater
        | BinaryOperator::GreaterEqual => {
            let ordering = match (&left, &right) {
                (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
                (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
                _ => return Err(type_mismatch(operator, &left, &right)),
            };
            let result = match (operator, ordering) {
                (_, None) => false,
                (BinaryOperator::Less, Some(o)) => o == Ordering::Less,
                (BinaryOperator::LessEqual, Some(o)) => o != Ordering::Greater,
                (BinaryOperator::Greater, Some(o)) => o == Ordering::Greater,
                (_, Some(o)) => o != Ordering::Less,
            };
            Ok(Value::Boolean(result))
        }
        BinaryOperator::Add => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (Value::String(mut l), Value::String(r)) => {
                l.push_str(r.as_str());
                Ok(Value::String(l))
            }
            (l, r) => Err(type_mismatch(operator, &l, &r)),
        },
        BinaryOperator::Subtract
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Modulus
        | BinaryOperator::Exponent => {
            let (l, r) = match (&left, &right) {
                (Value::Number(l), Value::Number(r)) => (*l, *r),
                _ => return Err(type_mismatch(operator, &left, &right)),
            };
            let result = match operator {
                BinaryOperator::Subtract => l - r,
                BinaryOperator::Multiply => l * r,
                BinaryOperator::Divide if r == 0.0 => {
                    return Err(RuntimeErrorKind::DivisionByZero);
                }
                BinaryOperator::Divide => l / r,
                BinaryOperator::Modulus if r == 0.0 => {
                    return Err(RuntimeErrorKind::DivisionByZero);
                }
                BinaryOperator::Modulus => floored_modulus(l, r),
                _ => l.powf(r),
            };
            Ok(Value::Number(result))
        }
    }
}

// The result takes the sign of the divisor: -1 % 3 == 2.
fn floored_modulus(l: f64, r: f64) -> f64 {
    let m = l % r;
    if m != 0.0 && (m < 0.0) != (r < 0.0) {
        m + r
    } else {
        m
    }
}
