use crate::ast::{BlockKind, Value};
use crate::error::RuntimeErrorKind;
use std::collections::BTreeMap;
use tracing::trace;

/// Index of a frame in the environment's arena.
pub type FrameId = usize;

pub const GLOBAL: FrameId = 0;

#[derive(Debug)]
struct Frame {
    kind: BlockKind,
    values: BTreeMap<String, Value>,
    parent: Option<FrameId>,
}

impl Frame {
    fn new(kind: BlockKind, parent: Option<FrameId>) -> Frame {
        Frame {
            kind,
            values: BTreeMap::new(),
            parent,
        }
    }
}

/// Scope chain stored as an arena of frames. Frame 0 holds the globals and is
/// reachable from every other frame; the rest are pushed and popped in LIFO
/// order as blocks are entered and left.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
    active: FrameId,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            frames: vec![Frame::new(BlockKind::Global, None)],
            active: GLOBAL,
        }
    }
    #[cfg(test)]
    fn active(&self) -> FrameId {
        self.active
    }
    fn kind(&self) -> BlockKind {
        self.frames[self.active].kind
    }
    #[cfg(test)]
    fn depth(&self) -> usize {
        self.frames.len()
    }
    /// Pushes a child of the active frame and makes it active.
    pub fn enter(&mut self, kind: BlockKind) -> FrameId {
        let id = self.frames.len();
        self.frames.push(Frame::new(kind, Some(self.active)));
        trace!(frame = id, parent = self.active, %kind, "enter frame");
        self.active = id;
        id
    }
    /// Drops `id` (and anything pushed after it) and reactivates its parent.
    pub fn exit(&mut self, id: FrameId) {
        if id == GLOBAL || id >= self.frames.len() {
            return;
        }
        self.active = self.frames[id].parent.unwrap_or(GLOBAL);
        self.frames.truncate(id);
        trace!(frame = id, active = self.active, "exit frame");
    }
    fn local(&mut self) -> &mut BTreeMap<String, Value> {
        let id = match self.kind() {
            BlockKind::Global => GLOBAL,
            _ => self.active,
        };
        &mut self.frames[id].values
    }
    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        let local = self.local();
        if local.contains_key(name) {
            return Err(RuntimeErrorKind::AlreadyDeclared(name.to_string()));
        }
        local.insert(name.to_string(), value);
        Ok(())
    }
    /// Binds without the redeclaration check, for parameters and functions.
    pub fn define(&mut self, name: &str, value: Value) {
        self.local().insert(name.to_string(), value);
    }
    fn chain(&self) -> Chain<'_> {
        Chain {
            environment: self,
            next: Some(self.active),
        }
    }
    fn holder(&self, name: &str) -> Option<FrameId> {
        self.chain()
            .find(|id| self.frames[*id].values.contains_key(name))
            .or_else(|| {
                if self.frames[GLOBAL].values.contains_key(name) {
                    Some(GLOBAL)
                } else {
                    None
                }
            })
    }
    pub fn reassign(&mut self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        match self.holder(name) {
            Some(id) => {
                self.frames[id].values.insert(name.to_string(), value);
                Ok(())
            }
            None => Err(RuntimeErrorKind::NotDeclared(name.to_string())),
        }
    }
    pub fn resolve(&self, name: &str) -> Result<Value, RuntimeErrorKind> {
        self.holder(name)
            .and_then(|id| self.frames[id].values.get(name))
            .cloned()
            .ok_or_else(|| RuntimeErrorKind::UndefinedVariable(name.to_string()))
    }
    /// Whether any non-global frame from the active one outwards has `kind`.
    pub fn within(&self, kind: BlockKind) -> bool {
        self.chain()
            .filter(|id| *id != GLOBAL)
            .any(|id| self.frames[id].kind == kind)
    }
}

struct Chain<'a> {
    environment: &'a Environment,
    next: Option<FrameId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = FrameId;

    fn next(&mut self) -> Option<FrameId> {
        let id = self.next?;
        self.next = self.environment.frames[id].parent;
        Some(id)
    }
}
