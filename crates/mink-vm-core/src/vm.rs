//! VM call-bridge state
//!
//! The object layer does not execute bytecode; it owns the narrow state the
//! bytecode machine exposes to it: an operand stack, the installed program
//! and lexical frame, the argument count, the program counter, and the halt
//! flag. Nested invocation saves and restores this state through explicit
//! [`VmFrame`] records rather than scattered saves, so getter/setter
//! re-entry is safe by construction.
//!
//! ## Calling convention
//!
//! A caller pushes the callee, then `this`, then each argument, records the
//! argument count, installs the program, and runs to halt. The program body
//! consumes callee + `this` + arguments and leaves exactly the return value
//! on the stack.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::VmResult;
use crate::runtime::Runtime;
use crate::value::Value;

/// A compiled function body.
///
/// Produced by the bytecode compiler; opaque at this layer. The object
/// layer only threads programs into the VM and never inspects them.
pub struct Program {
    pub(crate) code: ProgramCode,
}

/// Executable form of a compiled body. Runs against the full runtime so
/// the body can drive object operations and re-enter the call bridge.
pub type ProgramCode = Rc<dyn Fn(&mut Runtime) -> VmResult<()>>;

impl Program {
    /// Wrap a compiled body
    pub fn new(code: impl Fn(&mut Runtime) -> VmResult<()> + 'static) -> Rc<Self> {
        Rc::new(Self {
            code: Rc::new(code),
        })
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Program")
    }
}

/// A lexical environment frame captured by a closure: named bindings plus
/// a link to the enclosing frame.
#[derive(Debug, Default)]
pub struct Stash {
    values: RefCell<FxHashMap<String, Value>>,
    outer: Option<Rc<Stash>>,
}

impl Stash {
    /// The outermost frame
    pub fn root() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// A frame nested inside `outer`
    pub fn nested(outer: &Rc<Stash>) -> Rc<Self> {
        Rc::new(Self {
            values: RefCell::new(FxHashMap::default()),
            outer: Some(outer.clone()),
        })
    }

    /// Create or overwrite a binding in this frame
    pub fn define(&self, name: &str, value: Value) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    /// Resolve a name through this frame and its ancestors
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.values.borrow().get(name) {
            return Some(v.clone());
        }
        self.outer.as_ref().and_then(|o| o.lookup(name))
    }

    /// Assign to an existing binding, searching outward. Returns false if
    /// no frame binds the name.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        if let Some(v) = self.values.borrow_mut().get_mut(name) {
            *v = value;
            return true;
        }
        match &self.outer {
            Some(o) => o.assign(name, value),
            None => false,
        }
    }
}

/// Saved bridge state for one nesting level
#[derive(Debug)]
struct VmFrame {
    prg: Option<Rc<Program>>,
    stash: Option<Rc<Stash>>,
    pc: usize,
    args: usize,
}

/// The VM state shared with the object layer
#[derive(Debug, Default)]
pub struct Vm {
    stack: Vec<Value>,
    pc: usize,
    prg: Option<Rc<Program>>,
    stash: Option<Rc<Stash>>,
    args: usize,
    halted: bool,
    frames: Vec<VmFrame>,
}

impl Vm {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push a value onto the operand stack
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pop the top of the operand stack (undefined when empty)
    pub fn pop(&mut self) -> Value {
        self.stack.pop().unwrap_or(Value::Undefined)
    }

    /// Current operand stack depth
    pub fn sp(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn truncate(&mut self, sp: usize) {
        self.stack.truncate(sp);
    }

    /// Argument count of the current invocation
    pub fn args(&self) -> usize {
        self.args
    }

    pub(crate) fn set_args(&mut self, args: usize) {
        self.args = args;
    }

    /// Current program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Set the program counter
    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    /// The installed program, if any
    pub fn prg(&self) -> Option<&Rc<Program>> {
        self.prg.as_ref()
    }

    /// The installed lexical frame, if any
    pub fn stash(&self) -> Option<&Rc<Stash>> {
        self.stash.as_ref()
    }

    /// Signal that the current program has finished
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// The halt flag is set
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn clear_halt(&mut self) {
        self.halted = false;
    }

    /// Number of saved bridge frames
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Save the current program/stash/pc/args as a frame record
    pub(crate) fn push_frame(&mut self) {
        self.frames.push(VmFrame {
            prg: self.prg.clone(),
            stash: self.stash.clone(),
            pc: self.pc,
            args: self.args,
        });
    }

    /// Restore the most recent frame record
    pub(crate) fn pop_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.prg = frame.prg;
            self.stash = frame.stash;
            self.pc = frame.pc;
            self.args = frame.args;
        }
    }

    /// Install a program and its lexical frame, resetting the pc
    pub(crate) fn install(&mut self, prg: Rc<Program>, stash: Rc<Stash>) {
        self.prg = Some(prg);
        self.stash = Some(stash);
        self.pc = 0;
    }

    /// Pop one invocation's operands per the calling convention:
    /// returns (callee, this, arguments).
    pub fn pop_call_operands(&mut self) -> (Value, Value, Vec<Value>) {
        let argc = self.args;
        let mut args = Vec::with_capacity(argc);
        for _ in 0..argc {
            args.push(self.pop());
        }
        args.reverse();
        let this = self.pop();
        let callee = self.pop();
        (callee, this, args)
    }
}
