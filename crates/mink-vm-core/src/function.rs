//! Function objects
//!
//! Three callable kinds share one invocation surface: script functions
//! carry a compiled program plus their captured lexical frame and enter the
//! VM through the call bridge; native functions wrap a host closure; bound
//! functions are natives with the `caller`/`arguments` restrictions layered
//! on top. Construction and `instanceof` are common to all of them.

use std::rc::Rc;

use tracing::trace;

use crate::error::{VmError, VmResult};
use crate::object::{CLASS_OBJECT, JsObject, ObjectKind, ObjectRef};
use crate::property::Slot;
use crate::runtime::Runtime;
use crate::value::Value;
use crate::vm::{Program, Stash};

pub(crate) const RESTRICTED_PROPERTIES: &str = "'caller' and 'arguments' are restricted function properties and cannot be accessed in this context.";

/// Arguments to a single invocation
#[derive(Clone, Debug, Default)]
pub struct FunctionCall {
    /// The `this` binding
    pub this: Value,
    /// Positional arguments
    pub arguments: Vec<Value>,
}

impl FunctionCall {
    /// Create a call record
    pub fn new(this: Value, arguments: Vec<Value>) -> Self {
        Self { this, arguments }
    }

    /// Argument at `idx`, or undefined past the end
    pub fn argument(&self, idx: usize) -> Value {
        self.arguments.get(idx).cloned().unwrap_or(Value::Undefined)
    }
}

/// Host function handler: receives the runtime and the call record.
pub type NativeFn = Rc<dyn Fn(&mut Runtime, FunctionCall) -> VmResult<Value>>;

/// State of a script-defined function. Immutable after creation.
pub struct FunctionData {
    /// Compiled body
    pub(crate) prg: Rc<Program>,
    /// Captured lexical environment frame
    pub(crate) stash: Rc<Stash>,
}

/// State of a native (host-provided) function
pub struct NativeData {
    pub(crate) func: NativeFn,
}

impl JsObject {
    /// Materialize the lazy `prototype` of a script function: a fresh
    /// ordinary object whose `constructor` points back at the function.
    pub(crate) fn add_prototype(self: &Rc<Self>, rt: &Runtime) -> Slot {
        let proto = rt.new_object();
        proto.put_prop("constructor", Value::Object(self.clone()), true, false, true);
        self.put_prop("prototype", Value::Object(proto), true, false, false)
    }

    /// Invoke this object. Script functions run through the VM bridge;
    /// natives call straight into the host closure.
    pub fn call(self: &Rc<Self>, rt: &mut Runtime, call: FunctionCall) -> VmResult<Value> {
        match &self.kind {
            ObjectKind::Function(data) => {
                let prg = data.prg.clone();
                let stash = data.stash.clone();
                call_script(self, rt, prg, stash, call)
            }
            ObjectKind::Native(data) | ObjectKind::Bound(data) => {
                let func = data.func.clone();
                func(rt, call)
            }
            _ => Err(VmError::type_error(format!(
                "[object {}] is not a function",
                self.class
            ))),
        }
    }

    /// The `new` protocol: resolve `prototype` (falling back to the
    /// intrinsic ObjectPrototype), allocate a fresh `"Object"`-class
    /// instance, call with it as `this`, and let an object return value
    /// override the allocation.
    pub fn construct(self: &Rc<Self>, rt: &mut Runtime, args: Vec<Value>) -> VmResult<ObjectRef> {
        if !self.is_callable() {
            return Err(VmError::type_error(format!(
                "[object {}] is not a constructor",
                self.class
            )));
        }
        let proto = match self.get(rt, "prototype")?.as_object() {
            Some(p) => p.clone(),
            None => rt.global().object_prototype.clone(),
        };
        let obj = rt.new_base_object(Some(proto), CLASS_OBJECT);
        let ret = self.call(rt, FunctionCall::new(Value::Object(obj.clone()), args))?;
        Ok(match ret {
            Value::Object(o) => o,
            _ => obj,
        })
    }

    /// `instanceof` support: true iff `v` is an object whose prototype
    /// chain contains this function's `prototype` object.
    pub fn has_instance(self: &Rc<Self>, rt: &mut Runtime, v: &Value) -> VmResult<bool> {
        if !self.is_callable() {
            return Err(VmError::type_error(format!(
                "Expecting a function in instanceof check, but got [object {}]",
                self.class
            )));
        }
        let Some(obj) = v.as_object() else {
            return Ok(false);
        };
        let Some(target) = self.get(rt, "prototype")?.as_object().cloned() else {
            return Err(VmError::type_error("prototype is not an object"));
        };
        let mut current = obj.prototype();
        while let Some(p) = current {
            if Rc::ptr_eq(&p, &target) {
                return Ok(true);
            }
            current = p.prototype();
        }
        Ok(false)
    }
}

/// The bridge from a script-function invocation into the VM.
///
/// Protocol: save the program counter, push callee / `this` / arguments,
/// push an explicit frame record, install the function's program and stash,
/// run to halt, then unwind in reverse. The bridge is re-entrant — getters
/// and setters invoked by the running program land back here — and on an
/// abrupt completion the operand stack is truncated to its depth at entry.
pub(crate) fn call_script(
    f: &ObjectRef,
    rt: &mut Runtime,
    prg: Rc<Program>,
    stash: Rc<Stash>,
    call: FunctionCall,
) -> VmResult<Value> {
    if rt.vm().frame_depth() >= rt.config().max_vm_stack {
        return Err(VmError::StackOverflow);
    }

    let argc = call.arguments.len();
    trace!(argc, frames = rt.vm().frame_depth(), "vm call bridge");

    let saved_pc = rt.vm().pc();
    let sp = rt.vm().sp();
    let vm = rt.vm_mut();
    vm.push(Value::Object(f.clone()));
    vm.push(call.this);
    for arg in call.arguments {
        vm.push(arg);
    }
    vm.push_frame();
    vm.set_args(argc);
    vm.install(prg, stash);

    let result = rt.run();

    let vm = rt.vm_mut();
    vm.pop_frame();
    vm.set_pc(saved_pc);
    vm.clear_halt();
    match result {
        Ok(()) => Ok(vm.pop()),
        Err(e) => {
            vm.truncate(sp);
            Err(e)
        }
    }
}
