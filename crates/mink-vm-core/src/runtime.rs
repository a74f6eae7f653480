//! Runtime: global intrinsics, object factories, and the VM run loop
//!
//! A [`Runtime`] owns one object graph and its VM bridge state. The
//! intrinsics table ([`Global`]) is written once here at startup and read
//! everywhere else. All operations on the graph happen on the thread that
//! owns the runtime; there is no internal synchronization.

use std::rc::Rc;

use tracing::debug;

use crate::error::{VmError, VmResult};
use crate::function::{FunctionCall, FunctionData, NativeData, NativeFn, RESTRICTED_PROPERTIES};
use crate::object::{
    CLASS_BOOLEAN, CLASS_FUNCTION, CLASS_NUMBER, CLASS_OBJECT, CLASS_STRING, JsObject, ObjectKind,
    ObjectRef,
};
use crate::property::{Property, PropertyAttributes};
use crate::value::{Export, Value};
use crate::vm::{Program, Stash, Vm};

/// Runtime configuration
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Longest prototype chain a lookup will traverse
    pub max_prototype_chain_depth: usize,
    /// Maximum nesting of the VM call bridge
    pub max_vm_stack: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_prototype_chain_depth: 100,
            max_vm_stack: 10_000,
        }
    }
}

/// The intrinsics the object layer depends on. Built once per runtime.
pub struct Global {
    /// `%Object.prototype%`: default prototype of plain objects and the
    /// fallback prototype for construction
    pub object_prototype: ObjectRef,
    /// `%Function.prototype%`: prototype of every function object
    pub function_prototype: ObjectRef,
    /// The restricted-properties accessor: getter and setter both raise
    /// TypeError
    pub thrower: Property,
}

/// A single-threaded script runtime instance
pub struct Runtime {
    pub(crate) global: Global,
    pub(crate) vm: Vm,
    pub(crate) config: RuntimeConfig,
}

impl Runtime {
    /// Create a runtime with default configuration
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with custom configuration
    pub fn with_config(config: RuntimeConfig) -> Self {
        let object_prototype = JsObject::new_ref(ObjectKind::Ordinary, None, CLASS_OBJECT);
        let function_prototype = JsObject::new_ref(
            ObjectKind::Ordinary,
            Some(object_prototype.clone()),
            CLASS_FUNCTION,
        );

        let func: NativeFn = Rc::new(|_rt, _call| Err(VmError::type_error(RESTRICTED_PROPERTIES)));
        let thrower_fn = JsObject::new_ref(
            ObjectKind::Native(NativeData { func }),
            Some(function_prototype.clone()),
            CLASS_FUNCTION,
        );
        init_function_props(&thrower_fn, "ThrowTypeError", 0.0);
        let thrower = Property::Accessor {
            get: Some(thrower_fn.clone()),
            set: Some(thrower_fn),
            attributes: PropertyAttributes::frozen(),
        };

        debug!("runtime intrinsics initialized");
        Self {
            global: Global {
                object_prototype,
                function_prototype,
                thrower,
            },
            vm: Vm::new(),
            config,
        }
    }

    /// The intrinsics table
    pub fn global(&self) -> &Global {
        &self.global
    }

    /// The active configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Shared view of the VM bridge state
    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    /// Mutable view of the VM bridge state (used by program bodies)
    pub fn vm_mut(&mut self) -> &mut Vm {
        &mut self.vm
    }

    // ------------------------------------------------------------------
    // Factories
    // ------------------------------------------------------------------

    /// A fresh ordinary object inheriting from `%Object.prototype%`
    pub fn new_object(&self) -> ObjectRef {
        JsObject::new_ref(
            ObjectKind::Ordinary,
            Some(self.global.object_prototype.clone()),
            CLASS_OBJECT,
        )
    }

    /// A fresh ordinary object with an explicit prototype and class tag
    pub fn new_base_object(&self, prototype: Option<ObjectRef>, class: &'static str) -> ObjectRef {
        JsObject::new_ref(ObjectKind::Ordinary, prototype, class)
    }

    /// A script function over a compiled program and its captured frame
    pub fn new_function(
        &self,
        name: &str,
        length: u32,
        prg: Rc<Program>,
        stash: Rc<Stash>,
    ) -> ObjectRef {
        let f = JsObject::new_ref(
            ObjectKind::Function(FunctionData { prg, stash }),
            Some(self.global.function_prototype.clone()),
            CLASS_FUNCTION,
        );
        init_function_props(&f, name, length as f64);
        f
    }

    /// A native function wrapping a host closure
    pub fn new_native_function(
        &self,
        name: &str,
        length: u32,
        func: impl Fn(&mut Runtime, FunctionCall) -> VmResult<Value> + 'static,
    ) -> ObjectRef {
        let f = JsObject::new_ref(
            ObjectKind::Native(NativeData { func: Rc::new(func) }),
            Some(self.global.function_prototype.clone()),
            CLASS_FUNCTION,
        );
        init_function_props(&f, name, length as f64);
        f
    }

    /// Bind `target` over a fixed `this` and leading arguments. The result
    /// is a bound function: calls append further arguments, and
    /// `caller`/`arguments` are restricted.
    pub fn bind(
        &mut self,
        target: &ObjectRef,
        this: Value,
        bound_args: Vec<Value>,
    ) -> VmResult<ObjectRef> {
        if !target.is_callable() {
            return Err(VmError::type_error(format!(
                "[object {}] is not a function",
                target.class()
            )));
        }
        let target_name = target.get(self, "name")?;
        let name = format!("bound {}", target_name.as_str().unwrap_or(""));
        let target_len = target.get(self, "length")?.to_number();
        let length = (target_len - bound_args.len() as f64).max(0.0);

        let target = target.clone();
        let func: NativeFn = Rc::new(move |rt, call| {
            let mut args = bound_args.clone();
            args.extend(call.arguments);
            target.call(rt, FunctionCall::new(this.clone(), args))
        });
        let f = JsObject::new_ref(
            ObjectKind::Bound(NativeData { func }),
            Some(self.global.function_prototype.clone()),
            CLASS_FUNCTION,
        );
        init_function_props(&f, &name, length);
        Ok(f)
    }

    /// A primitive wrapper instance (`new Number(..)` and friends). The
    /// class tag follows the boxed primitive; `prototype` defaults to
    /// `%Object.prototype%` when the wrapper intrinsic is not supplied.
    pub fn new_primitive_object(
        &self,
        value: Value,
        prototype: Option<ObjectRef>,
    ) -> VmResult<ObjectRef> {
        let class = match &value {
            Value::Number(_) => CLASS_NUMBER,
            Value::String(_) => CLASS_STRING,
            Value::Boolean(_) => CLASS_BOOLEAN,
            other => {
                return Err(VmError::internal(format!(
                    "cannot box {other} as a primitive wrapper"
                )));
            }
        };
        let proto = prototype.or_else(|| Some(self.global.object_prototype.clone()));
        Ok(JsObject::new_ref(ObjectKind::Primitive(value), proto, class))
    }

    /// Rebuild a value from its host representation. Mappings come back as
    /// fresh plain objects; exported callables do not round-trip and
    /// import as undefined.
    pub fn import(&self, export: &Export) -> Value {
        match export {
            Export::Undefined => Value::Undefined,
            Export::Null => Value::Null,
            Export::Boolean(b) => Value::Boolean(*b),
            Export::Number(n) => Value::Number(*n),
            Export::String(s) => Value::string(s.as_str()),
            Export::Map(m) => {
                let obj = self.new_object();
                for (name, v) in m {
                    obj.put_prop(name, self.import(v), true, true, true);
                }
                Value::Object(obj)
            }
            Export::Function => Value::Undefined,
        }
    }

    /// Execute the installed program until the VM halts
    pub(crate) fn run(&mut self) -> VmResult<()> {
        while !self.vm.is_halted() {
            let prg = self
                .vm
                .prg()
                .cloned()
                .ok_or_else(|| VmError::internal("VM run without an installed program"))?;
            (prg.code)(self)?;
        }
        Ok(())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the pre-allocated `name`/`length` records every function kind
/// carries: non-writable, non-enumerable, configurable.
fn init_function_props(f: &ObjectRef, name: &str, length: f64) {
    f.put_prop("name", Value::string(name), false, false, true);
    f.put_prop("length", Value::Number(length), false, false, true);
}
