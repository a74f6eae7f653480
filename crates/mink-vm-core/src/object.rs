//! JavaScript objects
//!
//! Every script object is a [`JsObject`]: a property map plus an
//! insertion-ordered key list, a prototype link, and an extensibility flag.
//! Kind-specific behavior (script functions, native functions, bound
//! functions, primitive wrappers) hangs off a closed [`ObjectKind`] tag;
//! the operations below dispatch on it where a kind overrides the base
//! algorithm and fall through to the shared path everywhere else.
//!
//! Object identity is reference identity (`Rc::ptr_eq`); `JsObject`
//! deliberately implements no `PartialEq`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::enumerate::{PropIter, RawPropIter};
use crate::error::{VmError, VmResult};
use crate::function::{FunctionCall, FunctionData, NativeData, RESTRICTED_PROPERTIES};
use crate::property::{Property, PropertyAttributes, PropertyDescriptor, Slot};
use crate::runtime::Runtime;
use crate::value::{Export, ExportType, Value};

/// `[[Class]]` tag of plain objects
pub const CLASS_OBJECT: &str = "Object";
/// `[[Class]]` tag of arrays
pub const CLASS_ARRAY: &str = "Array";
/// `[[Class]]` tag of function objects
pub const CLASS_FUNCTION: &str = "Function";
/// `[[Class]]` tag of Number wrapper objects
pub const CLASS_NUMBER: &str = "Number";
/// `[[Class]]` tag of String wrapper objects
pub const CLASS_STRING: &str = "String";
/// `[[Class]]` tag of Boolean wrapper objects
pub const CLASS_BOOLEAN: &str = "Boolean";
/// `[[Class]]` tag of error objects
pub const CLASS_ERROR: &str = "Error";
/// `[[Class]]` tag of regular expression objects
pub const CLASS_REGEXP: &str = "RegExp";
/// `[[Class]]` tag of Date objects
pub const CLASS_DATE: &str = "Date";

/// Shared reference to an object
pub type ObjectRef = Rc<JsObject>;

/// The closed set of object kinds at this layer.
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Primitive wrapper (`new Number(..)`, `new String(..)`, `new Boolean(..)`)
    Primitive(Value),
    /// Script function: compiled program + captured lexical frame
    Function(FunctionData),
    /// Host-provided callable
    Native(NativeData),
    /// Bound function (restricts `caller`/`arguments`)
    Bound(NativeData),
}

/// A JavaScript object
pub struct JsObject {
    pub(crate) class: &'static str,
    pub(crate) kind: ObjectKind,
    pub(crate) prototype: RefCell<Option<ObjectRef>>,
    pub(crate) extensible: Cell<bool>,
    pub(crate) values: RefCell<FxHashMap<String, Slot>>,
    pub(crate) prop_names: RefCell<Vec<String>>,
}

impl JsObject {
    pub(crate) fn new(kind: ObjectKind, prototype: Option<ObjectRef>, class: &'static str) -> Self {
        Self {
            class,
            kind,
            prototype: RefCell::new(prototype),
            extensible: Cell::new(true),
            values: RefCell::new(FxHashMap::default()),
            prop_names: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn new_ref(
        kind: ObjectKind,
        prototype: Option<ObjectRef>,
        class: &'static str,
    ) -> ObjectRef {
        Rc::new(Self::new(kind, prototype, class))
    }

    /// The `[[Class]]` tag
    pub fn class(&self) -> &'static str {
        self.class
    }

    /// Current prototype, if any
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.prototype.borrow().clone()
    }

    /// Replace the prototype link. Rejects chains that would contain the
    /// receiver (TypeError per `throw`).
    pub fn set_prototype(&self, prototype: Option<ObjectRef>, throw: bool) -> VmResult<bool> {
        if let Some(p) = &prototype
            && self.would_create_cycle(p)
        {
            return VmError::reject(throw, false, "Cannot create a cyclic prototype chain");
        }
        *self.prototype.borrow_mut() = prototype;
        Ok(true)
    }

    fn would_create_cycle(&self, candidate: &ObjectRef) -> bool {
        let mut current = Some(candidate.clone());
        while let Some(p) = current {
            if std::ptr::eq(Rc::as_ptr(&p), self) {
                return true;
            }
            current = p.prototype.borrow().clone();
        }
        false
    }

    /// Check if new own properties may be added
    pub fn is_extensible(&self) -> bool {
        self.extensible.get()
    }

    /// Forbid adding new own properties. Monotonic: never reverts.
    pub fn prevent_extensions(&self) {
        self.extensible.set(false);
    }

    /// The boxed primitive of a wrapper object
    pub fn primitive_value(&self) -> Option<&Value> {
        match &self.kind {
            ObjectKind::Primitive(v) => Some(v),
            _ => None,
        }
    }

    /// This kind can be invoked
    pub fn is_callable(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::Function(_) | ObjectKind::Native(_) | ObjectKind::Bound(_)
        )
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Raw own lookup: no prototype traversal, accessors not invoked.
    ///
    /// Legacy quirk: the literal name `"__proto"` (no trailing
    /// underscores) falls back to the prototype object when no own entry
    /// exists.
    pub fn get_own(&self, name: &str) -> Option<Slot> {
        if let Some(slot) = self.values.borrow().get(name) {
            return Some(slot.clone());
        }
        if name == "__proto" {
            return self
                .prototype
                .borrow()
                .clone()
                .map(|p| Slot::Value(Value::Object(p)));
        }
        None
    }

    /// Own lookup with kind hooks applied: script functions materialize
    /// their lazy `prototype`, bound functions answer `caller`/`arguments`
    /// with the intrinsic thrower.
    fn get_own_hooked(self: &Rc<Self>, rt: &Runtime, name: &str) -> Option<Slot> {
        match &self.kind {
            ObjectKind::Function(_)
                if name == "prototype" && !self.values.borrow().contains_key("prototype") =>
            {
                return Some(self.add_prototype(rt));
            }
            ObjectKind::Bound(_) if name == "caller" || name == "arguments" => {
                return Some(Slot::Property(rt.global().thrower.clone()));
            }
            _ => {}
        }
        self.get_own(name)
    }

    /// Raw lookup along the prototype chain. Returns the first entry found,
    /// accessors unevaluated. The walk is bounded by the configured chain
    /// depth limit.
    pub fn get_prop(self: &Rc<Self>, rt: &Runtime, name: &str) -> Option<Slot> {
        let mut current = self.clone();
        let mut depth = 0;
        loop {
            if let Some(slot) = current.get_own_hooked(rt, name) {
                return Some(slot);
            }
            depth += 1;
            if depth > rt.config().max_prototype_chain_depth {
                return None;
            }
            let next = current.prototype.borrow().clone();
            match next {
                Some(p) => current = p,
                None => return None,
            }
        }
    }

    /// Evaluated chain lookup with presence: `Ok(None)` when the name is
    /// absent from the whole chain, the evaluated value otherwise. Getters
    /// run with `this` bound to the original receiver.
    pub(crate) fn probe(self: &Rc<Self>, rt: &mut Runtime, name: &str) -> VmResult<Option<Value>> {
        match self.get_prop(rt, name) {
            None => Ok(None),
            Some(Slot::Value(v)) => Ok(Some(v)),
            Some(Slot::Property(Property::Data { value, .. })) => Ok(Some(value)),
            Some(Slot::Property(Property::Accessor { get: Some(g), .. })) => {
                let v = g.call(rt, FunctionCall::new(Value::Object(self.clone()), Vec::new()))?;
                Ok(Some(v))
            }
            Some(Slot::Property(Property::Accessor { get: None, .. })) => {
                Ok(Some(Value::Undefined))
            }
        }
    }

    /// `Get`: evaluated chain lookup; absent names yield undefined.
    pub fn get(self: &Rc<Self>, rt: &mut Runtime, name: &str) -> VmResult<Value> {
        Ok(self.probe(rt, name)?.unwrap_or(Value::Undefined))
    }

    /// The name resolves somewhere on the chain
    pub fn has_property(self: &Rc<Self>, rt: &Runtime, name: &str) -> bool {
        self.get_prop(rt, name).is_some()
    }

    /// The name is an own property. Script functions report `prototype`
    /// as own even before it is materialized.
    pub fn has_own_property(&self, name: &str) -> bool {
        if self.values.borrow().contains_key(name) {
            return true;
        }
        matches!(self.kind, ObjectKind::Function(_)) && name == "prototype"
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Insert or replace an entry, keeping the key list in sync. A replaced
    /// key keeps its position; a new key appends.
    pub(crate) fn insert(&self, name: &str, slot: Slot) {
        let fresh = self.values.borrow_mut().insert(name.to_string(), slot).is_none();
        if fresh {
            self.prop_names.borrow_mut().push(name.to_string());
        }
    }

    /// Assignment. `throw` selects between TypeError and silent failure.
    pub fn put(
        self: &Rc<Self>,
        rt: &mut Runtime,
        name: &str,
        value: Value,
        throw: bool,
    ) -> VmResult<()> {
        if matches!(self.kind, ObjectKind::Bound(_)) && (name == "caller" || name == "arguments") {
            return Err(VmError::type_error(RESTRICTED_PROPERTIES));
        }

        enum OwnWrite {
            Plain,
            Data,
            Setter(ObjectRef),
            ReadOnly,
        }
        let own = self.values.borrow().get(name).map(|slot| match slot {
            Slot::Value(_) => OwnWrite::Plain,
            Slot::Property(Property::Data { attributes, .. }) if attributes.writable => {
                OwnWrite::Data
            }
            Slot::Property(Property::Accessor { set: Some(s), .. }) => OwnWrite::Setter(s.clone()),
            Slot::Property(_) => OwnWrite::ReadOnly,
        });
        if let Some(action) = own {
            match action {
                OwnWrite::Plain => {
                    self.values
                        .borrow_mut()
                        .insert(name.to_string(), Slot::Value(value));
                    return Ok(());
                }
                OwnWrite::Data => {
                    if let Some(Slot::Property(Property::Data { value: v, .. })) =
                        self.values.borrow_mut().get_mut(name)
                    {
                        *v = value;
                    }
                    return Ok(());
                }
                OwnWrite::Setter(setter) => {
                    setter.call(rt, FunctionCall::new(Value::Object(self.clone()), vec![value]))?;
                    return Ok(());
                }
                OwnWrite::ReadOnly => {
                    return VmError::reject(
                        throw,
                        (),
                        format!("Cannot assign to read only property '{name}'"),
                    );
                }
            }
        }

        // The magic prototype setter. Extensibility-checked, never enters
        // the key list, and non-object values other than null/undefined
        // are ignored.
        if name == "__proto__" {
            if !self.extensible.get() {
                return VmError::reject(
                    throw,
                    (),
                    format!("[object {}] is not extensible", self.class),
                );
            }
            match value {
                Value::Undefined | Value::Null => *self.prototype.borrow_mut() = None,
                Value::Object(o) => {
                    if self.would_create_cycle(&o) {
                        return VmError::reject(throw, (), "Cannot create a cyclic prototype chain");
                    }
                    *self.prototype.borrow_mut() = Some(o);
                }
                _ => {}
            }
            return Ok(());
        }

        let inherited = {
            let proto = self.prototype.borrow().clone();
            proto.and_then(|p| p.get_prop(rt, name))
        };
        match inherited {
            Some(Slot::Property(prop)) => {
                if !prop.is_writable() {
                    return VmError::reject(
                        throw,
                        (),
                        format!("Cannot assign to read only property '{name}'"),
                    );
                }
                if let Property::Accessor { set: Some(setter), .. } = prop {
                    // Inherited setter runs against the receiver, never
                    // against the prototype that supplied it.
                    setter.call(rt, FunctionCall::new(Value::Object(self.clone()), vec![value]))?;
                    return Ok(());
                }
                // Inherited writable data: shadow with an own entry.
            }
            Some(Slot::Value(_)) => {}
            None => {
                if !self.extensible.get() {
                    return VmError::reject(
                        throw,
                        (),
                        format!("[object {}] is not extensible", self.class),
                    );
                }
            }
        }
        self.insert(name, Slot::Value(value));
        Ok(())
    }

    /// Deletion. Absent names and restricted bound-function names report
    /// success; non-configurable records reject per `throw`.
    pub fn delete(&self, name: &str, throw: bool) -> VmResult<bool> {
        if matches!(self.kind, ObjectKind::Bound(_)) && (name == "caller" || name == "arguments") {
            return Ok(true);
        }
        let blocked = match self.values.borrow().get(name) {
            None => return Ok(true),
            Some(Slot::Property(p)) if !p.is_configurable() => true,
            Some(_) => false,
        };
        if blocked {
            return VmError::reject(
                throw,
                false,
                format!("Cannot delete property '{}' of [object {}]", name, self.class),
            );
        }
        self.values.borrow_mut().remove(name);
        let mut names = self.prop_names.borrow_mut();
        if let Some(pos) = names.iter().position(|n| n == name) {
            names.remove(pos);
        }
        Ok(true)
    }

    /// Install a property with explicit attributes, bypassing the
    /// reconciliation checks. The installer used by intrinsics and object
    /// factories; all-true attributes store a bare value.
    pub fn put_prop(
        &self,
        name: &str,
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) -> Slot {
        let slot = if writable && enumerable && configurable {
            Slot::Value(value)
        } else {
            Slot::Property(Property::Data {
                value,
                attributes: PropertyAttributes {
                    writable,
                    enumerable,
                    configurable,
                },
            })
        };
        self.insert(name, slot.clone());
        slot
    }

    // ------------------------------------------------------------------
    // defineProperty
    // ------------------------------------------------------------------

    /// `DefineOwnProperty` with a script descriptor object: parse the
    /// descriptor through the normal Get path, then reconcile.
    pub fn define_own_property(
        self: &Rc<Self>,
        rt: &mut Runtime,
        name: &str,
        descriptor: &ObjectRef,
        throw: bool,
    ) -> VmResult<bool> {
        let desc = PropertyDescriptor::from_object(rt, descriptor)?;
        self.define_own_property_desc(name, &desc, throw)
    }

    /// `DefineOwnProperty` with an already-parsed descriptor.
    ///
    /// Implements the §8.12.9 reconciliation: fresh definitions require
    /// extensibility and default unspecified attributes to false;
    /// redefinitions of non-configurable properties reject attribute
    /// changes, data/accessor conversion, value changes on non-writable
    /// data (unless SameValue), and getter/setter identity changes.
    pub fn define_own_property_desc(
        &self,
        name: &str,
        desc: &PropertyDescriptor,
        throw: bool,
    ) -> VmResult<bool> {
        let has_writable = desc.writable.is_some();
        let writable = desc.writable.unwrap_or(false);
        let has_enumerable = desc.enumerable.is_some();
        let enumerable = desc.enumerable.unwrap_or(false);
        let configurable = desc.configurable.unwrap_or(false);

        if desc.is_accessor() && desc.is_data() {
            return VmError::reject(
                throw,
                false,
                "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
            );
        }

        let getter_obj = desc.get.as_ref().and_then(|v| v.as_object().cloned());
        let setter_obj = desc.set.as_ref().and_then(|v| v.as_object().cloned());

        let existing = self.values.borrow().get(name).cloned();

        let mut prop = match &existing {
            None => {
                if !self.extensible.get() {
                    return VmError::reject(
                        throw,
                        false,
                        format!("[object {}] is not extensible", self.class),
                    );
                }
                WorkProp::default()
            }
            Some(slot) => WorkProp::from_slot(slot),
        };

        if existing.is_some() {
            let reject = || VmError::reject(throw, false, format!("Cannot redefine property: {name}"));

            if !prop.configurable {
                if configurable {
                    return reject();
                }
                if has_enumerable && enumerable != prop.enumerable {
                    return reject();
                }
            }
            if (prop.accessor && desc.is_data()) || (!prop.accessor && desc.is_accessor()) {
                if !prop.configurable {
                    return reject();
                }
            } else if !prop.accessor {
                if !prop.configurable && !prop.writable {
                    if writable {
                        return reject();
                    }
                    if let Some(v) = &desc.value {
                        let current = prop.value.clone().unwrap_or(Value::Undefined);
                        if !v.same_as(&current) {
                            return reject();
                        }
                    }
                }
            } else if !prop.configurable {
                let get_changed = desc.get.is_some() && !same_opt_ref(&prop.get, &getter_obj);
                let set_changed = desc.set.is_some() && !same_opt_ref(&prop.set, &setter_obj);
                if get_changed || set_changed {
                    return reject();
                }
            }
        }

        // A fully-default data definition collapses to a bare value.
        if writable && enumerable && configurable {
            if let Some(v) = &desc.value {
                self.insert(name, Slot::Value(v.clone()));
                return Ok(true);
            }
        }

        if has_writable {
            prop.writable = writable;
        }
        if has_enumerable {
            prop.enumerable = enumerable;
        }
        if desc.configurable.is_some() {
            prop.configurable = configurable;
        }

        if let Some(v) = &desc.value {
            prop.value = Some(v.clone());
            prop.get = None;
            prop.set = None;
        }
        if desc.is_data() {
            prop.accessor = false;
        }
        if desc.get.is_some() {
            prop.get = getter_obj;
            prop.value = None;
            prop.accessor = true;
        }
        if desc.set.is_some() {
            prop.set = setter_obj;
            prop.value = None;
            prop.accessor = true;
        }
        if !prop.accessor && prop.value.is_none() {
            prop.value = Some(Value::Undefined);
        }

        self.insert(name, prop.into_slot());
        Ok(true)
    }

    // ------------------------------------------------------------------
    // ToPrimitive
    // ------------------------------------------------------------------

    fn try_primitive(self: &Rc<Self>, rt: &mut Runtime, method: &str) -> VmResult<Option<Value>> {
        let m = self.get(rt, method)?;
        if let Value::Object(f) = m
            && f.is_callable()
        {
            let v = f.call(rt, FunctionCall::new(Value::Object(self.clone()), Vec::new()))?;
            if !v.is_object() {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    /// ToPrimitive with number hint: `valueOf` first, then `toString`.
    pub fn to_primitive_number(self: &Rc<Self>, rt: &mut Runtime) -> VmResult<Value> {
        if let Some(v) = self.try_primitive(rt, "valueOf")? {
            return Ok(v);
        }
        if let Some(v) = self.try_primitive(rt, "toString")? {
            return Ok(v);
        }
        Err(VmError::type_error(format!(
            "Could not convert [object {}] to primitive",
            self.class
        )))
    }

    /// ToPrimitive with string hint: `toString` first, then `valueOf`.
    pub fn to_primitive_string(self: &Rc<Self>, rt: &mut Runtime) -> VmResult<Value> {
        if let Some(v) = self.try_primitive(rt, "toString")? {
            return Ok(v);
        }
        if let Some(v) = self.try_primitive(rt, "valueOf")? {
            return Ok(v);
        }
        Err(VmError::type_error(format!(
            "Could not convert [object {}] to primitive",
            self.class
        )))
    }

    /// ToPrimitive with the default (number) hint.
    pub fn to_primitive(self: &Rc<Self>, rt: &mut Runtime) -> VmResult<Value> {
        self.to_primitive_number(rt)
    }

    // ------------------------------------------------------------------
    // Enumeration
    // ------------------------------------------------------------------

    /// Lazy enumeration of property names. `all` includes non-enumerable
    /// entries; `recursive` continues into the prototype chain, with own
    /// names shadowing inherited ones.
    pub fn enumerate(self: &Rc<Self>, all: bool, recursive: bool) -> PropIter {
        PropIter::new(self.raw_enumerate(recursive), all)
    }

    pub(crate) fn raw_enumerate(self: &Rc<Self>, recursive: bool) -> RawPropIter {
        RawPropIter::new(self.clone(), recursive)
    }

    /// Snapshot of the insertion-ordered own key list
    pub fn own_keys(&self) -> Vec<String> {
        self.prop_names.borrow().clone()
    }

    // ------------------------------------------------------------------
    // Sort hooks
    // ------------------------------------------------------------------

    /// `ToLength` of the own-or-inherited `length` property
    pub fn sort_len(self: &Rc<Self>, rt: &mut Runtime) -> VmResult<i64> {
        Ok(self.get(rt, "length")?.to_length())
    }

    /// Integer-indexed read for an external comparison sort
    pub fn sort_get(self: &Rc<Self>, rt: &mut Runtime, i: i64) -> VmResult<Value> {
        self.get(rt, &i.to_string())
    }

    /// Swap two integer-indexed elements through Get/Put
    pub fn sort_swap(self: &Rc<Self>, rt: &mut Runtime, i: i64, j: i64) -> VmResult<()> {
        let ii = i.to_string();
        let jj = j.to_string();
        let x = self.get(rt, &ii)?;
        let y = self.get(rt, &jj)?;
        self.put(rt, &ii, y, false)?;
        self.put(rt, &jj, x, false)
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Host-native representation: the generic mapping of own enumerable
    /// names to exported values. Wrappers export their boxed primitive,
    /// callables the function tag.
    pub fn export(self: &Rc<Self>, rt: &mut Runtime) -> VmResult<Export> {
        match &self.kind {
            ObjectKind::Primitive(p) => p.clone().export(rt),
            ObjectKind::Function(_) | ObjectKind::Native(_) | ObjectKind::Bound(_) => {
                Ok(Export::Function)
            }
            ObjectKind::Ordinary => {
                let mut map = FxHashMap::default();
                for item in self.enumerate(false, false) {
                    let v = match item.slot {
                        Slot::Value(v) => v,
                        Slot::Property(Property::Data { value, .. }) => value,
                        Slot::Property(Property::Accessor { .. }) => self.get(rt, &item.name)?,
                    };
                    map.insert(item.name, v.export(rt)?);
                }
                Ok(Export::Map(map))
            }
        }
    }

    /// The host type tag [`export`](Self::export) would produce
    pub fn export_type(&self) -> ExportType {
        match &self.kind {
            ObjectKind::Primitive(p) => p.export_type(),
            ObjectKind::Function(_) | ObjectKind::Native(_) | ObjectKind::Bound(_) => {
                ExportType::Function
            }
            ObjectKind::Ordinary => ExportType::Map,
        }
    }
}

fn same_opt_ref(a: &Option<ObjectRef>, b: &Option<ObjectRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Working form of a property during descriptor reconciliation. Mirrors
/// the stored record but keeps `value` optional so "never supplied" is
/// distinguishable from an explicit undefined.
#[derive(Default)]
struct WorkProp {
    value: Option<Value>,
    writable: bool,
    enumerable: bool,
    configurable: bool,
    accessor: bool,
    get: Option<ObjectRef>,
    set: Option<ObjectRef>,
}

impl WorkProp {
    fn from_slot(slot: &Slot) -> Self {
        match slot {
            Slot::Value(v) => Self {
                value: Some(v.clone()),
                writable: true,
                enumerable: true,
                configurable: true,
                ..Self::default()
            },
            Slot::Property(Property::Data { value, attributes }) => Self {
                value: Some(value.clone()),
                writable: attributes.writable,
                enumerable: attributes.enumerable,
                configurable: attributes.configurable,
                ..Self::default()
            },
            Slot::Property(Property::Accessor {
                get,
                set,
                attributes,
            }) => Self {
                accessor: true,
                get: get.clone(),
                set: set.clone(),
                writable: attributes.writable,
                enumerable: attributes.enumerable,
                configurable: attributes.configurable,
                ..Self::default()
            },
        }
    }

    fn into_slot(self) -> Slot {
        let attributes = PropertyAttributes {
            writable: self.writable,
            enumerable: self.enumerable,
            configurable: self.configurable,
        };
        if self.accessor {
            Slot::Property(Property::Accessor {
                get: self.get,
                set: self.set,
                attributes,
            })
        } else {
            Slot::Property(Property::Data {
                value: self.value.unwrap_or(Value::Undefined),
                attributes,
            })
        }
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsObject")
            .field("class", &self.class)
            .field("properties", &self.prop_names.borrow().len())
            .field("extensible", &self.extensible.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn test_object_get_put() {
        let mut rt = Runtime::new();
        let obj = rt.new_object();

        obj.put(&mut rt, "foo", Value::Number(42.0), false).unwrap();
        assert_eq!(obj.get(&mut rt, "foo").unwrap(), Value::Number(42.0));
        assert!(obj.has_own_property("foo"));
        assert_eq!(obj.get(&mut rt, "missing").unwrap(), Value::Undefined);
    }

    #[test]
    fn test_insertion_order_survives_updates() {
        let mut rt = Runtime::new();
        let obj = rt.new_object();

        obj.put(&mut rt, "a", Value::Number(1.0), false).unwrap();
        obj.put(&mut rt, "b", Value::Number(2.0), false).unwrap();
        obj.put(&mut rt, "a", Value::Number(3.0), false).unwrap();

        assert_eq!(obj.own_keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(obj.get(&mut rt, "a").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_delete_preserves_relative_order() {
        let mut rt = Runtime::new();
        let obj = rt.new_object();
        for name in ["a", "b", "c"] {
            obj.put(&mut rt, name, Value::Number(0.0), false).unwrap();
        }

        assert!(obj.delete("b", false).unwrap());
        assert!(!obj.has_own_property("b"));
        assert_eq!(obj.own_keys(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_delete_absent_reports_success() {
        let rt = Runtime::new();
        let obj = rt.new_object();
        assert!(obj.delete("nope", true).unwrap());
    }

    #[test]
    fn test_delete_non_configurable() {
        let rt = Runtime::new();
        let obj = rt.new_object();
        obj.put_prop("k", Value::Number(1.0), true, true, false);

        assert!(!obj.delete("k", false).unwrap());
        assert!(matches!(obj.delete("k", true), Err(VmError::TypeError(_))));
        assert!(obj.has_own_property("k"));
    }

    #[test]
    fn test_prototype_chain_lookup() {
        let mut rt = Runtime::new();
        let proto = rt.new_object();
        proto.put(&mut rt, "inherited", Value::string("yes"), false).unwrap();
        let obj = rt.new_base_object(Some(proto.clone()), CLASS_OBJECT);

        assert_eq!(obj.get(&mut rt, "inherited").unwrap(), Value::string("yes"));
        assert!(obj.has_property(&rt, "inherited"));
        assert!(!obj.has_own_property("inherited"));
    }

    #[test]
    fn test_own_shadows_inherited() {
        let mut rt = Runtime::new();
        let proto = rt.new_object();
        proto.put(&mut rt, "x", Value::Number(1.0), false).unwrap();
        let obj = rt.new_base_object(Some(proto.clone()), CLASS_OBJECT);
        obj.put(&mut rt, "x", Value::Number(2.0), false).unwrap();

        assert_eq!(obj.get(&mut rt, "x").unwrap(), Value::Number(2.0));
        assert_eq!(proto.get(&mut rt, "x").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_read_only_own_property() {
        let mut rt = Runtime::new();
        let obj = rt.new_object();
        obj.put_prop("ro", Value::Number(1.0), false, true, true);

        // Non-strict: silent failure.
        obj.put(&mut rt, "ro", Value::Number(2.0), false).unwrap();
        assert_eq!(obj.get(&mut rt, "ro").unwrap(), Value::Number(1.0));
        // Strict: TypeError.
        assert!(matches!(
            obj.put(&mut rt, "ro", Value::Number(2.0), true),
            Err(VmError::TypeError(_))
        ));
    }

    #[test]
    fn test_inherited_read_only_blocks_shadowing() {
        let mut rt = Runtime::new();
        let proto = rt.new_object();
        proto.put_prop("x", Value::Number(1.0), false, true, true);
        let obj = rt.new_base_object(Some(proto), CLASS_OBJECT);

        obj.put(&mut rt, "x", Value::Number(2.0), false).unwrap();
        assert_eq!(obj.get(&mut rt, "x").unwrap(), Value::Number(1.0));
        assert!(!obj.has_own_property("x"));
        assert!(matches!(
            obj.put(&mut rt, "x", Value::Number(2.0), true),
            Err(VmError::TypeError(_))
        ));
    }

    #[test]
    fn test_prevent_extensions_blocks_new_names() {
        let mut rt = Runtime::new();
        let obj = rt.new_object();
        obj.put(&mut rt, "old", Value::Number(1.0), false).unwrap();
        obj.prevent_extensions();
        assert!(!obj.is_extensible());

        obj.put(&mut rt, "new", Value::Number(2.0), false).unwrap();
        assert!(!obj.has_own_property("new"));
        assert!(matches!(
            obj.put(&mut rt, "new", Value::Number(2.0), true),
            Err(VmError::TypeError(_))
        ));
        // Existing writable properties still accept writes.
        obj.put(&mut rt, "old", Value::Number(3.0), false).unwrap();
        assert_eq!(obj.get(&mut rt, "old").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_proto_write_and_legacy_read() {
        let mut rt = Runtime::new();
        let obj = rt.new_object();
        let proto = rt.new_object();

        obj.put(&mut rt, "__proto__", Value::Object(proto.clone()), false)
            .unwrap();
        assert!(Rc::ptr_eq(&obj.prototype().unwrap(), &proto));
        // The write never enters the key list.
        assert!(obj.own_keys().is_empty());

        // Legacy raw read quirk: "__proto" (sic) falls back to the prototype.
        match obj.get_own("__proto") {
            Some(Slot::Value(Value::Object(p))) => assert!(Rc::ptr_eq(&p, &proto)),
            other => panic!("expected prototype fallback, got {other:?}"),
        }

        // Primitive values are ignored; null clears.
        obj.put(&mut rt, "__proto__", Value::Number(1.0), false).unwrap();
        assert!(obj.prototype().is_some());
        obj.put(&mut rt, "__proto__", Value::Null, false).unwrap();
        assert!(obj.prototype().is_none());
    }

    #[test]
    fn test_proto_write_rejects_cycles() {
        let mut rt = Runtime::new();
        let a = rt.new_object();
        let b = rt.new_base_object(Some(a.clone()), CLASS_OBJECT);

        assert!(matches!(
            a.put(&mut rt, "__proto__", Value::Object(b.clone()), true),
            Err(VmError::TypeError(_))
        ));
        assert!(a.prototype().is_none());
        assert!(!a.set_prototype(Some(b), false).unwrap());
    }

    #[test]
    fn test_define_fresh_defaults_false() {
        let rt = Runtime::new();
        let obj = rt.new_object();
        let desc = PropertyDescriptor::default().with_value(Value::Number(1.0));
        assert!(obj.define_own_property_desc("k", &desc, true).unwrap());

        match obj.get_own("k") {
            Some(Slot::Property(Property::Data { attributes, .. })) => {
                assert_eq!(attributes, PropertyAttributes::frozen());
            }
            other => panic!("expected data record, got {other:?}"),
        }
    }

    #[test]
    fn test_define_all_true_collapses_to_bare_value() {
        let rt = Runtime::new();
        let obj = rt.new_object();
        let desc = PropertyDescriptor::default()
            .with_value(Value::Number(5.0))
            .with_writable(true)
            .with_enumerable(true)
            .with_configurable(true);
        obj.define_own_property_desc("k", &desc, true).unwrap();
        assert!(matches!(obj.get_own("k"), Some(Slot::Value(_))));
    }

    #[test]
    fn test_define_rejects_accessor_plus_data_fields() {
        let rt = Runtime::new();
        let obj = rt.new_object();
        let desc = PropertyDescriptor::default()
            .with_value(Value::Number(1.0))
            .with_getter(Value::Undefined);
        assert!(matches!(
            obj.define_own_property_desc("k", &desc, true),
            Err(VmError::TypeError(_))
        ));
        assert!(!obj.define_own_property_desc("k", &desc, false).unwrap());
    }

    #[test]
    fn test_redefine_non_configurable() {
        let rt = Runtime::new();
        let obj = rt.new_object();
        let base = PropertyDescriptor::default()
            .with_value(Value::Number(1.0))
            .with_writable(true)
            .with_configurable(false);
        obj.define_own_property_desc("k", &base, true).unwrap();

        // Value change is allowed while writable.
        let change = PropertyDescriptor::default().with_value(Value::Number(2.0));
        assert!(obj.define_own_property_desc("k", &change, true).unwrap());

        // Upgrading configurable is not.
        let upgrade = PropertyDescriptor::default().with_configurable(true);
        assert!(matches!(
            obj.define_own_property_desc("k", &upgrade, true),
            Err(VmError::TypeError(_))
        ));

        // Flipping enumerable is not.
        let flip = PropertyDescriptor::default().with_enumerable(true);
        assert!(matches!(
            obj.define_own_property_desc("k", &flip, true),
            Err(VmError::TypeError(_))
        ));
    }

    #[test]
    fn test_redefine_non_writable_value() {
        let rt = Runtime::new();
        let obj = rt.new_object();
        let base = PropertyDescriptor::default()
            .with_value(Value::Number(1.0))
            .with_writable(false)
            .with_configurable(false);
        obj.define_own_property_desc("k", &base, true).unwrap();

        // Same value is idempotent.
        let same = PropertyDescriptor::default().with_value(Value::Number(1.0));
        assert!(obj.define_own_property_desc("k", &same, true).unwrap());
        // A different value rejects.
        let diff = PropertyDescriptor::default().with_value(Value::Number(2.0));
        assert!(!obj.define_own_property_desc("k", &diff, false).unwrap());
        // So does upgrading writable.
        let upgrade = PropertyDescriptor::default().with_writable(true);
        assert!(matches!(
            obj.define_own_property_desc("k", &upgrade, true),
            Err(VmError::TypeError(_))
        ));
        assert_eq!(
            match obj.get_own("k") {
                Some(Slot::Property(Property::Data { value, .. })) => value,
                other => panic!("unexpected slot {other:?}"),
            },
            Value::Number(1.0)
        );
    }

    #[test]
    fn test_non_configurable_data_to_accessor_rejected() {
        let rt = Runtime::new();
        let obj = rt.new_object();
        let base = PropertyDescriptor::default()
            .with_value(Value::Number(1.0))
            .with_configurable(false);
        obj.define_own_property_desc("k", &base, true).unwrap();

        let to_accessor = PropertyDescriptor::default().with_getter(Value::Undefined);
        assert!(!obj.define_own_property_desc("k", &to_accessor, false).unwrap());
        assert!(matches!(obj.get_own("k"), Some(Slot::Property(Property::Data { .. }))));
    }

    #[test]
    fn test_non_configurable_accessor_resists_writable_conversion() {
        let rt = Runtime::new();
        let obj = rt.new_object();
        let base = PropertyDescriptor::default()
            .with_getter(Value::Undefined)
            .with_configurable(false);
        obj.define_own_property_desc("k", &base, true).unwrap();

        // `{writable: true}` is a data descriptor; the conversion must
        // reject rather than silently turning the accessor into data.
        let sneaky = PropertyDescriptor::default().with_writable(true);
        assert!(!obj.define_own_property_desc("k", &sneaky, false).unwrap());
        assert!(matches!(
            obj.get_own("k"),
            Some(Slot::Property(Property::Accessor { .. }))
        ));
    }

    #[test]
    fn test_export_nested() {
        let mut rt = Runtime::new();
        let inner = rt.new_object();
        inner.put(&mut rt, "n", Value::Number(7.0), false).unwrap();
        let outer = rt.new_object();
        outer.put(&mut rt, "inner", Value::Object(inner), false).unwrap();
        outer.put_prop("hidden", Value::Number(1.0), true, false, true);

        let Export::Map(map) = outer.export(&mut rt).unwrap() else {
            panic!("expected map export");
        };
        assert!(!map.contains_key("hidden"));
        let Export::Map(inner_map) = &map["inner"] else {
            panic!("expected nested map");
        };
        assert_eq!(inner_map["n"], Export::Number(7.0));
        assert_eq!(outer.export_type(), ExportType::Map);
    }

    #[test]
    fn test_sort_hooks() {
        let mut rt = Runtime::new();
        let obj = rt.new_object();
        obj.put(&mut rt, "0", Value::string("b"), false).unwrap();
        obj.put(&mut rt, "1", Value::string("a"), false).unwrap();
        obj.put(&mut rt, "length", Value::Number(2.0), false).unwrap();

        assert_eq!(obj.sort_len(&mut rt).unwrap(), 2);
        obj.sort_swap(&mut rt, 0, 1).unwrap();
        assert_eq!(obj.sort_get(&mut rt, 0).unwrap(), Value::string("a"));
        assert_eq!(obj.sort_get(&mut rt, 1).unwrap(), Value::string("b"));
    }

    #[test]
    fn test_deep_chain_is_bounded() {
        let mut rt = Runtime::new();
        let mut proto = rt.new_object();
        proto.put(&mut rt, "deep", Value::Number(1.0), false).unwrap();
        for _ in 0..(rt.config().max_prototype_chain_depth + 10) {
            proto = rt.new_base_object(Some(proto), CLASS_OBJECT);
        }
        let obj = rt.new_base_object(Some(proto), CLASS_OBJECT);
        assert_eq!(obj.get(&mut rt, "deep").unwrap(), Value::Undefined);
    }
}
