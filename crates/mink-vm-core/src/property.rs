//! Property records and descriptors
//!
//! Two distinct shapes, deliberately kept apart: [`Property`] is the
//! strongly-typed record *stored* in an object's map, while
//! [`PropertyDescriptor`] is the *parsed* form of a script-provided
//! descriptor object, with every field optional. `defineProperty`-style
//! reconciliation consumes the latter and produces the former.

use crate::error::VmResult;
use crate::object::ObjectRef;
use crate::runtime::Runtime;
use crate::value::Value;

/// Property attributes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyAttributes {
    /// Property is writable
    pub writable: bool,
    /// Property is enumerable
    pub enumerable: bool,
    /// Property is configurable
    pub configurable: bool,
}

impl PropertyAttributes {
    /// Default data property attributes (all true)
    pub const fn data() -> Self {
        Self {
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Attributes of built-in function properties (`name`, `length`):
    /// non-writable, non-enumerable, configurable.
    pub const fn function_prop() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: true,
        }
    }

    /// Non-writable, non-enumerable, non-configurable
    pub const fn frozen() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }
}

/// A stored property record
#[derive(Clone, Debug)]
pub enum Property {
    /// Data property
    Data {
        /// The value
        value: Value,
        /// Attributes
        attributes: PropertyAttributes,
    },
    /// Accessor property. `writable` is not applicable and kept false
    /// for structural consistency.
    Accessor {
        /// Getter object, if any
        get: Option<ObjectRef>,
        /// Setter object, if any
        set: Option<ObjectRef>,
        /// Attributes
        attributes: PropertyAttributes,
    },
}

impl Property {
    /// Create a data property
    pub fn data(value: Value, attributes: PropertyAttributes) -> Self {
        Self::Data { value, attributes }
    }

    /// A write through this record can succeed: writable data, or an
    /// accessor with a setter.
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Data { attributes, .. } => attributes.writable,
            Self::Accessor { set, .. } => set.is_some(),
        }
    }

    /// Check if configurable
    pub fn is_configurable(&self) -> bool {
        match self {
            Self::Data { attributes, .. } | Self::Accessor { attributes, .. } => {
                attributes.configurable
            }
        }
    }

    /// Check if enumerable
    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Data { attributes, .. } | Self::Accessor { attributes, .. } => {
                attributes.enumerable
            }
        }
    }
}

/// An entry in an object's property map.
///
/// A bare value is an implicit data property with all attributes true;
/// the full record form carries explicit attributes or accessors.
#[derive(Clone, Debug)]
pub enum Slot {
    /// Bare stored value (implicit writable/enumerable/configurable)
    Value(Value),
    /// Full property record
    Property(Property),
}

impl Slot {
    /// Enumerability of this entry
    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Value(_) => true,
            Self::Property(p) => p.is_enumerable(),
        }
    }
}

/// A parsed property descriptor: the fields a descriptor object actually
/// carried. Absent fields stay `None`; an explicitly-`undefined` field is
/// present (`Some(Value::Undefined)`), matching the probe semantics of the
/// descriptor protocol.
#[derive(Clone, Debug, Default)]
pub struct PropertyDescriptor {
    /// `value` field
    pub value: Option<Value>,
    /// `writable` field, already coerced to boolean
    pub writable: Option<bool>,
    /// `enumerable` field, already coerced to boolean
    pub enumerable: Option<bool>,
    /// `configurable` field, already coerced to boolean
    pub configurable: Option<bool>,
    /// `get` field, unparsed (may be any value; only objects are kept)
    pub get: Option<Value>,
    /// `set` field, unparsed
    pub set: Option<Value>,
}

impl PropertyDescriptor {
    /// Parse a descriptor object by probing its fields through the normal
    /// `Get` path (prototype chain included, accessors evaluated). Field
    /// probes run script and may observe or mutate the descriptor object.
    pub fn from_object(rt: &mut Runtime, descr: &ObjectRef) -> VmResult<Self> {
        Ok(Self {
            value: descr.probe(rt, "value")?,
            writable: descr.probe(rt, "writable")?.map(|v| v.to_boolean()),
            enumerable: descr.probe(rt, "enumerable")?.map(|v| v.to_boolean()),
            configurable: descr.probe(rt, "configurable")?.map(|v| v.to_boolean()),
            get: descr.probe(rt, "get")?,
            set: descr.probe(rt, "set")?,
        })
    }

    /// The descriptor mentions data fields (`value` or `writable`).
    pub fn is_data(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// The descriptor mentions accessor fields (`get` or `set`).
    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Builder: set `value`
    pub fn with_value(mut self, v: Value) -> Self {
        self.value = Some(v);
        self
    }

    /// Builder: set `writable`
    pub fn with_writable(mut self, w: bool) -> Self {
        self.writable = Some(w);
        self
    }

    /// Builder: set `enumerable`
    pub fn with_enumerable(mut self, e: bool) -> Self {
        self.enumerable = Some(e);
        self
    }

    /// Builder: set `configurable`
    pub fn with_configurable(mut self, c: bool) -> Self {
        self.configurable = Some(c);
        self
    }

    /// Builder: set `get`
    pub fn with_getter(mut self, g: Value) -> Self {
        self.get = Some(g);
        self
    }

    /// Builder: set `set`
    pub fn with_setter(mut self, s: Value) -> Self {
        self.set = Some(s);
        self
    }
}
