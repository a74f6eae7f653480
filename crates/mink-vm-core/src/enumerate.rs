//! Property enumeration iterators
//!
//! Enumeration is a two-layer pipeline. [`RawPropIter`] walks one object's
//! key list — snapshotted at creation so mutation during iteration cannot
//! invalidate the walk — and, when recursive, hands off to the prototype's
//! raw iterator once its own names are exhausted. [`PropIter`] filters the
//! raw stream: each name is yielded at most once (own entries shadow
//! inherited ones, whether or not they are enumerable), and non-enumerable
//! entries are dropped unless `all` is set.

use rustc_hash::FxHashSet;

use crate::object::ObjectRef;
use crate::property::Slot;

/// One enumerated property: the key and the raw map entry (accessors
/// unevaluated).
#[derive(Clone, Debug)]
pub struct PropIterItem {
    /// Property name
    pub name: String,
    /// Raw entry at the time the iterator reached it
    pub slot: Slot,
}

/// Iterator over one object's own entries, optionally continuing into the
/// prototype chain. Keys deleted after creation are skipped; keys added
/// after creation are not seen.
pub struct RawPropIter {
    obj: ObjectRef,
    names: Vec<String>,
    idx: usize,
    recursive: bool,
    delegate: Option<Box<RawPropIter>>,
}

impl RawPropIter {
    pub(crate) fn new(obj: ObjectRef, recursive: bool) -> Self {
        let names = obj.prop_names.borrow().clone();
        Self {
            obj,
            names,
            idx: 0,
            recursive,
            delegate: None,
        }
    }
}

impl Iterator for RawPropIter {
    type Item = PropIterItem;

    fn next(&mut self) -> Option<PropIterItem> {
        if let Some(delegate) = &mut self.delegate {
            return delegate.next();
        }
        while self.idx < self.names.len() {
            let name = &self.names[self.idx];
            self.idx += 1;
            // Live lookup: the snapshot only fixes the order, not the entries.
            if let Some(slot) = self.obj.values.borrow().get(name) {
                return Some(PropIterItem {
                    name: name.clone(),
                    slot: slot.clone(),
                });
            }
        }
        if self.recursive
            && let Some(proto) = self.obj.prototype()
        {
            let delegate = self.delegate.insert(Box::new(proto.raw_enumerate(true)));
            return delegate.next();
        }
        None
    }
}

/// Filtering iterator over a raw stream: dedup (own shadows inherited) and
/// enumerability.
pub struct PropIter {
    inner: RawPropIter,
    all: bool,
    seen: FxHashSet<String>,
}

impl PropIter {
    pub(crate) fn new(inner: RawPropIter, all: bool) -> Self {
        Self {
            inner,
            all,
            seen: FxHashSet::default(),
        }
    }
}

impl Iterator for PropIter {
    type Item = PropIterItem;

    fn next(&mut self) -> Option<PropIterItem> {
        loop {
            let item = self.inner.next()?;
            // A name seen once shadows every later occurrence, even when
            // the shadowing entry itself is filtered out as non-enumerable.
            if !self.seen.insert(item.name.clone()) {
                continue;
            }
            if !self.all && !item.slot.is_enumerable() {
                continue;
            }
            return Some(item);
        }
    }
}
