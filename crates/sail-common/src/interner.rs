//! String interning for identifier deduplication.
//!
//! The checker is specified as strictly single-threaded (see the
//! concurrency & resource model), so unlike a scanner shared across worker
//! threads, this interner is a plain `RefCell`-guarded table rather than a
//! sharded/concurrent one.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// An interned string. Two atoms compare equal iff their string payloads
/// are equal; interning makes that comparison an integer compare.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Atom(u32);

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.0)
    }
}

/// A single-threaded string interner.
#[derive(Default)]
pub struct Interner {
    inner: RefCell<InternerInner>,
}

#[derive(Default)]
struct InternerInner {
    strings: Vec<Rc<str>>,
    lookup: FxHashMap<Rc<str>, u32>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning a stable `Atom` for it.
    pub fn intern(&self, text: &str) -> Atom {
        let mut inner = self.inner.borrow_mut();
        if let Some(&id) = inner.lookup.get(text) {
            return Atom(id);
        }
        let rc: Rc<str> = Rc::from(text);
        let id = inner.strings.len() as u32;
        inner.strings.push(rc.clone());
        inner.lookup.insert(rc, id);
        Atom(id)
    }

    /// Resolve an atom back to its string payload.
    pub fn resolve(&self, atom: Atom) -> Rc<str> {
        self.inner.borrow().strings[atom.0 as usize].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_interns_to_same_atom() {
        let interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn different_text_interns_to_different_atoms() {
        let interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
        assert_eq!(&*interner.resolve(a), "foo");
        assert_eq!(&*interner.resolve(b), "bar");
    }
}
