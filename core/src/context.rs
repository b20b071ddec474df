//! The user context bag threaded through a render pass.
//!
//! A [`Context`] is a typed map: each value is stored under its own type, the same
//! way a view environment stores theme or locale values. Cloning is cheap and never
//! shares mutations, so a component can extend the context for its own subtree
//! without affecting its siblings.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use crate::component::ComponentId;

/// Typed key/value bag handed to deferred functions and component render functions.
#[derive(Clone, Default)]
pub struct Context {
    values: Rc<BTreeMap<TypeId, Entry>>,
}

#[derive(Clone)]
struct Entry {
    name: &'static str,
    value: Rc<dyn Any>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, replacing any previous value of the same type.
    pub fn insert<T: 'static>(&mut self, value: T) {
        Rc::make_mut(&mut self.values).insert(
            TypeId::of::<T>(),
            Entry {
                name: type_name::<T>(),
                value: Rc::new(value),
            },
        );
    }

    /// Returns a copy of this context with `value` stored in it.
    #[must_use]
    pub fn with<T: 'static>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// Looks up the value stored for type `T`.
    #[must_use]
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|entry| (*entry.value).downcast_ref::<T>())
    }

    /// Returns `true` if a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// The id of the component whose subtree is currently rendering, if any.
    #[must_use]
    pub fn component(&self) -> Option<ComponentId> {
        self.get::<ComponentScope>().map(|scope| scope.id)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.values.values().map(|entry| entry.name))
            .finish()
    }
}

/// Injected by the engine into the context of every component render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentScope {
    /// Id of the component descriptor being rendered.
    pub id: ComponentId,
}
