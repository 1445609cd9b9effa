use alloc::boxed::Box;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use crate::ContextError;
use crate::key::TypeMap;

struct Entry {
    value: Box<dyn Any>,
    locked: bool,
    name: &'static str,
}

/// A typed service registry handed to cells when they are created.
///
/// Services are keyed by their type, so there is at most one service per type. A service added
/// with [`Context::add_locked`] cannot be replaced through `add`/`add_locked` until it is
/// removed (or taken), which suits single-use services that must not be swapped mid-flight.
#[derive(Default)]
pub struct Context {
    services: TypeMap<Entry>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a service, returning the previous one.
    pub fn add<S: Any>(&mut self, service: S) -> Result<Option<S>, ContextError> {
        self.insert(service, false)
    }

    /// Registers a service and locks it against replacement.
    pub fn add_locked<S: Any>(&mut self, service: S) -> Result<Option<S>, ContextError> {
        self.insert(service, true)
    }

    fn insert<S: Any>(&mut self, service: S, locked: bool) -> Result<Option<S>, ContextError> {
        let id = TypeId::of::<S>();
        if self.services.get(&id).is_some_and(|e| e.locked) {
            vwarn!(service = type_name::<S>(), "rejected replacement of a locked service");
            return Err(ContextError::Locked(type_name::<S>()));
        }
        let prev = self.services.insert(
            id,
            Entry {
                value: Box::new(service),
                locked,
                name: type_name::<S>(),
            },
        );
        Ok(prev.and_then(|e| e.value.downcast::<S>().ok()).map(|b| *b))
    }

    pub fn get<S: Any>(&self) -> Option<&S> {
        self.services
            .get(&TypeId::of::<S>())
            .and_then(|e| e.value.downcast_ref::<S>())
    }

    pub fn get_mut<S: Any>(&mut self) -> Option<&mut S> {
        self.services
            .get_mut(&TypeId::of::<S>())
            .and_then(|e| e.value.downcast_mut::<S>())
    }

    /// Like [`Context::get`], but a missing service is an error.
    pub fn require<S: Any>(&self) -> Result<&S, ContextError> {
        self.get::<S>()
            .ok_or(ContextError::Missing(type_name::<S>()))
    }

    /// Removes and returns a service. Locked services are unlocked by removal.
    pub fn take<S: Any>(&mut self) -> Option<S> {
        let entry = self.services.remove(&TypeId::of::<S>())?;
        entry.value.downcast::<S>().ok().map(|b| *b)
    }

    /// Removes a service, reporting whether one was registered.
    pub fn remove<S: Any>(&mut self) -> bool {
        self.services.remove(&TypeId::of::<S>()).is_some()
    }

    pub fn has<S: Any>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<S>())
    }

    pub fn is_locked<S: Any>(&self) -> bool {
        self.services
            .get(&TypeId::of::<S>())
            .is_some_and(|e| e.locked)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for entry in self.services.values() {
            if entry.locked {
                list.entry(&format_args!("{} (locked)", entry.name));
            } else {
                list.entry(&format_args!("{}", entry.name));
            }
        }
        list.finish()
    }
}
