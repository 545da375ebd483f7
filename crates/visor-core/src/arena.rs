use visor_protocol::handle::{Handle, ResourceKind};

use crate::error::ResourceError;

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena that hands out generation-checked handles.
///
/// Removing a resource bumps its slot's generation, so any handle still
/// pointing at the old occupant is rejected instead of aliasing whatever
/// is allocated there next. A slot whose generation reaches the ceiling is
/// retired rather than reused, so generations never wrap.
pub struct ResourceArena<T> {
    kind: ResourceKind,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
    max_generation: u32,
}

impl<T> ResourceArena<T> {
    pub fn new(kind: ResourceKind) -> Self {
        Self::with_max_generation(kind, u32::MAX)
    }

    /// Arena whose slots are retired once their generation reaches
    /// `max_generation` (at least 1).
    pub fn with_max_generation(kind: ResourceKind, max_generation: u32) -> Self {
        Self {
            kind,
            // Slot 0 is reserved so that a zeroed handle is always null
            slots: vec![Slot {
                generation: 0,
                value: None,
            }],
            free: Vec::new(),
            live: 0,
            max_generation: max_generation.max(1),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Store a resource and return its handle.
    pub fn insert(&mut self, value: T) -> Handle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::new(self.kind, index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        Handle::new(self.kind, index, 1)
    }

    fn check(&self, handle: Handle) -> Result<usize, ResourceError> {
        if handle.kind != self.kind {
            return Err(ResourceError::WrongKind {
                handle,
                expected: self.kind,
            });
        }
        if handle.is_null() {
            return Err(ResourceError::NullHandle(self.kind));
        }
        match self.slots.get(handle.index as usize) {
            Some(slot) if slot.generation == handle.generation && slot.value.is_some() => {
                Ok(handle.index as usize)
            }
            Some(_) => Err(ResourceError::StaleHandle(handle)),
            None => Err(ResourceError::UnknownHandle(handle)),
        }
    }

    pub fn get(&self, handle: Handle) -> Result<&T, ResourceError> {
        let index = self.check(handle)?;
        self.slots[index]
            .value
            .as_ref()
            .ok_or(ResourceError::StaleHandle(handle))
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T, ResourceError> {
        let index = self.check(handle)?;
        self.slots[index]
            .value
            .as_mut()
            .ok_or(ResourceError::StaleHandle(handle))
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.check(handle).is_ok()
    }

    /// Remove a resource, invalidating every outstanding copy of its handle.
    pub fn remove(&mut self, handle: Handle) -> Result<T, ResourceError> {
        let index = self.check(handle)?;
        let slot = &mut self.slots[index];
        let value = slot.value.take().ok_or(ResourceError::StaleHandle(handle))?;
        if slot.generation < self.max_generation {
            slot.generation += 1;
            self.free.push(index as u32);
        }
        self.live -= 1;
        Ok(value)
    }

    /// Return number of live resources.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
