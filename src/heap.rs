/// Object store for reference-semantics values (class instances and strings)
/// with an explicit mark-sweep collector.
///
/// Slots are reused after a sweep; every slot carries a generation so a
/// handle to a collected object never aliases its successor.
use std::collections::HashSet;

use crate::value::{ClassInstance, Value};

/// Handle to a heap slot. Only the handle is copied, never the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeapObject {
    Instance(ClassInstance),
    Str(String),
}

impl HeapObject {
    fn children(&self, out: &mut Vec<ObjectRef>) {
        match self {
            HeapObject::Instance(inst) => inst.fields.values().for_each(|v| v.collect_refs(out)),
            HeapObject::Str(_) => {}
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug)]
struct Entry {
    id: u64,
    object: HeapObject,
}

#[derive(Debug, Default)]
pub struct HeapManager {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: HashSet<ObjectRef>,
    next_id: u64,
    live: usize,
}

impl HeapManager {
    pub fn new() -> Self {
        HeapManager {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Store `object`, issue a fresh id and register it as a root.
    pub fn allocate(&mut self, object: HeapObject) -> ObjectRef {
        let id = self.next_id;
        self.next_id += 1;
        let entry = Some(Entry { id, object });

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = entry;
                ObjectRef {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry,
                });
                ObjectRef {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        self.live += 1;
        self.roots.insert(handle);
        tracing::trace!(id, "heap allocate");
        handle
    }

    fn entry(&self, handle: ObjectRef) -> Option<&Entry> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    pub fn get(&self, handle: ObjectRef) -> Option<&HeapObject> {
        self.entry(handle).map(|e| &e.object)
    }

    pub fn get_mut(&mut self, handle: ObjectRef) -> Option<&mut HeapObject> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_mut().map(|e| &mut e.object)
    }

    /// Monotonic identity issued at allocation time.
    pub fn id_of(&self, handle: ObjectRef) -> Option<u64> {
        self.entry(handle).map(|e| e.id)
    }

    pub fn contains(&self, handle: ObjectRef) -> bool {
        self.entry(handle).is_some()
    }

    pub fn add_root(&mut self, handle: ObjectRef) {
        if self.contains(handle) {
            self.roots.insert(handle);
        }
    }

    pub fn remove_root(&mut self, handle: ObjectRef) {
        self.roots.remove(&handle);
    }

    /// Replace the root set. Handles to freed objects are ignored.
    pub fn set_roots(&mut self, roots: impl IntoIterator<Item = ObjectRef>) {
        let roots: HashSet<ObjectRef> = roots.into_iter().filter(|r| self.contains(*r)).collect();
        self.roots = roots;
    }

    pub fn is_root(&self, handle: ObjectRef) -> bool {
        self.roots.contains(&handle)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Mark everything reachable from the roots, then free the rest.
    /// Returns the number of objects freed.
    pub fn collect(&mut self) -> usize {
        let mut marked = vec![false; self.slots.len()];
        let mut stack: Vec<ObjectRef> = self.roots.iter().copied().collect();

        while let Some(handle) = stack.pop() {
            let Some(entry) = self.entry(handle) else {
                continue;
            };
            let seen = &mut marked[handle.index as usize];
            if *seen {
                continue;
            }
            *seen = true;
            entry.object.children(&mut stack);
        }

        let mut freed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.is_some() && !marked[index] {
                slot.entry = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                freed += 1;
            }
        }

        let slots = &self.slots;
        self.roots.retain(|r| {
            slots
                .get(r.index as usize)
                .map(|s| s.generation == r.generation && s.entry.is_some())
                .unwrap_or(false)
        });
        self.live -= freed;
        tracing::debug!(freed, live = self.live, "heap collect");
        freed
    }

    /// Convenience for the string payload behind a handle.
    pub fn string(&self, handle: ObjectRef) -> Option<&str> {
        match self.get(handle)? {
            HeapObject::Str(s) => Some(s),
            HeapObject::Instance(_) => None,
        }
    }

    pub fn alloc_string(&mut self, s: impl Into<String>) -> Value {
        Value::Str(self.allocate(HeapObject::Str(s.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_not_reused() {
        let mut heap = HeapManager::new();
        let a = heap.allocate(HeapObject::Str("a".into()));
        heap.remove_root(a);
        assert_eq!(heap.collect(), 1);
        let b = heap.allocate(HeapObject::Str("b".into()));
        assert_eq!(heap.id_of(b), Some(2));
        assert_eq!(heap.get(a), None);
        assert_eq!(heap.string(b), Some("b"));
    }

    #[test]
    fn collect_traces_instance_fields() {
        use std::rc::Rc;

        use crate::value::{Fields, TypeDef};

        let mut heap = HeapManager::new();
        let name = heap.alloc_string("node");
        let Value::Str(name_ref) = name else {
            panic!("expected a string handle");
        };
        let def = Rc::new(TypeDef {
            name: "Node".to_string(),
            fields: Vec::new(),
            initializers: Vec::new(),
            methods: Default::default(),
            constructor: None,
        });
        let node = heap.allocate(HeapObject::Instance(ClassInstance {
            def,
            fields: Fields(vec![("name".to_string(), name)]),
        }));
        let orphan = heap.allocate(HeapObject::Str("orphan".into()));

        heap.set_roots([node]);
        assert_eq!(heap.collect(), 1);
        assert!(heap.contains(name_ref));
        assert!(!heap.contains(orphan));
    }

    #[test]
    fn allocation_registers_root() {
        let mut heap = HeapManager::new();
        let a = heap.allocate(HeapObject::Str("a".into()));
        assert!(heap.is_root(a));
        assert_eq!(heap.collect(), 0);
        assert_eq!(heap.len(), 1);
    }
}
