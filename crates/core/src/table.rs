//! Open-addressing, linear-probed hash table.
//!
//! One `Table` type serves two roles in the VM: the string intern set
//! (`Rc<ObjString>` keys, values unused/`Value::Nil`) and the globals map
//! (`Rc<ObjString>` keys, `Value` payloads). Both roles need identical
//! probing, growth, and tombstone behavior, so there is exactly one
//! implementation rather than two structurally-identical ones.
//!
//! Because keys are always interned strings, key equality for `get`/`set`/
//! `delete` is pointer identity (`Rc::ptr_eq`). Two different `Rc`s are
//! never the same key even if their bytes match, and the only way to find
//! an existing interned string by content is [`Table::find_key`], which is
//! the one place probing compares by (length, hash, bytes) instead of
//! identity, since the whole point of that call is that the candidate
//! isn't an `Rc` yet.
//!
//! `Table` is also, by construction, the sole owner of every `Rc<ObjString>`
//! it interns: once [`Table::intern`] inserts a fresh string, the slot's
//! `key` is the only strong reference an un-aliased caller gets back a
//! clone of. Dropping the table (which happens when the owning `Vm` is
//! dropped) drops every slot, and with it the last strong reference to any
//! string nobody else is holding (the bulk "free all objects at VM
//! teardown" object-lifetime model calls for), achieved with
//! ordinary Rust ownership instead of an intrusive linked list walked by a
//! manual `freeObjects`.

use std::rc::Rc;

use crate::object::ObjString;
use crate::value::Value;

const INITIAL_CAPACITY: usize = 8;
const MAX_LOAD: f64 = 0.75;

#[derive(Clone)]
enum Slot {
    Empty,
    Tombstone,
    Occupied { key: Rc<ObjString>, value: Value },
}

pub struct Table {
    slots: Vec<Slot>,
    /// Live entries only (tombstones are not counted).
    count: usize,
    tombstones: usize,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Table {
            slots: Vec::new(),
            count: 0,
            tombstones: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Walk the probe sequence for `hash`, by identity, returning the
    /// index of either the matching occupied slot or the first slot
    /// (empty or tombstone) a new entry for this key could be written to.
    /// Used by `get`/`set`/`delete`.
    fn probe_by_identity(&self, key: &Rc<ObjString>) -> usize {
        let capacity = self.capacity();
        let mut index = (key.hash as usize) & (capacity - 1);
        let mut first_tombstone: Option<usize> = None;
        loop {
            match &self.slots[index] {
                Slot::Empty => return first_tombstone.unwrap_or(index),
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(index);
                    }
                }
                Slot::Occupied { key: k, .. } if Rc::ptr_eq(k, key) => return index,
                Slot::Occupied { .. } => {}
            }
            index = (index + 1) & (capacity - 1);
        }
    }

    fn grow_if_needed(&mut self) {
        if (self.count + self.tombstones + 1) as f64 > self.capacity() as f64 * MAX_LOAD {
            let new_capacity = if self.capacity() == 0 {
                INITIAL_CAPACITY
            } else {
                self.capacity() * 2
            };
            self.adjust_capacity(new_capacity);
        }
    }

    /// Rehash every live entry into a fresh, larger slot array, dropping
    /// tombstones (they have no meaning once the probe chains they were
    /// preserving are rebuilt from scratch).
    fn adjust_capacity(&mut self, new_capacity: usize) {
        let old_slots = std::mem::replace(
            &mut self.slots,
            (0..new_capacity).map(|_| Slot::Empty).collect(),
        );
        self.count = 0;
        self.tombstones = 0;
        for slot in old_slots {
            if let Slot::Occupied { key, value } = slot {
                self.set(key, value);
            }
        }
    }

    /// Insert or overwrite `key => value`. Returns `true` iff `key` was
    /// not already present (a fresh insertion, possibly reusing a
    /// tombstone slot found earlier in the probe chain).
    pub fn set(&mut self, key: Rc<ObjString>, value: Value) -> bool {
        self.grow_if_needed();
        let index = self.probe_by_identity(&key);
        let is_new = !matches!(self.slots[index], Slot::Occupied { .. });
        if is_new && !matches!(self.slots[index], Slot::Tombstone) {
            self.count += 1;
        } else if is_new {
            // Reusing a tombstone: still a net-new live entry, but we
            // must not double count it against `tombstones`.
            self.count += 1;
            self.tombstones -= 1;
        }
        self.slots[index] = Slot::Occupied { key, value };
        is_new
    }

    pub fn get(&self, key: &Rc<ObjString>) -> Option<Value> {
        if self.capacity() == 0 {
            return None;
        }
        let index = self.probe_by_identity(key);
        match &self.slots[index] {
            Slot::Occupied { value, .. } => Some(value.clone()),
            _ => None,
        }
    }

    /// Replace the slot with a tombstone. Does not decrement `count` in
    /// the caller-visible sense that capacity accounting still reserves
    /// room for it until the next resize (tombstones count toward the
    /// load factor so probe chains they're part of never get truncated by
    /// premature growth skipping them).
    pub fn delete(&mut self, key: &Rc<ObjString>) -> bool {
        if self.capacity() == 0 {
            return false;
        }
        let index = self.probe_by_identity(key);
        if matches!(self.slots[index], Slot::Occupied { .. }) {
            self.slots[index] = Slot::Tombstone;
            self.count -= 1;
            self.tombstones += 1;
            true
        } else {
            false
        }
    }

    /// Copy every live entry of `self` into `dst`. Whole-table copy used
    /// when merging tables (not exercised by the VM's two singleton
    /// tables today, but part of the table's public contract).
    pub fn add_all(&self, dst: &mut Table) {
        for slot in &self.slots {
            if let Slot::Occupied { key, value } = slot {
                dst.set(Rc::clone(key), value.clone());
            }
        }
    }

    /// Find an already-interned string with these exact bytes, comparing
    /// by (hash, length, bytes) rather than identity (the candidate
    /// isn't an object yet, so identity comparison is unavailable). Stops
    /// at the first truly empty slot; tombstones are skipped so probe
    /// chains broken by deletions are still searched in full.
    pub fn find_key(&self, bytes: &[u8], hash: u32) -> Option<Rc<ObjString>> {
        let capacity = self.capacity();
        if capacity == 0 {
            return None;
        }
        let mut index = (hash as usize) & (capacity - 1);
        loop {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied { key, .. }
                    if key.hash == hash && key.bytes.as_bytes() == bytes =>
                {
                    return Some(Rc::clone(key));
                }
                Slot::Occupied { .. } => {}
            }
            index = (index + 1) & (capacity - 1);
        }
    }

    /// Intern `text`: if an equal string already exists in this table,
    /// return the existing handle; otherwise allocate a fresh `ObjString`,
    /// insert it (with an unused `Value::Nil` payload, since this table is
    /// being used as a set), and return the new handle. Used both for
    /// string literals at compile time and for concatenation results at
    /// run time. The original's `copyString`/`takeString` split exists
    /// only because C needs to decide whether to free a buffer it already
    /// allocated. Rust ownership makes that distinction disappear, so
    /// there's only ever one path.
    pub fn intern(&mut self, text: &str) -> Rc<ObjString> {
        let hash = crate::object::fnv1a_hash(text.as_bytes());
        if let Some(existing) = self.find_key(text.as_bytes(), hash) {
            return existing;
        }
        let obj = ObjString::new(text);
        self.set(Rc::clone(&obj), Value::Nil);
        obj
    }
}
