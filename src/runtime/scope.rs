use crate::lang::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub identifier: String,
    pub value: Value,
}

/// Variables of one indentation level.
///
/// A fixed table of slots addressed by `hash(identifier) % slots`. Collisions
/// probe linearly to the next slot. Slots are never freed one by one, only
/// all at once by [`Scope::clear`], so a lookup can stop at the first empty slot.
#[derive(Debug, Clone)]
pub struct Scope {
    slots: Vec<Option<Variable>>,
    used: usize,
}

/// djb2 string hash.
pub fn hash(name: &str) -> u64 {
    name.bytes()
        .fold(5381u64, |h, b| h.wrapping_mul(33).wrapping_add(b as u64))
}

impl Scope {
    pub fn new(slots: usize) -> Self {
        Scope {
            slots: vec![None; slots.max(1)],
            used: 0,
        }
    }

    /// Slot indices in probe order for `name`.
    fn probe(&self, name: &str) -> impl Iterator<Item = usize> + use<> {
        let size = self.slots.len();
        let start = (hash(name) % size as u64) as usize;
        (0..size).map(move |step| (start + step) % size)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        for index in self.probe(name) {
            match &self.slots[index] {
                None => return None,
                Some(var) if var.identifier == name => return Some(&var.value),
                Some(_) => {}
            }
        }
        None
    }

    /// Stores `value` under `name`, replacing any previous value.
    ///
    /// Hands the value back if the table has no free slot left.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), Value> {
        for index in self.probe(name) {
            match &mut self.slots[index] {
                Some(var) if var.identifier == name => {
                    var.value = value;
                    return Ok(());
                }
                Some(_) => {}
                empty => {
                    *empty = Some(Variable {
                        identifier: name.to_string(),
                        value,
                    });
                    self.used += 1;
                    return Ok(());
                }
            }
        }
        Err(value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of new names the table can still take.
    pub fn free_slots(&self) -> usize {
        self.slots.len() - self.used
    }

    pub fn clear(&mut self) {
        if self.used > 0 {
            self.slots.iter_mut().for_each(|slot| *slot = None);
            self.used = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Variables in slot order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.slots.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_djb2_reference_values() {
        assert_eq!(hash(""), 5381);
        assert_eq!(hash("a"), 5381 * 33 + 97);
    }

    #[test]
    fn test_set_then_get() {
        let mut scope = Scope::new(16);
        scope.set("x", Value::Number(1.0)).unwrap();
        assert_eq!(scope.get("x"), Some(&Value::Number(1.0)));
        assert_eq!(scope.get("y"), None);
    }

    #[test]
    fn test_reassignment_replaces_value() {
        let mut scope = Scope::new(16);
        scope.set("x", Value::Number(1.0)).unwrap();
        scope.set("x", Value::Boolean(false)).unwrap();
        assert_eq!(scope.get("x"), Some(&Value::Boolean(false)));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_collisions_probe_to_next_slot() {
        // "a", "d" and "g" all hash to slot 1 of 3.
        assert_eq!(hash("a") % 3, 1);
        assert_eq!(hash("d") % 3, 1);
        assert_eq!(hash("g") % 3, 1);

        let mut scope = Scope::new(3);
        scope.set("a", Value::Number(1.0)).unwrap();
        scope.set("d", Value::Number(2.0)).unwrap();
        scope.set("g", Value::Number(3.0)).unwrap();

        assert_eq!(scope.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(scope.get("d"), Some(&Value::Number(2.0)));
        assert_eq!(scope.get("g"), Some(&Value::Number(3.0)));
        assert_eq!(scope.len(), 3);
    }

    #[test]
    fn test_full_table_hands_value_back() {
        let mut scope = Scope::new(1);
        scope.set("a", Value::Number(1.0)).unwrap();
        assert_eq!(
            scope.set("b", Value::Number(2.0)),
            Err(Value::Number(2.0))
        );
        // Existing names can still be overwritten.
        scope.set("a", Value::Number(5.0)).unwrap();
        assert_eq!(scope.get("a"), Some(&Value::Number(5.0)));
        assert_eq!(scope.get("b"), None);
        assert_eq!(scope.free_slots(), 0);
    }

    #[test]
    fn test_free_slots_counts_new_names_only() {
        let mut scope = Scope::new(3);
        assert_eq!(scope.free_slots(), 3);
        scope.set("a", Value::Number(1.0)).unwrap();
        scope.set("a", Value::Number(2.0)).unwrap();
        assert_eq!(scope.free_slots(), 2);
        assert!(scope.contains("a"));
        assert!(!scope.contains("b"));
        scope.clear();
        assert_eq!(scope.free_slots(), 3);
    }

    #[test]
    fn test_clear_empties_every_slot() {
        let mut scope = Scope::new(4);
        scope.set("a", Value::Number(1.0)).unwrap();
        scope.set("b", Value::Number(2.0)).unwrap();
        scope.clear();
        assert!(scope.is_empty());
        assert_eq!(scope.get("a"), None);
        assert_eq!(scope.variables().count(), 0);
    }
}
