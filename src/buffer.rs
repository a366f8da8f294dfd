use serde::{Deserialize, Serialize};

/// Append-only buffer whose capacity doubles whenever a push would overflow it.
///
/// Items are only ever addressed by index, so growth never invalidates a
/// reference held elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrowBuffer<T> {
    items: Vec<T>,
}

impl<T> GrowBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        GrowBuffer {
            items: Vec::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.items.capacity() {
            let grow_by = self.items.capacity().max(1);
            self.items.reserve_exact(grow_by);
            log::trace!("buffer grown to {} slots", self.items.capacity());
        }
        self.items.push(item);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> From<Vec<T>> for GrowBuffer<T> {
    fn from(items: Vec<T>) -> Self {
        GrowBuffer { items }
    }
}

impl<'a, T> IntoIterator for &'a GrowBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_doubles() {
        let mut buffer = GrowBuffer::with_capacity(2);
        assert!(buffer.capacity() >= 2);

        let start = buffer.capacity();
        for i in 0..start {
            buffer.push(i);
        }
        assert_eq!(buffer.capacity(), start);

        buffer.push(start);
        assert!(buffer.capacity() >= start * 2);
        assert_eq!(buffer.len(), start + 1);
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let mut buffer = GrowBuffer::with_capacity(1);
        for i in 0..100 {
            buffer.push(i);
            assert!(buffer.len() <= buffer.capacity());
        }
        assert_eq!(buffer.get(42), Some(&42));
        assert_eq!(buffer.last(), Some(&99));
    }

    #[test]
    fn test_zero_capacity_still_grows() {
        let mut buffer = GrowBuffer::with_capacity(0);
        buffer.push('a');
        buffer.push('b');
        assert_eq!(buffer.as_slice(), &['a', 'b']);
    }
}
