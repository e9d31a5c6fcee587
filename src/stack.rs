use crate::error::StackError;

/// A stack with a capacity fixed up front that can pop several values at once.
///
/// Depth never exceeds the capacity given to [`ArrayStack::new`]; a push past it
/// or a pop below depth zero is reported as a [`StackError`] and leaves the
/// stack untouched.
#[derive(Clone, Debug)]
pub struct ArrayStack<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T: Clone> ArrayStack<T> {
    pub fn new(capacity: usize) -> Self {
        ArrayStack {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn depth(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        if self.items.len() >= self.capacity {
            return Err(StackError::Overflow {
                capacity: self.capacity,
            });
        }
        self.items.push(value);
        Ok(())
    }

    /// Returns a clone of the top value without removing it.
    pub fn peek(&self) -> Result<T, StackError> {
        self.items.last().cloned().ok_or(StackError::Underflow {
            requested: 1,
            depth: 0,
        })
    }

    pub fn pop(&mut self) -> Result<T, StackError> {
        self.items.pop().ok_or(StackError::Underflow {
            requested: 1,
            depth: 0,
        })
    }

    /// Removes the top `count` values and returns them bottom-to-top, i.e. in
    /// the order they were pushed.
    pub fn pop_many(&mut self, count: usize) -> Result<Vec<T>, StackError> {
        let depth = self.items.len();
        if count > depth {
            return Err(StackError::Underflow {
                requested: count,
                depth,
            });
        }
        Ok(self.items.split_off(depth - count))
    }
}
