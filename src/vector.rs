use crate::raw::{AllocError, RawStorage};
use std::ptr;

/// Growable array of `T` built on a raw uninitialized storage block.
///
/// Slots `[0, len)` hold live values, slots `[len, capacity)` are untouched
/// bytes, and that split holds after every public operation returns - also
/// when element code panics, except on the in-place path of [`assign`] which
/// documents a weaker guarantee. Operations that acquire memory return
/// `Result` instead of aborting on allocation failure.
///
/// Element relocation during growth is a bitwise ownership transfer and
/// cannot fail, so growing operations either fully succeed or leave the
/// container exactly as it was.
///
/// [`assign`]: Vector::assign
pub struct Vector<T> where T: Sized {
    data: RawStorage<T>,
    len: usize,
}

/// Tracks a prefix of freshly constructed slots and drops them on unwind.
struct SlotGuard<T> {
    base: *mut T,
    initialized: usize,
}

impl<T> Drop for SlotGuard<T> {
    fn drop(&mut self) {
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.base, self.initialized)) };
    }
}

impl<T> Vector<T> where T: Sized {
    /// An empty array holding no storage.
    pub fn new() -> Vector<T> {
        Vector {
            data: RawStorage::empty(),
            len: 0,
        }
    }

    /// `n` default-constructed elements in an exact-size block.
    pub fn with_len(n: usize) -> Result<Vector<T>, AllocError> where T: Default {
        Vector::with_len_with(n, T::default)
    }

    /// `n` elements built by `f` in an exact-size block.
    ///
    /// If `f` panics partway, the elements built so far are dropped and the
    /// block is freed before the panic continues.
    pub fn with_len_with(n: usize, mut f: impl FnMut() -> T) -> Result<Vector<T>, AllocError> {
        let data: RawStorage<T> = RawStorage::with_capacity(n)?;
        let mut guard = SlotGuard { base: data.base(), initialized: 0 };
        while guard.initialized < n {
            unsafe { ptr::write(guard.base.add(guard.initialized), f()) };
            guard.initialized += 1;
        }
        std::mem::forget(guard);
        Ok(Vector { data, len: n })
    }

    /// Collects an iterator that knows its length into an exact-size block.
    ///
    /// A panicking iterator gets the same cleanup as [`with_len_with`].
    ///
    /// [`with_len_with`]: Vector::with_len_with
    pub fn from_exact_iter(iter: impl ExactSizeIterator<Item=T>) -> Result<Vector<T>, AllocError> {
        let n = iter.len();
        let data: RawStorage<T> = RawStorage::with_capacity(n)?;
        let mut guard = SlotGuard { base: data.base(), initialized: 0 };
        for item in iter.take(n) {
            unsafe { ptr::write(guard.base.add(guard.initialized), item) };
            guard.initialized += 1;
        }
        let len = guard.initialized;
        std::mem::forget(guard);
        Ok(Vector { data, len })
    }

    /// Clones every live element into an exact-size block.
    ///
    /// If a clone panics, the clones made so far are dropped and the block is
    /// freed; `self` is never touched.
    pub fn try_clone(&self) -> Result<Vector<T>, AllocError> where T: Clone {
        Vector::from_exact_iter(self.iter().cloned())
    }

    /// Moves the contents out, leaving an empty array holding no storage.
    pub fn take(&mut self) -> Vector<T> {
        std::mem::replace(self, Vector::new())
    }

    /// Copy assignment from `rhs`.
    ///
    /// When `rhs` does not fit into the current block, a full clone is built
    /// first and swapped in, so a panicking clone leaves `self` untouched.
    /// When it fits, storage is reused in place: the shared prefix is
    /// assigned element by element, then the excess tail is dropped or the
    /// missing tail is clone-appended. The in-place path is not strongly
    /// panic-safe: a panic leaves a valid array whose prefix was already
    /// assigned and whose length counts only completed elements.
    pub fn assign(&mut self, rhs: &Vector<T>) -> Result<(), AllocError> where T: Clone {
        if rhs.len > self.data.capacity() {
            let mut copy = rhs.try_clone()?;
            self.swap_with(&mut copy);
        } else {
            let shared = self.len.min(rhs.len);
            for (slot, value) in self.as_mut_slice()[..shared].iter_mut().zip(rhs.as_slice()) {
                slot.clone_from(value);
            }
            if rhs.len < self.len {
                self.truncate(rhs.len);
            } else {
                while self.len < rhs.len {
                    let value = rhs.as_slice()[self.len].clone();
                    unsafe { ptr::write(self.data.slot(self.len), value) };
                    self.len += 1;
                }
            }
        }
        Ok(())
    }

    /// Number of live elements.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of slots the current block can hold.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Grows the block to exactly `new_capacity`; a no-op unless larger than
    /// the current capacity. Live elements relocate bitwise, so the length and
    /// values never change and a failed allocation leaves everything as it was.
    pub fn reserve(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        if new_capacity <= self.data.capacity() {
            return Ok(());
        }
        trace!("grow block from {} to {} slots", self.data.capacity(), new_capacity);
        let mut new_data = RawStorage::with_capacity(new_capacity)?;
        unsafe { ptr::copy_nonoverlapping(self.data.base(), new_data.base(), self.len) };
        self.data.swap(&mut new_data);
        // the old block goes out of scope holding bytes only, the values
        // already moved into the new one
        Ok(())
    }

    /// Sets the length to `new_len`, default-constructing new trailing
    /// elements or dropping excess ones.
    pub fn resize(&mut self, new_len: usize) -> Result<(), AllocError> where T: Default {
        self.resize_with(new_len, T::default)
    }

    /// Sets the length to `new_len`, building new trailing elements with `f`
    /// or dropping excess ones.
    ///
    /// If `f` panics partway through growth, the elements built by this call
    /// are dropped and the length stays at its pre-call value.
    pub fn resize_with(&mut self, new_len: usize, mut f: impl FnMut() -> T) -> Result<(), AllocError> {
        if new_len < self.len {
            self.truncate(new_len);
        } else if new_len > self.len {
            self.reserve(new_len)?;
            let mut guard = SlotGuard {
                base: unsafe { self.data.slot(self.len) },
                initialized: 0,
            };
            while self.len + guard.initialized < new_len {
                unsafe { ptr::write(guard.base.add(guard.initialized), f()) };
                guard.initialized += 1;
            }
            std::mem::forget(guard);
            self.len = new_len;
        }
        Ok(())
    }

    /// Drops every element past `new_len`; a no-op unless shorter than the
    /// current length.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail = self.len - new_len;
        // the length goes down before the drops run so a panicking `Drop`
        // cannot expose a dead tail
        self.len = new_len;
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.data.slot(new_len), tail)) };
    }

    /// Appends a value. Forwards to [`push_with`].
    ///
    /// [`push_with`]: Vector::push_with
    pub fn push(&mut self, value: T) -> Result<(), AllocError> {
        self.push_with(move || value).map(|_| ())
    }

    /// Appends an element constructed by `f` directly in its final slot and
    /// returns a reference to it.
    ///
    /// With a full block a fresh one of `max(1, 2 * len)` slots is acquired
    /// and `f` runs before any migration, so a panicking constructor frees
    /// only the fresh bytes and the array is unchanged. The length grows
    /// only after the element exists.
    pub fn push_with(&mut self, f: impl FnOnce() -> T) -> Result<&mut T, AllocError> {
        let index = self.len;
        if index == self.data.capacity() {
            let mut new_data = RawStorage::with_capacity(self.grown_capacity())?;
            unsafe {
                ptr::write(new_data.slot(index), f());
                ptr::copy_nonoverlapping(self.data.base(), new_data.base(), index);
            }
            self.data.swap(&mut new_data);
        } else {
            unsafe { ptr::write(self.data.slot(index), f()) };
        }
        self.len = index + 1;
        Ok(unsafe { self.data.get_unchecked_mut(index) })
    }

    /// Inserts a value at `index <= len`, shifting later elements one slot
    /// towards the back. Forwards to [`insert_with`].
    ///
    /// [`insert_with`]: Vector::insert_with
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), AllocError> {
        self.insert_with(index, move || value).map(|_| ())
    }

    /// Inserts an element constructed by `f` at `index <= len` and returns a
    /// reference to it.
    ///
    /// With a full block, `f` runs into the target slot of the fresh block
    /// before the before- and after-ranges relocate around it. In place, `f`
    /// runs before any shifting. Either way a panicking constructor leaves
    /// the array unchanged.
    pub fn insert_with(&mut self, index: usize, f: impl FnOnce() -> T) -> Result<&mut T, AllocError> {
        assert!(index <= self.len, "insert index {} out of range for length {}", index, self.len);
        if self.len == self.data.capacity() {
            let mut new_data = RawStorage::with_capacity(self.grown_capacity())?;
            unsafe {
                ptr::write(new_data.slot(index), f());
                ptr::copy_nonoverlapping(self.data.base(), new_data.base(), index);
                ptr::copy_nonoverlapping(self.data.slot(index), new_data.slot(index + 1), self.len - index);
            }
            self.data.swap(&mut new_data);
        } else {
            let value = f();
            unsafe {
                let p = self.data.slot(index);
                ptr::copy(p, p.add(1), self.len - index);
                ptr::write(p, value);
            }
        }
        self.len += 1;
        Ok(unsafe { self.data.get_unchecked_mut(index) })
    }

    /// Removes and returns the element at `index < len`, shifting later
    /// elements one slot towards the front. After `remove(i)` the element
    /// that followed the removed one lives at `i`. Dropping the returned
    /// value gives plain erasure.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(index < self.len, "remove index {} out of range for length {}", index, self.len);
        unsafe {
            let p = self.data.slot(index);
            let value = ptr::read(p);
            ptr::copy(p.add(1), p, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Removes and returns the last element; `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { ptr::read(self.data.slot(self.len)) })
    }

    /// Exchanges contents with `other` in constant time.
    #[inline(always)]
    pub fn swap_with(&mut self, other: &mut Vector<T>) {
        self.data.swap(&mut other.data);
        std::mem::swap(&mut self.len, &mut other.len);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// The live elements as a slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.data.base(), self.len) }
    }

    /// The live elements as a mutable slice.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.data.base(), self.len) }
    }

    /// Iterates over the live elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterates over the live elements mutably.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    fn grown_capacity(&self) -> usize {
        if self.len == 0 { 1 } else { self.len * 2 }
    }
}

impl<T> Drop for Vector<T> {
    fn drop(&mut self) {
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.data.base(), self.len)) };
        // the block frees its own bytes
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Vector<T> {
        Vector::new()
    }
}

impl<T> std::ops::Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        assert!(index < self.len, "index {} out of range for length {}", index, self.len);
        unsafe { self.data.get_unchecked(index) }
    }
}

impl<T> std::ops::IndexMut<usize> for Vector<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(index < self.len, "index {} out of range for length {}", index, self.len);
        unsafe { self.data.get_unchecked_mut(index) }
    }
}

impl<T> std::fmt::Debug for Vector<T> where T: std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for i in self.iter() {
            list.entry(i);
        }
        list.finish()
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Vector<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
