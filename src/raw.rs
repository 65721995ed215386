use std::alloc::{alloc, dealloc, Layout};
use std::fmt::Display;
use std::ptr::NonNull;

/// Error returned by operations that acquire storage.
#[derive(Debug)]
pub enum AllocError {
    /// The requested capacity does not form a valid allocation layout.
    CapacityOverflow,
    /// The allocator could not provide a block of the requested size.
    OutOfMemory { size: usize },
}

impl Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocError::CapacityOverflow => Display::fmt("Requested capacity overflows the allocation layout", f),
            AllocError::OutOfMemory { size } => write!(f, "Allocator could not provide a block of {} bytes", size),
        }
    }
}

impl std::error::Error for AllocError {}

/// Exclusive owner of one uninitialized memory block sized for `capacity` elements of `T`.
///
/// This type only allocates and frees bytes. It does not track which slots hold
/// live values, so dropping it never drops elements - callers that placed values
/// into the block must destroy them first. There is no `Clone` impl: the block
/// cannot know how to duplicate whatever state lives inside it, so copying is a
/// compile-time error. Moving transfers the block and leaves nothing behind.
pub struct RawStorage<T> where T: Sized {
    ptr: NonNull<T>,
    cap: usize,
}

impl<T> RawStorage<T> where T: Sized {
    /// A block that owns no memory.
    pub fn empty() -> RawStorage<T> {
        RawStorage {
            ptr: NonNull::dangling(),
            cap: 0,
        }
    }

    /// Allocates a block for exactly `capacity` elements.
    ///
    /// Zero capacity and zero-sized element types acquire no memory; for
    /// zero-sized types the requested capacity is still recorded. On failure
    /// nothing is leaked.
    pub fn with_capacity(capacity: usize) -> Result<RawStorage<T>, AllocError> {
        if capacity == 0 || std::mem::size_of::<T>() == 0 {
            return Ok(RawStorage {
                ptr: NonNull::dangling(),
                cap: capacity,
            });
        }
        let layout = Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow)?;
        trace!("alloc block of size {}", layout.size());
        match NonNull::new(unsafe { alloc(layout) } as *mut T) {
            Some(ptr) => Ok(RawStorage { ptr, cap: capacity }),
            None => Err(AllocError::OutOfMemory { size: layout.size() }),
        }
    }

    /// Start of the block. Dangling when no memory is held.
    #[inline(always)]
    pub fn base(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Address of the slot at `offset`.
    ///
    /// One past the end (`offset == capacity`) is allowed as a limit and must
    /// not be dereferenced. Anything further is a caller bug.
    #[inline(always)]
    pub unsafe fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(offset <= self.cap, "slot offset {} exceeds capacity {}", offset, self.cap);
        self.ptr.as_ptr().add(offset)
    }

    /// Reference to the slot at `index < capacity`. The caller must have
    /// initialized the slot.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.cap, "index {} exceeds capacity {}", index, self.cap);
        &*self.ptr.as_ptr().add(index)
    }

    /// Mutable reference to the slot at `index < capacity`. The caller must
    /// have initialized the slot.
    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.cap, "index {} exceeds capacity {}", index, self.cap);
        &mut *self.ptr.as_ptr().add(index)
    }

    /// Exchanges blocks with `other` in constant time.
    #[inline(always)]
    pub fn swap(&mut self, other: &mut RawStorage<T>) {
        std::mem::swap(&mut self.ptr, &mut other.ptr);
        std::mem::swap(&mut self.cap, &mut other.cap);
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.cap
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        if self.cap != 0 && std::mem::size_of::<T>() != 0 {
            // the layout was computable when this block was allocated
            let layout = Layout::array::<T>(self.cap).expect("layout of owned block");
            trace!("free block of size {}", layout.size());
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
    }
}
