//! An owning byte string that makes the cost of construction visible.
//!
//! [ByteString] owns one heap buffer and its length, nothing else. Every way
//! of building one has a different cost:
//!
//! - [ByteString::from_bytes] allocates a fresh buffer and copies the input
//!   in. One allocation.
//! - [Clone] duplicates the buffer into independent storage. One allocation,
//!   and the source is untouched.
//! - A plain Rust move transfers ownership of the buffer. No allocation, and
//!   the compiler makes the source unusable afterwards.
//! - [ByteString::take] transfers ownership out of a source that has to stay
//!   nominally alive. No allocation; the source is left as a defined empty
//!   value, so dropping it later releases nothing.
//!
//! Dropping a [ByteString] releases its buffer exactly once, with the same
//! layout it was allocated with. Each operation reports what it did to
//! [crate::audit] and emits a DEBUG event, so the difference between copying
//! and moving shows up in the logs and in the tallies.

use std::{
    alloc::{self, Layout},
    fmt, mem, ptr, slice,
    str::{self, Utf8Error},
};

use thiserror::Error;

use crate::audit;

/// An exclusively owned heap buffer of bytes. A null `data` pointer marks the
/// empty state and always goes with `size == 0`; otherwise `data` points to
/// exactly `size` bytes allocated by this instance and shared with no one.
pub struct ByteString {
    data: *mut u8,
    size: usize,
}

unsafe impl Send for ByteString {}
unsafe impl Sync for ByteString {}

/// The buffer holds bytes that do not form UTF-8 text.
#[derive(Debug, Error)]
#[error("The buffer content is not valid UTF-8: {0}")]
pub struct NotUtf8(#[from] Utf8Error);

/// Allocation choke point. The global allocator forbids zero size layouts, so
/// empty requests allocate nothing and yield the null pointer that marks the
/// empty state. Allocation failure is fatal.
fn allocate(size: usize) -> *mut u8 {
    if size == 0 {
        return ptr::null_mut();
    }
    let layout = Layout::array::<u8>(size).expect("Buffer size overflows a layout");
    // SAFETY: The layout has non-zero size, checked above.
    let data = unsafe { alloc::alloc(layout) };
    if data.is_null() {
        alloc::handle_alloc_error(layout);
    }
    audit::record_allocation(size);
    data
}

/// Release choke point. Uses the identical layout as [allocate]; releasing
/// the null pointer is a no-op.
fn release(data: *mut u8, size: usize) {
    if data.is_null() {
        return;
    }
    let layout = Layout::array::<u8>(size).expect("Buffer size overflows a layout");
    // SAFETY: The buffer came out of [allocate] with this exact layout.
    unsafe { alloc::dealloc(data, layout) };
    audit::record_release(size);
}

impl Default for ByteString {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteString {
    /// An empty string. Performs no allocation.
    pub fn new() -> Self {
        Self {
            data: ptr::null_mut(),
            size: 0,
        }
    }

    /// Allocates a buffer sized to the input and copies every byte in. The
    /// content is not validated. Empty input yields the empty state without
    /// touching the allocator.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let size = bytes.len();
        let data = allocate(size);
        if !data.is_null() {
            // SAFETY: Both regions are exactly `size` bytes and cannot
            // overlap as the destination was just allocated.
            unsafe { data.copy_from_nonoverlapping(bytes.as_ptr(), size) };
        }
        tracing::debug!("Created ({size} bytes)");
        Self { data, size }
    }

    /// Takes over this string's buffer, leaving it empty. The transfer is a
    /// pointer swap: no allocation, no byte copy, and dropping the source
    /// afterwards releases nothing.
    ///
    /// This is the escape hatch for sources that must stay nominally alive.
    /// When the source is dead after the call site anyway, pass it by value
    /// instead and let the compiler rule out any further use.
    pub fn take(&mut self) -> Self {
        let taken = mem::replace(self, Self::new());
        audit::record_transfer();
        tracing::debug!("Moved ({} bytes)", taken.size);
        taken
    }

    /// The content in order. Yields `b""` for the empty state.
    pub fn as_bytes(&self) -> &[u8] {
        if self.data.is_null() {
            return &[];
        }
        // SAFETY: `data` points to exactly `size` bytes owned by this
        // instance, and the borrow keeps the instance alive.
        unsafe { slice::from_raw_parts(self.data, self.size) }
    }

    /// The content as strict UTF-8 text.
    pub fn as_str(&self) -> Result<&str, NotUtf8> {
        Ok(str::from_utf8(self.as_bytes())?)
    }

    pub const fn len(&self) -> usize {
        self.size
    }

    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl Clone for ByteString {
    /// Duplicates the content into independent storage. One allocation and an
    /// O(size) copy; the source is untouched.
    fn clone(&self) -> Self {
        let data = allocate(self.size);
        if !data.is_null() {
            // SAFETY: Both buffers are exactly `size` bytes and cannot
            // overlap as the destination was just allocated.
            unsafe { data.copy_from_nonoverlapping(self.data, self.size) };
        }
        audit::record_duplication();
        tracing::debug!("Copied ({} bytes)", self.size);
        Self {
            data,
            size: self.size,
        }
    }
}

impl Drop for ByteString {
    fn drop(&mut self) {
        if self.is_empty() {
            tracing::debug!("Destroyed (no buffer held)");
        } else {
            tracing::debug!("Destroyed (released {} bytes)", self.size);
        }
        release(self.data, self.size);
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::ops::Deref for ByteString {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl From<&[u8]> for ByteString {
    fn from(value: &[u8]) -> Self {
        Self::from_bytes(value)
    }
}

impl From<&str> for ByteString {
    fn from(value: &str) -> Self {
        Self::from_bytes(value.as_bytes())
    }
}

impl PartialEq for ByteString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ByteString {}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_bytes(), f)
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&String::from_utf8_lossy(self.as_bytes()), f)
    }
}
