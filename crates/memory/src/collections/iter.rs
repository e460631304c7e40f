//! Owning iterator for [`DynArray`]

use core::fmt;
use core::iter::FusedIterator;
use core::mem::needs_drop;
use core::ptr;
use core::slice;

use super::dyn_array::DynArray;
use super::raw_buffer::RawBuffer;
use crate::allocator::ElementAllocator;

/// Iterator that moves values out of a [`DynArray`]
///
/// Values not yielded are dropped together with the buffer.
pub struct IntoIter<T, A: ElementAllocator<T>> {
    buf: RawBuffer<T, A>,
    /// Live values are `[head, tail)`
    head: usize,
    tail: usize,
}

impl<T, A: ElementAllocator<T>> IntoIter<T, A> {
    /// Values that have not been yielded yet
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [head, tail) is initialised.
        unsafe { slice::from_raw_parts(self.buf.ptr().add(self.head), self.tail - self.head) }
    }

    /// Allocator backing the remaining values
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }
}

impl<T, A: ElementAllocator<T>> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        let index = self.head;
        self.head += 1;
        // SAFETY: index was inside [head, tail) and is now outside it.
        Some(unsafe { ptr::read(self.buf.ptr().add(index)) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tail - self.head;
        (remaining, Some(remaining))
    }
}

impl<T, A: ElementAllocator<T>> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        // SAFETY: the old last live index is initialised and now outside the range.
        Some(unsafe { ptr::read(self.buf.ptr().add(self.tail)) })
    }
}

impl<T, A: ElementAllocator<T>> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: ElementAllocator<T>> FusedIterator for IntoIter<T, A> {}

impl<T, A: ElementAllocator<T>> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        if needs_drop::<T>() {
            let remaining = ptr::slice_from_raw_parts_mut(
                // SAFETY: head <= tail <= capacity.
                unsafe { self.buf.ptr().add(self.head) },
                self.tail - self.head,
            );
            self.head = self.tail;
            // SAFETY: the values were never yielded and are dropped once.
            unsafe { ptr::drop_in_place(remaining) };
        }
    }
}

impl<T: fmt::Debug, A: ElementAllocator<T>> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A: ElementAllocator<T>> IntoIterator for DynArray<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        let (buf, len) = self.into_raw_parts();
        IntoIter {
            buf,
            head: 0,
            tail: len,
        }
    }
}
