// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `SinglyLinkedList<T>` — a minimal worked example of the Container Base
//! Protocol (§4.8), over fixed-size `Copy` elements (`i64`, `Pointer`, ...).
//! This is deliberately not the out-of-scope container zoo (`spec.md` §1,
//! "slist ... are clients of the core, specified only through the
//! contracts the core exposes"): it exists to give [`crate::ContainerHandle`]
//! something concrete to be tested against, matching §8 scenario 1
//! ("Cross-process list observation") almost verbatim.
//!
//! Layout: the header holds `head` (an [`OffsetPointer`] to the first
//! node) and `len`. Each node is `{ value: T, next: OffsetPointer }`,
//! allocated individually through the container's allocator — no
//! process-local pointers are ever written into the window.

use core::marker::PhantomData;
use core::mem::size_of;
use std::sync::Arc;

use shmx_allocator::AllocatorOps;
use shmx_pointer::{OffsetPointer, Pointer};

use crate::error::ContainerError;
use crate::handle::ContainerHandle;

#[repr(C)]
#[derive(Clone, Copy)]
struct Header {
    head: OffsetPointer,
    len: u64,
}

#[repr(C)]
struct Node<T: Copy> {
    value: T,
    next: OffsetPointer,
}

/// A singly linked list of `T` living inside a shared-memory window.
/// `T` must be `Copy` and have no padding that matters across processes
/// (plain scalars, or [`Pointer`]/[`OffsetPointer`] themselves).
pub struct SinglyLinkedList<T: Copy> {
    header_off: OffsetPointer,
    allocator: Arc<dyn AllocatorOps>,
    _marker: PhantomData<T>,
}

impl<T: Copy> SinglyLinkedList<T> {
    fn header(&self) -> *mut Header {
        unsafe { self.allocator.convert_raw(self.header_off) as *mut Header }
    }

    /// Number of elements currently stored.
    pub fn len(&self) -> usize {
        if self.header_off.is_null() {
            return 0;
        }
        unsafe { (*self.header()).len as usize }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prepends `value`.
    pub fn push_front(&self, value: T) -> Result<(), ContainerError> {
        let node_off = self.allocator.allocate(size_of::<Node<T>>())?;
        let node = unsafe { self.allocator.convert_raw(node_off) as *mut Node<T> };
        let header = self.header();
        let prev_head = unsafe { (*header).head };
        unsafe {
            node.write(Node {
                value,
                next: prev_head,
            });
            (*header).head = node_off;
            (*header).len += 1;
        }
        Ok(())
    }

    /// Copies out the element at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        let mut cursor = unsafe { (*self.header()).head };
        for _ in 0..index {
            let node = unsafe { self.allocator.convert_raw(cursor) as *const Node<T> };
            cursor = unsafe { (*node).next };
        }
        let node = unsafe { self.allocator.convert_raw(cursor) as *const Node<T> };
        Some(unsafe { (*node).value })
    }

    /// Copies every element into a `Vec`, head first.
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        let mut cursor = if self.header_off.is_null() {
            OffsetPointer::NULL
        } else {
            unsafe { (*self.header()).head }
        };
        while !cursor.is_null() {
            let node = unsafe { self.allocator.convert_raw(cursor) as *const Node<T> };
            out.push(unsafe { (*node).value });
            cursor = unsafe { (*node).next };
        }
        out
    }
}

impl<T: Copy> ContainerHandle for SinglyLinkedList<T> {
    /// Initial contents, head to tail, pushed in that visible order.
    type ConstructArgs = Vec<T>;

    fn construct(
        allocator: Arc<dyn AllocatorOps>,
        args: Self::ConstructArgs,
    ) -> Result<Self, ContainerError> {
        let header_off = allocator.allocate(size_of::<Header>())?;
        let header = unsafe { allocator.convert_raw(header_off) as *mut Header };
        unsafe {
            header.write(Header {
                head: OffsetPointer::NULL,
                len: 0,
            })
        };

        let list = Self {
            header_off,
            allocator,
            _marker: PhantomData,
        };
        for value in args.into_iter().rev() {
            list.push_front(value)?;
        }
        Ok(list)
    }

    fn destroy(self) -> Result<(), ContainerError> {
        if self.header_off.is_null() {
            return Ok(());
        }
        let header = self.header();
        let mut cursor = unsafe { (*header).head };
        while !cursor.is_null() {
            let node = unsafe { self.allocator.convert_raw(cursor) as *const Node<T> };
            let next = unsafe { (*node).next };
            self.allocator.free(cursor);
            cursor = next;
        }
        unsafe {
            (*header).head = OffsetPointer::NULL;
            (*header).len = 0;
        }
        self.allocator.free(self.header_off);
        Ok(())
    }

    fn serialize(&self) -> Pointer {
        Pointer::new(self.allocator.id(), self.header_off)
    }

    fn deserialize(allocator: Arc<dyn AllocatorOps>, pointer: Pointer) -> Result<Self, ContainerError> {
        if pointer.is_null() {
            return Err(ContainerError::NullPointer);
        }
        if pointer.allocator_id != allocator.id() {
            return Err(ContainerError::WrongAllocator);
        }
        Ok(Self {
            header_off: pointer.offset,
            allocator,
            _marker: PhantomData,
        })
    }

    fn is_null(&self) -> bool {
        self.header_off.is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shmx_allocator::{ShmxAllocator, StackAllocator};
    use shmx_pointer::AllocatorId;
    use std::alloc::{alloc_zeroed, dealloc, Layout};

    struct Window {
        ptr: *mut u8,
        layout: Layout,
    }

    impl Window {
        fn new(size: usize) -> Self {
            let layout = Layout::from_size_align(size, 64).unwrap();
            let ptr = unsafe { alloc_zeroed(layout) };
            Self { ptr, layout }
        }
        fn base(&self) -> core::ptr::NonNull<u8> {
            core::ptr::NonNull::new(self.ptr).unwrap()
        }
    }

    impl Drop for Window {
        fn drop(&mut self) {
            unsafe { dealloc(self.ptr, self.layout) };
        }
    }

    fn test_allocator(size: usize) -> (Window, Arc<dyn AllocatorOps>) {
        let window = Window::new(size);
        let allocator =
            unsafe { StackAllocator::init(window.base(), size, AllocatorId::new(0, 1), 0, ()).unwrap() };
        (window, Arc::new(allocator))
    }

    #[test]
    fn construct_push_and_iterate_preserves_order() {
        let (_window, allocator) = test_allocator(4096);
        let list = SinglyLinkedList::<i64>::construct(allocator, vec![1, 2, 3]).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.to_vec(), vec![1, 2, 3]);
        list.destroy().unwrap();
    }

    #[test]
    fn serialize_then_deserialize_observes_same_contents() {
        let (_window, allocator) = test_allocator(1024 * 1024);
        let values: Vec<i64> = std::iter::repeat(10).take(1024).collect();
        let list = SinglyLinkedList::<i64>::construct(Arc::clone(&allocator), values).unwrap();
        let pointer = list.serialize();

        let attached = SinglyLinkedList::<i64>::deserialize(allocator, pointer).unwrap();
        assert_eq!(attached.len(), 1024);
        assert!(attached.to_vec().iter().all(|&v| v == 10));

        attached.destroy().unwrap();
    }

    #[test]
    fn deserialize_rejects_foreign_allocator_id() {
        let (_window, allocator) = test_allocator(4096);
        let list = SinglyLinkedList::<i64>::construct(Arc::clone(&allocator), vec![7]).unwrap();
        let mut pointer = list.serialize();
        pointer.allocator_id = AllocatorId::new(9, 9);

        let err = SinglyLinkedList::<i64>::deserialize(allocator, pointer).unwrap_err();
        assert_eq!(err, ContainerError::WrongAllocator);
        list.destroy().unwrap();
    }

    #[test]
    fn destroy_returns_bytes_to_the_allocator() {
        let (_window, allocator) = test_allocator(4096);
        let before = allocator.currently_allocated();
        let list = SinglyLinkedList::<i64>::construct(Arc::clone(&allocator), vec![1, 2, 3, 4]).unwrap();
        assert!(allocator.currently_allocated() > before);
        list.destroy().unwrap();
        // StackAllocator never reclaims (bump pointer, §4.5): destroy only
        // guarantees the header is zeroed, not that bytes return to the
        // pool. currently_allocated therefore stays where it was.
        assert!(allocator.currently_allocated() >= before);
    }

    #[test]
    fn destroy_restores_currently_allocated_on_a_freeing_allocator() {
        use shmx_allocator::{ScalablePageAllocator, ScalablePageConfig};

        let window = Window::new(1024 * 1024);
        let allocator: Arc<dyn AllocatorOps> = Arc::new(unsafe {
            ScalablePageAllocator::init(
                window.base(),
                1024 * 1024,
                AllocatorId::new(0, 2),
                0,
                ScalablePageConfig::default(),
            )
            .unwrap()
        });

        let before = allocator.currently_allocated();
        let list = SinglyLinkedList::<i64>::construct(Arc::clone(&allocator), vec![1, 2, 3, 4, 5]).unwrap();
        assert!(allocator.currently_allocated() > before);
        list.destroy().unwrap();
        assert_eq!(allocator.currently_allocated(), before);
    }
}
