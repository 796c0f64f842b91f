//! Panic-framebuffer registry
//!
//! Display drivers register an entry early, while allocation is still safe,
//! and fill in the mapped surface later (and again on every mode change).
//! When the process crashes the registry renders the log into every entry
//! that currently has a mapping.
//!
//! Entries live in an append-only linked list: registration links a new node
//! with a compare-and-swap, and the panic path walks the list without taking
//! any lock. Nodes are only freed when the registry itself is dropped.
//! Each entry's geometry sits behind its own mutex; the panic path only ever
//! `try_lock`s it and skips entries that are mid-update.

use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use crate::app::Config;
use crate::core::LogState;
use crate::renderer::{Geometry, PixelFormat, Surface};

/// Mapped surface of an entry
#[derive(Clone, Copy)]
struct Mapping {
    map: *mut u8,
    geometry: Geometry,
}

// The pointer is only dereferenced through `Surface::from_raw`, under the
// contract of `PanicHandle::update`.
unsafe impl Send for Mapping {}

impl Mapping {
    const UNMAPPED: Mapping = Mapping {
        map: ptr::null_mut(),
        geometry: Geometry {
            width: 0,
            height: 0,
            stride: 0,
            cpp: 0,
            format: PixelFormat::from_raw(0),
            columns: 0,
        },
    };
}

struct PanicEntry {
    id: usize,
    /// Column count forced onto every update
    columns: usize,
    mapping: Mutex<Mapping>,
}

struct Node {
    entry: Arc<PanicEntry>,
    next: AtomicPtr<Node>,
}

/// Registry of surfaces to render into on a crash
pub struct PanicRegistry {
    head: AtomicPtr<Node>,
    len: AtomicUsize,
    columns: usize,
}

impl PanicRegistry {
    /// Create an empty registry whose entries render `columns` columns
    pub fn new(columns: usize) -> Self {
        Self {
            head: AtomicPtr::new(ptr::null_mut()),
            len: AtomicUsize::new(0),
            columns: columns.max(1),
        }
    }

    /// Create an empty registry using the configured panic column count
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.panic_columns)
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a new, unmapped entry
    pub fn register(&self) -> PanicHandle {
        let id = self.len.fetch_add(1, Ordering::AcqRel);
        let entry = Arc::new(PanicEntry {
            id,
            columns: self.columns,
            mapping: Mutex::new(Mapping::UNMAPPED),
        });
        let node = Box::into_raw(Box::new(Node {
            entry: Arc::clone(&entry),
            next: AtomicPtr::new(ptr::null_mut()),
        }));

        // Append at the tail so entries render in registration order
        let mut link = &self.head;
        loop {
            match link.compare_exchange(
                ptr::null_mut(),
                node,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(next) => {
                    // SAFETY: linked nodes stay allocated until the registry
                    // is dropped, which cannot happen while `&self` lives.
                    link = unsafe { &(*next).next };
                }
            }
        }

        log::info!("Registered panic framebuffer #{}", id);
        PanicHandle { entry }
    }

    /// Render the log into every mapped entry.
    ///
    /// Runs on the crash path: takes no blocking lock, allocates nothing,
    /// and skips entries that are unmapped, invalid, or being updated.
    /// Returns the number of surfaces drawn.
    pub fn notify_panic(&self, state: &LogState) -> usize {
        let mut drawn = 0;
        let mut node = self.head.load(Ordering::Acquire);

        while !node.is_null() {
            // SAFETY: see `register`
            let current = unsafe { &*node };
            if current.entry.render(state) {
                drawn += 1;
            }
            node = current.next.load(Ordering::Acquire);
        }
        drawn
    }
}

impl Default for PanicRegistry {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Drop for PanicRegistry {
    fn drop(&mut self) {
        let mut node = *self.head.get_mut();
        while !node.is_null() {
            // SAFETY: every node came from Box::into_raw in `register` and
            // `&mut self` rules out concurrent walkers.
            let mut boxed = unsafe { Box::from_raw(node) };
            node = *boxed.next.get_mut();
        }
    }
}

impl PanicEntry {
    fn render(&self, state: &LogState) -> bool {
        let guard = match self.mapping.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return false,
        };
        if guard.map.is_null() {
            return false;
        }

        // SAFETY: the owner of the handle promised in `update` that the
        // mapping stays valid until it is replaced or unmapped, and we hold
        // the entry lock, so neither can happen meanwhile.
        match unsafe { Surface::from_raw(guard.map, guard.geometry) } {
            Ok(mut surface) => {
                state.draw(&mut surface);
                true
            }
            Err(_) => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Mapping> {
        self.mapping.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owner's handle to one registry entry
#[derive(Clone)]
pub struct PanicHandle {
    entry: Arc<PanicEntry>,
}

impl PanicHandle {
    /// Registration index
    pub fn id(&self) -> usize {
        self.entry.id
    }

    /// Point the entry at a mapped surface.
    ///
    /// The column count of `geometry` is replaced by the registry's.
    ///
    /// # Safety
    ///
    /// `map` must stay valid for writes of the geometry's full extent until
    /// the next `update` or `unmap` on this entry (or until the registry is
    /// dropped), and the memory may be overwritten at any time in between.
    pub unsafe fn update(&self, map: *mut u8, geometry: Geometry) {
        let geometry = Geometry {
            columns: self.entry.columns,
            ..geometry
        };
        *self.entry.lock() = Mapping { map, geometry };

        log::info!(
            "Panic framebuffer #{}: {}x{} {}",
            self.entry.id,
            geometry.width,
            geometry.height,
            geometry.format
        );
    }

    /// Detach the surface; crashes skip this entry afterwards
    pub fn unmap(&self) {
        *self.entry.lock() = Mapping::UNMAPPED;
    }

    pub fn is_mapped(&self) -> bool {
        !self.entry.lock().map.is_null()
    }

    /// Current geometry, `None` while unmapped
    pub fn geometry(&self) -> Option<Geometry> {
        let mapping = *self.entry.lock();
        (!mapping.map.is_null()).then_some(mapping.geometry)
    }
}
