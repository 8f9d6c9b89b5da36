//! Host surface and resize notifications
//!
//! The host reports the canvas display size and device pixel ratio through
//! [`Surface`] and announces viewport changes through [`ResizeEvents`].
//! Everything here is single-threaded.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::{Length, PadConfig};

/// Display metrics of the element hosting the canvas
pub trait Surface {
    /// Displayed canvas size in logical pixels
    fn display_size(&self) -> (f32, f32);

    /// Device pixel ratio, if the host knows it
    fn device_pixel_ratio(&self) -> Option<f64>;
}

/// Backing store ratio: the device pixel ratio, never below 1
pub fn effective_ratio(ratio: Option<f64>) -> f32 {
    ratio
        .filter(|r| r.is_finite())
        .unwrap_or(1.0)
        .max(1.0) as f32
}

/// Headless surface: a container sized by CSS lengths inside a viewport
#[derive(Debug)]
pub struct ContainerSurface {
    width: Length,
    height: Length,
    viewport: Cell<(f32, f32)>,
    ratio: Cell<Option<f64>>,
}

impl ContainerSurface {
    pub fn new(config: &PadConfig, viewport: (f32, f32), ratio: Option<f64>) -> Self {
        Self {
            width: config.width,
            height: config.height,
            viewport: Cell::new(viewport),
            ratio: Cell::new(ratio),
        }
    }

    /// Surface whose display size is exactly `width` x `height`
    pub fn fixed(width: f32, height: f32, ratio: Option<f64>) -> Self {
        Self {
            width: Length::Px(width),
            height: Length::Px(height),
            viewport: Cell::new((width, height)),
            ratio: Cell::new(ratio),
        }
    }

    pub fn set_viewport(&self, width: f32, height: f32) {
        self.viewport.set((width, height));
    }

    pub fn set_container(&mut self, width: Length, height: Length) {
        self.width = width;
        self.height = height;
    }

    pub fn set_device_pixel_ratio(&self, ratio: Option<f64>) {
        self.ratio.set(ratio);
    }
}

impl Surface for ContainerSurface {
    fn display_size(&self) -> (f32, f32) {
        let (vw, vh) = self.viewport.get();
        (
            self.width.resolve(vw).max(0.0),
            self.height.resolve(vh).max(0.0),
        )
    }

    fn device_pixel_ratio(&self) -> Option<f64> {
        self.ratio.get()
    }
}

/// Identifier of a registered resize listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Resize event source, the equivalent of a window's `resize` event
#[derive(Debug, Default)]
pub struct ResizeEvents {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, Rc<Cell<bool>>)>>,
}

impl ResizeEvents {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Register a listener; it stays registered until the handle is dropped
    pub fn subscribe(self: &Rc<Self>) -> ResizeSubscription {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let pending = Rc::new(Cell::new(false));
        self.listeners.borrow_mut().push((id, pending.clone()));
        log::debug!("Resize listener {:?} registered", id);
        ResizeSubscription {
            id,
            pending,
            events: Rc::downgrade(self),
        }
    }

    /// Notify every listener; returns how many were notified
    pub fn emit(&self) -> usize {
        let listeners = self.listeners.borrow();
        for (_, pending) in listeners.iter() {
            pending.set(true);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        before != listeners.len()
    }
}

/// Registration handle; dropping it removes the listener
#[derive(Debug)]
pub struct ResizeSubscription {
    id: ListenerId,
    pending: Rc<Cell<bool>>,
    events: Weak<ResizeEvents>,
}

impl ResizeSubscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Consume a pending notification
    pub fn take_pending(&self) -> bool {
        self.pending.replace(false)
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        if let Some(events) = self.events.upgrade()
            && events.unsubscribe(self.id)
        {
            log::debug!("Resize listener {:?} removed", self.id);
        }
    }
}
