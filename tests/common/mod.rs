#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use frame_relay::{FrameError, FrameLayout, FrameResult, TextureHost, TextureId};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

type Hook = Box<dyn FnMut(TextureId) + Send>;

/// Host that records every registration and notification.
#[derive(Default)]
pub struct MockHost {
    next_id: AtomicI64,
    refuse: AtomicBool,
    notifications: AtomicUsize,
    registered: Mutex<Vec<(TextureId, FrameLayout)>>,
    unregistered: Mutex<Vec<TextureId>>,
    on_frame_available: Mutex<Option<Hook>>,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        })
    }

    pub fn refusing() -> Arc<Self> {
        let host = Self::new();
        host.refuse.store(true, Ordering::SeqCst);
        host
    }

    pub fn notifications(&self) -> usize {
        self.notifications.load(Ordering::SeqCst)
    }

    pub fn registered(&self) -> Vec<(TextureId, FrameLayout)> {
        self.registered.lock().unwrap().clone()
    }

    pub fn unregistered(&self) -> Vec<TextureId> {
        self.unregistered.lock().unwrap().clone()
    }

    pub fn on_frame_available(&self, hook: impl FnMut(TextureId) + Send + 'static) {
        *self.on_frame_available.lock().unwrap() = Some(Box::new(hook));
    }

    /// Waits until at least `count` notifications arrived.
    pub fn wait_for_notifications(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.notifications() < count {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }
}

impl TextureHost for MockHost {
    fn register_texture(&self, layout: &FrameLayout) -> FrameResult<TextureId> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(FrameError::registration("mock host refuses"));
        }
        let id = TextureId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.registered.lock().unwrap().push((id, *layout));
        Ok(id)
    }

    fn unregister_texture(&self, id: TextureId) {
        self.unregistered.lock().unwrap().push(id);
    }

    fn frame_available(&self, id: TextureId) {
        self.notifications.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = self.on_frame_available.lock().unwrap().as_mut() {
            hook(id);
        }
    }
}
