use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// One recurring `requestAnimationFrame` callback.
///
/// The closure is created once and re-registered after every frame while the
/// loop runs; `stop` cancels the pending request. Dropping the loop stops it
/// and releases the closure.
pub struct FrameLoop {
    /// Pending request id; `None` while stopped.
    handle: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameLoop {
    /// Wrap `on_frame`, which receives the `requestAnimationFrame` timestamp in ms.
    /// The loop starts stopped.
    pub fn new(mut on_frame: impl FnMut(f64) + 'static) -> Self {
        let handle = Rc::new(Cell::new(None));
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

        let next_handle = handle.clone();
        let next_callback = Rc::downgrade(&callback);
        let closure = Closure::wrap(Box::new(move |now: f64| {
            let current = next_handle.get();
            on_frame(now);
            // Stopped or restarted from inside the frame: the new state owns scheduling.
            if current.is_none() || next_handle.get() != current {
                return;
            }
            let scheduled = next_callback.upgrade().and_then(|cell| {
                let callback = cell.borrow();
                callback.as_ref().map(request_frame)
            });
            match scheduled {
                Some(Ok(id)) => next_handle.set(Some(id)),
                Some(Err(err)) => {
                    log::error!("requestAnimationFrame failed: {:?}", err);
                    next_handle.set(None);
                }
                None => next_handle.set(None),
            }
        }) as Box<dyn FnMut(f64)>);
        *callback.borrow_mut() = Some(closure);

        Self { handle, callback }
    }

    /// Register the callback for the next frame. No-op while already running.
    pub fn start(&self) -> Result<(), JsValue> {
        if self.handle.get().is_some() {
            return Ok(());
        }
        let callback = self.callback.borrow();
        let closure = callback
            .as_ref()
            .ok_or_else(|| JsValue::from_str("frame callback released"))?;
        self.handle.set(Some(request_frame(closure)?));
        Ok(())
    }

    pub fn stop(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(closure: &FrameCallback) -> Result<i32, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window.request_animation_frame(closure.as_ref().unchecked_ref())
}
