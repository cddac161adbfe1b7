use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::window;

use crate::core::error::{FxError, FxResult};

struct LoopState {
    // Holds the rAF closure so it can re-request itself. Taken on stop,
    // which also breaks the closure -> state reference cycle.
    closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    pending: Cell<Option<i32>>,
    running: Cell<bool>,
}

/// `requestAnimationFrame` driver: calls `tick(timestamp_ms)` once per
/// repaint until stopped. Stopping cancels the outstanding request.
pub struct AnimationLoop {
    state: Rc<LoopState>,
}

impl AnimationLoop {
    pub fn start<F>(mut tick: F) -> FxResult<Self>
    where
        F: FnMut(f64) + 'static,
    {
        let state = Rc::new(LoopState {
            closure: RefCell::new(None),
            pending: Cell::new(None),
            running: Cell::new(true),
        });

        let inner = Rc::clone(&state);
        *state.closure.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            inner.pending.set(None);
            if !inner.running.get() {
                return;
            }
            tick(now);
            if !inner.running.get() {
                return;
            }
            let next = inner.closure.borrow().as_ref().and_then(|c| {
                window().and_then(|w| w.request_animation_frame(c.as_ref().unchecked_ref()).ok())
            });
            inner.pending.set(next);
        }) as Box<dyn FnMut(f64)>));

        let first = {
            let closure = state.closure.borrow();
            let cb = closure.as_ref().ok_or_else(|| FxError::Host("animation closure missing".into()))?;
            window()
                .ok_or_else(|| FxError::Host("no window".into()))?
                .request_animation_frame(cb.as_ref().unchecked_ref())?
        };
        state.pending.set(Some(first));
        Ok(Self { state })
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Cancel the pending frame and release the callback. Idempotent.
    pub fn stop(&self) {
        self.state.running.set(false);
        if let Some(id) = self.state.pending.take() {
            if let Some(w) = window() {
                let _ = w.cancel_animation_frame(id);
            }
        }
        // May run inside the callback itself (a JS listener calling stop);
        // the JS glue defers freeing a closure that is still executing.
        if let Ok(mut slot) = self.state.closure.try_borrow_mut() {
            slot.take();
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
