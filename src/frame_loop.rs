//! Cooperative frame scheduler standing in for the host's per-frame callback.
//!
//! Components register a frame callback and, optionally, a resize listener.
//! Each registration is clocked independently from the first frame it sees,
//! so two backgrounds mounted at different times never share a time base.
//!
//! Every registration returns a [`FrameHandle`]. Dropping the handle (or
//! calling [`FrameHandle::cancel`]) withdraws the registration; a cancelled
//! callback is never invoked again.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Timing information passed to a frame callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since this registration's first frame
    pub elapsed: f32,
    /// Seconds since this registration's previous frame (0 on the first)
    pub delta: f32,
    /// Frames delivered to this registration before this one
    pub frame: u64,
}

/// Cancellation guard for a scheduler registration
#[derive(Debug)]
pub struct FrameHandle {
    id: u64,
    active: Rc<Cell<bool>>,
}

impl FrameHandle {
    /// Withdraw the registration now
    pub fn cancel(self) {}

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Drop for FrameHandle {
    fn drop(&mut self) {
        if self.active.replace(false) {
            log::debug!("Registration {} cancelled", self.id);
        }
    }
}

struct FrameRegistration {
    active: Rc<Cell<bool>>,
    origin: Option<Duration>,
    last: Option<Duration>,
    frames: u64,
    callback: Box<dyn FnMut(FrameTick)>,
}

struct ResizeRegistration {
    active: Rc<Cell<bool>>,
    callback: Box<dyn FnMut(Viewport)>,
}

/// Drives frame callbacks and resize listeners on the current thread
pub struct FrameScheduler {
    next_id: u64,
    viewport: Viewport,
    frames: Vec<FrameRegistration>,
    resize: Vec<ResizeRegistration>,
}

impl FrameScheduler {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            next_id: 0,
            viewport,
            frames: Vec::new(),
            resize: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn next_handle(&mut self) -> FrameHandle {
        self.next_id += 1;
        FrameHandle {
            id: self.next_id,
            active: Rc::new(Cell::new(true)),
        }
    }

    /// Call `callback` once per frame until the returned handle is dropped.
    pub fn request_frames(
        &mut self,
        callback: impl FnMut(FrameTick) + 'static,
    ) -> FrameHandle {
        let handle = self.next_handle();
        self.frames.push(FrameRegistration {
            active: Rc::clone(&handle.active),
            origin: None,
            last: None,
            frames: 0,
            callback: Box::new(callback),
        });
        handle
    }

    /// Call `callback` on every viewport change until the handle is dropped.
    pub fn on_resize(&mut self, callback: impl FnMut(Viewport) + 'static) -> FrameHandle {
        let handle = self.next_handle();
        self.resize.push(ResizeRegistration {
            active: Rc::clone(&handle.active),
            callback: Box::new(callback),
        });
        handle
    }

    /// Deliver one frame at host time `now` to every live registration.
    ///
    /// Returns the number of callbacks invoked.
    pub fn run_frame(&mut self, now: Duration) -> usize {
        self.prune();

        let mut invoked = 0;
        for reg in &mut self.frames {
            // A callback earlier in this frame may have cancelled this one
            if !reg.active.get() {
                continue;
            }

            let origin = *reg.origin.get_or_insert(now);
            let delta = reg
                .last
                .map(|last| now.saturating_sub(last).as_secs_f32())
                .unwrap_or(0.0);
            let tick = FrameTick {
                elapsed: now.saturating_sub(origin).as_secs_f32(),
                delta,
                frame: reg.frames,
            };

            (reg.callback)(tick);
            reg.last = Some(now);
            reg.frames += 1;
            invoked += 1;
        }
        invoked
    }

    /// Record a new viewport size and notify live listeners.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        log::debug!(
            "Viewport resized to {}x{}",
            viewport.width,
            viewport.height
        );
        self.viewport = viewport;
        self.prune();
        for reg in &mut self.resize {
            if reg.active.get() {
                (reg.callback)(viewport);
            }
        }
    }

    /// Live frame callbacks
    pub fn frame_callbacks(&self) -> usize {
        self.frames.iter().filter(|r| r.active.get()).count()
    }

    /// Live resize listeners
    pub fn resize_listeners(&self) -> usize {
        self.resize.iter().filter(|r| r.active.get()).count()
    }

    fn prune(&mut self) {
        self.frames.retain(|r| r.active.get());
        self.resize.retain(|r| r.active.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn at(secs: f32) -> Duration {
        Duration::from_secs_f32(secs)
    }

    #[test]
    fn test_callbacks_run_until_handle_dropped() {
        let mut scheduler = FrameScheduler::new(Viewport::new(10, 10));
        let count = Rc::new(Cell::new(0));

        let counter = Rc::clone(&count);
        let handle = scheduler.request_frames(move |_| counter.set(counter.get() + 1));

        scheduler.run_frame(at(0.0));
        scheduler.run_frame(at(0.016));
        assert_eq!(count.get(), 2);

        drop(handle);
        assert_eq!(scheduler.run_frame(at(0.032)), 0);
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.frame_callbacks(), 0);
    }

    #[test]
    fn test_dropping_one_handle_keeps_the_others() {
        let mut scheduler = FrameScheduler::new(Viewport::new(10, 10));
        let hits = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&hits);
        let first = scheduler.request_frames(move |_| sink.borrow_mut().push('a'));
        let sink = Rc::clone(&hits);
        let _second = scheduler.request_frames(move |_| sink.borrow_mut().push('b'));

        assert_eq!(scheduler.run_frame(at(0.0)), 2);
        drop(first);
        assert_eq!(scheduler.run_frame(at(0.016)), 1);

        assert_eq!(*hits.borrow(), vec!['a', 'b', 'b']);
        assert_eq!(scheduler.frame_callbacks(), 1);
    }

    #[test]
    fn test_registrations_are_clocked_independently() {
        let mut scheduler = FrameScheduler::new(Viewport::new(10, 10));
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&first);
        let _a = scheduler.request_frames(move |tick| sink.borrow_mut().push(tick));
        scheduler.run_frame(at(1.0));
        scheduler.run_frame(at(2.0));

        let sink = Rc::clone(&second);
        let _b = scheduler.request_frames(move |tick| sink.borrow_mut().push(tick));
        scheduler.run_frame(at(3.0));

        let first = first.borrow();
        assert_eq!(first.len(), 3);
        assert!((first[2].elapsed - 2.0).abs() < 1e-4);
        assert!((first[2].delta - 1.0).abs() < 1e-4);
        assert_eq!(first[2].frame, 2);

        let second = second.borrow();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].elapsed, 0.0);
        assert_eq!(second[0].delta, 0.0);
    }

    #[test]
    fn test_resize_notifies_live_listeners_only() {
        let mut scheduler = FrameScheduler::new(Viewport::new(10, 10));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let handle = scheduler.on_resize(move |v| sink.borrow_mut().push(v));

        scheduler.resize(Viewport::new(20, 10));
        // Same size: no notification
        scheduler.resize(Viewport::new(20, 10));
        handle.cancel();
        scheduler.resize(Viewport::new(30, 10));

        assert_eq!(*seen.borrow(), vec![Viewport::new(20, 10)]);
        assert_eq!(scheduler.viewport(), Viewport::new(30, 10));
        assert_eq!(scheduler.resize_listeners(), 0);
    }
}
