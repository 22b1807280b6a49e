//! Compositor lifecycle and embedder-facing API
//!
//! [`HeadlessCompositor`] owns the event loop and the compositor state.
//! Embedders either call [`HeadlessCompositor::run`] and let the loop
//! block, or poll [`HeadlessCompositor::event_loop_fd`] from their own
//! reactor and call [`HeadlessCompositor::process_events`] when it turns
//! readable (and at their tick cadence, which services the frame timer).

use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::time::Duration;

use smithay::reexports::calloop::timer::{TimeoutAction, Timer};
use smithay::reexports::calloop::{EventLoop, LoopSignal};
use smithay::reexports::wayland_server::Display;
use log::info;

use crate::compositor::headless::HeadlessBackend;
use crate::compositor::state::Compositor;
use crate::config::Config;
use crate::events::{Event, ListenerId};
use crate::input::{Keyboard, Pointer};

pub struct HeadlessCompositor {
    event_loop: Option<EventLoop<'static, Compositor>>,
    state: Option<Compositor>,
    poll_fd: OwnedFd,
    socket_name: String,
}

impl HeadlessCompositor {
    /// Bring up the whole stack: display, globals, seat, headless backend,
    /// frame timer and listening socket. Publishes the socket name as
    /// `WAYLAND_DISPLAY` in the process environment.
    pub fn initialize(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;

        let mut event_loop: EventLoop<Compositor> =
            EventLoop::try_new().map_err(|e| format!("Failed to create event loop: {}", e))?;

        let mut display: Display<Compositor> =
            Display::new().map_err(|e| format!("Failed to create wayland display: {}", e))?;
        let poll_fd = display
            .backend()
            .poll_fd()
            .try_clone_to_owned()
            .map_err(|e| format!("Failed to clone display poll fd: {}", e))?;

        let backend = HeadlessBackend::new(
            config.display.width,
            config.display.height,
            config.display.refresh_hz,
        )?;

        let state = Compositor::new(&mut event_loop, display, backend, &config)?;
        let socket_name = state.socket_name.to_string_lossy().into_owned();

        let frame_interval = Duration::from_millis(1000 / config.display.refresh_hz as u64);
        event_loop
            .handle()
            .insert_source(Timer::immediate(), move |_, _, state: &mut Compositor| {
                state.on_frame_tick();
                TimeoutAction::ToDuration(frame_interval)
            })
            .map_err(|e| format!("Failed to register frame timer: {}", e))?;

        std::env::set_var("WAYLAND_DISPLAY", &socket_name);
        info!("Compositor listening on wayland socket {}", socket_name);

        Ok(Self {
            event_loop: Some(event_loop),
            state: Some(state),
            poll_fd,
            socket_name,
        })
    }

    /// The auto-allocated socket name, e.g. `wayland-1`.
    pub fn socket_name(&self) -> &str {
        &self.socket_name
    }

    /// The display's poll fd, for embedders that own the reactor.
    pub fn event_loop_fd(&self) -> RawFd {
        self.poll_fd.as_raw_fd()
    }

    /// One non-blocking event-loop dispatch plus a client flush.
    pub fn process_events(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (event_loop, state) = self.parts()?;
        event_loop
            .dispatch(Some(Duration::ZERO), state)
            .map_err(|e| format!("Event loop dispatch failed: {}", e))?;
        state
            .display_handle
            .flush_clients()
            .map_err(|e| format!("Failed to flush clients: {}", e))?;
        Ok(())
    }

    /// Block in the dispatch loop until the loop signal is stopped.
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (event_loop, state) = self.parts()?;
        event_loop
            .run(Duration::from_millis(16), state, |state| {
                let _ = state.display_handle.flush_clients();
            })
            .map_err(|e| format!("Event loop error: {}", e))?;
        Ok(())
    }

    /// Signal that makes a blocking [`run`](Self::run) return; safe to
    /// stop from another thread or a signal handler.
    pub fn loop_signal(&self) -> Result<LoopSignal, Box<dyn std::error::Error>> {
        self.state
            .as_ref()
            .map(|state| state.loop_signal.clone())
            .ok_or_else(|| "Compositor has been cleaned up".into())
    }

    /// Tear everything down. Idempotent; also invoked from `Drop`. The
    /// state (backend, protocol globals, seat) goes first, then the event
    /// loop, whose drop closes the display source and the listening
    /// socket.
    pub fn cleanup(&mut self) {
        if let Some(state) = self.state.take() {
            drop(state);
        }
        if let Some(event_loop) = self.event_loop.take() {
            drop(event_loop);
        }
    }

    /// Direct access to the compositor state, needed when driving the
    /// input facades.
    pub fn compositor_mut(&mut self) -> Result<&mut Compositor, Box<dyn std::error::Error>> {
        self.state
            .as_mut()
            .ok_or_else(|| "Compositor has been cleaned up".into())
    }

    pub fn add_event_listener(
        &mut self,
        name: &str,
        callback: impl FnMut(&Event) + 'static,
    ) -> Result<ListenerId, Box<dyn std::error::Error>> {
        Ok(self.compositor_mut()?.events.add_listener(name, callback))
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.state
            .as_mut()
            .map(|state| state.events.remove_listener(id))
            .unwrap_or(false)
    }

    /// Drive a toplevel size configure.
    pub fn resize(
        &mut self,
        wid: u64,
        width: i32,
        height: i32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.compositor_mut()?.resize_toplevel(wid, width, height)
    }

    /// Set the toplevel activated state.
    pub fn focus(&mut self, wid: u64, focused: bool) -> Result<(), Box<dyn std::error::Error>> {
        self.compositor_mut()?.set_toplevel_focus(wid, focused)
    }

    pub fn pointer_device(&mut self) -> Result<Pointer, Box<dyn std::error::Error>> {
        Pointer::new(&self.compositor_mut()?.seat)
    }

    pub fn keyboard_device(&mut self) -> Result<Keyboard, Box<dyn std::error::Error>> {
        Keyboard::new(&self.compositor_mut()?.seat)
    }

    fn parts(
        &mut self,
    ) -> Result<(&mut EventLoop<'static, Compositor>, &mut Compositor), Box<dyn std::error::Error>>
    {
        match (self.event_loop.as_mut(), self.state.as_mut()) {
            (Some(event_loop), Some(state)) => Ok((event_loop, state)),
            _ => Err("Compositor has been cleaned up".into()),
        }
    }
}

impl Drop for HeadlessCompositor {
    fn drop(&mut self) {
        self.cleanup();
    }
}
