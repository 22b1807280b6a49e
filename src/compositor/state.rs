//! Compositor state: protocol globals, seat, scene and surface registry

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Instant;

use smithay::desktop::{Space, Window, WindowSurfaceType};
use smithay::input::{Seat, SeatState};
use smithay::reexports::calloop::{generic::Generic, EventLoop, Interest, LoopSignal, Mode, PostAction};
use smithay::reexports::wayland_server::backend::{ClientData, ClientId, DisconnectReason};
use smithay::reexports::wayland_server::protocol::wl_surface::WlSurface;
use smithay::reexports::wayland_server::{Display, DisplayHandle};
use smithay::reexports::wayland_protocols::xdg::shell::server::xdg_toplevel;
use smithay::utils::{Logical, Point};
use smithay::wayland::compositor::{CompositorClientState, CompositorState};
use smithay::wayland::output::OutputManagerState;
use smithay::wayland::selection::data_device::DataDeviceState;
use smithay::wayland::shell::xdg::decoration::XdgDecorationState;
use smithay::wayland::shell::xdg::XdgShellState;
use smithay::wayland::shm::ShmState;
use smithay::wayland::socket::ListeningSocketSource;
use log::warn;

use crate::compositor::headless::HeadlessBackend;
use crate::compositor::surfaces::SurfaceRegistry;
use crate::config::Config;
use crate::events::EventBus;

/// Single-threaded compositor state. Everything here is owned by the
/// event-loop thread; display-server callbacks and event-bus emissions
/// all run on it.
pub struct Compositor {
    pub start_time: Instant,
    pub socket_name: OsString,
    pub display_handle: DisplayHandle,

    pub backend: HeadlessBackend,
    pub space: Space<Window>,
    pub loop_signal: LoopSignal,

    // Smithay protocol state
    pub compositor_state: CompositorState,
    pub xdg_shell_state: XdgShellState,
    pub shm_state: ShmState,
    pub output_manager_state: OutputManagerState,
    pub seat_state: SeatState<Compositor>,
    pub data_device_state: DataDeviceState,
    pub xdg_decoration_state: XdgDecorationState,

    pub seat: Seat<Self>,

    /// Current cursor status from Wayland clients, updated by
    /// SeatHandler::cursor_image
    pub cursor_status: smithay::input::pointer::CursorImageStatus,

    /// Live toplevels and their window ids
    pub surfaces: SurfaceRegistry,

    /// Named-event fan-out to the embedding host
    pub events: EventBus,

    /// Size sent in the initial configure when the client commits unsized
    pub default_surface_size: (i32, i32),

    /// Set by surface commit, cleared after rendering
    pub needs_redraw: bool,
}

impl Compositor {
    pub fn new(
        event_loop: &mut EventLoop<Self>,
        display: Display<Self>,
        backend: HeadlessBackend,
        config: &Config,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let start_time = Instant::now();
        let dh = display.handle();

        let compositor_state = CompositorState::new::<Self>(&dh);
        let data_device_state = DataDeviceState::new::<Self>(&dh);
        let xdg_shell_state = XdgShellState::new::<Self>(&dh);
        let shm_state = ShmState::new::<Self>(&dh, vec![]);
        let output_manager_state = OutputManagerState::new_with_xdg_output::<Self>(&dh);
        let xdg_decoration_state = XdgDecorationState::new::<Self>(&dh);

        let mut seat_state = SeatState::new();
        let mut seat: Seat<Self> = seat_state.new_wl_seat(&dh, config.seat.name.clone());
        seat.add_keyboard(Default::default(), 200, 25)
            .map_err(|e| format!("Failed to create seat keyboard: {:?}", e))?;
        seat.add_pointer();
        seat.add_touch();

        let mut space = Space::default();
        let output = backend.output();
        output.create_global::<Self>(&dh);
        space.map_output(output, (0, 0));

        let socket_name = Self::init_wayland_listener(display, event_loop)?;
        let loop_signal = event_loop.get_signal();

        Ok(Self {
            start_time,
            socket_name,
            display_handle: dh,
            backend,
            space,
            loop_signal,
            compositor_state,
            xdg_shell_state,
            shm_state,
            output_manager_state,
            seat_state,
            data_device_state,
            xdg_decoration_state,
            seat,
            cursor_status: smithay::input::pointer::CursorImageStatus::default_named(),
            surfaces: SurfaceRegistry::default(),
            events: EventBus::new(),
            default_surface_size: (
                config.surface.default_width,
                config.surface.default_height,
            ),
            needs_redraw: false,
        })
    }

    fn init_wayland_listener(
        display: Display<Compositor>,
        event_loop: &mut EventLoop<Self>,
    ) -> Result<OsString, Box<dyn std::error::Error>> {
        let listening_socket = ListeningSocketSource::new_auto()
            .map_err(|e| format!("Failed to allocate wayland socket: {}", e))?;
        let socket_name = listening_socket.socket_name().to_os_string();
        let loop_handle = event_loop.handle();

        loop_handle
            .insert_source(listening_socket, move |client_stream, _, state| {
                if let Err(e) = state
                    .display_handle
                    .insert_client(client_stream, Arc::new(ClientState::default()))
                {
                    warn!("Failed to accept wayland client: {}", e);
                }
            })
            .map_err(|e| format!("Failed to register wayland socket source: {}", e))?;

        loop_handle
            .insert_source(
                Generic::new(display, Interest::READ, Mode::Level),
                |_, display, state| {
                    unsafe {
                        display.get_mut().dispatch_clients(state)?;
                    }
                    Ok(PostAction::Continue)
                },
            )
            .map_err(|e| format!("Failed to register display event source: {}", e))?;

        Ok(socket_name)
    }

    /// One frame-timer tick: commit the scene if a commit dirtied it, then
    /// send frame callbacks so clients schedule their next buffer.
    pub fn on_frame_tick(&mut self) {
        let Self {
            backend,
            space,
            needs_redraw,
            start_time,
            ..
        } = self;
        if *needs_redraw && backend.render(space) {
            *needs_redraw = false;
        }
        backend.send_frame_callbacks(space, start_time.elapsed());
    }

    /// Milliseconds elapsed since compositor start, used to stamp
    /// synthetic input events.
    pub fn time_ms(&self) -> u32 {
        self.start_time.elapsed().as_millis() as u32
    }

    pub fn surface_under(
        &self,
        pos: Point<f64, Logical>,
    ) -> Option<(WlSurface, Point<f64, Logical>)> {
        self.space.element_under(pos).and_then(|(window, location)| {
            window
                .surface_under(pos - location.to_f64(), WindowSurfaceType::ALL)
                .map(|(s, p)| (s, (p + location).to_f64()))
        })
    }

    /// Drive a toplevel size configure.
    pub fn resize_toplevel(
        &mut self,
        wid: u64,
        width: i32,
        height: i32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let toplevel = self
            .surfaces
            .find(wid)
            .map(|record| record.toplevel.clone())
            .ok_or_else(|| format!("No surface with wid {}", wid))?;
        toplevel.with_pending_state(|state| {
            state.size = Some((width, height).into());
        });
        toplevel.send_pending_configure();
        Ok(())
    }

    /// Set or clear the toplevel Activated state so clients know whether
    /// the window has focus on the remote side.
    pub fn set_toplevel_focus(
        &mut self,
        wid: u64,
        focused: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let toplevel = self
            .surfaces
            .find(wid)
            .map(|record| record.toplevel.clone())
            .ok_or_else(|| format!("No surface with wid {}", wid))?;
        toplevel.with_pending_state(|state| {
            if focused {
                state.states.set(xdg_toplevel::State::Activated);
            } else {
                state.states.unset(xdg_toplevel::State::Activated);
            }
        });
        toplevel.send_pending_configure();
        Ok(())
    }

    pub(crate) fn wid_for(&self, surface: &WlSurface) -> Option<u64> {
        self.surfaces.get(surface).map(|record| record.wid)
    }
}

#[derive(Default)]
pub struct ClientState {
    pub compositor_state: CompositorClientState,
}

impl ClientData for ClientState {
    fn initialized(&self, _client_id: ClientId) {}
    fn disconnected(&self, _client_id: ClientId, _reason: DisconnectReason) {}
}
