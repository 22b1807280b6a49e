//! Wayland protocol handlers for the compositor

pub mod compositor;
pub mod xdg_shell;

use smithay::input::keyboard::LedState;
use smithay::input::{Seat, SeatHandler, SeatState};
use smithay::reexports::wayland_protocols::xdg::decoration::zv1::server::zxdg_toplevel_decoration_v1::Mode;
use smithay::reexports::wayland_protocols::xdg::shell::server::xdg_toplevel;
use smithay::reexports::wayland_server::protocol::wl_surface::WlSurface;
use smithay::reexports::wayland_server::Resource;
use smithay::wayland::output::OutputHandler;
use smithay::wayland::selection::data_device::{
    set_data_device_focus, ClientDndGrabHandler, DataDeviceHandler, DataDeviceState,
    ServerDndGrabHandler,
};
use smithay::wayland::selection::SelectionHandler;
use smithay::wayland::shell::xdg::decoration::XdgDecorationHandler;
use smithay::wayland::shell::xdg::ToplevelSurface;
use smithay::{delegate_data_device, delegate_output, delegate_seat, delegate_xdg_decoration};
use log::debug;

use crate::compositor::Compositor;
use crate::events::Event;

impl SeatHandler for Compositor {
    type KeyboardFocus = WlSurface;
    type PointerFocus = WlSurface;
    type TouchFocus = WlSurface;

    fn seat_state(&mut self) -> &mut SeatState<Compositor> {
        &mut self.seat_state
    }

    fn cursor_image(
        &mut self,
        _seat: &Seat<Self>,
        image: smithay::input::pointer::CursorImageStatus,
    ) {
        self.cursor_status = image;
    }

    fn focus_changed(&mut self, seat: &Seat<Self>, focused: Option<&WlSurface>) {
        let dh = &self.display_handle;
        let client = focused.and_then(|s| dh.get_client(s.id()).ok());
        set_data_device_focus(dh, seat, client);

        // Keep the xdg_toplevel Activated state in step with keyboard
        // focus so clients process key events.
        let focused_id = focused.map(|surface| surface.id());
        let toplevels: Vec<ToplevelSurface> = self
            .surfaces
            .records()
            .map(|record| record.toplevel.clone())
            .collect();
        for toplevel in toplevels {
            let is_focused = focused_id
                .as_ref()
                .map(|id| *id == toplevel.wl_surface().id())
                .unwrap_or(false);
            toplevel.with_pending_state(|state| {
                if is_focused {
                    state.states.set(xdg_toplevel::State::Activated);
                } else {
                    state.states.unset(xdg_toplevel::State::Activated);
                }
            });
            toplevel.send_pending_configure();
        }
    }

    fn led_state_changed(&mut self, _seat: &Seat<Self>, led_state: LedState) {
        debug!("keyboard LED state changed: {:?}", led_state);
    }
}

delegate_seat!(Compositor);

impl SelectionHandler for Compositor {
    type SelectionUserData = ();
}

impl DataDeviceHandler for Compositor {
    fn data_device_state(&self) -> &DataDeviceState {
        &self.data_device_state
    }
}

impl ClientDndGrabHandler for Compositor {}
impl ServerDndGrabHandler for Compositor {}

delegate_data_device!(Compositor);

impl OutputHandler for Compositor {}
delegate_output!(Compositor);

impl XdgDecorationHandler for Compositor {
    fn new_decoration(&mut self, toplevel: ToplevelSurface) {
        toplevel.with_pending_state(|state| {
            state.decoration_mode = Some(Mode::ServerSide);
        });
        toplevel.send_pending_configure();
        if let Some(wid) = self.wid_for(toplevel.wl_surface()) {
            self.events.emit(&Event::Ssd {
                wid,
                client_requested_ssd: true,
            });
        }
    }

    fn request_mode(&mut self, toplevel: ToplevelSurface, mode: Mode) {
        let client_requested_ssd = mode == Mode::ServerSide;
        toplevel.with_pending_state(|state| {
            state.decoration_mode = Some(Mode::ServerSide);
        });
        toplevel.send_pending_configure();
        if let Some(wid) = self.wid_for(toplevel.wl_surface()) {
            self.events.emit(&Event::Ssd {
                wid,
                client_requested_ssd,
            });
        }
    }

    fn unset_mode(&mut self, toplevel: ToplevelSurface) {
        toplevel.with_pending_state(|state| {
            state.decoration_mode = Some(Mode::ServerSide);
        });
        toplevel.send_pending_configure();
        // The client withdrew its preference; report it as accepting the
        // enforced server-side mode, like a fresh decoration object.
        if let Some(wid) = self.wid_for(toplevel.wl_surface()) {
            self.events.emit(&Event::Ssd {
                wid,
                client_requested_ssd: true,
            });
        }
    }
}
delegate_xdg_decoration!(Compositor);
