//! XDG shell handler: toplevel registration and window-management requests
//!
//! Window-management requests are translated into bus events for the
//! embedding host; the remote side decides geometry, so none of them
//! change the local scene.

use smithay::delegate_xdg_shell;
use smithay::desktop::Window;
use smithay::reexports::wayland_protocols::xdg::shell::server::xdg_toplevel;
use smithay::reexports::wayland_server::protocol::{wl_output::WlOutput, wl_seat};
use smithay::utils::Serial;
use smithay::wayland::shell::xdg::{
    PopupSurface, PositionerState, ToplevelSurface, XdgShellHandler, XdgShellState,
};
use log::{debug, info};

use crate::compositor::Compositor;
use crate::events::Event;

impl XdgShellHandler for Compositor {
    fn xdg_shell_state(&mut self) -> &mut XdgShellState {
        &mut self.xdg_shell_state
    }

    fn new_toplevel(&mut self, surface: ToplevelSurface) {
        let window = Window::new_wayland_window(surface.clone());
        self.space.map_element(window.clone(), (0, 0), false);

        let wid = self.surfaces.insert(surface, window);
        info!("new toplevel wid={}", wid);

        self.events.emit(&Event::NewSurface {
            wid,
            title: String::new(),
            app_id: String::new(),
            size: (0, 0),
        });
    }

    fn new_popup(&mut self, _surface: PopupSurface, _positioner: PositionerState) {
        // Popups are not rendered as separate windows on the remote side.
        debug!("ignoring popup surface");
    }

    fn grab(&mut self, _surface: PopupSurface, _seat: wl_seat::WlSeat, _serial: Serial) {}

    fn reposition_request(
        &mut self,
        _surface: PopupSurface,
        _positioner: PositionerState,
        _token: u32,
    ) {
    }

    fn move_request(&mut self, surface: ToplevelSurface, _seat: wl_seat::WlSeat, serial: Serial) {
        if let Some(wid) = self.wid_for(surface.wl_surface()) {
            self.events.emit(&Event::Move {
                wid,
                serial: serial.into(),
            });
        }
    }

    fn resize_request(
        &mut self,
        surface: ToplevelSurface,
        _seat: wl_seat::WlSeat,
        serial: Serial,
        edges: xdg_toplevel::ResizeEdge,
    ) {
        if let Some(wid) = self.wid_for(surface.wl_surface()) {
            debug!("resize request wid={} edges={:?}", wid, edges);
            self.events.emit(&Event::Resize {
                wid,
                serial: serial.into(),
            });
        }
    }

    fn maximize_request(&mut self, surface: ToplevelSurface) {
        if let Some(wid) = self.wid_for(surface.wl_surface()) {
            self.events.emit(&Event::Maximize { wid });
        }
        // The protocol requires a configure in reply even when geometry is
        // unchanged.
        surface.send_configure();
    }

    fn fullscreen_request(&mut self, surface: ToplevelSurface, _output: Option<WlOutput>) {
        if let Some(wid) = self.wid_for(surface.wl_surface()) {
            self.events.emit(&Event::Fullscreen { wid });
        }
        surface.send_configure();
    }

    fn minimize_request(&mut self, surface: ToplevelSurface) {
        if let Some(wid) = self.wid_for(surface.wl_surface()) {
            self.events.emit(&Event::Minimize { wid });
        }
    }

    fn toplevel_destroyed(&mut self, surface: ToplevelSurface) {
        if let Some(record) = self.surfaces.remove(surface.wl_surface()) {
            self.space.unmap_elem(&record.window);
            self.needs_redraw = true;
            info!("toplevel destroyed wid={}", record.wid);
            self.events.emit(&Event::Destroy { wid: record.wid });
        }
    }
}

delegate_xdg_shell!(Compositor);
