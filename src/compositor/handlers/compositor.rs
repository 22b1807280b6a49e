//! Surface commit pipeline
//!
//! Each commit flows through: damage extraction, initial configure,
//! map/unmap tracking, title/app_id change detection, texture readback,
//! and finally event emission in protocol order.

use smithay::backend::renderer::utils::{on_commit_buffer_handler, with_renderer_surface_state};
use smithay::delegate_compositor;
use smithay::delegate_shm;
use smithay::reexports::wayland_server::protocol::{wl_buffer, wl_surface::WlSurface};
use smithay::reexports::wayland_server::Client;
use smithay::utils::{Buffer, Rectangle};
use smithay::wayland::buffer::BufferHandler;
use smithay::wayland::compositor::{
    get_parent, is_sync_subsurface, with_states, CompositorClientState, CompositorHandler,
    CompositorState, SurfaceAttributes,
};
use smithay::wayland::shm::{ShmHandler, ShmState};
use smithay::wayland::shell::xdg::XdgToplevelSurfaceData;

use crate::compositor::state::ClientState;
use crate::compositor::{surfaces, Compositor};
use crate::events::Event;
use crate::frame::DamageRect;

impl CompositorHandler for Compositor {
    fn compositor_state(&mut self) -> &mut CompositorState {
        &mut self.compositor_state
    }

    fn client_compositor_state<'a>(&self, client: &'a Client) -> &'a CompositorClientState {
        &client.get_data::<ClientState>().unwrap().compositor_state
    }

    fn commit(&mut self, surface: &WlSurface) {
        // The committed buffer damage, taken before the renderer state
        // consumes it.
        let damage = with_states(surface, |states| {
            let mut guard = states.cached_state.get::<SurfaceAttributes>();
            let attrs = guard.current();
            surfaces::buffer_damage(&attrs.damage, attrs.buffer_scale)
        });

        on_commit_buffer_handler::<Self>(surface);

        if is_sync_subsurface(surface) {
            return;
        }

        let mut root = surface.clone();
        while let Some(parent) = get_parent(&root) {
            root = parent;
        }

        self.toplevel_commit(&root, damage);
        self.needs_redraw = true;
    }
}

impl Compositor {
    fn toplevel_commit(&mut self, surface: &WlSurface, damage: Vec<Rectangle<i32, Buffer>>) {
        let (wid, toplevel, window) = match self.surfaces.get(surface) {
            Some(record) => (record.wid, record.toplevel.clone(), record.window.clone()),
            None => return,
        };

        window.on_commit();

        let (initial_configure_sent, title, app_id) = with_states(surface, |states| {
            let data = states
                .data_map
                .get::<XdgToplevelSurfaceData>()
                .unwrap()
                .lock()
                .unwrap();
            (
                data.initial_configure_sent,
                data.title.clone().unwrap_or_default(),
                data.app_id.clone().unwrap_or_default(),
            )
        });

        // A toplevel that commits before being configured gets exactly one
        // initial configure, with the default size unless the client
        // negotiated one.
        if !initial_configure_sent {
            let (width, height) = self.default_surface_size;
            toplevel.with_pending_state(|state| {
                if state.size.is_none() {
                    state.size = Some((width, height).into());
                }
            });
            toplevel.send_configure();
        }

        let mapped = with_renderer_surface_state(surface, |state| state.buffer().is_some())
            .unwrap_or(false);
        let geometry = window.geometry();
        let size = (geometry.size.w, geometry.size.h);

        let mut pending = Vec::new();
        {
            let record = match self.surfaces.get_mut(surface) {
                Some(record) => record,
                None => return,
            };
            let was_mapped = record.mapped;

            if mapped && !was_mapped {
                pending.push(Event::Map {
                    wid,
                    title: title.clone(),
                    app_id: app_id.clone(),
                    size,
                });
            } else if !mapped && was_mapped {
                pending.push(Event::Unmap { wid });
            }

            // Title/app_id changes before the map are observable through
            // the map payload; only changes on a mapped surface get their
            // own events.
            if was_mapped && mapped {
                if title != record.title {
                    pending.push(Event::SetTitle {
                        wid,
                        title: title.clone(),
                    });
                }
                if app_id != record.app_id {
                    pending.push(Event::SetAppId {
                        wid,
                        app_id: app_id.clone(),
                    });
                }
            }

            record.mapped = mapped;
            record.title = title;
            record.app_id = app_id;
            record.size = size;
        }

        let rects: Vec<DamageRect> = damage.iter().copied().map(DamageRect::from).collect();
        pending.push(Event::Commit {
            wid,
            mapped,
            damage: rects,
        });

        if mapped {
            let Self { backend, .. } = self;
            if let Some(image) = backend.readback_surface(surface, geometry.loc, &damage) {
                pending.push(Event::SurfaceImage { wid, image });
            }
        }

        for event in &pending {
            self.events.emit(event);
        }
    }
}

impl BufferHandler for Compositor {
    fn buffer_destroyed(&mut self, _buffer: &wl_buffer::WlBuffer) {}
}

impl ShmHandler for Compositor {
    fn shm_state(&self) -> &ShmState {
        &self.shm_state
    }
}

delegate_compositor!(Compositor);
delegate_shm!(Compositor);
