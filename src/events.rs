//! Compositor event bus
//!
//! Translates display-server signals into named events for the embedding
//! host. Dispatch is synchronous and single-threaded: listeners run on the
//! event-loop thread, in registration order. Long work (encoding, network
//! sends) belongs to the embedder and must be dispatched off-thread there.

use std::collections::HashMap;

use crate::frame::{DamageRect, SurfaceImage};

/// Window-management events published to embedders.
///
/// One constructor per event name; [`Event::name`] gives the string form
/// used at the listener-registration boundary.
#[derive(Debug, Clone)]
pub enum Event {
    /// A new toplevel entered the registry.
    NewSurface {
        wid: u64,
        title: String,
        app_id: String,
        size: (i32, i32),
    },
    /// The surface committed its first buffer and became visible.
    Map {
        wid: u64,
        title: String,
        app_id: String,
        size: (i32, i32),
    },
    Unmap {
        wid: u64,
    },
    /// Terminal event for a wid; no further events follow it.
    Destroy {
        wid: u64,
    },
    /// A commit happened; carries the damage accumulated since the last one.
    Commit {
        wid: u64,
        mapped: bool,
        damage: Vec<DamageRect>,
    },
    SurfaceImage {
        wid: u64,
        image: SurfaceImage,
    },
    Move {
        wid: u64,
        serial: u32,
    },
    Resize {
        wid: u64,
        serial: u32,
    },
    Maximize {
        wid: u64,
    },
    Fullscreen {
        wid: u64,
    },
    Minimize {
        wid: u64,
    },
    /// Server-side decorations were forced on a toplevel.
    Ssd {
        wid: u64,
        client_requested_ssd: bool,
    },
    SetTitle {
        wid: u64,
        title: String,
    },
    SetAppId {
        wid: u64,
        app_id: String,
    },
}

impl Event {
    /// String name used when registering listeners.
    pub fn name(&self) -> &'static str {
        match self {
            Event::NewSurface { .. } => "new-surface",
            Event::Map { .. } => "map",
            Event::Unmap { .. } => "unmap",
            Event::Destroy { .. } => "destroy",
            Event::Commit { .. } => "commit",
            Event::SurfaceImage { .. } => "surface-image",
            Event::Move { .. } => "move",
            Event::Resize { .. } => "resize",
            Event::Maximize { .. } => "maximize",
            Event::Fullscreen { .. } => "fullscreen",
            Event::Minimize { .. } => "minimize",
            Event::Ssd { .. } => "ssd",
            Event::SetTitle { .. } => "set-title",
            Event::SetAppId { .. } => "set-app-id",
        }
    }

    /// All event names accepted by [`EventBus::add_listener`].
    pub const NAMES: &'static [&'static str] = &[
        "new-surface",
        "map",
        "unmap",
        "destroy",
        "commit",
        "surface-image",
        "move",
        "resize",
        "maximize",
        "fullscreen",
        "minimize",
        "ssd",
        "set-title",
        "set-app-id",
    ];
}

/// Token returned by [`EventBus::add_listener`], used to unsubscribe.
pub type ListenerId = u64;

type Listener = Box<dyn FnMut(&Event)>;

/// Ordered fan-out of named events to registered callbacks.
///
/// The same callback may be registered multiple times; each registration
/// is an independent subscription with its own id.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<String, Vec<(ListenerId, Listener)>>,
    next_id: ListenerId,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback to the listener list for `name`.
    pub fn add_listener(&mut self, name: &str, callback: impl FnMut(&Event) + 'static) -> ListenerId {
        self.next_id += 1;
        let id = self.next_id;
        self.listeners
            .entry(name.to_string())
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Remove the subscription with the given id. Returns whether a
    /// subscription was removed; removing an unknown id is a no-op.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        self.listeners.retain(|_, list| {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                list.remove(pos);
                removed = true;
            }
            !list.is_empty()
        });
        removed
    }

    /// Invoke all current subscribers for the event's name, in
    /// registration order, on the caller's thread.
    pub fn emit(&mut self, event: &Event) {
        if let Some(list) = self.listeners.get_mut(event.name()) {
            for (_, callback) in list.iter_mut() {
                callback(event);
            }
        }
    }

    #[cfg(test)]
    fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn listeners_run_in_registration_order() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let a = order.clone();
        bus.add_listener("map", move |_| a.borrow_mut().push("a"));
        let b = order.clone();
        bus.add_listener("map", move |_| b.borrow_mut().push("b"));

        bus.emit(&Event::Map {
            wid: 1,
            title: String::new(),
            app_id: String::new(),
            size: (0, 0),
        });
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn emit_only_reaches_matching_name() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));

        let h = hits.clone();
        bus.add_listener("unmap", move |_| *h.borrow_mut() += 1);

        bus.emit(&Event::Destroy { wid: 1 });
        assert_eq!(*hits.borrow(), 0);
        bus.emit(&Event::Unmap { wid: 1 });
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn remove_restores_prior_state_and_is_idempotent() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let a = order.clone();
        let id_a = bus.add_listener("map", move |_| a.borrow_mut().push("a"));
        let b = order.clone();
        bus.add_listener("map", move |_| b.borrow_mut().push("b"));

        assert!(bus.remove_listener(id_a));
        assert!(!bus.remove_listener(id_a));

        bus.emit(&Event::Map {
            wid: 1,
            title: String::new(),
            app_id: String::new(),
            size: (0, 0),
        });
        assert_eq!(*order.borrow(), vec!["b"]);
    }

    #[test]
    fn empty_lists_are_dropped() {
        let mut bus = EventBus::new();
        let id = bus.add_listener("commit", |_| {});
        assert_eq!(bus.listener_count("commit"), 1);
        bus.remove_listener(id);
        assert_eq!(bus.listener_count("commit"), 0);
    }

    #[test]
    fn same_callback_registered_twice_runs_twice() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));

        for _ in 0..2 {
            let h = hits.clone();
            bus.add_listener("minimize", move |_| *h.borrow_mut() += 1);
        }
        bus.emit(&Event::Minimize { wid: 3 });
        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn names_cover_every_variant() {
        let events = [
            Event::NewSurface {
                wid: 1,
                title: String::new(),
                app_id: String::new(),
                size: (0, 0),
            },
            Event::Map {
                wid: 1,
                title: String::new(),
                app_id: String::new(),
                size: (0, 0),
            },
            Event::Unmap { wid: 1 },
            Event::Destroy { wid: 1 },
            Event::Commit {
                wid: 1,
                mapped: false,
                damage: Vec::new(),
            },
            Event::SurfaceImage {
                wid: 1,
                image: SurfaceImage::new(1, 1, vec![0; 4]),
            },
            Event::Move { wid: 1, serial: 7 },
            Event::Resize { wid: 1, serial: 7 },
            Event::Maximize { wid: 1 },
            Event::Fullscreen { wid: 1 },
            Event::Minimize { wid: 1 },
            Event::Ssd {
                wid: 1,
                client_requested_ssd: false,
            },
            Event::SetTitle {
                wid: 1,
                title: String::new(),
            },
            Event::SetAppId {
                wid: 1,
                app_id: String::new(),
            },
        ];
        for event in &events {
            assert!(Event::NAMES.contains(&event.name()));
        }
        assert_eq!(events.len(), Event::NAMES.len());
    }
}
