//! Surface registry
//!
//! Tracks live toplevel surfaces, assigns stable window identifiers and
//! caches the state needed to translate commits into events. Popup-role
//! surfaces never enter the registry.

use std::collections::HashMap;

use smithay::desktop::Window;
use smithay::reexports::wayland_server::backend::ObjectId;
use smithay::reexports::wayland_server::protocol::wl_surface::WlSurface;
use smithay::reexports::wayland_server::Resource;
use smithay::utils::{Buffer, Rectangle};
use smithay::wayland::compositor::Damage;
use smithay::wayland::shell::xdg::ToplevelSurface;

/// Monotonic window-id mint. Ids start at 1 and are never reused within
/// a compositor instance.
#[derive(Debug, Default)]
pub struct WidAllocator {
    next: u64,
}

impl WidAllocator {
    pub fn next_wid(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

/// Per-toplevel bookkeeping.
pub struct SurfaceRecord {
    pub wid: u64,
    pub toplevel: ToplevelSurface,
    pub window: Window,
    /// Whether the surface currently has a committed buffer
    pub mapped: bool,
    /// Cached xdg geometry size, zero until the first sized commit
    pub size: (i32, i32),
    pub title: String,
    pub app_id: String,
}

/// Registry of live toplevels keyed by their underlying wl_surface.
#[derive(Default)]
pub struct SurfaceRegistry {
    wids: WidAllocator,
    records: HashMap<ObjectId, SurfaceRecord>,
}

impl SurfaceRegistry {
    /// Register a toplevel and mint its wid.
    pub fn insert(&mut self, toplevel: ToplevelSurface, window: Window) -> u64 {
        let wid = self.wids.next_wid();
        let key = toplevel.wl_surface().id();
        self.records.insert(
            key,
            SurfaceRecord {
                wid,
                toplevel,
                window,
                mapped: false,
                size: (0, 0),
                title: String::new(),
                app_id: String::new(),
            },
        );
        wid
    }

    pub fn get(&self, surface: &WlSurface) -> Option<&SurfaceRecord> {
        self.records.get(&surface.id())
    }

    pub fn get_mut(&mut self, surface: &WlSurface) -> Option<&mut SurfaceRecord> {
        self.records.get_mut(&surface.id())
    }

    pub fn remove(&mut self, surface: &WlSurface) -> Option<SurfaceRecord> {
        self.records.remove(&surface.id())
    }

    pub fn find(&self, wid: u64) -> Option<&SurfaceRecord> {
        self.records.values().find(|record| record.wid == wid)
    }

    pub fn records(&self) -> impl Iterator<Item = &SurfaceRecord> {
        self.records.values()
    }
}

/// Convert the damage a client committed into buffer-coordinate
/// rectangles, dropping empty ones.
///
/// Legacy `wl_surface.damage` rectangles arrive in surface coordinates;
/// the headless output never applies a transform, so scaling by the
/// buffer scale is sufficient.
pub fn buffer_damage(damage: &[Damage], buffer_scale: i32) -> Vec<Rectangle<i32, Buffer>> {
    damage
        .iter()
        .filter_map(|entry| {
            let rect = match entry {
                Damage::Buffer(rect) => *rect,
                Damage::Surface(rect) => Rectangle::new(
                    (rect.loc.x * buffer_scale, rect.loc.y * buffer_scale).into(),
                    (rect.size.w * buffer_scale, rect.size.h * buffer_scale).into(),
                ),
            };
            (rect.size.w > 0 && rect.size.h > 0).then_some(rect)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wids_are_strictly_increasing_from_one() {
        let mut wids = WidAllocator::default();
        assert_eq!(wids.next_wid(), 1);
        assert_eq!(wids.next_wid(), 2);
        assert_eq!(wids.next_wid(), 3);
    }

    #[test]
    fn buffer_damage_keeps_buffer_rects() {
        let damage = vec![Damage::Buffer(Rectangle::new((0, 0).into(), (4, 2).into()))];
        let rects = buffer_damage(&damage, 1);
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].size.w, 4);
        assert_eq!(rects[0].size.h, 2);
    }

    #[test]
    fn buffer_damage_scales_surface_rects() {
        let damage = vec![Damage::Surface(Rectangle::new((1, 1).into(), (2, 3).into()))];
        let rects = buffer_damage(&damage, 2);
        assert_eq!(rects[0].loc.x, 2);
        assert_eq!(rects[0].loc.y, 2);
        assert_eq!(rects[0].size.w, 4);
        assert_eq!(rects[0].size.h, 6);
    }

    #[test]
    fn buffer_damage_drops_empty_rects() {
        let damage = vec![
            Damage::Buffer(Rectangle::new((0, 0).into(), (0, 5).into())),
            Damage::Buffer(Rectangle::new((0, 0).into(), (5, 5).into())),
        ];
        assert_eq!(buffer_damage(&damage, 1).len(), 1);
    }
}
