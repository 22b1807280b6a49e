//! Synthetic keyboard injection into the compositor seat

use smithay::backend::input::KeyState;
use smithay::input::keyboard::{FilterResult, KeyboardHandle, XkbConfig};
use smithay::input::Seat;
use smithay::utils::SERIAL_COUNTER;
use log::debug;

use crate::compositor::Compositor;

/// Virtual keyboard bound to the compositor seat. The handle dispatches
/// back into the compositor state, so every injection takes `&mut
/// Compositor`.
#[derive(Clone)]
pub struct Keyboard {
    handle: KeyboardHandle<Compositor>,
}

impl Keyboard {
    pub fn new(seat: &Seat<Compositor>) -> Result<Self, Box<dyn std::error::Error>> {
        let handle = seat
            .get_keyboard()
            .ok_or("Cannot create keyboard device: seat has no keyboard")?;
        Ok(Self { handle })
    }

    /// Build and bind a keymap from XKB rule names.
    pub fn set_layout(
        &self,
        state: &mut Compositor,
        layout: &str,
        model: &str,
        variant: &str,
        options: Option<String>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let config = XkbConfig {
            rules: "",
            model,
            layout,
            variant,
            options,
        };
        self.handle
            .set_xkb_config(state, config)
            .map_err(|e| format!("Failed to build keymap for layout {:?}: {:?}", layout, e))?;
        Ok(())
    }

    /// Inject a key press or release, stamped with a millisecond
    /// timestamp measured from compositor start.
    pub fn press_key(&self, state: &mut Compositor, keycode: u32, pressed: bool) {
        let key_state = if pressed {
            KeyState::Pressed
        } else {
            KeyState::Released
        };
        let serial = SERIAL_COUNTER.next_serial();
        let time = state.time_ms();
        self.handle.input::<(), _>(
            state,
            keycode.into(),
            key_state,
            serial,
            time,
            |_, _, _| FilterResult::Forward,
        );
    }

    /// Configure key repeat from a delay and a per-repeat interval, both
    /// in milliseconds.
    pub fn set_repeat_rate(&self, delay_ms: i32, interval_ms: i32) {
        self.handle
            .change_repeat_info(repeat_rate(interval_ms), delay_ms);
    }

    /// The seat derives modifier state from injected key events; an
    /// explicit modifier push is only logged.
    pub fn update_modifiers(&self, depressed: u32, latched: u32, locked: u32, group: u32) {
        debug!(
            "modifier update requested: depressed={:#x} latched={:#x} locked={:#x} group={}",
            depressed, latched, locked, group
        );
    }

    /// Move keyboard focus to the toplevel with the given wid, or clear
    /// it with `None`.
    pub fn focus(&self, state: &mut Compositor, wid: Option<u64>) {
        let serial = SERIAL_COUNTER.next_serial();
        let surface = wid.and_then(|wid| {
            state
                .surfaces
                .find(wid)
                .map(|record| record.toplevel.wl_surface().clone())
        });
        self.handle.set_focus(state, surface, serial);
    }

    /// The virtual keyboard holds no autonomous key state.
    pub fn clear_keys_pressed(&self) {}

    pub fn keycodes_down(&self) -> Vec<u32> {
        Vec::new()
    }

    pub fn layout_group(&self) -> u32 {
        0
    }
}

/// Repeat rate in events per second for a per-repeat interval in ms.
fn repeat_rate(interval_ms: i32) -> i32 {
    if interval_ms > 0 {
        (1000 / interval_ms).max(1)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::repeat_rate;

    #[test]
    fn repeat_rate_from_interval() {
        assert_eq!(repeat_rate(25), 40);
        assert_eq!(repeat_rate(1000), 1);
        // Sub-millisecond-rate intervals still repeat at least once a second
        assert_eq!(repeat_rate(3000), 1);
    }

    #[test]
    fn zero_interval_disables_repeat() {
        assert_eq!(repeat_rate(0), 0);
        assert_eq!(repeat_rate(-5), 0);
    }
}
