//! Synthetic pointer injection into the compositor seat

use smithay::backend::input::{Axis, AxisSource, ButtonState};
use smithay::input::pointer::{AxisFrame, ButtonEvent, MotionEvent, PointerHandle};
use smithay::input::Seat;
use smithay::utils::SERIAL_COUNTER;

use crate::compositor::Compositor;

/// Virtual pointer bound to the compositor seat.
#[derive(Clone)]
pub struct Pointer {
    handle: PointerHandle<Compositor>,
}

impl Pointer {
    pub fn new(seat: &Seat<Compositor>) -> Result<Self, Box<dyn std::error::Error>> {
        let handle = seat
            .get_pointer()
            .ok_or("Cannot create pointer device: seat has no pointer")?;
        Ok(Self { handle })
    }

    /// Move the pointer to an absolute position in output coordinates.
    /// Pointer focus follows the surface under the new position.
    pub fn motion(&self, state: &mut Compositor, x: f64, y: f64) {
        let serial = SERIAL_COUNTER.next_serial();
        let time = state.time_ms();
        let under = state.surface_under((x, y).into());
        self.handle.motion(
            state,
            under,
            &MotionEvent {
                location: (x, y).into(),
                serial,
                time,
            },
        );
        self.handle.frame(state);
    }

    /// Inject a button press or release. `button` is a linux input event
    /// code (e.g. 0x110 for BTN_LEFT).
    pub fn button(&self, state: &mut Compositor, button: u32, pressed: bool) {
        let serial = SERIAL_COUNTER.next_serial();
        let time = state.time_ms();
        let button_state = if pressed {
            ButtonState::Pressed
        } else {
            ButtonState::Released
        };
        self.handle.button(
            state,
            &ButtonEvent {
                button,
                state: button_state,
                serial,
                time,
            },
        );
        self.handle.frame(state);
    }

    /// Inject a scroll-wheel frame.
    pub fn scroll(&self, state: &mut Compositor, dx: f64, dy: f64) {
        let time = state.time_ms();
        let mut frame = AxisFrame::new(time).source(AxisSource::Wheel);
        if dx != 0.0 {
            frame = frame.value(Axis::Horizontal, dx);
        }
        if dy != 0.0 {
            frame = frame.value(Axis::Vertical, dy);
        }
        self.handle.axis(state, frame);
        self.handle.frame(state);
    }
}
