use std::hash::{Hash, Hasher};

use nohash::{NoHash, NoHashMap};

// keyboard
// ----

/// Scancode is a hardware-generated code that corresponds to the physical key pressed on the
/// keyboard. It represents the physical location of the key regardless of the keyboard layout.
///
/// only the keys this program reacts to are listed; discriminants follow linux input event codes.
///
/// https://github.com/torvalds/linux/blob/231825b2e1ff6ba799c5eaf396d3ab2354e37c6b/include/uapi/linux/input-event-codes.h#L76
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Scancode {
    Esc        = 1,             // KEY_ESC               1
    Num1       = 2,             // KEY_1                 2
    Num2       = 3,             // KEY_2                 3
    ArrowLeft  = 105,           // KEY_LEFT              105
    ArrowRight = 106,           // KEY_RIGHT             106
}

impl Hash for Scancode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(*self as u32);
    }
}

impl NoHash for Scancode {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Clone)]
pub struct KeyboardEvent {
    pub state: KeyState,
    pub scancode: Scancode,
    /// true if this is a key repeat
    pub repeat: bool,
}

// states
// ----

// NOTE: button may have multiple states at the same time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StateFlags(u8);

impl StateFlags {
    pub const NONE: u8 = 0;
    pub const JUST_PRESSED: u8 = 1 << 0;
    pub const JUST_RELEASED: u8 = 1 << 1;
    pub const DOWN: u8 = 1 << 2;
    pub const REPEAT: u8 = 1 << 3;
}

// NOTE: this was originally inspired by bevy's ButtonInput thing.
#[derive(Debug)]
pub struct StateTracker<B>
where
    B: Copy + Eq + NoHash,
{
    map: NoHashMap<B, StateFlags>,
}

// @BlindDerive
impl<B> Default for StateTracker<B>
where
    B: Copy + Eq + NoHash,
{
    fn default() -> Self {
        Self {
            map: NoHashMap::default(),
        }
    }
}

impl<B> StateTracker<B>
where
    B: Copy + Eq + NoHash,
{
    pub fn clear_transient_flags(&mut self) {
        self.map.values_mut().for_each(|state| {
            state.0 &= !StateFlags::JUST_PRESSED;
            state.0 &= !StateFlags::JUST_RELEASED;
            state.0 &= !StateFlags::REPEAT;
        });
    }

    // ----

    pub fn press(&mut self, button: B, repeat: bool) {
        let state = self.map.entry(button).or_insert(StateFlags(StateFlags::NONE));
        state.0 = StateFlags::JUST_PRESSED | StateFlags::DOWN;
        if repeat {
            state.0 |= StateFlags::REPEAT
        }
    }

    pub fn release(&mut self, button: B) {
        let state = self.map.entry(button).or_insert(StateFlags(StateFlags::NONE));
        state.0 = StateFlags::JUST_RELEASED;
    }

    // just pressed

    pub fn just_pressed(&self, button: B) -> bool {
        self.map
            .get(&button)
            .is_some_and(|state| state.0 & StateFlags::JUST_PRESSED != 0)
    }

    // just released

    pub fn just_released(&self, button: B) -> bool {
        self.map
            .get(&button)
            .is_some_and(|state| state.0 & StateFlags::JUST_RELEASED != 0)
    }

    // down

    pub fn down(&self, button: B) -> bool {
        self.map
            .get(&button)
            .is_some_and(|state| state.0 & StateFlags::DOWN != 0)
    }
}

#[derive(Debug, Default)]
pub struct KeyboardState {
    pub scancodes: StateTracker<Scancode>,
}

impl KeyboardState {
    #[inline]
    pub fn clear_transient_flags(&mut self) {
        self.scancodes.clear_transient_flags();
    }

    #[inline]
    pub fn handle_event(&mut self, ev: KeyboardEvent) {
        match ev.state {
            KeyState::Pressed => self.scancodes.press(ev.scancode, ev.repeat),
            KeyState::Released => self.scancodes.release(ev.scancode),
        }
    }

    /// clears transient flags left from the previous frame, then applies `events` in order.
    pub fn handle_events(&mut self, events: impl IntoIterator<Item = KeyboardEvent>) {
        self.clear_transient_flags();
        for event in events {
            self.handle_event(event);
        }
    }

    #[inline]
    pub fn down(&self, scancode: Scancode) -> bool {
        self.scancodes.down(scancode)
    }
}
