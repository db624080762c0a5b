// Copyright (c) 2026 0xAditya

//! Mount registry standing in for the page's frame scheduler and window events.
//!
//! Every effect is driven through [`Host`]: mounting registers its frame
//! callback plus the listeners it declares, and [`Host::unmount`] removes all of
//! them at once.

use std::time::Instant;

use crate::canvas::Canvas;

/// Host-level events an effect wants to hear about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Listen {
    pub resize: bool,
    pub pointer: bool,
}

pub trait Effect {
    fn name(&self) -> &'static str;

    fn listens(&self) -> Listen {
        Listen::default()
    }

    fn on_resize(&mut self, _cols: u16, _rows: u16) {}

    /// Pointer position in virtual pixels.
    fn on_pointer(&mut self, _px: f32, _py: f32) {}

    /// Advances the simulation by one frame.
    fn tick(&mut self, now: Instant);

    fn draw(&mut self, canvas: &mut Canvas);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId(u64);

#[derive(Default)]
pub struct Host {
    next_id: u64,
    effects: Vec<(MountId, Box<dyn Effect>)>,
    frame_callbacks: Vec<MountId>,
    resize_listeners: Vec<MountId>,
    pointer_listeners: Vec<MountId>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the effect's frame callback and listeners. Draw order follows mount order.
    pub fn mount(&mut self, effect: Box<dyn Effect>) -> MountId {
        let id = MountId(self.next_id);
        self.next_id += 1;

        let listen = effect.listens();
        tracing::debug!(effect = effect.name(), ?listen, "mount");
        if listen.resize {
            self.resize_listeners.push(id);
        }
        if listen.pointer {
            self.pointer_listeners.push(id);
        }
        self.frame_callbacks.push(id);
        self.effects.push((id, effect));
        id
    }

    /// Cancels the frame callback and removes every listener the effect added.
    pub fn unmount(&mut self, id: MountId) -> Option<Box<dyn Effect>> {
        self.frame_callbacks.retain(|m| *m != id);
        self.resize_listeners.retain(|m| *m != id);
        self.pointer_listeners.retain(|m| *m != id);

        let pos = self.effects.iter().position(|(m, _)| *m == id)?;
        let (_, effect) = self.effects.remove(pos);
        tracing::debug!(effect = effect.name(), "unmount");
        Some(effect)
    }

    pub fn unmount_all(&mut self) {
        let ids: Vec<MountId> = self.effects.iter().map(|(m, _)| *m).collect();
        for id in ids {
            self.unmount(id);
        }
    }

    pub fn scheduled_callbacks(&self) -> usize {
        self.frame_callbacks.len()
    }

    pub fn listener_count(&self) -> usize {
        self.resize_listeners.len() + self.pointer_listeners.len()
    }

    fn effect_mut(&mut self, id: MountId) -> Option<&mut Box<dyn Effect>> {
        self.effects
            .iter_mut()
            .find(|(m, _)| *m == id)
            .map(|(_, e)| e)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        for id in self.resize_listeners.clone() {
            if let Some(e) = self.effect_mut(id) {
                e.on_resize(cols, rows);
            }
        }
    }

    pub fn pointer(&mut self, px: f32, py: f32) {
        for id in self.pointer_listeners.clone() {
            if let Some(e) = self.effect_mut(id) {
                e.on_pointer(px, py);
            }
        }
    }

    /// Runs one frame: every mounted effect ticks, then draws in mount order.
    pub fn frame(&mut self, now: Instant, canvas: &mut Canvas) {
        for id in self.frame_callbacks.clone() {
            if let Some(e) = self.effect_mut(id) {
                e.tick(now);
                e.draw(canvas);
            }
        }
    }
}

/// Derives a per-effect seed so effects never share a random sequence.
pub fn derive_seed(master: u64, salt: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325 ^ master;
    for b in salt.bytes() {
        h ^= b as u64;
        h = h.wrapping_mul(0x0100_0000_01b3);
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::BLACK;

    struct Recorder {
        listen: Listen,
        ticks: usize,
    }

    impl Effect for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }
        fn listens(&self) -> Listen {
            self.listen
        }
        fn tick(&mut self, _now: Instant) {
            self.ticks += 1;
        }
        fn draw(&mut self, canvas: &mut Canvas) {
            canvas.put(0, 0, 'p', BLACK, false);
        }
    }

    #[test]
    fn unmount_removes_callback_and_listeners() {
        let mut host = Host::new();
        let id = host.mount(Box::new(Recorder {
            listen: Listen {
                resize: true,
                pointer: true,
            },
            ticks: 0,
        }));
        assert_eq!(host.scheduled_callbacks(), 1);
        assert_eq!(host.listener_count(), 2);

        assert!(host.unmount(id).is_some());
        assert_eq!(host.scheduled_callbacks(), 0);
        assert_eq!(host.listener_count(), 0);
        assert!(host.unmount(id).is_none());
    }

    #[test]
    fn frame_draws_mounted_effects() {
        let mut host = Host::new();
        host.mount(Box::new(Recorder {
            listen: Listen::default(),
            ticks: 0,
        }));
        let mut canvas = Canvas::new(2, 1, BLACK);
        host.frame(Instant::now(), &mut canvas);
        assert_eq!(canvas.get(0, 0).map(|t| t.ch), Some('p'));
    }

    #[test]
    fn derived_seeds_differ_per_salt() {
        assert_ne!(derive_seed(7, "rain"), derive_seed(7, "globe"));
        assert_eq!(derive_seed(7, "rain"), derive_seed(7, "rain"));
    }
}
