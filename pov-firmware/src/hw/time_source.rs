//! Boot time source.
//!
//! Integration point for the network time collaborator: a real
//! deployment replaces this with a client that blocks (retrying with
//! backoff) until a wall-clock time is fetched. Until then the display
//! shows elapsed time since power-on.

use pov_core::clock::{TimeOfDay, TimeSource};

pub struct BootTimeSource;

impl TimeSource for BootTimeSource {
    fn fetch(&mut self) -> TimeOfDay {
        TimeOfDay::default()
    }
}
