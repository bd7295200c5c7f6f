pub mod clock;
pub mod events;
pub mod input;
pub mod powerup;
pub mod rng;
pub mod world_time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::input::{InputTracker, Key};
    use crate::rng::SeededRng;
    use crate::world_time::{TimeEvent, WorldClock};

    /// Fixed seed shared by tests that only need "some" deterministic stream.
    pub const TEST_SEED: u64 = 0x5EED;

    pub fn test_rng() -> SeededRng {
        SeededRng::new(TEST_SEED)
    }

    /// Press and immediately release `key`, leaving only the edge flags set.
    pub fn tap(input: &mut InputTracker, key: Key) {
        input.on_key_down(key);
        input.on_key_up(key);
    }

    /// Advance a world clock by `seconds` in `dt` steps, collecting every event.
    pub fn advance_clock(
        clock: &mut WorldClock,
        rng: &mut SeededRng,
        seconds: f32,
        dt: f32,
    ) -> Vec<TimeEvent> {
        let steps = (seconds / dt).round() as usize;
        let mut events = Vec::new();
        for _ in 0..steps {
            events.extend(clock.update(dt, rng));
        }
        events
    }

}
