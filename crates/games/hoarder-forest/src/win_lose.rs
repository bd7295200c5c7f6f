use serde::{Deserialize, Serialize};

use hoarder_core::world_time::WorldClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoseReason {
    Attack,
    Starvation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose(LoseReason),
}

/// Terminal check, first match wins: death, then the last day of winter,
/// then an empty pantry in winter.
pub fn evaluate(health: i32, clock: &WorldClock, pantry_food: u32) -> Option<Outcome> {
    if health <= 0 {
        return Some(Outcome::Lose(LoseReason::Attack));
    }
    if clock.is_last_day() {
        return Some(Outcome::Win);
    }
    if clock.is_winter() && pantry_food == 0 {
        return Some(Outcome::Lose(LoseReason::Starvation));
    }
    None
}

#[cfg(test)]
mod tests {
    use hoarder_core::world_time::{CalendarConfig, Season, Weather};

    use super::*;

    fn clock_at(season: Season, day: u32) -> WorldClock {
        let mut clock = WorldClock::new(CalendarConfig::default());
        clock.restore(season, day, Weather::Snowy, 0.0);
        clock
    }

    #[test]
    fn death_outranks_victory() {
        let clock = clock_at(Season::Winter, 6);
        assert!(clock.is_last_day());
        assert_eq!(evaluate(0, &clock, 10), Some(Outcome::Lose(LoseReason::Attack)));
    }

    #[test]
    fn last_day_wins_even_with_empty_pantry() {
        let clock = clock_at(Season::Winter, 6);
        assert_eq!(evaluate(3, &clock, 0), Some(Outcome::Win));
    }

    #[test]
    fn empty_pantry_starves_only_in_winter() {
        assert_eq!(
            evaluate(3, &clock_at(Season::Winter, 2), 0),
            Some(Outcome::Lose(LoseReason::Starvation))
        );
        assert_eq!(evaluate(3, &clock_at(Season::Fall, 6), 0), None);
        assert_eq!(evaluate(3, &clock_at(Season::Winter, 2), 1), None);
    }
}
