use serde::{Deserialize, Serialize};

use crate::events::{Dispatcher, Routed, Subscription};
use crate::rng::SeededRng;

/// Fallback weather duration in seconds.
pub const DEFAULT_WEATHER_DURATION: f32 = 300.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// The season after this one; Winter wraps back to Spring.
    pub fn next(self) -> Season {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
            Season::Fall => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Fall => 2,
            Season::Winter => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Hot,
    Windy,
    Snowy,
    Stormy,
}

impl Weather {
    /// Candidate weather for a season. Sunny and cloudy are always possible.
    pub fn options(season: Season) -> &'static [Weather] {
        match season {
            Season::Spring => &[Weather::Sunny, Weather::Cloudy, Weather::Rainy],
            Season::Summer => &[Weather::Sunny, Weather::Cloudy, Weather::Hot],
            Season::Fall => &[
                Weather::Sunny,
                Weather::Cloudy,
                Weather::Windy,
                Weather::Rainy,
            ],
            Season::Winter => &[
                Weather::Sunny,
                Weather::Cloudy,
                Weather::Snowy,
                Weather::Stormy,
            ],
        }
    }

    /// How long this weather lasts once it sets in, in seconds.
    pub fn duration(self) -> f32 {
        match self {
            Weather::Sunny => 300.0,
            Weather::Cloudy => 240.0,
            Weather::Rainy => 180.0,
            Weather::Hot => 360.0,
            Weather::Windy => 120.0,
            Weather::Snowy => 300.0,
            Weather::Stormy => 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimeEvent {
    DayChanged { day: u32, season: Season },
    SeasonChanged { season: Season },
    WeatherChanged { weather: Weather },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeEventKind {
    DayChanged,
    SeasonChanged,
    WeatherChanged,
}

impl Routed for TimeEvent {
    type Kind = TimeEventKind;

    fn kind(&self) -> TimeEventKind {
        match self {
            TimeEvent::DayChanged { .. } => TimeEventKind::DayChanged,
            TimeEvent::SeasonChanged { .. } => TimeEventKind::SeasonChanged,
            TimeEvent::WeatherChanged { .. } => TimeEventKind::WeatherChanged,
        }
    }
}

/// Length of the in-game calendar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub seconds_per_day: f32,
    pub days_per_season: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            seconds_per_day: 360.0,
            days_per_season: 6,
        }
    }
}

/// Day, season, and weather progression.
///
/// Listeners registered with [`WorldClock::subscribe`] are notified
/// synchronously during `update`; the same events are also returned so the
/// caller can forward them without holding closures.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorldClock {
    calendar: CalendarConfig,
    day: u32,
    season: Season,
    seconds_in_day: f32,
    total_days: u32,
    weather: Weather,
    weather_timer: f32,
    weather_duration: f32,
    #[serde(skip)]
    listeners: Dispatcher<TimeEvent>,
}

impl WorldClock {
    pub fn new(calendar: CalendarConfig) -> Self {
        Self {
            calendar,
            day: 1,
            season: Season::Spring,
            seconds_in_day: 0.0,
            total_days: 0,
            weather: Weather::Sunny,
            weather_timer: 0.0,
            weather_duration: Weather::Sunny.duration(),
            listeners: Dispatcher::new(),
        }
    }

    pub fn update(&mut self, dt: f32, rng: &mut SeededRng) -> Vec<TimeEvent> {
        let mut events = Vec::new();

        self.seconds_in_day += dt;
        if self.seconds_in_day >= self.calendar.seconds_per_day {
            self.next_day(&mut events);
        }

        self.weather_timer += dt;
        if self.weather_timer >= self.weather_duration {
            self.roll_weather(rng, &mut events);
        }

        for event in &events {
            self.listeners.emit(event);
        }
        events
    }

    fn next_day(&mut self, events: &mut Vec<TimeEvent>) {
        self.day += 1;
        self.total_days += 1;
        self.seconds_in_day = 0.0;

        if self.day > self.calendar.days_per_season {
            self.season = self.season.next();
            self.day = 1;
            tracing::info!(season = self.season.name(), "season changed");
            events.push(TimeEvent::SeasonChanged {
                season: self.season,
            });
        }

        tracing::debug!(day = self.day, season = self.season.name(), "day changed");
        events.push(TimeEvent::DayChanged {
            day: self.day,
            season: self.season,
        });
    }

    fn roll_weather(&mut self, rng: &mut SeededRng, events: &mut Vec<TimeEvent>) {
        let next = rng
            .choice(Weather::options(self.season))
            .copied()
            .unwrap_or(Weather::Sunny);
        self.weather_timer = 0.0;
        self.weather_duration = next.duration();
        if next != self.weather {
            self.weather = next;
            tracing::debug!(weather = ?next, "weather changed");
            events.push(TimeEvent::WeatherChanged { weather: next });
        }
    }

    pub fn subscribe(
        &mut self,
        kind: TimeEventKind,
        listener: impl FnMut(&TimeEvent) + 'static,
    ) -> Subscription {
        self.listeners.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, handle: Subscription) -> bool {
        self.listeners.unsubscribe(handle)
    }

    pub fn calendar(&self) -> CalendarConfig {
        self.calendar
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    pub fn seconds_in_day(&self) -> f32 {
        self.seconds_in_day
    }

    /// Fraction of the current day elapsed, 0 at dawn.
    pub fn time_of_day(&self) -> f32 {
        self.seconds_in_day / self.calendar.seconds_per_day
    }

    pub fn day_progress(&self) -> f32 {
        self.time_of_day()
    }

    pub fn season_progress(&self) -> f32 {
        (self.day - 1) as f32 / self.calendar.days_per_season as f32
    }

    /// Days elapsed over the whole four-season year, capped at 1.
    pub fn total_progress(&self) -> f32 {
        let year = (Season::ALL.len() as u32 * self.calendar.days_per_season) as f32;
        (self.total_days as f32 / year).min(1.0)
    }

    pub fn is_winter(&self) -> bool {
        self.season == Season::Winter
    }

    /// The final day of winter. Reaching it wins the game.
    pub fn is_last_day(&self) -> bool {
        self.season == Season::Winter && self.day == self.calendar.days_per_season
    }

    /// "HH:MM" on a 24-hour dial.
    pub fn clock_string(&self) -> String {
        let frac = self.time_of_day();
        let hours = (frac * 24.0).floor() as u32;
        let minutes = ((frac * 24.0 * 60.0) % 60.0).floor() as u32;
        format!("{hours:02}:{minutes:02}")
    }

    /// Jump to a saved calendar position. Out-of-range values are clamped.
    pub fn restore(&mut self, season: Season, day: u32, weather: Weather, time_of_day: f32) {
        self.season = season;
        self.day = day.clamp(1, self.calendar.days_per_season);
        self.weather = weather;
        self.weather_timer = 0.0;
        self.weather_duration = weather.duration();
        self.seconds_in_day = time_of_day.clamp(0.0, 1.0) * self.calendar.seconds_per_day;
        self.total_days =
            season.index() as u32 * self.calendar.days_per_season + (self.day - 1);
    }

    /// Back to dawn on the first day of spring. Listeners are kept.
    pub fn reset(&mut self) {
        self.day = 1;
        self.season = Season::Spring;
        self.seconds_in_day = 0.0;
        self.total_days = 0;
        self.weather = Weather::Sunny;
        self.weather_timer = 0.0;
        self.weather_duration = Weather::Sunny.duration();
    }
}

impl Default for WorldClock {
    fn default() -> Self {
        Self::new(CalendarConfig::default())
    }
}
