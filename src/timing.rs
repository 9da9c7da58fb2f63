use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Car,
    Bike,
    Walking,
    Transit,
}

impl TravelMode {
    pub const ALL: [TravelMode; 4] = [Self::Car, Self::Bike, Self::Walking, Self::Transit];

    /// Average speed in km/h.
    pub const fn speed_kmh(self) -> f64 {
        match self {
            Self::Car => 50.0,
            Self::Bike => 20.0,
            Self::Walking => 5.0,
            Self::Transit => 30.0,
        }
    }

    pub fn speed_mps(self) -> f64 {
        self.speed_kmh() / 3.6
    }

    /// Seconds needed to cover `distance_meters` at the mode's average speed.
    pub fn duration_seconds(self, distance_meters: f64) -> f64 {
        // 50 km by car must come out as exactly 3600 s.
        distance_meters * 3.6 / self.speed_kmh()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelTimes {
    pub car: String,
    pub bike: String,
    pub walking: String,
    pub transit: String,
}

impl TravelTimes {
    pub fn get(&self, mode: TravelMode) -> &str {
        match mode {
            TravelMode::Car => &self.car,
            TravelMode::Bike => &self.bike,
            TravelMode::Walking => &self.walking,
            TravelMode::Transit => &self.transit,
        }
    }
}

pub fn estimate_times(distance_meters: f64) -> TravelTimes {
    let format = |mode: TravelMode| format_duration(mode.duration_seconds(distance_meters));
    TravelTimes {
        car: format(TravelMode::Car),
        bike: format(TravelMode::Bike),
        walking: format(TravelMode::Walking),
        transit: format(TravelMode::Transit),
    }
}

/// `"{h}h {m}m"` from one hour up, `"{m}m"` below. Both parts are floored;
/// negative or NaN input renders as `"0m"`.
pub fn format_duration(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_is_zero_minutes_everywhere() {
        let times = estimate_times(0.0);
        for mode in TravelMode::ALL {
            assert_eq!(times.get(mode), "0m");
        }
    }

    #[test]
    fn fifty_kilometers_by_car_is_one_hour() {
        let times = estimate_times(50_000.0);
        assert_eq!(times.car, "1h 0m");
        assert_eq!(times.transit, "1h 40m");
        assert_eq!(times.bike, "2h 30m");
        assert_eq!(times.walking, "10h 0m");
    }

    #[test]
    fn hour_boundary() {
        assert_eq!(format_duration(3599.0), "59m");
        assert_eq!(format_duration(3600.0), "1h 0m");
        assert_eq!(format_duration(3659.9), "1h 0m");
        assert_eq!(format_duration(3660.0), "1h 1m");
    }

    #[test]
    fn minutes_are_floored() {
        assert_eq!(format_duration(59.9), "0m");
        assert_eq!(format_duration(119.0), "1m");
        assert_eq!(format_duration(7_199.0), "1h 59m");
    }

    #[test]
    fn degenerate_seconds() {
        assert_eq!(format_duration(-10.0), "0m");
        assert_eq!(format_duration(f64::NAN), "0m");
    }

    #[test]
    fn speeds_match_their_rounded_mps_values() {
        assert!((TravelMode::Car.speed_mps() - 13.8889).abs() < 1e-4);
        assert!((TravelMode::Bike.speed_mps() - 5.5556).abs() < 1e-4);
        assert!((TravelMode::Walking.speed_mps() - 1.3889).abs() < 1e-4);
        assert!((TravelMode::Transit.speed_mps() - 8.3333).abs() < 1e-4);
    }

    #[test]
    fn monotonic_in_distance() {
        let mut previous = [0.0f64; 4];
        for step in 0..500 {
            let distance = step as f64 * 731.3;
            for (i, mode) in TravelMode::ALL.into_iter().enumerate() {
                let seconds = mode.duration_seconds(distance);
                assert!(seconds >= previous[i]);
                previous[i] = seconds;
            }
            let times = estimate_times(distance);
            let next = estimate_times(distance + 731.3);
            for mode in TravelMode::ALL {
                assert!(minutes(next.get(mode)) >= minutes(times.get(mode)));
            }
        }
    }

    fn minutes(rendered: &str) -> u64 {
        match rendered.split_once("h ") {
            Some((h, m)) => h.parse::<u64>().unwrap() * 60 + m.trim_end_matches('m').parse::<u64>().unwrap(),
            None => rendered.trim_end_matches('m').parse().unwrap(),
        }
    }
}
