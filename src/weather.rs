//! Weather reading and WMO weather-code mapping.

/// Scalar weather fields used by the weather panel.
///
/// `temperature_c` is `None` when the weather source failed; the panel then
/// shows `ERR`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherReading {
    pub temperature_c: Option<f64>,
    pub weather_code: Option<u8>,
    pub precip_probability: Option<f64>,
    pub precip_sum_mm: Option<f64>,
}

impl WeatherReading {
    pub fn kind(&self) -> WeatherKind {
        self.weather_code
            .map(WeatherKind::from_wmo)
            .unwrap_or(WeatherKind::Unknown)
    }

    pub fn temperature_label(&self) -> String {
        match self.temperature_c {
            Some(t) => format!("{}°", t.round() as i64),
            None => "ERR".to_string(),
        }
    }

    /// `"40% · 2.5 mm"`, or whatever part is known.
    pub fn precipitation_label(&self) -> String {
        let probability = self
            .precip_probability
            .map(|p| format!("{}%", p.round() as i64));
        let sum = self.precip_sum_mm.map(|mm| format!("{mm:.1} mm"));
        match (probability, sum) {
            (Some(p), Some(s)) => format!("{p} · {s}"),
            (Some(p), None) => p,
            (None, Some(s)) => s,
            (None, None) => "—".to_string(),
        }
    }
}

/// Condition groups of the WMO 4677 codes reported by Open-Meteo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherKind {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    FreezingRain,
    Snow,
    Showers,
    SnowShowers,
    Thunderstorm,
    Unknown,
}

impl WeatherKind {
    pub fn from_wmo(code: u8) -> Self {
        match code {
            0 => WeatherKind::Clear,
            1 | 2 => WeatherKind::PartlyCloudy,
            3 => WeatherKind::Overcast,
            45 | 48 => WeatherKind::Fog,
            51 | 53 | 55 => WeatherKind::Drizzle,
            56 | 57 | 66 | 67 => WeatherKind::FreezingRain,
            61 | 63 | 65 => WeatherKind::Rain,
            71 | 73 | 75 | 77 => WeatherKind::Snow,
            80..=82 => WeatherKind::Showers,
            85 | 86 => WeatherKind::SnowShowers,
            95 | 96 | 99 => WeatherKind::Thunderstorm,
            _ => WeatherKind::Unknown,
        }
    }

    /// File stem of the icon under the configured icon base URL.
    pub fn icon_name(self) -> &'static str {
        match self {
            WeatherKind::Clear => "clear-day",
            WeatherKind::PartlyCloudy => "partly-cloudy-day",
            WeatherKind::Overcast => "overcast",
            WeatherKind::Fog => "fog",
            WeatherKind::Drizzle => "drizzle",
            WeatherKind::Rain => "rain",
            WeatherKind::FreezingRain => "sleet",
            WeatherKind::Snow => "snow",
            WeatherKind::Showers => "showers",
            WeatherKind::SnowShowers => "snow-showers",
            WeatherKind::Thunderstorm => "thunderstorms",
            WeatherKind::Unknown => "not-available",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherKind::Clear => "Clear",
            WeatherKind::PartlyCloudy => "Partly cloudy",
            WeatherKind::Overcast => "Overcast",
            WeatherKind::Fog => "Fog",
            WeatherKind::Drizzle => "Drizzle",
            WeatherKind::Rain => "Rain",
            WeatherKind::FreezingRain => "Freezing rain",
            WeatherKind::Snow => "Snow",
            WeatherKind::Showers => "Showers",
            WeatherKind::SnowShowers => "Snow showers",
            WeatherKind::Thunderstorm => "Thunderstorm",
            WeatherKind::Unknown => "—",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wmo_codes_map_to_groups() {
        assert_eq!(WeatherKind::from_wmo(0), WeatherKind::Clear);
        assert_eq!(WeatherKind::from_wmo(2), WeatherKind::PartlyCloudy);
        assert_eq!(WeatherKind::from_wmo(63), WeatherKind::Rain);
        assert_eq!(WeatherKind::from_wmo(81), WeatherKind::Showers);
        assert_eq!(WeatherKind::from_wmo(99), WeatherKind::Thunderstorm);
        assert_eq!(WeatherKind::from_wmo(4), WeatherKind::Unknown);
    }

    #[test]
    fn failed_reading_shows_err() {
        let reading = WeatherReading::default();
        assert_eq!(reading.temperature_label(), "ERR");
        assert_eq!(reading.kind(), WeatherKind::Unknown);
        assert_eq!(reading.precipitation_label(), "—");
    }

    #[test]
    fn labels_round_values() {
        let reading = WeatherReading {
            temperature_c: Some(-0.4),
            weather_code: Some(61),
            precip_probability: Some(39.6),
            precip_sum_mm: Some(2.46),
        };
        assert_eq!(reading.temperature_label(), "0°");
        assert_eq!(reading.precipitation_label(), "40% · 2.5 mm");
        assert_eq!(reading.kind().icon_name(), "rain");
    }
}
