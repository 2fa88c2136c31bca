use chrono::{DateTime, Local, TimeZone};

/// Formatte une heure locale au format court d'un toast (`14:05`).
pub fn fmt_clock<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M").to_string()
}

/// Horodatage par défaut d'un message sans `timestamp`.
#[must_use]
pub fn local_clock() -> String {
    fmt_clock(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::fmt_clock;
    use chrono::{TimeZone, Utc};

    #[test]
    fn clock_is_zero_padded() {
        let at = match Utc.with_ymd_and_hms(2024, 3, 9, 7, 4, 59).single() {
            Some(at) => at,
            None => panic!("ambiguous test timestamp"),
        };
        assert_eq!(fmt_clock(&at), "07:04");
    }
}
