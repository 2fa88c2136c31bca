use std::time::Duration;

use humantime::{format_duration, parse_duration};
use serde::Deserialize;
use serde_with::{DeserializeAs, SerializeAs};

/// Duration written either as a humantime string (`"1.5s"`) or as bare
/// milliseconds (`1500`).
pub(super) struct HumantimeDuration;

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Millis(u64),
    Text(String),
}

pub(super) fn parse_delay(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if let Ok(millis) = raw.parse::<u64>() {
        return Ok(Duration::from_millis(millis));
    }
    parse_duration(raw).map_err(|err| err.to_string())
}

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Millis(millis) => Ok(Duration::from_millis(millis)),
            Repr::Text(raw) => parse_delay(&raw).map_err(serde::de::Error::custom),
        }
    }
}

impl SerializeAs<Duration> for HumantimeDuration {
    fn serialize_as<S>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format_duration(*value).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::HumantimeDuration;
    use serde::Deserialize;
    use serde_with::serde_as;
    use std::time::Duration;

    #[serde_as]
    #[derive(Deserialize)]
    struct Sample {
        #[serde_as(as = "Option<HumantimeDuration>")]
        delay: Option<Duration>,
    }

    fn parse(json: &str) -> Sample {
        match serde_json::from_str(json) {
            Ok(value) => value,
            Err(err) => panic!("failed to parse sample json {json}: {err}"),
        }
    }

    #[test]
    fn humantime_duration_parses_strings() {
        assert_eq!(parse(r#"{"delay":"1.5s"}"#).delay, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn bare_numbers_are_milliseconds() {
        assert_eq!(parse(r#"{"delay":300}"#).delay, Some(Duration::from_millis(300)));
        assert_eq!(parse(r#"{"delay":"0"}"#).delay, Some(Duration::ZERO));
    }
}
