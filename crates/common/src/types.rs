//! Domain types shared across ecowatter.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

// ── Credential ────────────────────────────────────────────────────────

/// A bearer credential obtained from the OAuth token endpoint.
///
/// Replaced wholesale on every successful renewal. Staleness is judged
/// against a configured lifetime, never against `expires_in_secs`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime reported by the server. Informational only.
    pub expires_in_secs: i64,
    pub obtained_at: DateTime<Utc>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in_secs", &self.expires_in_secs)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

impl Credential {
    /// Value for the `Authorization` header: `"<token_type> <access_token>"`.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// True once more than `lifetime_secs` have elapsed since acquisition.
    ///
    /// A credential stamped in the future (clock skew) is treated as fresh.
    pub fn is_stale_at(&self, now: DateTime<Utc>, lifetime_secs: u64) -> bool {
        match (now - self.obtained_at).to_std() {
            Ok(age) => age > std::time::Duration::from_secs(lifetime_secs),
            Err(_) => false,
        }
    }
}

// ── Signals ───────────────────────────────────────────────────────────

/// One per-time-slot detail value. Serialized as `{pas, hvalue}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotValue {
    #[serde(rename = "pas")]
    pub time_slot: i32,
    #[serde(rename = "hvalue")]
    pub value: i32,
}

/// One day's electricity-stress forecast.
///
/// Field names on the wire follow the upstream Ecowatt schema so the query
/// surface re-emits exactly what RTE publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "GenerationFichier")]
    pub generated_at: DateTime<FixedOffset>,
    #[serde(rename = "jour")]
    pub day: DateTime<FixedOffset>,
    /// Overall risk level for the day (`dvalue`).
    #[serde(rename = "dvalue")]
    pub risk_level: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub values: Vec<SlotValue>,
}

/// Wrapper object returned by `GET <base>/signals`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalsResponse {
    pub signals: Vec<Signal>,
}

/// An immutable set of signals, ascending by `day`.
///
/// The only way to build one from fetched data is [`SignalSet::from_unsorted`],
/// which sorts, so positional lookups can rely on the ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SignalSet(Vec<Signal>);

impl SignalSet {
    pub fn from_unsorted(mut signals: Vec<Signal>) -> Self {
        signals.sort_by_key(|s| s.day);
        Self(signals)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Signal> {
        self.0.get(index)
    }

    pub fn as_slice(&self) -> &[Signal] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Signal> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(raw: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(raw).expect("valid rfc3339")
    }

    fn signal_on(raw_day: &str, risk_level: i32) -> Signal {
        Signal {
            generated_at: day("2022-06-03T00:00:00+02:00"),
            day: day(raw_day),
            risk_level,
            message: String::new(),
            values: Vec::new(),
        }
    }

    fn credential_obtained(obtained_at: DateTime<Utc>) -> Credential {
        Credential {
            access_token: "abc".into(),
            token_type: "Bearer".into(),
            expires_in_secs: 7200,
            obtained_at,
        }
    }

    #[test]
    fn test_deserialize_upstream_signals() {
        let raw = r#"{
            "signals": [
                {
                    "GenerationFichier": "2022-06-03T00:00:00+02:00",
                    "jour": "2022-06-06T00:00:00+02:00",
                    "dvalue": 2,
                    "message": "Risque de coupures d'électricité.",
                    "values": [{"pas": 0, "hvalue": 1}, {"pas": 1, "hvalue": 3}]
                }
            ]
        }"#;

        let parsed: SignalsResponse = serde_json::from_str(raw).expect("should deserialize");

        assert_eq!(parsed.signals.len(), 1);
        let s = &parsed.signals[0];
        assert_eq!(s.risk_level, 2);
        assert_eq!(s.day, day("2022-06-06T00:00:00+02:00"));
        assert_eq!(s.values[1], SlotValue { time_slot: 1, value: 3 });
    }

    #[test]
    fn test_signals_field_is_required() {
        assert!(serde_json::from_str::<SignalsResponse>(r#"{"error":"quota"}"#).is_err());

        let empty: SignalsResponse =
            serde_json::from_str(r#"{"signals":[]}"#).expect("explicit empty list");
        assert!(empty.signals.is_empty());
    }

    #[test]
    fn test_signal_reserializes_with_upstream_names() {
        let json = serde_json::to_value(signal_on("2022-06-06T00:00:00+02:00", 1))
            .expect("should serialize");

        assert_eq!(json["jour"], "2022-06-06T00:00:00+02:00");
        assert_eq!(json["dvalue"], 1);
        assert!(json.get("GenerationFichier").is_some());
    }

    #[test]
    fn test_from_unsorted_sorts_by_day() {
        let set = SignalSet::from_unsorted(vec![
            signal_on("2022-06-08T00:00:00+02:00", 3),
            signal_on("2022-06-06T00:00:00+02:00", 1),
            signal_on("2022-06-07T00:00:00+02:00", 2),
            signal_on("2022-06-09T00:00:00+02:00", 1),
        ]);

        let levels: Vec<i32> = set.iter().map(|s| s.risk_level).collect();
        assert_eq!(levels, vec![1, 2, 3, 1]);
        assert!(set.as_slice().windows(2).all(|w| w[0].day <= w[1].day));
    }

    #[test]
    fn test_sort_compares_instants_across_offsets() {
        // 23:00 UTC on the 5th is earlier than 00:30 +02:00 on the 6th (22:30 UTC).
        let set = SignalSet::from_unsorted(vec![
            signal_on("2022-06-05T23:00:00+00:00", 1),
            signal_on("2022-06-06T00:30:00+02:00", 2),
        ]);

        assert_eq!(set.get(0).map(|s| s.risk_level), Some(2));
    }

    #[test]
    fn test_authorization_header() {
        let cred = credential_obtained(Utc::now());
        assert_eq!(cred.authorization_header(), "Bearer abc");
    }

    #[test]
    fn test_credential_debug_redacts_token() {
        let cred = credential_obtained(Utc::now());
        let rendered = format!("{:?}", cred);
        assert!(!rendered.contains("abc"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_staleness_uses_configured_lifetime() {
        let now = Utc::now();
        let cred = credential_obtained(now - chrono::Duration::seconds(100));

        assert!(!cred.is_stale_at(now, 100));
        assert!(cred.is_stale_at(now, 99));
        // Server-reported expires_in (7200) plays no part.
        assert!(cred.is_stale_at(now, 10));
    }

    #[test]
    fn test_future_stamped_credential_is_fresh() {
        let now = Utc::now();
        let cred = credential_obtained(now + chrono::Duration::seconds(30));
        assert!(!cred.is_stale_at(now, 0));
    }
}
