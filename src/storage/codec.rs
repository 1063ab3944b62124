//! JSON codec for the stored aggregate.
//!
//! Every backend goes through these two functions so schema checks are
//! applied the same way regardless of where the text lives.

use crate::state::{StoredState, SCHEMA_VERSION};

use super::traits::StorageError;

/// Serializes the aggregate to JSON text.
pub fn encode_state(state: &StoredState) -> Result<String, StorageError> {
    serde_json::to_string(state).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parses JSON text into the aggregate, rejecting newer schema versions.
pub fn decode_state(text: &str) -> Result<StoredState, StorageError> {
    let state: StoredState =
        serde_json::from_str(text).map_err(|e| StorageError::Serialization(e.to_string()))?;
    check_schema(state.schema_version)?;
    Ok(state)
}

/// Fails if `version` was written by a newer build.
pub fn check_schema(version: u32) -> Result<(), StorageError> {
    if version > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedSchema {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::snapshot::Snapshot;

    #[test]
    fn test_round_trip() {
        let mut state = StoredState::initial(Utc::now());
        state.add_competitor("acme.com");
        let text = encode_state(&state).unwrap();
        assert_eq!(decode_state(&text).unwrap(), state);
    }

    #[test]
    fn test_fractional_ratings_survive_exactly() {
        let mut state = StoredState::initial(Utc::now());
        state.add_competitor("acme.com");
        state
            .competitor_mut("acme.com")
            .unwrap()
            .record_snapshot(Snapshot::empty("acme.com", Utc::now()));

        for i in (0..=99_991_u32).step_by(7) {
            let rating = 5.0 * f64::from(i) / 99_991.0;
            let competitor = state.competitor_mut("acme.com").unwrap();
            let mut snap = Snapshot::empty("acme.com", Utc::now());
            snap.gbp_data.rating = rating;
            competitor.record_snapshot(snap);

            let decoded = decode_state(&encode_state(&state).unwrap()).unwrap();
            let got = decoded.competitor("acme.com").unwrap().latest().unwrap();
            assert_eq!(got.gbp_data.rating.to_bits(), rating.to_bits(), "rating {rating}");
        }
    }

    #[test]
    fn test_future_schema_rejected() {
        let mut state = StoredState::initial(Utc::now());
        state.schema_version = SCHEMA_VERSION + 1;
        let text = encode_state(&state).unwrap();
        assert!(matches!(
            decode_state(&text),
            Err(StorageError::UnsupportedSchema { .. })
        ));
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        assert!(matches!(decode_state("{not json"), Err(StorageError::Serialization(_))));
    }
}
