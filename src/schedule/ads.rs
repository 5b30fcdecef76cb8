//! Advertisement time shifting
//!
//! When a looping program is re-anchored from its authored start to a new
//! start on the window timeline, every ad break moves by the same delta.

use crate::models::{Advertisement, EpochMillis, Program, ProviderDataError};

/// Shift every advertisement by `new_start - old_start`
///
/// No clamping is applied against the owning program's bounds. Shifting by
/// `delta` and then by `-delta` returns the original list.
pub fn shift_advertisements(
    ads: &[Advertisement],
    old_start: EpochMillis,
    new_start: EpochMillis,
) -> Vec<Advertisement> {
    let delta = new_start.wrapping_sub(old_start);
    ads.iter()
        .map(|ad| Advertisement {
            start_ms: ad.start_ms.wrapping_add(delta),
            stop_ms: ad.stop_ms.wrapping_add(delta),
            ..ad.clone()
        })
        .collect()
}

/// Re-encode a program's provider data with its ads shifted
///
/// Programs without a blob, or with a zero delta, come back unchanged.
pub fn shift_program_ads(
    program: &Program,
    old_start: EpochMillis,
    new_start: EpochMillis,
) -> Result<Option<String>, ProviderDataError> {
    let Some(mut data) = program.decode_provider_data()? else {
        return Ok(None);
    };
    if old_start == new_start || data.ads.is_empty() {
        return Ok(program.provider_data.clone());
    }

    data.ads = shift_advertisements(&data.ads, old_start, new_start);
    Ok(Some(data.encode()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderData;

    #[test]
    fn test_shift_moves_both_bounds() {
        let ads = vec![Advertisement::new(100, 200, "http://ads/1")];
        let shifted = shift_advertisements(&ads, 0, 1000);

        assert_eq!(shifted[0].start_ms, 1100);
        assert_eq!(shifted[0].stop_ms, 1200);
        assert_eq!(shifted[0].request_url, "http://ads/1");
    }

    #[test]
    fn test_shift_backwards() {
        let ads = vec![Advertisement::new(5000, 6000, "u")];
        let shifted = shift_advertisements(&ads, 4000, 1000);
        assert_eq!(shifted[0].start_ms, 2000);
        assert_eq!(shifted[0].stop_ms, 3000);
    }

    #[test]
    fn test_round_trip() {
        let ads = vec![
            Advertisement::new(0, 10, "a"),
            Advertisement::new(20, 30, "b"),
        ];
        let there = shift_advertisements(&ads, 7, 12_345);
        let back = shift_advertisements(&there, 12_345, 7);
        assert_eq!(back, ads);
    }

    #[test]
    fn test_program_without_blob() {
        let p = Program::new("News", 0, 100);
        assert_eq!(shift_program_ads(&p, 0, 500).unwrap(), None);
    }

    #[test]
    fn test_program_blob_is_rewritten() {
        let data = ProviderData {
            ads: vec![Advertisement::new(10, 20, "u")],
            ..Default::default()
        };
        let mut p = Program::new("News", 0, 100);
        p.provider_data = Some(data.encode().unwrap());

        let blob = shift_program_ads(&p, 0, 1000).unwrap().unwrap();
        let decoded = ProviderData::decode(&blob).unwrap();
        assert_eq!(decoded.ads[0].start_ms, 1010);
        assert_eq!(decoded.ads[0].stop_ms, 1020);
    }

    #[test]
    fn test_shift_keeps_provider_ad_keys() {
        let mut p = Program::new("News", 0, 100);
        p.provider_data = Some(
            r#"{"ads":[{"start_ms":10,"stop_ms":20,"tracking":{"id":7}}],"videoUrl":"v"}"#
                .to_string(),
        );

        let blob = shift_program_ads(&p, 0, 1000).unwrap().unwrap();
        let decoded = ProviderData::decode(&blob).unwrap();
        assert_eq!(decoded.ads[0].start_ms, 1010);
        assert_eq!(
            decoded.ads[0].custom.get("tracking"),
            Some(&serde_json::json!({"id": 7}))
        );
        assert!(decoded.custom.contains_key("videoUrl"));
    }

    #[test]
    fn test_program_malformed_blob() {
        let mut p = Program::new("News", 0, 100);
        p.provider_data = Some("[1,2".to_string());
        assert!(shift_program_ads(&p, 0, 1000).is_err());
    }
}
