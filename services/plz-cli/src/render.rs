use plz_lookup::SearchState;
use std::fmt::Write as _;

/// Plain-text rendering of the form for the terminal session.
pub(crate) fn describe(state: &SearchState) -> String {
    let mut out = String::new();

    writeln!(out, "Locality: {}", state.locality_text()).expect("write locality");
    if !state.locality_error().is_empty() {
        writeln!(out, "  ! {}", state.locality_error()).expect("write locality error");
    }

    if state.is_showing_dropdown() {
        writeln!(out, "PLZ: choose one of {}", state.candidates().join(", "))
            .expect("write candidates");
    } else {
        writeln!(out, "PLZ: {}", state.postal_code_text()).expect("write postal code");
    }
    if !state.postal_code_error().is_empty() {
        writeln!(out, "  ! {}", state.postal_code_error()).expect("write postal code error");
    }

    if state.is_loading() {
        writeln!(out, "Loading data...").expect("write loading");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use plz_lookup::directory::RegionRef;
    use plz_lookup::lookup::{LookupDirection, LookupEvent};
    use plz_lookup::LocalityRecord;

    fn record(postal_code: &str) -> LocalityRecord {
        LocalityRecord {
            postal_code: postal_code.to_string(),
            name: "Berlin".to_string(),
            municipality: RegionRef {
                key: "11000000".to_string(),
                name: "Berlin".to_string(),
            },
            federal_state: RegionRef {
                key: "11".to_string(),
                name: "Berlin".to_string(),
            },
        }
    }

    #[test]
    fn lists_candidates_when_dropdown_is_open() {
        let mut state = SearchState::default();
        state.apply(LookupEvent::LocalityEdited("Berlin".into()));
        state.apply(LookupEvent::RequestStarted(LookupDirection::Locality));
        state.apply(LookupEvent::LocalitiesResolved(vec![record("14195"), record("10115")]));

        let text = describe(&state);
        assert!(text.contains("Locality: Berlin"));
        assert!(text.contains("PLZ: choose one of 10115, 14195"));
        assert!(!text.contains("Loading"));
    }

    #[test]
    fn shows_errors_and_loading() {
        let mut state = SearchState::default();
        state.apply(LookupEvent::PostalCodeEdited("00000".into()));
        state.apply(LookupEvent::RequestStarted(LookupDirection::Locality));
        state.apply(LookupEvent::RequestStarted(LookupDirection::PostalCode));
        state.apply(LookupEvent::PostalCodesResolved(Vec::new()));

        let text = describe(&state);
        assert!(text.contains("PLZ: 00000"));
        assert!(text.contains("  ! Postleitzahl nicht vorhanden."));
        assert!(text.contains("Loading data..."));
    }
}
