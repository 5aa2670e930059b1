use std::collections::BTreeSet;

use serde::Serialize;

use crate::directory::LocalityRecord;

pub const NO_LOCALITY_MESSAGE: &str = "Keine Ortschaft unter gegebenem Namen vorhanden.";
pub const NO_POSTAL_CODE_MESSAGE: &str = "Postleitzahl nicht vorhanden.";
pub const INVALID_POSTAL_CODE_MESSAGE: &str =
    "Gültige Postleitzahlen bestehen nur aus vier oder fünf Ziffern.";
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Adressdienst nicht erreichbar.";

/// The two independent lookups; each owns a debounce timer and a request slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupDirection {
    Locality,
    PostalCode,
}

impl LookupDirection {
    pub const ALL: [LookupDirection; 2] = [LookupDirection::Locality, LookupDirection::PostalCode];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Idle,
    ShowingDropdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupErrorKind {
    NoLocalityMatch,
    NoPostalCodeMatch,
    InvalidPostalCode,
    TransportFailure,
    /// Superseded request. Never reaches an error field.
    Cancelled,
}

impl LookupErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, LookupErrorKind::TransportFailure)
    }

    fn message(self) -> &'static str {
        match self {
            LookupErrorKind::NoLocalityMatch => NO_LOCALITY_MESSAGE,
            LookupErrorKind::NoPostalCodeMatch => NO_POSTAL_CODE_MESSAGE,
            LookupErrorKind::InvalidPostalCode => INVALID_POSTAL_CODE_MESSAGE,
            LookupErrorKind::TransportFailure => TRANSPORT_FAILURE_MESSAGE,
            LookupErrorKind::Cancelled => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub kind: LookupErrorKind,
    pub message: String,
}

impl FieldError {
    fn new(kind: LookupErrorKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooShort,
    DropdownActive,
}

/// Every way the search state can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupEvent {
    LocalityEdited(String),
    PostalCodeEdited(String),
    RequestStarted(LookupDirection),
    RequestCancelled(LookupDirection),
    LookupSkipped {
        direction: LookupDirection,
        reason: SkipReason,
    },
    PostalCodeMalformed,
    LocalitiesResolved(Vec<LocalityRecord>),
    PostalCodesResolved(Vec<LocalityRecord>),
    LookupFailed {
        direction: LookupDirection,
        kind: LookupErrorKind,
    },
    CandidateSelected(String),
}

/// Render-ready view of the form. Only [`SearchState::apply`] mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchState {
    locality_text: String,
    postal_code_text: String,
    candidates: Vec<String>,
    mode: Mode,
    locality_error: Option<FieldError>,
    postal_code_error: Option<FieldError>,
    is_loading: bool,
    #[serde(skip)]
    locality_in_flight: bool,
    #[serde(skip)]
    postal_code_in_flight: bool,
}

impl SearchState {
    pub fn locality_text(&self) -> &str {
        &self.locality_text
    }

    pub fn postal_code_text(&self) -> &str {
        &self.postal_code_text
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_showing_dropdown(&self) -> bool {
        self.mode == Mode::ShowingDropdown
    }

    pub fn locality_error(&self) -> &str {
        self.locality_error
            .as_ref()
            .map_or("", |error| error.message.as_str())
    }

    pub fn postal_code_error(&self) -> &str {
        self.postal_code_error
            .as_ref()
            .map_or("", |error| error.message.as_str())
    }

    pub fn error(&self, direction: LookupDirection) -> Option<&FieldError> {
        match direction {
            LookupDirection::Locality => self.locality_error.as_ref(),
            LookupDirection::PostalCode => self.postal_code_error.as_ref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_in_flight(&self, direction: LookupDirection) -> bool {
        match direction {
            LookupDirection::Locality => self.locality_in_flight,
            LookupDirection::PostalCode => self.postal_code_in_flight,
        }
    }

    pub fn text(&self, direction: LookupDirection) -> &str {
        match direction {
            LookupDirection::Locality => &self.locality_text,
            LookupDirection::PostalCode => &self.postal_code_text,
        }
    }

    /// Applies one event. Returns the direction whose pending lookup became
    /// obsolete: a field cross-filled from a result, or the postal code once
    /// the candidate list opens.
    pub fn apply(&mut self, event: LookupEvent) -> Option<LookupDirection> {
        let mut obsolete = None;

        match event {
            LookupEvent::LocalityEdited(text) => {
                self.locality_text = text;
                self.locality_error = None;
            }
            LookupEvent::PostalCodeEdited(text) => {
                self.postal_code_text = text;
                self.postal_code_error = None;
            }
            LookupEvent::RequestStarted(direction) => {
                self.set_in_flight(direction, true);
                if direction == LookupDirection::PostalCode {
                    self.postal_code_error = None;
                }
            }
            LookupEvent::RequestCancelled(direction) => {
                self.set_in_flight(direction, false);
            }
            LookupEvent::LookupSkipped { direction, reason } => {
                self.set_in_flight(direction, false);
                if reason == SkipReason::TooShort {
                    self.close_dropdown();
                }
            }
            LookupEvent::PostalCodeMalformed => {
                self.set_in_flight(LookupDirection::PostalCode, false);
                self.postal_code_error = Some(FieldError::new(LookupErrorKind::InvalidPostalCode));
            }
            LookupEvent::LocalitiesResolved(records) => {
                self.set_in_flight(LookupDirection::Locality, false);
                let codes: BTreeSet<String> =
                    records.into_iter().map(|record| record.postal_code).collect();

                match codes.len() {
                    0 => {
                        self.locality_error =
                            Some(FieldError::new(LookupErrorKind::NoLocalityMatch));
                        self.close_dropdown();
                    }
                    1 => {
                        self.locality_error = None;
                        self.postal_code_error = None;
                        self.postal_code_text = codes.into_iter().next().unwrap_or_default();
                        self.close_dropdown();
                        obsolete = Some(LookupDirection::PostalCode);
                    }
                    _ => {
                        self.locality_error = None;
                        self.candidates = codes.into_iter().collect();
                        self.mode = Mode::ShowingDropdown;
                        obsolete = Some(LookupDirection::PostalCode);
                    }
                }
            }
            LookupEvent::PostalCodesResolved(records) => {
                self.set_in_flight(LookupDirection::PostalCode, false);
                match records.into_iter().next() {
                    Some(first) => {
                        self.postal_code_error = None;
                        self.locality_error = None;
                        self.locality_text = first.name;
                        obsolete = Some(LookupDirection::Locality);
                    }
                    None => {
                        self.postal_code_error =
                            Some(FieldError::new(LookupErrorKind::NoPostalCodeMatch));
                    }
                }
            }
            LookupEvent::LookupFailed { direction, kind } => {
                if kind == LookupErrorKind::Cancelled {
                    return None;
                }
                self.set_in_flight(direction, false);
                match direction {
                    LookupDirection::Locality => {
                        self.locality_error = Some(FieldError::new(kind));
                        self.close_dropdown();
                    }
                    LookupDirection::PostalCode => {
                        self.postal_code_error = Some(FieldError::new(kind));
                    }
                }
            }
            LookupEvent::CandidateSelected(code) => {
                self.postal_code_text = code;
                self.postal_code_error = None;
                self.close_dropdown();
            }
        }

        obsolete
    }

    fn set_in_flight(&mut self, direction: LookupDirection, in_flight: bool) {
        match direction {
            LookupDirection::Locality => self.locality_in_flight = in_flight,
            LookupDirection::PostalCode => self.postal_code_in_flight = in_flight,
        }
        self.is_loading = self.locality_in_flight || self.postal_code_in_flight;
    }

    fn close_dropdown(&mut self) {
        self.candidates.clear();
        self.mode = Mode::Idle;
    }
}
