//! The form-side lookup logic: per-field debounce, per-direction request
//! slots, and the state machine the UI renders from.

pub mod controller;
pub mod debounce;
pub mod slot;
pub mod state;

pub use controller::{AddressLookupController, SelectionError};
pub use state::{
    FieldError, LookupDirection, LookupErrorKind, LookupEvent, Mode, SearchState, SkipReason,
    INVALID_POSTAL_CODE_MESSAGE, NO_LOCALITY_MESSAGE, NO_POSTAL_CODE_MESSAGE,
    TRANSPORT_FAILURE_MESSAGE,
};
