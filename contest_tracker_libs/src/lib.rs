pub mod board;
pub mod contest;
pub mod countdown;
pub mod preferences;

pub use board::{BoardError, ContestBoard};
pub use contest::{
    client::{ContestApi, ContestApiError, HttpContestClient},
    derivation::derive_visible,
    model::{Contest, Platform},
    query::ToQueryParameter,
};
pub use countdown::{
    clock::{compute_remaining, Clock, SystemClock, TimeRemaining},
    timer::{CountdownState, CountdownTimer},
};
pub use preferences::{
    filter::{FilterPreferences, PersistedFilter},
    store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore},
};
