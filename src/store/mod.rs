//! On-disk message store.
//!
//! Every captured message lives in its own file:
//!
//! ```text
//! <root>/<topic segment 1>/.../<YYYY-MM-DDTHH:MM:SS.mmmZ>_<NNNN>.json
//! ```
//!
//! The file holds the raw payload bytes; topic and arrival time are recovered
//! from the path alone (see [`codec`]).

pub mod codec;
pub mod error;
pub mod message_store;
pub mod record;

pub use codec::{decode, encode, encode_with_disambiguator, DISAMBIGUATOR_RANGE};
pub use error::StoreError;
pub use message_store::MessageStore;
pub use record::{CapturedMessage, StoredRecord};
