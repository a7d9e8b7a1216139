//! Extraction engine for bank payment notification messages.
//!
//! Cambodian banks push free-text payment notifications through
//! Telegram bots, each with its own wording, in English and Khmer.
//! This crate turns one message into a structured [`ParseResult`]:
//! currency, amount, transaction time (ICT), reference, and payer.
//!
//! Dispatch is by source id. Known sources get a dedicated extractor
//! tuned to their template; everything else, and any known source
//! whose template missed, runs the universal pattern list. Extraction
//! never fails: fields a message doesn't carry come back absent.
//!
//! ```
//! let result = riel_extract::parse(
//!     Some("ACLEDABankBot"),
//!     "Received 9.60 USD from 089 536 367, 11-Oct-2025 10:12AM. Ref.ID: 528417",
//! );
//! assert_eq!(result.currency.code(), "USD");
//! assert!(result.amount.is_some());
//! ```

pub mod extract;
pub mod registry;
pub mod types;

mod patterns;
mod reference;
mod timestamp;

pub use extract::{parse, parse_at, Extractor};
pub use registry::{Registry, RegistryError};
pub use timestamp::{ict, now_ict};
pub use types::ParseResult;
