//! Maps notification source ids to extractors.
//!
//! The builtin table covers every source seen in production; a TOML
//! overlay can rebind sources or register new ones without a code
//! change. Resolution is total: anything unmapped gets the universal
//! extractor.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::extract::Extractor;
use crate::timestamp::now_ict;
use crate::types::ParseResult;

/// Sources with a dedicated extractor. Ids are Telegram bot usernames
/// and are matched exactly, case-sensitively.
const BUILTIN_SOURCES: &[(&str, Extractor)] = &[
    ("ACLEDABankBot", Extractor::Acleda),
    ("PayWayByABA_bot", Extractor::Aba),
    ("PLBITBot", Extractor::Plb),
    ("CanadiaMerchant_bot", Extractor::Canadia),
    ("HLBCAM_Bot", Extractor::Hlb),
    ("vattanac_bank_merchant_prod_bot", Extractor::Vattanac),
    ("CPBankBot", Extractor::CpBank),
    ("SathapanaBank_bot", Extractor::Sathapana),
    ("chipmongbankpaymentbot", Extractor::ChipMong),
    ("prasac_merchant_payment_bot", Extractor::Prasac),
    ("AMKPlc_bot", Extractor::Amk),
    ("prince_pay_bot", Extractor::Prince),
    ("ccu_bank_bot", Extractor::Ccu),
    ("s7pos_bot", Extractor::S7Pos),
    ("S7days777", Extractor::S7Days),
    ("payment_bk_bot", Extractor::PaymentBk),
];

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid registry config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("source '{source_id}' names unknown extractor '{name}'")]
    UnknownExtractor { source_id: String, name: String },
}

#[derive(Deserialize)]
struct RegistryConfig {
    #[serde(default)]
    sources: HashMap<String, String>,
}

/// Source-to-extractor table.
#[derive(Debug, Clone)]
pub struct Registry {
    sources: HashMap<String, Extractor>,
}

impl Registry {
    /// The builtin production table.
    pub fn builtin() -> Self {
        Registry {
            sources: BUILTIN_SOURCES
                .iter()
                .map(|&(id, extractor)| (id.to_string(), extractor))
                .collect(),
        }
    }

    /// Builtin table plus a TOML overlay:
    ///
    /// ```toml
    /// [sources]
    /// "SomeNewBankBot" = "universal"
    /// "ACLEDABankBot" = "aba"
    /// ```
    pub fn from_toml(config: &str) -> Result<Self, RegistryError> {
        let parsed: RegistryConfig = toml::from_str(config)?;
        let mut registry = Registry::builtin();
        for (source, name) in parsed.sources {
            let extractor =
                Extractor::from_str(&name).map_err(|_| RegistryError::UnknownExtractor {
                    source_id: source.clone(),
                    name,
                })?;
            registry.insert(source, extractor);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, source: impl Into<String>, extractor: Extractor) {
        self.sources.insert(source.into(), extractor);
    }

    /// Total: an absent or unregistered source resolves to
    /// [`Extractor::Universal`].
    pub fn resolve(&self, source_id: Option<&str>) -> Extractor {
        source_id
            .and_then(|id| self.sources.get(id).copied())
            .unwrap_or(Extractor::Universal)
    }

    pub fn parse(&self, source_id: Option<&str>, text: &str) -> ParseResult {
        self.parse_at(source_id, text, now_ict())
    }

    pub fn parse_at(
        &self,
        source_id: Option<&str>,
        text: &str,
        now: DateTime<FixedOffset>,
    ) -> ParseResult {
        let extractor = self.resolve(source_id);
        debug!(source = source_id, ?extractor, "dispatching message");
        extractor.extract_at(text, now)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::builtin()
    }
}

/// Shared builtin registry backing the crate-level [`crate::parse`].
pub fn default_registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::builtin)
}
