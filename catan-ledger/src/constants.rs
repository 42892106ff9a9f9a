//! Centralized message snippets and limits for the ledger engine.
//!
//! The snippets are the fixed phrases the host game writes into its log. Keeping
//! them together means a wording change on the host side is a one-line fix here.

// Log snippets -------------------------------------------------------------
pub(crate) const STARTING_RESOURCES_SNIPPET: &str = "received starting resources";
pub(crate) const BUILT_SNIPPET: &str = " built";
pub(crate) const BOUGHT_SNIPPET: &str = " bought ";
pub(crate) const BANK_GAVE_SNIPPET: &str = "gave bank";
pub(crate) const BANK_TOOK_SNIPPET: &str = "and took";
pub(crate) const YEAR_OF_PLENTY_SNIPPET: &str = "took from bank";
pub(crate) const DISCARDED_SNIPPET: &str = " discarded";
pub(crate) const TRADED_SNIPPET: &str = " traded";
pub(crate) const TRADE_FOR_SNIPPET: &str = "for:";
pub(crate) const TRADE_WITH_SNIPPET: &str = "with:";
pub(crate) const DEVELOPMENT_CARD_KEYWORD: &str = "development card";

/// Token the host uses in place of the viewing player's name.
pub(crate) const YOU_ALIAS: &str = "you";

// Limits -------------------------------------------------------------------
/// Default number of audit entries retained before the oldest is evicted.
pub const DEFAULT_AUDIT_CAPACITY: usize = 100;
