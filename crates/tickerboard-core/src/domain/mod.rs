//! # Domain Models
//!
//! Canonical domain types shared by the adapters, the normalization
//! pipeline and the renderer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, uppercased ticker |
//! | [`UtcDateTime`] | UTC timestamp |
//! | [`PricePoint`] | One positive price at an instant |
//! | [`PriceSeries`] | Chronological points plus their [`Cadence`] |
//! | [`ChangeSet`] | 24h / 7d / 30d / YTD percentage changes |
//! | [`InstrumentSnapshot`] | Normalized per-ticker output |
//! | [`FailureRecord`] | Per-ticker failure with a [`FailureReason`] |
//!
//! Constructors validate their invariants; a `PricePoint` can never carry
//! a zero, negative or non-finite price.

mod models;
mod symbol;
mod timestamp;

pub use models::{
    validate_currency_code, Cadence, ChangeSet, FailureReason, FailureRecord, InstrumentKind,
    InstrumentSnapshot, PricePoint, PriceSeries,
};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
