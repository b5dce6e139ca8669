//! # Asset Graph Model
//!
//! Typed records that define the relationship graph: assets, regulatory
//! events, relationships and their attribute values.
//!
//! Design rule: this module is pure data with no I/O, state or locking.
//! Validation lives next to the types it guards.

pub mod asset;
pub mod error;
pub mod event;
pub mod property_map;
pub mod relationship;
pub mod value;

pub use asset::{Asset, AssetBuilder, AssetClass, AssetIdx, AssetKind, DEFAULT_CURRENCY};
pub use error::{is_valid_currency_code, ValidationError};
pub use event::{parse_event_date, EventIdx, RegulatoryActivity, RegulatoryEvent, RegulatoryEventBuilder};
pub use property_map::{attributes, AttributeMap};
pub use relationship::{clamp_strength, Relationship, RelationshipType};
pub use value::Value;
