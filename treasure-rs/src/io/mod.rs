//! Combination and preset records, one per line:
//!
//! ```text
//! Name/ReferencePrice/Ruby/Sapphire/YellowDiamond/Emerald/Alexandrite/RedBeryl
//! Name/Ruby/Sapphire/YellowDiamond/Emerald/Alexandrite/RedBeryl
//! ```
//!
//! `Name` is a treasure name or alias. `ReferencePrice` is informational only,
//! prices are always recomputed. Blank lines and lines starting with `#` are ignored.

mod export;
mod import;

#[doc(inline)]
pub use export::{record_line, write_records};
#[doc(inline)]
pub use import::{ParsedRecords, Record, RecordError, parse_records, read_records};
