//! GAP land-protection and NVC vegetation-class summaries.
//!
//! Query rows flow through [`nvc::retain_natural_classes`], then either the
//! management path ([`management`] → [`reshape`]) or the protection path
//! ([`protection`]), and end as Vega-Lite charts in [`chart`].

pub mod chart;
pub mod error;
pub mod management;
pub mod nvc;
pub mod protection;
pub mod records;
pub mod reshape;

pub use error::{GapError, Result};
pub use management::{CategorizedRecord, CategoryMapper, ManagementCategory, UnmappedOwnerPolicy};
pub use nvc::{ClassLabeled, NvcClass};
pub use protection::{summarize_protection, ProtectionBin, ProtectionSummary};
pub use records::{CellCountRecord, GapStatus, NvcGroupRecord, ProtectionStatus};
pub use reshape::{summarize_management, ManagementSummary, SummaryRow};
