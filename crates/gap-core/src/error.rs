//! Error types shared by the summary pipelines.

use thiserror::Error;

use crate::management::ManagementCategory;
use crate::nvc::NvcClass;
use crate::records::ProtectionStatus;

pub type Result<T> = std::result::Result<T, GapError>;

#[derive(Error, Debug)]
pub enum GapError {
    /// A PAD status code outside 1-4.
    #[error("Unknown PAD status code: {0:?}")]
    UnknownStatus(String),

    /// Owner labels with no entry in the management category table.
    #[error("No management category for owner label(s): {}", .0.join(", "))]
    UnmappedOwners(Vec<String>),

    /// A pivoted row is missing one protection-status side.
    #[error("No {status} value for ({category}, {class}) after pivot")]
    ShapeMismatch {
        category: ManagementCategory,
        class: NvcClass,
        status: ProtectionStatus,
    },

    /// Status 1-3 cells exceed the group total.
    #[error("NVC group {group:?}: status 1-3 cells ({assigned}) exceed group total ({total})")]
    InconsistentGroupTotal {
        group: String,
        total: u64,
        assigned: u64,
    },

    #[error("Invalid option value: {0}")]
    InvalidOption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
