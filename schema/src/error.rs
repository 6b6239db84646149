//! Layout validation errors.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Declaration mistakes found by [`RecordLayout::validate`](crate::RecordLayout::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A record declares no sections.
    #[error("record {record} declares no sections")]
    EmptyRecord { record: &'static str },

    /// A group, slot or array has an empty name.
    #[error("record {record} contains an unnamed slot")]
    EmptyName { record: &'static str },

    /// Two groups, slots or arrays share a name.
    #[error("record {record} declares {name:?} more than once")]
    DuplicateName {
        record: &'static str,
        name: &'static str,
    },

    /// A group has no slots.
    #[error("group {group:?} in record {record} has no slots")]
    EmptyGroup {
        record: &'static str,
        group: &'static str,
    },

    /// An array has zero elements.
    #[error("array {array:?} in record {record} has zero length")]
    EmptyArray {
        record: &'static str,
        array: &'static str,
    },

    /// Array elements must be scalars or nested records.
    #[error("array {array:?} in record {record} has dynamic elements")]
    DynamicArrayElement {
        record: &'static str,
        array: &'static str,
    },
}
