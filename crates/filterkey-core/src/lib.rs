//! Structured identifiers and URL filter codec for tabular query APIs.
//!
//! # Modules
//!
//! - [`key`] - Hierarchical field and schema keys, escaping and SQL quoting
//! - [`filter`] - Filter operator registry, value validation and URL parameters
//! - [`json_type`] - Coarse column value types
//! - [`config`] - Codec configuration
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! use filterkey_core::{filter_params, filters_from_params, Filter, FilterKind};
//!
//! let filters = vec![
//!     Filter::new("Age", 5, FilterKind::GreaterThan),
//!     Filter::new("Age", 65, FilterKind::LessThan),
//! ];
//! let params = filter_params(&filters, "query");
//! assert!(params.contains_key("query.Age~gt"));
//! assert_eq!(filters_from_params(&params, "query"), filters);
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod json_type;
pub mod key;

pub use config::CodecConfig;
pub use error::{Error, Result, ValidationError};
pub use json_type::JsonType;
pub use key::{FieldKey, Key, KeyKind, KeyPart, SchemaKey};

// Re-export commonly used filter items at crate root
pub use filter::{
    append_filter_params, default_filter_for_type, describe_filters, filter_params,
    filter_type_for_url_suffix, filter_types_for_type, filters_from_json, filters_from_params,
    filters_from_url, filters_to_json, merge, to_query_string, Filter, FilterJson, FilterKind,
    FilterOperator, FilterParams, FilterType, FilterValue, ParamValue,
};
