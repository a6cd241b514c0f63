//! Filter operators, applied filters and their URL parameter codec.

pub mod applied;
pub mod json;
pub mod params;
pub mod types;
pub mod validate;
pub mod value;

pub use applied::{merge, ColumnRef, Filter, FilterOperator, ALL_COLUMNS};
pub use json::{filters_from_json, filters_to_json, FilterJson};
pub use params::{
    append_filter_params, describe_filters, filter_params, filters_from_params, filters_from_url,
    to_query_string, FilterParams, ParamValue,
};
pub use types::{
    default_filter_for_type, filter_type_for_url_suffix, filter_types_for_type, FilterKind,
    FilterType,
};
pub use validate::validate_value;
pub use value::FilterValue;
