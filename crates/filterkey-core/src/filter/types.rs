//! The fixed catalog of filter operators.
//!
//! Every operator is a [`FilterKind`] variant with one immutable
//! [`FilterType`] descriptor. Descriptors are indexed by URL suffix in a
//! registry that is built on first lookup and never changes afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::json_type::JsonType;

/// Every filter operator known to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    HasAnyValue,
    Equal,
    DateEqual,
    DateNotEqual,
    NotEqualOrMissing,
    NotEqual,
    Missing,
    NotMissing,
    GreaterThan,
    DateGreaterThan,
    LessThan,
    DateLessThan,
    GreaterThanOrEqual,
    DateGreaterThanOrEqual,
    LessThanOrEqual,
    DateLessThanOrEqual,
    StartsWith,
    DoesNotStartWith,
    Contains,
    DoesNotContain,
    ContainsOneOf,
    ContainsNoneOf,
    In,
    NotIn,
    Between,
    NotBetween,
    MemberOf,
    HasMissingValue,
    DoesNotHaveMissingValue,
    Search,
    ExpChildOf,
    ExpParentOf,
    ExpLineageOf,
    ArrayContainsAll,
    ArrayContainsAny,
    ArrayContainsNone,
    ArrayContainsExact,
    ArrayContainsNotExact,
    ArrayIsEmpty,
    ArrayIsNotEmpty,
}

/// Immutable description of one filter operator.
#[derive(Debug, PartialEq, Eq)]
pub struct FilterType {
    kind: FilterKind,
    display_text: &'static str,
    display_symbol: Option<&'static str>,
    long_display_text: Option<&'static str>,
    url_suffix: Option<&'static str>,
    requires_value: bool,
    multi_value_separator: Option<&'static str>,
    min_occurs: Option<usize>,
    max_occurs: Option<usize>,
    table_wise: bool,
}

impl FilterType {
    /// An operator taking exactly one value.
    const fn single(
        kind: FilterKind,
        display_text: &'static str,
        display_symbol: Option<&'static str>,
        url_suffix: &'static str,
    ) -> Self {
        Self {
            kind,
            display_text,
            display_symbol,
            long_display_text: None,
            url_suffix: Some(url_suffix),
            requires_value: true,
            multi_value_separator: None,
            min_occurs: None,
            max_occurs: None,
            table_wise: false,
        }
    }

    /// An operator that takes no value.
    const fn no_value(
        kind: FilterKind,
        display_text: &'static str,
        url_suffix: Option<&'static str>,
    ) -> Self {
        Self {
            requires_value: false,
            url_suffix,
            ..Self::single(kind, display_text, None, "")
        }
    }

    /// An operator taking a separator-joined list of values.
    const fn multi(
        kind: FilterKind,
        display_text: &'static str,
        url_suffix: &'static str,
        separator: &'static str,
        long_display_text: &'static str,
    ) -> Self {
        Self {
            multi_value_separator: Some(separator),
            long_display_text: Some(long_display_text),
            ..Self::single(kind, display_text, None, url_suffix)
        }
    }

    const fn with_long_text(self, text: &'static str) -> Self {
        Self {
            long_display_text: Some(text),
            ..self
        }
    }

    const fn with_occurs(self, min: usize, max: usize) -> Self {
        Self {
            min_occurs: Some(min),
            max_occurs: Some(max),
            ..self
        }
    }

    const fn table_wise(self) -> Self {
        Self {
            table_wise: true,
            ..self
        }
    }

    /// The operator this descriptor belongs to.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Label shown in filter menus.
    pub fn display_text(&self) -> &'static str {
        self.display_text
    }

    /// Short symbol such as `>=`, when one exists.
    pub fn display_symbol(&self) -> Option<&'static str> {
        self.display_symbol
    }

    /// Longer label, falling back to the display text.
    pub fn long_display_text(&self) -> &'static str {
        self.long_display_text.unwrap_or(self.display_text)
    }

    /// Registry key and parameter-name suffix. Only "has any value" has none.
    pub fn url_suffix(&self) -> Option<&'static str> {
        self.url_suffix
    }

    /// Whether the operator needs a value at all.
    pub fn is_data_value_required(&self) -> bool {
        self.requires_value
    }

    /// Whether the operator takes several values.
    pub fn is_multi_valued(&self) -> bool {
        self.multi_value_separator.is_some()
    }

    /// Separator between values in the URL form.
    pub fn multi_value_separator(&self) -> Option<&'static str> {
        self.multi_value_separator
    }

    /// Fewest values accepted, for fixed-arity operators.
    pub fn min_occurs(&self) -> Option<usize> {
        self.min_occurs
    }

    /// Most values accepted, for fixed-arity operators.
    pub fn max_occurs(&self) -> Option<usize> {
        self.max_occurs
    }

    /// Whether the operator applies to the whole row rather than one column.
    pub fn is_table_wise(&self) -> bool {
        self.table_wise
    }

    /// The logical negation of this operator.
    pub fn opposite(&self) -> Option<&'static FilterType> {
        self.kind.opposite().map(FilterKind::descriptor)
    }

    /// The single-valued counterpart. A single-valued operator is its own.
    pub fn single_value_filter(&'static self) -> Option<&'static FilterType> {
        if self.is_multi_valued() {
            self.kind.single_value_counterpart().map(FilterKind::descriptor)
        } else {
            Some(self)
        }
    }

    /// The multi-valued counterpart of a single-valued operator.
    pub fn multi_value_filter(&self) -> Option<&'static FilterType> {
        if self.is_multi_valued() {
            None
        } else {
            self.kind.multi_value_counterpart().map(FilterKind::descriptor)
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_text)
    }
}

pub static HAS_ANY_VALUE: FilterType =
    FilterType::no_value(FilterKind::HasAnyValue, "Has Any Value", None);
pub static EQUAL: FilterType = FilterType::single(FilterKind::Equal, "Equals", Some("="), "eq");
pub static DATE_EQUAL: FilterType =
    FilterType::single(FilterKind::DateEqual, "Equals", Some("="), "dateeq");
pub static DATE_NOT_EQUAL: FilterType =
    FilterType::single(FilterKind::DateNotEqual, "Does Not Equal", Some("<>"), "dateneq");
pub static NOT_EQUAL_OR_MISSING: FilterType = FilterType::single(
    FilterKind::NotEqualOrMissing,
    "Does Not Equal",
    Some("<>"),
    "neqornull",
);
pub static NOT_EQUAL: FilterType =
    FilterType::single(FilterKind::NotEqual, "Does Not Equal", Some("<>"), "neq");
pub static MISSING: FilterType =
    FilterType::no_value(FilterKind::Missing, "Is Blank", Some("isblank"));
pub static NOT_MISSING: FilterType =
    FilterType::no_value(FilterKind::NotMissing, "Is Not Blank", Some("isnonblank"));
pub static GREATER_THAN: FilterType =
    FilterType::single(FilterKind::GreaterThan, "Is Greater Than", Some(">"), "gt");
pub static DATE_GREATER_THAN: FilterType =
    FilterType::single(FilterKind::DateGreaterThan, "Is Greater Than", Some(">"), "dategt");
pub static LESS_THAN: FilterType =
    FilterType::single(FilterKind::LessThan, "Is Less Than", Some("<"), "lt");
pub static DATE_LESS_THAN: FilterType =
    FilterType::single(FilterKind::DateLessThan, "Is Less Than", Some("<"), "datelt");
pub static GREATER_THAN_OR_EQUAL: FilterType = FilterType::single(
    FilterKind::GreaterThanOrEqual,
    "Is Greater Than or Equal To",
    Some(">="),
    "gte",
);
pub static DATE_GREATER_THAN_OR_EQUAL: FilterType = FilterType::single(
    FilterKind::DateGreaterThanOrEqual,
    "Is Greater Than or Equal To",
    Some(">="),
    "dategte",
);
pub static LESS_THAN_OR_EQUAL: FilterType = FilterType::single(
    FilterKind::LessThanOrEqual,
    "Is Less Than or Equal To",
    Some("<="),
    "lte",
);
pub static DATE_LESS_THAN_OR_EQUAL: FilterType = FilterType::single(
    FilterKind::DateLessThanOrEqual,
    "Is Less Than or Equal To",
    Some("<="),
    "datelte",
);
pub static STARTS_WITH: FilterType =
    FilterType::single(FilterKind::StartsWith, "Starts With", None, "startswith");
pub static DOES_NOT_START_WITH: FilterType = FilterType::single(
    FilterKind::DoesNotStartWith,
    "Does Not Start With",
    None,
    "doesnotstartwith",
);
pub static CONTAINS: FilterType =
    FilterType::single(FilterKind::Contains, "Contains", None, "contains");
pub static DOES_NOT_CONTAIN: FilterType =
    FilterType::single(FilterKind::DoesNotContain, "Does Not Contain", None, "doesnotcontain");
pub static CONTAINS_ONE_OF: FilterType = FilterType::multi(
    FilterKind::ContainsOneOf,
    "Contains One Of (example usage: a;b;c)",
    "containsoneof",
    ";",
    "Contains One Of",
);
pub static CONTAINS_NONE_OF: FilterType = FilterType::multi(
    FilterKind::ContainsNoneOf,
    "Does Not Contain Any Of (example usage: a;b;c)",
    "containsnoneof",
    ";",
    "Does Not Contain Any Of",
);
pub static IN: FilterType = FilterType::multi(
    FilterKind::In,
    "Equals One Of (example usage: a;b;c)",
    "in",
    ";",
    "Equals One Of",
);
pub static NOT_IN: FilterType = FilterType::multi(
    FilterKind::NotIn,
    "Does Not Equal Any Of (example usage: a;b;c)",
    "notin",
    ";",
    "Does Not Equal Any Of",
);
pub static BETWEEN: FilterType =
    FilterType::multi(FilterKind::Between, "Between", "between", ",", "Between").with_occurs(2, 2);
pub static NOT_BETWEEN: FilterType = FilterType::multi(
    FilterKind::NotBetween,
    "Not Between",
    "notbetween",
    ",",
    "Not Between",
)
.with_occurs(2, 2);
pub static MEMBER_OF: FilterType =
    FilterType::single(FilterKind::MemberOf, "Member Of", None, "memberof")
        .with_long_text(" member of");
pub static HAS_MISSING_VALUE: FilterType = FilterType::no_value(
    FilterKind::HasMissingValue,
    "Has a missing value indicator",
    Some("hasmvvalue"),
);
pub static DOES_NOT_HAVE_MISSING_VALUE: FilterType = FilterType::no_value(
    FilterKind::DoesNotHaveMissingValue,
    "Does not have a missing value indicator",
    Some("nomvvalue"),
);
pub static SEARCH: FilterType = FilterType::single(FilterKind::Search, "Search", None, "q")
    .with_long_text("Search across all columns")
    .table_wise();
pub static EXP_CHILD_OF: FilterType =
    FilterType::single(FilterKind::ExpChildOf, "Is Child Of", None, "exp:childof")
        .with_long_text(" is child of");
pub static EXP_PARENT_OF: FilterType =
    FilterType::single(FilterKind::ExpParentOf, "Is Parent Of", None, "exp:parentof")
        .with_long_text(" is parent of");
pub static EXP_LINEAGE_OF: FilterType = FilterType::single(
    FilterKind::ExpLineageOf,
    "In The Lineage Of",
    None,
    "exp:lineageof",
)
.with_long_text(" in the lineage of");
pub static ARRAY_CONTAINS_ALL: FilterType = FilterType::multi(
    FilterKind::ArrayContainsAll,
    "Contains All",
    "arraycontainsall",
    ";",
    "Contains All Of",
);
pub static ARRAY_CONTAINS_ANY: FilterType = FilterType::multi(
    FilterKind::ArrayContainsAny,
    "Contains Any",
    "arraycontainsany",
    ";",
    "Contains Any Of",
);
pub static ARRAY_CONTAINS_NONE: FilterType = FilterType::multi(
    FilterKind::ArrayContainsNone,
    "Contains None",
    "arraycontainsnone",
    ";",
    "Contains None Of",
);
pub static ARRAY_CONTAINS_EXACT: FilterType = FilterType::multi(
    FilterKind::ArrayContainsExact,
    "Contains Exactly",
    "arraymatches",
    ";",
    "Contains Exactly",
);
pub static ARRAY_CONTAINS_NOT_EXACT: FilterType = FilterType::multi(
    FilterKind::ArrayContainsNotExact,
    "Does Not Contain Exactly",
    "arraynotmatches",
    ";",
    "Does Not Contain Exactly",
);
pub static ARRAY_IS_EMPTY: FilterType =
    FilterType::no_value(FilterKind::ArrayIsEmpty, "Is Empty", Some("arrayisempty"));
pub static ARRAY_IS_NOT_EMPTY: FilterType =
    FilterType::no_value(FilterKind::ArrayIsNotEmpty, "Is Not Empty", Some("arrayisnotempty"));

/// Suffix to operator map, written once on first use.
static URL_SUFFIX_REGISTRY: LazyLock<HashMap<&'static str, FilterKind>> =
    LazyLock::new(|| build_registry(FilterKind::ALL.iter().map(|kind| kind.descriptor())));

/// Index descriptors by URL suffix. A later descriptor with the same suffix
/// replaces an earlier one.
fn build_registry<'a>(
    types: impl IntoIterator<Item = &'a FilterType>,
) -> HashMap<&'static str, FilterKind> {
    let mut registry = HashMap::new();
    for filter_type in types {
        if let Some(suffix) = filter_type.url_suffix {
            registry.insert(suffix, filter_type.kind);
        }
    }
    registry
}

/// Look up a descriptor by its URL suffix.
pub fn filter_type_for_url_suffix(suffix: &str) -> Option<&'static FilterType> {
    FilterKind::from_url_suffix(suffix).map(FilterKind::descriptor)
}

/// Operators offered for a column of the given value type, in menu order.
///
/// With `mv_enabled` the missing-value indicator operators are appended.
pub fn filter_types_for_type(json_type: JsonType, mv_enabled: bool) -> Vec<&'static FilterType> {
    use FilterKind::*;

    let kinds: &[FilterKind] = match json_type {
        JsonType::Boolean => &[HasAnyValue, Equal, NotEqualOrMissing, Missing, NotMissing],
        JsonType::Date => &[
            HasAnyValue,
            DateEqual,
            DateNotEqual,
            Missing,
            NotMissing,
            DateGreaterThan,
            DateLessThan,
            DateGreaterThanOrEqual,
            DateLessThanOrEqual,
        ],
        JsonType::Float | JsonType::Int => &[
            HasAnyValue,
            Equal,
            NotEqualOrMissing,
            Missing,
            NotMissing,
            GreaterThan,
            LessThan,
            GreaterThanOrEqual,
            LessThanOrEqual,
            In,
            NotIn,
            Between,
            NotBetween,
        ],
        JsonType::String => &[
            HasAnyValue,
            Equal,
            NotEqualOrMissing,
            Missing,
            NotMissing,
            GreaterThan,
            LessThan,
            GreaterThanOrEqual,
            LessThanOrEqual,
            Contains,
            DoesNotContain,
            DoesNotStartWith,
            StartsWith,
            In,
            NotIn,
            ContainsOneOf,
            ContainsNoneOf,
            Between,
            NotBetween,
        ],
    };

    let mut types: Vec<&'static FilterType> = kinds.iter().map(|k| k.descriptor()).collect();
    if mv_enabled {
        types.push(&HAS_MISSING_VALUE);
        types.push(&DOES_NOT_HAVE_MISSING_VALUE);
    }
    types
}

/// The operator a new filter on a column of this type starts with.
pub fn default_filter_for_type(json_type: JsonType) -> &'static FilterType {
    match json_type {
        JsonType::Boolean | JsonType::Float | JsonType::Int => &EQUAL,
        JsonType::Date => &DATE_EQUAL,
        JsonType::String => &CONTAINS,
    }
}

impl FilterKind {
    /// Every operator, in catalog order.
    pub const ALL: [FilterKind; 40] = [
        FilterKind::HasAnyValue,
        FilterKind::Equal,
        FilterKind::DateEqual,
        FilterKind::DateNotEqual,
        FilterKind::NotEqualOrMissing,
        FilterKind::NotEqual,
        FilterKind::Missing,
        FilterKind::NotMissing,
        FilterKind::GreaterThan,
        FilterKind::DateGreaterThan,
        FilterKind::LessThan,
        FilterKind::DateLessThan,
        FilterKind::GreaterThanOrEqual,
        FilterKind::DateGreaterThanOrEqual,
        FilterKind::LessThanOrEqual,
        FilterKind::DateLessThanOrEqual,
        FilterKind::StartsWith,
        FilterKind::DoesNotStartWith,
        FilterKind::Contains,
        FilterKind::DoesNotContain,
        FilterKind::ContainsOneOf,
        FilterKind::ContainsNoneOf,
        FilterKind::In,
        FilterKind::NotIn,
        FilterKind::Between,
        FilterKind::NotBetween,
        FilterKind::MemberOf,
        FilterKind::HasMissingValue,
        FilterKind::DoesNotHaveMissingValue,
        FilterKind::Search,
        FilterKind::ExpChildOf,
        FilterKind::ExpParentOf,
        FilterKind::ExpLineageOf,
        FilterKind::ArrayContainsAll,
        FilterKind::ArrayContainsAny,
        FilterKind::ArrayContainsNone,
        FilterKind::ArrayContainsExact,
        FilterKind::ArrayContainsNotExact,
        FilterKind::ArrayIsEmpty,
        FilterKind::ArrayIsNotEmpty,
    ];

    /// The immutable descriptor for this operator.
    pub fn descriptor(self) -> &'static FilterType {
        match self {
            FilterKind::HasAnyValue => &HAS_ANY_VALUE,
            FilterKind::Equal => &EQUAL,
            FilterKind::DateEqual => &DATE_EQUAL,
            FilterKind::DateNotEqual => &DATE_NOT_EQUAL,
            FilterKind::NotEqualOrMissing => &NOT_EQUAL_OR_MISSING,
            FilterKind::NotEqual => &NOT_EQUAL,
            FilterKind::Missing => &MISSING,
            FilterKind::NotMissing => &NOT_MISSING,
            FilterKind::GreaterThan => &GREATER_THAN,
            FilterKind::DateGreaterThan => &DATE_GREATER_THAN,
            FilterKind::LessThan => &LESS_THAN,
            FilterKind::DateLessThan => &DATE_LESS_THAN,
            FilterKind::GreaterThanOrEqual => &GREATER_THAN_OR_EQUAL,
            FilterKind::DateGreaterThanOrEqual => &DATE_GREATER_THAN_OR_EQUAL,
            FilterKind::LessThanOrEqual => &LESS_THAN_OR_EQUAL,
            FilterKind::DateLessThanOrEqual => &DATE_LESS_THAN_OR_EQUAL,
            FilterKind::StartsWith => &STARTS_WITH,
            FilterKind::DoesNotStartWith => &DOES_NOT_START_WITH,
            FilterKind::Contains => &CONTAINS,
            FilterKind::DoesNotContain => &DOES_NOT_CONTAIN,
            FilterKind::ContainsOneOf => &CONTAINS_ONE_OF,
            FilterKind::ContainsNoneOf => &CONTAINS_NONE_OF,
            FilterKind::In => &IN,
            FilterKind::NotIn => &NOT_IN,
            FilterKind::Between => &BETWEEN,
            FilterKind::NotBetween => &NOT_BETWEEN,
            FilterKind::MemberOf => &MEMBER_OF,
            FilterKind::HasMissingValue => &HAS_MISSING_VALUE,
            FilterKind::DoesNotHaveMissingValue => &DOES_NOT_HAVE_MISSING_VALUE,
            FilterKind::Search => &SEARCH,
            FilterKind::ExpChildOf => &EXP_CHILD_OF,
            FilterKind::ExpParentOf => &EXP_PARENT_OF,
            FilterKind::ExpLineageOf => &EXP_LINEAGE_OF,
            FilterKind::ArrayContainsAll => &ARRAY_CONTAINS_ALL,
            FilterKind::ArrayContainsAny => &ARRAY_CONTAINS_ANY,
            FilterKind::ArrayContainsNone => &ARRAY_CONTAINS_NONE,
            FilterKind::ArrayContainsExact => &ARRAY_CONTAINS_EXACT,
            FilterKind::ArrayContainsNotExact => &ARRAY_CONTAINS_NOT_EXACT,
            FilterKind::ArrayIsEmpty => &ARRAY_IS_EMPTY,
            FilterKind::ArrayIsNotEmpty => &ARRAY_IS_NOT_EMPTY,
        }
    }

    /// Look up an operator by URL suffix.
    pub fn from_url_suffix(suffix: &str) -> Option<FilterKind> {
        URL_SUFFIX_REGISTRY.get(suffix).copied()
    }

    /// The logical negation.
    ///
    /// `neq` negates to `eq`, while `eq` negates to `neqornull`; `memberof`
    /// is its own opposite.
    pub fn opposite(self) -> Option<FilterKind> {
        use FilterKind::*;

        match self {
            Equal => Some(NotEqualOrMissing),
            NotEqualOrMissing | NotEqual => Some(Equal),
            DateEqual => Some(DateNotEqual),
            DateNotEqual => Some(DateEqual),
            Missing => Some(NotMissing),
            NotMissing => Some(Missing),
            GreaterThan => Some(LessThanOrEqual),
            LessThanOrEqual => Some(GreaterThan),
            LessThan => Some(GreaterThanOrEqual),
            GreaterThanOrEqual => Some(LessThan),
            DateGreaterThan => Some(DateLessThanOrEqual),
            DateLessThanOrEqual => Some(DateGreaterThan),
            DateLessThan => Some(DateGreaterThanOrEqual),
            DateGreaterThanOrEqual => Some(DateLessThan),
            StartsWith => Some(DoesNotStartWith),
            DoesNotStartWith => Some(StartsWith),
            Contains => Some(DoesNotContain),
            DoesNotContain => Some(Contains),
            ContainsOneOf => Some(ContainsNoneOf),
            ContainsNoneOf => Some(ContainsOneOf),
            In => Some(NotIn),
            NotIn => Some(In),
            Between => Some(NotBetween),
            NotBetween => Some(Between),
            MemberOf => Some(MemberOf),
            HasMissingValue => Some(DoesNotHaveMissingValue),
            DoesNotHaveMissingValue => Some(HasMissingValue),
            ArrayContainsAny => Some(ArrayContainsNone),
            ArrayContainsNone => Some(ArrayContainsAny),
            ArrayContainsExact => Some(ArrayContainsNotExact),
            ArrayContainsNotExact => Some(ArrayContainsExact),
            ArrayIsEmpty => Some(ArrayIsNotEmpty),
            ArrayIsNotEmpty => Some(ArrayIsEmpty),
            HasAnyValue | Search | ExpChildOf | ExpParentOf | ExpLineageOf | ArrayContainsAll => {
                None
            }
        }
    }

    /// Single-valued counterpart of a multi-valued operator.
    fn single_value_counterpart(self) -> Option<FilterKind> {
        use FilterKind::*;

        match self {
            In => Some(Equal),
            NotIn => Some(NotEqual),
            ContainsOneOf => Some(Contains),
            ContainsNoneOf => Some(DoesNotContain),
            _ => None,
        }
    }

    /// Multi-valued counterpart of a single-valued operator.
    fn multi_value_counterpart(self) -> Option<FilterKind> {
        use FilterKind::*;

        match self {
            Equal => Some(In),
            NotEqual | NotEqualOrMissing => Some(NotIn),
            Contains => Some(ContainsOneOf),
            DoesNotContain => Some(ContainsNoneOf),
            _ => None,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().url_suffix.unwrap_or(""))
    }
}
