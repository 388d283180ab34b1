use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Sort direction of one column as the table widget reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SortOrder {
    #[serde(rename = "ascend")]
    Ascend,
    #[serde(rename = "descend")]
    Descend,
    #[serde(rename = "none")]
    Unsorted,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascend => "ascend",
            SortOrder::Descend => "descend",
            SortOrder::Unsorted => "none",
        }
    }

    /// Unknown order names collapse to `Unsorted`.
    pub fn from_url_value(value: &str) -> Self {
        match value {
            "ascend" => SortOrder::Ascend,
            "descend" => SortOrder::Descend,
            _ => SortOrder::Unsorted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SorterEntry {
    pub column_key: String,
    pub order: SortOrder,
}

impl SorterEntry {
    pub fn new(column_key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            column_key: column_key.into(),
            order,
        }
    }
}

/// The widget reports either one sorter or several, depending on how many
/// columns take part in sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SorterInput {
    One(SorterEntry),
    Many(Vec<SorterEntry>),
}

impl SorterInput {
    pub fn into_vec(self) -> Vec<SorterEntry> {
        match self {
            SorterInput::One(entry) => vec![entry],
            SorterInput::Many(entries) => entries,
        }
    }
}

impl From<SorterEntry> for SorterInput {
    fn from(value: SorterEntry) -> Self {
        SorterInput::One(value)
    }
}

impl From<Vec<SorterEntry>> for SorterInput {
    fn from(value: Vec<SorterEntry>) -> Self {
        SorterInput::Many(value)
    }
}

/// Column filters keyed by column key, kept in insertion order.
///
/// A key mapped to `None` or to an empty list is a filter that was cleared
/// but is still tracked by the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(Vec<(String, Option<Vec<String>>)>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the values of an existing key in place, otherwise appends.
    pub fn insert(&mut self, key: impl Into<String>, values: Option<Vec<String>>) {
        let key = key.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = values,
            None => self.0.push((key, values)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, values: &[&str]) -> Self {
        self.insert(key, Some(values.iter().map(|v| v.to_string()).collect()));
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(existing, _)| existing == key)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .and_then(|(_, values)| values.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&[String]>)> {
        self.0
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlays `self` on top of `defaults`: keys present here win, keys only
    /// present in `defaults` keep their default values.
    pub fn merged_over(self, defaults: &Filters) -> Filters {
        let mut merged = defaults.clone();
        for (key, values) in self.0 {
            merged.insert(key, values);
        }
        merged
    }

    /// Drops cleared filters and empty values, the shape that survives a trip
    /// through the URL.
    pub fn effective(&self) -> Filters {
        let mut out = Filters::new();
        for (key, values) in &self.0 {
            let kept: Vec<String> = values
                .iter()
                .flatten()
                .filter(|value| !value.is_empty())
                .cloned()
                .collect();
            if !kept.is_empty() {
                out.insert(key.clone(), Some(kept));
            }
        }
        out
    }
}

impl Serialize for Filters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, values) in &self.0 {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// Rows per page, or everything at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
    Items(u32),
    Unbounded,
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::Items(count) => serializer.serialize_u32(*count),
            Limit::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

/// Page, filter and sort state of a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub page: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Limit>,
    pub filters: Filters,
    pub sorter: Vec<SorterEntry>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: None,
            filters: Filters::new(),
            sorter: Vec::new(),
        }
    }
}

/// Caller-supplied fallbacks applied when the URL says nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDefaults {
    pub filters: Filters,
    pub sorter: Vec<SorterEntry>,
    pub limit: Option<Limit>,
}

/// A `ListQuery` tagged with the logical dataset it is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetcherQuery {
    pub cache_key: String,
    #[serde(flatten)]
    pub query: ListQuery,
}

impl FetcherQuery {
    pub fn new(cache_key: impl Into<String>, query: ListQuery) -> Self {
        Self {
            cache_key: cache_key.into(),
            query,
        }
    }

    /// Structured parameter object handed to the cache.
    pub fn to_params(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
