//! Query-string filter parsing
//!
//! Every query pair is an equality constraint on a record field. Repeated
//! keys are kept as independent constraints rather than collapsed.

use url::form_urlencoded;

/// Parse a raw query string into (field, value) constraint pairs.
///
/// Percent-encoding and `+`-as-space are decoded; pair order is preserved.
/// An empty query string yields no constraints.
///
/// # Examples
/// ```
/// use campus_api::api::query::parse_filters;
///
/// let filters = parse_filters("year=2&major=Computer+Science");
/// assert_eq!(filters[0], ("year".to_string(), "2".to_string()));
/// assert_eq!(filters[1], ("major".to_string(), "Computer Science".to_string()));
/// ```
pub fn parse_filters(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(field, value)| (field.into_owned(), value.into_owned()))
        .collect()
}
