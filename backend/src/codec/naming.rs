//! Naming conventions
//!
//! Canonical field names are lowercase and underscore separated
//! (`postgre_sql_host`). The wrapped model names its accessors in humped
//! form: stack description members leading lowercase (`imageBase`),
//! configuration getters and setters leading uppercase after a prefix
//! (`getPostgreSqlHost`).

/// Convert an underscore separated name into humped form.
///
/// The name is split on `_`. Every segment after the first, and the first
/// as well when `first_capital` is set, gets its first character uppercased;
/// the rest of the segment is kept as is. Segments are joined without a
/// separator.
///
/// An empty first segment (a leading underscore) is kept as a literal `_`
/// when `first_capital` is not set, so `_leading` becomes `_Leading`. Other
/// empty segments vanish.
///
/// # Example
/// ```
/// use pysopnet::codec::naming::to_camel_case;
///
/// assert_eq!(to_camel_case("postgre_sql_host", false), "postgreSqlHost");
/// assert_eq!(to_camel_case("postgre_sql_host", true), "PostgreSqlHost");
/// assert_eq!(to_camel_case("_leading", false), "_Leading");
/// ```
pub fn to_camel_case(name: &str, first_capital: bool) -> String {
    let mut humped = String::with_capacity(name.len());

    for (i, segment) in name.split('_').enumerate() {
        if segment.is_empty() {
            if i == 0 && !first_capital {
                humped.push('_');
            }
            continue;
        }

        if first_capital || i > 0 {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                humped.extend(first.to_uppercase());
                humped.push_str(chars.as_str());
            }
        } else {
            humped.push_str(segment);
        }
    }

    humped
}

/// Accessor name for a canonical field, e.g. `get` + `component_directory`
/// gives `getComponentDirectory`.
pub fn accessor_name(prefix: &str, field: &str) -> String {
    format!("{}{}", prefix, to_camel_case(field, true))
}
