use search_backend::models::SearchQuery;
use serde_json::Value;

/// Parse a query string into a search query / 解析查询字符串
///
/// Accepted keys:
/// - `term`, `pageCursor`
/// - `types`, `types[]`, `types[0]` (repeatable)
/// - `filters[<field>]` (repeating one field makes an any-of list)
pub fn parse_query_string(raw: &str) -> SearchQuery {
    let mut query = SearchQuery::default();
    let mut types: Vec<String> = Vec::new();

    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        let key = key.as_ref();
        if key == "term" {
            query.term = value.into_owned();
        } else if key == "pageCursor" {
            if !value.is_empty() {
                query.page_cursor = Some(value.into_owned());
            }
        } else if key == "types" || is_indexed(key, "types") {
            types.push(value.into_owned());
        } else if let Some(field) = bracketed(key, "filters") {
            if field.is_empty() {
                continue;
            }
            let value = Value::String(value.into_owned());
            match query.filters.get_mut(field) {
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    query.filters.insert(field.to_string(), value);
                }
            }
        } else {
            tracing::debug!("Ignoring unknown query parameter: {}", key);
        }
    }

    if !types.is_empty() {
        query.types = Some(types);
    }
    query
}

/// `name[...]` -> inner text / 取方括号内的字段名
fn bracketed<'a>(key: &'a str, name: &str) -> Option<&'a str> {
    key.strip_prefix(name)?.strip_prefix('[')?.strip_suffix(']')
}

fn is_indexed(key: &str, name: &str) -> bool {
    bracketed(key, name).is_some_and(|inner| inner.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_query() {
        let query = parse_query_string(
            "term=payment%20api&types[0]=software-catalog&types[1]=techdocs&filters[kind]=Component&pageCursor=MQ%3D%3D",
        );

        assert_eq!(query.term, "payment api");
        assert_eq!(
            query.types,
            Some(vec!["software-catalog".to_string(), "techdocs".to_string()])
        );
        assert_eq!(query.filters.get("kind"), Some(&json!("Component")));
        assert_eq!(query.page_cursor.as_deref(), Some("MQ=="));
    }

    #[test]
    fn test_parse_repeated_keys() {
        let query = parse_query_string(
            "types=techdocs&types[]=software-catalog&filters[lifecycle]=production&filters[lifecycle]=experimental",
        );

        assert_eq!(
            query.types,
            Some(vec!["techdocs".to_string(), "software-catalog".to_string()])
        );
        assert_eq!(
            query.filters.get("lifecycle"),
            Some(&json!(["production", "experimental"]))
        );
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        let query = parse_query_string("pageCursor=&foo=bar&filters[]=x");
        assert_eq!(query, SearchQuery::default());

        let query = parse_query_string("");
        assert_eq!(query.term, "");
        assert!(query.types.is_none());
    }
}
