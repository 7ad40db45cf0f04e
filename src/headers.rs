use indexmap::IndexMap;

/// Header mapping, kept in insertion order.
pub type Headers = IndexMap<String, String>;

/// Response headers; a name sent more than once keeps every value.
pub type MultiHeaders = IndexMap<String, Vec<String>>;

/// Look up a header value, ignoring the case of the name
pub fn get<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Every value of a multi-valued header, ignoring the case of the name
pub fn get_all<'a>(headers: &'a MultiHeaders, name: &str) -> &'a [String] {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_slice())
        .unwrap_or(&[])
}

/// Set a header, replacing any entry whose name differs only by case.
/// The replaced entry keeps its position but takes the new spelling.
pub fn set(headers: &mut Headers, name: &str, value: &str) {
    match headers.keys().position(|k| k.eq_ignore_ascii_case(name)) {
        Some(index) => {
            headers.shift_remove_index(index);
            headers.shift_insert(index, name.to_string(), value.to_string());
        }
        None => {
            headers.insert(name.to_string(), value.to_string());
        }
    }
}

/// Remove every entry with this name, ignoring case
pub fn remove(headers: &mut Headers, name: &str) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
}

/// Merge header sources left to right; on a name collision the later source wins.
pub fn merge<'a, I>(sources: I) -> Headers
where
    I: IntoIterator<Item = &'a Headers>,
{
    let mut merged = Headers::new();
    for source in sources {
        for (name, value) in source {
            set(&mut merged, name, value);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_later_wins() {
        let base = headers(&[("Accept", "application/json"), ("X-App", "base")]);
        let endpoint = headers(&[("X-App", "endpoint")]);
        let call = headers(&[("x-app", "call"), ("X-Trace", "1")]);

        let merged = merge([&base, &endpoint, &call]);
        assert_eq!(merged.len(), 3);
        assert_eq!(get(&merged, "X-APP"), Some("call"));
        assert_eq!(get(&merged, "accept"), Some("application/json"));
        assert_eq!(get(&merged, "x-trace"), Some("1"));
    }

    #[test]
    fn test_set_keeps_position() {
        let mut h = headers(&[("A", "1"), ("B", "2"), ("C", "3")]);
        set(&mut h, "b", "20");
        let keys: Vec<&str> = h.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["A", "b", "C"]);
        assert_eq!(get(&h, "B"), Some("20"));
    }

    #[test]
    fn test_get_all() {
        let mut h = MultiHeaders::new();
        h.insert("set-cookie".to_string(), vec!["a=1; Path=/".to_string(), "b=2".to_string()]);
        assert_eq!(get_all(&h, "Set-Cookie"), ["a=1; Path=/", "b=2"]);
        assert!(get_all(&h, "x-missing").is_empty());
    }

    #[test]
    fn test_remove_ignores_case() {
        let mut h = headers(&[("Accept", "application/json"), ("X-A", "1")]);
        remove(&mut h, "ACCEPT");
        assert!(get(&h, "accept").is_none());
        assert_eq!(h.len(), 1);
    }
}
