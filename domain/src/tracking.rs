//! UTM tagging applied to every destination before it is shortened.

/// Fixed campaign parameters, already form-encoded and in send order.
pub const TRACKING_PARAMS: [(&str, &str); 3] = [
    ("utm_source", "ad-shop"),
    ("utm_medium", "qr-sticker"),
    ("utm_campaign", "qr-code-stickers"),
];

/// The encoded query fragment, `utm_source=ad-shop&utm_medium=...`.
pub fn tracking_query() -> String {
    TRACKING_PARAMS
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append the tracking parameters to `long_url`.
///
/// Joins with `&` when a query string is present and `?` otherwise. A
/// trailing `#fragment` stays at the end. URLs that already carry the exact
/// parameter set are returned unchanged, so tagging happens at most once.
pub fn tag_url(long_url: &str) -> String {
    let query = tracking_query();
    let (base, fragment) = match long_url.split_once('#') {
        Some((b, f)) => (b, Some(f)),
        None => (long_url, None),
    };
    if already_tagged(base) {
        return long_url.to_string();
    }

    let mut out = String::with_capacity(long_url.len() + query.len() + 1);
    out.push_str(base);
    if !(base.ends_with('?') || base.ends_with('&')) {
        out.push(if base.contains('?') { '&' } else { '?' });
    }
    out.push_str(&query);
    if let Some(f) = fragment {
        out.push('#');
        out.push_str(f);
    }
    out
}

/// Every tracking pair appears as a whole `k=v` pair of the query.
fn already_tagged(base: &str) -> bool {
    let Some((_, query)) = base.split_once('?') else {
        return false;
    };
    TRACKING_PARAMS.iter().all(|&(k, v)| {
        query
            .split('&')
            .any(|pair| pair.split_once('=') == Some((k, v)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q: &str = "utm_source=ad-shop&utm_medium=qr-sticker&utm_campaign=qr-code-stickers";

    #[test]
    fn starts_query_when_absent() {
        assert_eq!(tag_url("http://a.com"), format!("http://a.com?{Q}"));
    }

    #[test]
    fn merges_into_existing_query() {
        assert_eq!(
            tag_url("https://a.com/p?ref=1"),
            format!("https://a.com/p?ref=1&{Q}")
        );
    }

    #[test]
    fn keeps_fragment_last() {
        assert_eq!(
            tag_url("https://a.com/p#top"),
            format!("https://a.com/p?{Q}#top")
        );
    }

    #[test]
    fn dangling_separator_is_reused() {
        assert_eq!(tag_url("https://a.com/?"), format!("https://a.com/?{Q}"));
        assert_eq!(tag_url("https://a.com/?x=1&"), format!("https://a.com/?x=1&{Q}"));
    }

    #[test]
    fn tagging_twice_is_a_no_op() {
        let once = tag_url("https://a.com/p?ref=1");
        assert_eq!(tag_url(&once), once);
        assert_eq!(once.matches("utm_source").count(), 1);
    }

    #[test]
    fn lookalike_pairs_still_get_tagged() {
        let url = "https://a.com/p?xutm_source=ad-shop&utm_medium=qr-sticker&utm_campaign=qr-code-stickers-v2";
        assert_eq!(tag_url(url), format!("{url}&{Q}"));
    }

    #[test]
    fn pairs_in_any_order_count_as_tagged() {
        let url = "https://a.com/p?utm_campaign=qr-code-stickers&ref=2&utm_medium=qr-sticker&utm_source=ad-shop";
        assert_eq!(tag_url(url), url);
    }
}
