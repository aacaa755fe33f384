use std::borrow::Cow;

/// Canonicalizes a URL into the key used for loose equality comparison.
///
/// Two URLs name the same recording when they are equal verbatim or equal
/// after normalization. The key is used only for equality, never for sorting
/// or storage.
pub trait UrlNormalizer {
    fn normalize<'a>(&self, url: &'a str) -> Cow<'a, str>;
}

/// Stock normalizer: strips a leading `http://`/`https://` (ASCII
/// case-insensitive) and a single trailing slash.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUrlNormalizer;

impl UrlNormalizer for DefaultUrlNormalizer {
    fn normalize<'a>(&self, url: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(strip_trailing_slash(strip_scheme(url)))
    }
}

fn strip_scheme(url: &str) -> &str {
    for scheme in ["http://", "https://"] {
        // Byte-wise comparison; a match is all-ASCII, so the slice below
        // stays on a char boundary.
        if url.len() >= scheme.len()
            && url.as_bytes()[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
        {
            return &url[scheme.len()..];
        }
    }
    url
}

fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::{DefaultUrlNormalizer, UrlNormalizer as _};

    fn normalize(url: &str) -> String {
        DefaultUrlNormalizer.normalize(url).into_owned()
    }

    #[test]
    fn scheme_and_trailing_slash_are_stripped() {
        assert_eq!(normalize("http://example.com/page/"), "example.com/page");
        assert_eq!(normalize("https://example.com/page"), "example.com/page");
        assert_eq!(normalize("example.com/page"), "example.com/page");
    }

    #[test]
    fn scheme_matching_is_case_insensitive() {
        assert_eq!(normalize("HTTP://example.com"), "example.com");
        assert_eq!(normalize("HttPS://example.com"), "example.com");
    }

    #[test]
    fn only_one_trailing_slash_is_stripped() {
        assert_eq!(normalize("example.com//"), "example.com/");
    }

    #[test]
    fn scheme_without_separator_is_kept() {
        assert_eq!(normalize("httpexample.com"), "httpexample.com");
        assert_eq!(normalize("http:/example.com"), "http:/example.com");
    }

    #[test]
    fn equivalent_spellings_share_a_key() {
        let spellings = [
            "http://example.com/a",
            "https://example.com/a",
            "http://example.com/a/",
            "example.com/a",
            "example.com/a/",
        ];
        for spelling in spellings {
            assert_eq!(
                normalize(spelling),
                "example.com/a",
                "spelling `{spelling}` should normalize to the shared key"
            );
        }
    }
}
