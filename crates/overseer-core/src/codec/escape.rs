//! Markup escaping for attribute values, element text and CDATA sections.

use std::borrow::Cow;

fn replacement(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '\'' => Some("&apos;"),
        '"' => Some("&quot;"),
        _ => None,
    }
}

/// Append `value` to `out` with the five markup metacharacters replaced.
pub fn push_escaped(out: &mut String, value: &str) {
    let mut last = 0;
    for (i, c) in value.char_indices() {
        if let Some(entity) = replacement(c) {
            out.push_str(&value[last..i]);
            out.push_str(entity);
            last = i + c.len_utf8();
        }
    }
    out.push_str(&value[last..]);
}

/// Escape `value`; borrows when there is nothing to replace.
pub fn escape(value: &str) -> Cow<'_, str> {
    if value.chars().any(|c| replacement(c).is_some()) {
        let mut out = String::with_capacity(value.len() + 8);
        push_escaped(&mut out, value);
        Cow::Owned(out)
    } else {
        Cow::Borrowed(value)
    }
}

/// Append `text` as a CDATA section. A literal `]]>` is split across two
/// sections so the content always reads back unchanged.
pub fn push_cdata(out: &mut String, text: &str) {
    out.push_str("<![CDATA[");
    out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn escapes_all_five_metacharacters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/a&gt;"
        );
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape("https://example.com/?q=1"), Cow::Borrowed(_)));
    }

    #[test]
    fn cdata_splits_terminator() {
        let mut out = String::new();
        push_cdata(&mut out, "a]]>b");
        assert_eq!(out, "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    proptest! {
        #[test]
        fn escape_is_identity_without_metacharacters(s in "[^<>&'\"]*") {
            prop_assert_eq!(escape(&s), s.as_str());
        }

        #[test]
        fn escape_is_injective(a in ".{0,24}", b in ".{0,24}") {
            prop_assume!(a != b);
            prop_assert_ne!(escape(&a), escape(&b));
        }

        #[test]
        fn escaped_output_has_no_raw_metacharacters(s in ".{0,64}") {
            let escaped = escape(&s);
            prop_assert!(!escaped.contains(['<', '>', '"', '\'']));
            // Every ampersand starts one of the five entities.
            for (i, _) in escaped.match_indices('&') {
                let rest = &escaped[i..];
                prop_assert!(
                    ["&lt;", "&gt;", "&amp;", "&apos;", "&quot;"]
                        .iter()
                        .any(|entity| rest.starts_with(entity))
                );
            }
        }
    }
}
