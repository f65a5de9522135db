//! String escaping for links and markup.
//!
//! - [`filename_escape`] turns a URI into a token that can be used as a file
//!   name component or as a fragment value (no `/ = ? &`).
//! - [`html_escape`] makes any string safe to place in element text or in a
//!   double-quoted attribute.

/// Replacement tokens for the characters that carry structure in a URL.
///
/// The stats files on disk are named with the same tokens, e.g.
/// `stats._2F_blog_2F_.json` for `/blog/`.
const FILENAME_TOKENS: [(char, &str); 4] = [('/', "_2F_"), ('=', "_3D_"), ('?', "_3F_"), ('&', "_26_")];

/// Escape every `/`, `=`, `?` and `&` in `uri`.
///
/// There is no inverse. Re-escaping the output is a no-op only because none
/// of the tokens contain the four characters.
pub fn filename_escape(uri: &str) -> String {
    let mut out = String::with_capacity(uri.len());
    for ch in uri.chars() {
        match FILENAME_TOKENS.iter().find(|(c, _)| *c == ch) {
            Some((_, token)) => out.push_str(token),
            None => out.push(ch),
        }
    }
    out
}

/// Escape `& < > " '` for HTML text and attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_escape_replaces_all_structural_chars() {
        assert_eq!(filename_escape("a/b=c?d&e"), "a_2F_b_3D_c_3F_d_26_e");
        assert_eq!(filename_escape("/blog/"), "_2F_blog_2F_");
        assert_eq!(filename_escape("//=="), "_2F__2F__3D__3D_");
    }

    #[test]
    fn filename_escape_empty_and_plain() {
        assert_eq!(filename_escape(""), "");
        assert_eq!(filename_escape("index.html"), "index.html");
    }

    #[test]
    fn filename_escape_output_has_no_structural_chars() {
        let inputs = [
            "/a?b=1&c=2",
            "?&=/",
            "/blog/2016/10/hello.html?utm_source=x&utm_medium=y",
            "ünïcödé/päth",
        ];
        for input in inputs {
            let out = filename_escape(input);
            assert!(!out.contains(['/', '=', '?', '&']), "{input} -> {out}");
        }
    }

    #[test]
    fn filename_escape_is_stable_on_escaped_output() {
        let once = filename_escape("/x?y=z");
        assert_eq!(filename_escape(&once), once);
    }

    #[test]
    fn html_escape_covers_five_chars() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn html_escape_does_not_double_escape_within_one_call() {
        assert_eq!(html_escape("&lt;"), "&amp;lt;");
        assert_eq!(html_escape("plain text"), "plain text");
    }
}
