//! Cleanup of raw model output into bare LaTeX.

const FENCE: &str = "```";

/// Strip code fences and one layer each of `\[ .. \]` and `$$ .. $$`.
///
/// Total: any input yields a string, empty input yields an empty string.
/// A second call is a no-op unless the wrappers nest the other way round:
/// `$$ \[ x \] $$` loses its `$$` first and its `\[ .. \]` on the next call.
pub fn normalize(raw: &str) -> String {
    let unfenced = strip_fences(raw);
    let mut text = unfenced.trim();

    if let Some(inner) = unwrap(text, "\\[", "\\]") {
        text = inner.trim();
    }
    if let Some(inner) = unwrap(text, "$$", "$$") {
        text = inner.trim();
    }

    text.to_string()
}

/// `normalize` for optional model output, `None` yields an empty string
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

/// Remove every "```latex" opener (with the whitespace after it) and every "```"
fn strip_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find(FENCE) {
        out.push_str(&rest[..idx]);
        rest = &rest[idx + FENCE.len()..];
        if let Some(after_tag) = rest.strip_prefix("latex") {
            rest = after_tag.trim_start();
        }
    }
    out.push_str(rest);

    out
}

fn unwrap<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    if text.len() < open.len() + close.len() {
        return None;
    }
    text.strip_prefix(open)?.strip_suffix(close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block() {
        assert_eq!(normalize("```latex\nE=mc^2\n```"), "E=mc^2");
        assert_eq!(normalize("```\na+b\n```"), "a+b");
    }

    #[test]
    fn display_wrappers() {
        assert_eq!(normalize("$$ \\int_0^1 x dx $$"), "\\int_0^1 x dx");
        assert_eq!(normalize("\\[ x^2 \\]"), "x^2");
        assert_eq!(normalize("```latex\n\\[\n\\frac{a}{b}\n\\]\n```"), "\\frac{a}{b}");
    }

    #[test]
    fn strips_only_one_layer() {
        assert_eq!(normalize("$$ $$x$$ $$"), "$$x$$");
    }

    #[test]
    fn empty_and_missing() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n"), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some(" y ")), "y");
    }

    #[test]
    fn short_wrappers_are_left_alone() {
        assert_eq!(normalize("$$"), "$$");
        assert_eq!(normalize("$$$"), "$$$");
    }

    #[test]
    fn idempotent_on_model_output() {
        let samples = [
            "```latex\nE=mc^2\n```",
            "$$ \\int_0^1 x dx $$",
            "\\[ \\sum_{i=1}^n i \\]",
            "  plain \\alpha  ",
            "```latex   \\sqrt{2}```",
            "",
            "\\[",
            "a ``` b",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input: {raw:?}");
        }
    }

    #[test]
    fn display_math_inside_dollars_needs_a_second_pass() {
        // `\[` is only checked before `$$`, so this nesting is peeled one layer per call
        let once = normalize("$$ \\[ x \\] $$");
        assert_eq!(once, "\\[ x \\]");
        assert_eq!(normalize(&once), "x");
    }
}
