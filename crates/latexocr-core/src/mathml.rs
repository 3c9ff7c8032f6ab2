/// Presentation MathML from renderer output.
///
/// Keeps the first `<math>` element. When it carries a `<semantics>` block,
/// the wrapper and everything from the first `<annotation` on are dropped.
pub fn extract_pure_mathml(html: &str) -> Option<String> {
    let start = find_math_open(html)?;
    let end_rel = html[start..].find("</math>")?;
    let math = &html[start..start + end_rel + "</math>".len()];

    let Some(sem_idx) = math.find("<semantics>") else {
        return Some(math.to_string());
    };

    let before = &math[..sem_idx];
    let body_start = sem_idx + "<semantics>".len();
    match math[body_start..].find("<annotation") {
        Some(ann_rel) => {
            let body = &math[body_start..body_start + ann_rel];
            Some(format!("{before}{body}</math>"))
        }
        None => Some(math.to_string()),
    }
}

/// Offset of `<math>` or `<math ...>`, skipping tags like `<mathfoo>`
fn find_math_open(html: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = html[from..].find("<math") {
        let idx = from + rel;
        match html[idx + "<math".len()..].chars().next() {
            Some('>') | Some(' ') | Some('\n') | Some('\t') | Some('\r') => return Some(idx),
            _ => from = idx + "<math".len(),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const KATEX: &str = concat!(
        "<span class=\"katex\"><math xmlns=\"http://www.w3.org/1998/Math/MathML\">",
        "<semantics><mrow><msup><mi>x</mi><mn>2</mn></msup></mrow>",
        "<annotation encoding=\"application/x-tex\">x^2</annotation></semantics></math></span>"
    );

    #[test]
    fn drops_semantics_and_annotation() {
        assert_eq!(
            extract_pure_mathml(KATEX).as_deref(),
            Some(
                "<math xmlns=\"http://www.w3.org/1998/Math/MathML\"><mrow><msup><mi>x</mi><mn>2</mn></msup></mrow></math>"
            )
        );
    }

    #[test]
    fn plain_math_is_kept() {
        let html = "<p><math><mi>a</mi></math></p>";
        assert_eq!(
            extract_pure_mathml(html).as_deref(),
            Some("<math><mi>a</mi></math>")
        );
    }

    #[test]
    fn no_math_element() {
        assert_eq!(extract_pure_mathml("<span>nothing</span>"), None);
        assert_eq!(extract_pure_mathml("<mathx></mathx>"), None);
        assert_eq!(extract_pure_mathml("<math>unterminated"), None);
    }
}
