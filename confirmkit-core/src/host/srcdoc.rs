//! Generates the `srcdoc` HTML that boots a widget inside its iframe.

use std::fmt::Write as _;

use crate::error::ProtocolError;

/// Builds the iframe document: transparent page, the bootstrap module script
/// and one instance of the widget element.
///
/// # Errors
/// Returns [`ProtocolError::InvalidConfig`] when `tag_name` is not a valid
/// custom element name or the script URL is empty.
pub fn build_srcdoc(
    tag_name: &str,
    bootstrap_url: &str,
    background_color: Option<&str>,
) -> Result<String, ProtocolError> {
    validate_tag_name(tag_name)?;
    if bootstrap_url.trim().is_empty() {
        return Err(ProtocolError::InvalidConfig(
            "bootstrap script url is empty".to_string(),
        ));
    }

    let mut html = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <style>html,body{margin:0;padding:0;background:transparent;overflow:hidden}</style>",
    );
    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "<script type=\"module\" src=\"{}\"></script></head><body>",
        escape_html(bootstrap_url)
    );
    match background_color {
        Some(color) => {
            let _ = write!(
                html,
                "<{tag_name} style=\"--button-background:{}\"></{tag_name}>",
                escape_html(color)
            );
        }
        None => {
            let _ = write!(html, "<{tag_name}></{tag_name}>");
        }
    }
    html.push_str("</body></html>");
    Ok(html)
}

fn validate_tag_name(tag_name: &str) -> Result<(), ProtocolError> {
    let valid = tag_name.contains('-')
        && tag_name.starts_with(|c: char| c.is_ascii_lowercase())
        && tag_name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_'));
    if valid {
        Ok(())
    } else {
        Err(ProtocolError::InvalidConfig(format!(
            "{tag_name:?} is not a valid custom element name"
        )))
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_embeds_script_and_element() {
        let html = build_srcdoc("tx-confirmer", "https://wallet.example/boot.js", None).unwrap();
        assert!(html.contains(r#"<script type="module" src="https://wallet.example/boot.js"></script>"#));
        assert!(html.contains("<tx-confirmer></tx-confirmer>"));
        assert!(html.contains("background:transparent"));
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let html = build_srcdoc(
            "tx-confirmer",
            "/boot.js?a=1&b=\"2\"",
            Some("red\"><script>"),
        )
        .unwrap();
        assert!(html.contains("/boot.js?a=1&amp;b=&quot;2&quot;"));
        assert!(!html.contains("red\"><script>"));
    }

    #[test]
    fn test_rejects_invalid_tag_names() {
        for tag in ["button", "Tx-Confirmer", "1-tag", "tx confirmer", "tx-<b>"] {
            assert!(
                matches!(build_srcdoc(tag, "/boot.js", None), Err(ProtocolError::InvalidConfig(_))),
                "{tag} accepted"
            );
        }
    }

    #[test]
    fn test_rejects_empty_script_url() {
        assert!(build_srcdoc("tx-confirmer", "  ", None).is_err());
    }
}
