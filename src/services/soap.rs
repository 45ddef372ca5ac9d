//! Minimal SOAP 1.1 plumbing for the two fixed Kevro RPCs. The feed
//! service exposes exactly two operations with flat string parameters
//! and flat response elements, so envelopes are assembled and picked
//! apart directly rather than through a full XML stack.

use crate::error::{Error, Result};

const SOAP_NS: &str = "http://tempuri.org/";

/// Build a SOAP 1.1 request envelope for `operation` with flat
/// element parameters.
pub fn request_envelope(operation: &str, params: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in params {
        body.push_str(&format!(
            "      <{name}>{}</{name}>\n",
            escape_xml(value)
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <soap:Envelope xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" \
         xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\n\
         \x20\x20<soap:Body>\n\
         \x20\x20\x20\x20<{operation} xmlns=\"{SOAP_NS}\">\n\
         {body}\
         \x20\x20\x20\x20</{operation}>\n\
         \x20\x20</soap:Body>\n\
         </soap:Envelope>"
    )
}

/// The SOAPAction header value for `operation`.
pub fn soap_action(operation: &str) -> String {
    format!("{SOAP_NS}{operation}")
}

/// Extract the text content of the first `<name>...</name>` element.
/// Returns an empty string for a self-closing element, `None` when the
/// element is absent.
pub fn extract_element(xml: &str, name: &str) -> Option<String> {
    let open = format!("<{name}");
    let mut search_from = 0;
    loop {
        let start = xml[search_from..].find(&open)? + search_from;
        let after = start + open.len();
        // Reject prefix matches like <ResponseDataExtra>.
        match xml.as_bytes().get(after) {
            Some(b'>') => {
                let content_start = after + 1;
                let close = format!("</{name}>");
                let end = xml[content_start..].find(&close)? + content_start;
                return Some(unescape_xml(&xml[content_start..end]));
            }
            Some(b' ') | Some(b'/') => {
                let tag_end = xml[after..].find('>')? + after;
                if xml.as_bytes()[tag_end - 1] == b'/' {
                    return Some(String::new());
                }
                let content_start = tag_end + 1;
                let close = format!("</{name}>");
                let end = xml[content_start..].find(&close)? + content_start;
                return Some(unescape_xml(&xml[content_start..end]));
            }
            _ => {
                search_from = after;
            }
        }
    }
}

/// Like [`extract_element`] but errors when the element is missing,
/// naming it in the diagnostic.
pub fn require_element(xml: &str, name: &str) -> Result<String> {
    extract_element(xml, name).ok_or_else(|| Error::Soap(format!("missing <{name}> element")))
}

/// Whether a flat boolean response element holds a truthy value.
pub fn element_is_true(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_escaped_envelope() {
        let envelope = request_envelope("login", &[("psw", "a<b&c")]);
        assert!(envelope.contains("<login xmlns=\"http://tempuri.org/\">"));
        assert!(envelope.contains("<psw>a&lt;b&amp;c</psw>"));
        assert!(envelope.contains("</soap:Envelope>"));
    }

    #[test]
    fn extracts_flat_elements() {
        let xml = "<GetFeedByEntityIDResult><Callresult>true</Callresult>\
                   <ResponseData>[{&quot;StockID&quot;:1}]</ResponseData>\
                   <ErrorMsg /></GetFeedByEntityIDResult>";

        assert_eq!(
            extract_element(xml, "Callresult").as_deref(),
            Some("true")
        );
        assert_eq!(
            extract_element(xml, "ResponseData").as_deref(),
            Some("[{\"StockID\":1}]")
        );
        assert_eq!(extract_element(xml, "ErrorMsg").as_deref(), Some(""));
        assert_eq!(extract_element(xml, "Missing"), None);
    }

    #[test]
    fn extracts_namespaced_elements() {
        let xml = "<loginResult xmlns=\"http://tempuri.org/\">true</loginResult>";
        assert_eq!(extract_element(xml, "loginResult").as_deref(), Some("true"));
    }

    #[test]
    fn does_not_match_element_name_prefixes() {
        let xml = "<ErrorMsgDetail>x</ErrorMsgDetail><ErrorMsg>boom</ErrorMsg>";
        assert_eq!(extract_element(xml, "ErrorMsg").as_deref(), Some("boom"));
    }

    #[test]
    fn missing_element_is_a_soap_error() {
        let err = require_element("<a>1</a>", "ResponseData").unwrap_err();
        assert!(err.to_string().contains("ResponseData"));
    }
}
