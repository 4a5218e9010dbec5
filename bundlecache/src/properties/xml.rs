//! XML properties documents.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">
//! <properties>
//!   <comment>optional</comment>
//!   <entry key="greeting">Hello, {0}!</entry>
//! </properties>
//! ```
//!
//! Entry text is taken verbatim (no trimming) with XML entities resolved.
//! Elements other than `<entry>` are ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::Properties;
use crate::error::PropertiesError;

/// Parse an XML properties document.
///
/// # Example
///
/// ```
/// use bundlecache::properties::parse_xml;
///
/// let props = parse_xml(r#"<properties><entry key="k">v &amp; w</entry></properties>"#).unwrap();
/// assert_eq!(props["k"], "v & w");
/// ```
pub fn parse_xml(text: &str) -> Result<Properties, PropertiesError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut properties = Properties::new();
    // Key and accumulated text of the <entry> being read
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if e.name().as_ref() == b"entry" => {
                current = Some((entry_key(&e)?, String::new()));
            }
            Event::Empty(e) if e.name().as_ref() == b"entry" => {
                properties.insert(entry_key(&e)?, String::new());
            }
            Event::Text(t) => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(c) => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) if e.name().as_ref() == b"entry" => {
                if let Some((key, value)) = current.take() {
                    properties.insert(key, value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if current.is_some() {
        return Err(PropertiesError::Xml("unterminated <entry> element".to_string()));
    }

    Ok(properties)
}

fn entry_key(element: &BytesStart<'_>) -> Result<String, PropertiesError> {
    let attribute = element
        .try_get_attribute("key")
        .map_err(xml_error)?
        .ok_or(PropertiesError::MissingKey)?;
    let key = attribute.unescape_value().map_err(xml_error)?;
    Ok(key.into_owned())
}

fn xml_error(e: impl std::fmt::Display) -> PropertiesError {
    PropertiesError::Xml(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">
<properties>
  <comment>Greetings</comment>
  <entry key="greeting">Hello, {0}!</entry>
  <entry key="farewell">  Bye  </entry>
</properties>
"#;

    #[test]
    fn test_parse_entries() {
        let props = parse_xml(DOCUMENT).unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props["greeting"], "Hello, {0}!");
        assert_eq!(props["farewell"], "  Bye  ");
    }

    #[test]
    fn test_comment_is_not_an_entry() {
        let props = parse_xml(DOCUMENT).unwrap();
        assert!(!props.values().any(|v| v == "Greetings"));
    }

    #[test]
    fn test_entities_and_cdata() {
        let props = parse_xml(
            r#"<properties><entry key="a&amp;b">x &lt; y</entry><entry key="c"><![CDATA[<b>bold</b>]]></entry></properties>"#,
        )
        .unwrap();
        assert_eq!(props["a&b"], "x < y");
        assert_eq!(props["c"], "<b>bold</b>");
    }

    #[test]
    fn test_empty_entry() {
        let props = parse_xml(r#"<properties><entry key="blank"/></properties>"#).unwrap();
        assert_eq!(props["blank"], "");
    }

    #[test]
    fn test_missing_key_attribute() {
        let err = parse_xml("<properties><entry>v</entry></properties>").unwrap_err();
        assert_eq!(err, PropertiesError::MissingKey);
    }

    #[test]
    fn test_malformed_document() {
        let result = parse_xml(r#"<properties><entry key="k">v</wrong></properties>"#);
        assert!(matches!(result, Err(PropertiesError::Xml(_))));
    }
}
