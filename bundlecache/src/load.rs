//! Resolving and parsing bundle files for a candidate identifier.
//!
//! [`TableLoader`] wraps a [`ResourceLoader`] with the bundle conventions:
//!
//! 1. Try `<identifier>.properties`; if nothing exists, try `<identifier>.xml`
//! 2. Decode text bundles with the per-identifier encoding, else the
//!    default encoding, else UTF-8
//! 3. Decode XML bundles from their byte order mark or `encoding`
//!    declaration (UTF-8 if neither), ignoring encoding settings

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use tracing::debug;

use crate::error::{LoadError, ResolveError};
use crate::properties::{parse_properties, parse_xml, Properties};
use crate::resource::{read_all, Resource, ResourceLoader};

/// Suffix of text property bundles.
pub const PROPERTIES_SUFFIX: &str = ".properties";

/// Suffix of XML property bundles.
pub const XML_SUFFIX: &str = ".xml";

/// Which encoding to use for which bundle.
#[derive(Debug, Clone, Default)]
pub struct EncodingPolicy {
    /// Encoding label used when no per-identifier override exists.
    pub default_encoding: Option<String>,

    /// Per-identifier overrides.
    pub file_encodings: HashMap<String, String>,
}

impl EncodingPolicy {
    /// The encoding label configured for an identifier, if any.
    pub fn label_for(&self, identifier: &str) -> Option<&str> {
        self.file_encodings
            .get(identifier)
            .or(self.default_encoding.as_ref())
            .map(String::as_str)
    }
}

/// Loads the resources behind candidate identifiers.
pub struct TableLoader {
    loader: Arc<dyn ResourceLoader>,
    encodings: EncodingPolicy,
}

impl TableLoader {
    pub fn new(loader: Arc<dyn ResourceLoader>, encodings: EncodingPolicy) -> Self {
        Self { loader, encodings }
    }

    /// Resources backing `identifier`, in merge order.
    ///
    /// Returns an empty list when neither a properties nor an XML bundle
    /// exists. Non-existent handles are filtered out.
    pub fn resolve(&self, identifier: &str) -> Result<Vec<Arc<dyn Resource>>, ResolveError> {
        let resources = self.existing(&format!("{}{}", identifier, PROPERTIES_SUFFIX))?;
        if !resources.is_empty() {
            return Ok(resources);
        }
        self.existing(&format!("{}{}", identifier, XML_SUFFIX))
    }

    fn existing(&self, location: &str) -> Result<Vec<Arc<dyn Resource>>, ResolveError> {
        let mut resources = self.loader.resolve(location)?;
        resources.retain(|resource| {
            let exists = resource.exists();
            if !exists {
                debug!(resource = %resource.display_name(), "No bundle file");
            }
            exists
        });
        Ok(resources)
    }

    /// Read and parse one resource of `identifier`.
    pub fn parse(&self, resource: &dyn Resource, identifier: &str) -> Result<Properties, LoadError> {
        let name = resource.display_name();
        let bytes = read_all(resource).map_err(|source| LoadError::Read {
            resource: name.clone(),
            source,
        })?;

        if is_xml(resource) {
            debug!(resource = %name, "Loading XML bundle");
            let text = decode_xml(&bytes).map_err(|encoding| LoadError::UnknownEncoding {
                resource: name.clone(),
                encoding,
            })?;
            return parse_xml(&text).map_err(|source| LoadError::Parse {
                resource: name,
                source,
            });
        }

        let text = match self.encodings.label_for(identifier) {
            Some(label) => {
                debug!(resource = %name, encoding = label, "Loading bundle");
                decode(&bytes, label).ok_or_else(|| LoadError::UnknownEncoding {
                    resource: name.clone(),
                    encoding: label.to_string(),
                })?
            }
            None => {
                debug!(resource = %name, "Loading bundle");
                decode_with(&bytes, UTF_8)
            }
        };

        parse_properties(&text).map_err(|source| LoadError::Parse {
            resource: name,
            source,
        })
    }
}

fn is_xml(resource: &dyn Resource) -> bool {
    resource
        .filename()
        .unwrap_or_else(|| resource.display_name())
        .ends_with(XML_SUFFIX)
}

/// Decode with an encoding label, `None` if the label is unknown.
fn decode<'a>(bytes: &'a [u8], label: &str) -> Option<Cow<'a, str>> {
    Encoding::for_label(label.trim().as_bytes()).map(|encoding| decode_with(bytes, encoding))
}

/// Decode an XML document. The error carries an unrecognised declared label.
fn decode_xml(bytes: &[u8]) -> Result<Cow<'_, str>, String> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return Ok(decode_with(bytes, encoding));
    }
    match declared_encoding(bytes) {
        Some(label) => decode(bytes, &label).ok_or(label),
        None => Ok(decode_with(bytes, UTF_8)),
    }
}

/// The `encoding` pseudo-attribute of a leading `<?xml ...?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    static DECLARATION: OnceLock<Regex> = OnceLock::new();
    let pattern = DECLARATION.get_or_init(|| {
        Regex::new(r#"^<\?xml[^>]*?\sencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
            .expect("XML declaration pattern is a valid regex")
    });
    pattern
        .captures(bytes)
        .map(|caps| String::from_utf8_lossy(&caps[1]).into_owned())
}

fn decode_with<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    let (text, _, _) = encoding.decode(bytes);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::EmbeddedLoader;

    fn table_loader(loader: EmbeddedLoader, encodings: EncodingPolicy) -> TableLoader {
        TableLoader::new(Arc::new(loader), encodings)
    }

    #[test]
    fn test_encoding_policy_precedence() {
        let mut policy = EncodingPolicy {
            default_encoding: Some("UTF-8".to_string()),
            file_encodings: HashMap::new(),
        };
        policy
            .file_encodings
            .insert("app_de".to_string(), "ISO-8859-1".to_string());

        assert_eq!(policy.label_for("app_de"), Some("ISO-8859-1"));
        assert_eq!(policy.label_for("app_fr"), Some("UTF-8"));
        assert_eq!(EncodingPolicy::default().label_for("app"), None);
    }

    #[test]
    fn test_resolve_prefers_properties() {
        let loader = table_loader(
            EmbeddedLoader::new()
                .with("app.properties", "k=props")
                .with("app.xml", r#"<properties><entry key="k">xml</entry></properties>"#),
            EncodingPolicy::default(),
        );

        let resources = loader.resolve("app").unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].display_name(), "embedded:app.properties");
    }

    #[test]
    fn test_resolve_falls_back_to_xml() {
        let loader = table_loader(
            EmbeddedLoader::new()
                .with("app.xml", r#"<properties><entry key="k">xml</entry></properties>"#),
            EncodingPolicy::default(),
        );

        let resources = loader.resolve("app").unwrap();
        assert_eq!(resources.len(), 1);
        let props = loader.parse(resources[0].as_ref(), "app").unwrap();
        assert_eq!(props["k"], "xml");
    }

    #[test]
    fn test_resolve_nothing() {
        let loader = table_loader(EmbeddedLoader::new(), EncodingPolicy::default());
        assert!(loader.resolve("app").unwrap().is_empty());
    }

    #[test]
    fn test_parse_default_is_utf8() {
        let loader = table_loader(
            EmbeddedLoader::new().with("app.properties", "k=café"),
            EncodingPolicy::default(),
        );
        let resource = &loader.resolve("app").unwrap()[0];
        assert_eq!(loader.parse(resource.as_ref(), "app").unwrap()["k"], "café");
    }

    #[test]
    fn test_parse_with_file_encoding() {
        // "café" in ISO-8859-1
        let latin1: &[u8] = b"k=caf\xe9";
        let mut encodings = EncodingPolicy::default();
        encodings
            .file_encodings
            .insert("app_fr".to_string(), "ISO-8859-1".to_string());

        let loader = table_loader(
            EmbeddedLoader::new().with("app_fr.properties", latin1),
            encodings,
        );
        let resource = &loader.resolve("app_fr").unwrap()[0];
        assert_eq!(loader.parse(resource.as_ref(), "app_fr").unwrap()["k"], "café");
    }

    #[test]
    fn test_parse_unknown_encoding() {
        let encodings = EncodingPolicy {
            default_encoding: Some("KLINGON-8".to_string()),
            file_encodings: HashMap::new(),
        };
        let loader = table_loader(EmbeddedLoader::new().with("app.properties", "k=v"), encodings);
        let resource = &loader.resolve("app").unwrap()[0];

        let err = loader.parse(resource.as_ref(), "app").unwrap_err();
        assert!(matches!(err, LoadError::UnknownEncoding { .. }));
    }

    #[test]
    fn test_xml_ignores_encoding_override() {
        let encodings = EncodingPolicy {
            default_encoding: Some("KLINGON-8".to_string()),
            file_encodings: HashMap::new(),
        };
        let loader = table_loader(
            EmbeddedLoader::new()
                .with("app.xml", r#"<properties><entry key="k">ü</entry></properties>"#),
            encodings,
        );
        let resource = &loader.resolve("app").unwrap()[0];
        assert_eq!(loader.parse(resource.as_ref(), "app").unwrap()["k"], "ü");
    }

    #[test]
    fn test_xml_honours_declared_encoding() {
        let latin1: &[u8] = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n\
            <properties><entry key=\"k\">caf\xe9</entry></properties>";
        let loader = table_loader(
            EmbeddedLoader::new().with("app.xml", latin1),
            EncodingPolicy::default(),
        );
        let resource = &loader.resolve("app").unwrap()[0];
        assert_eq!(loader.parse(resource.as_ref(), "app").unwrap()["k"], "café");
    }

    #[test]
    fn test_xml_byte_order_mark_wins() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in r#"<properties><entry key="k">ß</entry></properties>"#.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let loader = table_loader(
            EmbeddedLoader::new().with("app.xml", bytes),
            EncodingPolicy::default(),
        );
        let resource = &loader.resolve("app").unwrap()[0];
        assert_eq!(loader.parse(resource.as_ref(), "app").unwrap()["k"], "ß");
    }

    #[test]
    fn test_xml_unknown_declared_encoding() {
        let loader = table_loader(
            EmbeddedLoader::new().with(
                "app.xml",
                r#"<?xml version="1.0" encoding="KLINGON-8"?><properties/>"#,
            ),
            EncodingPolicy::default(),
        );
        let resource = &loader.resolve("app").unwrap()[0];
        let err = loader.parse(resource.as_ref(), "app").unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnknownEncoding { ref encoding, .. } if encoding == "KLINGON-8"
        ));
    }

    #[test]
    fn test_declared_encoding() {
        assert_eq!(
            declared_encoding(br#"<?xml version="1.0" encoding='windows-1252' ?><a/>"#).as_deref(),
            Some("windows-1252")
        );
        assert_eq!(declared_encoding(br#"<?xml version="1.0"?><a/>"#), None);
        assert_eq!(declared_encoding(br#"<a encoding="latin1"/>"#), None);
    }

    #[test]
    fn test_parse_error() {
        let loader = table_loader(
            EmbeddedLoader::new().with("app.properties", "k=\\uZZZZ"),
            EncodingPolicy::default(),
        );
        let resource = &loader.resolve("app").unwrap()[0];
        let err = loader.parse(resource.as_ref(), "app").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
