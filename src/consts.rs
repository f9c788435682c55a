//! Reserved namespace URIs.

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace bound to the reserved `xmlns` prefix.
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

/// XHTML namespace, seeded into the `unique_ids` option.
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
