//! HTML fragment and `Link` header serialization.
//!
//! Pure formatting over resolved resource attributes. Attribute order
//! is fixed (`rel`, `as`, `type`, `crossorigin`, `href`) so output is
//! stable and snapshot-friendly.

use std::fmt::Write;

use crate::manifest::{ResourceMeta, ResourceType};

/// Attributes of one `<link>` resource hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAttributes {
    /// Link relation (`preload`, `modulepreload`, `prefetch`,
    /// `stylesheet`).
    pub rel: String,
    /// Resolved URL of the resource.
    pub href: String,
    /// `as=` content classification, when known.
    pub as_type: Option<String>,
    /// `type=` MIME attribute, when known (fonts, some images).
    pub mime_type: Option<String>,
    /// Whether to emit the bare `crossorigin` attribute.
    pub crossorigin: bool,
}

impl LinkAttributes {
    /// Serialize as an HTML `<link>` fragment.
    pub fn to_html(&self) -> String {
        let mut tag = format!("<link rel=\"{}\"", self.rel);
        if let Some(as_type) = &self.as_type {
            let _ = write!(tag, " as=\"{as_type}\"");
        }
        if let Some(mime_type) = &self.mime_type {
            let _ = write!(tag, " type=\"{mime_type}\"");
        }
        if self.crossorigin {
            tag.push_str(" crossorigin");
        }
        let _ = write!(tag, " href=\"{}\">", self.href);
        tag
    }

    /// Serialize as one HTTP `Link` header fragment:
    /// `<href>; rel="..."; as="..."; crossorigin`.
    pub fn to_header(&self) -> String {
        let mut fragment = format!("<{}>; rel=\"{}\"", self.href, self.rel);
        if let Some(as_type) = &self.as_type {
            let _ = write!(fragment, "; as=\"{as_type}\"");
        }
        if let Some(mime_type) = &self.mime_type {
            let _ = write!(fragment, "; type=\"{mime_type}\"");
        }
        if self.crossorigin {
            fragment.push_str("; crossorigin");
        }
        fragment
    }
}

/// `crossorigin` applies to styles, fonts, scripts and ES modules.
pub(crate) fn needs_crossorigin(resource: &ResourceMeta) -> bool {
    resource.module
        || matches!(
            resource.resource_type,
            Some(ResourceType::Style | ResourceType::Font | ResourceType::Script)
        )
}

/// Build the preload (or modulepreload) hint for one resource.
pub(crate) fn preload_link(resource: &ResourceMeta, href: String) -> LinkAttributes {
    LinkAttributes {
        rel: if resource.module { "modulepreload" } else { "preload" }.to_string(),
        href,
        as_type: resource.resource_type.map(|t| t.as_str().to_string()),
        mime_type: resource.mime_type.clone(),
        crossorigin: needs_crossorigin(resource),
    }
}

/// Build the prefetch hint for one resource.
pub(crate) fn prefetch_link(resource: &ResourceMeta, href: String) -> LinkAttributes {
    LinkAttributes {
        rel: "prefetch".to_string(),
        href,
        as_type: resource.resource_type.map(|t| t.as_str().to_string()),
        mime_type: resource.mime_type.clone(),
        crossorigin: needs_crossorigin(resource),
    }
}

/// Build the synchronous stylesheet link for one resource.
pub(crate) fn stylesheet_link(href: String) -> LinkAttributes {
    LinkAttributes {
        rel: "stylesheet".to_string(),
        href,
        as_type: None,
        mime_type: None,
        crossorigin: false,
    }
}

/// Serialize one `<script>` tag. Module scripts are deferred by the
/// platform already, so only classic scripts get `defer`; both always
/// set `crossorigin`.
pub(crate) fn script_tag(resource: &ResourceMeta, src: &str) -> String {
    if resource.module {
        format!("<script type=\"module\" src=\"{src}\" crossorigin></script>")
    } else {
        format!("<script src=\"{src}\" defer crossorigin></script>")
    }
}
