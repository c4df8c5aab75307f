//! Request and payload types for internal pages.
//!
//! The networking host hands the dispatcher a [`PageRequest`] with the
//! already-split `path` and `host` of an internal URL. URL parsing itself
//! is the host's concern; `url` is carried for diagnostics only.

/// A request for an internal page.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Display form of the requested URL, used in error messages.
    pub url: String,
    /// Host component. An URL like `lumen://help/index.html` has host
    /// `help` and path `/index.html`.
    pub host: String,
    /// Path component. An URL like `lumen:version` is split as
    /// `scheme:path`, not `scheme:host`.
    pub path: String,
}

impl PageRequest {
    /// Creates a new request from pre-split URL components.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            host: host.into(),
            path: path.into(),
        }
    }

    /// Returns the file name of the requested resource: the last path
    /// segment, or `None` when the path is empty or ends in `/`.
    ///
    /// Used for content-type inference only.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self.path.rsplit('/').next() {
            Some(segment) if !segment.is_empty() => Some(segment),
            _ => None,
        }
    }
}

/// A successfully rendered page: raw bytes plus a content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePayload {
    /// Rendered page bytes.
    pub data: Vec<u8>,
    /// Content type inferred from the requested resource's file
    /// extension, `text/html` when nothing could be inferred.
    pub mime_type: String,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_last_path_segment() {
        let req = PageRequest::new("lumen://help/img/banner.png", "help", "/img/banner.png");
        assert_eq!(req.file_name(), Some("banner.png"));
    }

    #[test]
    fn file_name_absent_for_empty_path() {
        let req = PageRequest::new("lumen://version", "version", "");
        assert_eq!(req.file_name(), None);
    }

    #[test]
    fn file_name_absent_for_trailing_slash() {
        let req = PageRequest::new("lumen://help/", "help", "/");
        assert_eq!(req.file_name(), None);
    }
}
