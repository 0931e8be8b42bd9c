use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::bridge::OpenRequest;
use crate::error::PlayerError;

/// Where the media bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Bundled application asset.
    Asset,
    /// Remote URL, optionally with request headers.
    Network,
    /// Local file.
    File,
    /// Platform content-provider URI.
    ContentUri,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Network => "network",
            Self::File => "file",
            Self::ContentUri => "content-uri",
        }
    }

    pub fn is_supported(self) -> bool {
        matches!(self, Self::Network | Self::File)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media location handed to the native engine on open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    uri: String,
    kind: SourceKind,
    headers: BTreeMap<String, String>,
}

impl DataSource {
    pub fn network(url: impl Into<String>) -> Self {
        Self::new(url, SourceKind::Network)
    }

    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::new(
            format!("file://{}", path.as_ref().display()),
            SourceKind::File,
        )
    }

    pub fn asset(name: impl Into<String>) -> Self {
        Self::new(name, SourceKind::Asset)
    }

    pub fn content_uri(uri: impl Into<String>) -> Self {
        Self::new(uri, SourceKind::ContentUri)
    }

    fn new(uri: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            uri: uri.into(),
            kind,
            headers: BTreeMap::new(),
        }
    }

    /// Adds an HTTP request header. Only network sources forward headers.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub(crate) fn ensure_supported(&self) -> Result<(), PlayerError> {
        if self.kind.is_supported() {
            Ok(())
        } else {
            Err(PlayerError::UnsupportedSource { kind: self.kind })
        }
    }

    pub(crate) fn open_request(&self) -> OpenRequest {
        let headers = (self.kind == SourceKind::Network && !self.headers.is_empty())
            .then(|| self.headers.clone());
        OpenRequest {
            uri: self.uri.clone(),
            kind: self.kind,
            headers,
        }
    }
}
