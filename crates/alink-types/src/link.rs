//! Links between metadata subtrees.
//!
//! On the wire a link is a JSON object:
//!
//! ```json
//! {".": {"auto_update": {"tag": "latest"}}, "/": "/qfab/<hash>/meta/public/asset_metadata", "order": 2}
//! ```
//!
//! The `"/"` string is either relative to the object being edited
//! (`./meta/...`, `./files/...`) or absolute into a specific version
//! (`/qfab/<hash>/meta/...`). Any additional keys (such as `order`) are
//! sidecar fields stored next to the link.

use serde_json::{Map, Value};

use crate::error::TypeError;
use crate::hash::VersionHash;
use crate::path;

/// Key holding the link target string.
pub const LINK_KEY: &str = "/";
/// Key holding link properties (`auto_update`, and `source` on resolved data).
pub const PROPS_KEY: &str = ".";
/// Sidecar key carrying an explicit collection order.
pub const ORDER_KEY: &str = "order";
/// Auto-update tag emitted on every link the codec writes.
pub const LATEST_TAG: &str = "latest";

const QFAB_PREFIX: &str = "/qfab/";

/// Where a link points.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LinkTarget {
    /// The object currently being edited (`./...`).
    Current,
    /// A specific immutable version (`/qfab/<hash>/...`).
    Version(VersionHash),
}

/// A parsed link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub target: LinkTarget,
    /// Path inside the target, without leading slash (`meta/public/asset_metadata`).
    pub path: String,
    /// Auto-update tag, normally `latest`.
    pub auto_update: Option<String>,
    /// Optional numeric order sidecar.
    pub order: Option<i64>,
}

impl Link {
    /// A link into the object being edited.
    pub fn relative(path: impl AsRef<str>) -> Self {
        Self {
            target: LinkTarget::Current,
            path: path::join([path.as_ref()]),
            auto_update: Some(LATEST_TAG.to_string()),
            order: None,
        }
    }

    /// A link into a specific version.
    pub fn versioned(hash: VersionHash, path: impl AsRef<str>) -> Self {
        Self {
            target: LinkTarget::Version(hash),
            path: path::join([path.as_ref()]),
            auto_update: Some(LATEST_TAG.to_string()),
            order: None,
        }
    }

    /// Build a link from the perspective of the object being edited: no
    /// target, or a target equal to the current version, yields a relative
    /// link; anything else an absolute one.
    pub fn for_target(
        current: &VersionHash,
        target: Option<&VersionHash>,
        path: impl AsRef<str>,
    ) -> Self {
        match target {
            Some(hash) if hash != current => Self::versioned(hash.clone(), path),
            _ => Self::relative(path),
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// The `"/"` string of this link.
    pub fn href(&self) -> String {
        match &self.target {
            LinkTarget::Current => format!("./{}", self.path),
            LinkTarget::Version(hash) => format!("{QFAB_PREFIX}{hash}/{}", self.path),
        }
    }

    /// Path inside the target's metadata tree, if this is a `meta/` link.
    pub fn meta_path(&self) -> Option<&str> {
        if self.path == "meta" {
            return Some("");
        }
        self.path.strip_prefix("meta/")
    }

    /// Path inside the target's files, if this is a `files/` link.
    pub fn file_path(&self) -> Option<&str> {
        self.path.strip_prefix("files/")
    }

    /// The version hash this link names, if absolute.
    pub fn version_hash(&self) -> Option<&VersionHash> {
        match &self.target {
            LinkTarget::Version(hash) => Some(hash),
            LinkTarget::Current => None,
        }
    }

    pub fn is_relative(&self) -> bool {
        self.target == LinkTarget::Current
    }

    /// Last segment of the link path (a slug, for slug-keyed collections).
    pub fn last_segment(&self) -> Option<&str> {
        path::last_segment(&self.path)
    }

    /// Parse a `"/"` string.
    pub fn parse_href(href: &str) -> Result<Self, TypeError> {
        if let Some(rest) = href.strip_prefix(QFAB_PREFIX) {
            let (hash, inner) = rest.split_once('/').unwrap_or((rest, ""));
            let hash = VersionHash::new(hash).map_err(|_| TypeError::MalformedLinkPath {
                path: href.to_string(),
                reason: "missing version hash".into(),
            })?;
            return Ok(Self::versioned(hash, inner));
        }
        let inner = href
            .strip_prefix("./")
            .or_else(|| href.strip_prefix('/'))
            .unwrap_or(href);
        Ok(Self::relative(inner))
    }

    /// Parse a link object. Fails if the value carries no `"/"` string.
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        let href = value
            .get(LINK_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| TypeError::NotALink(value.to_string()))?;
        let mut link = Self::parse_href(href)?;
        link.auto_update = value
            .get(PROPS_KEY)
            .and_then(|props| props.get("auto_update"))
            .and_then(|auto| auto.get("tag"))
            .and_then(Value::as_str)
            .map(str::to_string);
        link.order = value.get(ORDER_KEY).and_then(order_from_value);
        Ok(link)
    }

    /// Serialize to the wire object.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(order) = self.order {
            map.insert(ORDER_KEY.into(), Value::from(order));
        }
        if let Some(tag) = &self.auto_update {
            map.insert(
                PROPS_KEY.into(),
                serde_json::json!({ "auto_update": { "tag": tag } }),
            );
        }
        map.insert(LINK_KEY.into(), Value::String(self.href()));
        Value::Object(map)
    }
}

/// Returns `true` if the value is a link object (carries a `"/"` string).
pub fn is_link(value: &Value) -> bool {
    value.get(LINK_KEY).is_some_and(Value::is_string)
}

/// Read an explicit order sidecar. Integral numbers and strings holding an
/// integer are usable; anything else is treated as absent.
pub fn order_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
