use crate::link_index::LinkIndex;
use crate::model::Link;

const SCHEME: &str = "https:";

/// Absolute URL of the asset behind `asset_ref`, or `None` when the reference
/// is absent, dangling, or the asset carries no usable `file.url`.
pub fn resolve_image_url(asset_ref: Option<&Link>, index: &LinkIndex<'_>) -> Option<String> {
    let asset = index.resolve_link(asset_ref?)?;
    let stored = asset.fields.get("file")?.get("url")?.as_str()?;
    absolute_asset_url(stored)
}

/// Applies the `https:` scheme to a protocol-relative stored URL. Values that
/// already carry an http(s) scheme are returned unchanged; anything else is
/// not a usable URL.
pub fn absolute_asset_url(stored: &str) -> Option<String> {
    let stored = stored.trim();
    if let Some(rest) = stored.strip_prefix("//") {
        if rest.is_empty() || rest.starts_with('/') {
            return None;
        }
        return Some(format!("{SCHEME}{stored}"));
    }
    if has_http_scheme(stored) {
        return Some(stored.to_string());
    }
    None
}

fn has_http_scheme(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    ["https://", "http://"]
        .iter()
        .any(|scheme| lower.len() > scheme.len() && lower.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fields, Record};
    use serde_json::json;

    fn asset(id: &str, file: serde_json::Value) -> Record {
        Record::asset(id, Fields::new().with("file", file))
    }

    #[test]
    fn prefixes_protocol_relative_url() {
        let assets = vec![asset(
            "img",
            json!({ "url": "//images.ctfassets.net/space/img/hero.jpg" }),
        )];
        let index = LinkIndex::build(&[], &[], &assets);
        assert_eq!(
            resolve_image_url(Some(&Link::new("img")), &index).as_deref(),
            Some("https://images.ctfassets.net/space/img/hero.jpg")
        );
    }

    #[test]
    fn absent_reference_is_absent() {
        let index = LinkIndex::build(&[], &[], &[]);
        assert_eq!(resolve_image_url(None, &index), None);
    }

    #[test]
    fn dangling_reference_is_absent() {
        let index = LinkIndex::build(&[], &[], &[]);
        assert_eq!(resolve_image_url(Some(&Link::new("gone")), &index), None);
    }

    #[test]
    fn malformed_asset_data_is_absent() {
        let assets = vec![
            Record::asset("no-file", Fields::new()),
            asset("no-url", json!({ "fileName": "hero.jpg" })),
            asset("number-url", json!({ "url": 42 })),
            asset("empty-url", json!({ "url": "" })),
            asset("relative", json!({ "url": "images/hero.jpg" })),
        ];
        let index = LinkIndex::build(&[], &[], &assets);
        for id in ["no-file", "no-url", "number-url", "empty-url", "relative"] {
            assert_eq!(resolve_image_url(Some(&Link::new(id)), &index), None, "{id}");
        }
    }

    #[test]
    fn never_double_prefixes_scheme() {
        let once = absolute_asset_url("//cdn.example.com/a.png").expect("url");
        let twice = absolute_asset_url(&once).expect("url");
        assert_eq!(twice, "https://cdn.example.com/a.png");
        assert_eq!(twice.matches("https:").count(), 1);
    }
}
