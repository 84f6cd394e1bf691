//! WMS GetFeatureInfo query augmentation.
//!
//! The map client sends the WMS endpoint as `RequestURL` (normally the first
//! parameter, ending in `?`) followed by the click-specific parameters. The
//! outbound URL is every inbound parameter except `url`, then the fixed OGC
//! parameters below, all joined as `key=value&...` with the `RequestURL=`
//! marker stripped out so the endpoint becomes the URL prefix.

use crate::relay::params::{join_pairs, ParamList};

/// Parameter naming the WMS endpoint.
pub const REQUEST_URL_PARAM: &str = "RequestURL";

/// Parameter naming the queried layer.
pub const LAYERS_PARAM: &str = "LAYERS";

/// Routing parameter added by the hosting application; never forwarded.
pub const EXCLUDED_PARAM: &str = "url";

/// Protocol parameters appended to every GetFeatureInfo call. Values are
/// sent verbatim, including their pre-applied escapes.
pub const STATIC_PARAMS: [(&str, &str); 8] = [
    ("REQUEST", "GetFeatureInfo"),
    ("INFO_FORMAT", "application/vnd.ogc.gml"),
    ("VERSION", "1.1.1"),
    ("TRANSPARENT", "true"),
    ("STYLE", ""),
    ("EXCEPTIONS", "application%2Fvnd.ogc.se_xml"),
    ("FORMAT", "image%2Fpng"),
    ("SRS", "EPSG%3A4326"),
];

/// Build the outbound GetFeatureInfo URL from the inbound query.
pub fn augmented_url(query: &ParamList) -> String {
    let mut pairs: Vec<(&str, &str)> = query
        .iter()
        .filter(|(k, _)| *k != EXCLUDED_PARAM)
        .collect();
    for (k, v) in STATIC_PARAMS {
        pairs.push((k, v));
    }
    join_pairs(pairs)
        .trim_matches('&')
        .replace(&format!("{}=", REQUEST_URL_PARAM), "")
}
