//! WMTS `GetTile` request descriptors.

use std::fmt;

use crate::cluster::Node;
use crate::http::Url;

/// Cache key of a single tile plus any extra query parameters.
///
/// The mandatory WMTS parameters are derived from the key fields. Extra
/// parameters are matched against them case-insensitively: an extra with
/// the same name as a mandatory parameter replaces it, any other extra is
/// appended. `STYLE` is empty unless an extra supplies it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileRequest {
    pub layer: String,
    pub gridset: String,
    pub format: String,
    pub column: u32,
    pub row: u32,
    pub zoom: u32,
    pub parameters: Vec<(String, String)>,
}

impl TileRequest {
    pub fn new(
        layer: impl Into<String>,
        gridset: impl Into<String>,
        format: impl Into<String>,
        column: u32,
        row: u32,
        zoom: u32,
    ) -> Self {
        Self {
            layer: layer.into(),
            gridset: gridset.into(),
            format: format.into(),
            column,
            row,
            zoom,
            parameters: Vec::new(),
        }
    }

    /// Adds an extra parameter, replacing an earlier extra with the same name.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.parameters.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.parameters.push((key, value.into()));
        self
    }

    /// Same tile coordinates at another position.
    pub fn at(&self, column: u32, row: u32, zoom: u32) -> Self {
        Self {
            column,
            row,
            zoom,
            ..self.clone()
        }
    }

    /// `{gridset}:{zoom}`.
    pub fn tile_matrix(&self) -> String {
        format!("{}:{}", self.gridset, self.zoom)
    }

    /// The final query parameters, mandatory ones first.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = vec![
            ("SERVICE".to_string(), "WMTS".to_string()),
            ("VERSION".to_string(), "1.0.0".to_string()),
            ("REQUEST".to_string(), "GetTile".to_string()),
            ("LAYER".to_string(), self.layer.clone()),
            ("STYLE".to_string(), String::new()),
            ("TILEMATRIXSET".to_string(), self.gridset.clone()),
            ("TILEMATRIX".to_string(), self.tile_matrix()),
            ("FORMAT".to_string(), self.format.clone()),
            ("TILECOL".to_string(), self.column.to_string()),
            ("TILEROW".to_string(), self.row.to_string()),
        ];

        for (key, value) in &self.parameters {
            match pairs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                Some(pair) => *pair = (key.clone(), value.clone()),
                None => pairs.push((key.clone(), value.clone())),
            }
        }
        pairs
    }

    /// The `GetTile` URL for this tile on `node`.
    pub fn url(&self, node: &Node) -> Url {
        let mut url = node.wmts();
        url.query_pairs_mut().extend_pairs(self.query_pairs());
        url
    }
}

impl fmt::Display for TileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({},{}) {}",
            self.layer,
            self.tile_matrix(),
            self.column,
            self.row,
            self.format
        )?;
        for (key, value) in &self.parameters {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request() -> TileRequest {
        TileRequest::new("topp:states", "EPSG:4326", "image/png", 3, 2, 3)
    }

    fn value_of<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_mandatory_parameters() {
        let pairs = request().query_pairs();
        assert_eq!(pairs.len(), 10);
        assert_eq!(value_of(&pairs, "LAYER"), Some("topp:states"));
        assert_eq!(value_of(&pairs, "TILEMATRIX"), Some("EPSG:4326:3"));
        assert_eq!(value_of(&pairs, "TILECOL"), Some("3"));
        assert_eq!(value_of(&pairs, "TILEROW"), Some("2"));
        assert_eq!(value_of(&pairs, "STYLE"), Some(""));
        assert_eq!(value_of(&pairs, "REQUEST"), Some("GetTile"));
    }

    #[test]
    fn test_extra_parameter_is_appended() {
        let pairs = request().with_parameter("foo", "a").query_pairs();
        assert_eq!(pairs.len(), 11);
        assert_eq!(pairs.last(), Some(&("foo".to_string(), "a".to_string())));
    }

    #[test]
    fn test_extra_overrides_mandatory_case_insensitively() {
        let pairs = request().with_parameter("format", "image/jpeg").query_pairs();
        assert_eq!(pairs.len(), 10);
        assert_eq!(value_of(&pairs, "FORMAT"), Some("image/jpeg"));
    }

    #[test]
    fn test_explicit_style_replaces_default() {
        let pairs = request().with_parameter("Style", "population").query_pairs();
        assert_eq!(value_of(&pairs, "STYLE"), Some("population"));
        assert_eq!(pairs.iter().filter(|(k, _)| k.eq_ignore_ascii_case("style")).count(), 1);
    }

    #[test]
    fn test_url_encodes_values() {
        let node = Node::parse("http://node1:8080/geoserver").unwrap();
        let url = request().with_parameter("FOO", "İ").url(&node);
        assert_eq!(url.path(), "/geoserver/gwc/service/wmts");

        let query = url.query().unwrap();
        assert!(query.contains("TILEMATRIX=EPSG%3A4326%3A3"));
        assert!(query.contains("FOO=%C4%B0"));

        let decoded: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(value_of(&decoded, "FOO"), Some("İ"));
    }

    #[test]
    fn test_with_parameter_replaces_earlier_extra() {
        let request = request().with_parameter("FOO", "a").with_parameter("foo", "b");
        assert_eq!(request.parameters, vec![("foo".to_string(), "b".to_string())]);
    }

    #[test]
    fn test_display_names_key() {
        let text = request().with_parameter("FOO", "a").to_string();
        assert_eq!(text, "topp:states EPSG:4326:3 (3,2) image/png FOO=a");
    }

    proptest! {
        #[test]
        fn prop_every_key_appears_once(
            extras in proptest::collection::vec(("[a-zA-Z]{1,10}", "[ -~]{0,12}"), 0..8)
        ) {
            let mut request = request();
            for (key, value) in &extras {
                request = request.with_parameter(key.clone(), value.clone());
            }
            let pairs = request.query_pairs();

            for (key, _) in &pairs {
                let count = pairs.iter().filter(|(k, _)| k.eq_ignore_ascii_case(key)).count();
                prop_assert_eq!(count, 1);
            }
            for (key, value) in &request.parameters {
                prop_assert_eq!(value_of(&pairs, key), Some(value.as_str()));
            }
        }

        #[test]
        fn prop_url_round_trips_values(value in "\\PC{0,16}") {
            let node = Node::parse("http://node1:8080/geoserver/").unwrap();
            let url = request().with_parameter("FOO", value.clone()).url(&node);
            let decoded: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            prop_assert_eq!(decoded, request().with_parameter("FOO", value).query_pairs());
        }
    }
}
