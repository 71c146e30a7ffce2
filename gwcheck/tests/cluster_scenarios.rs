//! End-to-end scenario runs against a simulated two node cluster.
//!
//! The simulated nodes share one configuration store and, unless told
//! otherwise, one tile cache. Tiles are cached per blob store, gridset,
//! position and parameter partition; changing a gridset's tile size, a
//! layer's parameter filters or mass truncating invalidates the affected
//! tiles the way a real server does.

use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use gwcheck::cluster::CheckError;
use gwcheck::config::ConfigFile;
use gwcheck::http::{HttpRequest, HttpResponse, StatusCode, Transport, TransportError, AUTHORIZATION};
use gwcheck::rest::resources::{
    layer_blobstore, layer_has_grid_subset, parameter_filter_normalization, tile_size,
};
use gwcheck::xml::{text_element, Document, Element, ElementExt};
use gwcheck::{Harness, HarnessError, Scenario};
use image::{DynamicImage, ImageFormat, RgbaImage};
use tempfile::TempDir;

const LAYER: &str = "topp:states";
const CACHE_HEADER: &str = "geowebcache-cache-result";
/// `admin:geoserver`
const ADMIN_AUTHORIZATION: &str = "Basic YWRtaW46Z2Vvc2VydmVy";
const DEFAULT_STORE: &str = "(default)";

const CONFIG: &str = "\
[cluster]
nodes = http://node1:8080/geoserver/, http://node2:8080/geoserver/
layer = topp:states

[rest]
strip_class_attributes = false
timeout_secs = 5
cache_result_header = geowebcache-cache-result

[admin_credential]
type = basic
username = admin
password = geoserver

[user_credential]
type = anonymous

[gridset]
manual_truncate_on_change = false

[parameter_filter]
manual_truncate_on_change = false

[file_blobstore]
path = /tmp/testBlobStore
cache_deleted_when_blobstore_changes = false

[s3_blobstore]
bucket = tiles
prefix = cluster-test
aws_access_key = AKIDEXAMPLE
aws_secret_key = secret
";

const INITIAL_LAYER: &str = "<GeoServerLayer>\
<name>topp:states</name>\
<enabled>true</enabled>\
<gridSubsets><gridSubset><gridSetName>EPSG:4326</gridSetName></gridSubset></gridSubsets>\
<parameterFilters><styleParameterFilter><key>STYLES</key><defaultValue></defaultValue></styleParameterFilter></parameterFilters>\
</GeoServerLayer>";

const WORLD_GRIDSET: &str = "<gridSet>\
<name>EPSG:4326</name>\
<tileHeight>256</tileHeight>\
<tileWidth>256</tileWidth>\
</gridSet>";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CachedTile {
    node: Option<String>,
    store: String,
    gridset: String,
    position: String,
    partition: Vec<String>,
}

struct State {
    gridsets: BTreeMap<String, Document>,
    layer: Document,
    blobstores: BTreeMap<String, Document>,
    cache: HashSet<CachedTile>,
}

struct SimulatedCluster {
    state: Mutex<State>,
    shared_cache: bool,
}

impl SimulatedCluster {
    fn new() -> Self {
        let mut gridsets = BTreeMap::new();
        gridsets.insert(
            "EPSG:4326".to_string(),
            Document::parse_str(WORLD_GRIDSET).unwrap(),
        );
        Self {
            state: Mutex::new(State {
                gridsets,
                layer: Document::parse_str(INITIAL_LAYER).unwrap(),
                blobstores: BTreeMap::new(),
                cache: HashSet::new(),
            }),
            shared_cache: true,
        }
    }

    /// Every node keeps its own tile cache.
    fn split_cache() -> Self {
        Self {
            shared_cache: false,
            ..Self::new()
        }
    }

    fn layer(&self) -> Document {
        self.state.lock().unwrap().layer.clone()
    }

    fn wmts(&self, state: &mut State, request: &HttpRequest) -> HttpResponse {
        let query: Vec<(String, String)> = request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let param = |name: &str| {
            query
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        };

        if param("REQUEST") == Some("GetCapabilities") {
            return xml(&capabilities(state));
        }
        if param("REQUEST") != Some("GetTile") || param("LAYER") != Some(LAYER) {
            return status(StatusCode::BAD_REQUEST);
        }

        let (Some(gridset), Some(matrix), Some(column), Some(row)) = (
            param("TILEMATRIXSET"),
            param("TILEMATRIX"),
            param("TILECOL"),
            param("TILEROW"),
        ) else {
            return status(StatusCode::BAD_REQUEST);
        };
        if !layer_has_grid_subset(&state.layer, gridset) {
            return status(StatusCode::BAD_REQUEST);
        }
        let Some((width, height)) = state.gridsets.get(gridset).and_then(tile_size) else {
            return status(StatusCode::BAD_REQUEST);
        };

        let mut partition = Vec::new();
        for filter in string_filters(&state.layer) {
            match filter.partition(param(&filter.key)) {
                Some(value) => partition.push(value),
                None => return status(StatusCode::INTERNAL_SERVER_ERROR),
            }
        }

        let tile = CachedTile {
            node: if self.shared_cache {
                None
            } else {
                request.url.host_str().map(str::to_string)
            },
            store: layer_blobstore(&state.layer).unwrap_or_else(|| DEFAULT_STORE.to_string()),
            gridset: gridset.to_string(),
            position: format!("{}/{}/{}", matrix, column, row),
            partition,
        };
        let result = if state.cache.insert(tile) { "MISS" } else { "HIT" };

        HttpResponse::new(StatusCode::OK, png(width, height))
            .with_header("Content-Type", "image/png")
            .with_header(CACHE_HEADER, result)
    }
}

impl Transport for SimulatedCluster {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|s| s.skip_while(|s| *s != "gwc").skip(1).map(str::to_string).collect())
            .unwrap_or_default();
        let path: Vec<&str> = segments.iter().map(String::as_str).collect();

        let mut state = self.state.lock().unwrap();
        let response = match path.as_slice() {
            ["service", "wmts"] => self.wmts(&mut state, request),
            ["rest", resource @ ..] => {
                if request.header(AUTHORIZATION) == Some(ADMIN_AUTHORIZATION) {
                    rest(&mut state, request, resource)
                } else {
                    status(StatusCode::UNAUTHORIZED)
                }
            }
            _ => status(StatusCode::NOT_FOUND),
        };
        Ok(response)
    }
}

fn rest(state: &mut State, request: &HttpRequest, path: &[&str]) -> HttpResponse {
    match (request.method.as_str(), path) {
        ("GET", ["gridsets"]) => xml(&listing("gridSets", "gridSet", state.gridsets.keys())),
        ("GET", ["gridsets", name]) => found(state.gridsets.get(*name)),
        ("PUT", ["gridsets", name]) => {
            let Some(gridset) = body(request) else {
                return status(StatusCode::BAD_REQUEST);
            };
            let resized = state
                .gridsets
                .get(*name)
                .is_some_and(|old| tile_size(old) != tile_size(&gridset));
            if resized {
                state.cache.retain(|tile| tile.gridset != *name);
            }
            state.gridsets.insert(name.to_string(), gridset);
            status(StatusCode::OK)
        }
        ("DELETE", ["gridsets", name]) => match state.gridsets.remove(*name) {
            Some(_) => {
                state.cache.retain(|tile| tile.gridset != *name);
                status(StatusCode::OK)
            }
            None => status(StatusCode::NOT_FOUND),
        },

        ("GET", ["layers", name]) if *name == LAYER => xml(&state.layer),
        ("PUT", ["layers", name]) if *name == LAYER => {
            let Some(layer) = body(request) else {
                return status(StatusCode::BAD_REQUEST);
            };
            let filters_changed = !same_element(
                state.layer.find("parameterFilters"),
                layer.find("parameterFilters"),
            );
            if filters_changed {
                state.cache.clear();
            }
            state.layer = layer;
            status(StatusCode::OK)
        }

        ("GET", ["blobstores"]) => xml(&listing("blobStores", "blobStore", state.blobstores.keys())),
        ("GET", ["blobstores", id]) => found(state.blobstores.get(*id)),
        ("PUT", ["blobstores", id]) => match body(request) {
            Some(store) => {
                state.blobstores.insert(id.to_string(), store);
                status(StatusCode::OK)
            }
            None => status(StatusCode::BAD_REQUEST),
        },
        ("DELETE", ["blobstores", id]) => match state.blobstores.remove(*id) {
            Some(_) => {
                state.cache.retain(|tile| tile.store != *id);
                status(StatusCode::OK)
            }
            None => status(StatusCode::NOT_FOUND),
        },

        ("POST", ["masstruncate"]) => match body(request) {
            Some(truncate) if truncate.has_text_at("/truncateLayer/layerName", LAYER) => {
                state.cache.clear();
                status(StatusCode::OK)
            }
            _ => status(StatusCode::BAD_REQUEST),
        },

        _ => status(StatusCode::NOT_FOUND),
    }
}

/// A string parameter filter as the simulated server evaluates it.
#[derive(Debug)]
struct ServedFilter {
    key: String,
    default_value: String,
    values: Vec<String>,
    case: Option<String>,
    locale: String,
}

/// Case mappings the server applies per `(case, language)`, ahead of the
/// default Unicode mapping.
const FOLD_TABLE: &[(&str, &str, char, &str)] = &[
    ("UPPER", "tr", 'i', "İ"),
    ("UPPER", "tr", 'ı', "I"),
    ("LOWER", "tr", 'I', "ı"),
    ("LOWER", "tr", 'İ', "i"),
];

impl ServedFilter {
    fn fold(&self, value: &str) -> String {
        let Some(case) = self.case.as_deref() else {
            return value.to_string();
        };
        let language = self.locale.split(['_', '-']).next().unwrap_or_default();
        value
            .chars()
            .map(|c| {
                let special = FOLD_TABLE
                    .iter()
                    .find(|(k, l, from, _)| *k == case && *l == language && *from == c);
                match (special, case) {
                    (Some((_, _, _, to)), _) => to.to_string(),
                    (None, "UPPER") => c.to_uppercase().collect(),
                    (None, "LOWER") => c.to_lowercase().collect(),
                    (None, _) => c.to_string(),
                }
            })
            .collect()
    }

    /// The cache partition of a request, or `None` to reject it.
    fn partition(&self, value: Option<&str>) -> Option<String> {
        let Some(value) = value else {
            return Some(self.default_value.clone());
        };
        let folded = self.fold(value);
        self.values
            .iter()
            .map(|allowed| self.fold(allowed))
            .find(|allowed| *allowed == folded)
    }
}

/// The string parameter filters of a layer.
fn string_filters(layer: &Document) -> Vec<ServedFilter> {
    layer
        .find_all("parameterFilters/stringParameterFilter")
        .into_iter()
        .filter_map(|filter| {
            let key = filter.child_text("key")?;
            let values = filter
                .child("values")
                .map(|v| v.child_elements().filter_map(|s| s.text()).collect())
                .unwrap_or_default();
            let normalize = filter.child("normalize");
            Some(ServedFilter {
                default_value: filter.child_text("defaultValue").unwrap_or_default(),
                values,
                case: normalize
                    .and_then(|n| n.child_text("case"))
                    .filter(|case| case != "NONE"),
                locale: normalize
                    .and_then(|n| n.child_text("locale"))
                    .unwrap_or_default(),
                key,
            })
        })
        .collect()
}

fn same_element(a: Option<&Element>, b: Option<&Element>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            Document::new(a.clone()).structurally_eq_ignoring(&Document::new(b.clone()), &[])
        }
        _ => false,
    }
}

fn listing<'a>(root: &str, item: &str, names: impl Iterator<Item = &'a String>) -> Document {
    let mut listing = Element::new(root);
    for name in names {
        let mut entry = Element::new(item);
        entry.push_child(text_element("name", name.clone()));
        listing.push_child(entry);
    }
    Document::new(listing)
}

fn capabilities(state: &State) -> Document {
    let mut contents = Element::new("Contents");
    for subset in state.layer.find_all("gridSubsets/gridSubset") {
        if let Some(name) = subset.child_text("gridSetName") {
            let mut set = Element::new("TileMatrixSet");
            set.push_child(text_element("Identifier", name));
            contents.push_child(set);
        }
    }
    let mut root = Element::new("Capabilities");
    root.push_child(contents);
    Document::new(root)
}

fn body(request: &HttpRequest) -> Option<Document> {
    Document::parse(request.body.as_deref()?).ok()
}

fn found(document: Option<&Document>) -> HttpResponse {
    match document {
        Some(document) => xml(document),
        None => status(StatusCode::NOT_FOUND),
    }
}

fn xml(document: &Document) -> HttpResponse {
    HttpResponse::new(StatusCode::OK, document.to_xml().unwrap().into_bytes())
        .with_header("Content-Type", "application/xml")
}

fn status(code: StatusCode) -> HttpResponse {
    HttpResponse::new(code, Vec::new())
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::new(width, height))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn harness(cluster: &Arc<SimulatedCluster>) -> (TempDir, Harness<SimulatedCluster>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gwcheck.ini");
    std::fs::write(&path, CONFIG).unwrap();
    let config = ConfigFile::load(&path).unwrap();
    let harness = Harness::with_transport(config, Arc::clone(cluster)).unwrap();
    (dir, harness)
}

#[test]
fn test_basics_passes() {
    let cluster = Arc::new(SimulatedCluster::new());
    let (_dir, harness) = harness(&cluster);
    Scenario::Basics.run(&harness).unwrap();
}

#[test]
fn test_gridset_lifecycle_passes() {
    let cluster = Arc::new(SimulatedCluster::new());
    let (_dir, harness) = harness(&cluster);
    Scenario::Gridset.run(&harness).unwrap();

    let state = cluster.state.lock().unwrap();
    assert_eq!(tile_size(&state.gridsets["EPSG:2163"]), Some((256, 256)));
    assert!(layer_has_grid_subset(&state.layer, "EPSG:2163"));
}

#[test]
fn test_file_blobstore_passes() {
    let cluster = Arc::new(SimulatedCluster::new());
    let (_dir, harness) = harness(&cluster);
    Scenario::FileBlobStore.run(&harness).unwrap();

    assert_eq!(layer_blobstore(&cluster.layer()).as_deref(), Some("testBlobStore"));
}

#[test]
fn test_s3_blobstore_passes() {
    let cluster = Arc::new(SimulatedCluster::new());
    let (_dir, harness) = harness(&cluster);
    Scenario::S3BlobStore.run(&harness).unwrap();

    let state = cluster.state.lock().unwrap();
    let store = &state.blobstores["testBlobStore"];
    assert_eq!(store.root().name, "S3BlobStore");
    assert!(store.has_text_at("/S3BlobStore/bucket", "tiles"));
}

#[test]
fn test_served_filter_keeps_distinct_values_apart() {
    let filter = ServedFilter {
        key: "FOO".to_string(),
        default_value: "defaultFoo".to_string(),
        values: ["a", "b", "c", "A"].map(str::to_string).to_vec(),
        case: None,
        locale: String::new(),
    };
    assert_eq!(filter.partition(Some("a")).as_deref(), Some("a"));
    assert_eq!(filter.partition(Some("b")).as_deref(), Some("b"));
    assert_eq!(filter.partition(Some("A")).as_deref(), Some("A"));
    assert_eq!(filter.partition(Some("X")), None);
    assert_eq!(filter.partition(None).as_deref(), Some("defaultFoo"));

    let turkish = ServedFilter {
        values: ["i", "ı", "c"].map(str::to_string).to_vec(),
        case: Some("LOWER".to_string()),
        locale: "tr".to_string(),
        ..filter
    };
    assert_eq!(turkish.partition(Some("İ")).as_deref(), Some("i"));
    assert_eq!(turkish.partition(Some("I")).as_deref(), Some("ı"));
}

#[test]
fn test_parameter_filter_passes_and_restores_upper_case() {
    let cluster = Arc::new(SimulatedCluster::new());
    let (_dir, harness) = harness(&cluster);
    Scenario::ParameterFilter.run(&harness).unwrap();

    let layer = cluster.layer();
    assert_eq!(string_filters(&layer).len(), 1);
    let normalization = parameter_filter_normalization(&layer, "FOO").unwrap();
    assert_eq!(normalization.case.as_str(), "UPPER");
    assert_eq!(normalization.locale, "en");
    assert!(layer.has_text_at("parameterFilters/styleParameterFilter/key", "STYLES"));
}

#[test]
fn test_all_scenarios_pass_in_sequence() {
    let cluster = Arc::new(SimulatedCluster::new());
    let (_dir, harness) = harness(&cluster);
    for scenario in Scenario::all() {
        scenario.run(&harness).unwrap();
    }
}

#[test]
fn test_split_cache_breaks_miss_then_hit() {
    let cluster = Arc::new(SimulatedCluster::split_cache());
    let (_dir, harness) = harness(&cluster);

    let err = Scenario::Gridset.run(&harness).unwrap_err();
    match err {
        HarnessError::Check(CheckError::Tile {
            node,
            expected,
            actual,
            ..
        }) => {
            assert_eq!(node, "http://node2:8080/geoserver/");
            assert_eq!(expected, "HIT");
            assert_eq!(actual, "MISS");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_rejected_admin_credential_is_not_tolerated() {
    let cluster = Arc::new(SimulatedCluster::new());
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gwcheck.ini");
    std::fs::write(&path, CONFIG.replace("password = geoserver", "password = wrong")).unwrap();
    let config = ConfigFile::load(&path).unwrap();
    let harness = Harness::with_transport(config, Arc::clone(&cluster)).unwrap();

    let err = Scenario::Gridset.run(&harness).unwrap_err();
    let HarnessError::Rest(rest) = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(rest.status(), Some(StatusCode::UNAUTHORIZED));
}
