//! Network retrieval from a locally mirrored release catalogue
//!
//! The manifest mirrors a release layout: themes contain types, types
//! contain files, and every file records the `[minx, miny, maxx, maxy]`
//! extent of its features. A request reads only the files of the requested
//! types whose extent overlaps the request area, then drops the features
//! that fall entirely outside it or whose `class` property is not one of
//! the accepted feature classes.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use geo::{BoundingRect, Intersects, Rect};
use geojson::{Feature, FeatureCollection, GeoJson};
use netroute_core::source::{NetworkSource, SourceError};
use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::config::{CatalogConfig, default_feature_classes};

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub release_version: String,
    pub themes: Vec<Theme>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub relative_path: String,
    pub types: Vec<FeatureType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureType {
    pub name: String,
    #[serde(default)]
    pub relative_path: String,
    pub files: Vec<CatalogFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub name: String,
    pub bbox: [f64; 4],
}

/// Strict overlap of two `[minx, miny, maxx, maxy]` boxes. Boxes that only
/// share an edge do not overlap.
fn overlaps(a: &[f64; 4], b: &[f64; 4]) -> bool {
    a[0] < b[2] && a[2] > b[0] && a[1] < b[3] && a[3] > b[1]
}

fn as_array(rect: &Rect<f64>) -> [f64; 4] {
    [rect.min().x, rect.min().y, rect.max().x, rect.max().y]
}

#[derive(Debug, Clone)]
pub struct CatalogSource {
    manifest: Arc<Manifest>,
    root: PathBuf,
    margin_deg: f64,
    /// Accepted values of a feature's `class` property. Empty accepts all.
    feature_classes: Vec<String>,
}

impl CatalogSource {
    pub fn new(manifest: Manifest, root: impl Into<PathBuf>, margin_deg: f64) -> Self {
        Self {
            manifest: Arc::new(manifest),
            root: root.into(),
            margin_deg,
            feature_classes: default_feature_classes(),
        }
    }

    /// Same catalogue, filtering features by a different class list.
    #[must_use]
    pub fn with_feature_classes(&self, feature_classes: Vec<String>) -> Self {
        Self {
            manifest: Arc::clone(&self.manifest),
            root: self.root.clone(),
            margin_deg: self.margin_deg,
            feature_classes,
        }
    }

    pub async fn load(config: &CatalogConfig) -> Result<Self, SourceError> {
        let text = tokio::fs::read_to_string(&config.manifest).await?;
        let manifest: Manifest = serde_json::from_str(&text).map_err(|e| {
            SourceError::Catalog(format!("{}: {e}", config.manifest.display()))
        })?;

        info!(
            release = %manifest.release_version,
            themes = manifest.themes.len(),
            "catalogue manifest loaded"
        );
        Ok(Self::new(manifest, config.root(), config.margin_deg)
            .with_feature_classes(config.feature_classes.clone()))
    }

    pub fn release_version(&self) -> &str {
        &self.manifest.release_version
    }

    pub fn margin_deg(&self) -> f64 {
        self.margin_deg
    }

    pub fn feature_classes(&self) -> &[String] {
        &self.feature_classes
    }

    fn accepts_class(&self, feature: &Feature) -> bool {
        if self.feature_classes.is_empty() {
            return true;
        }
        feature
            .property("class")
            .and_then(serde_json::Value::as_str)
            .is_some_and(|class| self.feature_classes.iter().any(|c| c == class))
    }

    /// Files of the requested types whose extent overlaps `bbox`.
    pub fn select(&self, bbox: &Rect<f64>, classes: &[String]) -> Vec<PathBuf> {
        let area = as_array(bbox);
        let version_dir = self.root.join(&self.manifest.release_version);

        self.manifest
            .themes
            .iter()
            .flat_map(|theme| theme.types.iter().map(move |ty| (theme, ty)))
            .filter(|(_, ty)| classes.iter().any(|class| *class == ty.name))
            .flat_map(move |(theme, ty)| {
                trace!(theme = %theme.name, feature_type = %ty.name, "scanning catalogue type");
                let dir = version_dir
                    .join(relative(&theme.relative_path))
                    .join(relative(&ty.relative_path));
                ty.files
                    .iter()
                    .filter(move |file| overlaps(&area, &file.bbox))
                    .map(move |file| dir.join(&file.name))
            })
            .collect()
    }
}

fn relative(path: &str) -> &Path {
    Path::new(path.trim_matches('/'))
}

async fn read_collection(path: &Path) -> Result<FeatureCollection, SourceError> {
    let text = tokio::fs::read_to_string(path).await?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|e| SourceError::Decode(format!("{}: {e}", path.display())))?;
    FeatureCollection::try_from(geojson)
        .map_err(|e| SourceError::Decode(format!("{}: {e}", path.display())))
}

fn feature_intersects(feature: &Feature, bbox: &Rect<f64>) -> bool {
    let Some(geometry) = &feature.geometry else {
        return false;
    };
    geo::Geometry::<f64>::try_from(geometry.clone())
        .ok()
        .and_then(|geometry| geometry.bounding_rect())
        .is_some_and(|rect| rect.intersects(bbox))
}

impl NetworkSource for CatalogSource {
    async fn fetch(
        &self,
        bbox: Rect<f64>,
        classes: &[String],
    ) -> Result<FeatureCollection, SourceError> {
        let files = self.select(&bbox, classes);
        debug!(files = files.len(), ?classes, "reading catalogue files");

        let mut features = Vec::new();
        for path in &files {
            let collection = read_collection(path).await?;
            let before = collection.features.len();
            features.extend(
                collection
                    .features
                    .into_iter()
                    .filter(|feature| self.accepts_class(feature))
                    .filter(|feature| feature_intersects(feature, &bbox)),
            );
            debug!(
                path = %path.display(),
                kept = features.len(),
                read = before,
                "catalogue file filtered"
            );
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use geo::Coord;

    use super::*;

    pub(crate) const MANIFEST: &str = r#"{
        "release_version": "2025-05-21.0",
        "themes": [
            {"name": "base", "relative_path": "/theme=base",
             "types": [
                {"name": "water", "relative_path": "/type=water",
                 "files": [
                    {"name": "west.geojson", "bbox": [-1.0, -1.0, 0.0, 1.0]},
                    {"name": "east.geojson", "bbox": [0.0, -1.0, 1.0, 1.0]}
                 ]},
                {"name": "land", "relative_path": "/type=land",
                 "files": [{"name": "all.geojson", "bbox": [-1.0, -1.0, 1.0, 1.0]}]}
             ]}
        ]
    }"#;

    /// Features in the eastern tile: a river on the equator, a river far
    /// north and a canal running alongside the equator.
    pub(crate) const EAST_WATER: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"class": "river"},
         "geometry": {"type": "LineString", "coordinates": [[0.1, 0.0], [0.2, 0.0], [0.3, 0.0]]}},
        {"type": "Feature", "properties": {"class": "river"},
         "geometry": {"type": "LineString", "coordinates": [[0.1, 0.9], [0.2, 0.9]]}},
        {"type": "Feature", "properties": {"class": "canal"},
         "geometry": {"type": "LineString", "coordinates": [[0.1, 0.0005], [0.3, 0.0005]]}}
    ]}"#;

    /// Lays out the catalogue under `root` with only the eastern water tile on disk.
    pub(crate) fn write_catalogue(root: &Path) -> CatalogSource {
        let dir = root.join("2025-05-21.0/theme=base/type=water");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("east.geojson"), EAST_WATER).unwrap();

        let manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        CatalogSource::new(manifest, root, 0.01)
    }

    fn rect(min: (f64, f64), max: (f64, f64)) -> Rect<f64> {
        Rect::new(Coord { x: min.0, y: min.1 }, Coord { x: max.0, y: max.1 })
    }

    #[test]
    fn selects_overlapping_files_of_requested_types() {
        let manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        let source = CatalogSource::new(manifest, "/mirror", 0.0);

        let files = source.select(&rect((0.1, -0.1), (0.4, 0.1)), &["water".to_string()]);
        assert_eq!(
            files,
            vec![PathBuf::from(
                "/mirror/2025-05-21.0/theme=base/type=water/east.geojson"
            )]
        );
    }

    #[test]
    fn touching_extents_are_not_selected() {
        let manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        let source = CatalogSource::new(manifest, "/mirror", 0.0);

        // Shares only the x = 0 edge with the western tile.
        let files = source.select(&rect((0.0, 0.0), (0.5, 0.5)), &["water".to_string()]);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("east.geojson"));
    }

    #[test]
    fn unrequested_types_are_skipped() {
        let manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        let source = CatalogSource::new(manifest, "/mirror", 0.0);
        assert!(source.select(&rect((0.1, 0.1), (0.2, 0.2)), &[]).is_empty());
    }

    #[tokio::test]
    async fn fetch_drops_features_outside_the_area() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_catalogue(dir.path());

        let collection = source
            .fetch(rect((0.05, -0.05), (0.35, 0.05)), &["water".to_string()])
            .await
            .unwrap();
        assert_eq!(collection.features.len(), 1);
        assert_eq!(
            collection.features[0].property("class"),
            Some(&serde_json::json!("river"))
        );
    }

    #[tokio::test]
    async fn feature_classes_select_which_features_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_catalogue(dir.path());
        let area = rect((0.05, -0.05), (0.35, 0.05));
        let water = ["water".to_string()];

        let canals = source
            .with_feature_classes(vec!["canal".to_string()])
            .fetch(area, &water)
            .await
            .unwrap();
        assert_eq!(canals.features.len(), 1);
        assert_eq!(
            canals.features[0].property("class"),
            Some(&serde_json::json!("canal"))
        );

        let everything = source
            .with_feature_classes(vec![])
            .fetch(area, &water)
            .await
            .unwrap();
        assert_eq!(everything.features.len(), 2);
    }

    #[tokio::test]
    async fn features_without_a_class_are_dropped_by_a_class_filter() {
        let dir = tempfile::tempdir().unwrap();
        let tile = dir.path().join("2025-05-21.0/theme=base/type=water");
        std::fs::create_dir_all(&tile).unwrap();
        std::fs::write(
            tile.join("east.geojson"),
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "LineString", "coordinates": [[0.1, 0.0], [0.3, 0.0]]}}
            ]}"#,
        )
        .unwrap();
        let manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        let source = CatalogSource::new(manifest, dir.path(), 0.0);
        let area = rect((0.05, -0.05), (0.35, 0.05));
        let water = ["water".to_string()];

        let filtered = source.fetch(area, &water).await.unwrap();
        assert!(filtered.features.is_empty());

        let unfiltered = source
            .with_feature_classes(vec![])
            .fetch(area, &water)
            .await
            .unwrap();
        assert_eq!(unfiltered.features.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_an_error_not_an_empty_network() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_catalogue(dir.path());

        // Overlaps the western tile, which is listed but absent on disk.
        let result = source
            .fetch(rect((-0.5, -0.5), (-0.1, 0.5)), &["water".to_string()])
            .await;
        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[tokio::test]
    async fn loads_manifest_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("manifest.json");
        std::fs::write(&manifest, MANIFEST).unwrap();

        let config = CatalogConfig {
            manifest,
            root: None,
            margin_deg: 0.02,
            feature_classes: vec!["lake".to_string()],
        };
        let source = CatalogSource::load(&config).await.unwrap();
        assert_eq!(source.release_version(), "2025-05-21.0");
        assert_eq!(source.margin_deg(), 0.02);
        assert_eq!(source.feature_classes(), ["lake".to_string()]);
    }
}
