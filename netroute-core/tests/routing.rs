use geojson::{FeatureCollection, GeoJson};
use netroute_core::prelude::*;

/// Two waterways on the equator. The first ends ~50 m before the second begins.
const GAPPED_RIVERS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {"class": "river", "name": "upper"},
         "geometry": {"type": "LineString",
                      "coordinates": [[0.0, 0.0], [0.002, 0.0], [0.004, 0.0]]}},
        {"type": "Feature", "properties": {"class": "river", "name": "lower"},
         "geometry": {"type": "LineString",
                      "coordinates": [[0.00445, 0.0], [0.0065, 0.0], [0.0085, 0.0]]}},
        {"type": "Feature", "properties": {"class": "lake"},
         "geometry": {"type": "Polygon",
                      "coordinates": [[[0.0, 0.0], [0.0085, 0.0], [0.004, 0.003], [0.0, 0.0]]]}}
    ]
}"#;

fn network(json: &str) -> FeatureCollection {
    FeatureCollection::try_from(json.parse::<GeoJson>().unwrap()).unwrap()
}

fn config(stitching: StitchingStrategy) -> RouterConfig {
    RouterConfig {
        graph: GraphConfig {
            stitching,
            ..GraphConfig::default()
        },
        ..RouterConfig::default()
    }
}

#[test]
fn stitched_gap_yields_a_single_segment_across_both_lines() {
    let waypoints = [Coordinate::new(0.0, 0.0), Coordinate::new(0.0085, 0.0)];
    let result = route_network(
        &network(GAPPED_RIVERS),
        &waypoints,
        &config(StitchingStrategy::PairwiseThreshold { threshold_km: 0.1 }),
    )
    .unwrap();

    assert!(result.failed.is_empty());
    assert_eq!(result.segments.len(), 1);
    assert_eq!(
        result.segments[0].coordinates,
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.002, 0.0),
            Coordinate::new(0.004, 0.0),
            Coordinate::new(0.00445, 0.0),
            Coordinate::new(0.0065, 0.0),
            Coordinate::new(0.0085, 0.0),
        ]
    );
}

#[test]
fn without_stitching_the_same_request_fails_one_pair() {
    let waypoints = [Coordinate::new(0.0, 0.0), Coordinate::new(0.0085, 0.0)];
    let result = route_network(
        &network(GAPPED_RIVERS),
        &waypoints,
        &config(StitchingStrategy::None),
    )
    .unwrap();

    assert!(result.segments.is_empty());
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].from, Coordinate::new(0.0, 0.0));
    assert_eq!(result.failed[0].to, Coordinate::new(0.0085, 0.0));
}

#[test]
fn line_end_chaining_also_bridges_the_gap() {
    let waypoints = [Coordinate::new(0.0, 0.0), Coordinate::new(0.0085, 0.0)];
    let result = route_network(
        &network(GAPPED_RIVERS),
        &waypoints,
        &config(StitchingStrategy::LineEndChaining { max_gap_km: 0.1 }),
    )
    .unwrap();

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].coordinates.len(), 6);
}

#[test]
fn stitching_connects_every_vertex_pair_across_lines() {
    let polylines = index_geometries(&network(GAPPED_RIVERS), PolygonHandling::Exclude);
    let before = build_graph(&polylines, &GraphConfig::unstitched());
    let after = build_graph(&polylines, &GraphConfig::default());

    for a in polylines[0].coords() {
        for b in polylines[1].coords() {
            assert!(matches!(
                resolve(&before, *a, *b),
                Err(Error::NoPathFound { .. })
            ));
            assert!(resolve(&after, *a, *b).is_ok(), "{a} -> {b}");
        }
    }
}

#[test]
fn rtree_search_gives_identical_routes() {
    let waypoints = [
        Coordinate::new(0.0003, 0.0002),
        Coordinate::new(0.0051, -0.0001),
        Coordinate::new(0.0084, 0.0),
    ];
    let brute = route_network(&network(GAPPED_RIVERS), &waypoints, &RouterConfig::default())
        .unwrap();

    let mut rtree_config = RouterConfig::default();
    rtree_config.graph.neighbor_search = NeighborSearch::RTree;
    rtree_config.route.neighbor_search = NeighborSearch::RTree;
    let rtree = route_network(&network(GAPPED_RIVERS), &waypoints, &rtree_config).unwrap();

    assert_eq!(brute, rtree);
}

#[test]
fn polygons_only_route_when_boundaries_are_enabled() {
    // Waypoints sit on the lake's apex, which no line touches.
    let waypoints = [Coordinate::new(0.004, 0.003), Coordinate::new(0.0, 0.0)];

    let excluded = route_network(&network(GAPPED_RIVERS), &waypoints, &RouterConfig::default())
        .unwrap();
    assert_eq!(excluded.segments[0].coordinates[0], Coordinate::new(0.004, 0.0));

    let mut with_boundary = RouterConfig::default();
    with_boundary.graph.polygons = PolygonHandling::Boundary;
    let included = route_network(&network(GAPPED_RIVERS), &waypoints, &with_boundary).unwrap();
    assert_eq!(
        included.segments[0].coordinates,
        vec![Coordinate::new(0.004, 0.003), Coordinate::new(0.0, 0.0)]
    );
}

#[test]
fn batch_routing_keeps_request_order() {
    let requests = vec![
        RouteRequest {
            network: network(GAPPED_RIVERS),
            waypoints: vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.004, 0.0)],
        },
        RouteRequest {
            network: network(GAPPED_RIVERS),
            waypoints: vec![],
        },
        RouteRequest {
            network: network(r#"{"type": "FeatureCollection", "features": []}"#),
            waypoints: vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)],
        },
    ];

    let results = route_batch(&requests, &RouterConfig::default());
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().segments.len(), 1);
    assert!(matches!(results[1], Err(Error::NoWaypoints)));
    assert_eq!(results[2].as_ref().unwrap().unsnapped.len(), 2);
}
