//! Integration tests for building placement against confirmed territories

use territory_claim::claim::{ConfirmedTerritory, TerritoryClaimSession};
use territory_claim::core::{ClaimConfig, GeoPoint};
use territory_claim::spatial::GeoPolygon;
use territory_claim::validation::{PlacementValidator, PlacementVerdict};

fn origin() -> GeoPoint {
    GeoPoint::new(-23.5505, -46.6333)
}

fn square_territory(side: f64) -> ConfirmedTerritory {
    let o = origin();
    let polygon = GeoPolygon::new(vec![
        o,
        o.offset_meters(side, 0.0),
        o.offset_meters(side, side),
        o.offset_meters(0.0, side),
    ])
    .unwrap();
    ConfirmedTerritory::from_polygon(polygon, 0.0)
}

#[test]
fn test_hundred_metre_square_placement_rules() {
    let territory = square_territory(100.0);
    let validator = PlacementValidator::new(&ClaimConfig::default());
    assert_eq!(validator.clearance_m(), 8.0);

    let center = origin().offset_meters(50.0, 50.0);
    assert!(validator.is_inside(&center, &territory));
    assert!(!validator.is_near_boundary(&center, &territory, 8.0));
    assert!(validator.is_legal_site(&center, &territory));

    let near_edge = origin().offset_meters(97.0, 50.0);
    assert!(validator.is_inside(&near_edge, &territory));
    assert!(validator.is_near_boundary(&near_edge, &territory, 8.0));
    assert!(!validator.is_legal_site(&near_edge, &territory));

    let outside = origin().offset_meters(-20.0, 50.0);
    assert!(!validator.is_inside(&outside, &territory));
    assert_eq!(
        validator.check_site(&outside, &territory),
        PlacementVerdict::OutsideTerritory
    );
}

#[test]
fn test_placement_does_not_mutate_territory() {
    let territory = square_territory(100.0);
    let before = territory.clone();
    let validator = PlacementValidator::with_clearance(8.0);

    let sites: Vec<GeoPoint> = (0..25)
        .map(|i| origin().offset_meters((i % 5) as f64 * 25.0, (i / 5) as f64 * 25.0))
        .collect();
    let verdicts = validator.check_sites(&sites, &territory);

    assert_eq!(verdicts.len(), sites.len());
    assert_eq!(territory, before);
    // Interior grid points (25, 50, 75 on both axes) are the only legal ones
    assert_eq!(verdicts.iter().filter(|v| v.is_legal()).count(), 9);
}

#[test]
fn test_place_inside_walked_territory() {
    let mut session = TerritoryClaimSession::new(&ClaimConfig::default());
    session.begin_claim_at(0.0).unwrap();

    let o = origin().with_accuracy(6.0);
    let corners = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)];
    let mut t = 0.0;
    let mut fixes = Vec::new();
    for w in 0..4 {
        let (x0, y0) = corners[w];
        let (x1, y1) = corners[(w + 1) % 4];
        for k in 0..10 {
            let f = k as f64 / 10.0;
            fixes.push(o.offset_meters(x0 + (x1 - x0) * f, y0 + (y1 - y0) * f).at(t));
            t += 8.0;
        }
    }

    let mut validated = false;
    for fix in fixes {
        if session.submit_sample(fix).unwrap().validation.is_some() {
            validated = true;
            break;
        }
    }
    assert!(validated);

    let territory = session.confirm_and_extract_at(t).unwrap();
    let validator = PlacementValidator::new(&ClaimConfig::default());
    assert!(validator.is_legal_site(&origin().offset_meters(50.0, 50.0), &territory));
    assert!(!validator.is_legal_site(&origin().offset_meters(50.0, 96.0), &territory));
    assert!(!validator.is_legal_site(&origin().offset_meters(150.0, 50.0), &territory));
}
