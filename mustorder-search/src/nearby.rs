//! Restaurants around a point.

use std::cmp::Ordering;

use geo::Coord;
use mustorder_core::{CatalogueStore, Restaurant, StoreError, distance_between};
#[cfg(feature = "serde")]
use serde::Serialize;

/// A restaurant and its distance from the search origin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NearbyRestaurant {
    /// The restaurant.
    pub restaurant: Restaurant,
    /// Great-circle distance from the origin, in kilometres.
    pub distance_km: f64,
}

/// Restaurants within `radius_km` of `origin`, nearest first.
///
/// Restaurants without a location are skipped. Equal distances order by
/// ascending restaurant id. This is a full scan.
///
/// # Errors
/// Returns the store error when restaurants cannot be listed.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use mustorder_core::test_support::{MemoryStore, sample_catalogue};
/// use mustorder_search::nearby_restaurants;
///
/// let store = MemoryStore::from(sample_catalogue());
/// let downtown = Coord { x: -97.7431, y: 30.2672 };
/// let nearby = nearby_restaurants(&store, downtown, 20.0, 10)?;
/// let names: Vec<_> = nearby.iter().map(|n| n.restaurant.name.as_str()).collect();
/// assert_eq!(names, ["Franklin Barbecue", "Valentina's Tex Mex BBQ"]);
/// # Ok::<(), mustorder_core::StoreError>(())
/// ```
pub fn nearby_restaurants<S>(
    store: &S,
    origin: Coord<f64>,
    radius_km: f64,
    limit: usize,
) -> Result<Vec<NearbyRestaurant>, StoreError>
where
    S: CatalogueStore + ?Sized,
{
    let mut nearby: Vec<NearbyRestaurant> = store
        .restaurants()?
        .into_iter()
        .filter_map(|restaurant| {
            let distance_km = distance_between(origin, restaurant.location?);
            (distance_km <= radius_km).then_some(NearbyRestaurant {
                restaurant,
                distance_km,
            })
        })
        .collect();
    nearby.sort_by(|a, b| match a.distance_km.total_cmp(&b.distance_km) {
        Ordering::Equal => a.restaurant.id.cmp(&b.restaurant.id),
        other => other,
    });
    nearby.truncate(limit);
    Ok(nearby)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mustorder_core::RestaurantId;
    use mustorder_core::test_support::{CatalogueFixture, MemoryStore, sample_catalogue};
    use rstest::rstest;

    const DOWNTOWN_AUSTIN: Coord<f64> = Coord {
        x: -97.7431,
        y: 30.2672,
    };

    fn ids(nearby: &[NearbyRestaurant]) -> Vec<u64> {
        nearby.iter().map(|n| n.restaurant.id.0).collect()
    }

    #[rstest]
    #[case(5.0, &[1])]
    #[case(50.0, &[1, 2, 3])]
    #[case(0.1, &[])]
    fn filters_by_radius(#[case] radius: f64, #[case] expected: &[u64]) {
        let store = MemoryStore::from(sample_catalogue());
        let nearby =
            nearby_restaurants(&store, DOWNTOWN_AUSTIN, radius, 10).expect("scan succeeds");
        assert_eq!(ids(&nearby), expected);
        assert!(nearby.windows(2).all(|pair| match pair {
            [a, b] => a.distance_km <= b.distance_km,
            _ => true,
        }));
    }

    #[rstest]
    fn equal_distances_order_by_id() {
        let spot = Coord { x: -97.0, y: 30.0 };
        let store = MemoryStore::from(
            CatalogueFixture::default()
                .restaurant(Restaurant::new(RestaurantId(9), "Twin B", "Austin").with_location(spot))
                .restaurant(Restaurant::new(RestaurantId(3), "Twin A", "Austin").with_location(spot)),
        );
        let nearby = nearby_restaurants(&store, spot, 1.0, 10).expect("scan succeeds");
        assert_eq!(ids(&nearby), vec![3, 9]);
        assert!(nearby.iter().all(|n| n.distance_km == 0.0));
    }

    #[rstest]
    fn truncates_to_limit() {
        let store = MemoryStore::from(sample_catalogue());
        let nearby = nearby_restaurants(&store, DOWNTOWN_AUSTIN, 100.0, 2).expect("scan succeeds");
        assert_eq!(ids(&nearby), vec![1, 2]);
    }
}
