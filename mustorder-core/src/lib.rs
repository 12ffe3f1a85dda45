//! Core domain types for the must-order ranking engine.
//!
//! The crate holds everything the scoring and search crates share: the
//! catalogue entities (dishes and restaurants), the activity signals they are
//! scored from, the pure geo and vector utilities, and the seams to the outer
//! world. Those seams are the store traits in [`store`] and the
//! [`EmbeddingProvider`] trait.
//!
//! # Examples
//!
//! ```
//! use geo::Coord;
//! use mustorder_core::{Restaurant, RestaurantId, distance_between};
//!
//! let austin = Restaurant::new(RestaurantId(1), "Franklin Barbecue", "Austin")
//!     .with_location(Coord { x: -97.7431, y: 30.2672 });
//! let san_antonio = Coord { x: -98.4936, y: 29.4241 };
//! let location = austin.location.expect("location was just set");
//! let km = distance_between(location, san_antonio);
//! assert!(km > 110.0 && km < 130.0);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod activity;
mod dish;
mod distance;
pub mod embedding;
mod restaurant;
mod scores;
mod similarity;
pub mod store;

#[doc(hidden)]
pub mod test_support;

pub use activity::{Checkin, Photo, Review, VenueSource, VenueSourceKind, Vote};
pub use dish::{Dish, DishId};
pub use distance::{EARTH_RADIUS_KM, distance_between, distance_km, format_distance};
pub use embedding::{EmbeddingError, EmbeddingProvider, dish_embedding_text};
pub use restaurant::{Restaurant, RestaurantId};
pub use scores::{DishScores, RestaurantScores};
pub use similarity::{SimilarityError, cosine_similarity};
pub use store::{ActivityStore, CacheStore, CatalogueStore, DishMatch, DishQuery, StoreError};

#[cfg(feature = "store-sqlite")]
pub use store::{SqliteStore, SqliteStoreError};
