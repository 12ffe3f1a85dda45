//! SQLite-backed implementation of every store trait.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use geo::Coord;
use rusqlite::{
    Connection, OptionalExtension, Row, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use thiserror::Error;

use crate::{
    Checkin, Dish, DishId, DishScores, Photo, Restaurant, RestaurantId, RestaurantScores, Review,
    VenueSource, VenueSourceKind, Vote,
};

use super::schema::SCHEMA;
use super::{ActivityStore, CacheStore, CatalogueStore, DishMatch, DishQuery, StoreError};

const DISH_COLUMNS: &str = "d.id, d.restaurant_id, d.name, d.description, d.tags, d.must_order, \
     d.destination_worthy_score, d.trend_cache, d.embedding";
const RESTAURANT_COLUMNS: &str =
    "r.id, r.name, r.city, r.region, r.price_level, r.lon, r.lat, r.score_cache, r.trending_rank";

/// Error raised while opening a database or applying its schema.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the tables failed.
    #[error("failed to apply schema: {0}")]
    Schema(#[source] rusqlite::Error),
}

/// Store backed by a single SQLite database.
///
/// The connection is not `Sync`; share a store across threads by giving
/// each thread its own connection to the same file.
pub struct SqliteStore {
    connection: Connection,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.connection.path())
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteStoreError> {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Self::with_connection(connection)
    }

    /// Open a private in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteStoreError::OpenDatabase {
                path: PathBuf::from(":memory:"),
                source,
            })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, SqliteStoreError> {
        connection
            .execute_batch(SCHEMA)
            .map_err(SqliteStoreError::Schema)?;
        Ok(Self { connection })
    }

    /// Insert or replace a restaurant row.
    pub fn insert_restaurant(&self, restaurant: &Restaurant) -> Result<(), StoreError> {
        let (lon, lat) = restaurant
            .location
            .map_or((None, None), |c| (Some(c.x), Some(c.y)));
        self.connection
            .execute(
                "INSERT OR REPLACE INTO restaurants
                    (id, name, city, region, price_level, lon, lat, score_cache, trending_rank)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    restaurant.id.0,
                    restaurant.name,
                    restaurant.city,
                    restaurant.region,
                    restaurant.price_level,
                    lon,
                    lat,
                    restaurant.score_cache,
                    restaurant.trending_rank,
                ],
            )
            .map_err(|e| StoreError::backend("insert_restaurant", e))?;
        Ok(())
    }

    /// Insert or replace a dish row.
    pub fn insert_dish(&self, dish: &Dish) -> Result<(), StoreError> {
        let tags = encode_json(&dish.tags, dish.id, "tags")?;
        let embedding = dish
            .embedding
            .as_ref()
            .map(|vector| encode_json(vector, dish.id, "embedding"))
            .transpose()?;
        self.connection
            .execute(
                "INSERT OR REPLACE INTO dishes
                    (id, restaurant_id, name, description, tags, must_order,
                     destination_worthy_score, trend_cache, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    dish.id.0,
                    dish.restaurant_id.0,
                    dish.name,
                    dish.description,
                    tags,
                    dish.must_order,
                    dish.destination_worthy_score,
                    dish.trend_cache,
                    embedding,
                ],
            )
            .map_err(|e| StoreError::backend("insert_dish", e))?;
        Ok(())
    }

    /// Record a vote; a repeated vote by the same user is ignored.
    pub fn record_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        self.connection
            .execute(
                "INSERT OR IGNORE INTO votes (user_id, dish_id, created_at) VALUES (?1, ?2, ?3)",
                params![vote.user_id, vote.dish_id.0, Millis(vote.created_at)],
            )
            .map_err(|e| StoreError::backend("record_vote", e))?;
        Ok(())
    }

    /// Record a review.
    pub fn record_review(&self, review: &Review) -> Result<(), StoreError> {
        self.connection
            .execute(
                "INSERT INTO reviews (dish_id, rating, body, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    review.dish_id.0,
                    review.rating,
                    review.text,
                    Millis(review.created_at)
                ],
            )
            .map_err(|e| StoreError::backend("record_review", e))?;
        Ok(())
    }

    /// Record a check-in.
    pub fn record_checkin(&self, checkin: &Checkin) -> Result<(), StoreError> {
        self.connection
            .execute(
                "INSERT INTO checkins (restaurant_id, dish_id, created_at) VALUES (?1, ?2, ?3)",
                params![
                    checkin.restaurant_id.0,
                    checkin.dish_id.map(|id| id.0),
                    Millis(checkin.created_at)
                ],
            )
            .map_err(|e| StoreError::backend("record_checkin", e))?;
        Ok(())
    }

    /// Record a photo upload.
    pub fn record_photo(&self, photo: &Photo) -> Result<(), StoreError> {
        self.connection
            .execute(
                "INSERT INTO photos (dish_id, created_at) VALUES (?1, ?2)",
                params![photo.dish_id.0, Millis(photo.created_at)],
            )
            .map_err(|e| StoreError::backend("record_photo", e))?;
        Ok(())
    }

    /// Link a restaurant to a listing source.
    pub fn add_venue_source(&self, source: &VenueSource) -> Result<(), StoreError> {
        self.connection
            .execute(
                "INSERT OR IGNORE INTO venue_sources (restaurant_id, kind) VALUES (?1, ?2)",
                params![source.restaurant_id.0, source.kind.as_str()],
            )
            .map_err(|e| StoreError::backend("add_venue_source", e))?;
        Ok(())
    }

    fn collect_ids<T>(&self, operation: &'static str, sql: &str) -> Result<Vec<T>, StoreError>
    where
        T: From<u64>,
    {
        let mut statement = self
            .connection
            .prepare_cached(sql)
            .map_err(|e| StoreError::backend(operation, e))?;
        let ids = statement
            .query_map([], |row| row.get::<_, u64>(0))
            .and_then(Iterator::collect::<Result<Vec<_>, _>>)
            .map_err(|e| StoreError::backend(operation, e))?;
        Ok(ids.into_iter().map(T::from).collect())
    }

    fn load_dishes(
        &self,
        operation: &'static str,
        filter: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<Dish>, StoreError> {
        let sql = format!("SELECT {DISH_COLUMNS} FROM dishes d {filter} ORDER BY d.id");
        let mut statement = self
            .connection
            .prepare_cached(&sql)
            .map_err(|e| StoreError::backend(operation, e))?;
        let rows = statement
            .query_map(params, |row| DishRow::read(row, 0))
            .and_then(Iterator::collect::<Result<Vec<_>, _>>)
            .map_err(|e| StoreError::backend(operation, e))?;
        rows.into_iter().map(DishRow::into_dish).collect()
    }

    fn load_restaurants(
        &self,
        operation: &'static str,
        filter: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<Restaurant>, StoreError> {
        let sql = format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants r {filter} ORDER BY r.id");
        let mut statement = self
            .connection
            .prepare_cached(&sql)
            .map_err(|e| StoreError::backend(operation, e))?;
        let restaurants = statement
            .query_map(params, |row| read_restaurant(row, 0))
            .and_then(Iterator::collect::<Result<Vec<_>, _>>)
            .map_err(|e| StoreError::backend(operation, e))?;
        Ok(restaurants)
    }

    fn activity_times(
        &self,
        operation: &'static str,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<Millis>, StoreError> {
        let mut statement = self
            .connection
            .prepare_cached(sql)
            .map_err(|e| StoreError::backend(operation, e))?;
        let times = statement
            .query_map(params, |row| row.get::<_, Millis>(0))
            .and_then(Iterator::collect::<Result<Vec<_>, _>>)
            .map_err(|e| StoreError::backend(operation, e))?;
        Ok(times)
    }
}

impl CatalogueStore for SqliteStore {
    fn dish_ids(&self) -> Result<Vec<DishId>, StoreError> {
        self.collect_ids("dish_ids", "SELECT id FROM dishes ORDER BY id")
    }

    fn restaurant_ids(&self) -> Result<Vec<RestaurantId>, StoreError> {
        self.collect_ids("restaurant_ids", "SELECT id FROM restaurants ORDER BY id")
    }

    fn dish(&self, id: DishId) -> Result<Option<Dish>, StoreError> {
        let dishes = self.load_dishes("dish", "WHERE d.id = ?1", &[&id.0])?;
        Ok(dishes.into_iter().next())
    }

    fn restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>, StoreError> {
        let restaurants = self.load_restaurants("restaurant", "WHERE r.id = ?1", &[&id.0])?;
        Ok(restaurants.into_iter().next())
    }

    fn restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        self.load_restaurants("restaurants", "", &[])
    }

    fn dishes_for_restaurant(&self, id: RestaurantId) -> Result<Vec<Dish>, StoreError> {
        self.load_dishes("dishes_for_restaurant", "WHERE d.restaurant_id = ?1", &[&id.0])
    }

    fn find_dishes(&self, query: &DishQuery) -> Result<Vec<DishMatch>, StoreError> {
        // Price and embedding presence narrow in SQL; JSON tags and text
        // matching run through `DishQuery::matches`.
        let sql = format!(
            "SELECT {DISH_COLUMNS}, {RESTAURANT_COLUMNS}
             FROM dishes d JOIN restaurants r ON r.id = d.restaurant_id
             WHERE (?1 IS NULL OR r.price_level = ?1)
               AND (?2 = 0 OR d.embedding IS NOT NULL)
             ORDER BY d.id"
        );
        let mut statement = self
            .connection
            .prepare_cached(&sql)
            .map_err(|e| StoreError::backend("find_dishes", e))?;
        let rows = statement
            .query_map(params![query.price_level, query.require_embedding], |row| {
                Ok((DishRow::read(row, 0)?, read_restaurant(row, DishRow::COLUMNS)?))
            })
            .and_then(Iterator::collect::<Result<Vec<_>, _>>)
            .map_err(|e| StoreError::backend("find_dishes", e))?;

        let mut matches = Vec::new();
        for (row, restaurant) in rows {
            let dish = row.into_dish()?;
            if query.matches(&dish, &restaurant) {
                matches.push(DishMatch { dish, restaurant });
            }
        }
        Ok(matches)
    }
}

impl ActivityStore for SqliteStore {
    fn votes_for_dish(
        &self,
        dish: DishId,
        since: Option<SystemTime>,
    ) -> Result<Vec<Vote>, StoreError> {
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT user_id, created_at FROM votes
                 WHERE dish_id = ?1 AND (?2 IS NULL OR created_at >= ?2)
                 ORDER BY created_at DESC, user_id",
            )
            .map_err(|e| StoreError::backend("votes_for_dish", e))?;
        let votes = statement
            .query_map(params![dish.0, since.map(Millis)], |row| {
                Ok(Vote {
                    user_id: row.get(0)?,
                    dish_id: dish,
                    created_at: row.get::<_, Millis>(1)?.0,
                })
            })
            .and_then(Iterator::collect::<Result<Vec<_>, _>>)
            .map_err(|e| StoreError::backend("votes_for_dish", e))?;
        Ok(votes)
    }

    fn recent_reviews(&self, dish: DishId, limit: usize) -> Result<Vec<Review>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT rating, body, created_at FROM reviews
                 WHERE dish_id = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
            )
            .map_err(|e| StoreError::backend("recent_reviews", e))?;
        let reviews = statement
            .query_map(params![dish.0, limit], |row| {
                Ok(Review {
                    dish_id: dish,
                    rating: row.get(0)?,
                    text: row.get(1)?,
                    created_at: row.get::<_, Millis>(2)?.0,
                })
            })
            .and_then(Iterator::collect::<Result<Vec<_>, _>>)
            .map_err(|e| StoreError::backend("recent_reviews", e))?;
        Ok(reviews)
    }

    fn checkins_for_dish(
        &self,
        restaurant: RestaurantId,
        dish: DishId,
        since: Option<SystemTime>,
    ) -> Result<Vec<Checkin>, StoreError> {
        let times = self.activity_times(
            "checkins_for_dish",
            "SELECT created_at FROM checkins
             WHERE restaurant_id = ?1 AND dish_id = ?2 AND (?3 IS NULL OR created_at >= ?3)
             ORDER BY created_at DESC, id DESC",
            &[&restaurant.0, &dish.0, &since.map(Millis)],
        )?;
        Ok(times
            .into_iter()
            .map(|Millis(created_at)| Checkin {
                restaurant_id: restaurant,
                dish_id: Some(dish),
                created_at,
            })
            .collect())
    }

    fn photos_for_dish(
        &self,
        dish: DishId,
        since: Option<SystemTime>,
    ) -> Result<Vec<Photo>, StoreError> {
        let times = self.activity_times(
            "photos_for_dish",
            "SELECT created_at FROM photos
             WHERE dish_id = ?1 AND (?2 IS NULL OR created_at >= ?2)
             ORDER BY created_at DESC, id DESC",
            &[&dish.0, &since.map(Millis)],
        )?;
        Ok(times
            .into_iter()
            .map(|Millis(created_at)| Photo {
                dish_id: dish,
                created_at,
            })
            .collect())
    }

    fn has_venue_source(
        &self,
        restaurant: RestaurantId,
        kind: &VenueSourceKind,
    ) -> Result<bool, StoreError> {
        self.connection
            .query_row(
                "SELECT 1 FROM venue_sources
                 WHERE restaurant_id = ?1 AND lower(kind) = ?2
                 LIMIT 1",
                params![restaurant.0, kind.as_str()],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(|e| StoreError::backend("has_venue_source", e))
    }
}

impl CacheStore for SqliteStore {
    fn write_dish_scores(&self, dish: DishId, scores: DishScores) -> Result<(), StoreError> {
        let changed = self
            .connection
            .execute(
                "UPDATE dishes SET destination_worthy_score = ?2, trend_cache = ?3 WHERE id = ?1",
                params![dish.0, scores.destination_worthy_score, scores.trend_cache],
            )
            .map_err(|e| StoreError::backend("write_dish_scores", e))?;
        ensure_changed(changed, dish)
    }

    fn write_restaurant_scores(
        &self,
        restaurant: RestaurantId,
        scores: RestaurantScores,
    ) -> Result<(), StoreError> {
        let changed = self
            .connection
            .execute(
                "UPDATE restaurants SET score_cache = ?2, trending_rank = ?3 WHERE id = ?1",
                params![restaurant.0, scores.score_cache, scores.trending_rank],
            )
            .map_err(|e| StoreError::backend("write_restaurant_scores", e))?;
        ensure_changed(changed, restaurant)
    }

    fn write_dish_embedding(&self, dish: DishId, embedding: &[f32]) -> Result<(), StoreError> {
        let encoded = encode_json(&embedding, dish, "embedding")?;
        let changed = self
            .connection
            .execute(
                "UPDATE dishes SET embedding = ?2 WHERE id = ?1",
                params![dish.0, encoded],
            )
            .map_err(|e| StoreError::backend("write_dish_embedding", e))?;
        ensure_changed(changed, dish)
    }
}

fn ensure_changed(changed: usize, entity: impl fmt::Display) -> Result<(), StoreError> {
    if changed == 0 {
        Err(StoreError::not_found(entity))
    } else {
        Ok(())
    }
}

fn encode_json<T: serde::Serialize + ?Sized>(
    value: &T,
    dish: DishId,
    field: &'static str,
) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Corrupt {
        entity: dish.to_string(),
        field,
        message: source.to_string(),
    })
}

fn decode_json<T: serde::de::DeserializeOwned>(
    raw: &str,
    dish: DishId,
    field: &'static str,
) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|source| StoreError::Corrupt {
        entity: dish.to_string(),
        field,
        message: source.to_string(),
    })
}

/// A dish row before its JSON columns are decoded.
struct DishRow {
    id: DishId,
    restaurant_id: RestaurantId,
    name: String,
    description: Option<String>,
    tags: String,
    must_order: bool,
    destination_worthy_score: f64,
    trend_cache: f64,
    embedding: Option<String>,
}

impl DishRow {
    const COLUMNS: usize = 9;

    fn read(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: DishId(row.get(offset)?),
            restaurant_id: RestaurantId(row.get(offset + 1)?),
            name: row.get(offset + 2)?,
            description: row.get(offset + 3)?,
            tags: row.get(offset + 4)?,
            must_order: row.get(offset + 5)?,
            destination_worthy_score: row.get(offset + 6)?,
            trend_cache: row.get(offset + 7)?,
            embedding: row.get(offset + 8)?,
        })
    }

    fn into_dish(self) -> Result<Dish, StoreError> {
        let tags: Vec<String> = decode_json(&self.tags, self.id, "tags")?;
        let embedding: Option<Vec<f32>> = self
            .embedding
            .as_deref()
            .map(|raw| decode_json(raw, self.id, "embedding"))
            .transpose()?;
        Ok(Dish {
            id: self.id,
            restaurant_id: self.restaurant_id,
            name: self.name,
            description: self.description,
            tags,
            must_order: self.must_order,
            destination_worthy_score: self.destination_worthy_score,
            trend_cache: self.trend_cache,
            embedding,
        })
    }
}

fn read_restaurant(row: &Row<'_>, offset: usize) -> rusqlite::Result<Restaurant> {
    let lon: Option<f64> = row.get(offset + 5)?;
    let lat: Option<f64> = row.get(offset + 6)?;
    Ok(Restaurant {
        id: RestaurantId(row.get(offset)?),
        name: row.get(offset + 1)?,
        city: row.get(offset + 2)?,
        region: row.get(offset + 3)?,
        price_level: row.get(offset + 4)?,
        location: lon.zip(lat).map(|(x, y)| Coord { x, y }),
        score_cache: row.get(offset + 7)?,
        trending_rank: row.get(offset + 8)?,
    })
}

/// A [`SystemTime`] persisted as signed Unix milliseconds.
struct Millis(SystemTime);

impl ToSql for Millis {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let millis = match self.0.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_millis()),
            Err(before) => i64::try_from(before.duration().as_millis()).map(i64::wrapping_neg),
        }
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        Ok(ToSqlOutput::from(millis))
    }
}

impl FromSql for Millis {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let millis = i64::column_result(value)?;
        let offset = Duration::from_millis(millis.unsigned_abs());
        let time = if millis >= 0 {
            UNIX_EPOCH.checked_add(offset)
        } else {
            UNIX_EPOCH.checked_sub(offset)
        };
        time.map(Self).ok_or(FromSqlError::OutOfRange(millis))
    }
}
