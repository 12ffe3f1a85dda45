//! SQLite schema applied when a store is opened.
//!
//! Timestamps are Unix milliseconds. Tags and embeddings are JSON arrays.

pub(super) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS restaurants (
    id             INTEGER PRIMARY KEY,
    name           TEXT    NOT NULL,
    city           TEXT    NOT NULL,
    region         TEXT,
    price_level    INTEGER CHECK (price_level BETWEEN 1 AND 4),
    lon            REAL,
    lat            REAL,
    score_cache    REAL    NOT NULL DEFAULT 0,
    trending_rank  INTEGER
);

CREATE TABLE IF NOT EXISTS dishes (
    id                        INTEGER PRIMARY KEY,
    restaurant_id             INTEGER NOT NULL REFERENCES restaurants (id),
    name                      TEXT    NOT NULL,
    description               TEXT,
    tags                      TEXT    NOT NULL DEFAULT '[]',
    must_order                INTEGER NOT NULL DEFAULT 0,
    destination_worthy_score  REAL    NOT NULL DEFAULT 0,
    trend_cache               REAL    NOT NULL DEFAULT 0,
    embedding                 TEXT
);
CREATE INDEX IF NOT EXISTS dishes_restaurant ON dishes (restaurant_id);

CREATE TABLE IF NOT EXISTS votes (
    user_id     INTEGER NOT NULL,
    dish_id     INTEGER NOT NULL REFERENCES dishes (id),
    created_at  INTEGER NOT NULL,
    PRIMARY KEY (user_id, dish_id)
);
CREATE INDEX IF NOT EXISTS votes_dish ON votes (dish_id, created_at);

CREATE TABLE IF NOT EXISTS reviews (
    id          INTEGER PRIMARY KEY,
    dish_id     INTEGER NOT NULL REFERENCES dishes (id),
    rating      INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    body        TEXT    NOT NULL,
    created_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS reviews_dish ON reviews (dish_id, created_at);

CREATE TABLE IF NOT EXISTS checkins (
    id             INTEGER PRIMARY KEY,
    restaurant_id  INTEGER NOT NULL REFERENCES restaurants (id),
    dish_id        INTEGER REFERENCES dishes (id),
    created_at     INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS checkins_dish ON checkins (restaurant_id, dish_id, created_at);

CREATE TABLE IF NOT EXISTS photos (
    id          INTEGER PRIMARY KEY,
    dish_id     INTEGER NOT NULL REFERENCES dishes (id),
    created_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS photos_dish ON photos (dish_id, created_at);

CREATE TABLE IF NOT EXISTS venue_sources (
    restaurant_id  INTEGER NOT NULL REFERENCES restaurants (id),
    kind           TEXT    NOT NULL,
    PRIMARY KEY (restaurant_id, kind)
);
";
