//! SQL schema for the Kindred SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS families (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    is_public   INTEGER NOT NULL DEFAULT 0,
    created_by  TEXT,            -- external auth user id
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS persons (
    id          TEXT PRIMARY KEY,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    gender      TEXT NOT NULL,   -- 'male' | 'female' | 'other'
    birth_date  TEXT,            -- ISO 8601 date
    death_date  TEXT,
    birth_place TEXT,
    death_place TEXT,
    is_deceased INTEGER NOT NULL DEFAULT 0,
    family_id   TEXT REFERENCES families(id) ON DELETE SET NULL,
    created_by  TEXT,
    created_at  TEXT NOT NULL
);

-- Typed edges of the family graph. person1 -> person2 reads as
-- 'is parent of' for parent_child edges; spouse and sibling edges may be
-- stored in either order.
CREATE TABLE IF NOT EXISTS relationships (
    id            TEXT PRIMARY KEY,
    person1_id    TEXT NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
    person2_id    TEXT NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
    kind          TEXT NOT NULL,  -- 'parent_child' | 'spouse' | 'sibling'
    subtype       TEXT NOT NULL,
    marriage_date TEXT,           -- spouse edges only
    divorce_date  TEXT,
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);

-- Edge identity follows each kind's directionality: the ordered pair for
-- directed kinds, the normalised pair for undirected kinds.
CREATE UNIQUE INDEX IF NOT EXISTS relationships_directed_uniq
    ON relationships (person1_id, person2_id, kind)
    WHERE kind = 'parent_child';
CREATE UNIQUE INDEX IF NOT EXISTS relationships_undirected_uniq
    ON relationships
       (MIN(person1_id, person2_id), MAX(person1_id, person2_id), kind)
    WHERE kind IN ('spouse', 'sibling');

-- One permission level per (user, family) pair.
CREATE TABLE IF NOT EXISTS grants (
    user_id    TEXT NOT NULL,
    family_id  TEXT NOT NULL REFERENCES families(id) ON DELETE CASCADE,
    level      TEXT NOT NULL,   -- 'view' | 'edit' | 'admin'
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, family_id)
);

CREATE TABLE IF NOT EXISTS posts (
    id         TEXT PRIMARY KEY,
    family_id  TEXT NOT NULL REFERENCES families(id) ON DELETE CASCADE,
    author_id  TEXT NOT NULL,
    title      TEXT,
    content    TEXT NOT NULL,
    visibility TEXT NOT NULL DEFAULT 'family',  -- 'public' | 'family' | 'admin'
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id                TEXT PRIMARY KEY,
    post_id           TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    author_id         TEXT NOT NULL,
    content           TEXT NOT NULL,
    parent_comment_id TEXT REFERENCES comments(id) ON DELETE CASCADE,
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS relationships_person1_idx
    ON relationships(person1_id, kind);
CREATE INDEX IF NOT EXISTS relationships_person2_idx
    ON relationships(person2_id, kind);
CREATE INDEX IF NOT EXISTS persons_family_idx ON persons(family_id);
CREATE INDEX IF NOT EXISTS posts_family_idx   ON posts(family_id);
CREATE INDEX IF NOT EXISTS comments_post_idx  ON comments(post_id);

PRAGMA user_version = 1;
";
