/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Deity vocabulary: one row per term, id == vector position
CREATE TABLE IF NOT EXISTS deity_index (
    deity_id INTEGER PRIMARY KEY,
    deity_name TEXT NOT NULL UNIQUE,
    vector_position INTEGER NOT NULL UNIQUE,
    deity_frequency INTEGER NOT NULL DEFAULT 0
);

-- Current vocabulary generation (single row)
CREATE TABLE IF NOT EXISTS vocabulary_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    generation TEXT NOT NULL,
    deity_count INTEGER NOT NULL,
    built_at TEXT NOT NULL
);

-- Hymn vectors
CREATE TABLE IF NOT EXISTS hymn_vectors (
    hymn_id TEXT PRIMARY KEY,
    book_number INTEGER NOT NULL,
    hymn_number INTEGER NOT NULL,
    title TEXT NOT NULL,
    deity_vector TEXT NOT NULL,
    deity_names TEXT NOT NULL,
    deity_count INTEGER NOT NULL,
    hymn_score REAL NOT NULL,
    primary_deity_id INTEGER REFERENCES deity_index(deity_id),
    word_count INTEGER NOT NULL DEFAULT 0,
    vocabulary_generation TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_hymn_vectors_book_hymn ON hymn_vectors(book_number, hymn_number);
CREATE INDEX IF NOT EXISTS idx_hymn_vectors_primary_deity ON hymn_vectors(primary_deity_id);

-- Hymn body text, kept so later passes can run from the store alone
CREATE TABLE IF NOT EXISTS hymn_texts (
    hymn_id TEXT PRIMARY KEY,
    text TEXT NOT NULL
);

-- Similarity edges, one table per namespace, canonical hymn1_id < hymn2_id
CREATE TABLE IF NOT EXISTS hymn_similarities_cosine (
    hymn1_id TEXT NOT NULL,
    hymn2_id TEXT NOT NULL,
    similarity REAL NOT NULL,
    PRIMARY KEY (hymn1_id, hymn2_id),
    CHECK (hymn1_id < hymn2_id)
);
CREATE INDEX IF NOT EXISTS idx_cosine_hymn1 ON hymn_similarities_cosine(hymn1_id);
CREATE INDEX IF NOT EXISTS idx_cosine_hymn2 ON hymn_similarities_cosine(hymn2_id);

CREATE TABLE IF NOT EXISTS hymn_similarities_jaccard (
    hymn1_id TEXT NOT NULL,
    hymn2_id TEXT NOT NULL,
    similarity REAL NOT NULL,
    PRIMARY KEY (hymn1_id, hymn2_id),
    CHECK (hymn1_id < hymn2_id)
);
CREATE INDEX IF NOT EXISTS idx_jaccard_hymn1 ON hymn_similarities_jaccard(hymn1_id);
CREATE INDEX IF NOT EXISTS idx_jaccard_hymn2 ON hymn_similarities_jaccard(hymn2_id);

CREATE TABLE IF NOT EXISTS hymn_similarities_dice (
    hymn1_id TEXT NOT NULL,
    hymn2_id TEXT NOT NULL,
    similarity REAL NOT NULL,
    PRIMARY KEY (hymn1_id, hymn2_id),
    CHECK (hymn1_id < hymn2_id)
);
CREATE INDEX IF NOT EXISTS idx_dice_hymn1 ON hymn_similarities_dice(hymn1_id);
CREATE INDEX IF NOT EXISTS idx_dice_hymn2 ON hymn_similarities_dice(hymn2_id);

CREATE TABLE IF NOT EXISTS hymn_similarities_hamming (
    hymn1_id TEXT NOT NULL,
    hymn2_id TEXT NOT NULL,
    similarity REAL NOT NULL,
    PRIMARY KEY (hymn1_id, hymn2_id),
    CHECK (hymn1_id < hymn2_id)
);
CREATE INDEX IF NOT EXISTS idx_hamming_hymn1 ON hymn_similarities_hamming(hymn1_id);
CREATE INDEX IF NOT EXISTS idx_hamming_hymn2 ON hymn_similarities_hamming(hymn2_id);

CREATE TABLE IF NOT EXISTS hymn_similarities_semantic (
    hymn1_id TEXT NOT NULL,
    hymn2_id TEXT NOT NULL,
    similarity REAL NOT NULL,
    PRIMARY KEY (hymn1_id, hymn2_id),
    CHECK (hymn1_id < hymn2_id)
);
CREATE INDEX IF NOT EXISTS idx_semantic_hymn1 ON hymn_similarities_semantic(hymn1_id);
CREATE INDEX IF NOT EXISTS idx_semantic_hymn2 ON hymn_similarities_semantic(hymn2_id);
";

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
