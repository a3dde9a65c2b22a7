use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{
    Corpus, DeityId, DeityTerm, Hymn, HymnId, HymnVector, Namespace, SimilarityEdge, Vocabulary,
};

use super::migrations::MIGRATIONS;

const VECTOR_COLUMNS: &str = "hymn_id, book_number, hymn_number, title, deity_vector, \
     deity_names, deity_count, hymn_score, primary_deity_id, word_count";

/// Lower bounds of the similarity distribution buckets reported by
/// [`Database::edge_stats`]: `<0.3`, `[0.3,0.5)`, `[0.5,0.7)`, `>=0.7`.
pub const BUCKET_BOUNDS: [f64; 3] = [0.3, 0.5, 0.7];

/// Summary of one similarity namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStats {
    pub namespace: Namespace,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub buckets: [usize; 4],
}

/// Summary of the stored hymn vectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorStats {
    pub hymns: usize,
    pub zero_vectors: usize,
    pub assigned: usize,
    pub min_deity_count: u32,
    pub max_deity_count: u32,
    pub mean_deity_count: f64,
    pub max_hymn_score: f64,
    pub mean_hymn_score: f64,
}

/// Hymns assigned to one primary deity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeityShare {
    pub deity_id: DeityId,
    pub deity_name: String,
    pub hymn_count: usize,
    pub frequency: u64,
}

/// The persisted vocabulary generation marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyInfo {
    pub generation: String,
    pub deity_count: usize,
    pub built_at: String,
}

/// A database connection holding the vocabulary, hymn vectors and
/// similarity edges.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Vocabulary generation
impl Database {
    /// Atomically replace the vocabulary, every hymn vector and the stored
    /// corpus text with a new generation.
    ///
    /// Edges in vocabulary-dependent namespaces are cleared in the same
    /// transaction, since they describe vectors that no longer exist. The
    /// semantic namespace is left alone.
    pub fn replace_generation(
        &self,
        vocabulary: &Vocabulary,
        vectors: &[HymnVector],
        corpus: &Corpus,
    ) -> Result<()> {
        if let Some(bad) = vectors.iter().find(|v| v.vector.len() != vocabulary.len()) {
            return Err(Error::InvalidData(format!(
                "hymn {} has a vector of length {}, vocabulary has {} deities",
                bad.hymn_id,
                bad.vector.len(),
                vocabulary.len()
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM hymn_vectors", [])?;
        tx.execute("DELETE FROM hymn_texts", [])?;
        tx.execute("DELETE FROM deity_index", [])?;
        for namespace in Namespace::ALL {
            if namespace.depends_on_vocabulary() {
                tx.execute(&format!("DELETE FROM {}", namespace.table()), [])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO deity_index (deity_id, deity_name, vector_position, deity_frequency)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for term in vocabulary.terms() {
                stmt.execute(params![
                    term.id.get(),
                    term.name,
                    to_sql_count(term.position),
                    to_sql_u64(term.frequency),
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO hymn_vectors (
                    hymn_id, book_number, hymn_number, title, deity_vector, deity_names,
                    deity_count, hymn_score, primary_deity_id, word_count, vocabulary_generation
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for v in vectors {
                stmt.execute(params![
                    v.hymn_id.as_str(),
                    v.book_number,
                    v.hymn_number,
                    v.title,
                    serde_json::to_string(&v.vector)?,
                    serde_json::to_string(&v.deity_names)?,
                    v.deity_count,
                    v.hymn_score,
                    v.primary_deity_id.map(DeityId::get),
                    v.word_count,
                    vocabulary.generation(),
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare("INSERT INTO hymn_texts (hymn_id, text) VALUES (?1, ?2)")?;
            for hymn in corpus {
                stmt.execute(params![hymn.id.as_str(), hymn.text])?;
            }
        }

        tx.execute(
            "INSERT INTO vocabulary_meta (id, generation, deity_count, built_at)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                generation = excluded.generation,
                deity_count = excluded.deity_count,
                built_at = excluded.built_at",
            params![
                vocabulary.generation(),
                to_sql_count(vocabulary.len()),
                Utc::now().to_rfc3339(),
            ],
        )?;

        tx.commit()?;
        log::info!(
            "Stored vocabulary generation {} ({} deities, {} hymn vectors)",
            vocabulary.generation(),
            vocabulary.len(),
            vectors.len()
        );
        Ok(())
    }

    /// The persisted generation marker, if a vocabulary has been built.
    pub fn vocabulary_info(&self) -> Result<Option<VocabularyInfo>> {
        let info = self
            .conn
            .query_row(
                "SELECT generation, deity_count, built_at FROM vocabulary_meta WHERE id = 1",
                [],
                |row| {
                    Ok(VocabularyInfo {
                        generation: row.get(0)?,
                        deity_count: from_sql_count(row.get(1)?),
                        built_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    /// Load the current vocabulary, or `None` before the first build.
    pub fn load_vocabulary(&self) -> Result<Option<Vocabulary>> {
        let Some(info) = self.vocabulary_info()? else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT deity_id, deity_name, vector_position, deity_frequency
             FROM deity_index
             ORDER BY vector_position",
        )?;
        let terms = stmt
            .query_map([], |row| {
                Ok(DeityTerm {
                    id: DeityId::new(row.get(0)?),
                    name: row.get(1)?,
                    position: from_sql_count(row.get(2)?),
                    frequency: u64::try_from(row.get::<_, i64>(3)?).unwrap_or(0),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Vocabulary::new(info.generation, terms).map(Some)
    }

    /// Overwrite stored deity frequencies. Returns the number of rows changed.
    pub fn update_deity_frequencies(&self, updates: &[(DeityId, u64)]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        {
            let mut stmt =
                tx.prepare("UPDATE deity_index SET deity_frequency = ?2 WHERE deity_id = ?1")?;
            for (id, frequency) in updates {
                changed += stmt.execute(params![id.get(), to_sql_u64(*frequency)])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    /// Fail unless every stored vector belongs to the current vocabulary
    /// generation and has its length. Returns the vocabulary on success.
    pub fn verify_vocabulary_consistency(&self) -> Result<Vocabulary> {
        let vocabulary = self.load_vocabulary()?.ok_or_else(|| Error::NotFound {
            entity: "vocabulary",
            id: "current".to_string(),
        })?;

        let stale: Option<String> = self
            .conn
            .query_row(
                "SELECT vocabulary_generation FROM hymn_vectors
                 WHERE vocabulary_generation != ?1 LIMIT 1",
                [vocabulary.generation()],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(found) = stale {
            return Err(Error::VocabularyVersionMismatch {
                expected: vocabulary.generation().to_string(),
                found,
            });
        }

        let wrong_length: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT hymn_id, json_array_length(deity_vector) FROM hymn_vectors
                 WHERE json_array_length(deity_vector) != ?1 LIMIT 1",
                [to_sql_count(vocabulary.len())],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        if let Some((hymn, len)) = wrong_length {
            return Err(Error::VocabularyVersionMismatch {
                expected: format!("{} positions", vocabulary.len()),
                found: format!("{len} positions in hymn {hymn}"),
            });
        }

        Ok(vocabulary)
    }
}

// Hymn vectors
impl Database {
    pub fn get_hymn_vector(&self, id: &HymnId) -> Result<Option<HymnVector>> {
        let vector = self
            .conn
            .query_row(
                &format!("SELECT {VECTOR_COLUMNS} FROM hymn_vectors WHERE hymn_id = ?1"),
                [id.as_str()],
                row_to_hymn_vector,
            )
            .optional()?;
        Ok(vector)
    }

    /// Vectors for the given ids, in the given order. Unknown ids are skipped.
    pub fn get_hymn_vectors(&self, ids: &[HymnId]) -> Result<Vec<HymnVector>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VECTOR_COLUMNS} FROM hymn_vectors WHERE hymn_id = ?1"
        ))?;
        let mut vectors = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(v) = stmt
                .query_row([id.as_str()], row_to_hymn_vector)
                .optional()?
            {
                vectors.push(v);
            }
        }
        Ok(vectors)
    }

    /// Every stored vector, ordered by book then hymn.
    pub fn list_hymn_vectors(&self) -> Result<Vec<HymnVector>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VECTOR_COLUMNS} FROM hymn_vectors ORDER BY book_number, hymn_number"
        ))?;
        let vectors = stmt
            .query_map([], row_to_hymn_vector)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(vectors)
    }

    pub fn count_hymns(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM hymn_vectors", [], |row| row.get(0))?;
        Ok(from_sql_count(count))
    }

    /// Rebuild the corpus snapshot from stored titles and texts.
    pub fn load_corpus(&self) -> Result<Corpus> {
        let mut stmt = self.conn.prepare(
            "SELECT v.hymn_id, v.book_number, v.hymn_number, v.title, COALESCE(t.text, '')
             FROM hymn_vectors v
             LEFT JOIN hymn_texts t ON t.hymn_id = v.hymn_id
             ORDER BY v.book_number, v.hymn_number",
        )?;
        let hymns = stmt
            .query_map([], |row| {
                Ok(Hymn {
                    id: HymnId::new(row.get::<_, String>(0)?),
                    book_number: row.get(1)?,
                    hymn_number: row.get(2)?,
                    title: row.get(3)?,
                    text: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Corpus::new(hymns)
    }

    /// Overwrite every primary-deity assignment: hymns absent from
    /// `assignments` end up unassigned.
    pub fn replace_primary_deities(&self, assignments: &[(HymnId, DeityId)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("UPDATE hymn_vectors SET primary_deity_id = NULL", [])?;
        {
            let mut stmt =
                tx.prepare("UPDATE hymn_vectors SET primary_deity_id = ?2 WHERE hymn_id = ?1")?;
            for (hymn, deity) in assignments {
                stmt.execute(params![hymn.as_str(), deity.get()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Hymn counts per assigned primary deity, largest first.
    pub fn primary_deity_distribution(&self) -> Result<Vec<DeityShare>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.deity_id, d.deity_name, d.deity_frequency, COUNT(h.hymn_id) AS hymn_count
             FROM deity_index d
             JOIN hymn_vectors h ON h.primary_deity_id = d.deity_id
             GROUP BY d.deity_id, d.deity_name, d.deity_frequency
             ORDER BY hymn_count DESC, d.deity_id ASC",
        )?;
        let shares = stmt
            .query_map([], |row| {
                Ok(DeityShare {
                    deity_id: DeityId::new(row.get(0)?),
                    deity_name: row.get(1)?,
                    frequency: u64::try_from(row.get::<_, i64>(2)?).unwrap_or(0),
                    hymn_count: from_sql_count(row.get(3)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(shares)
    }

    pub fn vector_stats(&self) -> Result<VectorStats> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(deity_count = 0), 0),
                    COALESCE(SUM(primary_deity_id IS NOT NULL), 0),
                    COALESCE(MIN(deity_count), 0),
                    COALESCE(MAX(deity_count), 0),
                    COALESCE(AVG(deity_count), 0.0),
                    COALESCE(MAX(hymn_score), 0.0),
                    COALESCE(AVG(hymn_score), 0.0)
             FROM hymn_vectors",
            [],
            |row| {
                Ok(VectorStats {
                    hymns: from_sql_count(row.get(0)?),
                    zero_vectors: from_sql_count(row.get(1)?),
                    assigned: from_sql_count(row.get(2)?),
                    min_deity_count: row.get(3)?,
                    max_deity_count: row.get(4)?,
                    mean_deity_count: row.get(5)?,
                    max_hymn_score: row.get(6)?,
                    mean_hymn_score: row.get(7)?,
                })
            },
        )?;
        Ok(stats)
    }

    pub fn top_hymns_by_score(&self, limit: usize) -> Result<Vec<HymnVector>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VECTOR_COLUMNS} FROM hymn_vectors
             ORDER BY hymn_score DESC, book_number, hymn_number
             LIMIT ?1"
        ))?;
        let vectors = stmt
            .query_map([to_sql_count(limit)], row_to_hymn_vector)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(vectors)
    }
}

// Similarity edges
impl Database {
    /// Replace every edge in a namespace. Returns the number stored.
    pub fn replace_edges(&self, namespace: Namespace, edges: &[SimilarityEdge]) -> Result<usize> {
        let table = namespace.table();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {table} (hymn1_id, hymn2_id, similarity) VALUES (?1, ?2, ?3)"
            ))?;
            for edge in edges {
                stmt.execute(params![
                    edge.hymn1.as_str(),
                    edge.hymn2.as_str(),
                    edge.similarity
                ])?;
            }
        }
        tx.commit()?;
        log::info!("Stored {} {} edges", edges.len(), namespace);
        Ok(edges.len())
    }

    /// The `k` highest-scoring neighbors of a hymn, ties broken by id.
    pub fn top_neighbors(
        &self,
        namespace: Namespace,
        id: &HymnId,
        k: usize,
    ) -> Result<Vec<(HymnId, f64)>> {
        self.neighbors(namespace, id, None, Some(k))
    }

    /// Every neighbor scoring at least `min`, highest first.
    pub fn neighbors_above(
        &self,
        namespace: Namespace,
        id: &HymnId,
        min: f64,
    ) -> Result<Vec<(HymnId, f64)>> {
        self.neighbors(namespace, id, Some(min), None)
    }

    fn neighbors(
        &self,
        namespace: Namespace,
        id: &HymnId,
        min: Option<f64>,
        limit: Option<usize>,
    ) -> Result<Vec<(HymnId, f64)>> {
        let table = namespace.table();
        // Only canonical rows exist, so each endpoint column is searched on
        // its own index and the halves are merged.
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT other, similarity FROM (
                SELECT hymn2_id AS other, similarity FROM {table} WHERE hymn1_id = ?1
                UNION ALL
                SELECT hymn1_id AS other, similarity FROM {table} WHERE hymn2_id = ?1
             )
             WHERE ?2 IS NULL OR similarity >= ?2
             ORDER BY similarity DESC, other ASC
             LIMIT ?3"
        ))?;
        let limit = limit.map_or(-1, to_sql_count);
        let neighbors = stmt
            .query_map(params![id.as_str(), min, limit], |row| {
                Ok((HymnId::new(row.get::<_, String>(0)?), row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(neighbors)
    }

    /// The stored score of an unordered pair.
    pub fn edge_similarity(
        &self,
        namespace: Namespace,
        a: &HymnId,
        b: &HymnId,
    ) -> Result<Option<f64>> {
        if a == b {
            return Ok(None);
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let similarity = self
            .conn
            .query_row(
                &format!(
                    "SELECT similarity FROM {} WHERE hymn1_id = ?1 AND hymn2_id = ?2",
                    namespace.table()
                ),
                params![first.as_str(), second.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(similarity)
    }

    /// Highest-scoring pairs in a namespace.
    pub fn top_edges(
        &self,
        namespace: Namespace,
        min: Option<f64>,
        limit: usize,
    ) -> Result<Vec<SimilarityEdge>> {
        self.select_edges(namespace, min, Some(limit))
    }

    /// Every edge in a namespace, highest first.
    pub fn list_edges(&self, namespace: Namespace) -> Result<Vec<SimilarityEdge>> {
        self.select_edges(namespace, None, None)
    }

    fn select_edges(
        &self,
        namespace: Namespace,
        min: Option<f64>,
        limit: Option<usize>,
    ) -> Result<Vec<SimilarityEdge>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT hymn1_id, hymn2_id, similarity FROM {}
             WHERE ?1 IS NULL OR similarity >= ?1
             ORDER BY similarity DESC, hymn1_id, hymn2_id
             LIMIT ?2",
            namespace.table()
        ))?;
        let limit = limit.map_or(-1, to_sql_count);
        let edges = stmt
            .query_map(params![min, limit], |row| {
                Ok(SimilarityEdge {
                    hymn1: HymnId::new(row.get::<_, String>(0)?),
                    hymn2: HymnId::new(row.get::<_, String>(1)?),
                    similarity: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    pub fn count_edges(&self, namespace: Namespace) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", namespace.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(from_sql_count(count))
    }

    pub fn edge_stats(&self, namespace: Namespace) -> Result<EdgeStats> {
        let [low, mid, high] = BUCKET_BOUNDS;
        let stats = self.conn.query_row(
            &format!(
                "SELECT COUNT(*), MIN(similarity), MAX(similarity), AVG(similarity),
                        COALESCE(SUM(similarity < ?1), 0),
                        COALESCE(SUM(similarity >= ?1 AND similarity < ?2), 0),
                        COALESCE(SUM(similarity >= ?2 AND similarity < ?3), 0),
                        COALESCE(SUM(similarity >= ?3), 0)
                 FROM {}",
                namespace.table()
            ),
            params![low, mid, high],
            |row| {
                Ok(EdgeStats {
                    namespace,
                    count: from_sql_count(row.get(0)?),
                    min: row.get(1)?,
                    max: row.get(2)?,
                    mean: row.get(3)?,
                    buckets: [
                        from_sql_count(row.get(4)?),
                        from_sql_count(row.get(5)?),
                        from_sql_count(row.get(6)?),
                        from_sql_count(row.get(7)?),
                    ],
                })
            },
        )?;
        Ok(stats)
    }
}

fn row_to_hymn_vector(row: &Row<'_>) -> rusqlite::Result<HymnVector> {
    let vector_json: String = row.get(4)?;
    let names_json: String = row.get(5)?;
    Ok(HymnVector {
        hymn_id: HymnId::new(row.get::<_, String>(0)?),
        book_number: row.get(1)?,
        hymn_number: row.get(2)?,
        title: row.get(3)?,
        vector: json_column(4, &vector_json)?,
        deity_names: json_column(5, &names_json)?,
        deity_count: row.get(6)?,
        hymn_score: row.get(7)?,
        primary_deity_id: row.get::<_, Option<u32>>(8)?.map(DeityId::new),
        word_count: row.get(9)?,
    })
}

fn json_column<T: DeserializeOwned>(index: usize, text: &str) -> rusqlite::Result<T> {
    serde_json::from_str(text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn to_sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn to_sql_u64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn from_sql_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}
