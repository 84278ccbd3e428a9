use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::Result;
use crate::models::{Document, ExperienceSkillIndex, IndexRecord, JobPosting};

pub struct Storage {
    conn: Connection,
}

/// Short listing of a stored posting.
#[derive(Debug, Clone)]
pub struct StoredJob {
    pub job_id: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS job_raw (
                id INTEGER PRIMARY KEY,
                job_id TEXT UNIQUE NOT NULL,
                job_title TEXT,
                company TEXT,
                location TEXT,
                source TEXT,
                share_link TEXT,
                tags TEXT,
                posted_at TEXT,
                salary TEXT,
                description TEXT NOT NULL DEFAULT '',
                highlights TEXT,
                apply_options TEXT,
                raw_json TEXT,
                fetched_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS experience_skills (
                years_of_experience INTEGER PRIMARY KEY,
                skills_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    /// Upserts postings by `job_id`, returning how many rows were written.
    pub fn save_jobs(&mut self, jobs: &[JobPosting]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let fetched_at = Utc::now().to_rfc3339();

        for job in jobs {
            tx.execute(
                r#"
                INSERT INTO job_raw (
                    job_id, job_title, company, location, source, share_link,
                    tags, posted_at, salary, description,
                    highlights, apply_options, raw_json, fetched_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                ON CONFLICT(job_id) DO UPDATE SET
                    job_title = excluded.job_title,
                    company = excluded.company,
                    location = excluded.location,
                    source = excluded.source,
                    share_link = excluded.share_link,
                    tags = excluded.tags,
                    posted_at = excluded.posted_at,
                    salary = excluded.salary,
                    description = excluded.description,
                    highlights = excluded.highlights,
                    apply_options = excluded.apply_options,
                    raw_json = excluded.raw_json,
                    fetched_at = excluded.fetched_at
                "#,
                params![
                    job.job_id,
                    job.title,
                    job.company_name,
                    job.location,
                    job.via,
                    job.share_link,
                    serde_json::to_string(&job.extensions)?,
                    job.detected_extensions.posted_at,
                    job.detected_extensions.salary,
                    job.description,
                    serde_json::to_string(&job.job_highlights)?,
                    serde_json::to_string(&job.apply_options)?,
                    serde_json::to_string(&job.raw)?,
                    fetched_at,
                ],
            )?;
        }

        tx.commit()?;
        tracing::info!("Stored {} job(s)", jobs.len());
        Ok(jobs.len())
    }

    pub fn load_documents(&self, limit: Option<u32>) -> Result<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, description FROM job_raw ORDER BY id LIMIT ?1",
        )?;

        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map(i64::from).unwrap_or(-1);
        let documents = stmt.query_map(params![limit], |row| {
            Ok(Document {
                id: row.get(0)?,
                text: row.get(1)?,
            })
        })?;

        let documents = documents.collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::info!("Loaded {} job record(s)", documents.len());
        Ok(documents)
    }

    pub fn list_jobs(&self) -> Result<Vec<StoredJob>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, job_title, company, location FROM job_raw ORDER BY fetched_at DESC, id",
        )?;

        let jobs = stmt.query_map([], |row| {
            Ok(StoredJob {
                job_id: row.get(0)?,
                title: row.get(1)?,
                company: row.get(2)?,
                location: row.get(3)?,
            })
        })?;

        jobs.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn count_jobs(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM job_raw", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Replaces the stored index with `index`.
    pub fn save_index(&mut self, index: &ExperienceSkillIndex) -> Result<()> {
        let tx = self.conn.transaction()?;
        let updated_at = Utc::now().to_rfc3339();

        tx.execute("DELETE FROM experience_skills", [])?;
        for (years, skills) in index.iter() {
            tx.execute(
                "INSERT INTO experience_skills (years_of_experience, skills_json, updated_at) VALUES (?1, ?2, ?3)",
                params![years, serde_json::to_string(skills)?, updated_at],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// The last saved index, or `None` if nothing has been saved yet.
    pub fn get_index(&self) -> Result<Option<ExperienceSkillIndex>> {
        let mut stmt = self.conn.prepare(
            "SELECT years_of_experience, skills_json FROM experience_skills ORDER BY years_of_experience",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (years_of_experience, skills_json) = row?;
            records.push(IndexRecord {
                years_of_experience,
                skills: serde_json::from_str(&skills_json)?,
            });
        }

        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(records.into_iter().collect()))
    }
}
