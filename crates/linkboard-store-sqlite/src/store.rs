//! [`SqliteStore`] — the SQLite implementation of [`LinkStore`].

use std::{
  collections::{HashMap, HashSet},
  path::Path,
};

use linkboard_core::{
  link::{JobLink, NewJobLink},
  open::LastOpened,
  store::{LinkFilter, LinkPage, LinkStore},
  tag::Tag,
  user::{User, UserCredentials},
};
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::info;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawLastOpened, RawLink, RawTag, RawUser, encode_dt, encode_uuid, now,
    placeholders,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Linkboard store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    info!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// `WHERE` clause selecting links that carry every name in `tag_names`,
/// with its bind values. Relies on `(job_link_id, tag_id)` and `tags.name`
/// both being unique, so each requested name matches at most one row.
fn tag_filter_clause(tag_names: &[String]) -> (String, Vec<Value>) {
  if tag_names.is_empty() {
    return (String::new(), Vec::new());
  }
  let clause = format!(
    "WHERE (
       SELECT COUNT(*)
       FROM job_link_tags jt
       JOIN tags t ON t.tag_id = jt.tag_id
       WHERE jt.job_link_id = j.job_link_id
         AND t.name IN ({})
     ) = {}",
    placeholders(tag_names.len()),
    tag_names.len(),
  );
  let values = tag_names.iter().cloned().map(Value::Text).collect();
  (clause, values)
}

// ─── LinkStore impl ──────────────────────────────────────────────────────────

impl LinkStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, email: String, password_hash: String) -> Result<Option<User>> {
    let user = User { user_id: Uuid::new_v4(), email, created_at: now() };

    let id_str    = encode_uuid(user.user_id);
    let email_str = user.email.clone();
    let at_str    = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO users (user_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![id_str, email_str, password_hash, at_str],
        )?)
      })
      .await?;

    Ok((inserted > 0).then_some(user))
  }

  async fn find_user_by_email(&self, email: String) -> Result<Option<UserCredentials>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, email, password_hash, created_at
             FROM users WHERE email = ?1",
            rusqlite::params![email],
            |row| {
              Ok(RawUser {
                user_id:       row.get(0)?,
                email:         row.get(1)?,
                password_hash: row.get(2)?,
                created_at:    row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_credentials).transpose()
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn upsert_tag(&self, name: String) -> Result<Tag> {
    let id_str = encode_uuid(Uuid::new_v4());

    let raw: RawTag = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO tags (tag_id, name) VALUES (?1, ?2)
           ON CONFLICT(name) DO NOTHING",
          rusqlite::params![id_str, name],
        )?;
        let raw = tx.query_row(
          "SELECT tag_id, name FROM tags WHERE name = ?1",
          rusqlite::params![name],
          |row| Ok(RawTag { tag_id: row.get(0)?, name: row.get(1)? }),
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_tag()
  }

  async fn list_tags(&self) -> Result<Vec<Tag>> {
    let raws: Vec<RawTag> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT tag_id, name FROM tags ORDER BY name")?;
        let rows = stmt
          .query_map([], |row| Ok(RawTag { tag_id: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  // ── Links ─────────────────────────────────────────────────────────────────

  async fn find_existing_urls(&self, urls: Vec<String>) -> Result<HashSet<String>> {
    if urls.is_empty() {
      return Ok(HashSet::new());
    }

    let found = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT url FROM job_links WHERE url IN ({})",
          placeholders(urls.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(urls.iter()), |row| row.get(0))?
          .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(found)
  }

  async fn create_link_with_tags(&self, input: NewJobLink) -> Result<Option<JobLink>> {
    let link = JobLink {
      job_link_id: Uuid::new_v4(),
      url:         input.url,
      created_at:  now(),
      created_by:  input.created_by,
      tags:        input.tags,
    };

    let id_str      = encode_uuid(link.job_link_id);
    let url         = link.url.clone();
    let at_str      = encode_dt(link.created_at);
    let creator_str = link.created_by.map(encode_uuid);
    let tag_ids: Vec<String> = link.tags.iter().map(|t| encode_uuid(t.tag_id)).collect();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let rows = tx.execute(
          "INSERT INTO job_links (job_link_id, url, created_at, created_by)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(url) DO NOTHING",
          rusqlite::params![id_str, url, at_str, creator_str],
        )?;
        if rows == 0 {
          // Dropping the transaction rolls it back.
          return Ok(false);
        }
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO job_link_tags (job_link_id, tag_id) VALUES (?1, ?2)",
          )?;
          for tag_id in &tag_ids {
            stmt.execute(rusqlite::params![id_str, tag_id])?;
          }
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(inserted.then_some(link))
  }

  async fn list_links(&self, filter: LinkFilter) -> Result<LinkPage> {
    let (where_clause, mut values) = tag_filter_clause(&filter.tag_names);

    let (total, raws): (i64, Vec<RawLink>) = self
      .conn
      .call(move |conn| {
        // Both reads share one transaction, so the count matches the page.
        let tx = conn.transaction()?;

        let total: i64 = tx.query_row(
          &format!("SELECT COUNT(*) FROM job_links j {where_clause}"),
          rusqlite::params_from_iter(values.iter()),
          |row| row.get(0),
        )?;

        // SQLite reads a negative OFFSET as zero, so saturate instead of wrapping.
        values.push(Value::Integer(i64::try_from(filter.limit).unwrap_or(i64::MAX)));
        values.push(Value::Integer(i64::try_from(filter.offset).unwrap_or(i64::MAX)));

        let sql = format!(
          "SELECT
             j.job_link_id, j.url, j.created_at, j.created_by,
             u.email AS created_by_email,
             (SELECT json_group_array(name) FROM (
                SELECT t.name
                FROM job_link_tags jt
                JOIN tags t ON t.tag_id = jt.tag_id
                WHERE jt.job_link_id = j.job_link_id
                ORDER BY t.name
             )) AS tag_names
           FROM job_links j
           LEFT JOIN users u ON u.user_id = j.created_by
           {where_clause}
           ORDER BY j.created_at DESC, j.job_link_id DESC
           LIMIT ? OFFSET ?"
        );

        let rows = {
          let mut stmt = tx.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params_from_iter(values.iter()), |row| {
              Ok(RawLink {
                job_link_id:      row.get(0)?,
                url:              row.get(1)?,
                created_at:       row.get(2)?,
                created_by:       row.get(3)?,
                created_by_email: row.get(4)?,
                tag_names:        row.get(5)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        tx.commit()?;
        Ok((total, rows))
      })
      .await?;

    Ok(LinkPage {
      total_count: total as u64,
      links:       raws.into_iter().map(RawLink::into_record).collect::<Result<_>>()?,
    })
  }

  // ── Opens ─────────────────────────────────────────────────────────────────

  async fn record_opens(&self, user_id: Uuid, job_link_ids: Vec<Uuid>) -> Result<u64> {
    let user_str = encode_uuid(user_id);
    let at_str   = encode_dt(now());
    let id_strs: Vec<String> = job_link_ids.into_iter().map(encode_uuid).collect();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO open_events (user_id, job_link_id, opened_at) VALUES (?1, ?2, ?3)",
          )?;
          for id in &id_strs {
            inserted += stmt.execute(rusqlite::params![user_str, id, at_str])?;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    Ok(inserted as u64)
  }

  async fn last_opened(&self, user_id: Uuid, job_link_ids: Vec<Uuid>) -> Result<Vec<LastOpened>> {
    if job_link_ids.is_empty() {
      return Ok(Vec::new());
    }

    let user_str = encode_uuid(user_id);
    // One JSON array parameter, so the id count is not bound by SQLite's
    // host-parameter limit.
    let ids_json = serde_json::to_string(
      &job_link_ids.iter().copied().map(encode_uuid).collect::<Vec<_>>(),
    )?;

    let raws: Vec<RawLastOpened> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT job_link_id, MAX(opened_at)
           FROM open_events
           WHERE user_id = ?1
             AND job_link_id IN (SELECT value FROM json_each(?2))
           GROUP BY job_link_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, ids_json], |row| {
            Ok(RawLastOpened {
              job_link_id:    row.get(0)?,
              last_opened_at: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut by_id: HashMap<Uuid, LastOpened> = raws
      .into_iter()
      .map(|raw| raw.into_last_opened().map(|l| (l.job_link_id, l)))
      .collect::<Result<_>>()?;

    // Report in the caller's order.
    Ok(job_link_ids.iter().filter_map(|id| by_id.remove(id)).collect())
  }
}
