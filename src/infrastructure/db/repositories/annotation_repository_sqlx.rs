use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::annotation_repository::{AnnotationRepository, SaveRef};
use crate::domain::annotations::span::{Link, TextSpan};
use crate::infrastructure::db::PgPool;

pub struct SqlxAnnotationRepository {
    pub pool: PgPool,
}

impl SqlxAnnotationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn span_from_row(row: &PgRow) -> TextSpan {
    TextSpan {
        annoid: row.get("annoid"),
        fileid: row.get("fileid"),
        start: row.get::<i64, _>("start") as usize,
        end: row.get::<i64, _>("end") as usize,
        tag: row.get("tag"),
        text: row.get("text"),
        name: row.get("name"),
        color: row.get("color"),
        links: Vec::new(),
    }
}

fn link_from_row(row: &PgRow) -> Link {
    Link {
        start: row.get::<i64, _>("start") as usize,
        end: row.get::<i64, _>("end") as usize,
        tag: row.get("tag"),
        fileid: row.get("fileid"),
        color: row.get("color"),
        source: row.get("source"),
        target: row.get("target"),
    }
}

/// Attach link rows to their source spans, preserving row order.
fn attach_links(spans: &mut [TextSpan], links: Vec<Link>) {
    let mut by_source: HashMap<Uuid, Vec<Link>> = HashMap::new();
    for link in links {
        by_source.entry(link.source).or_default().push(link);
    }
    for span in spans.iter_mut() {
        if let Some(links) = by_source.remove(&span.annoid) {
            span.links = links;
        }
    }
}

#[async_trait]
impl AnnotationRepository for SqlxAnnotationRepository {
    async fn latest_save(&self, fileid: &str, userid: &str) -> anyhow::Result<Option<SaveRef>> {
        let row = sqlx::query(
            r#"SELECT fileid, userid, "timestamp", savename
               FROM saves
               WHERE fileid = $1 AND userid = $2 AND deleted = FALSE
               ORDER BY "timestamp" DESC
               LIMIT 1"#,
        )
        .bind(fileid)
        .bind(userid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| SaveRef {
            fileid: r.get("fileid"),
            userid: r.get("userid"),
            timestamp: r.get("timestamp"),
            savename: r.get("savename"),
        }))
    }

    async fn load_save(
        &self,
        fileid: &str,
        timestamp: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TextSpan>> {
        let rows = sqlx::query(
            r#"SELECT annoid, fileid, "start", "end", tag, text, name, color
               FROM annotations
               WHERE fileid = $1 AND "timestamp" = $2
               ORDER BY rowid"#,
        )
        .bind(fileid)
        .bind(timestamp)
        .fetch_all(&self.pool)
        .await?;
        let mut spans: Vec<TextSpan> = rows.iter().map(span_from_row).collect();

        let link_rows = sqlx::query(
            r#"SELECT source, target, fileid, tag, color, "start", "end"
               FROM links
               WHERE "timestamp" = $1
               ORDER BY rowid"#,
        )
        .bind(timestamp)
        .fetch_all(&self.pool)
        .await?;
        attach_links(&mut spans, link_rows.iter().map(link_from_row).collect());
        Ok(spans)
    }

    async fn load_all_other(&self, fileid: &str) -> anyhow::Result<Vec<TextSpan>> {
        let rows = sqlx::query(
            r#"SELECT a.annoid, a.fileid, a."start", a."end", a.tag, a.text, a.name, a.color,
                      a."timestamp"
               FROM annotations a
               WHERE a."timestamp" = (SELECT MAX("timestamp") FROM annotations WHERE fileid = a.fileid)
                 AND a.fileid != $1
               ORDER BY a.fileid, a.rowid"#,
        )
        .bind(fileid)
        .fetch_all(&self.pool)
        .await?;
        let mut spans: Vec<TextSpan> = rows.iter().map(span_from_row).collect();

        let timestamps: Vec<DateTime<Utc>> = {
            let mut seen: Vec<DateTime<Utc>> = rows
                .iter()
                .map(|r| r.get::<DateTime<Utc>, _>("timestamp"))
                .collect();
            seen.sort_unstable();
            seen.dedup();
            seen
        };
        if timestamps.is_empty() {
            return Ok(spans);
        }

        let link_rows = sqlx::query(
            r#"SELECT source, target, fileid, tag, color, "start", "end"
               FROM links
               WHERE "timestamp" = ANY($1)
               ORDER BY rowid"#,
        )
        .bind(&timestamps)
        .fetch_all(&self.pool)
        .await?;
        attach_links(&mut spans, link_rows.iter().map(link_from_row).collect());
        Ok(spans)
    }

    async fn store_save(
        &self,
        save: &SaveRef,
        autosave: bool,
        spans: &[TextSpan],
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO saves (fileid, userid, "timestamp", savename, autosave)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(&save.fileid)
        .bind(&save.userid)
        .bind(save.timestamp)
        .bind(&save.savename)
        .bind(autosave)
        .execute(&mut *tx)
        .await?;

        for span in spans {
            sqlx::query(
                r#"INSERT INTO annotations
                   (annoid, fileid, userid, "timestamp", savename, "start", "end", tag, text, name, color)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
            )
            .bind(span.annoid)
            .bind(&span.fileid)
            .bind(&save.userid)
            .bind(save.timestamp)
            .bind(&save.savename)
            .bind(span.start as i64)
            .bind(span.end as i64)
            .bind(&span.tag)
            .bind(&span.text)
            .bind(&span.name)
            .bind(&span.color)
            .execute(&mut *tx)
            .await?;

            for link in &span.links {
                sqlx::query(
                    r#"INSERT INTO links
                       (source, target, "timestamp", fileid, tag, color, "start", "end")
                       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
                )
                .bind(link.source)
                .bind(link.target)
                .bind(save.timestamp)
                .bind(&link.fileid)
                .bind(&link.tag)
                .bind(&link.color)
                .bind(link.start as i64)
                .bind(link.end as i64)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
