use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::application::ports::save_repository::{SaveRepository, SaveRow};
use crate::infrastructure::db::PgPool;

pub struct SqlxSaveRepository {
    pub pool: PgPool,
}

impl SqlxSaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SaveRepository for SqlxSaveRepository {
    async fn list_saves(
        &self,
        fileid: Option<&str>,
        userid: Option<&str>,
        only_final: bool,
    ) -> anyhow::Result<Vec<SaveRow>> {
        let rows = sqlx::query(
            r#"SELECT s.fileid, s.userid, s."timestamp", s.savename, s.autosave, s.final,
                      COUNT(a.rowid) AS count
               FROM saves s
               LEFT JOIN annotations a
                 ON a.fileid = s.fileid AND a.userid = s.userid
                AND a."timestamp" = s."timestamp" AND a.savename = s.savename
               WHERE s.deleted = FALSE
                 AND ($1::text IS NULL OR s.fileid = $1)
                 AND ($2::text IS NULL OR s.userid = $2)
                 AND (NOT $3 OR s.final = TRUE)
               GROUP BY s.fileid, s.userid, s."timestamp", s.savename, s.autosave, s.final
               ORDER BY s."timestamp" DESC"#,
        )
        .bind(fileid)
        .bind(userid)
        .bind(only_final)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| SaveRow {
                fileid: r.get("fileid"),
                userid: r.get("userid"),
                timestamp: r.get("timestamp"),
                savename: r.get("savename"),
                autosave: r.get("autosave"),
                is_final: r.get("final"),
                count: r.get("count"),
            })
            .collect())
    }

    async fn mark_final(
        &self,
        fileid: &str,
        userid: &str,
        timestamp: DateTime<Utc>,
        savename: &str,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE saves SET final = TRUE
               WHERE fileid = $1 AND userid = $2 AND "timestamp" = $3 AND savename = $4"#,
        )
        .bind(fileid)
        .bind(userid)
        .bind(timestamp)
        .bind(savename)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn rename_save(
        &self,
        fileid: &str,
        userid: &str,
        timestamp: DateTime<Utc>,
        savename: &str,
        new_name: &str,
    ) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query(
            r#"UPDATE saves SET savename = $5
               WHERE fileid = $1 AND userid = $2 AND "timestamp" = $3 AND savename = $4"#,
        )
        .bind(fileid)
        .bind(userid)
        .bind(timestamp)
        .bind(savename)
        .bind(new_name)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            r#"UPDATE annotations SET savename = $5
               WHERE fileid = $1 AND userid = $2 AND "timestamp" = $3 AND savename = $4"#,
        )
        .bind(fileid)
        .bind(userid)
        .bind(timestamp)
        .bind(savename)
        .bind(new_name)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(res.rows_affected() > 0)
    }
}
