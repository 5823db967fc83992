//! PostgreSQL-backed `SyllabusStore` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::collections::HashMap;

use crate::domain::ports::{SyllabusStore, SyllabusStoreError};
use crate::domain::syllabus::{Chapter, ChapterPatch, NewChapter, Session};

use super::checks;
use super::models::{
    ChapterRow, ChapterUpdateRow, NewChapterRow, NewSessionRow, SessionRow, SessionUpdateRow,
};
use super::pool::DbPool;
use super::schema::{chapters, sessions};

/// Diesel-backed implementation of the [`SyllabusStore`] port.
#[derive(Clone)]
pub struct DieselSyllabusStore {
    pool: DbPool,
}

impl DieselSyllabusStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_session(row: SessionRow) -> Session {
    Session {
        id: row.id,
        session_name: row.session_name,
        session_link: row.session_link,
        chapter_id: row.chapter_id,
    }
}

fn assemble_chapter(row: ChapterRow, sessions: Vec<Session>) -> Chapter {
    Chapter {
        id: row.id,
        chapter_name: row.chapter_name,
        course_id: row.course_id,
        sessions,
    }
}

/// Load one chapter's sessions in id order.
async fn sessions_for_chapter(
    conn: &mut AsyncPgConnection,
    chapter_id: i32,
) -> Result<Vec<Session>, SyllabusStoreError> {
    let rows: Vec<SessionRow> = sessions::table
        .filter(sessions::chapter_id.eq(chapter_id))
        .select(SessionRow::as_select())
        .order(sessions::id.asc())
        .load(conn)
        .await?;
    Ok(rows.into_iter().map(row_to_session).collect())
}

#[async_trait]
impl SyllabusStore for DieselSyllabusStore {
    async fn create_chapter(&self, chapter: NewChapter) -> Result<Chapter, SyllabusStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Chapter, SyllabusStoreError, _>(|conn| {
            async move {
                checks::ensure_course(conn, chapter.course_id()).await?;

                let row: ChapterRow = diesel::insert_into(chapters::table)
                    .values(&NewChapterRow {
                        chapter_name: chapter.chapter_name(),
                        course_id: chapter.course_id(),
                    })
                    .returning(ChapterRow::as_returning())
                    .get_result(conn)
                    .await?;

                if !chapter.sessions().is_empty() {
                    let session_rows: Vec<NewSessionRow<'_>> = chapter
                        .sessions()
                        .iter()
                        .map(|session| NewSessionRow {
                            session_name: session.session_name(),
                            session_link: session.session_link(),
                            chapter_id: row.id,
                        })
                        .collect();
                    diesel::insert_into(sessions::table)
                        .values(&session_rows)
                        .execute(conn)
                        .await?;
                }

                let sessions = sessions_for_chapter(conn, row.id).await?;
                Ok(assemble_chapter(row, sessions))
            }
            .scope_boxed()
        })
        .await
    }

    async fn update_chapter(
        &self,
        id: i32,
        patch: ChapterPatch,
    ) -> Result<Option<Chapter>, SyllabusStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Option<Chapter>, SyllabusStoreError, _>(|conn| {
            async move {
                let existing: Option<i32> = chapters::table
                    .filter(chapters::id.eq(id))
                    .select(chapters::id)
                    .first(conn)
                    .await
                    .optional()?;
                if existing.is_none() {
                    return Ok(None);
                }

                if let Some(course_id) = patch.course_id {
                    checks::ensure_course(conn, course_id).await?;
                }

                let changes = ChapterUpdateRow {
                    chapter_name: patch.chapter_name.as_deref(),
                    course_id: patch.course_id,
                };
                if changes.has_changes() {
                    diesel::update(chapters::table.find(id))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                }

                // Edits address existing sessions only; unknown ids are
                // ignored, matching partial-update semantics elsewhere.
                if let Some(edits) = &patch.sessions {
                    for edit in edits {
                        let changes = SessionUpdateRow {
                            session_name: edit.session_name.as_deref(),
                            session_link: edit.session_link.as_deref(),
                        };
                        if changes.has_changes() {
                            diesel::update(
                                sessions::table
                                    .filter(sessions::id.eq(edit.id))
                                    .filter(sessions::chapter_id.eq(id)),
                            )
                            .set(&changes)
                            .execute(conn)
                            .await?;
                        }
                    }
                }

                let row: ChapterRow = chapters::table
                    .find(id)
                    .select(ChapterRow::as_select())
                    .first(conn)
                    .await?;
                let sessions = sessions_for_chapter(conn, id).await?;
                Ok(Some(assemble_chapter(row, sessions)))
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete_chapter(&self, id: i32) -> Result<bool, SyllabusStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<bool, SyllabusStoreError, _>(|conn| {
            async move {
                diesel::delete(sessions::table.filter(sessions::chapter_id.eq(id)))
                    .execute(conn)
                    .await?;
                let removed = diesel::delete(chapters::table.find(id))
                    .execute(conn)
                    .await?;
                Ok(removed > 0)
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_chapter(&self, id: i32) -> Result<Option<Chapter>, SyllabusStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Option<Chapter>, SyllabusStoreError, _>(|conn| {
            async move {
                let row: Option<ChapterRow> = chapters::table
                    .find(id)
                    .select(ChapterRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;
                match row {
                    Some(row) => {
                        let sessions = sessions_for_chapter(conn, id).await?;
                        Ok(Some(assemble_chapter(row, sessions)))
                    }
                    None => Ok(None),
                }
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_chapters(&self) -> Result<Vec<Chapter>, SyllabusStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Vec<Chapter>, SyllabusStoreError, _>(|conn| {
            async move {
                let chapter_rows: Vec<ChapterRow> = chapters::table
                    .select(ChapterRow::as_select())
                    .order(chapters::id.asc())
                    .load(conn)
                    .await?;
                let session_rows: Vec<SessionRow> = sessions::table
                    .select(SessionRow::as_select())
                    .order(sessions::id.asc())
                    .load(conn)
                    .await?;

                let mut grouped: HashMap<i32, Vec<Session>> = HashMap::new();
                for row in session_rows {
                    grouped
                        .entry(row.chapter_id)
                        .or_default()
                        .push(row_to_session(row));
                }

                Ok(chapter_rows
                    .into_iter()
                    .map(|row| {
                        let sessions = grouped.remove(&row.id).unwrap_or_default();
                        assemble_chapter(row, sessions)
                    })
                    .collect())
            }
            .scope_boxed()
        })
        .await
    }
}
