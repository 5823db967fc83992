//! Course syllabus: chapters and their sessions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by syllabus command constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyllabusValidationError {
    EmptyChapterName,
    EmptySessionName,
    EmptySessionLink,
}

impl fmt::Display for SyllabusValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyChapterName => write!(f, "chapter name must not be empty"),
            Self::EmptySessionName => write!(f, "session name must not be empty"),
            Self::EmptySessionLink => write!(f, "session link must not be empty"),
        }
    }
}

impl std::error::Error for SyllabusValidationError {}

/// A single teaching session inside a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i32,
    pub session_name: String,
    pub session_link: String,
    pub chapter_id: i32,
}

/// A chapter of a course, with its sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: i32,
    pub chapter_name: String,
    pub course_id: i32,
    pub sessions: Vec<Session>,
}

/// Command to add a session to a chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    session_name: String,
    session_link: String,
}

impl NewSession {
    /// Validate and construct a session-creation command.
    pub fn new(
        session_name: impl Into<String>,
        session_link: impl Into<String>,
    ) -> Result<Self, SyllabusValidationError> {
        let session_name = session_name.into();
        if session_name.trim().is_empty() {
            return Err(SyllabusValidationError::EmptySessionName);
        }
        let session_link = session_link.into();
        if session_link.trim().is_empty() {
            return Err(SyllabusValidationError::EmptySessionLink);
        }
        Ok(Self {
            session_name,
            session_link,
        })
    }

    /// Session title.
    pub fn session_name(&self) -> &str {
        self.session_name.as_str()
    }

    /// Opaque link to the session material.
    pub fn session_link(&self) -> &str {
        self.session_link.as_str()
    }
}

/// Command to create a chapter, optionally with initial sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChapter {
    chapter_name: String,
    course_id: i32,
    sessions: Vec<NewSession>,
}

impl NewChapter {
    /// Validate and construct a chapter-creation command.
    pub fn new(
        chapter_name: impl Into<String>,
        course_id: i32,
        sessions: Vec<NewSession>,
    ) -> Result<Self, SyllabusValidationError> {
        let chapter_name = chapter_name.into();
        if chapter_name.trim().is_empty() {
            return Err(SyllabusValidationError::EmptyChapterName);
        }
        Ok(Self {
            chapter_name,
            course_id,
            sessions,
        })
    }

    /// Chapter title.
    pub fn chapter_name(&self) -> &str {
        self.chapter_name.as_str()
    }

    /// Course the chapter belongs to.
    pub fn course_id(&self) -> i32 {
        self.course_id
    }

    /// Sessions to create alongside the chapter.
    pub fn sessions(&self) -> &[NewSession] {
        &self.sessions
    }
}

/// Edit to an existing session, addressed by id within the chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEdit {
    pub id: i32,
    pub session_name: Option<String>,
    pub session_link: Option<String>,
}

/// Partial update for a chapter and its sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterPatch {
    pub chapter_name: Option<String>,
    pub course_id: Option<i32>,
    pub sessions: Option<Vec<SessionEdit>>,
}

impl ChapterPatch {
    /// Check field-level constraints that do not need store access.
    pub fn validate(&self) -> Result<(), SyllabusValidationError> {
        if matches!(self.chapter_name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(SyllabusValidationError::EmptyChapterName);
        }
        if let Some(edits) = &self.sessions {
            for edit in edits {
                if matches!(edit.session_name.as_deref(), Some(name) if name.trim().is_empty()) {
                    return Err(SyllabusValidationError::EmptySessionName);
                }
                if matches!(edit.session_link.as_deref(), Some(link) if link.trim().is_empty()) {
                    return Err(SyllabusValidationError::EmptySessionLink);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn chapter_requires_a_name() {
        let err = NewChapter::new("", 1, Vec::new()).expect_err("blank name");
        assert_eq!(err, SyllabusValidationError::EmptyChapterName);
    }

    #[rstest]
    fn session_requires_name_and_link() {
        assert_eq!(
            NewSession::new("", "https://example.com").expect_err("blank name"),
            SyllabusValidationError::EmptySessionName
        );
        assert_eq!(
            NewSession::new("Intro", " ").expect_err("blank link"),
            SyllabusValidationError::EmptySessionLink
        );
    }

    #[rstest]
    fn patch_rejects_blank_session_edits() {
        let patch = ChapterPatch {
            sessions: Some(vec![SessionEdit {
                id: 4,
                session_name: Some(String::new()),
                session_link: None,
            }]),
            ..ChapterPatch::default()
        };
        assert_eq!(
            patch.validate(),
            Err(SyllabusValidationError::EmptySessionName)
        );
    }
}
