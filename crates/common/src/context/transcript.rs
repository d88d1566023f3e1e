//! Ask transcripts
//!
//! A transcript keeps a sliding window of recent turns. The store holds
//! one transcript per session in memory with an idle TTL.

use super::{route_with_topic, AskResult, AskTopic};
use crate::errors::{AppError, Result};
use crate::profile::PatientProfile;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use uuid::Uuid;

/// One question and the answer it got
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AskTurn {
    pub id: Uuid,
    pub question: String,
    pub topic: AskTopic,
    pub created_at: DateTime<Utc>,
    pub result: AskResult,
}

/// Recent turns, oldest first
#[derive(Debug, Clone)]
pub struct Transcript {
    window: usize,
    turns: VecDeque<AskTurn>,
}

impl Transcript {
    /// Transcript keeping at most `window` turns (at least one)
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            turns: VecDeque::with_capacity(window),
        }
    }

    /// Route a question and append the turn.
    ///
    /// Blank questions are ignored and return `None`.
    pub fn submit(&mut self, question: &str, profile: &PatientProfile) -> Option<&AskTurn> {
        let cleaned = question.trim();
        if cleaned.is_empty() {
            return None;
        }

        let (topic, result) = route_with_topic(cleaned, profile);
        self.turns.push_back(AskTurn {
            id: Uuid::new_v4(),
            question: cleaned.to_string(),
            topic,
            created_at: Utc::now(),
            result,
        });

        while self.turns.len() > self.window {
            self.turns.pop_front();
        }

        self.turns.back()
    }

    pub fn turns(&self) -> impl Iterator<Item = &AskTurn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&AskTurn> {
        self.turns.back()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

/// Session state returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub turns: Vec<AskTurn>,
}

struct Session {
    transcript: Transcript,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    fn touch(&mut self, now: DateTime<Utc>, ttl: Duration) {
        self.last_active_at = now;
        self.expires_at = now + ttl;
    }

    fn snapshot(&self, session_id: Uuid) -> SessionSnapshot {
        SessionSnapshot {
            session_id,
            created_at: self.created_at,
            last_active_at: self.last_active_at,
            expires_at: self.expires_at,
            turns: self.transcript.turns().cloned().collect(),
        }
    }
}

/// In-memory transcripts keyed by session id
pub struct TranscriptStore {
    window: usize,
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl TranscriptStore {
    pub fn new(window: usize, ttl: Duration) -> Self {
        Self {
            window,
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open an empty session
    pub async fn create(&self) -> SessionSnapshot {
        let now = Utc::now();
        let session_id = Uuid::new_v4();
        let session = Session {
            transcript: Transcript::new(self.window),
            created_at: now,
            last_active_at: now,
            expires_at: now + self.ttl,
        };
        let snapshot = session.snapshot(session_id);

        self.sessions.write().await.insert(session_id, session);
        tracing::info!(session_id = %session_id, "Session created");

        snapshot
    }

    /// Current state of a live session
    pub async fn get(&self, session_id: Uuid) -> Result<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        match sessions.get(&session_id) {
            Some(session) if !session.is_expired(Utc::now()) => Ok(session.snapshot(session_id)),
            _ => Err(AppError::SessionNotFound {
                id: session_id.to_string(),
            }),
        }
    }

    /// Route a question inside a session and record the turn
    pub async fn submit(
        &self,
        session_id: Uuid,
        question: &str,
        profile: &PatientProfile,
    ) -> Result<AskTurn> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let session = match sessions.get_mut(&session_id) {
            Some(session) if !session.is_expired(now) => session,
            _ => {
                return Err(AppError::SessionNotFound {
                    id: session_id.to_string(),
                })
            }
        };

        let turn = session
            .transcript
            .submit(question, profile)
            .cloned()
            .ok_or_else(|| AppError::Validation {
                message: "Question must not be blank".to_string(),
                field: Some("question".to_string()),
            })?;

        session.touch(now, self.ttl);

        tracing::debug!(
            session_id = %session_id,
            topic = turn.topic.as_str(),
            turns = session.transcript.len(),
            "Turn recorded"
        );

        Ok(turn)
    }

    /// Drop expired sessions, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        let removed = before - sessions.len();

        if removed > 0 {
            tracing::info!(removed, remaining = sessions.len(), "Expired sessions purged");
        }
        removed
    }

    /// Number of sessions that have not expired yet
    pub async fn live_len(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| !session.is_expired(now))
            .count()
    }

    /// Number of sessions held, expired or not
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AskSignal;
    use crate::profile::demo_patient;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_blank_submissions_are_ignored() {
        let mut transcript = Transcript::new(24);
        assert!(transcript.submit("   ", &demo_patient()).is_none());
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_submit_trims_and_routes() {
        let mut transcript = Transcript::new(24);
        let turn = transcript
            .submit("  Can I take clopidogrel?  ", &demo_patient())
            .unwrap();

        assert_eq!(turn.question, "Can I take clopidogrel?");
        assert_eq!(turn.topic, AskTopic::Clopidogrel);
        assert_eq!(turn.result.signal, Some(AskSignal::Cyp2c19));
    }

    #[test]
    fn test_window_evicts_oldest() {
        let patient = demo_patient();
        let mut transcript = Transcript::new(3);

        for i in 0..5 {
            transcript.submit(&format!("question {}", i), &patient);
        }

        let questions: Vec<_> = transcript.turns().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["question 2", "question 3", "question 4"]);
        assert_eq!(transcript.last().unwrap().question, "question 4");
    }

    #[test]
    fn test_zero_window_keeps_one() {
        let mut transcript = Transcript::new(0);
        transcript.submit("a", &demo_patient());
        transcript.submit("b", &demo_patient());
        assert_eq!(transcript.window(), 1);
        assert_eq!(transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let store = TranscriptStore::new(24, Duration::minutes(30));
        let created = store.create().await;
        assert!(created.turns.is_empty());

        let turn = store
            .submit(created.session_id, "What should I do next?", &demo_patient())
            .await
            .unwrap();
        assert_eq!(turn.topic, AskTopic::NextSteps);

        let snapshot = assert_ok!(store.get(created.session_id).await);
        assert_eq!(snapshot.turns.len(), 1);
        assert_eq!(snapshot.turns[0].id, turn.id);
        assert!(snapshot.expires_at >= created.expires_at);
    }

    #[tokio::test]
    async fn test_live_len_counts_open_sessions() {
        let store = TranscriptStore::new(24, Duration::minutes(30));
        store.create().await;
        store.create().await;
        assert_eq!(store.live_len().await, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_store_rejects_blank_question() {
        let store = TranscriptStore::new(24, Duration::minutes(30));
        let created = store.create().await;

        let err = store
            .submit(created.session_id, "  ", &demo_patient())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(store.get(created.session_id).await.unwrap().turns.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = TranscriptStore::new(24, Duration::minutes(30));
        let err = assert_err!(store.get(Uuid::new_v4()).await);
        assert!(matches!(err, AppError::SessionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_expired_sessions_read_as_missing_and_purge() {
        let store = TranscriptStore::new(24, Duration::minutes(-1));
        let created = store.create().await;

        assert_err!(store.get(created.session_id).await);
        assert_err!(
            store
                .submit(created.session_id, "hello", &demo_patient())
                .await
        );

        assert_eq!(store.len().await, 1);
        assert_eq!(store.live_len().await, 0);
        assert_eq!(store.purge_expired().await, 1);
        assert!(store.is_empty().await);
    }
}
