use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distinguished {
    Moderator,
    Admin,
    Other(String),
}

impl Distinguished {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "moderator" => Distinguished::Moderator,
            "admin" => Distinguished::Admin,
            other => Distinguished::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentFlags {
    pub is_op: bool,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: i64,
    /// `None` when never edited
    pub edited_utc: Option<i64>,
    pub flags: CommentFlags,
    pub distinguished: Option<Distinguished>,
    /// 0 for top-level comments
    pub depth: usize,
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_utc, 0).single()
    }

    pub fn is_edited(&self) -> bool {
        self.edited_utc.is_some()
    }

    /// Number of comments in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.replies.iter().map(Comment::count).sum::<usize>()
    }
}

/// Total comments across a forest of root comments.
pub fn count_all(roots: &[Comment]) -> usize {
    roots.iter().map(Comment::count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, depth: usize, replies: Vec<Comment>) -> Comment {
        Comment {
            id: id.into(),
            author: "kopite".into(),
            body: "YNWA".into(),
            score: 1,
            created_utc: 0,
            edited_utc: None,
            flags: CommentFlags::default(),
            distinguished: None,
            depth,
            replies,
        }
    }

    #[test]
    fn test_count_subtree() {
        let tree = comment(
            "a",
            0,
            vec![comment("b", 1, vec![comment("c", 2, vec![])]), comment("d", 1, vec![])],
        );
        assert_eq!(tree.count(), 4);
        assert_eq!(count_all(&[tree, comment("e", 0, vec![])]), 5);
    }

    #[test]
    fn test_distinguished_parse() {
        assert_eq!(Distinguished::parse("moderator"), Distinguished::Moderator);
        assert_eq!(Distinguished::parse("admin"), Distinguished::Admin);
        assert_eq!(
            Distinguished::parse("special"),
            Distinguished::Other("special".into())
        );
    }
}
