//! Like bookkeeping for quotes.
//!
//! The store mutates `liker_ids` and `like_count` together in one statement;
//! these helpers derive the per-viewer `liked` flag and express the invariant
//! tying the two columns.

use crate::types::DbId;

/// Which way a like toggle goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Like,
    Unlike,
}

impl LikeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Unlike => "unlike",
        }
    }
}

/// The `liked` annotation for a quote as seen by `viewer`.
///
/// Returns `None` when there is no requesting user, so the field is omitted
/// from anonymous responses.
pub fn liked_by(liker_ids: &[DbId], viewer: Option<DbId>) -> Option<bool> {
    viewer.map(|user_id| liker_ids.contains(&user_id))
}

/// `like_count` must always equal the number of distinct likers.
pub fn like_count_consistent(liker_ids: &[DbId], like_count: i32) -> bool {
    let mut distinct = liker_ids.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    distinct.len() == liker_ids.len() && i32::try_from(distinct.len()) == Ok(like_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_viewer_gets_no_annotation() {
        assert_eq!(liked_by(&[1, 2], None), None);
    }

    #[test]
    fn member_viewer_is_liked() {
        assert_eq!(liked_by(&[4, 7], Some(7)), Some(true));
    }

    #[test]
    fn non_member_viewer_is_not_liked() {
        assert_eq!(liked_by(&[4, 7], Some(9)), Some(false));
        assert_eq!(liked_by(&[], Some(9)), Some(false));
    }

    #[test]
    fn count_matches_distinct_likers() {
        assert!(like_count_consistent(&[], 0));
        assert!(like_count_consistent(&[3, 1, 2], 3));
    }

    #[test]
    fn count_mismatch_is_detected() {
        assert!(!like_count_consistent(&[1, 2], 3));
        assert!(!like_count_consistent(&[1, 1], 2));
        assert!(!like_count_consistent(&[1], -1));
    }
}
