#[cfg(test)]
mod tests {
    use crate::models::{CommentRequest, CreatePostRequest, SignupRequest, UpdatePostRequest};
    use crate::validation::{
        validate_comment, validate_create_post, validate_signup, validate_update_post,
        ValidationError,
    };
    use crate::vote_logic::{VoteError, VoteOp, VoteSets, VoteState};

    fn sets() -> VoteSets<&'static str> {
        VoteSets::new()
    }

    fn post_request(title: &str, tags: &[&str]) -> CreatePostRequest {
        CreatePostRequest {
            title: title.into(),
            content: "some content".into(),
            author: "ada".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_like_from_neutral() {
        let mut s = sets();
        let tally = s.apply(VoteOp::Like, &"A").unwrap();
        assert_eq!(tally.like_count, 1);
        assert_eq!(tally.dislike_count, 0);
        assert_eq!(s.state_of(&"A"), VoteState::Liked);
    }

    #[test]
    fn test_double_like_rejected_without_mutation() {
        let mut s = sets();
        s.apply(VoteOp::Like, &"A").unwrap();
        let before = s.clone();
        assert!(matches!(s.apply(VoteOp::Like, &"A"), Err(VoteError::AlreadyLiked)));
        assert_eq!(s, before);
    }

    #[test]
    fn test_like_then_dislike_moves_voter() {
        let mut s = sets();
        s.apply(VoteOp::Like, &"A").unwrap();
        let tally = s.apply(VoteOp::Dislike, &"A").unwrap();
        assert_eq!(tally.like_count, 0);
        assert_eq!(tally.dislike_count, 1);
        assert_eq!(s.state_of(&"A"), VoteState::Disliked);
    }

    #[test]
    fn test_dislike_then_like_moves_voter() {
        let mut s = sets();
        s.apply(VoteOp::Dislike, &"A").unwrap();
        let tally = s.apply(VoteOp::Like, &"A").unwrap();
        assert_eq!(tally.like_count, 1);
        assert_eq!(tally.dislike_count, 0);
    }

    #[test]
    fn test_double_dislike_rejected() {
        let mut s = sets();
        s.apply(VoteOp::Dislike, &"A").unwrap();
        assert!(matches!(s.apply(VoteOp::Dislike, &"A"), Err(VoteError::AlreadyDisliked)));
    }

    #[test]
    fn test_unlike_requires_liked_state() {
        let mut s = sets();
        assert!(matches!(s.apply(VoteOp::Unlike, &"A"), Err(VoteError::NotLiked)));
        s.apply(VoteOp::Dislike, &"A").unwrap();
        assert!(matches!(s.apply(VoteOp::Unlike, &"A"), Err(VoteError::NotLiked)));
    }

    #[test]
    fn test_unlike_returns_to_neutral() {
        let mut s = sets();
        s.apply(VoteOp::Like, &"A").unwrap();
        let tally = s.apply(VoteOp::Unlike, &"A").unwrap();
        assert_eq!(tally.like_count, 0);
        assert_eq!(s.state_of(&"A"), VoteState::Neutral);
    }

    #[test]
    fn test_revert_dislike_requires_disliked_state() {
        let mut s = sets();
        assert!(matches!(s.apply(VoteOp::RevertDislike, &"A"), Err(VoteError::NotDisliked)));
        s.apply(VoteOp::Like, &"A").unwrap();
        assert!(matches!(s.apply(VoteOp::RevertDislike, &"A"), Err(VoteError::NotDisliked)));
    }

    #[test]
    fn test_dislike_then_revert_restores_counts() {
        let mut s = sets();
        s.apply(VoteOp::Like, &"B").unwrap();
        let before = s.tally();
        s.apply(VoteOp::Dislike, &"A").unwrap();
        let tally = s.apply(VoteOp::RevertDislike, &"A").unwrap();
        assert_eq!(tally, before);
        assert_eq!(s.state_of(&"A"), VoteState::Neutral);
    }

    #[test]
    fn test_two_voters_like_counts_twice() {
        let mut s = sets();
        s.apply(VoteOp::Like, &"A").unwrap();
        let tally = s.apply(VoteOp::Like, &"B").unwrap();
        assert_eq!(tally.like_count, 2);
        assert_eq!(s.liked_by().len(), 2);
        assert!(s.liked_by().contains(&"A") && s.liked_by().contains(&"B"));
    }

    #[test]
    fn test_mutual_exclusion_holds_across_transitions() {
        let mut s = sets();
        let voters = ["A", "B", "C"];
        let ops = [
            VoteOp::Like,
            VoteOp::Dislike,
            VoteOp::Like,
            VoteOp::Unlike,
            VoteOp::Dislike,
            VoteOp::RevertDislike,
        ];
        for voter in &voters {
            for op in ops {
                let _ = s.apply(op, voter);
                assert!(
                    s.liked_by().intersection(s.disliked_by()).next().is_none(),
                    "voter present in both sets"
                );
            }
        }
    }

    #[test]
    fn test_cross_voter_scenario() {
        // A likes, B dislikes, then A flips to dislike.
        let mut s = sets();
        s.apply(VoteOp::Like, &"A").unwrap();
        assert!(s.liked_by().contains(&"A"));

        s.apply(VoteOp::Dislike, &"B").unwrap();
        assert!(s.liked_by().contains(&"A") && s.disliked_by().contains(&"B"));

        let tally = s.apply(VoteOp::Dislike, &"A").unwrap();
        assert!(s.liked_by().is_empty());
        assert!(s.disliked_by().contains(&"A") && s.disliked_by().contains(&"B"));
        assert_eq!(tally.like_count, 0);
        assert_eq!(tally.dislike_count, 2);
    }

    #[test]
    fn test_tally_is_derived_from_sets() {
        let mut s = sets();
        s.apply(VoteOp::Like, &"A").unwrap();
        s.apply(VoteOp::Dislike, &"B").unwrap();
        let tally = s.tally();
        assert_eq!(tally.like_count, s.liked_by().len());
        assert_eq!(tally.dislike_count, s.disliked_by().len());
    }

    #[test]
    fn test_signup_validation() {
        let mut request = SignupRequest {
            name: "ada".into(),
            email: "ada@example.com".into(),
            password: "longenough".into(),
            bio: None,
        };
        assert!(validate_signup(&request).is_ok());

        request.password = "short".into();
        assert!(matches!(validate_signup(&request), Err(ValidationError::PasswordTooShort)));

        request.password = "longenough".into();
        request.email = "not-an-email".into();
        assert!(matches!(validate_signup(&request), Err(ValidationError::InvalidEmail)));

        request.email = String::new();
        assert!(matches!(validate_signup(&request), Err(ValidationError::MissingCredentials)));
    }

    #[test]
    fn test_bio_length_limit() {
        let request = SignupRequest {
            name: "ada".into(),
            email: "ada@example.com".into(),
            password: "longenough".into(),
            bio: Some("b".repeat(101)),
        };
        assert!(matches!(validate_signup(&request), Err(ValidationError::BioTooLong)));
    }

    #[test]
    fn test_post_title_bounds() {
        assert!(matches!(
            validate_create_post(&post_request("too short", &[])),
            Err(ValidationError::TitleLength)
        ));
        assert!(matches!(
            validate_create_post(&post_request(&"x".repeat(51), &[])),
            Err(ValidationError::TitleLength)
        ));
        assert!(validate_create_post(&post_request("a title of legal length", &[])).is_ok());
    }

    #[test]
    fn test_post_tag_limits() {
        assert!(matches!(
            validate_create_post(&post_request("a title of legal length", &["a", "b", "c", "d"])),
            Err(ValidationError::TooManyTags)
        ));
        assert!(matches!(
            validate_create_post(&post_request("a title of legal length", &["waytoolongtag"])),
            Err(ValidationError::TagTooLong)
        ));
        assert!(
            validate_create_post(&post_request("a title of legal length", &["rust", "blog"]))
                .is_ok()
        );
    }

    #[test]
    fn test_update_post_partial_fields() {
        assert!(validate_update_post(&UpdatePostRequest::default()).is_ok());
        let request = UpdatePostRequest {
            title: Some("nope".into()),
            ..Default::default()
        };
        assert!(matches!(validate_update_post(&request), Err(ValidationError::TitleLength)));
    }

    #[test]
    fn test_comment_body_must_have_content() {
        let blank = CommentRequest { comment: "   \n\t".into() };
        assert!(matches!(validate_comment(&blank), Err(ValidationError::EmptyComment)));
        let ok = CommentRequest { comment: "well said".into() };
        assert!(validate_comment(&ok).is_ok());
    }
}
