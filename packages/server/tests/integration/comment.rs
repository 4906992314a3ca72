use futures::future::join_all;
use serde_json::json;

use crate::common::{TestApp, TestUser, routes};

/// An author with one published post, and a reader to comment on it.
async fn setup(app: &TestApp) -> (TestUser, TestUser, i32) {
    let author = app.create_user_with_role("writer", "AUTHOR").await;
    let reader = app.create_user_with_role("reader", "READER").await;
    let post_id = app.create_post(&author.token, "Open For Talk", "PUBLISHED").await;
    (author, reader, post_id)
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn new_comments_start_unapproved() {
        let app = TestApp::spawn().await;
        let (_, reader, post_id) = setup(&app).await;

        let res = app
            .post_with_token(
                routes::COMMENTS,
                &json!({"post_id": post_id, "content": "  First!  "}),
                &reader.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["is_approved"], false);
        assert_eq!(res.body["content"], "First!");
        assert_eq!(res.body["author"]["id"], reader.id);
        assert!(res.body["parent_id"].is_null());
    }

    #[tokio::test]
    async fn one_character_comment_is_rejected() {
        let app = TestApp::spawn().await;
        let (_, reader, post_id) = setup(&app).await;

        let res = app
            .post_with_token(
                routes::COMMENTS,
                &json!({"post_id": post_id, "content": " x "}),
                &reader.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_comment_on_a_draft_of_someone_else() {
        let app = TestApp::spawn().await;
        let (author, reader, _) = setup(&app).await;
        let draft = app.create_post(&author.token, "Not Yet Out", "DRAFT").await;

        let res = app
            .post_with_token(
                routes::COMMENTS,
                &json!({"post_id": draft, "content": "Sneaky comment"}),
                &reader.token,
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn reply_must_stay_on_the_parents_post() {
        let app = TestApp::spawn().await;
        let (author, reader, post_id) = setup(&app).await;
        let other_post = app.create_post(&author.token, "Second Thread", "PUBLISHED").await;
        let parent = app.create_comment(&reader.token, post_id, "Parent comment", None).await;

        let res = app
            .post_with_token(
                routes::COMMENTS,
                &json!({"post_id": other_post, "content": "Wrong place", "parent_id": parent}),
                &reader.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn anonymous_visitors_cannot_comment() {
        let app = TestApp::spawn().await;
        let (_, _, post_id) = setup(&app).await;

        let res = app
            .post_without_token(
                routes::COMMENTS,
                &json!({"post_id": post_id, "content": "Drive-by"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "TOKEN_MISSING");
    }
}

mod moderation {
    use super::*;

    #[tokio::test]
    async fn pending_comment_is_hidden_from_the_public_until_approved() {
        let app = TestApp::spawn().await;
        let (author, reader, post_id) = setup(&app).await;
        let id = app.create_comment(&reader.token, post_id, "Waiting here", None).await;

        let hidden = app.get_without_token(&routes::comment(id)).await;
        assert_eq!(hidden.status, 404);

        let own = app.get_with_token(&routes::comment(id), &reader.token).await;
        assert_eq!(own.status, 200);

        let res = app
            .post_with_token(&routes::comment_approve(id), &json!({}), &author.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Comment approved");

        let visible = app.get_without_token(&routes::comment(id)).await;
        assert_eq!(visible.status, 200);
        assert_eq!(visible.body["is_approved"], true);
    }

    #[tokio::test]
    async fn approving_twice_is_harmless() {
        let app = TestApp::spawn().await;
        let (author, reader, post_id) = setup(&app).await;
        let id = app.create_comment(&reader.token, post_id, "Waiting here", None).await;

        app.approve_comment(&author.token, id).await;
        app.approve_comment(&author.token, id).await;
    }

    #[tokio::test]
    async fn commenter_cannot_approve_their_own_comment() {
        let app = TestApp::spawn().await;
        let (_, reader, post_id) = setup(&app).await;
        let id = app.create_comment(&reader.token, post_id, "Let me in", None).await;

        let res = app
            .post_with_token(&routes::comment_approve(id), &json!({}), &reader.token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn rejecting_deletes_the_comment_and_its_replies() {
        let app = TestApp::spawn().await;
        let (author, reader, post_id) = setup(&app).await;
        let root = app.create_comment(&reader.token, post_id, "Root comment", None).await;
        let reply = app
            .create_comment(&author.token, post_id, "A reply", Some(root))
            .await;
        let nested = app
            .create_comment(&reader.token, post_id, "Nested reply", Some(reply))
            .await;

        let res = app
            .post_with_token(&routes::comment_reject(root), &json!({}), &author.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Comment rejected and deleted");

        for id in [root, reply, nested] {
            let res = app.get_with_token(&routes::comment(id), &author.token).await;
            assert_eq!(res.status, 404, "comment {id} should be gone");
        }
    }

    #[tokio::test]
    async fn replies_racing_a_reject_never_outlive_their_parent() {
        let app = TestApp::spawn().await;
        let (author, reader, post_id) = setup(&app).await;
        let root = app.create_comment(&reader.token, post_id, "Root comment", None).await;

        let replies = join_all((0..6).map(|i| {
            let (app, token) = (&app, &reader.token);
            let body = json!({"post_id": post_id, "content": format!("Reply {i}"), "parent_id": root});
            async move { app.post_with_token(routes::COMMENTS, &body, token).await }
        }));
        let reject = async {
            app.post_with_token(&routes::comment_reject(root), &json!({}), &author.token)
                .await
        };
        let (replies, reject) = tokio::join!(replies, reject);

        assert_eq!(reject.status, 200, "{}", reject.text);
        for res in &replies {
            assert!(
                res.status == 201 || res.status == 404,
                "unexpected reply status {}: {}",
                res.status,
                res.text
            );
        }

        let remaining = app
            .get_with_token(&format!("{}?post={post_id}", routes::COMMENTS), &reader.token)
            .await;
        assert_eq!(remaining.status, 200);
        assert_eq!(remaining.body["pagination"]["total"], 0, "{}", remaining.text);
    }

    #[tokio::test]
    async fn admin_can_moderate_any_comment() {
        let app = TestApp::spawn().await;
        let (_, reader, post_id) = setup(&app).await;
        let admin = app.create_user_with_role("boss", "ADMIN").await;
        let id = app.create_comment(&reader.token, post_id, "Hello admin", None).await;

        app.approve_comment(&admin.token, id).await;
    }
}

mod feed {
    use super::*;

    #[tokio::test]
    async fn post_detail_nests_approved_replies_only() {
        let app = TestApp::spawn().await;
        let (author, reader, post_id) = setup(&app).await;
        let root = app.create_comment(&reader.token, post_id, "Root comment", None).await;
        let approved_reply = app
            .create_comment(&author.token, post_id, "Approved reply", Some(root))
            .await;
        let pending_reply = app
            .create_comment(&reader.token, post_id, "Pending reply", Some(root))
            .await;
        let under_pending = app
            .create_comment(&author.token, post_id, "Under pending", Some(pending_reply))
            .await;
        app.create_comment(&reader.token, post_id, "Pending root", None)
            .await;
        for id in [root, approved_reply, under_pending] {
            app.approve_comment(&author.token, id).await;
        }

        let res = app.get_without_token(&routes::post(post_id)).await;
        assert_eq!(res.status, 200);

        let threads = res.body["comments"].as_array().unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0]["id"], root);
        let replies = threads[0]["replies"].as_array().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], approved_reply);
        assert!(replies[0]["replies"].as_array().unwrap().is_empty());
        assert_eq!(res.body["comment_count"], 3);
    }

    #[tokio::test]
    async fn listing_filters_by_post_and_hides_pending_from_anonymous() {
        let app = TestApp::spawn().await;
        let (author, reader, post_id) = setup(&app).await;
        let other_post = app.create_post(&author.token, "Quiet Thread", "PUBLISHED").await;
        let approved = app.create_comment(&reader.token, post_id, "Approved one", None).await;
        app.create_comment(&reader.token, post_id, "Pending one", None)
            .await;
        let elsewhere = app
            .create_comment(&reader.token, other_post, "Elsewhere", None)
            .await;
        app.approve_comment(&author.token, approved).await;
        app.approve_comment(&author.token, elsewhere).await;

        let anon = app
            .get_without_token(&format!("{}?post={post_id}", routes::COMMENTS))
            .await;
        assert_eq!(anon.status, 200);
        assert_eq!(anon.body["pagination"]["total"], 1);
        assert_eq!(anon.body["data"][0]["id"], approved);

        let own = app
            .get_with_token(&format!("{}?post={post_id}", routes::COMMENTS), &reader.token)
            .await;
        assert_eq!(own.body["pagination"]["total"], 2);
    }
}

mod editing {
    use super::*;

    #[tokio::test]
    async fn author_of_a_comment_can_edit_it() {
        let app = TestApp::spawn().await;
        let (_, reader, post_id) = setup(&app).await;
        let id = app.create_comment(&reader.token, post_id, "Tpyo here", None).await;

        let res = app
            .patch_with_token(&routes::comment(id), &json!({"content": "Typo here"}), &reader.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["content"], "Typo here");
    }

    #[tokio::test]
    async fn someone_else_cannot_edit_an_approved_comment() {
        let app = TestApp::spawn().await;
        let (author, reader, post_id) = setup(&app).await;
        let other = app.create_user_with_role("other", "READER").await;
        let id = app.create_comment(&reader.token, post_id, "My words", None).await;
        app.approve_comment(&author.token, id).await;

        let res = app
            .patch_with_token(&routes::comment(id), &json!({"content": "Your words"}), &other.token)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn deleting_a_comment_removes_its_replies() {
        let app = TestApp::spawn().await;
        let (author, reader, post_id) = setup(&app).await;
        let root = app.create_comment(&reader.token, post_id, "Root comment", None).await;
        let reply = app
            .create_comment(&author.token, post_id, "A reply", Some(root))
            .await;

        let res = app.delete_with_token(&routes::comment(root), &reader.token).await;
        assert_eq!(res.status, 204);

        let res = app.get_with_token(&routes::comment(reply), &author.token).await;
        assert_eq!(res.status, 404);
    }
}
