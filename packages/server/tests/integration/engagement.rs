use futures::future::join_all;
use serde_json::json;

use crate::common::{TestApp, routes};

mod likes {
    use super::*;

    #[tokio::test]
    async fn liking_twice_keeps_a_single_like() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Likeable Post", "PUBLISHED").await;

        let first = app
            .post_with_token(&routes::post_like(id), &json!({}), &reader.token)
            .await;
        assert_eq!(first.status, 201, "{}", first.text);
        assert_eq!(first.body["outcome"], "created");
        assert_eq!(first.body["like_count"], 1);

        let second = app
            .post_with_token(&routes::post_like(id), &json!({}), &reader.token)
            .await;
        assert_eq!(second.status, 200);
        assert_eq!(second.body["outcome"], "already_liked");
        assert_eq!(second.body["like_count"], 1);
    }

    #[tokio::test]
    async fn concurrent_likes_by_one_user_create_a_single_row() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Likeable Post", "PUBLISHED").await;

        let responses = join_all((0..8).map(|_| {
            let (app, token) = (&app, &reader.token);
            async move {
                app.post_with_token(&routes::post_like(id), &json!({}), token)
                    .await
            }
        }))
        .await;

        let created = responses.iter().filter(|r| r.status == 201).count();
        let existing = responses.iter().filter(|r| r.status == 200).count();
        assert_eq!(created, 1);
        assert_eq!(existing, 7);

        let detail = app.get_with_token(&routes::post(id), &reader.token).await;
        assert_eq!(detail.body["like_count"], 1);
    }

    #[tokio::test]
    async fn unliking_without_a_like_is_a_bad_request() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Likeable Post", "PUBLISHED").await;

        let res = app
            .post_with_token(&routes::post_unlike(id), &json!({}), &reader.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["outcome"], "not_liked");
        assert_eq!(res.body["like_count"], 0);
    }

    #[tokio::test]
    async fn unliking_removes_the_like() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Likeable Post", "PUBLISHED").await;
        app.post_with_token(&routes::post_like(id), &json!({}), &reader.token)
            .await;

        let res = app
            .post_with_token(&routes::post_unlike(id), &json!({}), &reader.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["outcome"], "removed");
        assert_eq!(res.body["like_count"], 0);

        let detail = app.get_with_token(&routes::post(id), &reader.token).await;
        assert_eq!(detail.body["is_liked"], false);
    }

    #[tokio::test]
    async fn detail_reports_whether_the_viewer_liked_it() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Likeable Post", "PUBLISHED").await;
        app.post_with_token(&routes::post_like(id), &json!({}), &reader.token)
            .await;

        let mine = app.get_with_token(&routes::post(id), &reader.token).await;
        assert_eq!(mine.body["is_liked"], true);
        assert_eq!(mine.body["like_count"], 1);

        let theirs = app.get_with_token(&routes::post(id), &author.token).await;
        assert_eq!(theirs.body["is_liked"], false);
    }

    #[tokio::test]
    async fn drafts_cannot_be_liked_by_others() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Unfinished", "DRAFT").await;

        let res = app
            .post_with_token(&routes::post_like(id), &json!({}), &reader.token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn anonymous_visitors_cannot_like() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let id = app.create_post(&author.token, "Likeable Post", "PUBLISHED").await;

        let res = app.post_without_token(&routes::post_like(id), &json!({})).await;

        assert_eq!(res.status, 401);
    }
}

mod views_and_shares {
    use super::*;

    #[tokio::test]
    async fn every_read_counts_one_view() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let id = app.create_post(&author.token, "Popular Post", "PUBLISHED").await;

        let mut last = 0;
        for _ in 0..3 {
            let res = app.get_without_token(&routes::post(id)).await;
            assert_eq!(res.status, 200);
            last = res.body["view_count"].as_i64().unwrap();
        }

        assert_eq!(last, 3);
    }

    #[tokio::test]
    async fn hidden_post_reads_do_not_count() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let id = app.create_post(&author.token, "Unfinished", "DRAFT").await;

        let res = app.get_without_token(&routes::post(id)).await;
        assert_eq!(res.status, 404);

        let own = app.get_with_token(&routes::post(id), &author.token).await;
        assert_eq!(own.body["view_count"], 1);
    }

    #[tokio::test]
    async fn sharing_bumps_the_counter_each_time() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Shareable Post", "PUBLISHED").await;

        let first = app
            .post_with_token(&routes::post_share(id), &json!({"platform": "mastodon"}), &reader.token)
            .await;
        assert_eq!(first.status, 201, "{}", first.text);
        assert_eq!(first.body["share_count"], 1);

        let second = app
            .post_with_token(&routes::post_share(id), &json!({}), &reader.token)
            .await;
        assert_eq!(second.status, 201, "{}", second.text);
        assert_eq!(second.body["share_count"], 2);
    }

    #[tokio::test]
    async fn concurrent_shares_are_all_counted() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Shareable Post", "PUBLISHED").await;

        let responses = join_all((0..6).map(|_| {
            let (app, token) = (&app, &reader.token);
            async move {
                app.post_with_token(&routes::post_share(id), &json!({}), token)
                    .await
            }
        }))
        .await;

        let mut counts: Vec<i64> = responses
            .iter()
            .map(|r| {
                assert_eq!(r.status, 201, "{}", r.text);
                r.body["share_count"].as_i64().unwrap()
            })
            .collect();
        counts.sort_unstable();
        assert_eq!(counts, (1..=6).collect::<Vec<i64>>());

        let analytics = app.get_with_token(&routes::post_analytics(id), &author.token).await;
        assert_eq!(analytics.body["share_count"], 6);
    }

    #[tokio::test]
    async fn overlong_platform_is_rejected() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let id = app.create_post(&author.token, "Shareable Post", "PUBLISHED").await;

        let res = app
            .post_with_token(
                &routes::post_share(id),
                &json!({"platform": "x".repeat(51)}),
                &author.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

mod analytics {
    use super::*;

    #[tokio::test]
    async fn engagement_rate_combines_likes_comments_and_shares() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Measured Post", "PUBLISHED").await;

        for _ in 0..3 {
            app.get_without_token(&routes::post(id)).await;
        }
        app.post_with_token(&routes::post_like(id), &json!({}), &reader.token)
            .await;
        let comment = app.create_comment(&reader.token, id, "Great read", None).await;
        app.approve_comment(&author.token, comment).await;
        app.create_comment(&reader.token, id, "Still pending", None)
            .await;

        let res = app.get_with_token(&routes::post_analytics(id), &author.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["post_id"], id);
        assert_eq!(res.body["view_count"], 3);
        assert_eq!(res.body["like_count"], 1);
        assert_eq!(res.body["comment_count"], 1);
        assert_eq!(res.body["share_count"], 0);
        assert_eq!(res.body["engagement_rate"], 66.67);
    }

    #[tokio::test]
    async fn unviewed_post_has_zero_rate() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let id = app.create_post(&author.token, "Nobody Came", "PUBLISHED").await;

        let res = app.get_with_token(&routes::post_analytics(id), &author.token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["engagement_rate"], 0.0);
    }

    #[tokio::test]
    async fn only_the_author_or_an_admin_sees_analytics() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let admin = app.create_user_with_role("boss", "ADMIN").await;
        let id = app.create_post(&author.token, "Private Numbers", "PUBLISHED").await;

        let anon = app.get_without_token(&routes::post_analytics(id)).await;
        assert_eq!(anon.status, 401);

        let as_reader = app.get_with_token(&routes::post_analytics(id), &reader.token).await;
        assert_eq!(as_reader.status, 403);
        assert_eq!(as_reader.code(), "PERMISSION_DENIED");

        let as_admin = app.get_with_token(&routes::post_analytics(id), &admin.token).await;
        assert_eq!(as_admin.status, 200);
    }

    #[tokio::test]
    async fn analytics_of_a_hidden_draft_is_not_found() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Unfinished", "DRAFT").await;

        let res = app.get_with_token(&routes::post_analytics(id), &reader.token).await;

        assert_eq!(res.status, 404);
    }
}
