use serde_json::json;

use crate::common::{BODY, TestApp, routes};

mod creation {
    use super::*;

    #[tokio::test]
    async fn author_creates_a_draft_with_a_slug_from_the_title() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;

        let res = app
            .post_with_token(
                routes::POSTS,
                &json!({"title": "Hello World", "content": BODY}),
                &author.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["slug"], "hello-world");
        assert_eq!(res.body["status"], "DRAFT");
        assert!(res.body["published_at"].is_null());
        assert_eq!(res.body["author"]["id"], author.id);
        assert_eq!(res.body["view_count"], 0);
    }

    #[tokio::test]
    async fn duplicate_titles_get_numbered_slugs() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;

        let mut slugs = Vec::new();
        for _ in 0..3 {
            let id = app.create_post(&author.token, "Hello World", "DRAFT").await;
            let res = app.get_with_token(&routes::post(id), &author.token).await;
            slugs.push(res.body["slug"].as_str().unwrap().to_string());
        }

        assert_eq!(slugs, vec!["hello-world", "hello-world-1", "hello-world-2"]);
    }

    #[tokio::test]
    async fn concurrent_same_title_creates_get_distinct_slugs() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let body = json!({"title": "Race Day", "content": BODY});

        let (first, second) = tokio::join!(
            app.post_with_token(routes::POSTS, &body, &author.token),
            app.post_with_token(routes::POSTS, &body, &author.token),
        );

        assert_eq!(first.status, 201, "{}", first.text);
        assert_eq!(second.status, 201, "{}", second.text);
        let mut slugs = vec![
            first.body["slug"].as_str().unwrap().to_string(),
            second.body["slug"].as_str().unwrap().to_string(),
        ];
        slugs.sort();
        assert_eq!(slugs, vec!["race-day", "race-day-1"]);
    }

    #[tokio::test]
    async fn title_without_slug_characters_falls_back_to_post() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;

        let id = app.create_post(&author.token, "!!!!!???", "DRAFT").await;
        let res = app.get_with_token(&routes::post(id), &author.token).await;

        assert_eq!(res.body["slug"], "post");
    }

    #[tokio::test]
    async fn creating_as_published_stamps_date_and_excerpt() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;

        let res = app
            .post_with_token(
                routes::POSTS,
                &json!({"title": "Straight Out", "content": BODY, "status": "PUBLISHED"}),
                &author.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "PUBLISHED");
        assert!(res.body["published_at"].is_string());
        assert_eq!(res.body["excerpt"], BODY);
    }

    #[tokio::test]
    async fn reader_cannot_create_posts() {
        let app = TestApp::spawn().await;
        let reader = app.create_user_with_role("reader", "READER").await;

        let res = app
            .post_with_token(
                routes::POSTS,
                &json!({"title": "Hello World", "content": BODY}),
                &reader.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn anonymous_cannot_create_posts() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::POSTS,
                &json!({"title": "Hello World", "content": BODY}),
            )
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn short_title_and_short_content_are_rejected() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;

        let short_title = app
            .post_with_token(
                routes::POSTS,
                &json!({"title": "Hey", "content": BODY}),
                &author.token,
            )
            .await;
        assert_eq!(short_title.status, 400);
        assert_eq!(short_title.code(), "VALIDATION_ERROR");

        let short_content = app
            .post_with_token(
                routes::POSTS,
                &json!({"title": "Hello World", "content": "too short"}),
                &author.token,
            )
            .await;
        assert_eq!(short_content.status, 400);
        assert_eq!(short_content.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_tag_id_is_rejected() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;

        let res = app
            .post_with_token(
                routes::POSTS,
                &json!({"title": "Hello World", "content": BODY, "tag_ids": [9999]}),
                &author.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn drafts_are_hidden_from_anonymous_visitors_and_readers() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Secret Draft", "DRAFT").await;

        let anon = app.get_without_token(&routes::post(id)).await;
        assert_eq!(anon.status, 404);
        assert_eq!(anon.code(), "NOT_FOUND");

        let as_reader = app.get_with_token(&routes::post(id), &reader.token).await;
        assert_eq!(as_reader.status, 404);
    }

    #[tokio::test]
    async fn drafts_are_visible_to_their_author_and_admins() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let admin = app.create_user_with_role("boss", "ADMIN").await;
        let id = app.create_post(&author.token, "Secret Draft", "DRAFT").await;

        let own = app.get_with_token(&routes::post(id), &author.token).await;
        assert_eq!(own.status, 200);

        let as_admin = app.get_with_token(&routes::post(id), &admin.token).await;
        assert_eq!(as_admin.status, 200);
    }

    #[tokio::test]
    async fn another_authors_draft_is_hidden() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let other = app.create_user_with_role("rival", "AUTHOR").await;
        let id = app.create_post(&author.token, "Secret Draft", "DRAFT").await;

        let res = app.get_with_token(&routes::post(id), &other.token).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn listing_only_shows_what_the_caller_may_see() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let other = app.create_user_with_role("rival", "AUTHOR").await;
        let admin = app.create_user_with_role("boss", "ADMIN").await;
        app.create_post(&author.token, "Public Words", "PUBLISHED").await;
        app.create_post(&author.token, "Private Words", "DRAFT").await;
        app.create_post(&other.token, "Rival Draft", "DRAFT").await;

        let anon = app.get_without_token(routes::POSTS).await;
        assert_eq!(anon.status, 200);
        assert_eq!(anon.body["pagination"]["total"], 1);

        let own = app.get_with_token(routes::POSTS, &author.token).await;
        assert_eq!(own.body["pagination"]["total"], 2);

        let everything = app.get_with_token(routes::POSTS, &admin.token).await;
        assert_eq!(everything.body["pagination"]["total"], 3);
    }

    #[tokio::test]
    async fn listing_omits_post_content() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        app.create_post(&author.token, "Public Words", "PUBLISHED").await;

        let res = app.get_without_token(routes::POSTS).await;

        assert!(res.body["data"][0].get("content").is_none());
        assert_eq!(res.body["data"][0]["title"], "Public Words");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_content() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        app.create_post(&author.token, "Rust Ownership", "PUBLISHED").await;
        app.create_post(&author.token, "Gardening Notes", "PUBLISHED").await;

        let res = app
            .get_without_token(&format!("{}?search=rUsT", routes::POSTS))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["pagination"]["total"], 1);
        assert_eq!(res.body["data"][0]["title"], "Rust Ownership");

        let by_content = app
            .get_without_token(&format!("{}?search=MINIMUM", routes::POSTS))
            .await;
        assert_eq!(by_content.body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn filters_by_author_and_tag() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let other = app.create_user_with_role("rival", "AUTHOR").await;
        let tag = app.create_tag(&author.token, "Rust").await;

        let res = app
            .post_with_token(
                routes::POSTS,
                &json!({"title": "Tagged Post", "content": BODY, "status": "PUBLISHED", "tag_ids": [tag]}),
                &author.token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        app.create_post(&author.token, "Untagged Post", "PUBLISHED").await;
        app.create_post(&other.token, "Rival Post", "PUBLISHED").await;

        let by_author = app
            .get_without_token(&format!("{}?author={}", routes::POSTS, author.id))
            .await;
        assert_eq!(by_author.body["pagination"]["total"], 2);

        let by_tag = app
            .get_without_token(&format!("{}?tag={tag}", routes::POSTS))
            .await;
        assert_eq!(by_tag.body["pagination"]["total"], 1);
        assert_eq!(by_tag.body["data"][0]["tags"][0]["slug"], "rust");
    }

    #[tokio::test]
    async fn sorts_by_title_ascending() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        app.create_post(&author.token, "Bravo Post", "PUBLISHED").await;
        app.create_post(&author.token, "Alpha Post", "PUBLISHED").await;
        app.create_post(&author.token, "Charlie Post", "PUBLISHED").await;

        let res = app
            .get_without_token(&format!("{}?sort_by=title&sort_order=asc", routes::POSTS))
            .await;

        let titles: Vec<&str> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Alpha Post", "Bravo Post", "Charlie Post"]);
    }

    #[tokio::test]
    async fn search_also_matches_tag_names() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let tag = app.create_tag(&author.token, "Ferris Corner").await;
        let res = app
            .post_with_token(
                routes::POSTS,
                &json!({"title": "Tagged Post", "content": BODY, "status": "PUBLISHED", "tag_ids": [tag]}),
                &author.token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        app.create_post(&author.token, "Untagged Post", "PUBLISHED").await;

        let res = app
            .get_without_token(&format!("{}?search=ferris", routes::POSTS))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["pagination"]["total"], 1);
        assert_eq!(res.body["data"][0]["title"], "Tagged Post");
    }

    #[tokio::test]
    async fn sorts_by_like_count() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let first = app.create_user_with_role("first", "READER").await;
        let second = app.create_user_with_role("second", "READER").await;
        let quiet = app.create_post(&author.token, "Quiet Post", "PUBLISHED").await;
        let liked = app.create_post(&author.token, "Liked Post", "PUBLISHED").await;
        let loved = app.create_post(&author.token, "Loved Post", "PUBLISHED").await;
        for token in [&first.token, &second.token] {
            app.post_with_token(&routes::post_like(loved), &json!({}), token)
                .await;
        }
        app.post_with_token(&routes::post_like(liked), &json!({}), &first.token)
            .await;

        let res = app
            .get_without_token(&format!("{}?sort_by=like_count", routes::POSTS))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let ids: Vec<i64> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![loved as i64, liked as i64, quiet as i64]);
        assert_eq!(res.body["data"][0]["like_count"], 2);

        let ascending = app
            .get_without_token(&format!("{}?sort_by=like_count&sort_order=asc", routes::POSTS))
            .await;
        assert_eq!(ascending.body["data"][0]["id"], quiet);
    }

    #[tokio::test]
    async fn unknown_sort_field_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&format!("{}?sort_by=password", routes::POSTS))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn pagination_reports_totals() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        for i in 0..3 {
            app.create_post(&author.token, &format!("Numbered Post {i}"), "PUBLISHED")
                .await;
        }

        let res = app
            .get_without_token(&format!("{}?page=2&per_page=2", routes::POSTS))
            .await;

        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
        assert_eq!(res.body["pagination"]["page"], 2);
    }

    #[tokio::test]
    async fn huge_page_number_returns_an_empty_page() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        app.create_post(&author.token, "Only Post", "PUBLISHED").await;

        let res = app
            .get_without_token(&format!("{}?page={}&per_page=100", routes::POSTS, u64::MAX))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["data"].as_array().unwrap().is_empty());
        assert_eq!(res.body["pagination"]["total"], 1);
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn publishing_stamps_published_at_once() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let id = app.create_post(&author.token, "Going Live", "DRAFT").await;

        let first = app
            .post_with_token(&routes::post_publish(id), &json!({}), &author.token)
            .await;
        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(first.body["status"], "PUBLISHED");
        let stamped = first.body["published_at"].clone();
        assert!(stamped.is_string());

        let again = app
            .post_with_token(&routes::post_publish(id), &json!({}), &author.token)
            .await;
        assert_eq!(again.status, 200);
        assert_eq!(again.body["published_at"], stamped);
    }

    #[tokio::test]
    async fn archived_posts_cannot_be_republished() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let id = app.create_post(&author.token, "Old News", "PUBLISHED").await;

        let archived = app
            .post_with_token(&routes::post_archive(id), &json!({}), &author.token)
            .await;
        assert_eq!(archived.status, 200, "{}", archived.text);
        assert_eq!(archived.body["status"], "ARCHIVED");

        let res = app
            .post_with_token(&routes::post_publish(id), &json!({}), &author.token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn published_post_cannot_return_to_draft() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let id = app.create_post(&author.token, "No Going Back", "PUBLISHED").await;

        let res = app
            .patch_with_token(&routes::post(id), &json!({"status": "DRAFT"}), &author.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn archived_posts_disappear_from_public_view() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let id = app.create_post(&author.token, "Old News", "PUBLISHED").await;
        app.post_with_token(&routes::post_archive(id), &json!({}), &author.token)
            .await;

        let res = app.get_without_token(&routes::post(id)).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn admin_may_publish_another_authors_draft() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let admin = app.create_user_with_role("boss", "ADMIN").await;
        let id = app.create_post(&author.token, "Pending Review", "DRAFT").await;

        let res = app
            .post_with_token(&routes::post_publish(id), &json!({}), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "PUBLISHED");
    }
}

mod editing {
    use super::*;

    #[tokio::test]
    async fn owner_edits_title_without_changing_slug() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let id = app.create_post(&author.token, "First Title", "DRAFT").await;

        let res = app
            .patch_with_token(
                &routes::post(id),
                &json!({"title": "Second Title"}),
                &author.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Second Title");
        assert_eq!(res.body["slug"], "first-title");
    }

    #[tokio::test]
    async fn tag_ids_replace_the_whole_tag_set() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let rust = app.create_tag(&author.token, "Rust").await;
        let web = app.create_tag(&author.token, "Web").await;
        let res = app
            .post_with_token(
                routes::POSTS,
                &json!({"title": "Tagged Post", "content": BODY, "tag_ids": [rust]}),
                &author.token,
            )
            .await;
        let id = res.id();

        let res = app
            .patch_with_token(&routes::post(id), &json!({"tag_ids": [web]}), &author.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let tags = res.body["tags"].as_array().unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0]["id"], web);
    }

    #[tokio::test]
    async fn published_post_of_another_author_cannot_be_edited() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let other = app.create_user_with_role("rival", "AUTHOR").await;
        let id = app.create_post(&author.token, "Mine Alone", "PUBLISHED").await;

        let res = app
            .patch_with_token(&routes::post(id), &json!({"title": "Hijacked!"}), &other.token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn deleting_a_post_removes_its_comments() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Short Lived", "PUBLISHED").await;
        let comment = app.create_comment(&reader.token, id, "Nice post", None).await;

        let res = app.delete_with_token(&routes::post(id), &author.token).await;
        assert_eq!(res.status, 204);

        let gone = app.get_with_token(&routes::post(id), &author.token).await;
        assert_eq!(gone.status, 404);
        let comment = app.get_with_token(&routes::comment(comment), &reader.token).await;
        assert_eq!(comment.status, 404);
    }

    #[tokio::test]
    async fn reader_cannot_delete_someone_elses_post() {
        let app = TestApp::spawn().await;
        let author = app.create_user_with_role("writer", "AUTHOR").await;
        let reader = app.create_user_with_role("reader", "READER").await;
        let id = app.create_post(&author.token, "Staying Put", "PUBLISHED").await;

        let res = app.delete_with_token(&routes::post(id), &reader.token).await;

        assert_eq!(res.status, 403);
    }
}
