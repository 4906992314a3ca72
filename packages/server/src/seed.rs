use common::slug::slugify;
use common::{Lifecycle, PostStatus, Role};
use sea_orm::*;
use sea_query::{Index, OnConflict, PostgresQueryBuilder};
use tracing::info;

use crate::entity::{comment, post, post_like, post_tag, tag, user};
use crate::utils::hash;
use crate::utils::slug::post_slug_base;

/// Demo accounts: (username, email, password, role, bio).
const SAMPLE_USERS: &[(&str, &str, &str, Role, &str)] = &[
    (
        "admin",
        "admin@example.com",
        "admin-pass-123",
        Role::Admin,
        "Runs the place",
    ),
    (
        "alice_writes",
        "alice@example.com",
        "author-pass-123",
        Role::Author,
        "Writes about systems programming",
    ),
    (
        "bob_reads",
        "bob@example.com",
        "reader-pass-123",
        Role::Reader,
        "Reads everything twice",
    ),
];

/// Demo tag names. Slugs are derived the same way the API derives them.
const SAMPLE_TAGS: &[&str] = &["Rust", "Databases", "Web Development", "Tutorial"];

/// Demo posts by the sample author: (title, status, tag names, content).
const SAMPLE_POSTS: &[(&str, PostStatus, &[&str], &str)] = &[
    (
        "Ownership Without Tears",
        PostStatus::Published,
        &["Rust", "Tutorial"],
        "Ownership is the rule that every value has exactly one owner at a time. \
         Once that clicks, borrowing is simply lending the value out for a while \
         and the compiler checks that every loan is returned before the owner goes away.",
    ),
    (
        "Counting Views Safely",
        PostStatus::Published,
        &["Databases", "Web Development"],
        "Reading a counter, adding one in application memory and writing it back \
         loses updates under load. A single UPDATE that increments the column in place \
         lets the database serialize concurrent writers for you.",
    ),
    (
        "Notes for a Future Post on Async",
        PostStatus::Draft,
        &["Rust"],
        "Draft outline: executors, wakers, pinning, and why a future does nothing \
         until somebody polls it. Still needs examples and a section on cancellation.",
    ),
];

/// Populate demo users, tags, posts, comments and likes. Safe to run on every
/// start: existing rows are left alone.
pub async fn seed_sample_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now();

    let mut users_inserted = 0u32;
    for &(username, email, password, role, bio) in SAMPLE_USERS {
        let password_hash =
            hash::hash_password(password).map_err(|e| DbErr::Custom(e.to_string()))?;
        let model = user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password: Set(password_hash),
            role: Set(role),
            bio: Set(bio.to_string()),
            created_at: Set(now),
            ..Default::default()
        };
        let result = user::Entity::insert(model)
            .on_conflict(
                OnConflict::column(user::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;
        match result {
            Ok(rows) => users_inserted += rows as u32,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }
    if users_inserted > 0 {
        info!("Seeded {} sample users", users_inserted);
    }

    for &name in SAMPLE_TAGS {
        let model = tag::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slugify(name)),
            ..Default::default()
        };
        let result = tag::Entity::insert(model)
            .on_conflict(OnConflict::column(tag::Column::Slug).do_nothing().to_owned())
            .exec_without_returning(db)
            .await;
        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    let author = find_sample_user(db, "alice_writes").await?;
    let reader = find_sample_user(db, "bob_reads").await?;

    let mut posts_inserted = 0u32;
    for &(title, status, tag_names, content) in SAMPLE_POSTS {
        let slug = post_slug_base(title);
        let exists = post::Entity::find()
            .filter(post::Column::Slug.eq(slug.as_str()))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let txn = db.begin().await?;
        let lifecycle = Lifecycle::new()
            .transition(status, now)
            .map_err(|e| DbErr::Custom(e.to_string()))?;
        let created = post::ActiveModel {
            title: Set(title.to_string()),
            slug: Set(slug),
            content: Set(content.to_string()),
            excerpt: Set(common::lifecycle::resolve_excerpt(
                lifecycle.status,
                "",
                content,
            )),
            author_id: Set(author.id),
            status: Set(lifecycle.status),
            view_count: Set(0),
            share_count: Set(0),
            published_at: Set(lifecycle.published_at),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let tag_ids: Vec<i32> = tag::Entity::find()
            .filter(tag::Column::Slug.is_in(tag_names.iter().map(|name| slugify(name))))
            .select_only()
            .column(tag::Column::Id)
            .into_tuple()
            .all(&txn)
            .await?;
        if !tag_ids.is_empty() {
            post_tag::Entity::insert_many(tag_ids.into_iter().map(|tag_id| {
                post_tag::ActiveModel {
                    post_id: Set(created.id),
                    tag_id: Set(tag_id),
                }
            }))
            .exec_without_returning(&txn)
            .await?;
        }

        if created.status == PostStatus::Published {
            let question = comment::ActiveModel {
                post_id: Set(created.id),
                author_id: Set(reader.id),
                content: Set("Great write-up, could you add a worked example?".into()),
                is_approved: Set(true),
                parent_id: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            comment::ActiveModel {
                post_id: Set(created.id),
                author_id: Set(author.id),
                content: Set("Good idea, I'll follow up with one.".into()),
                is_approved: Set(true),
                parent_id: Set(Some(question.id)),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            comment::ActiveModel {
                post_id: Set(created.id),
                author_id: Set(reader.id),
                content: Set("Waiting for moderation.".into()),
                is_approved: Set(false),
                parent_id: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            post_like::ActiveModel {
                user_id: Set(reader.id),
                post_id: Set(created.id),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        posts_inserted += 1;
    }
    if posts_inserted > 0 {
        info!("Seeded {} sample posts", posts_inserted);
    }

    Ok(())
}

async fn find_sample_user(db: &DatabaseConnection, username: &str) -> Result<user::Model, DbErr> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("sample user {username}")))
}

/// Ensure required database indexes exist.
///
/// Schema sync only creates the unique indexes declared on the entities, so
/// the composite lookups used by listings are created here.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes = [
        // Post listings: WHERE status = ? ORDER BY created_at
        Index::create()
            .if_not_exists()
            .name("idx_post_status_created")
            .table(post::Entity)
            .col(post::Column::Status)
            .col(post::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        // Comment feeds and cascades: WHERE post_id = ?
        Index::create()
            .if_not_exists()
            .name("idx_comment_post_created")
            .table(comment::Entity)
            .col(comment::Column::PostId)
            .col(comment::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        // Like counts: WHERE post_id = ?
        Index::create()
            .if_not_exists()
            .name("idx_post_like_post")
            .table(post_like::Entity)
            .col(post_like::Column::PostId)
            .to_string(PostgresQueryBuilder),
    ];

    for stmt in indexes {
        if let Err(e) = db.execute_unprepared(&stmt).await {
            tracing::warn!("Failed to create index: {}", e);
        }
    }
    info!("Ensured listing indexes exist");

    Ok(())
}
