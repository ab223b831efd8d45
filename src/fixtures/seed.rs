//! Demo data for the blog: authors, their posts, reader comments.
//!
//! Every seeded account uses the password `password`.

use serde_json::{json, Value};

use super::{into_row, Row};

fn rows(values: Vec<Value>) -> Vec<Row> {
    values.into_iter().filter_map(into_row).collect()
}

pub(super) fn posts() -> Vec<Row> {
    rows(vec![
        json!({
            "id": "1",
            "title": "What's new in React 18",
            "summary": "Concurrent rendering, Suspense improvements and new hooks.",
            "content": "# What's new in React 18\n\n## Concurrent rendering\n\n## Suspense\n\n## New hooks\n- `useId`\n- `useTransition`\n- `useDeferredValue`\n",
            "status": "published",
            "view_count": 156,
            "like_count": 12,
            "author_id": "1",
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "2024-01-15T10:30:00Z"
        }),
        json!({
            "id": "2",
            "title": "A deep dive into the Vue 3 Composition API",
            "summary": "setup(), refs and reactive state, and why logic reuse gets easier.",
            "content": "# Vue 3 Composition API\n\n## setup()\n\n## Advantages\n- Better TypeScript support\n- Simpler logic reuse\n",
            "status": "published",
            "view_count": 89,
            "like_count": 8,
            "author_id": "2",
            "created_at": "2024-01-12T14:20:00Z",
            "updated_at": "2024-01-12T14:20:00Z"
        }),
        json!({
            "id": "3",
            "title": "TypeScript best practices",
            "summary": "Interfaces, generics and the built-in utility types.",
            "content": "# TypeScript best practices\n\n## Type definitions\n\n## Generics\n\n## Utility types\n- Partial<T>\n- Required<T>\n- Pick<T, K>\n",
            "status": "published",
            "view_count": 234,
            "like_count": 18,
            "author_id": "3",
            "created_at": "2024-01-10T09:15:00Z",
            "updated_at": "2024-01-10T09:15:00Z"
        }),
        json!({
            "id": "4",
            "title": "Front-end performance tips",
            "summary": "Images, JavaScript and CSS: where the milliseconds go.",
            "content": "# Front-end performance tips\n\n## Images\n\n## JavaScript\n\n## CSS\n",
            "status": "draft",
            "view_count": 0,
            "like_count": 0,
            "author_id": "user1",
            "created_at": "2024-01-20T15:30:00Z",
            "updated_at": "2024-01-20T15:30:00Z"
        }),
    ])
}

pub(super) fn comments() -> Vec<Row> {
    rows(vec![
        json!({
            "id": "1",
            "post_id": "1",
            "user_id": "user1",
            "content": "Very thorough. The concurrent rendering section helped a lot.",
            "created_at": "2024-01-16T08:30:00Z",
            "updated_at": "2024-01-16T08:30:00Z"
        }),
        json!({
            "id": "2",
            "post_id": "1",
            "user_id": "user2",
            "content": "Would love more real-world useTransition examples.",
            "created_at": "2024-01-16T10:15:00Z",
            "updated_at": "2024-01-16T10:15:00Z"
        }),
        json!({
            "id": "3",
            "post_id": "2",
            "user_id": "user3",
            "content": "The Composition API really is more flexible than the Options API.",
            "created_at": "2024-01-13T14:20:00Z",
            "updated_at": "2024-01-13T14:20:00Z"
        }),
        json!({
            "id": "4",
            "post_id": "3",
            "user_id": "user1",
            "content": "Types make large projects so much easier to maintain.",
            "created_at": "2024-01-11T09:45:00Z",
            "updated_at": "2024-01-11T09:45:00Z"
        }),
    ])
}

pub(super) fn profiles() -> Vec<Row> {
    rows(vec![
        json!({"id": "1", "username": "Zhang San", "role": "user"}),
        json!({"id": "2", "username": "Li Si", "role": "user"}),
        json!({"id": "3", "username": "Wang Wu", "role": "user"}),
        json!({"id": "user1", "username": "Zhao Liu", "role": "user"}),
        json!({"id": "user2", "username": "tech_fan", "role": "user"}),
        json!({"id": "user3", "username": "vue_dev", "role": "user"}),
    ])
}

pub(super) fn users() -> Vec<Row> {
    rows(vec![
        json!({
            "id": "1",
            "email": "zhangsan@example.com",
            "password": "password",
            "display_name": "Zhang San"
        }),
        json!({
            "id": "2",
            "email": "lisi@example.com",
            "password": "password",
            "display_name": "Li Si"
        }),
        json!({
            "id": "3",
            "email": "wangwu@example.com",
            "password": "password",
            "display_name": "Wang Wu"
        }),
        json!({
            "id": "user1",
            "email": "zhaoliu@example.com",
            "password": "password",
            "display_name": "Zhao Liu"
        }),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_draft_post() {
        let drafts = posts()
            .iter()
            .filter(|p| p["status"] == json!("draft"))
            .count();
        assert_eq!(drafts, 1);
    }

    #[test]
    fn test_every_author_has_a_profile() {
        let profiles = profiles();
        for post in posts() {
            assert!(profiles.iter().any(|p| p["id"] == post["author_id"]));
        }
        for comment in comments() {
            assert!(profiles.iter().any(|p| p["id"] == comment["user_id"]));
        }
    }

    #[test]
    fn test_user_ids_unique() {
        let users = users();
        for (i, a) in users.iter().enumerate() {
            for b in &users[i + 1..] {
                assert_ne!(a["id"], b["id"]);
                assert_ne!(a["email"], b["email"]);
            }
        }
    }
}
