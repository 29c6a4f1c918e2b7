//! Data models returned by the posts service.

use serde::{Deserialize, Serialize};

/// A post as served by the posts API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Author id.
    pub user_id: u64,
    /// Post id.
    pub id: u64,
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use serde_json::from_str;

    use crate::posts::models::Post;

    #[test]
    fn test_post_deserializes_camel_case() {
        let post: Post = from_str(
            r#"{ "userId": 1, "id": 3, "title": "ea molestias", "body": "et iusto sed" }"#,
        )
        .unwrap();
        assert_eq!(post.user_id, 1);
        assert_eq!(post.id, 3);
        assert_eq!(post.title, "ea molestias");
    }
}
