//! Conversions from domain entities to wire DTOs.

use scribe_core::domain::{Category, Comment, Post, User};
use scribe_shared::dto::{CategoryResponse, CommentResponse, PostResponse, UserResponse};

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        date_of_birth: user.date_of_birth,
        created_at: user.created_at,
    }
}

pub fn category_response(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name.clone(),
    }
}

pub fn post_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.author_id,
        category_id: post.category_id,
        title: post.title.clone(),
        content: post.content.clone(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn comment_response(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        name: comment.name.clone(),
        body: comment.body.clone(),
        created_on: comment.created_on,
    }
}
