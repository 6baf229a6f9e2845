// OpenAPI document for the Funpage API

use crate::api::{self, ApiResponse, ErrorResponse};
use crate::auth;
use funpage_core::{Comment, Identity, News, Role, Tag};
use utoipa::OpenApi;

/// OpenAPI documentation for the Funpage API
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::routes::register,
        auth::routes::login,
        auth::routes::logout,
        auth::routes::delete_account,
        auth::routes::get_current_user,
        auth::routes::send_verification_code,
        auth::routes::confirm_verification_code,
        api::news::create_news,
        api::news::get_news,
        api::news::get_news_by_author,
        api::news::get_news_by_tag,
        api::news::update_news,
        api::news::delete_news,
        api::tags::add_tag,
        api::tags::list_tags,
        api::tags::update_tag,
        api::tags::delete_tag,
        api::comments::add_comment,
        api::comments::list_comments,
        api::comments::update_comment,
        api::comments::delete_comment,
    ),
    components(
        schemas(
            Identity, Role, News, Tag, Comment,
            ErrorResponse,
            ApiResponse<News>, ApiResponse<Vec<News>>,
            ApiResponse<Tag>, ApiResponse<Vec<Tag>>,
            ApiResponse<Comment>, ApiResponse<Vec<Comment>>,
            ApiResponse<String>,
            auth::routes::RegisterRequest, auth::routes::LoginRequest,
            auth::routes::RegisterResponse, auth::routes::TokenResponse,
            auth::routes::ConfirmCodeRequest,
            api::news::CreateNewsRequest, api::news::UpdateNewsRequest,
            api::tags::TagRequest,
            api::comments::CommentRequest,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and account verification"),
        (name = "news", description = "News article endpoints"),
        (name = "tags", description = "Article tag endpoints"),
        (name = "comments", description = "Article comment endpoints")
    ),
    info(
        title = "Funpage API",
        version = "0.1.0",
        description = "API for news articles, tags and comments with JWT session auth",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;
