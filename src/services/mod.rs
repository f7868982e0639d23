pub mod auth;
pub mod bootstrap_admin;
pub mod category;
pub mod comment;
pub mod location;
pub mod post;
pub mod upload;
pub mod user;

pub use auth::AuthService;
pub use category::CategoryService;
pub use comment::CommentService;
pub use location::LocationService;
pub use post::PostService;
pub use upload::UploadService;
pub use user::UserService;
