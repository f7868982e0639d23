pub mod category;
pub mod comment;
pub mod location;
pub mod post;
pub mod user;

pub use category::{Entity as Category, Model as CategoryModel};
pub use comment::{Entity as Comment, Model as CommentModel};
pub use location::{Entity as Location, Model as LocationModel};
pub use post::{Entity as Post, Model as PostModel};
pub use user::{Entity as User, Model as UserModel};

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";
