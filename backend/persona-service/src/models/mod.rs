/// Data models for persona-service
///
/// - `account`: login identities and their settings
/// - `profile`: personas owned by an account
/// - `post`: posts with embedded images, likes and comments, plus the
///   composed views returned to clients
pub mod account;
pub mod post;
pub mod profile;

pub use account::{
    Account, AccountSearchHit, AccountWithProfiles, LoginRequest, RegisterRequest,
    UpdateAccountRequest,
};
pub use post::{
    AuthorView, Comment, CommentView, Post, PostImage, PostView, UpdatePostRequest,
};
pub use profile::{CreateProfileRequest, Profile, ProfileSummary, UpdateProfileRequest};
