pub mod change_password;
pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod register;
pub mod user_info;
mod validate;

pub use change_password::ChangePasswordUseCase;
pub use login::LoginUseCase;
pub use logout::{LogoutAllUseCase, LogoutUseCase};
pub use refresh_token::RefreshTokenUseCase;
pub use register::RegisterUseCase;
pub use user_info::{DeleteAccountUseCase, UpdateProfileUseCase, UserInfoUseCase};
