pub mod auth_dto;

pub use auth_dto::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MePermissionsResponse, RefreshTokenRequest,
    RegisterRequest, UpdateProfileRequest, UserResponse,
};
