use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "budi@company.com")]
    pub email: String,
    #[schema(example = "user123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// account email
    pub sub: String,
    pub name: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,
}
