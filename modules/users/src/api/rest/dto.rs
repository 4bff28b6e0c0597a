use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{NewUser, User};

/// REST DTO for user representation with serde/utoipa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(title = "User")]
pub struct UserDto {
    /// Store-assigned identifier
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub email: String,
}

/// REST DTO for creating a user or overwriting an existing one.
///
/// All four fields are required; there are no partial updates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(title = "UserRequest")]
pub struct UserReq {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub email: String,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            age: user.age,
            email: user.email,
        }
    }
}

impl From<UserReq> for NewUser {
    fn from(req: UserReq) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            age: req.age,
            email: req.email,
        }
    }
}
