// src/controllers/users.rs
use validator::Validate;

use crate::api::ApiClient;
use crate::error::{validate_required, ApiResult};
use crate::models::{CreateUserRequest, Role, UpdateUserRequest, User};

/// Editor form backing the user dialog. For an existing user the password
/// starts empty and stays write-only: leaving it empty means "unchanged".
#[derive(Debug, Clone)]
pub struct UserForm {
    pub id: Option<i64>,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub is_staff: bool,
}

impl UserForm {
    pub fn new_user() -> Self {
        Self {
            id: None,
            username: String::new(),
            password: String::new(),
            role: Role::Operator,
            is_staff: false,
        }
    }

    pub fn edit(user: &User) -> Self {
        Self {
            id: Some(user.id),
            username: user.username.clone(),
            password: String::new(),
            role: user.role,
            is_staff: user.is_staff,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }
}

pub struct UsersController {
    api: ApiClient,
    users: Vec<User>,
}

impl UsersController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            users: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> ApiResult<()> {
        self.users = self.api.get_users().await?;
        Ok(())
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Create or update depending on the form. A new user without a
    /// password is rejected here, before any network call; on edit an empty
    /// password is dropped from the payload so it stays unchanged.
    pub async fn save(&mut self, form: &UserForm) -> ApiResult<()> {
        validate_required("Username", &form.username)?;

        match form.id {
            None => {
                let request = CreateUserRequest {
                    username: form.username.clone(),
                    password: form.password.clone(),
                    role: form.role,
                    is_staff: form.is_staff,
                };
                request.validate()?;
                self.api.create_user(&request).await?;
            }
            Some(id) => {
                let request = UpdateUserRequest {
                    username: form.username.clone(),
                    password: if form.password.is_empty() {
                        None
                    } else {
                        Some(form.password.clone())
                    },
                    role: form.role,
                    is_staff: form.is_staff,
                };
                request.validate()?;
                self.api.update_user(id, &request).await?;
            }
        }
        self.load().await
    }

    pub async fn delete(&mut self, id: i64) -> ApiResult<()> {
        self.api.delete_user(id).await?;
        self.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::session::TokenStore;

    fn controller() -> UsersController {
        let api = ApiClient::new("http://127.0.0.1:1", TokenStore::in_memory());
        UsersController::new(api)
    }

    #[tokio::test]
    async fn test_new_user_without_password_is_rejected_client_side() {
        let mut controller = controller();
        let form = UserForm {
            username: "olena".to_string(),
            ..UserForm::new_user()
        };
        let err = controller.save(&form).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_username_is_required() {
        let mut controller = controller();
        let form = UserForm::new_user();
        let err = controller.save(&form).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[test]
    fn test_edit_form_never_carries_the_old_password() {
        let user = User {
            id: 3,
            username: "petro".to_string(),
            role: Role::Administrator,
            is_staff: true,
        };
        let form = UserForm::edit(&user);
        assert!(form.is_edit());
        assert_eq!(form.password, "");
        assert_eq!(form.role, Role::Administrator);
    }
}
