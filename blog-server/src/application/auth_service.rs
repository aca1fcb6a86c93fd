use tracing::info;

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::password::PasswordService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<R: UserRepository> {
    repo: R,
    jwt: JwtService,
    passwords: PasswordService,
}

impl<R: UserRepository> AuthService<R> {
    pub(crate) fn new(repo: R, jwt: JwtService) -> Self {
        Self {
            repo,
            jwt,
            passwords: PasswordService,
        }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;
        let password_hash = self.passwords.hash(&req.password)?;

        let user = self
            .repo
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;
        info!(user_id = user.id, "user registered");

        self.authenticated(user)
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let Some(creds) = self.repo.find_by_username(&req.username).await? else {
            match self.passwords.verify(&req.password, PasswordService::DUMMY_HASH) {
                Ok(()) | Err(DomainError::InvalidCredentials) => {}
                Err(err) => return Err(err),
            }
            return Err(DomainError::InvalidCredentials);
        };

        self.passwords.verify(&req.password, &creds.password_hash)?;
        self.authenticated(creds.user)
    }

    /// Deletes the account and, through the ownership rule, all of its posts.
    pub(crate) async fn delete_account(&self, user_id: i64) -> Result<(), DomainError> {
        if !self.repo.delete_user(user_id).await? {
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }
        info!(user_id, "user deleted with their posts");
        Ok(())
    }

    pub(crate) fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    fn authenticated(&self, user: User) -> Result<AuthResult, DomainError> {
        let access_token = self
            .jwt
            .issue(user.id, &user.username)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(AuthResult { user, access_token })
    }
}
