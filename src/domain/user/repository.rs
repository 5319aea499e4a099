use async_trait::async_trait;

use super::{CreateUserDto, UpdateUserDto, User};
use crate::shared::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn find_all(&self) -> DomainResult<Vec<User>>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn count(&self) -> DomainResult<u64>;

    /// Errors with `NotFound` when no user has this id.
    async fn update(&self, id: i32, dto: UpdateUserDto) -> DomainResult<User>;
    async fn delete(&self, id: i32) -> DomainResult<()>;

    async fn exists(&self, id: i32) -> DomainResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}
