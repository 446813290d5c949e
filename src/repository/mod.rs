use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod member_repository;

pub use member_repository::SqliteMemberRepository;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create(&self, member: NewMember) -> Result<Member>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>>;
    async fn find_by_member_id(&self, member_id: &str) -> Result<Option<Member>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Member>>;
    /// All members, most recent registration first.
    async fn list(&self) -> Result<Vec<Member>>;
    /// Members whose first name, last name, member id or activity contains `term`.
    async fn search(&self, term: &str) -> Result<Vec<Member>>;
    async fn count(&self) -> Result<i64>;
}
