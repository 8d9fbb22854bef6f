//! PostgreSQL-backed stores for roles and login accounts

pub mod role;
pub mod user;

pub use role::PgRoleRepository;
pub use user::PgUserRepository;
