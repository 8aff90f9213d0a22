//! Repository layer: one zero-sized struct per table, each taking `&PgPool`.

pub mod agent_repo;
pub mod audit_repo;
pub mod category_repo;
pub mod post_repo;
pub mod response_repo;
pub mod rule_repo;
pub mod template_repo;

pub use agent_repo::AgentRepo;
pub use audit_repo::AuditLogRepo;
pub use category_repo::CategoryRepo;
pub use post_repo::PostRepo;
pub use response_repo::ResponseRepo;
pub use rule_repo::PriorityRuleRepo;
pub use template_repo::TemplateRepo;
