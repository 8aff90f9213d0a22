pub mod agents;
pub mod ai;
pub mod audit;
pub mod auth;
pub mod categories;
pub mod posts;
pub mod responses;
pub mod rules;
pub mod templates;
pub mod uploads;
