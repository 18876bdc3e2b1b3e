#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod error;
pub mod goal_service;
pub mod notice;
pub mod progress_service;
pub mod routes;
pub mod weekly_log_service;

pub use tracker_core::Clock;

pub use app_services::AppServices;
pub use auth::{
    AuthService, AuthSession, HttpIdentityProvider, IdentityConfig, IdentityProvider,
    InMemoryIdentityProvider, SignUpOutcome,
};
pub use error::{AppServicesError, AuthError, GoalServiceError, WeeklyLogServiceError};
pub use goal_service::GoalService;
pub use notice::{Loaded, Notice};
pub use progress_service::{Dashboard, ProgressCharts, ProgressService};
pub use routes::{Access, Route, authorize};
pub use weekly_log_service::WeeklyLogService;
