//! Navigation targets and who may open them.

use std::fmt;

use tracker_core::model::UserIdentity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Goals,
    Log,
    Dashboard,
    Progress,
    /// Anything under `/admin`; holds the remainder without a leading slash.
    Admin(String),
}

impl Route {
    /// Parse a path; query strings, fragments and a trailing slash are
    /// ignored. Unknown paths yield `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/goals" => Some(Route::Goals),
            "/log" => Some(Route::Log),
            "/dashboard" => Some(Route::Dashboard),
            "/progress" => Some(Route::Progress),
            "/admin" => Some(Route::Admin(String::new())),
            other => other
                .strip_prefix("/admin/")
                .map(|rest| Route::Admin(rest.to_string())),
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Login => "/login".into(),
            Route::Goals => "/goals".into(),
            Route::Log => "/log".into(),
            Route::Dashboard => "/dashboard".into(),
            Route::Progress => "/progress".into(),
            Route::Admin(rest) if rest.is_empty() => "/admin".into(),
            Route::Admin(rest) => format!("/admin/{rest}"),
        }
    }

    /// Whether the route can be opened without signing in.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Home | Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow(Route),
    Redirect(Route),
    NotFound,
}

/// Decide what opening `path` leads to for `user`.
///
/// Signed-out users are sent to the login page from every non-public route.
/// The admin area answers `NotFound` to anyone without the admin role.
#[must_use]
pub fn authorize(path: &str, user: Option<&UserIdentity>) -> Access {
    let Some(route) = Route::parse(path) else {
        return Access::NotFound;
    };
    if route.is_public() {
        return Access::Allow(route);
    }
    let Some(user) = user else {
        return Access::Redirect(Route::Login);
    };
    match route {
        Route::Admin(_) if !user.role.is_admin() => Access::NotFound,
        route => Access::Allow(route),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::model::Role;

    fn user(role: Role) -> UserIdentity {
        UserIdentity::new("u1", "someone@example.com", role)
    }

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse(""), Some(Route::Home));
        assert_eq!(Route::parse("/dashboard/"), Some(Route::Dashboard));
        assert_eq!(Route::parse("/log?week=3"), Some(Route::Log));
        assert_eq!(
            Route::parse("/admin/patients"),
            Some(Route::Admin("patients".into()))
        );
        assert_eq!(Route::parse("/admin"), Some(Route::Admin(String::new())));
        assert_eq!(Route::parse("/administrator"), None);
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn paths_round_trip_through_display() {
        for path in ["/", "/login", "/goals", "/log", "/dashboard", "/progress", "/admin", "/admin/x"] {
            assert_eq!(Route::parse(path).unwrap().to_string(), path);
        }
    }

    #[test]
    fn signed_out_users_are_redirected() {
        assert_eq!(authorize("/", None), Access::Allow(Route::Home));
        assert_eq!(authorize("/login", None), Access::Allow(Route::Login));
        assert_eq!(authorize("/goals", None), Access::Redirect(Route::Login));
        assert_eq!(authorize("/admin/x", None), Access::Redirect(Route::Login));
        assert_eq!(authorize("/missing", None), Access::NotFound);
    }

    #[test]
    fn admin_area_requires_admin_role() {
        let patient = user(Role::Patient);
        let admin = user(Role::Admin);
        assert_eq!(authorize("/admin", Some(&patient)), Access::NotFound);
        assert_eq!(
            authorize("/admin", Some(&admin)),
            Access::Allow(Route::Admin(String::new()))
        );
        assert_eq!(
            authorize("/progress", Some(&patient)),
            Access::Allow(Route::Progress)
        );
    }
}
