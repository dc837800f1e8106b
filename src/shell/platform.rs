//! Platform queries: CI detection, privilege, and the invoking account.

/// Check if running in a CI environment.
///
/// Used to force non-interactive output in `main()`.
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

/// Check if running as root.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        false
    }
}

/// The account that should own provisioned files.
///
/// Under `sudo` this is the invoking user (`SUDO_USER`), otherwise `USER`.
pub fn current_user() -> Option<String> {
    current_user_with_env(|key| std::env::var(key))
}

/// [`current_user`] with a custom env lookup, for tests.
pub fn current_user_with_env<F>(env_fn: F) -> Option<String>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    ["SUDO_USER", "USER", "LOGNAME"]
        .iter()
        .filter_map(|key| env_fn(key).ok())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::VarError;

    #[test]
    fn current_user_prefers_sudo_user() {
        let user = current_user_with_env(|key| match key {
            "SUDO_USER" => Ok("alice".to_string()),
            "USER" => Ok("root".to_string()),
            _ => Err(VarError::NotPresent),
        });
        assert_eq!(user.as_deref(), Some("alice"));
    }

    #[test]
    fn current_user_falls_back_to_user() {
        let user = current_user_with_env(|key| match key {
            "USER" => Ok("bob".to_string()),
            _ => Err(VarError::NotPresent),
        });
        assert_eq!(user.as_deref(), Some("bob"));
    }

    #[test]
    fn current_user_skips_empty_values() {
        let user = current_user_with_env(|key| match key {
            "SUDO_USER" => Ok(String::new()),
            "LOGNAME" => Ok("carol".to_string()),
            _ => Err(VarError::NotPresent),
        });
        assert_eq!(user.as_deref(), Some("carol"));
    }

    #[test]
    fn current_user_none_when_unset() {
        assert!(current_user_with_env(|_| Err(VarError::NotPresent)).is_none());
    }

    #[test]
    fn is_ci_does_not_panic() {
        let _ = is_ci();
    }

    #[test]
    fn is_elevated_does_not_panic() {
        let _ = is_elevated();
    }
}
