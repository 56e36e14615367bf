//! Location to agent name resolution

/// Maps the location reference of an incoming event to an agent name
pub trait LocationResolver: Send + Sync {
    fn resolve(&self, location: &str) -> Option<String>;
}

/// Name used for events raised on the manager itself
pub const LOCAL_AGENT_NAME: &str = "localhost";

/// Resolves manager-style locations
///
/// Remote agents report as `(name) address->source`. Scans that run on the
/// manager report exactly as `syscheck` or `rootcheck` and map to `localhost`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentLocationResolver;

impl LocationResolver for AgentLocationResolver {
    fn resolve(&self, location: &str) -> Option<String> {
        if location == "syscheck" || location == "rootcheck" {
            return Some(LOCAL_AGENT_NAME.to_string());
        }

        let rest = location.strip_prefix('(')?;
        let end = rest.find(')')?;
        let name = rest[..end].trim();

        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_agent() {
        let resolver = AgentLocationResolver;
        assert_eq!(
            resolver.resolve("(web01) 10.0.0.5->rootcheck").as_deref(),
            Some("web01")
        );
        assert_eq!(resolver.resolve("(db-02) any->syscheck").as_deref(), Some("db-02"));
    }

    #[test]
    fn test_manager_scans() {
        let resolver = AgentLocationResolver;
        assert_eq!(resolver.resolve("rootcheck").as_deref(), Some(LOCAL_AGENT_NAME));
        assert_eq!(resolver.resolve("syscheck").as_deref(), Some(LOCAL_AGENT_NAME));
    }

    #[test]
    fn test_unresolvable() {
        let resolver = AgentLocationResolver;
        assert_eq!(resolver.resolve(""), None);
        assert_eq!(resolver.resolve("/var/log/auth.log"), None);
        assert_eq!(resolver.resolve("rootcheck-foo"), None);
        assert_eq!(resolver.resolve("syscheckd.log"), None);
        assert_eq!(resolver.resolve("(unterminated 10.0.0.5->rootcheck"), None);
        assert_eq!(resolver.resolve("() 10.0.0.5->rootcheck"), None);
    }
}
