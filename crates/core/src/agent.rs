//! Agent role and availability enums.

string_enum! {
    /// Permission level of a moderation agent.
    pub enum AgentRole {
        Agent => "agent",
        Supervisor => "supervisor",
        Admin => "admin",
        Moderator => "moderator",
    }
}

string_enum! {
    /// Availability shown next to an agent in the queue.
    pub enum AgentStatus {
        Online => "online",
        Offline => "offline",
        Busy => "busy",
    }
}

impl AgentRole {
    /// Position in the permission hierarchy: admin > supervisor > moderator > agent.
    pub fn level(self) -> u8 {
        match self {
            AgentRole::Agent => 1,
            AgentRole::Moderator => 2,
            AgentRole::Supervisor => 3,
            AgentRole::Admin => 4,
        }
    }

    /// Whether this role grants at least the permissions of `required`.
    pub fn has_at_least(self, required: AgentRole) -> bool {
        self.level() >= required.level()
    }

    /// Whether this role may manage rules, categories, agents and the audit log.
    pub fn is_admin(self) -> bool {
        self == AgentRole::Admin
    }

    /// Whether this role may assign or release posts on behalf of others.
    pub fn can_reassign(self) -> bool {
        self.has_at_least(AgentRole::Supervisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_is_admin() {
        for role in AgentRole::ALL {
            assert_eq!(role.is_admin(), *role == AgentRole::Admin);
        }
    }

    #[test]
    fn supervisors_and_admins_can_reassign() {
        assert!(AgentRole::Admin.can_reassign());
        assert!(AgentRole::Supervisor.can_reassign());
        assert!(!AgentRole::Agent.can_reassign());
        assert!(!AgentRole::Moderator.can_reassign());
    }

    #[test]
    fn hierarchy_is_ordered() {
        assert!(AgentRole::Admin.has_at_least(AgentRole::Supervisor));
        assert!(AgentRole::Supervisor.has_at_least(AgentRole::Moderator));
        assert!(AgentRole::Moderator.has_at_least(AgentRole::Agent));
        assert!(!AgentRole::Moderator.has_at_least(AgentRole::Supervisor));
        for role in AgentRole::ALL {
            assert!(role.has_at_least(*role));
        }
    }

    #[test]
    fn round_trips_through_strings() {
        for status in AgentStatus::ALL {
            assert_eq!(status.as_str().parse::<AgentStatus>().unwrap(), *status);
        }
        assert!(AgentStatus::try_from("away".to_string()).is_err());
    }
}
