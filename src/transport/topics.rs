//! Topic names used on the wire.

/// Inbound topic classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// `getVersion`: announce the current version.
    VersionQuery,
    /// `newUpdate`: reconcile an update notification.
    UpdateNotification,
}

/// Fully qualified topic names (prefix applied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    /// Inbound version queries.
    pub get_version: String,
    /// Inbound update notifications.
    pub new_update: String,
    /// Outbound version announcements.
    pub version: String,
    /// Outbound status snapshots.
    pub device_status: String,
}

impl Topics {
    /// Builds topic names as `<prefix><name>`.
    ///
    /// # Example
    /// ```
    /// use subco_agent::Topics;
    ///
    /// let t = Topics::with_prefix("/");
    /// assert_eq!(t.version, "/Version");
    /// assert_eq!(Topics::with_prefix("site-7/").get_version, "site-7/getVersion");
    /// ```
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            get_version: format!("{prefix}getVersion"),
            new_update: format!("{prefix}newUpdate"),
            version: format!("{prefix}Version"),
            device_status: format!("{prefix}DeviceStatus"),
        }
    }

    /// Topics the agent subscribes to on every connection.
    pub fn inbound(&self) -> [&str; 2] {
        [self.get_version.as_str(), self.new_update.as_str()]
    }

    /// Classifies an inbound topic. `None` for anything the agent does not handle.
    pub fn route(&self, topic: &str) -> Option<Inbound> {
        if topic == self.get_version {
            Some(Inbound::VersionQuery)
        } else if topic == self.new_update {
            Some(Inbound::UpdateNotification)
        } else {
            None
        }
    }
}

impl Default for Topics {
    fn default() -> Self {
        Self::with_prefix("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_matches_exact_names_only() {
        let t = Topics::default();
        assert_eq!(t.route("/getVersion"), Some(Inbound::VersionQuery));
        assert_eq!(t.route("/newUpdate"), Some(Inbound::UpdateNotification));
        assert_eq!(t.route("getVersion"), None);
        assert_eq!(t.route("/Version"), None);
    }

    #[test]
    fn test_empty_prefix() {
        let t = Topics::with_prefix("");
        assert_eq!(t.inbound(), ["getVersion", "newUpdate"]);
        assert_eq!(t.device_status, "DeviceStatus");
    }
}
