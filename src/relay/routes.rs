//! Relay route table
//!
//! Each route binds one POST path to one parameterless hardware action.
//! The translator derives the same paths when forwarding directives.

/// Television input: HDMI
pub const TV_INPUT_HDMI: &str = "/tvinput/hdmi";
/// Television input: built-in tuner
pub const TV_INPUT_TUNER: &str = "/tvinput/tv";
/// Soundbar input cycle
pub const SOUNDBAR_INPUT: &str = "/soundbarinput";

/// A single relay route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayRoute {
    /// POST path on the relay server
    pub path: &'static str,
    /// Name of the control script the route runs
    pub action: &'static str,
}

/// Every route the relay server exposes
pub const ROUTES: &[RelayRoute] = &[
    RelayRoute {
        path: "/tvon",
        action: "tvon",
    },
    RelayRoute {
        path: TV_INPUT_HDMI,
        action: "hdmi_input",
    },
    RelayRoute {
        path: TV_INPUT_TUNER,
        action: "tv_input",
    },
    RelayRoute {
        path: "/soundbaron",
        action: "soundbar_on",
    },
    RelayRoute {
        path: SOUNDBAR_INPUT,
        action: "soundbar_switch",
    },
];

/// Power-on path for an appliance
#[must_use]
pub fn power_on_path(endpoint_id: &str) -> String {
    format!("/{endpoint_id}on")
}

/// Input-switch path for an appliance and requested input
///
/// Matches on exact strings; inputs with no route return `None`.
#[must_use]
pub fn input_path(endpoint_id: &str, input: &str) -> Option<&'static str> {
    match (endpoint_id, input) {
        ("tv", "HDMI 1") => Some(TV_INPUT_HDMI),
        ("tv", "TV") => Some(TV_INPUT_TUNER),
        ("soundbar", _) => Some(SOUNDBAR_INPUT),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appliance::ApplianceCatalog;

    fn find(path: &str) -> Option<&'static RelayRoute> {
        ROUTES.iter().find(|r| r.path == path)
    }

    #[test]
    fn test_every_appliance_has_power_route() {
        for appliance in ApplianceCatalog::builtin().iter() {
            let path = power_on_path(&appliance.endpoint_id);
            assert!(find(&path).is_some(), "no relay route for {path}");
        }
    }

    #[test]
    fn test_input_path_exact_match() {
        assert_eq!(input_path("tv", "HDMI 1"), Some(TV_INPUT_HDMI));
        assert_eq!(input_path("tv", "TV"), Some(TV_INPUT_TUNER));
        assert_eq!(input_path("tv", "hdmi 1"), None);
        assert_eq!(input_path("tv", "HDMI 2"), None);
        assert_eq!(input_path("soundbar", "anything"), Some(SOUNDBAR_INPUT));
        assert_eq!(input_path("toaster", "TV"), None);
    }

    #[test]
    fn test_input_paths_are_routed() {
        for path in [TV_INPUT_HDMI, TV_INPUT_TUNER, SOUNDBAR_INPUT] {
            assert!(find(path).is_some());
        }
    }

    #[test]
    fn test_tvon_action() {
        assert_eq!(find("/tvon").map(|r| r.action), Some("tvon"));
    }
}
