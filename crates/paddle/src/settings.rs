use serde::{Deserialize, Serialize};

/// How requests are grouped onto paddles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddleMode {
    /// No paddle is drawn.
    None,
    /// One unlabelled paddle catches every request.
    #[default]
    Single,
    /// One paddle per virtual host.
    Vhost,
    /// One paddle per process id.
    Pid,
}

impl PaddleMode {
    /// Grouped modes run one labelled paddle per token. Those paddles keep
    /// their token colour instead of borrowing the request's.
    pub fn groups_by_token(self) -> bool {
        matches!(self, PaddleMode::Vhost | PaddleMode::Pid)
    }
}

impl std::fmt::Display for PaddleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaddleMode::None => f.write_str("none"),
            PaddleMode::Single => f.write_str("single"),
            PaddleMode::Vhost => f.write_str("vhost"),
            PaddleMode::Pid => f.write_str("pid"),
        }
    }
}

impl std::str::FromStr for PaddleMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(PaddleMode::None),
            "single" => Ok(PaddleMode::Single),
            "vhost" => Ok(PaddleMode::Vhost),
            "pid" => Ok(PaddleMode::Pid),
            other => Err(format!(
                "unknown paddle mode '{other}' (expected none, single, vhost or pid)"
            )),
        }
    }
}

/// Display facts a paddle consults when it is retargeted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub paddle_mode: PaddleMode,
}

impl SceneSettings {
    pub fn new(viewport_width: f32, viewport_height: f32, paddle_mode: PaddleMode) -> Self {
        Self {
            viewport_width,
            viewport_height,
            paddle_mode,
        }
    }

    pub fn centre_y(&self) -> f32 {
        self.viewport_height / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes_case_insensitively() {
        assert_eq!("VHost".parse::<PaddleMode>(), Ok(PaddleMode::Vhost));
        assert_eq!(" pid ".parse::<PaddleMode>(), Ok(PaddleMode::Pid));
        assert!("paddle".parse::<PaddleMode>().is_err());
    }

    #[test]
    fn only_vhost_and_pid_group_by_token() {
        assert!(PaddleMode::Vhost.groups_by_token());
        assert!(PaddleMode::Pid.groups_by_token());
        assert!(!PaddleMode::Single.groups_by_token());
        assert!(!PaddleMode::None.groups_by_token());
    }
}
