use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic category of a case element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
	/// Passive background areas.
	#[serde(rename = "AREA")]
	Area,
	/// Obstacles.
	#[serde(rename = "OBS")]
	Obstacle,
	/// Safeguards (sensors, cameras, barriers).
	#[serde(rename = "SFG")]
	Safeguard,
	/// Players and actors.
	#[serde(rename = "PLY")]
	Player,
}

impl Category {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Area => "AREA",
			Self::Obstacle => "OBS",
			Self::Safeguard => "SFG",
			Self::Player => "PLY",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
