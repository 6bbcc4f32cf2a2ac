use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// One authored tour stop: the environment node lending its pose plus the
/// caption shown while the camera rests there.
#[derive(Debug, Clone, Deserialize)]
pub struct WaypointSpec {
    pub name: String,
    pub title: String,
    pub description: String,
}

/// Story-trigger boundaries, expressed as waypoint indices. The timeline
/// converts them to progress values against the resolved waypoint count.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerIndices {
    pub door: usize,
    pub snow_stop: usize,
    pub letter: usize,
    pub sleep: usize,
    pub wake: usize,
}

impl Default for TriggerIndices {
    fn default() -> Self {
        Self {
            door: 4,
            snow_stop: 5,
            letter: 11,
            sleep: 13,
            wake: 14,
        }
    }
}

/// The authored tour: camera path, feature node names, and the finale
/// present queue.
#[derive(Debug, Clone, Deserialize)]
pub struct TourScript {
    pub waypoints: Vec<WaypointSpec>,
    pub door_node: String,
    pub letter_node: String,
    pub character_node: String,
    pub character_spawn: String,
    pub presents: Vec<String>,
    /// Index into `presents` that runs the extended reveal.
    pub special_present: usize,
    #[serde(default)]
    pub triggers: TriggerIndices,
}

impl TourScript {
    /// The shipped winter-cottage tour.
    pub fn builtin() -> Self {
        let captions: [(&str, &str); 18] = [
            ("The gate", "Snow has been falling all evening."),
            ("Up the path", "Footprints lead toward the lights."),
            ("The garden", "A snowman watches the road."),
            ("Closer now", "Warm windows against the cold."),
            ("The porch", "Someone should get that door."),
            ("Stepping in", "It is warmer already."),
            ("The hallway", "Coats hang heavy with melted snow."),
            ("The hearth", "The fire has burned low."),
            ("By the window", "Outside, the snow keeps its slow fall."),
            ("The kitchen", "Cocoa, still steaming."),
            ("The desk", "A page rests in the lamplight."),
            ("A letter", "It is addressed to you."),
            ("Up the stairs", "The steps creak their old tune."),
            ("The bedroom", "Heavy eyes. Just a moment's rest."),
            ("Morning", "Light spills across the floor."),
            ("Down again", "Something has changed downstairs."),
            ("The tree", "Paper and ribbon, waiting."),
            ("Presents", "Go on, open them."),
        ];

        TourScript {
            waypoints: captions
                .iter()
                .enumerate()
                .map(|(i, (title, description))| WaypointSpec {
                    name: format!("camAngle_{i}"),
                    title: (*title).to_string(),
                    description: (*description).to_string(),
                })
                .collect(),
            door_node: "Door_001".to_string(),
            letter_node: "Paper_001".to_string(),
            character_node: "Snowman_002".to_string(),
            character_spawn: "snowMan_pos1".to_string(),
            presents: vec![
                "Present_001".to_string(),
                "Present_002".to_string(),
                "Present_003".to_string(),
                "Present_004".to_string(),
            ],
            special_present: 3,
            triggers: TriggerIndices::default(),
        }
    }

    /// Load a script override from JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading tour script {path:?}"))?;
        let script: TourScript = serde_json::from_str(&raw)
            .with_context(|| format!("parsing tour script {path:?}"))?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<()> {
        if self.waypoints.is_empty() {
            bail!("tour script has no waypoints");
        }
        if !self.presents.is_empty() && self.special_present >= self.presents.len() {
            bail!(
                "special present index {} out of range ({} presents)",
                self.special_present,
                self.presents.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_script_is_consistent() {
        let script = TourScript::builtin();
        assert_eq!(script.waypoints.len(), 18);
        assert_eq!(script.waypoints[0].name, "camAngle_0");
        assert_eq!(script.waypoints[17].name, "camAngle_17");
        assert!(script.special_present < script.presents.len());
        assert!(script.validate().is_ok());
    }

    #[test]
    fn json_script_parses_with_default_triggers() {
        let raw = r#"{
            "waypoints": [
                {"name": "camAngle_0", "title": "Start", "description": "Here."}
            ],
            "door_node": "Door_001",
            "letter_node": "Paper_001",
            "character_node": "Snowman_002",
            "character_spawn": "snowMan_pos1",
            "presents": ["Present_001"],
            "special_present": 0
        }"#;

        let script: TourScript = serde_json::from_str(raw).expect("valid script");
        assert_eq!(script.triggers.door, 4);
        assert_eq!(script.triggers.wake, 14);
    }
}
