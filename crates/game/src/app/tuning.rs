use std::env;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::AppPaths;
use serde::Deserialize;
use thiserror::Error;

pub(crate) const TUNING_ENV_VAR: &str = "LANE_SHINE_TUNING";
const DEFAULT_TUNING_FILE: &str = "tuning.json";

/// Half-open `[min, max)` duration range in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DurationRange {
    pub(crate) min: f32,
    pub(crate) max: f32,
}

impl DurationRange {
    pub(crate) const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LaneScores {
    pub(crate) top: u32,
    pub(crate) middle: u32,
    pub(crate) bottom: u32,
}

/// Every gameplay constant of the lane scene.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameTuning {
    pub(crate) move_speed: f32,
    pub(crate) bottom_input_speed: f32,
    pub(crate) middle_panel_speed: f32,
    pub(crate) top_panel_speed: f32,
    pub(crate) pedestrian_speed: f32,
    pub(crate) pedestrian_duration: DurationRange,
    pub(crate) house_duration: DurationRange,
    pub(crate) house_cooldown_seconds: f32,
    pub(crate) lane_scores: LaneScores,
    pub(crate) time_limit_seconds: f32,
    pub(crate) stage_margin: f32,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            move_speed: 240.0,
            bottom_input_speed: 1.0,
            middle_panel_speed: 0.5,
            top_panel_speed: 0.25,
            pedestrian_speed: 0.4,
            pedestrian_duration: DurationRange::new(1.0, 3.0),
            house_duration: DurationRange::new(3.0, 8.0),
            house_cooldown_seconds: 10.0,
            lane_scores: LaneScores {
                top: 300,
                middle: 200,
                bottom: 100,
            },
            time_limit_seconds: 60.0,
            stage_margin: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TuningSource {
    Defaults,
    File(PathBuf),
}

#[derive(Debug, Error)]
pub(crate) enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse tuning file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tuning value at {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Loads tuning from `LANE_SHINE_TUNING` or `assets/tuning.json`.
///
/// A missing default file yields built-in defaults; a file named through the
/// environment variable must exist.
pub(crate) fn load_tuning(app_paths: &AppPaths) -> Result<(GameTuning, TuningSource), TuningError> {
    match env::var_os(TUNING_ENV_VAR) {
        Some(explicit) => {
            let path = PathBuf::from(explicit);
            let tuning = load_tuning_file(&path)?;
            Ok((tuning, TuningSource::File(path)))
        }
        None => load_optional_tuning_file(&app_paths.assets_dir.join(DEFAULT_TUNING_FILE)),
    }
}

pub(crate) fn load_optional_tuning_file(
    path: &Path,
) -> Result<(GameTuning, TuningSource), TuningError> {
    if !path.exists() {
        return Ok((GameTuning::default(), TuningSource::Defaults));
    }
    let tuning = load_tuning_file(path)?;
    Ok((tuning, TuningSource::File(path.to_path_buf())))
}

pub(crate) fn load_tuning_file(path: &Path) -> Result<GameTuning, TuningError> {
    let raw = fs::read_to_string(path).map_err(|source| TuningError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tuning = parse_tuning_json(path, &raw)?;
    tuning.validate()?;
    Ok(tuning)
}

fn parse_tuning_json(path: &Path, raw: &str) -> Result<GameTuning, TuningError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameTuning>(&mut deserializer).map_err(|error| {
        let field = error.path().to_string();
        TuningError::Parse {
            path: path.to_path_buf(),
            field,
            source: error.into_inner(),
        }
    })
}

impl GameTuning {
    pub(crate) fn validate(&self) -> Result<(), TuningError> {
        let speeds = [
            ("move_speed", self.move_speed),
            ("bottom_input_speed", self.bottom_input_speed),
            ("middle_panel_speed", self.middle_panel_speed),
            ("top_panel_speed", self.top_panel_speed),
            ("pedestrian_speed", self.pedestrian_speed),
            ("stage_margin", self.stage_margin),
        ];
        for (field, value) in speeds {
            if !value.is_finite() || value < 0.0 {
                return Err(expected_actual(field, "finite non-negative number", value));
            }
        }
        validate_range("pedestrian_duration", self.pedestrian_duration)?;
        validate_range("house_duration", self.house_duration)?;
        validate_duration("house_cooldown_seconds", self.house_cooldown_seconds)?;
        validate_duration("time_limit_seconds", self.time_limit_seconds)?;
        Ok(())
    }

    pub(crate) fn lane_score(&self, stage: engine::Stage) -> u32 {
        match stage {
            engine::Stage::Top => self.lane_scores.top,
            engine::Stage::Middle => self.lane_scores.middle,
            engine::Stage::Bottom => self.lane_scores.bottom,
        }
    }
}

fn validate_range(field: &'static str, range: DurationRange) -> Result<(), TuningError> {
    validate_duration(field, range.min)?;
    validate_duration(field, range.max)?;
    if range.min > range.max {
        return Err(TuningError::Invalid {
            field,
            message: format!("inverted range [{}, {})", range.min, range.max),
        });
    }
    Ok(())
}

fn validate_duration(field: &'static str, seconds: f32) -> Result<(), TuningError> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(expected_actual(field, "positive duration", seconds));
    }
    Ok(())
}

fn expected_actual(
    field: &'static str,
    expected: impl Display,
    actual: impl Display,
) -> TuningError {
    TuningError::Invalid {
        field,
        message: format!("expected {expected}, got {actual}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_tuning(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("tuning.json");
        fs::write(&path, body).expect("write tuning");
        path
    }

    #[test]
    fn defaults_are_valid() {
        GameTuning::default().validate().expect("defaults validate");
    }

    #[test]
    fn missing_optional_file_uses_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let (tuning, source) =
            load_optional_tuning_file(&dir.path().join("tuning.json")).expect("defaults");
        assert_eq!(tuning, GameTuning::default());
        assert_eq!(source, TuningSource::Defaults);
    }

    #[test]
    fn partial_file_overrides_named_fields_only() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_tuning(
            &dir,
            r#"{
                "time_limit_seconds": 30.0,
                "lane_scores": { "top": 500, "middle": 200, "bottom": 50 }
            }"#,
        );

        let (tuning, source) = load_optional_tuning_file(&path).expect("load");

        assert_eq!(source, TuningSource::File(path));
        assert_eq!(tuning.time_limit_seconds, 30.0);
        assert_eq!(tuning.lane_score(engine::Stage::Top), 500);
        assert_eq!(tuning.lane_score(engine::Stage::Bottom), 50);
        assert_eq!(tuning.move_speed, GameTuning::default().move_speed);
    }

    #[test]
    fn parse_error_names_field_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_tuning(&dir, r#"{ "house_duration": { "min": "soon", "max": 8.0 } }"#);

        let err = load_tuning_file(&path).expect_err("type error");

        match err {
            TuningError::Parse { field, .. } => assert_eq!(field, "house_duration.min"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_tuning(&dir, r#"{ "gravity": 9.8 }"#);
        assert!(matches!(
            load_tuning_file(&path),
            Err(TuningError::Parse { .. })
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_tuning(&dir, r#"{ "pedestrian_duration": { "min": 3.0, "max": 1.0 } }"#);

        let err = load_tuning_file(&path).expect_err("inverted");

        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "pedestrian_duration",
                ..
            }
        ));
    }

    #[test]
    fn non_positive_durations_are_rejected() {
        let tuning = GameTuning {
            house_cooldown_seconds: 0.0,
            ..GameTuning::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Invalid {
                field: "house_cooldown_seconds",
                ..
            })
        ));

        let tuning = GameTuning {
            time_limit_seconds: -1.0,
            ..GameTuning::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn negative_speed_is_rejected() {
        let tuning = GameTuning {
            top_panel_speed: -0.25,
            ..GameTuning::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Invalid {
                field: "top_panel_speed",
                ..
            })
        ));
    }
}
