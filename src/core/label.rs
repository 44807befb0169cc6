use std::fmt;
use std::path::{Component, Path};

use crate::shared::constants;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dataset {
    ReplayAttack,
    OuluNpu,
    Other(String),
}

impl Dataset {
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case(constants::REPLAY_ATTACK) {
            Dataset::ReplayAttack
        } else if name.eq_ignore_ascii_case(constants::OULU_NPU) {
            Dataset::OuluNpu
        } else {
            Dataset::Other(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Dataset::ReplayAttack => constants::REPLAY_ATTACK,
            Dataset::OuluNpu => constants::OULU_NPU,
            Dataset::Other(name) => name,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Real,
    Attack,
    Unknown,
}

impl Label {
    /// Output directory name; `None` for `Unknown`, which is never written.
    pub fn dir_name(&self) -> Option<&'static str> {
        match self {
            Label::Real => Some("real"),
            Label::Attack => Some("attack"),
            Label::Unknown => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name().unwrap_or("unknown"))
    }
}

/// Derives the binary label of a video from its path.
///
/// ReplayAttack keeps genuine accesses under a `real` folder somewhere in
/// the path. OULU-NPU encodes the access type in the last `_` field of the
/// file name (`phone_session_user_file`), where file id 1 is the bona fide
/// presentation.
pub fn resolve_label(path: &Path, dataset: &Dataset) -> Label {
    match dataset {
        Dataset::ReplayAttack => {
            let has_real = path.components().any(|c| match c {
                Component::Normal(seg) => seg.to_string_lossy().eq_ignore_ascii_case("real"),
                _ => false,
            });
            if has_real {
                Label::Real
            } else {
                Label::Attack
            }
        }
        Dataset::OuluNpu => match oulu_file_id(path) {
            Some(constants::OULU_REAL_FILE_ID) => Label::Real,
            Some(_) => Label::Attack,
            None => Label::Unknown,
        },
        Dataset::Other(_) => Label::Unknown,
    }
}

/// Warning text for a video whose label resolved to `Unknown`.
pub fn unknown_label_warning(path: &Path, dataset: &Dataset) -> String {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    match dataset {
        Dataset::Other(name) => format!("{}: no labeling rule for this dataset ('{}')", name, file),
        _ => format!("{}: cannot infer label from file name '{}'", dataset, file),
    }
}

fn oulu_file_id(path: &Path) -> Option<i64> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < constants::OULU_NAME_PARTS {
        return None;
    }
    parts.last()?.parse::<i64>().ok()
}

/// Maps a raw subset folder name onto `train` / `dev` / `test`.
///
/// ReplayAttack uses `train/devel/test`, OULU-NPU `Train_files/Dev_files/Test_files`.
/// Unrecognized names are lowercased and kept.
pub fn normalize_subset(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    let base = lower.strip_suffix("_files").unwrap_or(&lower);
    match base {
        "train" | "training" => "train".to_string(),
        "dev" | "devel" | "development" | "val" | "validation" => "dev".to_string(),
        "test" | "testing" => "test".to_string(),
        other => other.to_string(),
    }
}

/// Output file prefix for a video: the file name up to its first `.`.
pub fn video_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    file_name.split('.').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_replay_attack_real_segment() {
        let ds = Dataset::ReplayAttack;
        let real = Path::new("data/raw/ReplayAttack/train/real/client001_session01_webcam_authenticate_adverse_1.mov");
        let real_upper = Path::new("data/raw/ReplayAttack/devel/REAL/client002.mov");
        let attack = Path::new("data/raw/ReplayAttack/train/attack/fixed/attack_highdef_client001.mov");
        assert_eq!(resolve_label(real, &ds), Label::Real);
        assert_eq!(resolve_label(real_upper, &ds), Label::Real);
        assert_eq!(resolve_label(attack, &ds), Label::Attack);
    }

    #[test]
    fn test_replay_attack_needs_whole_segment() {
        let ds = Dataset::ReplayAttack;
        // "real" inside a longer name does not count
        let p = Path::new("data/raw/ReplayAttack/test/attack/hand/unreal_real_client.mov");
        assert_eq!(resolve_label(p, &ds), Label::Attack);
        // but the segment may sit anywhere in the path
        let p = Path::new("real/ReplayAttack/test/attack/client.mov");
        assert_eq!(resolve_label(p, &ds), Label::Real);
    }

    #[test]
    fn test_oulu_npu_file_ids() {
        let ds = Dataset::OuluNpu;
        assert_eq!(resolve_label(Path::new("Train_files/1_1_01_1.avi"), &ds), Label::Real);
        assert_eq!(resolve_label(Path::new("Train_files/1_1_01_3.avi"), &ds), Label::Attack);
        assert_eq!(resolve_label(Path::new("Dev_files/6_3_20_5.mp4"), &ds), Label::Attack);
        assert_eq!(resolve_label(Path::new("Train_files/1_1_01_x.avi"), &ds), Label::Unknown);
        assert_eq!(resolve_label(Path::new("Train_files/1_01_2.avi"), &ds), Label::Unknown);
        assert_eq!(resolve_label(Path::new("Train_files/readme.avi"), &ds), Label::Unknown);
    }

    #[test]
    fn test_other_dataset_is_unknown() {
        let ds = Dataset::from_name("CASIA-FASD");
        assert_eq!(ds, Dataset::Other("CASIA-FASD".to_string()));
        assert_eq!(resolve_label(Path::new("train/real/1.avi"), &ds), Label::Unknown);
    }

    #[test]
    fn test_unknown_label_warning_names_the_file() {
        let msg = unknown_label_warning(Path::new("Train_files/1_1_01_x.avi"), &Dataset::OuluNpu);
        assert_eq!(msg, "OULU-NPU: cannot infer label from file name '1_1_01_x.avi'");

        let msg = unknown_label_warning(Path::new("train/a.avi"), &Dataset::from_name("SiW"));
        assert!(msg.starts_with("SiW:"));
        assert!(msg.contains("'a.avi'"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let path = PathBuf::from("ReplayAttack/train/real/a.mov");
        let ds = Dataset::from_name("ReplayAttack");
        let first = resolve_label(&path, &ds);
        for _ in 0..10 {
            assert_eq!(resolve_label(&path, &ds), first);
        }
    }

    #[test]
    fn test_normalize_subset() {
        for (raw, expected) in [
            ("train", "train"),
            ("devel", "dev"),
            ("test", "test"),
            ("Train_files", "train"),
            ("Dev_files", "dev"),
            ("Test_files", "test"),
            ("enroll", "enroll"),
        ] {
            assert_eq!(normalize_subset(raw), expected, "raw subset {}", raw);
        }
    }

    #[test]
    fn test_video_name_stops_at_first_dot() {
        assert_eq!(video_name(Path::new("a/b/1_1_01_1.avi")), "1_1_01_1");
        assert_eq!(video_name(Path::new("client.session.mov")), "client");
    }
}
