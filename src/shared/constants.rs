pub const APP_NAME: &str = "spoofprep";

pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "prep.log";

pub const DEFAULT_RAW_ROOT: &str = "./data/raw";
pub const DEFAULT_PROCESSED_ROOT: &str = "./data/processed";

pub const DEFAULT_TARGET_SIZE: u32 = 256;
pub const DEFAULT_FRAME_INTERVAL: u32 = 5;
pub const DEFAULT_JPEG_QUALITY: i32 = 95;

pub const REPLAY_ATTACK: &str = "ReplayAttack";
pub const OULU_NPU: &str = "OULU-NPU";

pub const REPLAY_ATTACK_SUBSETS: &[&str] = &["train", "devel", "test"];
pub const OULU_NPU_SUBSETS: &[&str] = &["Train_files", "Dev_files", "Test_files"];

pub const REPLAY_ATTACK_EXTENSIONS: &[&str] = &["mov"];
pub const OULU_NPU_EXTENSIONS: &[&str] = &["avi", "mp4"];

/// phone_session_user_file
pub const OULU_NAME_PARTS: usize = 4;
pub const OULU_REAL_FILE_ID: i64 = 1;

pub const OUTPUT_EXTENSION: &str = "jpg";

pub const CASCADE_FILE_NAME: &str = "haarcascade_frontalface_default.xml";
pub const CASCADE_DIR_CANDIDATES: &[&str] = &[
    ".",
    "models",
    "/usr/share/opencv4/haarcascades",
    "/usr/local/share/opencv4/haarcascades",
    "/opt/homebrew/share/opencv4/haarcascades",
    "/usr/share/opencv/haarcascades",
];

pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
pub const DEFAULT_MIN_NEIGHBORS: i32 = 5;
pub const DEFAULT_MIN_FACE_SIZE: i32 = 30;
